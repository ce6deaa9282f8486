use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::color::SensorColors;
use ndvi_timeline::data::filter::{SeriesFilter, init_filter, sensor_labels, visible_indices};
use ndvi_timeline::series::ChartSeries;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct AppState {
    /// Series built before the window opened; never empty.
    pub series: ChartSeries,

    /// Every sensor label present in the series.
    pub sensors: BTreeSet<Option<String>>,

    /// Current sensor and date selection.
    pub filter: SeriesFilter,

    /// Indices of points passing the current filter (cached).
    pub visible_indices: Vec<usize>,

    pub colors: SensorColors,

    /// Draw the connecting line in addition to the points.
    pub show_line: bool,
}

impl AppState {
    pub fn new(series: ChartSeries) -> Self {
        let sensors = sensor_labels(&series);
        let filter = init_filter(&series);
        let visible_indices = visible_indices(&series, &filter);
        let colors = SensorColors::new(&sensors);
        AppState {
            series,
            sensors,
            filter,
            visible_indices,
            colors,
            show_line: true,
        }
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        self.visible_indices = visible_indices(&self.series, &self.filter);
    }

    pub fn toggle_sensor(&mut self, sensor: &Option<String>) {
        if !self.filter.sensors.remove(sensor) {
            self.filter.sensors.insert(sensor.clone());
        }
        self.refilter();
    }

    pub fn select_all_sensors(&mut self) {
        self.filter.sensors = self.sensors.clone();
        self.refilter();
    }

    pub fn select_no_sensors(&mut self) {
        self.filter.sensors.clear();
        self.refilter();
    }

    /// Back to the full date span of the series.
    pub fn reset_dates(&mut self) {
        let full = init_filter(&self.series);
        self.filter.from = full.from;
        self.filter.to = full.to;
        self.refilter();
    }

    pub fn full_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.series.date_range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndvi_timeline::series::SeriesPoint;

    fn state() -> AppState {
        let point = |d: u32, s: &str| SeriesPoint {
            date: NaiveDate::from_ymd_opt(2010, 3, d).unwrap(),
            value: 0.5,
            sensor: Some(s.to_string()),
        };
        AppState::new(ChartSeries {
            title: "t".into(),
            points: vec![point(1, "MODIS"), point(2, "LANDSAT"), point(3, "MODIS")],
            dropped: 0,
        })
    }

    #[test]
    fn toggling_a_sensor_hides_and_restores_it() {
        let mut s = state();
        let landsat = Some("LANDSAT".to_string());
        s.toggle_sensor(&landsat);
        assert_eq!(s.visible_indices, vec![0, 2]);
        s.toggle_sensor(&landsat);
        assert_eq!(s.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn reset_dates_restores_full_span() {
        let mut s = state();
        s.filter.from = NaiveDate::from_ymd_opt(2010, 3, 3).unwrap();
        s.refilter();
        assert_eq!(s.visible_indices, vec![2]);
        s.reset_dates();
        assert_eq!(s.visible_indices.len(), 3);

        s.select_no_sensors();
        assert!(s.visible_indices.is_empty());
        s.select_all_sensors();
        assert_eq!(s.visible_indices.len(), 3);
    }
}
