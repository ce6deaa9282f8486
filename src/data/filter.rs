use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::series::ChartSeries;

// ---------------------------------------------------------------------------
// Filter predicate: which sensors and which dates are shown
// ---------------------------------------------------------------------------

/// Viewer-side narrowing of a chart series. `None` is the label of points
/// whose row carried no sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesFilter {
    pub sensors: BTreeSet<Option<String>>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Every distinct sensor label of the series, sorted.
pub fn sensor_labels(series: &ChartSeries) -> BTreeSet<Option<String>> {
    series.points.iter().map(|p| p.sensor.clone()).collect()
}

/// Initialise a [`SeriesFilter`] that shows everything.
pub fn init_filter(series: &ChartSeries) -> SeriesFilter {
    let (from, to) = series
        .date_range()
        .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
    SeriesFilter {
        sensors: sensor_labels(series),
        from,
        to,
    }
}

/// Indices of points whose sensor is selected and whose date lies in
/// `[from, to]`. Order follows the series, so the result stays chronological.
pub fn visible_indices(series: &ChartSeries, filter: &SeriesFilter) -> Vec<usize> {
    series
        .points
        .iter()
        .enumerate()
        .filter(|(_, p)| filter.sensors.contains(&p.sensor))
        .filter(|(_, p)| p.date >= filter.from && p.date <= filter.to)
        .map(|(i, _)| i)
        .collect()
}
