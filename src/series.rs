//! Plotter core: observation rows → chronologically ordered chart series.

use chrono::NaiveDate;

use crate::config::{FieldBindings, PlotConfig};
use crate::data::model::Feature;
use crate::error::ProjectError;
use crate::project::LayerRepository;

/// One plotted observation.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub sensor: Option<String>,
}

/// Valid points sorted by date, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub title: String,
    pub points: Vec<SeriesPoint>,
    /// Rows dropped for a malformed date or an out-of-range value.
    pub dropped: usize,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }
}

/// Plotted values must lie in (0, 1]. NaN is rejected.
pub fn is_plottable(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

fn parse_point(feature: &Feature<'_>, fields: &FieldBindings) -> Option<SeriesPoint> {
    let year = i32::try_from(feature.get(&fields.year)?.as_i64()?).ok()?;
    let month = u32::try_from(feature.get(&fields.month)?.as_i64()?).ok()?;
    let day = u32::try_from(feature.get(&fields.day)?.as_i64()?).ok()?;
    let value = feature.get(&fields.value)?.as_f64()?;

    if !is_plottable(value) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let sensor = feature
        .get(&fields.sensor)
        .filter(|v| !v.is_null())
        .map(|v| v.to_string());

    Some(SeriesPoint { date, value, sensor })
}

/// Parse, filter and sort. Rows that cannot be parsed or hold a value
/// outside (0, 1] are counted and dropped; ties keep row order.
pub fn build_series<'a>(
    features: impl IntoIterator<Item = Feature<'a>>,
    fields: &FieldBindings,
    title: &str,
) -> ChartSeries {
    let mut points = Vec::new();
    let mut dropped = 0;
    for feature in features {
        match parse_point(&feature, fields) {
            Some(p) => points.push(p),
            None => dropped += 1,
        }
    }
    points.sort_by_key(|p| p.date);

    ChartSeries {
        title: title.to_string(),
        points,
        dropped,
    }
}

/// Build the series for the configured table layer.
///
/// `Ok(None)` means no row survived; a warning has been logged and nothing
/// should be drawn. A missing layer is an error.
pub fn prepare_plot<R: LayerRepository>(project: &R, config: &PlotConfig) -> Result<Option<ChartSeries>, ProjectError> {
    let table = project.table_layer(&config.layer)?;
    let series = build_series(table.features(), &config.fields, &config.title);

    if series.is_empty() {
        log::warn!("⚠ No valid data points found in '{}'", config.layer);
        return Ok(None);
    }
    log::info!(
        "'{}': {} points, {} rows dropped",
        config.layer,
        series.points.len(),
        series.dropped
    );
    Ok(Some(series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{FieldDef, FieldKind, FieldValue, TableLayer};

    fn table(rows: Vec<(FieldValue, FieldValue, FieldValue, FieldValue)>) -> TableLayer {
        let mut t = TableLayer::new(
            "t",
            vec![
                FieldDef::new("year", FieldKind::Text),
                FieldDef::new("month", FieldKind::Text),
                FieldDef::new("day", FieldKind::Text),
                FieldDef::new("median_ndvi", FieldKind::Text),
            ],
        );
        for (y, m, d, v) in rows {
            // everything lands as text or null so kinds never reject a row
            let as_text = |f: FieldValue| if f.is_null() { f } else { FieldValue::String(f.to_string()) };
            t.add_feature(vec![as_text(y), as_text(m), as_text(d), as_text(v)]).unwrap();
        }
        t
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn filters_and_sorts_chronologically() {
        use FieldValue::*;
        let t = table(vec![
            (Integer(2010), Integer(3), Integer(5), Float(0.55)),
            (Integer(2010), Integer(4), Integer(1), Float(1.4)),
            (Integer(2010), Integer(2), Integer(10), Float(0.30)),
        ]);
        let series = build_series(t.features(), &FieldBindings::default(), "Kanha");

        let got: Vec<(NaiveDate, f64)> = series.points.iter().map(|p| (p.date, p.value)).collect();
        assert_eq!(got, vec![(date(2010, 2, 10), 0.30), (date(2010, 3, 5), 0.55)]);
        assert_eq!(series.dropped, 1);
        assert_eq!(series.title, "Kanha");
        assert_eq!(series.points[0].sensor, None);
    }

    #[test]
    fn malformed_rows_are_dropped_silently() {
        use FieldValue::*;
        let t = table(vec![
            (Null, Integer(3), Integer(5), Float(0.5)),
            (String("twenty".into()), Integer(3), Integer(5), Float(0.5)),
            (Integer(2010), Integer(2), Integer(30), Float(0.5)),
            (Integer(2010), Integer(2), Integer(3), Null),
            (Integer(2010), Integer(2), Integer(3), Float(0.0)),
            (Integer(2010), Integer(2), Integer(3), Float(1.0)),
        ]);
        let series = build_series(t.features(), &FieldBindings::default(), "");
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].value, 1.0);
        assert_eq!(series.dropped, 5);
    }

    #[test]
    fn nan_is_never_plottable() {
        assert!(!is_plottable(f64::NAN));
        assert!(!is_plottable(0.0));
        assert!(is_plottable(1.0));
        assert!(!is_plottable(1.0000001));
    }

    #[test]
    fn equal_dates_keep_row_order() {
        use FieldValue::*;
        let t = table(vec![
            (Integer(2010), Integer(3), Integer(5), Float(0.7)),
            (Integer(2010), Integer(3), Integer(5), Float(0.2)),
        ]);
        let series = build_series(t.features(), &FieldBindings::default(), "");
        let values: Vec<f64> = series.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0.7, 0.2]);
    }
}
