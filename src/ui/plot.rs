use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoint, PlotPoints, Points};

use crate::color::sensor_name;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Date axis
// ---------------------------------------------------------------------------

/// Dates are plotted as days since 0001-01-01 (CE day 1).
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x.abs() > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

fn format_date_axis(x: f64) -> String {
    x_to_date(x)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Timeline plot (central panel)
// ---------------------------------------------------------------------------

/// Render the scatter + line chart of the visible points.
pub fn timeline_plot(ui: &mut Ui, state: &AppState) {
    let points = &state.series.points;

    Plot::new("ndvi_timeline")
        .legend(Legend::default())
        .x_axis_label("Date")
        .y_axis_label("NDVI")
        .x_axis_formatter(|mark, _range| format_date_axis(mark.value))
        .label_formatter(|name, value: &PlotPoint| {
            let date = format_date_axis(value.x);
            if name.is_empty() {
                format!("{date}\nNDVI {:.3}", value.y)
            } else {
                format!("{name}\n{date}\nNDVI {:.3}", value.y)
            }
        })
        .include_y(0.0)
        .include_y(1.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            if state.show_line && state.visible_indices.len() > 1 {
                let line: PlotPoints = state
                    .visible_indices
                    .iter()
                    .map(|&i| [date_to_x(points[i].date), points[i].value])
                    .collect();
                plot_ui.line(
                    Line::new(line)
                        .color(Color32::from_white_alpha(150))
                        .width(1.5),
                );
            }

            // one scatter layer per sensor so the legend lists them
            for sensor in &state.filter.sensors {
                let scatter: PlotPoints = state
                    .visible_indices
                    .iter()
                    .map(|&i| &points[i])
                    .filter(|p| &p.sensor == sensor)
                    .map(|p| [date_to_x(p.date), p.value])
                    .collect();

                plot_ui.points(
                    Points::new(scatter)
                        .name(sensor_name(sensor))
                        .color(state.colors.color_for(sensor))
                        .radius(4.0),
                );
            }
        });
}
