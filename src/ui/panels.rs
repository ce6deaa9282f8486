use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::color::sensor_name;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – sensor and date filters
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Sensors ----
            let n_selected = state.filter.sensors.len();
            let n_total = state.sensors.len();
            ui.strong(format!("Sensors  ({n_selected}/{n_total})"));
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_sensors();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_sensors();
                }
            });

            for sensor in state.sensors.clone() {
                let text = RichText::new(sensor_name(&sensor)).color(state.colors.color_for(&sensor));
                let mut checked = state.filter.sensors.contains(&sensor);
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_sensor(&sensor);
                }
            }
            ui.separator();

            // ---- Date range ----
            ui.strong("Dates");
            egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("From");
                ui.add(DatePickerButton::new(&mut state.filter.from).id_salt("date_from"));
                ui.end_row();

                ui.label("To");
                ui.add(DatePickerButton::new(&mut state.filter.to).id_salt("date_to"));
                ui.end_row();
            });
            if ui.small_button("Full range").clicked() {
                state.reset_dates();
            }
            ui.separator();

            ui.checkbox(&mut state.show_line, "Connect points");
        });

    // Recompute visible indices after any date picker changes.
    state.refilter();
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title and point counts.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading(&state.series.title);
        ui.separator();

        ui.label(format!(
            "{} points, {} visible",
            state.series.points.len(),
            state.visible_indices.len()
        ));

        if let Some((first, last)) = state.full_range() {
            ui.separator();
            ui.label(format!("{} → {}", first.format("%d-%m-%Y"), last.format("%d-%m-%Y")));
        }

        if state.series.dropped > 0 {
            ui.separator();
            ui.label(
                RichText::new(format!("{} rows dropped", state.series.dropped))
                    .color(egui::Color32::YELLOW),
            );
        }
    });
}
