use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};
use ndvi_timeline::series::ChartSeries;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct NdviTimelineApp {
    pub state: AppState,
}

impl NdviTimelineApp {
    pub fn new(series: ChartSeries) -> Self {
        Self {
            state: AppState::new(series),
        }
    }
}

impl eframe::App for NdviTimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::timeline_plot(ui, &self.state);
        });
    }
}
