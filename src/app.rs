use eframe::egui;

use crate::config::Settings;
use crate::state::AppState;
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct InventoryApp {
    pub state: AppState,
}

impl InventoryApp {
    /// Build the app and perform the initial load.
    pub fn new(settings: Settings) -> Self {
        let mut state = AppState::new(settings);
        state.reload();
        Self { state }
    }
}

impl eframe::App for InventoryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters + downloads ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: results table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::results_table(ui, &self.state);
        });
    }
}

impl Drop for InventoryApp {
    fn drop(&mut self) {
        self.state.shutdown();
    }
}
