use std::path::Path;

use eframe::egui;

use crate::data::loader::DEFAULT_DATASET_PATH;
use crate::state::AppState;
use crate::ui::{central, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AirGazerApp {
    pub state: AppState,
}

impl Default for AirGazerApp {
    fn default() -> Self {
        let mut state = AppState::default();

        // The station file is expected at a fixed relative location; a
        // different file can still be opened through the File menu.
        let path = Path::new(DEFAULT_DATASET_PATH);
        if path.exists() {
            state.load_from_path(path);
        } else {
            log::warn!("No dataset at {DEFAULT_DATASET_PATH}");
            state.status_message = Some(format!(
                "Dataset not found at {DEFAULT_DATASET_PATH} — use File → Open…"
            ));
        }

        Self { state }
    }
}

impl eframe::App for AirGazerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: period selection ----
        egui::SidePanel::left("period_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: the dashboard page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            central::central_panel(ui, &mut self.state);
        });
    }
}
