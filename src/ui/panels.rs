use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – period selection and author info
// ---------------------------------------------------------------------------

/// Render the left sidebar: the period selectors, the clear button, and the
/// author block.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Choose time period");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    // ---- Year selector ----
    let selected_year = state.selected_period.map(|p| p.year);
    ui.strong("Select Year");
    egui::ComboBox::from_id_salt("select_year")
        .selected_text(
            selected_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "–".into()),
        )
        .show_ui(ui, |ui: &mut Ui| {
            for &year in &dataset.years {
                if ui
                    .selectable_label(selected_year == Some(year), year.to_string())
                    .clicked()
                {
                    state.select_year(year);
                }
            }
        });

    // ---- Month selector, constrained to months present for the year ----
    if let Some(period) = state.selected_period {
        ui.strong("Select Month");
        egui::ComboBox::from_id_salt("select_month")
            .selected_text(period.month.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for month in dataset.available_months(period.year) {
                    if ui
                        .selectable_label(period.month == month, month.to_string())
                        .clicked()
                    {
                        state.select_month(month);
                    }
                }
            });
    }

    ui.add_space(4.0);
    if ui.button("Clear").clicked() {
        state.clear_period();
    }

    ui.add_space(4.0);
    match state.selected_period {
        Some(period) => ui.label(format!("Showing {}", period.label())),
        None => ui.label("Showing the full dataset"),
    };

    ui.separator();
    about_the_author(ui);
}

/// Static author/contact metadata.
fn about_the_author(ui: &mut Ui) {
    ui.strong("About the Author");
    ui.label("Name: Naoby Prawira");
    ui.label("Email: naobyprawira8@gmail.com");
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Dicoding ID:");
        ui.hyperlink_to(
            "naobyprawira",
            "https://www.dicoding.com/users/naobyprawira/",
        );
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} observations loaded, {} in the selected period",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open station data")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_from_path(&path);
    }
}
