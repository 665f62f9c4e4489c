use chrono::NaiveDate;
use eframe::egui::{self, Color32, ScrollArea, Ui};

use crate::data::model::{AirQualityDataset, Column};
use crate::state::{AppState, ConclusionTab};
use crate::ui::{plot, tables};

// ---------------------------------------------------------------------------
// Narrative text
// ---------------------------------------------------------------------------

const DESCRIPTION: &str = "This dashboard presents an interactive analysis of air quality data, \
with a specific focus on PM10 levels and their correlation with different weather conditions.";

const PROJECT_OVERVIEW: &str = "This dashboard provides an analysis of air quality data, \
specifically emphasizing PM10 levels, obtained from the Nongzhanguan station. The objective of \
the project is to reveal patterns, seasonal fluctuations, and the influence of various weather \
conditions on air quality. The findings from this analysis hold significance for environmental \
research and the surveillance of public health.";

const CONCLUSION_TREND: &str = "The air quality at Nongzhanguan has shown fluctuations from year \
to year. Both PM2.5 and PM10 concentration levels exhibit a varying trend. In 2016, the air \
quality graph indicates an overall increase with lower concentration levels. However, over time, \
these levels exhibit a random pattern, tending to decrease based on environmental factors.";

const CONCLUSION_CORRELATION: &str = "The provided analysis indicates that NO2 is the weather \
variable that correlates the most with PM10 levels. This strong positive correlation is \
supported by the shared sources of both pollutants, including vehicle emissions, industrial \
processes, and combustion of various fuels such as fossil fuels and biomass.";

// ---------------------------------------------------------------------------
// Central panel – the dashboard page
// ---------------------------------------------------------------------------

/// Render the whole dashboard page inside a vertical scroll area.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Air Quality Analysis Dashboard: Nongzhanguan Station");
            ui.add_space(4.0);
            ui.label(DESCRIPTION);
            ui.add_space(8.0);
            ui.strong("Project Overview");
            ui.label(PROJECT_OVERVIEW);

            let Some(dataset) = state.dataset.clone() else {
                ui.separator();
                ui.label("Open a station file to explore the data  (File → Open…)");
                return;
            };

            // ---- Dataset overview ----
            ui.separator();
            ui.strong("Dataset Overview");
            ui.label(dataset_span_line(&dataset));
            tables::describe_table(ui, "full_describe", &state.full_summary);

            // ---- Selected period ----
            ui.separator();
            ui.strong("Data Overview for Selected Period");
            tables::describe_table(ui, "period_describe", &state.period_summary);

            // ---- Daily PM10 ----
            ui.separator();
            ui.strong("Daily PM10 Level");
            plot::daily_pm10_plot(ui, state);

            // ---- Yearly distribution ----
            ui.separator();
            ui.strong("Yearly Pollutant Distribution");
            pollutant_selector(ui, state);
            plot::yearly_pollutant_plot(ui, state);

            // ---- Period vs. all-time comparison ----
            ui.separator();
            ui.strong("Monthly Average PM10 Concentration");
            if let Some(period_mean) = state.period_pm10 {
                ui.label(format!(
                    "This period average PM10 concentration: {period_mean:.2}"
                ));
            }
            if let Some(all_time) = state.all_time_pm10 {
                ui.label(format!(
                    "All time average PM10 concentration: {all_time:.2}"
                ));
            }
            plot::pm10_comparison_plot(ui, state);

            // ---- Correlation ----
            ui.separator();
            ui.strong("Correlation Heatmap");
            correlation_selector(ui, state);
            match &state.correlation {
                Some(Ok(matrix)) => plot::correlation_heatmap(ui, matrix),
                Some(Err(e)) => {
                    ui.colored_label(Color32::RED, e.to_string());
                }
                None => {}
            }

            // ---- Conclusions ----
            ui.separator();
            ui.strong("Conclusion");
            conclusion_tabs(ui, state);
        });
}

/// "This dataset contains N rows and M columns from <first> to <last>."
fn dataset_span_line(dataset: &AirQualityDataset) -> String {
    let month_label = |year: i32, month: u32| {
        NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.format("%B %Y").to_string())
    };
    let first = dataset.years.first().and_then(|&y| {
        dataset
            .available_months(y)
            .first()
            .and_then(|&m| month_label(y, m))
    });
    let last = dataset.years.last().and_then(|&y| {
        dataset
            .available_months(y)
            .last()
            .and_then(|&m| month_label(y, m))
    });

    // year, month, day, hour + measurements + wd
    let columns = 4 + Column::ALL.len() + 1;
    match (first, last) {
        (Some(first), Some(last)) => format!(
            "This dataset contains {} rows and {columns} columns from {first} to {last}.",
            dataset.len()
        ),
        _ => format!("This dataset contains {} rows and {columns} columns.", dataset.len()),
    }
}

/// Single-choice pollutant picker for the yearly chart.
fn pollutant_selector(ui: &mut Ui, state: &mut AppState) {
    egui::ComboBox::from_id_salt("select_pollutant")
        .selected_text(state.selected_pollutant.name())
        .show_ui(ui, |ui: &mut Ui| {
            for col in Column::POLLUTANT_CHOICES {
                if ui
                    .selectable_label(state.selected_pollutant == col, col.name())
                    .clicked()
                {
                    state.set_pollutant(col);
                }
            }
        });
}

/// Checkbox row deciding which columns feed the correlation matrix.
fn correlation_selector(ui: &mut Ui, state: &mut AppState) {
    ui.label("Select Columns for Correlation");
    let mut toggled = None;
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for col in Column::ALL {
            let mut checked = state.correlation_columns.contains(&col);
            if ui.checkbox(&mut checked, col.name()).changed() {
                toggled = Some(col);
            }
        }
    });
    if let Some(col) = toggled {
        state.toggle_correlation_column(col);
    }
}

/// Two read-only conclusion blocks behind selectable tabs.
fn conclusion_tabs(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut state.conclusion_tab, ConclusionTab::Trend, "Conclusion 1");
        ui.selectable_value(
            &mut state.conclusion_tab,
            ConclusionTab::Correlation,
            "Conclusion 2",
        );
    });
    let text = match state.conclusion_tab {
        ConclusionTab::Trend => CONCLUSION_TREND,
        ConclusionTab::Correlation => CONCLUSION_CORRELATION,
    };
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.label(text);
    });
}
