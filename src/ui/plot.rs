use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Ui, vec2};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::color::{self, DivergingScale};
use crate::data::model::Column;
use crate::data::stats::CorrelationMatrix;
use crate::state::AppState;

/// Line colour of the daily PM10 series.
const SERIES_BLUE: Color32 = Color32::from_rgb(31, 119, 180);
/// Bar colours of the period / all-time comparison.
const BAR_BLUE: Color32 = Color32::from_rgb(66, 103, 210);
const BAR_GREEN: Color32 = Color32::from_rgb(52, 140, 80);

// ---------------------------------------------------------------------------
// Daily PM10 line chart
// ---------------------------------------------------------------------------

/// Daily mean PM10 over the selected period.
pub fn daily_pm10_plot(ui: &mut Ui, state: &AppState) {
    if state.daily_pm10.is_empty() {
        ui.label("No PM10 measurements in the selected period.");
        return;
    }

    let points: Vec<[f64; 2]> = state
        .daily_pm10
        .iter()
        .map(|(date, mean)| [date.num_days_from_ce() as f64, *mean])
        .collect();

    let line = Line::new(PlotPoints::from(points.clone()))
        .color(SERIES_BLUE)
        .width(1.5);
    let markers = Points::new(PlotPoints::from(points))
        .color(SERIES_BLUE)
        .radius(2.5);

    Plot::new("daily_pm10")
        .height(280.0)
        .x_axis_label("Date")
        .y_axis_label("Average PM10 Concentration")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| format_day(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(line);
            plot_ui.points(markers);
        });
}

/// The daily chart plots dates as days-since-CE; turn them back into labels.
fn format_day(days_from_ce: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(days_from_ce.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Yearly pollutant means
// ---------------------------------------------------------------------------

/// Mean of the selected pollutant per year, over the whole dataset.
pub fn yearly_pollutant_plot(ui: &mut Ui, state: &AppState) {
    let Some(yearly) = &state.yearly else {
        return;
    };
    let column = state.selected_pollutant;
    let series = yearly.series(column);
    if series.is_empty() {
        ui.label(format!("No {column} measurements in the dataset."));
        return;
    }

    let palette = color::generate_palette(Column::POLLUTANT_CHOICES.len());
    let color = Column::POLLUTANT_CHOICES
        .iter()
        .position(|&c| c == column)
        .map(|i| palette[i])
        .unwrap_or(SERIES_BLUE);

    let points: Vec<[f64; 2]> = series
        .iter()
        .map(|&(year, mean)| [year as f64, mean])
        .collect();
    let line = Line::new(PlotPoints::from(points.clone()))
        .name(column.name())
        .color(color)
        .width(1.5);
    let markers = Points::new(PlotPoints::from(points)).color(color).radius(3.0);

    Plot::new("yearly_pollutants")
        .height(280.0)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Average Pollutant Concentration")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            let year = mark.value;
            if (year - year.round()).abs() < 1e-3 {
                format!("{year:.0}")
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.line(line);
            plot_ui.points(markers);
        });
}

// ---------------------------------------------------------------------------
// Period vs. all-time comparison bars
// ---------------------------------------------------------------------------

fn format_delta(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{delta:.2}%")
    } else {
        format!("{delta:.2}%")
    }
}

/// Horizontal bars comparing the period PM10 mean against the all-time mean,
/// annotated with the percent difference.
pub fn pm10_comparison_plot(ui: &mut Ui, state: &AppState) {
    let (Some(period_mean), Some(all_time)) = (state.period_pm10, state.all_time_pm10) else {
        ui.label("PM10 means are unavailable for this selection.");
        return;
    };

    let bars = vec![
        Bar::new(0.0, period_mean)
            .name("Current Period")
            .fill(BAR_BLUE)
            .width(0.6),
        Bar::new(1.0, all_time)
            .name("All Time")
            .fill(BAR_GREEN)
            .width(0.6),
    ];
    let chart = BarChart::new(bars).horizontal();

    let delta = state.pm10_delta;
    Plot::new("pm10_comparison")
        .height(140.0)
        .y_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            if (mark.value - 0.0).abs() < 0.01 {
                "Current Period".into()
            } else if (mark.value - 1.0).abs() < 0.01 {
                "All Time".into()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
            if let Some(Ok(delta)) = delta {
                let label = Text::new(
                    PlotPoint::new(period_mean, 0.0),
                    RichText::new(format!("  {}", format_delta(delta))).strong(),
                )
                .anchor(Align2::LEFT_CENTER);
                plot_ui.text(label);
            }
        });

    if let Some(Err(e)) = &state.pm10_delta {
        ui.colored_label(Color32::RED, e.to_string());
    }
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Annotated correlation heatmap: one coloured cell per column pair.
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let scale = DivergingScale::correlation();
    let cell = vec2(64.0, 28.0);

    egui::Grid::new("correlation_heatmap")
        .spacing(vec2(2.0, 2.0))
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for col in &matrix.columns {
                ui.strong(col.name());
            }
            ui.end_row();

            for (i, row_col) in matrix.columns.iter().enumerate() {
                ui.strong(row_col.name());
                for j in 0..matrix.size() {
                    let value = matrix.get(i, j);
                    let (rect, response) = ui.allocate_exact_size(cell, Sense::hover());
                    // NaN marks a pair with no variance or no shared rows.
                    let (fill, label) = if value.is_nan() {
                        (Color32::from_gray(120), "–".to_string())
                    } else {
                        (scale.color_for(value), format!("{value:.2}"))
                    };
                    ui.painter().rect_filled(rect, 2.0, fill);
                    ui.painter().text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        label,
                        FontId::proportional(12.0),
                        color::contrast_text(fill),
                    );
                    response.on_hover_text(format!(
                        "{} × {}",
                        row_col.name(),
                        matrix.columns[j].name()
                    ));
                }
                ui.end_row();
            }
        });
}
