use eframe::egui::Ui;
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Column;
use crate::data::stats::SummaryStats;

// ---------------------------------------------------------------------------
// Descriptive-statistics table
// ---------------------------------------------------------------------------

fn fmt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "–".into())
}

/// Render a describe-style table: one column per measurement, one row per
/// statistic (count, mean, std, min, quartiles, max).
pub fn describe_table(ui: &mut Ui, id: &str, summary: &[(Column, SummaryStats)]) {
    if summary.is_empty() {
        return;
    }

    let stat_rows: [(&str, fn(&SummaryStats) -> Option<f64>); 7] = [
        ("mean", |s: &SummaryStats| s.mean),
        ("std", |s: &SummaryStats| s.std_dev),
        ("min", |s: &SummaryStats| s.min),
        ("25%", |s: &SummaryStats| s.q25),
        ("50%", |s: &SummaryStats| s.median),
        ("75%", |s: &SummaryStats| s.q75),
        ("max", |s: &SummaryStats| s.max),
    ];

    TableBuilder::new(ui)
        .id_salt(id)
        .striped(true)
        .column(TableColumn::auto())
        .columns(TableColumn::auto().at_least(64.0), summary.len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.label("");
            });
            for (col, _) in summary {
                let name = col.name();
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|mut body| {
            body.row(18.0, |mut row| {
                row.col(|ui| {
                    ui.strong("count");
                });
                for (_, stats) in summary {
                    let count = stats.count;
                    row.col(|ui| {
                        ui.label(count.to_string());
                    });
                }
            });
            for (label, get) in stat_rows {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.strong(label);
                    });
                    for (_, stats) in summary {
                        let text = fmt(get(stats));
                        row.col(|ui| {
                            ui.label(text);
                        });
                    }
                });
            }
        });
}
