use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::data::filter::{Period, filtered_indices};
use crate::data::loader;
use crate::data::model::{AirQualityDataset, Column};
use crate::data::stats::{
    self, CorrelationMatrix, StatsError, SummaryStats, YearlyAverage,
};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which conclusion tab is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConclusionTab {
    #[default]
    Trend,
    Correlation,
}

/// The full UI state, independent of rendering.
///
/// The dataset is behind an `Arc` and never mutated after load; everything
/// below the "derived" line is recomputed from it whenever a selection
/// changes.
pub struct AppState {
    /// Loaded dataset (None until the file is loaded).
    pub dataset: Option<Arc<AirQualityDataset>>,

    /// Currently selected period; `None` is the cleared (full dataset) view.
    pub selected_period: Option<Period>,

    /// Pollutant shown in the yearly-distribution chart.
    pub selected_pollutant: Column,

    /// Columns selected for the correlation heatmap.
    pub correlation_columns: BTreeSet<Column>,

    /// Open conclusion tab.
    pub conclusion_tab: ConclusionTab,

    // -- Derived from the dataset alone, computed once per load --
    /// Descriptive statistics over the whole dataset.
    pub full_summary: Vec<(Column, SummaryStats)>,
    /// Per-year means of every numeric column, whole dataset.
    pub yearly: Option<YearlyAverage>,
    /// All-time PM10 mean, the comparison baseline.
    pub all_time_pm10: Option<f64>,

    // -- Derived from dataset + selections, recomputed on every change --
    /// Indices of observations inside the selected period.
    pub visible_indices: Vec<usize>,
    /// Descriptive statistics over the selected period.
    pub period_summary: Vec<(Column, SummaryStats)>,
    /// Daily mean PM10 over the selected period, chronological.
    pub daily_pm10: Vec<(NaiveDate, f64)>,
    /// PM10 mean over the selected period.
    pub period_pm10: Option<f64>,
    /// Period-vs-all-time percent difference, or why it is undefined.
    pub pm10_delta: Option<Result<f64, StatsError>>,
    /// Correlation matrix for the selected columns, or why it is undefined.
    pub correlation: Option<Result<CorrelationMatrix, StatsError>>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            selected_period: None,
            selected_pollutant: Column::So2,
            correlation_columns: Column::CORRELATION_DEFAULT.into_iter().collect(),
            conclusion_tab: ConclusionTab::default(),
            full_summary: Vec::new(),
            yearly: None,
            all_time_pm10: None,
            visible_indices: Vec::new(),
            period_summary: Vec::new(),
            daily_pm10: Vec::new(),
            period_pm10: None,
            pm10_delta: None,
            correlation: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Load a station file and install it as the active dataset.
    pub fn load_from_path(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and initialise every selection.
    pub fn set_dataset(&mut self, dataset: AirQualityDataset) {
        let dataset = Arc::new(dataset);

        let all_rows: Vec<usize> = (0..dataset.len()).collect();
        self.full_summary = stats::describe(&dataset, &all_rows);
        self.yearly = Some(YearlyAverage::compute(&dataset));
        self.all_time_pm10 = stats::column_mean(&dataset, &all_rows, Column::Pm10);

        // Default to the first selectable period, like the sidebar widgets.
        self.selected_period = dataset
            .years
            .first()
            .and_then(|&year| {
                dataset
                    .available_months(year)
                    .first()
                    .map(|&month| Period { year, month })
            });

        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// Switch the selected year, keeping the month when it exists there.
    pub fn select_year(&mut self, year: i32) {
        let Some(dataset) = self.dataset.clone() else {
            return;
        };
        let months = dataset.available_months(year);
        let month = self
            .selected_period
            .map(|p| p.month)
            .filter(|m| months.contains(m))
            .or_else(|| months.first().copied());
        self.selected_period = month.and_then(|m| Period::select(&dataset, year, m).ok());
        self.refresh();
    }

    /// Switch the selected month within the current year.
    pub fn select_month(&mut self, month: u32) {
        let (Some(dataset), Some(period)) = (self.dataset.clone(), self.selected_period) else {
            return;
        };
        match Period::select(&dataset, period.year, month) {
            Ok(p) => {
                self.selected_period = Some(p);
                self.refresh();
            }
            // Unreachable through the month picker; surfaced anyway.
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// The "Clear" button: show the full dataset again.
    pub fn clear_period(&mut self) {
        self.selected_period = None;
        self.refresh();
    }

    pub fn set_pollutant(&mut self, column: Column) {
        self.selected_pollutant = column;
    }

    /// Toggle a column in the correlation selection and recompute the matrix.
    pub fn toggle_correlation_column(&mut self, column: Column) {
        if !self.correlation_columns.remove(&column) {
            self.correlation_columns.insert(column);
        }
        self.recompute_correlation();
    }

    /// Recompute everything that depends on the current selections.
    pub fn refresh(&mut self) {
        let Some(dataset) = self.dataset.clone() else {
            return;
        };

        self.visible_indices = filtered_indices(&dataset, self.selected_period);
        self.period_summary = stats::describe(&dataset, &self.visible_indices);
        self.daily_pm10 = stats::daily_average(&dataset, &self.visible_indices);
        self.period_pm10 = stats::column_mean(&dataset, &self.visible_indices, Column::Pm10);

        self.pm10_delta = match (self.period_pm10, self.all_time_pm10) {
            (Some(period), Some(global)) => Some(stats::percent_delta(period, global)),
            _ => None,
        };

        self.recompute_correlation();
    }

    fn recompute_correlation(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let columns: Vec<Column> = self.correlation_columns.iter().copied().collect();
        self.correlation = Some(stats::correlation_matrix(dataset, &columns));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Observation;

    fn obs(year: i32, month: u32, day: u32, pm10: f64) -> Observation {
        Observation {
            year,
            month,
            day,
            pm10: Some(pm10),
            ..Observation::default()
        }
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(AirQualityDataset::from_observations(vec![
            obs(2013, 3, 1, 10.0),
            obs(2013, 3, 2, 20.0),
            obs(2013, 4, 1, 100.0),
            obs(2014, 1, 1, 5.0),
        ]));
        state
    }

    #[test]
    fn loading_selects_the_first_period() {
        let state = loaded_state();
        assert_eq!(
            state.selected_period,
            Some(Period { year: 2013, month: 3 })
        );
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.all_time_pm10, Some(33.75));
        assert_eq!(state.period_pm10, Some(15.0));
    }

    #[test]
    fn clear_shows_the_full_dataset() {
        let mut state = loaded_state();
        state.clear_period();
        assert_eq!(state.selected_period, None);
        assert_eq!(state.visible_indices.len(), 4);
        assert_eq!(state.period_pm10, Some(33.75));
        assert_eq!(state.pm10_delta, Some(Ok(0.0)));
    }

    #[test]
    fn year_switch_falls_back_to_an_available_month() {
        let mut state = loaded_state();
        // 2014 has no March; the selector falls back to January.
        state.select_year(2014);
        assert_eq!(
            state.selected_period,
            Some(Period { year: 2014, month: 1 })
        );
        assert_eq!(state.visible_indices, vec![3]);
    }

    #[test]
    fn correlation_follows_the_column_toggles() {
        let mut state = loaded_state();
        let default_len = Column::CORRELATION_DEFAULT.len();
        let matrix = state.correlation.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(matrix.size(), default_len);

        for col in Column::CORRELATION_DEFAULT {
            state.toggle_correlation_column(col);
        }
        assert!(matches!(
            state.correlation,
            Some(Err(StatsError::NoColumnsSelected))
        ));
    }

    #[test]
    fn delta_matches_the_worked_example() {
        let state = loaded_state();
        let delta = state.pm10_delta.unwrap().unwrap();
        assert!((delta - (15.0 - 33.75) / 33.75 * 100.0).abs() < 1e-9);
    }
}
