use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use super::model::{AirQualityDataset, Column};

// ---------------------------------------------------------------------------
// Errors surfaced to the UI
// ---------------------------------------------------------------------------

/// Computation errors that should show up as a status message, not a panic.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("the all-time mean is zero, the percent difference is undefined")]
    ZeroBaseline,
    #[error("select at least one column for the correlation matrix")]
    NoColumnsSelected,
}

// ---------------------------------------------------------------------------
// Scalar statistics
// ---------------------------------------------------------------------------

/// Arithmetic mean. `None` for an empty slice; missing values are dropped
/// before this point.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n − 1). `None` below two values.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Quantile with linear interpolation over an already sorted slice.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// The non-missing values of `column` over the rows in `view`.
pub fn column_values(dataset: &AirQualityDataset, view: &[usize], column: Column) -> Vec<f64> {
    view.iter()
        .filter_map(|&i| column.value(&dataset.observations[i]))
        .collect()
}

/// Mean of `column` over `view`, skipping missing values.
pub fn column_mean(dataset: &AirQualityDataset, view: &[usize], column: Column) -> Option<f64> {
    mean(&column_values(dataset, view, column))
}

/// Relative difference of a period mean against the all-time mean, percent.
///
/// A zero all-time mean makes the ratio undefined; that is reported as an
/// error and rendered as a message instead of propagating an infinity.
pub fn percent_delta(period_mean: f64, global_mean: f64) -> Result<f64, StatsError> {
    if global_mean == 0.0 {
        return Err(StatsError::ZeroBaseline);
    }
    Ok((period_mean - global_mean) / global_mean * 100.0)
}

// ---------------------------------------------------------------------------
// Descriptive statistics table
// ---------------------------------------------------------------------------

/// count / mean / std / min / quartiles / max for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Summarize a set of values. The input does not need to be sorted.
pub fn summarize(values: &[f64]) -> SummaryStats {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    SummaryStats {
        count: sorted.len(),
        mean: mean(&sorted),
        std_dev: std_dev(&sorted),
        min: sorted.first().copied(),
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

/// Per-column descriptive statistics over the rows in `view`.
pub fn describe(dataset: &AirQualityDataset, view: &[usize]) -> Vec<(Column, SummaryStats)> {
    Column::ALL
        .iter()
        .map(|&col| (col, summarize(&column_values(dataset, view, col))))
        .collect()
}

// ---------------------------------------------------------------------------
// Daily PM10 averages
// ---------------------------------------------------------------------------

/// Mean PM10 per calendar date over `view`, chronologically ordered.
///
/// Dates with no rows are simply absent; nothing is interpolated.
pub fn daily_average(dataset: &AirQualityDataset, view: &[usize]) -> Vec<(NaiveDate, f64)> {
    let mut groups: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for &i in view {
        let obs = &dataset.observations[i];
        let Some(pm10) = obs.pm10 else { continue };
        let Some(date) = NaiveDate::from_ymd_opt(obs.year, obs.month, obs.day) else {
            continue;
        };
        let entry = groups.entry(date).or_insert((0.0, 0));
        entry.0 += pm10;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(date, (sum, count))| (date, sum / count as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Yearly means over the full dataset
// ---------------------------------------------------------------------------

/// Mean of every numeric column per year, always computed over the entire
/// dataset (the yearly chart ignores the period filter).
#[derive(Debug, Clone)]
pub struct YearlyAverage {
    pub years: Vec<i32>,
    /// Per column, one entry per year in `years` order.
    means: BTreeMap<Column, Vec<Option<f64>>>,
}

impl YearlyAverage {
    /// Single pass over the observations, accumulating per (year, column).
    pub fn compute(dataset: &AirQualityDataset) -> Self {
        let mut acc: BTreeMap<i32, Vec<(f64, usize)>> = BTreeMap::new();
        for obs in &dataset.observations {
            let sums = acc
                .entry(obs.year)
                .or_insert_with(|| vec![(0.0, 0); Column::ALL.len()]);
            for (k, col) in Column::ALL.iter().enumerate() {
                if let Some(v) = col.value(obs) {
                    sums[k].0 += v;
                    sums[k].1 += 1;
                }
            }
        }

        let years: Vec<i32> = acc.keys().copied().collect();
        let mut means: BTreeMap<Column, Vec<Option<f64>>> = BTreeMap::new();
        for (k, col) in Column::ALL.iter().enumerate() {
            let per_year = years
                .iter()
                .map(|year| {
                    let (sum, count) = acc[year][k];
                    (count > 0).then(|| sum / count as f64)
                })
                .collect();
            means.insert(*col, per_year);
        }
        YearlyAverage { years, means }
    }

    /// Mean of `column` for one year, if that year has any values.
    pub fn mean(&self, year: i32, column: Column) -> Option<f64> {
        let idx = self.years.iter().position(|&y| y == year)?;
        self.means.get(&column)?.get(idx).copied().flatten()
    }

    /// `(year, mean)` series for charting, skipping empty years.
    pub fn series(&self, column: Column) -> Vec<(i32, f64)> {
        let Some(per_year) = self.means.get(&column) else {
            return Vec::new();
        };
        self.years
            .iter()
            .zip(per_year)
            .filter_map(|(&year, mean)| mean.map(|m| (year, m)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Pairwise Pearson correlations over a column subset, symmetric with a
/// unit diagonal.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<Column>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    /// Entry (i, j). NaN marks a pair with no usable data (a constant or
    /// empty column), rendered as a dash.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }
}

/// Pearson correlation coefficient. NaN when either side has no variance.
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    if x.is_empty() {
        return f64::NAN;
    }
    let mean_x = x.iter().sum::<f64>() / x.len() as f64;
    let mean_y = y.iter().sum::<f64>() / y.len() as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    cov / denom
}

/// Correlation matrix over the full dataset for the selected columns.
///
/// Each pair is computed over the rows where both columns are present
/// (pairwise-complete observations, matching the source analysis).
pub fn correlation_matrix(
    dataset: &AirQualityDataset,
    columns: &[Column],
) -> Result<CorrelationMatrix, StatsError> {
    if columns.is_empty() {
        return Err(StatsError::NoColumnsSelected);
    }

    let n = columns.len();
    let mut values = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let mut xs = Vec::new();
            let mut ys = Vec::new();
            for obs in &dataset.observations {
                if let (Some(x), Some(y)) = (columns[i].value(obs), columns[j].value(obs)) {
                    xs.push(x);
                    ys.push(y);
                }
            }
            let r = pearson(&xs, &ys);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{Period, filtered_indices};
    use crate::data::model::Observation;

    const TOL: f64 = 1e-9;

    fn obs(year: i32, month: u32, day: u32, pm10: f64) -> Observation {
        Observation {
            year,
            month,
            day,
            pm10: Some(pm10),
            ..Observation::default()
        }
    }

    fn sample_dataset() -> AirQualityDataset {
        AirQualityDataset::from_observations(vec![
            obs(2013, 3, 1, 10.0),
            obs(2013, 3, 2, 20.0),
            obs(2013, 4, 1, 100.0),
            obs(2014, 1, 1, 5.0),
        ])
    }

    fn all_rows(ds: &AirQualityDataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn global_and_period_means() {
        let ds = sample_dataset();
        let global = column_mean(&ds, &all_rows(&ds), Column::Pm10).unwrap();
        assert!((global - 33.75).abs() < TOL);

        let period = Period::select(&ds, 2013, 3).unwrap();
        let view = filtered_indices(&ds, Some(period));
        let period_mean = column_mean(&ds, &view, Column::Pm10).unwrap();
        assert!((period_mean - 15.0).abs() < TOL);
    }

    #[test]
    fn percent_delta_matches_the_worked_example() {
        let delta = percent_delta(15.0, 33.75).unwrap();
        let expected = (15.0 - 33.75) / 33.75 * 100.0;
        assert!((delta - expected).abs() < TOL);
        assert!((delta - (-55.555_555_555_555_56)).abs() < 1e-9);
    }

    #[test]
    fn percent_delta_identity_is_zero() {
        for m in [0.5, 15.0, 33.75, 1000.0] {
            assert_eq!(percent_delta(m, m).unwrap(), 0.0);
        }
    }

    #[test]
    fn percent_delta_rejects_zero_baseline() {
        assert_eq!(percent_delta(10.0, 0.0), Err(StatsError::ZeroBaseline));
    }

    #[test]
    fn mean_of_missing_only_column_is_none() {
        let ds = sample_dataset();
        // No SO2 anywhere in the fixture.
        assert_eq!(column_mean(&ds, &all_rows(&ds), Column::So2), None);
    }

    #[test]
    fn daily_average_groups_by_date_in_order() {
        let ds = sample_dataset();
        let period = Period::select(&ds, 2013, 3).unwrap();
        let view = filtered_indices(&ds, Some(period));
        let daily = daily_average(&ds, &view);

        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].0, NaiveDate::from_ymd_opt(2013, 3, 1).unwrap());
        assert!((daily[0].1 - 10.0).abs() < TOL);
        assert_eq!(daily[1].0, NaiveDate::from_ymd_opt(2013, 3, 2).unwrap());
        assert!((daily[1].1 - 20.0).abs() < TOL);
        assert!(daily.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn daily_average_averages_rows_sharing_a_date() {
        let ds = AirQualityDataset::from_observations(vec![
            obs(2013, 3, 1, 10.0),
            obs(2013, 3, 1, 30.0),
        ]);
        let daily = daily_average(&ds, &all_rows(&ds));
        assert_eq!(daily.len(), 1);
        assert!((daily[0].1 - 20.0).abs() < TOL);
    }

    #[test]
    fn yearly_average_reproduces_per_year_means() {
        let ds = sample_dataset();
        let yearly = YearlyAverage::compute(&ds);
        assert_eq!(yearly.years, vec![2013, 2014]);

        for &year in &yearly.years {
            let view: Vec<usize> = (0..ds.len())
                .filter(|&i| ds.observations[i].year == year)
                .collect();
            for col in Column::ALL {
                match (yearly.mean(year, col), column_mean(&ds, &view, col)) {
                    (Some(a), Some(b)) => assert!((a - b).abs() < TOL, "{col} in {year}"),
                    (a, b) => assert_eq!(a, b, "{col} in {year}"),
                }
            }
        }

        assert!((yearly.mean(2013, Column::Pm10).unwrap() - 130.0 / 3.0).abs() < TOL);
        assert!((yearly.mean(2014, Column::Pm10).unwrap() - 5.0).abs() < TOL);
    }

    #[test]
    fn yearly_series_skips_years_without_values() {
        let mut rows = vec![obs(2013, 3, 1, 10.0)];
        rows.push(Observation {
            year: 2014,
            month: 1,
            day: 1,
            so2: Some(3.0),
            ..Observation::default()
        });
        let ds = AirQualityDataset::from_observations(rows);
        let yearly = YearlyAverage::compute(&ds);
        assert_eq!(yearly.series(Column::Pm10), vec![(2013, 10.0)]);
        assert_eq!(yearly.series(Column::So2), vec![(2014, 3.0)]);
    }

    #[test]
    fn summarize_matches_known_quartiles() {
        let stats = summarize(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert!((stats.mean.unwrap() - 2.5).abs() < TOL);
        assert!((stats.q25.unwrap() - 1.75).abs() < TOL);
        assert!((stats.median.unwrap() - 2.5).abs() < TOL);
        assert!((stats.q75.unwrap() - 3.25).abs() < TOL);
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(4.0));
        // Sample std of 1..4.
        assert!((stats.std_dev.unwrap() - (5.0f64 / 3.0).sqrt()).abs() < TOL);
    }

    #[test]
    fn summarize_empty_column() {
        let stats = summarize(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.min, None);
    }

    #[test]
    fn single_column_correlation_is_identity() {
        let ds = sample_dataset();
        let matrix = correlation_matrix(&ds, &[Column::Pm10]).unwrap();
        assert_eq!(matrix.size(), 1);
        assert_eq!(matrix.get(0, 0), 1.0);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let rows: Vec<Observation> = (0..24)
            .map(|i| {
                let x = i as f64;
                Observation {
                    year: 2013,
                    month: 3,
                    day: 1 + i / 24,
                    pm10: Some(10.0 + 2.0 * x),
                    no2: Some(5.0 + x * x),
                    temp: Some(20.0 - x),
                    ..Observation::default()
                }
            })
            .collect();
        let ds = AirQualityDataset::from_observations(rows);
        let cols = [Column::Pm10, Column::No2, Column::Temp];
        let matrix = correlation_matrix(&ds, &cols).unwrap();

        for i in 0..matrix.size() {
            assert_eq!(matrix.get(i, i), 1.0);
            for j in 0..matrix.size() {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
                assert!(matrix.get(i, j).abs() <= 1.0 + TOL);
            }
        }
        // PM10 is a linear function of TEMP with negative slope.
        assert!((matrix.get(0, 2) + 1.0).abs() < TOL);
    }

    #[test]
    fn constant_column_correlates_as_nan() {
        let rows: Vec<Observation> = (0..4)
            .map(|i| Observation {
                year: 2013,
                month: 3,
                day: 1 + i,
                pm10: Some(i as f64),
                rain: Some(0.0),
                ..Observation::default()
            })
            .collect();
        let ds = AirQualityDataset::from_observations(rows);
        let matrix = correlation_matrix(&ds, &[Column::Pm10, Column::Rain]).unwrap();
        assert!(matrix.get(0, 1).is_nan());
        assert_eq!(matrix.get(1, 1), 1.0);
    }

    #[test]
    fn empty_column_selection_is_rejected() {
        let ds = sample_dataset();
        assert_eq!(
            correlation_matrix(&ds, &[]).unwrap_err(),
            StatsError::NoColumnsSelected
        );
    }

    #[test]
    fn correlation_uses_pairwise_complete_rows() {
        let rows = vec![
            Observation {
                year: 2013,
                month: 3,
                day: 1,
                pm10: Some(1.0),
                no2: Some(2.0),
                ..Observation::default()
            },
            Observation {
                year: 2013,
                month: 3,
                day: 2,
                pm10: Some(2.0),
                no2: None,
                ..Observation::default()
            },
            Observation {
                year: 2013,
                month: 3,
                day: 3,
                pm10: Some(3.0),
                no2: Some(6.0),
                ..Observation::default()
            },
        ];
        let ds = AirQualityDataset::from_observations(rows);
        let matrix = correlation_matrix(&ds, &[Column::Pm10, Column::No2]).unwrap();
        // Only rows 1 and 3 count; two points are always perfectly correlated.
        assert!((matrix.get(0, 1) - 1.0).abs() < TOL);
    }
}
