use thiserror::Error;

use super::model::AirQualityDataset;

// ---------------------------------------------------------------------------
// Period – the user-selected (year, month) pair
// ---------------------------------------------------------------------------

/// A (year, month) pair selected in the sidebar.
///
/// Constructed only through [`Period::select`], so a `Period` always refers
/// to a month that actually has data; downstream code never has to handle a
/// bad selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no data for month {month} of {year}")]
    MonthNotAvailable { year: i32, month: u32 },
}

impl Period {
    /// Select a period, rejecting months absent for the chosen year.
    pub fn select(
        dataset: &AirQualityDataset,
        year: i32,
        month: u32,
    ) -> Result<Period, SelectionError> {
        if dataset.has_month(year, month) {
            Ok(Period { year, month })
        } else {
            Err(SelectionError::MonthNotAvailable { year, month })
        }
    }

    pub fn label(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

// ---------------------------------------------------------------------------
// Filter predicate: which observations fall inside the selected period
// ---------------------------------------------------------------------------

/// Return indices of observations matching `period`.
///
/// `None` means no period filter (the "Clear" state) and yields every row.
/// A plain scan is plenty for tens of thousands of rows.
pub fn filtered_indices(dataset: &AirQualityDataset, period: Option<Period>) -> Vec<usize> {
    match period {
        None => (0..dataset.len()).collect(),
        Some(p) => dataset
            .observations
            .iter()
            .enumerate()
            .filter(|(_, obs)| obs.year == p.year && obs.month == p.month)
            .map(|(i, _)| i)
            .collect(),
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

    fn sample_dataset() -> AirQualityDataset {
        AirQualityDataset::from_observations(vec![
            obs(2013, 3, 1, 10.0),
            obs(2013, 3, 2, 20.0),
            obs(2013, 4, 1, 100.0),
            obs(2014, 1, 1, 5.0),
        ])
    }

    #[test]
    fn select_accepts_present_months_only() {
        let ds = sample_dataset();
        assert_eq!(
            Period::select(&ds, 2013, 3),
            Ok(Period { year: 2013, month: 3 })
        );
        assert_eq!(
            Period::select(&ds, 2013, 7),
            Err(SelectionError::MonthNotAvailable { year: 2013, month: 7 })
        );
        assert_eq!(
            Period::select(&ds, 2015, 1),
            Err(SelectionError::MonthNotAvailable { year: 2015, month: 1 })
        );
    }

    #[test]
    fn filter_matches_year_and_month_exactly() {
        let ds = sample_dataset();
        let period = Period::select(&ds, 2013, 3).unwrap();
        let view = filtered_indices(&ds, Some(period));
        assert_eq!(view, vec![0, 1]);
        for &i in &view {
            let o = &ds.observations[i];
            assert_eq!((o.year, o.month), (2013, 3));
        }
    }

    #[test]
    fn filter_and_complement_partition_the_dataset() {
        let ds = sample_dataset();
        let period = Period::select(&ds, 2013, 3).unwrap();
        let view = filtered_indices(&ds, Some(period));
        let complement = ds.len() - view.len();
        assert_eq!(view.len() + complement, ds.len());
        assert_eq!(complement, 2);
    }

    #[test]
    fn no_period_means_every_row() {
        let ds = sample_dataset();
        assert_eq!(filtered_indices(&ds, None), vec![0, 1, 2, 3]);
    }
}
