use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Column – typed identifiers for the numeric measurement columns
// ---------------------------------------------------------------------------

/// The numeric measurement columns of the PRSA station schema.
///
/// Column selection in the UI (yearly chart, correlation heatmap) goes
/// through this enum, so an unknown or non-numeric column name can never
/// reach a computation. The categorical wind-direction column (`wd`) is
/// deliberately not represented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Pm25,
    Pm10,
    So2,
    No2,
    Co,
    O3,
    Temp,
    Pres,
    Dwp,
    Rain,
    Wspm,
}

impl Column {
    /// Every numeric column, in schema order.
    pub const ALL: [Column; 11] = [
        Column::Pm25,
        Column::Pm10,
        Column::So2,
        Column::No2,
        Column::Co,
        Column::O3,
        Column::Temp,
        Column::Pres,
        Column::Dwp,
        Column::Rain,
        Column::Wspm,
    ];

    /// Choices offered by the yearly-distribution pollutant picker.
    pub const POLLUTANT_CHOICES: [Column; 9] = [
        Column::So2,
        Column::No2,
        Column::Co,
        Column::O3,
        Column::Temp,
        Column::Pres,
        Column::Dwp,
        Column::Rain,
        Column::Wspm,
    ];

    /// Default preselection for the correlation heatmap.
    pub const CORRELATION_DEFAULT: [Column; 5] = [
        Column::Pm10,
        Column::No2,
        Column::Co,
        Column::So2,
        Column::Temp,
    ];

    /// The column header as it appears in the source files.
    pub fn name(self) -> &'static str {
        match self {
            Column::Pm25 => "PM2.5",
            Column::Pm10 => "PM10",
            Column::So2 => "SO2",
            Column::No2 => "NO2",
            Column::Co => "CO",
            Column::O3 => "O3",
            Column::Temp => "TEMP",
            Column::Pres => "PRES",
            Column::Dwp => "DWP",
            Column::Rain => "RAIN",
            Column::Wspm => "WSPM",
        }
    }

    /// Resolve a header name to a column. Unknown names are rejected here,
    /// at the boundary, rather than at computation time.
    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Read this column's value from an observation.
    pub fn value(self, obs: &Observation) -> Option<f64> {
        match self {
            Column::Pm25 => obs.pm25,
            Column::Pm10 => obs.pm10,
            Column::So2 => obs.so2,
            Column::No2 => obs.no2,
            Column::Co => obs.co,
            Column::O3 => obs.o3,
            Column::Temp => obs.temp,
            Column::Pres => obs.pres,
            Column::Dwp => obs.dwp,
            Column::Rain => obs.rain,
            Column::Wspm => obs.wspm,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Observation – one hourly row of the dataset
// ---------------------------------------------------------------------------

/// A single hourly measurement (one row of the source table).
///
/// Measurement fields are `Option` because the source data contains real
/// gaps (`NA` cells); aggregations skip missing values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Hour of day, when the source file carries it.
    pub hour: Option<u32>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub so2: Option<f64>,
    pub no2: Option<f64>,
    pub co: Option<f64>,
    pub o3: Option<f64>,
    pub temp: Option<f64>,
    pub pres: Option<f64>,
    pub dwp: Option<f64>,
    pub rain: Option<f64>,
    pub wspm: Option<f64>,
    /// Wind direction, categorical.
    pub wd: Option<String>,
}

// ---------------------------------------------------------------------------
// AirQualityDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed period indices.
///
/// Built once by the loader and treated as read-only afterwards; every
/// derived value (filtered views, averages, correlations) is a pure function
/// of this structure plus the current UI selections.
#[derive(Debug, Clone)]
pub struct AirQualityDataset {
    /// All observations (rows), in file order.
    pub observations: Vec<Observation>,
    /// Distinct years present, ascending.
    pub years: Vec<i32>,
    /// For each year the sorted set of months that actually have data.
    months_by_year: BTreeMap<i32, BTreeSet<u32>>,
}

impl AirQualityDataset {
    /// Build the period indices from the loaded observations.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let mut months_by_year: BTreeMap<i32, BTreeSet<u32>> = BTreeMap::new();
        for obs in &observations {
            months_by_year.entry(obs.year).or_default().insert(obs.month);
        }
        let years: Vec<i32> = months_by_year.keys().copied().collect();
        AirQualityDataset {
            observations,
            years,
            months_by_year,
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// The distinct months present for `year`, ascending.
    ///
    /// Computed from the data rather than assumed: the first and last
    /// calendar years of the source only cover part of the year (March
    /// onward, respectively through February).
    pub fn available_months(&self, year: i32) -> Vec<u32> {
        self.months_by_year
            .get(&year)
            .map(|months| months.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether `month` has any data for `year`.
    pub fn has_month(&self, year: i32, month: u32) -> bool {
        self.months_by_year
            .get(&year)
            .is_some_and(|months| months.contains(&month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn years_are_sorted_and_distinct() {
        let ds = sample_dataset();
        assert_eq!(ds.years, vec![2013, 2014]);
    }

    #[test]
    fn available_months_reflect_the_data() {
        let ds = sample_dataset();
        assert_eq!(ds.available_months(2013), vec![3, 4]);
        assert_eq!(ds.available_months(2014), vec![1]);
        assert!(ds.available_months(1999).is_empty());
    }

    #[test]
    fn available_months_are_strictly_increasing_and_in_range() {
        let ds = sample_dataset();
        for &year in &ds.years {
            let months = ds.available_months(year);
            assert!(months.windows(2).all(|w| w[0] < w[1]));
            assert!(months.iter().all(|&m| (1..=12).contains(&m)));
        }
    }

    #[test]
    fn column_name_roundtrip() {
        for col in Column::ALL {
            assert_eq!(Column::from_name(col.name()), Some(col));
        }
        assert_eq!(Column::from_name("wd"), None);
        assert_eq!(Column::from_name("station"), None);
    }

    #[test]
    fn column_accessor_reads_the_right_field() {
        let row = Observation {
            year: 2015,
            month: 6,
            day: 1,
            no2: Some(42.0),
            ..Observation::default()
        };
        assert_eq!(Column::No2.value(&row), Some(42.0));
        assert_eq!(Column::Pm10.value(&row), None);
    }
}
