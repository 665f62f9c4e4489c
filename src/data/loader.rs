use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{AirQualityDataset, Column, Observation};

/// Where the station file is expected when the app starts.
pub const DEFAULT_DATASET_PATH: &str = "data/PRSA_Data_Nongzhanguan_20130301-20170228.csv";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a station dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the PRSA distribution format (missing cells are `NA`)
/// * `.parquet` – flat columns with the same names
/// * `.json`    – `[{ "year": ..., "month": ..., "PM10": ..., ... }, ...]`
pub fn load_file(path: &Path) -> Result<AirQualityDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    if dataset.is_empty() {
        bail!("{} contains no data rows", path.display());
    }
    log::info!(
        "Loaded {} observations spanning {:?} from {}",
        dataset.len(),
        dataset.years,
        path.display()
    );
    Ok(dataset)
}

/// Month/day sanity check shared by all loaders.
fn validate_date(row: usize, obs: &Observation) -> Result<()> {
    if !(1..=12).contains(&obs.month) {
        bail!("Row {row}: month {} out of range 1-12", obs.month);
    }
    if !(1..=31).contains(&obs.day) {
        bail!("Row {row}: day {} out of range 1-31", obs.day);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names.  The date columns `year`,
/// `month`, `day` and every measurement column must be present (`hour` is
/// optional); missing measurements are encoded as `NA` or an empty cell.
fn load_csv(path: &Path) -> Result<AirQualityDataset> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

fn read_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<AirQualityDataset> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let col_idx = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    };

    let year_idx = col_idx("year")?;
    let month_idx = col_idx("month")?;
    let day_idx = col_idx("day")?;
    let hour_idx = headers.iter().position(|h| h == "hour");

    // Measurement columns are resolved through the typed enum; headers that
    // do not name a known numeric column (station, wd, No) are ignored here.
    let measure_idx: Vec<(Column, usize)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| Column::from_name(h).map(|c| (c, idx)))
        .collect();
    for col in Column::ALL {
        if !measure_idx.iter().any(|&(c, _)| c == col) {
            bail!("CSV missing '{col}' column");
        }
    }
    let wd_idx = col_idx("wd")?;

    let mut observations = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

        let mut obs = Observation {
            year: parse_int(cell(year_idx))
                .with_context(|| format!("Row {row_no}: invalid 'year'"))? as i32,
            month: parse_int(cell(month_idx))
                .with_context(|| format!("Row {row_no}: invalid 'month'"))? as u32,
            day: parse_int(cell(day_idx))
                .with_context(|| format!("Row {row_no}: invalid 'day'"))? as u32,
            ..Observation::default()
        };
        if let Some(idx) = hour_idx {
            obs.hour = parse_optional_int(cell(idx))
                .with_context(|| format!("Row {row_no}: invalid 'hour'"))?
                .map(|h| h as u32);
        }
        for &(col, idx) in &measure_idx {
            let value = parse_optional_f64(cell(idx))
                .with_context(|| format!("Row {row_no}: invalid '{col}'"))?;
            set_measurement(&mut obs, col, value);
        }
        obs.wd = match cell(wd_idx) {
            "" | "NA" => None,
            wd => Some(wd.to_string()),
        };

        validate_date(row_no, &obs)?;
        observations.push(obs);
    }

    Ok(AirQualityDataset::from_observations(observations))
}

fn parse_int(s: &str) -> Result<i64> {
    s.parse::<i64>()
        .with_context(|| format!("'{s}' is not an integer"))
}

fn parse_optional_int(s: &str) -> Result<Option<i64>> {
    match s {
        "" | "NA" => Ok(None),
        other => parse_int(other).map(Some),
    }
}

/// `NA`, `NaN` and empty cells all mean "missing" in the PRSA files.
fn parse_optional_f64(s: &str) -> Result<Option<f64>> {
    match s {
        "" | "NA" | "NaN" | "nan" => Ok(None),
        other => other
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("'{other}' is not a number")),
    }
}

fn set_measurement(obs: &mut Observation, col: Column, value: Option<f64>) {
    match col {
        Column::Pm25 => obs.pm25 = value,
        Column::Pm10 => obs.pm10 = value,
        Column::So2 => obs.so2 = value,
        Column::No2 => obs.no2 = value,
        Column::Co => obs.co = value,
        Column::O3 => obs.o3 = value,
        Column::Temp => obs.temp = value,
        Column::Pres => obs.pres = value,
        Column::Dwp => obs.dwp = value,
        Column::Rain => obs.rain = value,
        Column::Wspm => obs.wspm = value,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "year": 2013, "month": 3, "day": 1, "hour": 0,
///     "PM10": 6.0, "PM2.5": 4.0, "NO2": 17.0, ..., "wd": "NNW"
///   },
///   ...
/// ]
/// ```
///
/// Missing measurements are `null` or absent.
#[derive(Debug, Deserialize)]
struct JsonRecord {
    year: i32,
    month: u32,
    day: u32,
    #[serde(default)]
    hour: Option<u32>,
    #[serde(rename = "PM2.5", default)]
    pm25: Option<f64>,
    #[serde(rename = "PM10", default)]
    pm10: Option<f64>,
    #[serde(rename = "SO2", default)]
    so2: Option<f64>,
    #[serde(rename = "NO2", default)]
    no2: Option<f64>,
    #[serde(rename = "CO", default)]
    co: Option<f64>,
    #[serde(rename = "O3", default)]
    o3: Option<f64>,
    #[serde(rename = "TEMP", default)]
    temp: Option<f64>,
    #[serde(rename = "PRES", default)]
    pres: Option<f64>,
    #[serde(rename = "DWP", default)]
    dwp: Option<f64>,
    #[serde(rename = "RAIN", default)]
    rain: Option<f64>,
    #[serde(rename = "WSPM", default)]
    wspm: Option<f64>,
    #[serde(default)]
    wd: Option<String>,
}

impl From<JsonRecord> for Observation {
    fn from(rec: JsonRecord) -> Self {
        Observation {
            year: rec.year,
            month: rec.month,
            day: rec.day,
            hour: rec.hour,
            pm25: rec.pm25,
            pm10: rec.pm10,
            so2: rec.so2,
            no2: rec.no2,
            co: rec.co,
            o3: rec.o3,
            temp: rec.temp,
            pres: rec.pres,
            dwp: rec.dwp,
            rain: rec.rain,
            wspm: rec.wspm,
            wd: rec.wd,
        }
    }
}

fn load_json(path: &Path) -> Result<AirQualityDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    read_json(&text)
}

fn read_json(text: &str) -> Result<AirQualityDataset> {
    let records: Vec<JsonRecord> = serde_json::from_str(text).context("parsing JSON")?;

    let mut observations = Vec::with_capacity(records.len());
    for (row_no, rec) in records.into_iter().enumerate() {
        let obs = Observation::from(rec);
        validate_date(row_no, &obs)?;
        observations.push(obs);
    }
    Ok(AirQualityDataset::from_observations(observations))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per schema field.
///
/// Expected schema: `year`, `month`, `day` as integers, measurement columns
/// as Float64/Float32 (nullable), `wd` as Utf8.  Works with files written by
/// both **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<AirQualityDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut observations = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let required = |name: &str| -> Result<usize> {
            schema
                .index_of(name)
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))
        };

        let year_col = batch.column(required("year")?);
        let month_col = batch.column(required("month")?);
        let day_col = batch.column(required("day")?);
        let wd_col = batch.column(required("wd")?);
        let hour_col = schema.index_of("hour").ok().map(|i| batch.column(i));

        let mut measure_cols = Vec::with_capacity(Column::ALL.len());
        for col in Column::ALL {
            measure_cols.push((col, batch.column(required(col.name())?)));
        }

        for row in 0..batch.num_rows() {
            let mut obs = Observation {
                year: int_value(year_col, row)?
                    .with_context(|| format!("Row {row}: null 'year'"))?
                    as i32,
                month: int_value(month_col, row)?
                    .with_context(|| format!("Row {row}: null 'month'"))?
                    as u32,
                day: int_value(day_col, row)?
                    .with_context(|| format!("Row {row}: null 'day'"))?
                    as u32,
                ..Observation::default()
            };
            if let Some(col) = hour_col {
                obs.hour = int_value(col, row)?.map(|h| h as u32);
            }
            for &(col, array) in &measure_cols {
                let value = float_value(array, row)
                    .with_context(|| format!("Row {row}: column '{col}'"))?;
                set_measurement(&mut obs, col, value);
            }
            obs.wd = string_value(wd_col, row);

            validate_date(row, &obs)?;
            observations.push(obs);
        }
    }

    Ok(AirQualityDataset::from_observations(observations))
}

// -- Parquet / Arrow helpers --

fn int_value(col: &Arc<dyn Array>, row: usize) -> Result<Option<i64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(Some(arr.value(row) as i64))
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(Some(arr.value(row)))
        }
        other => bail!("expected an integer column, got {other:?}"),
    }
}

fn float_value(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Ok(Some(arr.value(row) as f64))
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Ok(Some(arr.value(row)))
        }
        // Integer-typed measurement columns show up in files where a column
        // happens to have no fractional values.
        DataType::Int32 | DataType::Int64 => Ok(int_value(col, row)?.map(|v| v as f64)),
        other => bail!("expected a numeric column, got {other:?}"),
    }
}

fn string_value(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                Some(s.value(row).to_string())
            } else {
                None
            }
        }
        DataType::LargeUtf8 => {
            let s = col.as_string::<i64>();
            Some(s.value(row).to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DWP,RAIN,WSPM,wd";

    fn csv_dataset(body: &str) -> Result<AirQualityDataset> {
        let text = format!("{HEADER}\n{body}");
        read_csv(csv::Reader::from_reader(text.as_bytes()))
    }

    #[test]
    fn parses_a_complete_row() {
        let ds = csv_dataset(
            "2013,3,1,0,4.0,6.0,5.0,17.0,400.0,60.0,-0.5,1025.1,-18.6,0.0,2.1,NNW",
        )
        .unwrap();
        assert_eq!(ds.len(), 1);
        let obs = &ds.observations[0];
        assert_eq!((obs.year, obs.month, obs.day, obs.hour), (2013, 3, 1, Some(0)));
        assert_eq!(obs.pm10, Some(6.0));
        assert_eq!(obs.temp, Some(-0.5));
        assert_eq!(obs.wd.as_deref(), Some("NNW"));
    }

    #[test]
    fn na_cells_become_missing_values() {
        let ds =
            csv_dataset("2013,3,1,1,NA,6.0,NA,17.0,400.0,,-0.5,1025.1,-18.6,0.0,2.1,NA").unwrap();
        let obs = &ds.observations[0];
        assert_eq!(obs.pm25, None);
        assert_eq!(obs.so2, None);
        assert_eq!(obs.o3, None);
        assert_eq!(obs.wd, None);
        assert_eq!(obs.pm10, Some(6.0));
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let text = "year,month,day\n2013,3,1";
        let err = read_csv(csv::Reader::from_reader(text.as_bytes())).unwrap_err();
        assert!(err.to_string().contains("missing 'PM2.5'"), "{err}");
    }

    #[test]
    fn malformed_cell_reports_the_row() {
        let err = csv_dataset("2013,3,1,0,oops,6.0,5.0,17.0,400.0,60.0,-0.5,1025.1,-18.6,0.0,2.1,N")
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Row 0"), "{message}");
        assert!(message.contains("PM2.5"), "{message}");
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        let err = csv_dataset("2013,13,1,0,4.0,6.0,5.0,17.0,400.0,60.0,-0.5,1025.1,-18.6,0.0,2.1,N")
            .unwrap_err();
        assert!(err.to_string().contains("month 13"), "{err}");
    }

    #[test]
    fn json_records_load() {
        let text = r#"[
            {"year": 2013, "month": 3, "day": 1, "hour": 0,
             "PM2.5": 4.0, "PM10": 6.0, "NO2": 17.0, "wd": "NNW"},
            {"year": 2013, "month": 3, "day": 2, "PM10": null}
        ]"#;
        let ds = read_json(text).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.observations[0].pm10, Some(6.0));
        assert_eq!(ds.observations[1].pm10, None);
        assert_eq!(ds.observations[1].hour, None);
        assert_eq!(ds.available_months(2013), vec![3]);
    }
}
