use crate::engines::simulation::TemperatureSeries;
use crate::error::{CropError, Result};
use log::warn;
use polars::prelude::*;
use serde::Serialize;
use std::path::Path;

/// Accepted names for the daily mean temperature column, matched case-insensitively
pub const TEMPERATURE_ALIASES: [&str; 5] = ["temperature", "temp", "t", "tavg", "mean_temp"];

/// Summary of a loaded temperature column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureSummary {
    pub file_path: String,
    pub column: String,
    pub days: usize,
    pub filled_nulls: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

pub struct TemperatureCsvConnector;

impl TemperatureCsvConnector {
    /// Load a CSV file into a DataFrame
    pub fn read<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| CropError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Ok(df)
    }

    /// Load the temperature column of a CSV file as a daily series
    pub fn load<P: AsRef<Path>>(path: P, fallback: f64) -> Result<(TemperatureSeries, TemperatureSummary)> {
        let df = Self::read(&path)?;
        let (series, mut summary) = Self::from_frame(&df, fallback)?;
        summary.file_path = path.as_ref().to_string_lossy().to_string();
        Ok((series, summary))
    }

    pub fn from_frame(df: &DataFrame, fallback: f64) -> Result<(TemperatureSeries, TemperatureSummary)> {
        let column_name = Self::find_temperature_column(df).ok_or_else(|| {
            CropError::DataLoading(format!(
                "Missing temperature column (tried aliases: {:?})",
                TEMPERATURE_ALIASES
            ))
        })?;

        let column = df.column(&column_name)?;
        if !matches!(
            column.dtype(),
            DataType::Float64
                | DataType::Float32
                | DataType::Int64
                | DataType::Int32
                | DataType::UInt64
                | DataType::UInt32
        ) {
            return Err(CropError::DataLoading(format!(
                "Column '{}' must be numeric, found {:?}",
                column_name,
                column.dtype()
            )));
        }
        let as_f64 = column.cast(&DataType::Float64)?;
        let filled_nulls = column.null_count();
        if filled_nulls == column.len() {
            return Err(CropError::DataLoading(format!(
                "Temperature column '{}' has no values",
                column_name
            )));
        }
        if filled_nulls > 0 {
            warn!(
                "Filled {} null values in temperature column '{}' with {:.1}",
                filled_nulls, column_name, fallback
            );
        }
        // Nulls keep their slot so later rows stay on their own day
        let values: Vec<f64> = as_f64
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(fallback))
            .collect();

        let summary = TemperatureSummary {
            file_path: String::new(),
            column: column_name,
            days: values.len(),
            filled_nulls,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: values.iter().sum::<f64>() / values.len() as f64,
        };
        let series = TemperatureSeries::new(values, fallback)
            .map_err(|e| CropError::DataLoading(e.to_string()))?;

        Ok((series, summary))
    }

    fn find_temperature_column(df: &DataFrame) -> Option<String> {
        let columns = df.get_column_names();
        TEMPERATURE_ALIASES.iter().find_map(|alias| {
            columns
                .iter()
                .find(|col| col.as_str().trim().eq_ignore_ascii_case(alias))
                .map(|col| col.to_string())
        })
    }
}
