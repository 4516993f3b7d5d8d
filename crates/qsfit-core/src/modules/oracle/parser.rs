//! Sweep-record extraction: pulls the parameter axis, frequency axis and the
//! response matrix out of an externally supplied JSON record, trying the
//! accepted field aliases in order.

use crate::domain::{HZ_PER_GHZ, OracleError, OracleResult, SweepDataset};
use serde_json::{Map, Value};

/// Parameter-axis label assumed when the record carries no metadata.
pub const DEFAULT_PARAMETER_FIELD: &str = "Current [A]";
/// Frequency-axis aliases, tried in order.
pub const FREQUENCY_FIELD_ALIASES: [&str; 2] = ["Frequency [Hz]", "frequency"];
/// Response-matrix field.
pub const RESPONSE_FIELD: &str = "data";

/// Extracts a background-subtracted [`SweepDataset`] from a sweep record.
///
/// The last frequency column is treated as a reference trace and subtracted
/// from every row; frequencies are converted to GHz here, at the input
/// boundary.
pub fn extract_dataset(record: &Value) -> OracleResult<SweepDataset> {
    let object = record
        .as_object()
        .ok_or_else(|| OracleError::data_extraction("sweep record must be a JSON object"))?;

    let parameter_field = parameter_field_name(object);
    let parameter_values = f64_sequence(object, &parameter_field)?;

    let frequency_field = FREQUENCY_FIELD_ALIASES
        .iter()
        .find(|alias| object.contains_key(**alias))
        .ok_or_else(|| {
            OracleError::data_extraction(format!(
                "no frequency axis found, tried aliases: {}",
                FREQUENCY_FIELD_ALIASES.join(", ")
            ))
        })?;
    let frequencies_ghz: Vec<f64> = f64_sequence(object, frequency_field)?
        .into_iter()
        .map(|hz| hz / HZ_PER_GHZ)
        .collect();

    let raw = response_matrix(object)?;
    let magnitudes = subtract_reference_column(raw)?;

    SweepDataset::new(parameter_values, frequencies_ghz, magnitudes)
}

fn parameter_field_name(object: &Map<String, Value>) -> String {
    object
        .get("parameter_names")
        .and_then(Value::as_array)
        .and_then(|names| names.first())
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PARAMETER_FIELD)
        .to_owned()
}

fn f64_sequence(object: &Map<String, Value>, field: &str) -> OracleResult<Vec<f64>> {
    let values = object
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| OracleError::data_extraction(format!("missing sequence field '{field}'")))?;
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            value.as_f64().ok_or_else(|| {
                OracleError::data_extraction(format!(
                    "field '{field}' entry {index} is not a number"
                ))
            })
        })
        .collect()
}

fn response_matrix(object: &Map<String, Value>) -> OracleResult<Vec<Vec<f64>>> {
    let rows = object
        .get(RESPONSE_FIELD)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            OracleError::data_extraction(format!("missing response matrix field '{RESPONSE_FIELD}'"))
        })?;
    rows.iter()
        .enumerate()
        .map(|(row_index, row)| {
            let row = row.as_array().ok_or_else(|| {
                OracleError::data_extraction(format!(
                    "response matrix row {row_index} is not an array"
                ))
            })?;
            row.iter()
                .enumerate()
                .map(|(column, value)| {
                    value.as_f64().ok_or_else(|| {
                        OracleError::data_extraction(format!(
                            "response matrix cell [{row_index}][{column}] is not a number"
                        ))
                    })
                })
                .collect()
        })
        .collect()
}

fn subtract_reference_column(raw: Vec<Vec<f64>>) -> OracleResult<Vec<Vec<f64>>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, mut row)| {
            let reference = *row.last().ok_or_else(|| {
                OracleError::data_extraction(format!("response matrix row {index} is empty"))
            })?;
            for value in &mut row {
                *value -= reference;
            }
            Ok(row)
        })
        .collect()
}
