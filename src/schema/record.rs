//! Observation record schema
//!
//! Raw records are flat JSON objects. The five logical fields are looked up
//! through a [`ColumnMap`], so the physical column names are free to differ:
//!
//! ```json
//! {"time": 3, "group": "g1", "individual": "zebra-7", "gcolor": "red", "icolor": "blue"}
//! ```
//!
//! `null` and absent columns both mean "no value". Only `time` and
//! `individual` are required.

use serde_json::{Map, Value};

use crate::config::ColumnMap;
use crate::types::{Label, Observation};

/// Input schema identifier
pub const SCHEMA_VERSION: &str = "cohort.observation.v1";

/// A raw, not yet validated observation record
pub type RawRecord = Map<String, Value>;

/// Convert a JSON scalar into a label.
///
/// Returns `Ok(None)` for null. Integral floats such as `3.0` become integers
/// so that the same time step written two ways still compares equal.
pub fn label_from_value(column: &str, value: &Value) -> Result<Option<Label>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(Label::Text(text.clone()))),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(Some(Label::Int(int)));
            }
            match number.as_f64() {
                Some(float)
                    if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 =>
                {
                    Ok(Some(Label::Int(float as i64)))
                }
                _ => Err(ValidationError::UnsupportedValue {
                    column: column.to_string(),
                    value: number.to_string(),
                }),
            }
        }
        other => Err(ValidationError::UnsupportedValue {
            column: column.to_string(),
            value: other.to_string(),
        }),
    }
}

fn optional_label(
    record: &RawRecord,
    column: &str,
) -> Result<Option<Label>, ValidationError> {
    match record.get(column) {
        Some(value) => label_from_value(column, value),
        None => Ok(None),
    }
}

/// Extract an observation from a raw record
pub fn record_to_observation(
    record: &RawRecord,
    columns: &ColumnMap,
) -> Result<Observation, ValidationError> {
    let individual = optional_label(record, &columns.individual)?.ok_or_else(|| {
        ValidationError::MissingIndividual {
            column: columns.individual.clone(),
        }
    })?;
    let time = optional_label(record, &columns.time)?.ok_or_else(|| ValidationError::MissingTime {
        column: columns.time.clone(),
    })?;

    Ok(Observation {
        time,
        group: optional_label(record, &columns.group)?,
        individual,
        gcolor: optional_label(record, &columns.gcolor)?,
        icolor: optional_label(record, &columns.icolor)?,
    })
}

/// Validation errors for observation records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Record is not a JSON object")]
    NotAnObject,

    #[error("Missing individual identifier in column '{column}'")]
    MissingIndividual { column: String },

    #[error("Missing time value in column '{column}'")]
    MissingTime { column: String },

    #[error("Unsupported value {value} in column '{column}'")]
    UnsupportedValue { column: String, value: String },

    #[error("Duplicate observation of individual {individual} at time {time}")]
    DuplicateObservation { individual: String, time: String },
}
