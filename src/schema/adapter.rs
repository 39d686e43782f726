//! Adapter for converting raw observation records into an observation table
//!
//! This is the ingestion boundary of the engine: records are parsed, checked
//! and shaped into [`Observation`]s here, so the metric algorithms only ever
//! see well-formed rows.

use std::collections::HashSet;

use log::debug;
use serde_json::Value;

use crate::config::ColumnMap;
use crate::error::ComputeError;
use crate::schema::record::*;
use crate::types::{Label, ObservationTable};

/// Adapter for converting raw records to an observation table
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse a JSON string containing an array of records
    pub fn parse_array(json: &str) -> Result<Vec<Value>, ComputeError> {
        let records: Vec<Value> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON) containing one record per line
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<Value>, ComputeError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Convert records to an observation table, preserving record order.
    ///
    /// Fails on the first invalid record.
    pub fn to_table(records: &[Value], columns: &ColumnMap) -> Result<ObservationTable, ComputeError> {
        let mut seen: HashSet<(Label, Label)> = HashSet::with_capacity(records.len());
        let mut rows = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let observation = check_record(record, columns, &mut seen)
                .map_err(|source| ComputeError::InvalidRecord { index, source })?;
            rows.push(observation);
        }

        debug!("ingested {} observation records", rows.len());
        Ok(ObservationTable::new(rows))
    }

    /// Validate a batch of records, reporting every invalid one
    pub fn validate_records(records: &[Value], columns: &ColumnMap) -> Vec<ValidationResult> {
        let mut seen: HashSet<(Label, Label)> = HashSet::with_capacity(records.len());

        records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                check_record(record, columns, &mut seen)
                    .err()
                    .map(|error| ValidationResult {
                        index,
                        individual: record
                            .get(&columns.individual)
                            .filter(|v| !v.is_null())
                            .map(|v| match v {
                                Value::String(s) => s.clone(),
                                other => other.to_string(),
                            }),
                        error,
                    })
            })
            .collect()
    }
}

/// Result of record validation
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub individual: Option<String>,
    pub error: ValidationError,
}

fn check_record(
    record: &Value,
    columns: &ColumnMap,
    seen: &mut HashSet<(Label, Label)>,
) -> Result<crate::types::Observation, ValidationError> {
    let object = record.as_object().ok_or(ValidationError::NotAnObject)?;
    let observation = record_to_observation(object, columns)?;

    let key = (observation.individual.clone(), observation.time.clone());
    if !seen.insert(key) {
        return Err(ValidationError::DuplicateObservation {
            individual: observation.individual.to_string(),
            time: observation.time.to_string(),
        });
    }

    Ok(observation)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_NDJSON: &str = r#"
{"time": 1, "group": "A", "individual": "X", "gcolor": "A", "icolor": "A"}

{"time": 1, "group": "A", "individual": "W", "gcolor": "A", "icolor": "B"}
{"time": 1, "group": "D", "individual": "V", "gcolor": "B", "icolor": "B"}
"#;

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let records = RecordAdapter::parse_ndjson(SAMPLE_NDJSON).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let err = RecordAdapter::parse_ndjson("{\"time\": 1}\n{oops").unwrap_err();
        match err {
            ComputeError::ParseError(msg) => assert!(msg.contains("line 2")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_array() {
        let records = RecordAdapter::parse_array(
            r#"[{"time": 1, "individual": "X"}, {"time": 2, "individual": "X"}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert!(RecordAdapter::parse_array("not json").is_err());
    }

    #[test]
    fn test_to_table_preserves_order() {
        let records = RecordAdapter::parse_ndjson(SAMPLE_NDJSON).unwrap();
        let table = RecordAdapter::to_table(&records, &ColumnMap::default()).unwrap();

        let individuals: Vec<String> = table.iter().map(|o| o.individual.to_string()).collect();
        assert_eq!(individuals, vec!["X", "W", "V"]);
    }

    #[test]
    fn test_to_table_rejects_duplicates() {
        let records = RecordAdapter::parse_array(
            r#"[{"time": 1, "individual": "X"}, {"time": 1, "individual": "X"}]"#,
        )
        .unwrap();
        let err = RecordAdapter::to_table(&records, &ColumnMap::default()).unwrap_err();
        match err {
            ComputeError::InvalidRecord { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(source, ValidationError::DuplicateObservation { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_records_reports_all() {
        let records = RecordAdapter::parse_array(
            r#"[
                {"time": 1, "individual": "X"},
                {"time": 1, "individual": null},
                42,
                {"time": 1, "individual": "X"},
                {"individual": "Y"}
            ]"#,
        )
        .unwrap();

        let results = RecordAdapter::validate_records(&records, &ColumnMap::default());
        let indices: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert_eq!(results[2].individual.as_deref(), Some("X"));
        assert_eq!(results[3].individual.as_deref(), Some("Y"));
        assert_eq!(results[1].error, ValidationError::NotAnObject);
    }
}
