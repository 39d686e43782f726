//! Run configuration
//!
//! Column remapping for ingestion and the explicit null-handling policy of the
//! `community_size` metric.

use serde::{Deserialize, Serialize};

use crate::error::ComputeError;

/// Logical field → physical column name mapping.
///
/// Every field defaults to its own name, so a partial JSON object only needs
/// to list the columns that differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub time: String,
    pub group: String,
    pub individual: String,
    pub gcolor: String,
    pub icolor: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            time: "time".to_string(),
            group: "group".to_string(),
            individual: "individual".to_string(),
            gcolor: "gcolor".to_string(),
            icolor: "icolor".to_string(),
        }
    }
}

impl ColumnMap {
    /// Logical field names, in schema order
    pub const FIELDS: [&'static str; 5] = ["time", "group", "individual", "gcolor", "icolor"];

    /// Remap one logical field to a physical column name
    pub fn set(&mut self, logical: &str, physical: &str) -> Result<(), ComputeError> {
        let slot = match logical {
            "time" => &mut self.time,
            "group" => &mut self.group,
            "individual" => &mut self.individual,
            "gcolor" => &mut self.gcolor,
            "icolor" => &mut self.icolor,
            other => {
                return Err(ComputeError::ConfigError(format!(
                    "unknown column '{}', expected one of {}",
                    other,
                    Self::FIELDS.join(", ")
                )))
            }
        };
        *slot = physical.to_string();
        Ok(())
    }

    /// Parse a `logical=physical` override
    pub fn apply_override(&mut self, spec: &str) -> Result<(), ComputeError> {
        let (logical, physical) = spec.split_once('=').ok_or_else(|| {
            ComputeError::ConfigError(format!("column override '{spec}' is not logical=physical"))
        })?;
        self.set(logical.trim(), physical.trim())
    }
}

/// How `community_size` treats an observation whose own community color is null
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullCommunityPolicy {
    /// Leave the observation out of the average entirely
    #[default]
    Skip,
    /// Count the observation as a community of size 0
    Zero,
    /// Fail the run with a missing index entry error
    Reject,
}

/// Configuration of a metrics run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Input column names
    pub columns: ColumnMap,
    /// Null community handling for `community_size`
    pub null_community: NullCommunityPolicy,
    /// Evaluate metric columns concurrently
    pub parallel: bool,
}

impl MetricsConfig {
    /// Load configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        serde_json::from_str(json)
            .map_err(|e| ComputeError::ConfigError(format!("invalid configuration: {e}")))
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(ComputeError::JsonError)
    }
}
