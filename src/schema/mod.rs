//! Observation record schema and ingestion
//!
//! This module defines the flat input record format and the adapter that
//! turns a batch of records into an [`ObservationTable`](crate::types::ObservationTable).

mod adapter;
mod record;

pub use adapter::*;
pub use record::*;
