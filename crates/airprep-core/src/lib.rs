pub mod anomaly;
pub mod cleaning;
pub mod config;
pub mod consolidation;
pub mod error;
pub mod ingestion;
pub mod object_store;
pub mod outputs;
pub mod pipelines;
pub mod readings;
pub mod validation;
