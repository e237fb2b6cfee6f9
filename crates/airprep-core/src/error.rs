// crates/airprep-core/src/error.rs

use thiserror::Error;

use crate::config::ConfigError;
use crate::object_store::StoreError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Object store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
