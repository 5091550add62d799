//! Engine-level errors.

use crate::data::DataError;
use crate::domain::UniverseError;
use crate::engine::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("invalid universe: {0}")]
    InvalidUniverse(#[from] UniverseError),

    #[error("data fetch failed for '{symbol}': {source}")]
    Data {
        symbol: String,
        #[source]
        source: DataError,
    },

    #[error("malformed intent from '{strategy}' on {date}: {detail}")]
    MalformedIntent { strategy: String, date: chrono::NaiveDate, detail: String },
}
