//! Application-wide state and error types for walkly

mod activity;

pub use activity::*;

use thiserror_no_std::Error;

use crate::source::{AuthorizationStatus, SourceError};
use crate::storage::StoreError;

/// Why a refresh did not update the displayed data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Health data access not granted ({0:?})")]
    Unauthorized(AuthorizationStatus),
    #[error("{0}")]
    Source(SourceError),
    #[error("{0}")]
    Store(StoreError),
    /// The selected period changed while the request was in flight
    #[error("Refresh superseded by a newer request")]
    Superseded,
}

impl From<SourceError> for PipelineError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

impl From<StoreError> for PipelineError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
