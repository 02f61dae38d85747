// Service errors - what a use case can fail with, independent of transport
use crate::domain::filter::FilterError;
use crate::domain::measures::MeasureIdError;
use crate::domain::units::UnitParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("snapshot '{0}' not found")]
    SnapshotNotFound(String),
    #[error("snapshot '{snapshot_id}' has no value for '{measure_id}'")]
    MeasureNotRecorded {
        snapshot_id: String,
        measure_id: String,
    },
    #[error(transparent)]
    Measure(#[from] MeasureIdError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Unit(#[from] UnitParseError),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

impl ServiceError {
    /// Unknown ids the caller asked for, as opposed to malformed input.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::SnapshotNotFound(_)
                | ServiceError::MeasureNotRecorded { .. }
                | ServiceError::Measure(MeasureIdError::UnknownMeasure(_))
                | ServiceError::Filter(FilterError::Measure(MeasureIdError::UnknownMeasure(_)))
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
