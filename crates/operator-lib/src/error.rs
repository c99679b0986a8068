//! Error types for the reconcile loop and its collaborators

use crate::models::WorkloadRef;
use std::fmt;
use thiserror::Error;

/// Failure reported by the resource store or the workload runtime
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The object does not exist (or was deleted concurrently)
    #[error("{0} not found")]
    NotFound(String),

    /// Any other failure talking to the API server
    #[error("request failed: {0}")]
    Request(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<kube::Error> for StoreError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) if response.code == 404 => {
                StoreError::NotFound(response.message)
            }
            other => StoreError::Request(other.to_string()),
        }
    }
}

/// Why scaling a single workload failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleErrorKind {
    /// The referenced workload does not exist
    NotFound,
    /// The workload could not be read
    ReadFailed,
    /// The replica write was rejected or did not reach the runtime
    UpdateFailed,
}

impl fmt::Display for ScaleErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleErrorKind::NotFound => f.write_str("workload not found"),
            ScaleErrorKind::ReadFailed => f.write_str("unable to fetch workload"),
            ScaleErrorKind::UpdateFailed => f.write_str("unable to update workload"),
        }
    }
}

/// Failure to drive one workload to the target replica count
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} {workload}: {cause}")]
pub struct ScaleError {
    pub workload: WorkloadRef,
    pub kind: ScaleErrorKind,
    pub cause: StoreError,
}

impl ScaleError {
    pub fn new(workload: WorkloadRef, kind: ScaleErrorKind, cause: StoreError) -> Self {
        Self {
            workload,
            kind,
            cause,
        }
    }
}

/// Error class surfaced to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ResourceNotFound,
    ReadError,
    WriteError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ResourceNotFound => "resource_not_found",
            ErrorKind::ReadError => "read_error",
            ErrorKind::WriteError => "write_error",
        }
    }
}

/// Error returned by a reconcile cycle; the dispatcher retries with backoff
#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    /// The monitor could not be read for a reason other than absence
    #[error("unable to fetch monitor {monitor}: {cause}")]
    MonitorRead { monitor: String, cause: StoreError },

    /// A managed workload failed; remaining workloads were not examined
    #[error(transparent)]
    Scale(#[from] ScaleError),
}

impl ReconcileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::MonitorRead { .. } => ErrorKind::ReadError,
            ReconcileError::Scale(err) => match err.kind {
                ScaleErrorKind::NotFound => ErrorKind::ResourceNotFound,
                ScaleErrorKind::ReadFailed => ErrorKind::ReadError,
                ScaleErrorKind::UpdateFailed => ErrorKind::WriteError,
            },
        }
    }
}
