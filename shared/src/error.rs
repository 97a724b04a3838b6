use thiserror::Error;
use uuid::Uuid;

use crate::{event::StructureType, result_code::ResultCode, runtime::Operation};

/// Errors produced by the two-call enumeration idiom
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumerationError {
    /// The sizing call (capacity zero) failed
    #[error("{label}: count call failed with {code}")]
    CountFailed {
        label: &'static str,
        code: ResultCode,
    },

    /// The fill call failed
    #[error("{label}: fill call with capacity {capacity} failed with {code}")]
    FillFailed {
        label: &'static str,
        capacity: u32,
        code: ResultCode,
    },
}

/// Errors raised while decoding a polled event record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventDecodeError {
    /// A correlated event arrived without its request id
    #[error("Event {ty} is missing its request id")]
    MissingRequestId { ty: StructureType },
}

/// Terminal failure of a spatial operation, delivered exactly once through
/// the operation's continuation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpatialError {
    /// The runtime refused the call synchronously; no request was registered
    #[error("{operation} could not be issued: {code}")]
    IssueFailed {
        operation: Operation,
        code: ResultCode,
    },

    /// The runtime accepted the call but reported failure on completion
    #[error("{operation} completed with failure: {code}")]
    RuntimeFailed {
        operation: Operation,
        code: ResultCode,
    },

    /// A synchronous runtime call failed
    #[error("{operation} failed: {code}")]
    CallFailed {
        operation: Operation,
        code: ResultCode,
    },

    #[error(transparent)]
    Enumeration(#[from] EnumerationError),

    /// A lookup by uuid did not return exactly one space
    #[error("Query for anchor {uuid} matched {found} spaces, expected exactly one")]
    AnchorNotFound { uuid: Uuid, found: usize },

    /// The anchor is already registered with a local tracker
    #[error("Anchor {uuid} is already tracked")]
    AlreadyTracked { uuid: Uuid },

    /// The session stopped while the operation was in flight
    #[error("Session ended before the operation could complete")]
    SessionEnded,

    /// The runtime reported geometry that cannot form a triangle mesh
    #[error("Submesh {submesh} has invalid geometry: {reason}")]
    InvalidSubmeshData {
        submesh: Uuid,
        reason: &'static str,
    },

    /// Scene meshing has no tracker, or the tracker is not tracking
    #[error("Scene meshing unavailable: {reason}")]
    MeshingUnavailable { reason: &'static str },
}

impl SpatialError {
    /// The runtime code behind this error, if there is one
    pub fn code(&self) -> Option<ResultCode> {
        match self {
            SpatialError::IssueFailed { code, .. }
            | SpatialError::RuntimeFailed { code, .. }
            | SpatialError::CallFailed { code, .. } => Some(*code),
            SpatialError::Enumeration(EnumerationError::CountFailed { code, .. })
            | SpatialError::Enumeration(EnumerationError::FillFailed { code, .. }) => Some(*code),
            _ => None,
        }
    }
}
