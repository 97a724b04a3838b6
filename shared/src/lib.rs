//! # xrlink Shared
//! Request correlation, event decoding, two-call enumeration and generational
//! diffing shared by the xrlink crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod component;
mod correlator;
mod enumerator;
mod error;
mod event;
mod meshing;
mod result_code;
mod runtime;
mod storage;
mod types;

pub mod diff;

pub use component::{ComponentSet, ComponentStatus, ComponentType};
pub use correlator::{Continuation, RequestCorrelator};
pub use enumerator::TwoCallEnumerator;
pub use error::{EnumerationError, EventDecodeError, SpatialError};
pub use event::{
    AnchorCreateComplete, RawEvent, RuntimeEvent, SetStatusComplete, StorageComplete,
    StructureType, EVENT_SPACE_ERASE_COMPLETE, EVENT_SPACE_QUERY_COMPLETE,
    EVENT_SPACE_QUERY_RESULTS_AVAILABLE, EVENT_SPACE_SAVE_COMPLETE,
    EVENT_SPACE_SET_STATUS_COMPLETE, EVENT_SPATIAL_ANCHOR_CREATE_COMPLETE,
};
pub use meshing::{
    MeshTrackingState, MeshingTrackerHandle, SceneMeshingRuntime, SemanticLabel,
    SemanticLabelSet, SnapshotCreation, SnapshotHandle, SubmeshData, SubmeshDataRequest,
    SubmeshState,
};
pub use result_code::ResultCode;
pub use runtime::{
    LocationFlags, Operation, QueryFilter, SpaceLocation, SpaceQueryInfo, SpaceQueryResult,
    SpatialEntityRuntime,
};
pub use storage::{PersistenceMode, StorageLocation};
pub use types::{
    BoundingBox, Extent3, Pose, Quat, RequestId, SpaceHandle, Vec3, XrDuration, XrTime,
};

pub use uuid::Uuid;
