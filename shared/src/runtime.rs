//! The runtime boundary.
//!
//! Every issuing call returns immediately: either a synchronous failure (no
//! [`RequestId`] was handed out, no completion will ever arrive) or a
//! [`RequestId`] whose completion is delivered later through
//! [`SpatialEntityRuntime::poll_event`]. Calls that return variable-length
//! data follow the two-call idiom: invoked with a capacity of zero they only
//! report the required count, invoked with a capacity they fill up to it and
//! report how many items the runtime actually had.

use std::fmt;

use uuid::Uuid;

use crate::{
    component::{ComponentStatus, ComponentType},
    event::RawEvent,
    result_code::ResultCode,
    storage::{PersistenceMode, StorageLocation},
    types::{Pose, RequestId, SpaceHandle, XrDuration},
};

/// Names a runtime call, for error reporting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateSpatialAnchor,
    SetComponentStatus,
    GetComponentStatus,
    EnumerateSupportedComponents,
    QuerySpaces,
    RetrieveQueryResults,
    SaveSpace,
    EraseSpace,
    LocateSpace,
    DestroySpace,
    CreateSceneMeshingTracker,
    CreateSceneMeshSnapshot,
    GetSubmeshStates,
    GetSubmeshData,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateSpatialAnchor => "xrCreateSpatialAnchorFB",
            Operation::SetComponentStatus => "xrSetSpaceComponentStatusFB",
            Operation::GetComponentStatus => "xrGetSpaceComponentStatusFB",
            Operation::EnumerateSupportedComponents => "xrEnumerateSpaceSupportedComponentsFB",
            Operation::QuerySpaces => "xrQuerySpacesFB",
            Operation::RetrieveQueryResults => "xrRetrieveSpaceQueryResultsFB",
            Operation::SaveSpace => "xrSaveSpaceFB",
            Operation::EraseSpace => "xrEraseSpaceFB",
            Operation::LocateSpace => "xrLocateSpace",
            Operation::DestroySpace => "xrDestroySpace",
            Operation::CreateSceneMeshingTracker => "xrCreateSceneMeshingTrackerANDROID",
            Operation::CreateSceneMeshSnapshot => "xrCreateSceneMeshSnapshotANDROID",
            Operation::GetSubmeshStates => "xrGetAllSubmeshStatesANDROID",
            Operation::GetSubmeshData => "xrGetSubmeshDataANDROID",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which spaces a query should return
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryFilter {
    /// Every space the runtime knows about
    All,
    /// Spaces persisted under one of these uuids
    ByUuid {
        uuids: Vec<Uuid>,
        location: StorageLocation,
    },
    /// Spaces that have the given component enabled
    ByComponent {
        component: ComponentType,
        location: StorageLocation,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpaceQueryInfo {
    pub filter: QueryFilter,
    pub max_results: u32,
    pub timeout: XrDuration,
}

impl SpaceQueryInfo {
    pub fn new(filter: QueryFilter, max_results: u32, timeout: XrDuration) -> Self {
        Self {
            filter,
            max_results,
            timeout,
        }
    }
}

/// One entity delivered by a query
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpaceQueryResult {
    pub space: SpaceHandle,
    pub uuid: Uuid,
}

impl SpaceQueryResult {
    pub fn new(space: SpaceHandle, uuid: Uuid) -> Self {
        Self { space, uuid }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocationFlags {
    pub position_valid: bool,
    pub orientation_valid: bool,
    pub position_tracked: bool,
    pub orientation_tracked: bool,
}

impl LocationFlags {
    pub const TRACKED: LocationFlags = LocationFlags {
        position_valid: true,
        orientation_valid: true,
        position_tracked: true,
        orientation_tracked: true,
    };

    pub const VALID: LocationFlags = LocationFlags {
        position_valid: true,
        orientation_valid: true,
        position_tracked: false,
        orientation_tracked: false,
    };

    pub fn is_valid(&self) -> bool {
        self.position_valid && self.orientation_valid
    }

    pub fn is_tracked(&self) -> bool {
        self.position_tracked && self.orientation_tracked
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpaceLocation {
    pub flags: LocationFlags,
    pub pose: Pose,
}

impl SpaceLocation {
    pub fn new(flags: LocationFlags, pose: Pose) -> Self {
        Self { flags, pose }
    }
}

/// Spatial entity calls of an XR runtime
pub trait SpatialEntityRuntime {
    /// Completes with a spatial anchor create event
    fn create_spatial_anchor(&mut self, pose: &Pose) -> Result<RequestId, ResultCode>;

    /// Completes with a set status event
    fn set_space_component_status(
        &mut self,
        space: SpaceHandle,
        component: ComponentType,
        enabled: bool,
        timeout: XrDuration,
    ) -> Result<RequestId, ResultCode>;

    fn space_component_status(
        &self,
        space: SpaceHandle,
        component: ComponentType,
    ) -> Result<ComponentStatus, ResultCode>;

    /// Two-call: returns `(count_output, components)`
    fn enumerate_space_supported_components(
        &mut self,
        space: SpaceHandle,
        capacity: u32,
    ) -> Result<(u32, Vec<ComponentType>), ResultCode>;

    /// Completes with zero or more results-available events followed by one
    /// query complete event, all carrying the same request id
    fn query_spaces(&mut self, info: &SpaceQueryInfo) -> Result<RequestId, ResultCode>;

    /// Two-call: fetches the page made available by the latest results-available event
    fn retrieve_space_query_results(
        &mut self,
        request_id: RequestId,
        capacity: u32,
    ) -> Result<(u32, Vec<SpaceQueryResult>), ResultCode>;

    /// Completes with a save event
    fn save_space(
        &mut self,
        space: SpaceHandle,
        location: StorageLocation,
        persistence: PersistenceMode,
    ) -> Result<RequestId, ResultCode>;

    /// Completes with an erase event
    fn erase_space(
        &mut self,
        space: SpaceHandle,
        location: StorageLocation,
    ) -> Result<RequestId, ResultCode>;

    fn locate_space(&self, space: SpaceHandle) -> Result<SpaceLocation, ResultCode>;

    fn destroy_space(&mut self, space: SpaceHandle) -> Result<(), ResultCode>;

    /// Next pending event, in the order the runtime enqueued them
    fn poll_event(&mut self) -> Option<RawEvent>;
}
