use uuid::Uuid;

use crate::{
    diff::SnapshotEntry,
    result_code::ResultCode,
    types::{BoundingBox, Extent3, Pose, Vec3, XrTime},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshingTrackerHandle(u64);

impl MeshingTrackerHandle {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotHandle(u64);

impl SnapshotHandle {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SemanticLabelSet {
    None,
    #[default]
    Default,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SemanticLabel {
    Other,
    Floor,
    Ceiling,
    Wall,
    Table,
}

impl SemanticLabel {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => SemanticLabel::Floor,
            2 => SemanticLabel::Ceiling,
            3 => SemanticLabel::Wall,
            4 => SemanticLabel::Table,
            _ => SemanticLabel::Other,
        }
    }

    pub fn to_raw(self) -> u8 {
        match self {
            SemanticLabel::Other => 0,
            SemanticLabel::Floor => 1,
            SemanticLabel::Ceiling => 2,
            SemanticLabel::Wall => 3,
            SemanticLabel::Table => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshTrackingState {
    Initializing,
    Tracking,
    Waiting,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotCreation {
    pub snapshot: SnapshotHandle,
    pub tracking_state: MeshTrackingState,
}

/// Per-submesh entry of a snapshot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubmeshState {
    pub id: Uuid,
    pub last_updated_time: XrTime,
    pub pose: Pose,
    pub bounds: Extent3,
}

impl SubmeshState {
    pub fn new(id: Uuid, last_updated_time: XrTime) -> Self {
        Self {
            id,
            last_updated_time,
            pose: Pose::IDENTITY,
            bounds: Extent3::default(),
        }
    }
}

impl SnapshotEntry for SubmeshState {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }

    fn last_update_time(&self) -> XrTime {
        self.last_updated_time
    }
}

/// What to fetch in a submesh data call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmeshDataRequest {
    pub submesh: Uuid,
    pub vertex_capacity: u32,
    pub index_capacity: u32,
    pub normals: bool,
    pub semantics: bool,
}

/// Result of a submesh data call. Buffers are only filled when the request
/// carried non-zero capacities; counts are always reported.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmeshData {
    pub vertex_count: u32,
    pub index_count: u32,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub semantics: Vec<u8>,
    pub indices: Vec<u32>,
}

/// Scene meshing calls of an XR runtime
pub trait SceneMeshingRuntime {
    fn create_scene_meshing_tracker(
        &mut self,
        label_set: SemanticLabelSet,
        enable_normals: bool,
    ) -> Result<MeshingTrackerHandle, ResultCode>;

    fn destroy_scene_meshing_tracker(&mut self, tracker: MeshingTrackerHandle);

    fn create_scene_mesh_snapshot(
        &mut self,
        tracker: MeshingTrackerHandle,
        bounds: &BoundingBox,
    ) -> Result<SnapshotCreation, ResultCode>;

    fn destroy_scene_mesh_snapshot(&mut self, snapshot: SnapshotHandle);

    /// Two-call: returns `(count_output, states)`
    fn submesh_states(
        &mut self,
        snapshot: SnapshotHandle,
        capacity: u32,
    ) -> Result<(u32, Vec<SubmeshState>), ResultCode>;

    /// Two-call over vertex and index counts
    fn submesh_data(
        &mut self,
        snapshot: SnapshotHandle,
        request: &SubmeshDataRequest,
    ) -> Result<SubmeshData, ResultCode>;
}
