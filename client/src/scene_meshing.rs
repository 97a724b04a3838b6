use log::{info, warn};

use xrlink_shared::{
    diff::{DiffRecord, GenerationalDiffEngine},
    BoundingBox, MeshTrackingState, MeshingTrackerHandle, Operation, SceneMeshingRuntime,
    SemanticLabel, SemanticLabelSet, SnapshotHandle, SpatialError, SubmeshData,
    SubmeshDataRequest, SubmeshState, TwoCallEnumerator, Uuid, Vec3,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneMeshingConfig {
    /// Label set the tracker classifies vertices with. `None` disables labels.
    pub semantic_label_set: SemanticLabelSet,
    /// Whether the tracker reports per-vertex normals
    pub enable_normals: bool,
}

/// Triangle mesh of one submesh, in the submesh's local space
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmeshGeometry {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub labels: Vec<SemanticLabel>,
    pub indices: Vec<u32>,
}

impl SubmeshGeometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

pub type SubmeshRecord = DiffRecord<SubmeshState, SubmeshGeometry>;

/// Scene mesh tracking, diffed tick over tick
pub struct SceneMeshing {
    tracker: Option<MeshingTrackerHandle>,
    config: SceneMeshingConfig,
    engine: GenerationalDiffEngine<SubmeshState, SubmeshGeometry>,
    enumerator: TwoCallEnumerator,
}

impl Default for SceneMeshing {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneMeshing {
    pub fn new() -> Self {
        Self {
            tracker: None,
            config: SceneMeshingConfig::default(),
            engine: GenerationalDiffEngine::new(),
            enumerator: TwoCallEnumerator::new("submesh states"),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.tracker.is_some()
    }

    pub fn config(&self) -> &SceneMeshingConfig {
        &self.config
    }

    /// Creates the meshing tracker. Re-initializing replaces the previous
    /// tracker and forgets every known submesh.
    pub fn initialize<M: SceneMeshingRuntime>(
        &mut self,
        runtime: &mut M,
        config: SceneMeshingConfig,
    ) -> Result<(), SpatialError> {
        if self.tracker.is_some() {
            warn!("Scene meshing already initialized, replacing its tracker");
            self.shutdown(runtime);
        }
        let tracker = runtime
            .create_scene_meshing_tracker(config.semantic_label_set, config.enable_normals)
            .map_err(|code| SpatialError::CallFailed {
                operation: Operation::CreateSceneMeshingTracker,
                code,
            })?;
        info!("Scene meshing tracker created");
        self.tracker = Some(tracker);
        self.config = config;
        Ok(())
    }

    pub fn shutdown<M: SceneMeshingRuntime>(&mut self, runtime: &mut M) {
        if let Some(tracker) = self.tracker.take() {
            runtime.destroy_scene_meshing_tracker(tracker);
        }
        self.engine.clear();
    }

    /// Takes a snapshot of the submeshes inside `bounds` and diffs it against
    /// the previous one.
    ///
    /// Returns every submesh with its lifecycle for this tick. If no snapshot
    /// could be taken, returns nothing and leaves the known submeshes as they
    /// were.
    pub fn submeshes<M: SceneMeshingRuntime>(
        &mut self,
        runtime: &mut M,
        bounds: &BoundingBox,
    ) -> Vec<&SubmeshRecord> {
        let snapshot = match self.create_snapshot(runtime, bounds) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!("No scene mesh snapshot this tick: {}", error);
                return Vec::new();
            }
        };

        let states = self
            .enumerator
            .enumerate_with(|capacity| runtime.submesh_states(snapshot, capacity));
        let states = match states {
            Ok(states) => states,
            Err(error) => {
                warn!("Failed to read submesh states: {}", error);
                runtime.destroy_scene_mesh_snapshot(snapshot);
                return Vec::new();
            }
        };

        let config = self.config;
        let records = self.engine.diff_tick(states, |state| {
            fetch_submesh_geometry(runtime, snapshot, state.id, &config)
        });
        runtime.destroy_scene_mesh_snapshot(snapshot);
        records
    }

    pub fn submesh(&self, id: &Uuid) -> Option<&SubmeshRecord> {
        self.engine.get(id)
    }

    pub fn submesh_count(&self) -> usize {
        self.engine.len()
    }

    fn create_snapshot<M: SceneMeshingRuntime>(
        &self,
        runtime: &mut M,
        bounds: &BoundingBox,
    ) -> Result<SnapshotHandle, SpatialError> {
        let tracker = self.tracker.ok_or(SpatialError::MeshingUnavailable {
            reason: "not initialized",
        })?;
        let creation = runtime
            .create_scene_mesh_snapshot(tracker, bounds)
            .map_err(|code| SpatialError::CallFailed {
                operation: Operation::CreateSceneMeshSnapshot,
                code,
            })?;
        if creation.tracking_state != MeshTrackingState::Tracking {
            runtime.destroy_scene_mesh_snapshot(creation.snapshot);
            return Err(SpatialError::MeshingUnavailable {
                reason: "tracker is not tracking",
            });
        }
        Ok(creation.snapshot)
    }
}

fn fetch_submesh_geometry<M: SceneMeshingRuntime>(
    runtime: &mut M,
    snapshot: SnapshotHandle,
    submesh: Uuid,
    config: &SceneMeshingConfig,
) -> Result<SubmeshGeometry, SpatialError> {
    let call_failed = |code| SpatialError::CallFailed {
        operation: Operation::GetSubmeshData,
        code,
    };
    let mut request = SubmeshDataRequest {
        submesh,
        vertex_capacity: 0,
        index_capacity: 0,
        normals: config.enable_normals,
        semantics: config.semantic_label_set == SemanticLabelSet::Default,
    };

    let counts = runtime.submesh_data(snapshot, &request).map_err(call_failed)?;
    validate_counts(submesh, &counts)?;

    request.vertex_capacity = counts.vertex_count;
    request.index_capacity = counts.index_count;
    let data = runtime.submesh_data(snapshot, &request).map_err(call_failed)?;
    if data.vertex_count != counts.vertex_count || data.index_count != counts.index_count {
        return Err(SpatialError::InvalidSubmeshData {
            submesh,
            reason: "counts changed between calls",
        });
    }

    Ok(into_geometry(data, &request))
}

fn validate_counts(submesh: Uuid, data: &SubmeshData) -> Result<(), SpatialError> {
    let reason = if data.vertex_count == 0 {
        "no vertices"
    } else if data.index_count == 0 {
        "no indices"
    } else if data.index_count % 3 != 0 {
        "index count is not a multiple of 3"
    } else {
        return Ok(());
    };
    Err(SpatialError::InvalidSubmeshData { submesh, reason })
}

fn into_geometry(data: SubmeshData, request: &SubmeshDataRequest) -> SubmeshGeometry {
    let vertex_count = request.vertex_capacity as usize;
    let index_count = request.index_capacity as usize;

    let mut vertices = data.positions;
    vertices.truncate(vertex_count);
    let mut indices = data.indices;
    indices.truncate(index_count);

    let normals = if request.normals {
        let mut normals = data.normals;
        normals.truncate(vertex_count);
        normals
    } else {
        Vec::new()
    };

    let labels = if request.semantics {
        data.semantics
            .into_iter()
            .take(vertex_count)
            .map(SemanticLabel::from_raw)
            .collect()
    } else {
        Vec::new()
    };

    SubmeshGeometry {
        vertices,
        normals,
        labels,
        indices,
    }
}
