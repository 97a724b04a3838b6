/// In-memory XR runtime for integration testing
/// Implements both runtime traits without any device, and either completes
/// requests on its own (auto) or leaves every event to the test (manual).

use std::collections::{BTreeMap, HashMap, VecDeque};

use uuid::Uuid;

use xrlink_shared::{
    BoundingBox, ComponentStatus, ComponentType, LocationFlags, MeshTrackingState,
    MeshingTrackerHandle, Operation, PersistenceMode, Pose, QueryFilter, RawEvent, RequestId,
    ResultCode, SceneMeshingRuntime, SemanticLabelSet, SnapshotCreation, SnapshotHandle,
    SpaceHandle, SpaceLocation, SpaceQueryInfo, SpaceQueryResult, SpatialEntityRuntime,
    StorageLocation, SubmeshData, SubmeshDataRequest, SubmeshState, XrDuration,
    EVENT_SPACE_ERASE_COMPLETE, EVENT_SPACE_QUERY_COMPLETE, EVENT_SPACE_QUERY_RESULTS_AVAILABLE,
    EVENT_SPACE_SAVE_COMPLETE, EVENT_SPACE_SET_STATUS_COMPLETE,
    EVENT_SPATIAL_ANCHOR_CREATE_COMPLETE,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Accepted requests enqueue their own completion events
    Auto,
    /// Accepted requests only hand out ids; the test pushes events
    Manual,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MockSpace {
    pub uuid: Uuid,
    pub components: BTreeMap<ComponentType, ComponentStatus>,
    pub location: SpaceLocation,
}

impl MockSpace {
    fn is_active(&self, component: ComponentType) -> bool {
        self.components
            .get(&component)
            .map(|status| status.is_active())
            .unwrap_or(false)
    }
}

struct QueuedEvent {
    raw: RawEvent,
    page: Option<Vec<SpaceQueryResult>>,
}

pub struct MockRuntime {
    completion: Completion,
    next_request: u64,
    next_handle: u64,
    events: VecDeque<QueuedEvent>,
    spaces: BTreeMap<SpaceHandle, MockSpace>,
    stored: BTreeMap<Uuid, SpaceHandle>,
    available: HashMap<RequestId, Vec<SpaceQueryResult>>,
    query_page_size: usize,
    issue_failures: HashMap<Operation, VecDeque<ResultCode>>,
    completion_failures: HashMap<Operation, VecDeque<ResultCode>>,
    calls: Vec<Operation>,
    destroyed: Vec<SpaceHandle>,
    last_query: Option<SpaceQueryInfo>,
    meshing: MockMeshing,
}

#[derive(Default)]
struct MockMeshing {
    tracking_state: Option<MeshTrackingState>,
    trackers: Vec<MeshingTrackerHandle>,
    tracker_options: Option<(SemanticLabelSet, bool)>,
    live_snapshots: Vec<SnapshotHandle>,
    submeshes: Vec<SubmeshState>,
    data: HashMap<Uuid, SubmeshData>,
    failing: Vec<Uuid>,
    data_requests: Vec<SubmeshDataRequest>,
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::with_completion(Completion::Auto)
    }

    pub fn manual() -> Self {
        Self::with_completion(Completion::Manual)
    }

    pub fn with_completion(completion: Completion) -> Self {
        Self {
            completion,
            next_request: 0,
            next_handle: 0,
            events: VecDeque::new(),
            spaces: BTreeMap::new(),
            stored: BTreeMap::new(),
            available: HashMap::new(),
            query_page_size: usize::MAX,
            issue_failures: HashMap::new(),
            completion_failures: HashMap::new(),
            calls: Vec::new(),
            destroyed: Vec::new(),
            last_query: None,
            meshing: MockMeshing::default(),
        }
    }

    // Scripting

    /// Adds a space the runtime already knows about, e.g. an anchor persisted
    /// in an earlier session
    pub fn add_space(&mut self, uuid: Uuid, stored: bool, enabled: &[ComponentType]) -> SpaceHandle {
        let handle = self.allocate_handle();
        let mut components = BTreeMap::new();
        for component in [ComponentType::Locatable, ComponentType::Storable] {
            components.insert(component, ComponentStatus::default());
        }
        for component in enabled {
            components.insert(
                *component,
                ComponentStatus {
                    enabled: true,
                    change_pending: false,
                },
            );
        }
        self.spaces.insert(
            handle,
            MockSpace {
                uuid,
                components,
                location: SpaceLocation::new(LocationFlags::TRACKED, Pose::IDENTITY),
            },
        );
        if stored {
            self.stored.insert(uuid, handle);
        }
        handle
    }

    pub fn set_location(&mut self, space: SpaceHandle, location: SpaceLocation) {
        if let Some(mock) = self.spaces.get_mut(&space) {
            mock.location = location;
        }
    }

    /// Splits query results into pages of this size, one results-available
    /// event per page
    pub fn set_query_page_size(&mut self, size: usize) {
        self.query_page_size = size.max(1);
    }

    /// The next call to `operation` fails synchronously with `code`
    pub fn fail_next_issue(&mut self, operation: Operation, code: ResultCode) {
        self.issue_failures
            .entry(operation)
            .or_default()
            .push_back(code);
    }

    /// The next accepted call to `operation` completes with `code`
    pub fn fail_next_completion(&mut self, operation: Operation, code: ResultCode) {
        self.completion_failures
            .entry(operation)
            .or_default()
            .push_back(code);
    }

    pub fn push_event(&mut self, raw: RawEvent) {
        self.events.push_back(QueuedEvent { raw, page: None });
    }

    /// Queues a results-available event; `page` becomes retrievable once
    /// the event is polled
    pub fn push_results_available(&mut self, request_id: RequestId, page: Vec<SpaceQueryResult>) {
        let raw = RawEvent::new(EVENT_SPACE_QUERY_RESULTS_AVAILABLE).with_request_id(request_id);
        self.events.push_back(QueuedEvent {
            raw,
            page: Some(page),
        });
    }

    pub fn push_query_complete(&mut self, request_id: RequestId, result: ResultCode) {
        let raw = RawEvent::new(EVENT_SPACE_QUERY_COMPLETE)
            .with_request_id(request_id)
            .with_result(result);
        self.push_event(raw);
    }

    // Inspection

    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls.iter().filter(|call| **call == operation).count()
    }

    pub fn calls(&self) -> &[Operation] {
        &self.calls
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn last_request_id(&self) -> Option<RequestId> {
        if self.next_request == 0 {
            None
        } else {
            Some(RequestId::new(self.next_request))
        }
    }

    pub fn last_query(&self) -> Option<&SpaceQueryInfo> {
        self.last_query.as_ref()
    }

    pub fn space(&self, space: SpaceHandle) -> Option<&MockSpace> {
        self.spaces.get(&space)
    }

    pub fn space_by_uuid(&self, uuid: &Uuid) -> Option<SpaceHandle> {
        self.spaces
            .iter()
            .find(|(_, mock)| mock.uuid == *uuid)
            .map(|(handle, _)| *handle)
    }

    pub fn is_stored(&self, uuid: &Uuid) -> bool {
        self.stored.contains_key(uuid)
    }

    pub fn destroyed(&self) -> &[SpaceHandle] {
        &self.destroyed
    }

    // Internals

    fn allocate_request(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId::new(self.next_request)
    }

    fn allocate_handle(&mut self) -> SpaceHandle {
        self.next_handle += 1;
        SpaceHandle::new(self.next_handle)
    }

    fn issue(&mut self, operation: Operation) -> Result<RequestId, ResultCode> {
        self.calls.push(operation);
        if let Some(code) = self
            .issue_failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            return Err(code);
        }
        Ok(self.allocate_request())
    }

    fn auto(&self) -> bool {
        self.completion == Completion::Auto
    }

    fn completion_result(&mut self, operation: Operation) -> ResultCode {
        self.completion_failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
            .unwrap_or(ResultCode::SUCCESS)
    }

    fn space_uuid(&self, space: SpaceHandle) -> Result<Uuid, ResultCode> {
        self.spaces
            .get(&space)
            .map(|mock| mock.uuid)
            .ok_or(ResultCode::ERROR_HANDLE_INVALID)
    }

    fn query_matches(&self, filter: &QueryFilter) -> Vec<SpaceQueryResult> {
        let result = |handle: &SpaceHandle| {
            self.spaces
                .get(handle)
                .map(|mock| SpaceQueryResult::new(*handle, mock.uuid))
        };
        match filter {
            QueryFilter::All => self.stored.values().filter_map(result).collect(),
            QueryFilter::ByUuid { uuids, .. } => uuids
                .iter()
                .filter_map(|uuid| self.stored.get(uuid))
                .filter_map(result)
                .collect(),
            QueryFilter::ByComponent { component, .. } => self
                .stored
                .values()
                .filter(|handle| {
                    self.spaces
                        .get(handle)
                        .map(|mock| mock.is_active(*component))
                        .unwrap_or(false)
                })
                .filter_map(result)
                .collect(),
        }
    }
}

fn two_call<T: Clone>(items: &[T], capacity: u32) -> (u32, Vec<T>) {
    let count = u32::try_from(items.len()).unwrap_or(u32::MAX);
    if capacity == 0 {
        return (count, Vec::new());
    }
    (count, items.iter().take(capacity as usize).cloned().collect())
}

impl SpatialEntityRuntime for MockRuntime {
    fn create_spatial_anchor(&mut self, pose: &Pose) -> Result<RequestId, ResultCode> {
        let request_id = self.issue(Operation::CreateSpatialAnchor)?;
        if self.auto() {
            let result = self.completion_result(Operation::CreateSpatialAnchor);
            let mut raw = RawEvent::new(EVENT_SPATIAL_ANCHOR_CREATE_COMPLETE)
                .with_request_id(request_id)
                .with_result(result);
            if result.is_success() {
                let uuid = Uuid::new_v4();
                let space = self.add_space(uuid, false, &[ComponentType::Locatable]);
                self.set_location(space, SpaceLocation::new(LocationFlags::TRACKED, *pose));
                raw = raw.with_space(space, uuid);
            }
            self.push_event(raw);
        }
        Ok(request_id)
    }

    fn set_space_component_status(
        &mut self,
        space: SpaceHandle,
        component: ComponentType,
        enabled: bool,
        _timeout: XrDuration,
    ) -> Result<RequestId, ResultCode> {
        let request_id = self.issue(Operation::SetComponentStatus)?;
        if self.auto() {
            let uuid = self.space_uuid(space)?;
            let result = self.completion_result(Operation::SetComponentStatus);
            if result.is_success() {
                if let Some(mock) = self.spaces.get_mut(&space) {
                    mock.components.insert(
                        component,
                        ComponentStatus {
                            enabled,
                            change_pending: false,
                        },
                    );
                }
            }
            let raw = RawEvent::new(EVENT_SPACE_SET_STATUS_COMPLETE)
                .with_request_id(request_id)
                .with_result(result)
                .with_space(space, uuid)
                .with_component(component, enabled);
            self.push_event(raw);
        }
        Ok(request_id)
    }

    fn space_component_status(
        &self,
        space: SpaceHandle,
        component: ComponentType,
    ) -> Result<ComponentStatus, ResultCode> {
        let mock = self
            .spaces
            .get(&space)
            .ok_or(ResultCode::ERROR_HANDLE_INVALID)?;
        mock.components
            .get(&component)
            .copied()
            .ok_or(ResultCode::ERROR_SPACE_COMPONENT_NOT_SUPPORTED)
    }

    fn enumerate_space_supported_components(
        &mut self,
        space: SpaceHandle,
        capacity: u32,
    ) -> Result<(u32, Vec<ComponentType>), ResultCode> {
        self.calls.push(Operation::EnumerateSupportedComponents);
        let mock = self
            .spaces
            .get(&space)
            .ok_or(ResultCode::ERROR_HANDLE_INVALID)?;
        let components: Vec<ComponentType> = mock.components.keys().copied().collect();
        Ok(two_call(&components, capacity))
    }

    fn query_spaces(&mut self, info: &SpaceQueryInfo) -> Result<RequestId, ResultCode> {
        let request_id = self.issue(Operation::QuerySpaces)?;
        self.last_query = Some(info.clone());
        if self.auto() {
            let result = self.completion_result(Operation::QuerySpaces);
            if result.is_success() {
                let mut matches = self.query_matches(&info.filter);
                matches.truncate(info.max_results as usize);
                let pages: Vec<Vec<SpaceQueryResult>> = matches
                    .chunks(self.query_page_size)
                    .map(<[SpaceQueryResult]>::to_vec)
                    .collect();
                for page in pages {
                    self.push_results_available(request_id, page);
                }
            }
            self.push_query_complete(request_id, result);
        }
        Ok(request_id)
    }

    fn retrieve_space_query_results(
        &mut self,
        request_id: RequestId,
        capacity: u32,
    ) -> Result<(u32, Vec<SpaceQueryResult>), ResultCode> {
        self.calls.push(Operation::RetrieveQueryResults);
        let page = self
            .available
            .get(&request_id)
            .ok_or(ResultCode::ERROR_VALIDATION_FAILURE)?;
        Ok(two_call(page, capacity))
    }

    fn save_space(
        &mut self,
        space: SpaceHandle,
        location: StorageLocation,
        _persistence: PersistenceMode,
    ) -> Result<RequestId, ResultCode> {
        let request_id = self.issue(Operation::SaveSpace)?;
        if self.auto() {
            let uuid = self.space_uuid(space)?;
            let storable = self
                .spaces
                .get(&space)
                .map(|mock| mock.is_active(ComponentType::Storable))
                .unwrap_or(false);
            let mut result = self.completion_result(Operation::SaveSpace);
            if !storable {
                result = ResultCode::ERROR_SPACE_COMPONENT_NOT_ENABLED;
            }
            if result.is_success() {
                self.stored.insert(uuid, space);
            }
            let raw = RawEvent::new(EVENT_SPACE_SAVE_COMPLETE)
                .with_request_id(request_id)
                .with_result(result)
                .with_space(space, uuid)
                .with_location(location);
            self.push_event(raw);
        }
        Ok(request_id)
    }

    fn erase_space(
        &mut self,
        space: SpaceHandle,
        location: StorageLocation,
    ) -> Result<RequestId, ResultCode> {
        let request_id = self.issue(Operation::EraseSpace)?;
        if self.auto() {
            let uuid = self.space_uuid(space)?;
            let storable = self
                .spaces
                .get(&space)
                .map(|mock| mock.is_active(ComponentType::Storable))
                .unwrap_or(false);
            let mut result = self.completion_result(Operation::EraseSpace);
            if !storable {
                result = ResultCode::ERROR_SPACE_COMPONENT_NOT_ENABLED;
            }
            if result.is_success() {
                self.stored.remove(&uuid);
            }
            let raw = RawEvent::new(EVENT_SPACE_ERASE_COMPLETE)
                .with_request_id(request_id)
                .with_result(result)
                .with_space(space, uuid)
                .with_location(location);
            self.push_event(raw);
        }
        Ok(request_id)
    }

    fn locate_space(&self, space: SpaceHandle) -> Result<SpaceLocation, ResultCode> {
        self.spaces
            .get(&space)
            .map(|mock| mock.location)
            .ok_or(ResultCode::ERROR_HANDLE_INVALID)
    }

    fn destroy_space(&mut self, space: SpaceHandle) -> Result<(), ResultCode> {
        self.calls.push(Operation::DestroySpace);
        self.spaces
            .remove(&space)
            .ok_or(ResultCode::ERROR_HANDLE_INVALID)?;
        self.destroyed.push(space);
        Ok(())
    }

    fn poll_event(&mut self) -> Option<RawEvent> {
        let QueuedEvent { raw, page } = self.events.pop_front()?;
        if let (Some(page), Some(request_id)) = (page, raw.request_id) {
            self.available.insert(request_id, page);
        }
        Some(raw)
    }
}

// Scene meshing

impl MockRuntime {
    pub fn set_mesh_tracking_state(&mut self, state: MeshTrackingState) {
        self.meshing.tracking_state = Some(state);
    }

    /// Adds or replaces a submesh. Bump `state.last_updated_time` to make the
    /// next snapshot report it as changed.
    pub fn set_submesh(&mut self, state: SubmeshState, data: SubmeshData) {
        self.meshing.submeshes.retain(|existing| existing.id != state.id);
        self.meshing.submeshes.push(state);
        self.meshing.data.insert(state.id, data);
    }

    pub fn remove_submesh(&mut self, id: &Uuid) {
        self.meshing.submeshes.retain(|existing| existing.id != *id);
        self.meshing.data.remove(id);
    }

    pub fn fail_submesh_data(&mut self, id: Uuid) {
        self.meshing.failing.push(id);
    }

    pub fn clear_submesh_failures(&mut self) {
        self.meshing.failing.clear();
    }

    pub fn live_snapshots(&self) -> usize {
        self.meshing.live_snapshots.len()
    }

    pub fn live_meshing_trackers(&self) -> usize {
        self.meshing.trackers.len()
    }

    pub fn meshing_tracker_options(&self) -> Option<(SemanticLabelSet, bool)> {
        self.meshing.tracker_options
    }

    pub fn submesh_data_requests(&self) -> &[SubmeshDataRequest] {
        &self.meshing.data_requests
    }
}

impl SceneMeshingRuntime for MockRuntime {
    fn create_scene_meshing_tracker(
        &mut self,
        label_set: SemanticLabelSet,
        enable_normals: bool,
    ) -> Result<MeshingTrackerHandle, ResultCode> {
        self.calls.push(Operation::CreateSceneMeshingTracker);
        if let Some(code) = self
            .issue_failures
            .get_mut(&Operation::CreateSceneMeshingTracker)
            .and_then(VecDeque::pop_front)
        {
            return Err(code);
        }
        self.next_handle += 1;
        let tracker = MeshingTrackerHandle::new(self.next_handle);
        self.meshing.trackers.push(tracker);
        self.meshing.tracker_options = Some((label_set, enable_normals));
        Ok(tracker)
    }

    fn destroy_scene_meshing_tracker(&mut self, tracker: MeshingTrackerHandle) {
        self.meshing.trackers.retain(|live| *live != tracker);
    }

    fn create_scene_mesh_snapshot(
        &mut self,
        tracker: MeshingTrackerHandle,
        _bounds: &BoundingBox,
    ) -> Result<SnapshotCreation, ResultCode> {
        self.calls.push(Operation::CreateSceneMeshSnapshot);
        if !self.meshing.trackers.contains(&tracker) {
            return Err(ResultCode::ERROR_HANDLE_INVALID);
        }
        self.next_handle += 1;
        let snapshot = SnapshotHandle::new(self.next_handle);
        self.meshing.live_snapshots.push(snapshot);
        Ok(SnapshotCreation {
            snapshot,
            tracking_state: self
                .meshing
                .tracking_state
                .unwrap_or(MeshTrackingState::Tracking),
        })
    }

    fn destroy_scene_mesh_snapshot(&mut self, snapshot: SnapshotHandle) {
        self.meshing.live_snapshots.retain(|live| *live != snapshot);
    }

    fn submesh_states(
        &mut self,
        snapshot: SnapshotHandle,
        capacity: u32,
    ) -> Result<(u32, Vec<SubmeshState>), ResultCode> {
        self.calls.push(Operation::GetSubmeshStates);
        if !self.meshing.live_snapshots.contains(&snapshot) {
            return Err(ResultCode::ERROR_HANDLE_INVALID);
        }
        Ok(two_call(&self.meshing.submeshes, capacity))
    }

    fn submesh_data(
        &mut self,
        snapshot: SnapshotHandle,
        request: &SubmeshDataRequest,
    ) -> Result<SubmeshData, ResultCode> {
        self.calls.push(Operation::GetSubmeshData);
        self.meshing.data_requests.push(*request);
        if !self.meshing.live_snapshots.contains(&snapshot) {
            return Err(ResultCode::ERROR_HANDLE_INVALID);
        }
        if self.meshing.failing.contains(&request.submesh) {
            return Err(ResultCode::ERROR_RUNTIME_FAILURE);
        }
        let data = self
            .meshing
            .data
            .get(&request.submesh)
            .ok_or(ResultCode::ERROR_VALIDATION_FAILURE)?;

        let mut out = SubmeshData {
            vertex_count: data.vertex_count,
            index_count: data.index_count,
            ..SubmeshData::default()
        };
        if request.vertex_capacity == 0 && request.index_capacity == 0 {
            return Ok(out);
        }
        let vertices = request.vertex_capacity as usize;
        out.positions = data.positions.iter().take(vertices).copied().collect();
        out.indices = data
            .indices
            .iter()
            .take(request.index_capacity as usize)
            .copied()
            .collect();
        if request.normals {
            out.normals = data.normals.iter().take(vertices).copied().collect();
        }
        if request.semantics {
            out.semantics = data.semantics.iter().take(vertices).copied().collect();
        }
        Ok(out)
    }
}
