use log::info;

use xrlink_shared::{SpatialEntityRuntime, Uuid};

use crate::{
    anchor_events::AnchorEvents,
    anchor_tracker::{AnchorTrackers, TrackedAnchor},
    client_config::ClientConfig,
    component_status::ComponentStatusController,
    persistent_anchor::CreateSagas,
    spatial_anchor::AnchorCreationController,
    spatial_query::SpatialQueryEngine,
    storage::StorageController,
};

/// Owns the runtime and every piece of async state talking to it.
///
/// All operations return immediately. Their outcomes are delivered to
/// continuations from [`SpatialClient::tick`], which drains the runtime's
/// event queue, and continuations receive the client itself as `&mut` so they
/// never need to hold on to it.
pub struct SpatialClient<R> {
    pub(crate) config: ClientConfig,
    pub(crate) runtime: R,
    pub(crate) session: u64,
    pub(crate) anchor_creation: AnchorCreationController<R>,
    pub(crate) component_status: ComponentStatusController<R>,
    pub(crate) queries: SpatialQueryEngine<R>,
    pub(crate) storage: StorageController<R>,
    pub(crate) trackers: AnchorTrackers,
    pub(crate) create_sagas: CreateSagas,
    pub(crate) events: AnchorEvents,
}

impl<R: SpatialEntityRuntime + 'static> SpatialClient<R> {
    pub fn new(config: ClientConfig, runtime: R) -> Self {
        Self {
            config,
            runtime,
            session: 0,
            anchor_creation: AnchorCreationController::new(),
            component_status: ComponentStatusController::new(),
            queries: SpatialQueryEngine::new(),
            storage: StorageController::new(),
            trackers: AnchorTrackers::new(),
            create_sagas: CreateSagas::new(),
            events: AnchorEvents::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    /// Drains runtime events, then refreshes the pose of every tracked anchor.
    /// Returns the anchor events produced since the last tick.
    pub fn tick(&mut self) -> AnchorEvents {
        self.process_events();
        self.update_anchor_poses();
        self.take_events()
    }

    pub fn update_anchor_poses(&mut self) {
        self.trackers.update_poses(&self.runtime);
    }

    pub fn take_events(&mut self) -> AnchorEvents {
        std::mem::take(&mut self.events)
    }

    // Anchors

    pub fn anchor(&self, uuid: &Uuid) -> Option<&TrackedAnchor> {
        self.trackers.get(uuid)
    }

    pub fn is_tracked(&self, uuid: &Uuid) -> bool {
        self.trackers.contains(uuid)
    }

    pub fn tracked_anchors(&self) -> Vec<Uuid> {
        self.trackers.uuids()
    }

    /// Stops tracking `uuid` locally. The handle stays alive; destroying it is
    /// up to the caller.
    pub fn untrack_anchor(&mut self, uuid: &Uuid) -> Option<TrackedAnchor> {
        let anchor = self.trackers.untrack(uuid)?;
        info!("Untracked anchor {} ({})", uuid, anchor.name);
        self.events.push_untracked(*uuid, anchor.name.clone());
        Some(anchor)
    }

    // Session

    /// Identifies the current session. Sagas compare it on completion to
    /// detect that the session they started in is gone.
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Untracks every anchor. Requests still in flight complete normally but
    /// no longer register trackers.
    pub fn session_stopping(&mut self) {
        self.session += 1;
        let anchors = self.trackers.drain();
        if !anchors.is_empty() {
            info!("Session stopping, untracking {} anchors", anchors.len());
        }
        for anchor in anchors {
            self.events
                .push_untracked(anchor.record.uuid, anchor.name);
        }
    }

    /// Stops the session and drops every pending continuation unrun.
    ///
    /// Anchor creations caught between steps fail with `SessionEnded` and
    /// their handles are destroyed.
    pub fn shutdown(&mut self) {
        self.session_stopping();
        let dropped = self.anchor_creation.clear()
            + self.component_status.clear()
            + self.queries.clear()
            + self.storage.clear();
        if dropped > 0 {
            info!("Shutdown dropped {} pending requests", dropped);
        }
        self.abort_create_sagas();
    }

    /// Number of requests still waiting on a completion event
    pub fn pending_requests(&self) -> usize {
        self.anchor_creation.pending()
            + self.component_status.pending()
            + self.queries.pending()
            + self.storage.pending()
    }
}
