//! Persistent anchor workflows.
//!
//! Each workflow is a chain of continuations, one per runtime round trip.
//! A step only ever captures owned values (the name, the uuid, handles and
//! the session it started in), and looks the tracker registry up again when
//! it runs, so a saga outliving its session finishes harmlessly.
//!
//! Creation:
//! `CreateAnchor → EnableStorable → Save → QueryByUuid → RegisterLocalTracker`.
//! A failing step ends the saga with an [`AnchorCreateFailed`] event, and so
//! does a shutdown that catches the saga between steps.
//!
//! Deletion:
//! `QueryByUuid → StopTracking → EnableStorable (if needed) → Erase`.
//! Deletion is best effort; failures are only logged.
//!
//! [`AnchorCreateFailed`]: crate::AnchorCreateFailed

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use log::{info, warn};

use xrlink_shared::{
    ComponentSet, ComponentType, Pose, QueryFilter, SpaceHandle, SpaceQueryInfo,
    SpaceQueryResult, SpatialEntityRuntime, SpatialError, Uuid,
};

use crate::{
    anchor_tracker::SpatialEntityRecord, client::SpatialClient, spatial_anchor::CreatedAnchor,
    spatial_query::QueryOutcome,
};

/// Step of the creation saga that failed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SagaStep {
    CreateAnchor,
    EnableStorable,
    Save,
    QueryByUuid,
    RegisterLocalTracker,
}

impl fmt::Display for SagaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SagaStep::CreateAnchor => "create anchor",
            SagaStep::EnableStorable => "enable storable",
            SagaStep::Save => "save",
            SagaStep::QueryByUuid => "query by uuid",
            SagaStep::RegisterLocalTracker => "register local tracker",
        };
        f.write_str(name)
    }
}

// State carried from step to step of one creation attempt
struct CreateSaga {
    id: u64,
    name: String,
    session: u64,
    created: Option<CreatedAnchor>,
}

struct InFlightSaga {
    name: String,
    step: SagaStep,
    created: Option<SpaceHandle>,
}

/// Creation sagas that have not reached their terminal event yet, in start
/// order. Lets shutdown fail them and release their handles.
pub(crate) struct CreateSagas {
    next_id: u64,
    in_flight: BTreeMap<u64, InFlightSaga>,
}

impl CreateSagas {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            in_flight: BTreeMap::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.in_flight.len()
    }

    fn start(&mut self, name: &str) -> u64 {
        self.next_id += 1;
        self.in_flight.insert(
            self.next_id,
            InFlightSaga {
                name: name.to_string(),
                step: SagaStep::CreateAnchor,
                created: None,
            },
        );
        self.next_id
    }

    fn advance(&mut self, id: u64, step: SagaStep, created: SpaceHandle) {
        if let Some(saga) = self.in_flight.get_mut(&id) {
            saga.step = step;
            saga.created = Some(created);
        }
    }

    fn finish(&mut self, id: u64) {
        self.in_flight.remove(&id);
    }

    fn drain(&mut self) -> Vec<InFlightSaga> {
        std::mem::take(&mut self.in_flight).into_values().collect()
    }
}

impl<R: SpatialEntityRuntime + 'static> SpatialClient<R> {
    /// Creates an anchor at `pose`, persists it and starts tracking it under
    /// `name`.
    ///
    /// Completion is reported through [`AnchorEvents`](crate::AnchorEvents):
    /// an `AnchorTracked` once the tracker is registered, or an
    /// `AnchorCreateFailed` carrying `name`. Returns false if the very first
    /// step was refused, in which case the failure event is already queued.
    pub fn create_persistent_anchor(&mut self, pose: &Pose, name: impl Into<String>) -> bool {
        let name = name.into();
        let saga = CreateSaga {
            id: self.create_sagas.start(&name),
            name,
            session: self.session,
            created: None,
        };
        info!("Creating persistent anchor {:?}", saga.name);
        self.create_spatial_anchor(pose, move |client, outcome| match outcome {
            Ok(created) => client.create_saga_enable_storable(CreateSaga {
                created: Some(created),
                ..saga
            }),
            Err(error) => client.create_saga_failed(saga, SagaStep::CreateAnchor, error),
        })
    }

    fn create_saga_enable_storable(&mut self, saga: CreateSaga) {
        let Some(created) = saga.created else {
            return;
        };
        self.create_sagas
            .advance(saga.id, SagaStep::EnableStorable, created.space);
        self.set_component_enabled(
            created.space,
            ComponentType::Storable,
            true,
            move |client, outcome| match outcome.result {
                Ok(()) => client.create_saga_save(saga, created),
                Err(error) => client.create_saga_failed(saga, SagaStep::EnableStorable, error),
            },
        );
    }

    fn create_saga_save(&mut self, saga: CreateSaga, created: CreatedAnchor) {
        self.create_sagas
            .advance(saga.id, SagaStep::Save, created.space);
        self.save_space(created.space, move |client, outcome| match outcome.result {
            Ok(stored) => {
                let uuid = if stored.uuid.is_nil() {
                    created.uuid
                } else {
                    stored.uuid
                };
                client.create_saga_query(saga, created, uuid)
            }
            Err(error) => client.create_saga_failed(saga, SagaStep::Save, error),
        });
    }

    fn create_saga_query(&mut self, saga: CreateSaga, created: CreatedAnchor, uuid: Uuid) {
        self.create_sagas
            .advance(saga.id, SagaStep::QueryByUuid, created.space);
        self.query_by_uuid(uuid, move |client, outcome| {
            match single_result(uuid, outcome) {
                Ok(result) => client.create_saga_register(saga, result),
                Err(error) => client.create_saga_failed(saga, SagaStep::QueryByUuid, error),
            }
        });
    }

    fn create_saga_register(&mut self, saga: CreateSaga, result: SpaceQueryResult) {
        self.create_sagas.finish(saga.id);

        // the lookup may hand back a second handle for the same anchor
        if let Some(created) = saga.created {
            if created.space != result.space {
                self.destroy_untracked_space(created.space);
            }
        }

        if saga.session != self.session {
            info!(
                "Session ended while persisting anchor {:?}; it is saved as {} but will not be tracked",
                saga.name, result.uuid
            );
            self.destroy_untracked_space(result.space);
            self.create_saga_failed(saga, SagaStep::RegisterLocalTracker, SpatialError::SessionEnded);
            return;
        }

        let components = self.enabled_components(result.space);
        let record = SpatialEntityRecord::new(result.uuid, result.space, components);
        if self.trackers.track(saga.name.clone(), record) {
            info!("Persistent anchor {:?} created as {}", saga.name, result.uuid);
            self.events.push_tracked(result.uuid, saga.name, true);
        } else {
            self.events.push_create_failed(
                saga.name,
                SagaStep::RegisterLocalTracker,
                SpatialError::AlreadyTracked { uuid: result.uuid },
            );
        }
    }

    fn create_saga_failed(&mut self, saga: CreateSaga, step: SagaStep, error: SpatialError) {
        warn!(
            "Failed to create persistent anchor {:?} at step {}: {}",
            saga.name, step, error
        );
        self.create_sagas.finish(saga.id);
        if step != SagaStep::RegisterLocalTracker {
            if let Some(created) = saga.created {
                self.destroy_untracked_space(created.space);
            }
        }
        self.events.push_create_failed(saga.name, step, error);
    }

    /// Fails every creation saga still between steps with `SessionEnded`,
    /// releasing the handle each one created. Their continuations must
    /// already be dropped.
    pub(crate) fn abort_create_sagas(&mut self) {
        for saga in self.create_sagas.drain() {
            info!(
                "Abandoning persistent anchor {:?} at step {}",
                saga.name, saga.step
            );
            if let Some(space) = saga.created {
                self.destroy_untracked_space(space);
            }
            self.events
                .push_create_failed(saga.name, saga.step, SpatialError::SessionEnded);
        }
    }

    /// Creation sagas that have not finished yet
    pub fn anchors_being_created(&self) -> usize {
        self.create_sagas.len()
    }

    /// Untracks and erases the anchor persisted as `uuid`. Fire-and-forget:
    /// success is reported with an `ErasedEvent`, failures are only logged.
    pub fn delete_persistent_anchor(&mut self, uuid: Uuid) {
        info!("Deleting persistent anchor {}", uuid);
        self.query_by_uuid(uuid, move |client, outcome| {
            let result = match single_result(uuid, outcome) {
                Ok(result) => result,
                Err(error) => {
                    warn!("Could not find anchor {} to delete: {}", uuid, error);
                    return;
                }
            };
            if let Some(anchor) = client.untrack_anchor(&uuid) {
                if anchor.record.space != result.space {
                    client.destroy_untracked_space(anchor.record.space);
                }
            }
            client.erase_storable(result);
        });
    }

    /// Loads persisted anchors and tracks each one under its name.
    ///
    /// Requested anchors that are not found emit `LoadFailedEvent`. With
    /// `erase_unknown`, every stored anchor that was not requested is erased.
    pub fn load_anchors(&mut self, anchors: HashMap<Uuid, String>, erase_unknown: bool) -> bool {
        let query = &self.config.query;
        let info = if erase_unknown {
            SpaceQueryInfo::new(QueryFilter::All, query.erase_unknown_max_results, query.timeout)
        } else {
            let uuids: Vec<Uuid> = anchors.keys().copied().collect();
            let max_results = u32::try_from(uuids.len()).unwrap_or(u32::MAX);
            let filter = QueryFilter::ByUuid {
                uuids,
                location: self.config.storage_location,
            };
            SpaceQueryInfo::new(filter, max_results, query.timeout)
        };
        let session = self.session;
        self.query_with_info(info, move |client, outcome| {
            client.on_anchors_loaded(outcome, anchors, erase_unknown, session)
        })
    }

    fn on_anchors_loaded(
        &mut self,
        outcome: QueryOutcome,
        mut expected: HashMap<Uuid, String>,
        erase_unknown: bool,
        session: u64,
    ) {
        let results = match outcome {
            Ok(results) => results,
            Err(error) => {
                warn!("Failed to load {} anchors: {}", expected.len(), error);
                for (uuid, name) in expected {
                    self.events.push_load_failed(uuid, name, Some(error.clone()));
                }
                return;
            }
        };

        for result in results {
            if let Some(name) = expected.remove(&result.uuid) {
                self.track_loaded_anchor(result, name, session);
            } else if erase_unknown {
                info!("Erasing unknown anchor {}", result.uuid);
                self.erase_storable(result);
            } else {
                self.release_queried_space(result.space);
            }
        }

        for (uuid, name) in expected {
            warn!("Could not load anchor {} ({})", uuid, name);
            self.events.push_load_failed(uuid, name, None);
        }
    }

    fn track_loaded_anchor(&mut self, result: SpaceQueryResult, name: String, session: u64) {
        if self.is_component_enabled(result.space, ComponentType::Locatable) {
            self.register_loaded_anchor(result, name, session);
            return;
        }
        self.set_component_enabled(
            result.space,
            ComponentType::Locatable,
            true,
            move |client, outcome| match outcome.result {
                Ok(()) => client.register_loaded_anchor(result, name, session),
                Err(error) => {
                    warn!("Failed to make anchor {} locatable: {}", result.uuid, error);
                    client.release_queried_space(result.space);
                    client.events.push_load_failed(result.uuid, name, Some(error));
                }
            },
        );
    }

    fn register_loaded_anchor(&mut self, result: SpaceQueryResult, name: String, session: u64) {
        if session != self.session {
            info!(
                "Session ended while loading anchor {} ({}), not tracking it",
                result.uuid, name
            );
            self.release_queried_space(result.space);
            return;
        }
        let components = self.enabled_components(result.space);
        let record = SpatialEntityRecord::new(result.uuid, result.space, components);
        if self.trackers.track(name.clone(), record) {
            self.events.push_tracked(result.uuid, name, false);
        } else {
            self.release_queried_space(result.space);
        }
    }

    // Erase requires the storable component; enable it first when missing
    fn erase_storable(&mut self, result: SpaceQueryResult) {
        if self.is_component_enabled(result.space, ComponentType::Storable) {
            self.erase_found_anchor(result);
            return;
        }
        self.set_component_enabled(
            result.space,
            ComponentType::Storable,
            true,
            move |client, outcome| match outcome.result {
                Ok(()) => client.erase_found_anchor(result),
                Err(error) => {
                    warn!(
                        "Failed to make anchor {} storable, not erasing it: {}",
                        result.uuid, error
                    );
                    client.release_queried_space(result.space);
                }
            },
        );
    }

    fn erase_found_anchor(&mut self, result: SpaceQueryResult) {
        self.erase_space(result.space, move |client, outcome| {
            match outcome.result {
                Ok(_) => {
                    info!("Erased anchor {}", result.uuid);
                    client.events.push_erased(result.uuid);
                }
                Err(error) => warn!("Failed to erase anchor {}: {}", result.uuid, error),
            }
            client.release_queried_space(result.space);
        });
    }

    fn enabled_components(&self, space: SpaceHandle) -> ComponentSet {
        ComponentType::ALL
            .iter()
            .copied()
            .filter(|component| self.is_component_status_active(space, *component))
            .collect()
    }

    // like `is_component_enabled`, without logging components the space lacks
    fn is_component_status_active(&self, space: SpaceHandle, component: ComponentType) -> bool {
        self.runtime
            .space_component_status(space, component)
            .map(|status| status.is_active())
            .unwrap_or(false)
    }

    // lookup handles are ours to release unless a tracker took them over
    fn release_queried_space(&mut self, space: SpaceHandle) {
        if !self.trackers.contains_space(space) {
            self.destroy_untracked_space(space);
        }
    }

    fn destroy_untracked_space(&mut self, space: SpaceHandle) {
        if let Err(code) = self.runtime.destroy_space(space) {
            warn!("Failed to destroy {}: {}", space, code);
        }
    }
}

fn single_result(uuid: Uuid, outcome: QueryOutcome) -> Result<SpaceQueryResult, SpatialError> {
    let results = outcome?;
    match results.as_slice() {
        [result] => Ok(*result),
        _ => Err(SpatialError::AnchorNotFound {
            uuid,
            found: results.len(),
        }),
    }
}
