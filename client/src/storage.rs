use log::warn;

use xrlink_shared::{
    Operation, RequestCorrelator, SpaceHandle, SpatialEntityRuntime, SpatialError,
    StorageComplete, StorageLocation, Uuid,
};

use crate::client::SpatialClient;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoredSpace {
    pub space: SpaceHandle,
    pub uuid: Uuid,
}

/// Outcome of a save or erase. `location` is the one the request was issued
/// for, so it is known even when the call failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageOutcome {
    pub space: SpaceHandle,
    pub location: StorageLocation,
    pub result: Result<StoredSpace, SpatialError>,
}

type StorageCorrelator<R> = RequestCorrelator<SpatialClient<R>, StorageComplete>;

pub struct StorageController<R> {
    saves: StorageCorrelator<R>,
    erases: StorageCorrelator<R>,
}

impl<R> StorageController<R> {
    pub fn new() -> Self {
        Self {
            saves: RequestCorrelator::new("space save"),
            erases: RequestCorrelator::new("space erase"),
        }
    }

    pub fn pending(&self) -> usize {
        self.saves.len() + self.erases.len()
    }

    pub(crate) fn clear(&mut self) -> usize {
        self.saves.clear() + self.erases.clear()
    }
}

impl<R: SpatialEntityRuntime + 'static> SpatialClient<R> {
    /// Persists `space` at the configured storage location
    pub fn save_space<F>(&mut self, space: SpaceHandle, on_complete: F) -> bool
    where
        F: FnOnce(&mut SpatialClient<R>, StorageOutcome) + 'static,
    {
        let location = self.config.storage_location;
        let persistence = self.config.persistence_mode;
        match self.runtime.save_space(space, location, persistence) {
            Ok(request_id) => {
                let continuation = move |client: &mut SpatialClient<R>, event: StorageComplete| {
                    on_complete(client, storage_outcome(event, Operation::SaveSpace, space, location));
                };
                self.storage.saves.register(request_id, Box::new(continuation));
                true
            }
            Err(code) => {
                warn!("Failed to save {}: {}", space, code);
                let outcome = StorageOutcome {
                    space,
                    location,
                    result: Err(SpatialError::IssueFailed {
                        operation: Operation::SaveSpace,
                        code,
                    }),
                };
                on_complete(self, outcome);
                false
            }
        }
    }

    /// Erases `space` from the configured storage location. The space must
    /// have the storable component enabled.
    pub fn erase_space<F>(&mut self, space: SpaceHandle, on_complete: F) -> bool
    where
        F: FnOnce(&mut SpatialClient<R>, StorageOutcome) + 'static,
    {
        let location = self.config.storage_location;
        match self.runtime.erase_space(space, location) {
            Ok(request_id) => {
                let continuation = move |client: &mut SpatialClient<R>, event: StorageComplete| {
                    on_complete(client, storage_outcome(event, Operation::EraseSpace, space, location));
                };
                self.storage.erases.register(request_id, Box::new(continuation));
                true
            }
            Err(code) => {
                warn!("Failed to erase {}: {}", space, code);
                let outcome = StorageOutcome {
                    space,
                    location,
                    result: Err(SpatialError::IssueFailed {
                        operation: Operation::EraseSpace,
                        code,
                    }),
                };
                on_complete(self, outcome);
                false
            }
        }
    }

    pub(crate) fn on_space_saved(&mut self, event: StorageComplete) -> bool {
        let Some(continuation) = self.storage.saves.take(event.request_id) else {
            return false;
        };
        continuation(self, event);
        true
    }

    pub(crate) fn on_space_erased(&mut self, event: StorageComplete) -> bool {
        let Some(continuation) = self.storage.erases.take(event.request_id) else {
            return false;
        };
        continuation(self, event);
        true
    }
}

// The requested space and location win over what the record reports
fn storage_outcome(
    event: StorageComplete,
    operation: Operation,
    space: SpaceHandle,
    location: StorageLocation,
) -> StorageOutcome {
    if event.location.is_some_and(|reported| reported != location) {
        warn!(
            "{} completion for request {} reports location {:?}, expected {:?}",
            operation, event.request_id, event.location, location
        );
    }
    let result = if event.result.is_success() {
        Ok(StoredSpace {
            space,
            uuid: event.uuid,
        })
    } else {
        Err(SpatialError::RuntimeFailed {
            operation,
            code: event.result,
        })
    };
    StorageOutcome {
        space,
        location,
        result,
    }
}
