use log::warn;

use xrlink_shared::{
    AnchorCreateComplete, Operation, Pose, RequestCorrelator, SpaceHandle, SpatialEntityRuntime,
    SpatialError, Uuid,
};

use crate::client::SpatialClient;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreatedAnchor {
    pub space: SpaceHandle,
    pub uuid: Uuid,
}

pub type AnchorCreateOutcome = Result<CreatedAnchor, SpatialError>;

pub struct AnchorCreationController<R> {
    requests: RequestCorrelator<SpatialClient<R>, AnchorCreateOutcome>,
}

impl<R> AnchorCreationController<R> {
    pub fn new() -> Self {
        Self {
            requests: RequestCorrelator::new("spatial anchor create"),
        }
    }

    pub fn pending(&self) -> usize {
        self.requests.len()
    }

    pub(crate) fn clear(&mut self) -> usize {
        self.requests.clear()
    }
}

impl<R: SpatialEntityRuntime + 'static> SpatialClient<R> {
    /// Creates a (non-persistent) spatial anchor at `pose`.
    ///
    /// Returns false if the runtime refused the call, in which case
    /// `on_complete` has already run with the failure.
    pub fn create_spatial_anchor<F>(&mut self, pose: &Pose, on_complete: F) -> bool
    where
        F: FnOnce(&mut SpatialClient<R>, AnchorCreateOutcome) + 'static,
    {
        match self.runtime.create_spatial_anchor(pose) {
            Ok(request_id) => {
                self.anchor_creation
                    .requests
                    .register(request_id, Box::new(on_complete));
                true
            }
            Err(code) => {
                warn!("Failed to create spatial anchor: {}", code);
                on_complete(
                    self,
                    Err(SpatialError::IssueFailed {
                        operation: Operation::CreateSpatialAnchor,
                        code,
                    }),
                );
                false
            }
        }
    }

    pub(crate) fn on_spatial_anchor_created(&mut self, event: AnchorCreateComplete) -> bool {
        let Some(on_complete) = self.anchor_creation.requests.take(event.request_id) else {
            return false;
        };
        let outcome = if event.result.is_success() {
            Ok(CreatedAnchor {
                space: event.space,
                uuid: event.uuid,
            })
        } else {
            Err(SpatialError::RuntimeFailed {
                operation: Operation::CreateSpatialAnchor,
                code: event.result,
            })
        };
        on_complete(self, outcome);
        true
    }
}
