use log::warn;

use xrlink_shared::{
    ComponentType, Operation, RequestCorrelator, SetStatusComplete, SpaceHandle,
    SpatialEntityRuntime, SpatialError, TwoCallEnumerator,
};

use crate::client::SpatialClient;

/// Outcome of a component toggle. Carries the request's own space,
/// component and desired value, so concurrent toggles on one space can be
/// told apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetStatusOutcome {
    pub space: SpaceHandle,
    pub component: ComponentType,
    pub enabled: bool,
    pub result: Result<(), SpatialError>,
}

/// Pending component toggles.
///
/// Callers are expected to keep at most one toggle in flight per
/// (space, component); this is not enforced.
pub struct ComponentStatusController<R> {
    requests: RequestCorrelator<SpatialClient<R>, SetStatusComplete>,
    enumerator: TwoCallEnumerator,
}

impl<R> ComponentStatusController<R> {
    pub fn new() -> Self {
        Self {
            requests: RequestCorrelator::new("space component status"),
            enumerator: TwoCallEnumerator::new("supported components"),
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
    /// Enables or disables `component` on `space`.
    ///
    /// Returns false if the runtime refused the call, in which case
    /// `on_complete` has already run with the failure and nothing is pending.
    pub fn set_component_enabled<F>(
        &mut self,
        space: SpaceHandle,
        component: ComponentType,
        enabled: bool,
        on_complete: F,
    ) -> bool
    where
        F: FnOnce(&mut SpatialClient<R>, SetStatusOutcome) + 'static,
    {
        let timeout = self.config.component_status_timeout;
        match self
            .runtime
            .set_space_component_status(space, component, enabled, timeout)
        {
            Ok(request_id) => {
                let continuation = move |client: &mut SpatialClient<R>, event: SetStatusComplete| {
                    let outcome = client.status_outcome(space, component, enabled, &event);
                    on_complete(client, outcome);
                };
                self.component_status
                    .requests
                    .register(request_id, Box::new(continuation));
                true
            }
            Err(code) => {
                warn!(
                    "Failed to set {} to {} on {}: {}",
                    component, enabled, space, code
                );
                let outcome = SetStatusOutcome {
                    space,
                    component,
                    enabled,
                    result: Err(SpatialError::IssueFailed {
                        operation: Operation::SetComponentStatus,
                        code,
                    }),
                };
                on_complete(self, outcome);
                false
            }
        }
    }

    /// True when `component` is enabled on `space` with no change pending.
    /// A failed status read counts as disabled.
    pub fn is_component_enabled(&self, space: SpaceHandle, component: ComponentType) -> bool {
        match self.runtime.space_component_status(space, component) {
            Ok(status) => status.is_active(),
            Err(code) => {
                warn!("Failed to read {} status of {}: {}", component, space, code);
                false
            }
        }
    }

    pub fn supported_components(
        &mut self,
        space: SpaceHandle,
    ) -> Result<Vec<ComponentType>, SpatialError> {
        let runtime = &mut self.runtime;
        let components = self
            .component_status
            .enumerator
            .enumerate_with(|capacity| runtime.enumerate_space_supported_components(space, capacity))?;
        Ok(components)
    }

    pub(crate) fn on_component_status_set(&mut self, event: SetStatusComplete) -> bool {
        let Some(continuation) = self.component_status.requests.take(event.request_id) else {
            return false;
        };
        continuation(self, event);
        true
    }

    // The outcome echoes what was requested; the record may omit or garble it
    fn status_outcome(
        &mut self,
        space: SpaceHandle,
        component: ComponentType,
        enabled: bool,
        event: &SetStatusComplete,
    ) -> SetStatusOutcome {
        if event.component.is_some_and(|reported| reported != component) {
            warn!(
                "Status completion for request {} reports {:?}, expected {}",
                event.request_id, event.component, component
            );
        }
        let result = if event.result.is_success() {
            self.trackers.set_component_enabled(space, component, enabled);
            Ok(())
        } else {
            Err(SpatialError::RuntimeFailed {
                operation: Operation::SetComponentStatus,
                code: event.result,
            })
        };
        SetStatusOutcome {
            space,
            component,
            enabled,
            result,
        }
    }
}
