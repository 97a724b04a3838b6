use log::{info, warn};

use xrlink_shared::{RawEvent, RuntimeEvent, SpatialEntityRuntime};

use crate::client::SpatialClient;

impl<R: SpatialEntityRuntime + 'static> SpatialClient<R> {
    /// Decodes one runtime event and routes it to whatever is waiting on it.
    ///
    /// Returns false for events nothing was waiting on: unknown types,
    /// malformed records and completions of unknown requests. None of these
    /// are fatal.
    pub fn dispatch(&mut self, raw: &RawEvent) -> bool {
        let event = match RuntimeEvent::decode(raw) {
            Ok(event) => event,
            Err(error) => {
                warn!("Dropping malformed runtime event: {}", error);
                return false;
            }
        };

        match event {
            RuntimeEvent::SpatialAnchorCreateComplete(event) => {
                self.on_spatial_anchor_created(event)
            }
            RuntimeEvent::SpaceSetStatusComplete(event) => self.on_component_status_set(event),
            RuntimeEvent::SpaceQueryResultsAvailable { request_id } => {
                self.on_query_results_available(request_id)
            }
            RuntimeEvent::SpaceQueryComplete { request_id, result } => {
                self.on_query_complete(request_id, result)
            }
            RuntimeEvent::SpaceSaveComplete(event) => self.on_space_saved(event),
            RuntimeEvent::SpaceEraseComplete(event) => self.on_space_erased(event),
            RuntimeEvent::Unhandled(ty) => {
                info!("Ignoring runtime event of type {}", ty);
                false
            }
        }
    }

    /// Drains the runtime event queue. Returns how many events were handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(raw) = self.runtime.poll_event() {
            if self.dispatch(&raw) {
                handled += 1;
            }
        }
        handled
    }
}
