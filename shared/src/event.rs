use uuid::Uuid;

use crate::{
    component::ComponentType,
    error::EventDecodeError,
    result_code::ResultCode,
    storage::StorageLocation,
    types::{RequestId, SpaceHandle},
};

/// Type tag of a polled event record
pub type StructureType = u32;

pub const EVENT_SPATIAL_ANCHOR_CREATE_COMPLETE: StructureType = 1000113006;
pub const EVENT_SPACE_SET_STATUS_COMPLETE: StructureType = 1000113007;
pub const EVENT_SPACE_QUERY_RESULTS_AVAILABLE: StructureType = 1000156003;
pub const EVENT_SPACE_QUERY_COMPLETE: StructureType = 1000156004;
pub const EVENT_SPACE_SAVE_COMPLETE: StructureType = 1000158000;
pub const EVENT_SPACE_ERASE_COMPLETE: StructureType = 1000158001;

/// Untyped event record as the runtime delivers it. Which fields are
/// meaningful depends on `ty`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawEvent {
    pub ty: StructureType,
    pub request_id: Option<RequestId>,
    pub result: ResultCode,
    pub space: Option<SpaceHandle>,
    pub uuid: Option<Uuid>,
    pub component: Option<u32>,
    pub enabled: bool,
    pub location: Option<u32>,
}

impl RawEvent {
    pub fn new(ty: StructureType) -> Self {
        Self {
            ty,
            request_id: None,
            result: ResultCode::SUCCESS,
            space: None,
            uuid: None,
            component: None,
            enabled: false,
            location: None,
        }
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_result(mut self, result: ResultCode) -> Self {
        self.result = result;
        self
    }

    pub fn with_space(mut self, space: SpaceHandle, uuid: Uuid) -> Self {
        self.space = Some(space);
        self.uuid = Some(uuid);
        self
    }

    pub fn with_component(mut self, component: ComponentType, enabled: bool) -> Self {
        self.component = Some(component.to_raw());
        self.enabled = enabled;
        self
    }

    pub fn with_location(mut self, location: StorageLocation) -> Self {
        self.location = Some(location.to_raw());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnchorCreateComplete {
    pub request_id: RequestId,
    pub result: ResultCode,
    pub space: SpaceHandle,
    pub uuid: Uuid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetStatusComplete {
    pub request_id: RequestId,
    pub result: ResultCode,
    pub space: SpaceHandle,
    pub uuid: Uuid,
    /// `None` when the record left it out or used an unknown code
    pub component: Option<ComponentType>,
    pub enabled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageComplete {
    pub request_id: RequestId,
    pub result: ResultCode,
    pub space: SpaceHandle,
    pub uuid: Uuid,
    /// `None` when the record left it out or used an unknown code
    pub location: Option<StorageLocation>,
}

/// Decoded form of a [`RawEvent`].
///
/// Only a missing request id makes a correlated record undecodable. Other
/// payload gaps decode to `None` so the waiting request still completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuntimeEvent {
    SpatialAnchorCreateComplete(AnchorCreateComplete),
    SpaceSetStatusComplete(SetStatusComplete),
    SpaceQueryResultsAvailable {
        request_id: RequestId,
    },
    SpaceQueryComplete {
        request_id: RequestId,
        result: ResultCode,
    },
    SpaceSaveComplete(StorageComplete),
    SpaceEraseComplete(StorageComplete),
    /// Tag this crate does not handle
    Unhandled(StructureType),
}

impl RuntimeEvent {
    pub fn decode(raw: &RawEvent) -> Result<Self, EventDecodeError> {
        let event = match raw.ty {
            EVENT_SPATIAL_ANCHOR_CREATE_COMPLETE => {
                RuntimeEvent::SpatialAnchorCreateComplete(AnchorCreateComplete {
                    request_id: request_id(raw)?,
                    result: raw.result,
                    space: space(raw),
                    uuid: uuid(raw),
                })
            }
            EVENT_SPACE_SET_STATUS_COMPLETE => {
                RuntimeEvent::SpaceSetStatusComplete(SetStatusComplete {
                    request_id: request_id(raw)?,
                    result: raw.result,
                    space: space(raw),
                    uuid: uuid(raw),
                    component: raw.component.and_then(ComponentType::from_raw),
                    enabled: raw.enabled,
                })
            }
            EVENT_SPACE_QUERY_RESULTS_AVAILABLE => RuntimeEvent::SpaceQueryResultsAvailable {
                request_id: request_id(raw)?,
            },
            EVENT_SPACE_QUERY_COMPLETE => RuntimeEvent::SpaceQueryComplete {
                request_id: request_id(raw)?,
                result: raw.result,
            },
            EVENT_SPACE_SAVE_COMPLETE => RuntimeEvent::SpaceSaveComplete(storage(raw)?),
            EVENT_SPACE_ERASE_COMPLETE => RuntimeEvent::SpaceEraseComplete(storage(raw)?),
            other => RuntimeEvent::Unhandled(other),
        };
        Ok(event)
    }

    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            RuntimeEvent::SpatialAnchorCreateComplete(event) => Some(event.request_id),
            RuntimeEvent::SpaceSetStatusComplete(event) => Some(event.request_id),
            RuntimeEvent::SpaceQueryResultsAvailable { request_id }
            | RuntimeEvent::SpaceQueryComplete { request_id, .. } => Some(*request_id),
            RuntimeEvent::SpaceSaveComplete(event) | RuntimeEvent::SpaceEraseComplete(event) => {
                Some(event.request_id)
            }
            RuntimeEvent::Unhandled(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RuntimeEvent::SpatialAnchorCreateComplete(_) => "spatial anchor create complete",
            RuntimeEvent::SpaceSetStatusComplete(_) => "space set status complete",
            RuntimeEvent::SpaceQueryResultsAvailable { .. } => "space query results available",
            RuntimeEvent::SpaceQueryComplete { .. } => "space query complete",
            RuntimeEvent::SpaceSaveComplete(_) => "space save complete",
            RuntimeEvent::SpaceEraseComplete(_) => "space erase complete",
            RuntimeEvent::Unhandled(_) => "unhandled",
        }
    }
}

fn request_id(raw: &RawEvent) -> Result<RequestId, EventDecodeError> {
    raw.request_id
        .ok_or(EventDecodeError::MissingRequestId { ty: raw.ty })
}

// Failed completions may leave the handle and uuid zeroed
fn space(raw: &RawEvent) -> SpaceHandle {
    raw.space.unwrap_or(SpaceHandle::NULL)
}

fn uuid(raw: &RawEvent) -> Uuid {
    raw.uuid.unwrap_or(Uuid::nil())
}

fn storage(raw: &RawEvent) -> Result<StorageComplete, EventDecodeError> {
    Ok(StorageComplete {
        request_id: request_id(raw)?,
        result: raw.result,
        space: space(raw),
        uuid: uuid(raw),
        location: raw.location.and_then(StorageLocation::from_raw),
    })
}
