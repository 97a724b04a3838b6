use std::vec::IntoIter;

use xrlink_shared::{SpatialError, Uuid};

use crate::persistent_anchor::SagaStep;

/// An anchor became tracked. `is_new` is true when it was created in this
/// session rather than loaded from storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorTracked {
    pub uuid: Uuid,
    pub name: String,
    pub is_new: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorUntracked {
    pub uuid: Uuid,
    pub name: String,
}

/// Terminal failure of a persistent anchor creation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorCreateFailed {
    pub name: String,
    pub step: SagaStep,
    pub error: SpatialError,
}

/// A requested anchor could not be loaded. `error` is `None` when the query
/// succeeded but did not return the anchor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorLoadFailed {
    pub uuid: Uuid,
    pub name: String,
    pub error: Option<SpatialError>,
}

pub struct AnchorEvents {
    tracked: Vec<AnchorTracked>,
    untracked: Vec<AnchorUntracked>,
    create_failed: Vec<AnchorCreateFailed>,
    load_failed: Vec<AnchorLoadFailed>,
    erased: Vec<Uuid>,
    empty: bool,
}

impl Default for AnchorEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AnchorEvents {
    pub(crate) fn new() -> Self {
        Self {
            tracked: Vec::new(),
            untracked: Vec::new(),
            create_failed: Vec::new(),
            load_failed: Vec::new(),
            erased: Vec::new(),
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: AnchorEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: AnchorEvent>(&self) -> bool {
        V::has(self)
    }

    pub(crate) fn push_tracked(&mut self, uuid: Uuid, name: String, is_new: bool) {
        self.tracked.push(AnchorTracked { uuid, name, is_new });
        self.empty = false;
    }

    pub(crate) fn push_untracked(&mut self, uuid: Uuid, name: String) {
        self.untracked.push(AnchorUntracked { uuid, name });
        self.empty = false;
    }

    pub(crate) fn push_create_failed(&mut self, name: String, step: SagaStep, error: SpatialError) {
        self.create_failed
            .push(AnchorCreateFailed { name, step, error });
        self.empty = false;
    }

    pub(crate) fn push_load_failed(&mut self, uuid: Uuid, name: String, error: Option<SpatialError>) {
        self.load_failed.push(AnchorLoadFailed { uuid, name, error });
        self.empty = false;
    }

    pub(crate) fn push_erased(&mut self, uuid: Uuid) {
        self.erased.push(uuid);
        self.empty = false;
    }
}

// Event Trait
pub trait AnchorEvent {
    type Iter;

    fn iter(events: &mut AnchorEvents) -> Self::Iter;

    fn has(events: &AnchorEvents) -> bool;
}

// Tracked Event
pub struct TrackedEvent;
impl AnchorEvent for TrackedEvent {
    type Iter = IntoIter<AnchorTracked>;

    fn iter(events: &mut AnchorEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.tracked);
        IntoIterator::into_iter(list)
    }

    fn has(events: &AnchorEvents) -> bool {
        !events.tracked.is_empty()
    }
}

// Untracked Event
pub struct UntrackedEvent;
impl AnchorEvent for UntrackedEvent {
    type Iter = IntoIter<AnchorUntracked>;

    fn iter(events: &mut AnchorEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.untracked);
        IntoIterator::into_iter(list)
    }

    fn has(events: &AnchorEvents) -> bool {
        !events.untracked.is_empty()
    }
}

// Create Failed Event
pub struct CreateFailedEvent;
impl AnchorEvent for CreateFailedEvent {
    type Iter = IntoIter<AnchorCreateFailed>;

    fn iter(events: &mut AnchorEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.create_failed);
        IntoIterator::into_iter(list)
    }

    fn has(events: &AnchorEvents) -> bool {
        !events.create_failed.is_empty()
    }
}

// Load Failed Event
pub struct LoadFailedEvent;
impl AnchorEvent for LoadFailedEvent {
    type Iter = IntoIter<AnchorLoadFailed>;

    fn iter(events: &mut AnchorEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.load_failed);
        IntoIterator::into_iter(list)
    }

    fn has(events: &AnchorEvents) -> bool {
        !events.load_failed.is_empty()
    }
}

// Erased Event
pub struct ErasedEvent;
impl AnchorEvent for ErasedEvent {
    type Iter = IntoIter<Uuid>;

    fn iter(events: &mut AnchorEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.erased);
        IntoIterator::into_iter(list)
    }

    fn has(events: &AnchorEvents) -> bool {
        !events.erased.is_empty()
    }
}
