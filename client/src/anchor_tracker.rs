use std::collections::HashMap;

use log::{info, warn};

use xrlink_shared::{
    ComponentSet, ComponentType, Pose, SpaceHandle, SpaceLocation, SpatialEntityRuntime, Uuid,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackingConfidence {
    #[default]
    None,
    Low,
    High,
}

impl TrackingConfidence {
    /// Confidence implied by a location. `None` means the pose is unusable.
    pub fn from_location(location: &SpaceLocation) -> Self {
        if !location.flags.is_valid() {
            TrackingConfidence::None
        } else if location.flags.is_tracked() {
            TrackingConfidence::High
        } else {
            TrackingConfidence::Low
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpatialEntityRecord {
    pub uuid: Uuid,
    pub space: SpaceHandle,
    pub enabled_components: ComponentSet,
    pub last_pose: Pose,
    pub confidence: TrackingConfidence,
}

impl SpatialEntityRecord {
    pub fn new(uuid: Uuid, space: SpaceHandle, enabled_components: ComponentSet) -> Self {
        Self {
            uuid,
            space,
            enabled_components,
            last_pose: Pose::IDENTITY,
            confidence: TrackingConfidence::None,
        }
    }

    /// Applies a fresh location. An unusable location keeps the last pose.
    pub fn apply_location(&mut self, location: &SpaceLocation) {
        self.confidence = TrackingConfidence::from_location(location);
        if self.confidence != TrackingConfidence::None {
            self.last_pose = location.pose;
        }
    }
}

/// A spatial entity bound to a local tracker under a caller-chosen name
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedAnchor {
    pub name: String,
    pub record: SpatialEntityRecord,
}

/// Anchors currently tracked, keyed by uuid
pub struct AnchorTrackers {
    anchors: HashMap<Uuid, TrackedAnchor>,
}

impl Default for AnchorTrackers {
    fn default() -> Self {
        Self::new()
    }
}

impl AnchorTrackers {
    pub fn new() -> Self {
        Self {
            anchors: HashMap::new(),
        }
    }

    /// Returns false, leaving the registry untouched, if the uuid is already tracked
    pub fn track(&mut self, name: String, record: SpatialEntityRecord) -> bool {
        if self.anchors.contains_key(&record.uuid) {
            warn!("Anchor {} is already tracked", record.uuid);
            return false;
        }
        info!("Tracking anchor {} as {:?}", record.uuid, name);
        self.anchors.insert(record.uuid, TrackedAnchor { name, record });
        true
    }

    pub fn untrack(&mut self, uuid: &Uuid) -> Option<TrackedAnchor> {
        self.anchors.remove(uuid)
    }

    pub fn get(&self, uuid: &Uuid) -> Option<&TrackedAnchor> {
        self.anchors.get(uuid)
    }

    pub fn contains(&self, uuid: &Uuid) -> bool {
        self.anchors.contains_key(uuid)
    }

    /// True if any tracked anchor is located through `space`
    pub fn contains_space(&self, space: SpaceHandle) -> bool {
        self.anchors
            .values()
            .any(|anchor| anchor.record.space == space)
    }

    pub fn uuids(&self) -> Vec<Uuid> {
        self.anchors.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Removes every anchor
    pub fn drain(&mut self) -> Vec<TrackedAnchor> {
        self.anchors.drain().map(|(_, anchor)| anchor).collect()
    }

    /// Mirrors a finished component status change onto every record using `space`
    pub fn set_component_enabled(&mut self, space: SpaceHandle, component: ComponentType, enabled: bool) {
        for anchor in self.anchors.values_mut() {
            if anchor.record.space == space {
                anchor.record.enabled_components.set(component, enabled);
            }
        }
    }

    /// Locates every tracked anchor
    pub fn update_poses<R: SpatialEntityRuntime>(&mut self, runtime: &R) {
        for anchor in self.anchors.values_mut() {
            match runtime.locate_space(anchor.record.space) {
                Ok(location) => anchor.record.apply_location(&location),
                Err(code) => {
                    warn!(
                        "Failed to locate anchor {} ({}): {}",
                        anchor.record.uuid, anchor.name, code
                    );
                }
            }
        }
    }
}
