use std::fmt;

/// Capability that can be toggled on a space
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentType {
    Locatable,
    Storable,
    Sharable,
    Bounded2D,
    Bounded3D,
    SemanticLabels,
    RoomLayout,
    SpaceContainer,
    TriangleMesh,
}

impl ComponentType {
    pub const ALL: [ComponentType; 9] = [
        ComponentType::Locatable,
        ComponentType::Storable,
        ComponentType::Sharable,
        ComponentType::Bounded2D,
        ComponentType::Bounded3D,
        ComponentType::SemanticLabels,
        ComponentType::RoomLayout,
        ComponentType::SpaceContainer,
        ComponentType::TriangleMesh,
    ];

    pub fn to_raw(self) -> u32 {
        match self {
            ComponentType::Locatable => 0,
            ComponentType::Storable => 1,
            ComponentType::Sharable => 2,
            ComponentType::Bounded2D => 3,
            ComponentType::Bounded3D => 4,
            ComponentType::SemanticLabels => 5,
            ComponentType::RoomLayout => 6,
            ComponentType::SpaceContainer => 7,
            ComponentType::TriangleMesh => 1000269000,
        }
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.to_raw() == raw)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ComponentType::Locatable => "locatable",
            ComponentType::Storable => "storable",
            ComponentType::Sharable => "sharable",
            ComponentType::Bounded2D => "bounded_2d",
            ComponentType::Bounded3D => "bounded_3d",
            ComponentType::SemanticLabels => "semantic_labels",
            ComponentType::RoomLayout => "room_layout",
            ComponentType::SpaceContainer => "space_container",
            ComponentType::TriangleMesh => "triangle_mesh",
        }
    }

    fn bit(self) -> u16 {
        let index = Self::ALL
            .iter()
            .position(|c| *c == self)
            .unwrap_or_default();
        1 << index
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Small bitset of [`ComponentType`]s
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ComponentSet(u16);

impl ComponentSet {
    pub fn new() -> Self {
        Self(0)
    }

    /// Returns true if the component was not already present
    pub fn insert(&mut self, component: ComponentType) -> bool {
        let had = self.contains(component);
        self.0 |= component.bit();
        !had
    }

    /// Returns true if the component was present
    pub fn remove(&mut self, component: ComponentType) -> bool {
        let had = self.contains(component);
        self.0 &= !component.bit();
        had
    }

    pub fn set(&mut self, component: ComponentType, enabled: bool) {
        if enabled {
            self.insert(component);
        } else {
            self.remove(component);
        }
    }

    pub fn contains(&self, component: ComponentType) -> bool {
        self.0 & component.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = ComponentType> + '_ {
        ComponentType::ALL
            .iter()
            .copied()
            .filter(move |c| self.contains(*c))
    }
}

impl FromIterator<ComponentType> for ComponentSet {
    fn from_iter<I: IntoIterator<Item = ComponentType>>(iter: I) -> Self {
        let mut set = ComponentSet::new();
        for component in iter {
            set.insert(component);
        }
        set
    }
}

impl fmt::Debug for ComponentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Synchronous status of one component on one space
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ComponentStatus {
    pub enabled: bool,
    pub change_pending: bool,
}

impl ComponentStatus {
    /// Enabled and not in the middle of a toggle
    pub fn is_active(&self) -> bool {
        self.enabled && !self.change_pending
    }
}
