use std::{collections::HashMap, fmt, hash::Hash};

use log::warn;

use crate::types::XrTime;

use super::Lifecycle;

/// One entry of a snapshot: an identity plus the time it last changed
pub trait SnapshotEntry {
    type Id: Copy + Eq + Hash + fmt::Debug;

    fn id(&self) -> Self::Id;
    fn last_update_time(&self) -> XrTime;
}

/// Registry entry kept across diff passes
#[derive(Clone, Debug, PartialEq)]
pub struct DiffRecord<S: SnapshotEntry, G> {
    id: S::Id,
    generation: u64,
    lifecycle: Lifecycle,
    last_update_time: XrTime,
    state: S,
    geometry: G,
}

impl<S: SnapshotEntry, G> DiffRecord<S, G> {
    fn created(state: S, geometry: G, generation: u64) -> Self {
        Self {
            id: state.id(),
            generation,
            lifecycle: Lifecycle::Created,
            last_update_time: state.last_update_time(),
            state,
            geometry,
        }
    }

    pub fn id(&self) -> S::Id {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Update time of the geometry currently held
    pub fn last_update_time(&self) -> XrTime {
        self.last_update_time
    }

    /// Latest snapshot entry whose update time matches the held geometry
    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }
}

/// Registry of diffed entities.
///
/// `G` is the geometry fetched for an entity when it is created or updated.
pub struct GenerationalDiffEngine<S: SnapshotEntry, G> {
    generation: u64,
    records: HashMap<S::Id, DiffRecord<S, G>>,
}

impl<S: SnapshotEntry, G> Default for GenerationalDiffEngine<S, G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SnapshotEntry, G> GenerationalDiffEngine<S, G> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            records: HashMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: &S::Id) -> Option<&DiffRecord<S, G>> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &S::Id) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &DiffRecord<S, G>> {
        self.records.values()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Runs one diff pass against `snapshot`.
    ///
    /// `fetch` is called for every entity classified Created or Updated. If it
    /// fails for an Updated entity, the entity is reported Unchanged with its
    /// previous state and geometry and is retried next pass. If it fails for a new
    /// entity, the entity is left out of the registry entirely.
    ///
    /// Returns the records touched by this pass: snapshot order first, then
    /// the records newly marked Deleted.
    pub fn diff_tick<F, E>(&mut self, snapshot: Vec<S>, mut fetch: F) -> Vec<&DiffRecord<S, G>>
    where
        F: FnMut(&S) -> Result<G, E>,
        E: fmt::Display,
    {
        self.generation += 1;
        let generation = self.generation;
        let mut touched = Vec::with_capacity(snapshot.len());

        for entry in snapshot {
            let id = entry.id();

            if !self.records.contains_key(&id) {
                match fetch(&entry) {
                    Ok(geometry) => {
                        self.records
                            .insert(id, DiffRecord::created(entry, geometry, generation));
                        touched.push(id);
                    }
                    Err(error) => {
                        warn!("Skipping new entity {:?}, geometry fetch failed: {}", id, error);
                    }
                }
                continue;
            }

            let Some(record) = self.records.get_mut(&id) else {
                continue;
            };

            if record.generation == generation {
                warn!("Entity {:?} appears twice in one snapshot, ignoring the duplicate", id);
                continue;
            }

            if record.lifecycle == Lifecycle::Deleted {
                // reappearance counts as a fresh entity
                match fetch(&entry) {
                    Ok(geometry) => {
                        *record = DiffRecord::created(entry, geometry, generation);
                        touched.push(id);
                    }
                    Err(error) => {
                        // left stamped with the old generation, pruned below
                        warn!("Skipping reappeared entity {:?}, geometry fetch failed: {}", id, error);
                    }
                }
                continue;
            }

            record.generation = generation;
            if record.last_update_time == entry.last_update_time() {
                record.lifecycle = Lifecycle::Unchanged;
                record.state = entry;
            } else {
                match fetch(&entry) {
                    Ok(geometry) => {
                        record.lifecycle = Lifecycle::Updated;
                        record.last_update_time = entry.last_update_time();
                        record.geometry = geometry;
                        record.state = entry;
                    }
                    Err(error) => {
                        warn!(
                            "Geometry fetch failed for {:?}, assuming it is unchanged: {}",
                            id, error
                        );
                        // state stays paired with the geometry it describes
                        record.lifecycle = Lifecycle::Unchanged;
                    }
                }
            }
            touched.push(id);
        }

        // mark
        let mut pruned = Vec::new();
        for (id, record) in self.records.iter_mut() {
            if record.generation == generation {
                continue;
            }
            if record.lifecycle == Lifecycle::Deleted {
                pruned.push(*id);
            } else {
                record.lifecycle = Lifecycle::Deleted;
                record.generation = generation;
                touched.push(*id);
            }
        }

        // compact
        for id in pruned {
            self.records.remove(&id);
        }

        touched
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }
}
