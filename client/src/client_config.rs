use xrlink_shared::{PersistenceMode, StorageLocation, XrDuration};

/// Settings applied to every spatial entity query
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryConfig {
    /// Upper bound on results for `All` and `ByComponent` queries. Uuid
    /// queries always ask for exactly as many results as uuids.
    pub max_results: u32,
    /// Query timeout. Zero lets the runtime choose.
    pub timeout: XrDuration,
    /// Upper bound used when loading anchors with `erase_unknown`, which
    /// has to see every stored anchor
    pub erase_unknown_max_results: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_results: 100,
            timeout: 0,
            erase_unknown_max_results: 1000,
        }
    }
}

/// Contains Config properties which will be used by a SpatialClient
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub query: QueryConfig,
    /// Timeout passed with every component status change. Zero lets the
    /// runtime choose.
    pub component_status_timeout: XrDuration,
    /// Where persistent anchors are saved, erased and loaded from
    pub storage_location: StorageLocation,
    /// How long saved anchors persist
    pub persistence_mode: PersistenceMode,
}
