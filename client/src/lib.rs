//! # xrlink Client
//! Tick-driven client for XR spatial entity runtimes: filtered space
//! queries, component status changes, persistent anchor sagas, anchor pose
//! tracking and diffed scene meshing.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use xrlink_shared as shared;

mod anchor_events;
mod anchor_tracker;
mod client;
mod client_config;
mod component_status;
mod event_router;
mod persistent_anchor;
mod scene_meshing;
mod spatial_anchor;
mod spatial_query;
mod storage;

pub use anchor_events::{
    AnchorCreateFailed, AnchorEvent, AnchorEvents, AnchorLoadFailed, AnchorTracked,
    AnchorUntracked, CreateFailedEvent, ErasedEvent, LoadFailedEvent, TrackedEvent,
    UntrackedEvent,
};
pub use anchor_tracker::{AnchorTrackers, SpatialEntityRecord, TrackedAnchor, TrackingConfidence};
pub use client::SpatialClient;
pub use client_config::{ClientConfig, QueryConfig};
pub use component_status::{ComponentStatusController, SetStatusOutcome};
pub use persistent_anchor::SagaStep;
pub use scene_meshing::{SceneMeshing, SceneMeshingConfig, SubmeshGeometry, SubmeshRecord};
pub use spatial_anchor::{AnchorCreateOutcome, AnchorCreationController, CreatedAnchor};
pub use spatial_query::{QueryOutcome, SpatialQueryEngine};
pub use storage::{StorageController, StorageOutcome, StoredSpace};
