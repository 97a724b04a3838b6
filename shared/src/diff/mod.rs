//! # Generational diffing
//!
//! Turns a stream of snapshots (one per tick) into stable per-entity
//! lifecycle transitions.
//!
//! Every pass bumps a generation counter and stamps each record seen in the
//! snapshot with it. Anything left with an older stamp is gone from the
//! runtime: it is reported [`Lifecycle::Deleted`] for exactly one pass and
//! pruned on the next.
//!
//! ```text
//!            seen, new            seen, same time
//!   (none) ───────────► Created ─────────────────► Unchanged ◄─┐
//!     ▲                    │                          │   │    │ same time
//!     │                    │ seen, new time           │   └────┘
//!     │                    ▼                          ▼
//!     │                 Updated ◄─────────────────────┘
//!     │                    │        seen, new time
//!     │  pruned            │ not seen (from any live state)
//!     └──────────────── Deleted ──── seen again ───► Created
//! ```

mod engine;
mod lifecycle;

pub use engine::{DiffRecord, GenerationalDiffEngine, SnapshotEntry};
pub use lifecycle::Lifecycle;
