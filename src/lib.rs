//! Resource and portfolio planner: a client → program → project → people/tasks
//! tree, the lookups and highlights derived from it, a pure reducer over a
//! closed set of edits, and timeline layout.

pub mod config;
pub mod dates;
pub mod enrich;
pub mod error;
pub mod financials;
pub mod index;
pub mod io;
pub mod logging;
pub mod model;
pub mod reducer;
pub mod seed;
pub mod selection;
pub mod store;
pub mod timeline;
pub mod utilization;
pub mod views;

pub use error::{EnrichmentError, ImportError, ModelError, SettingsError, StoreError};
pub use index::{build_indexes, Indexes};
pub use reducer::{apply, Action, IdGenerator, SequentialIds, UuidIds};
pub use selection::{compute_connections, compute_highlights, HighlightState, Selection};
pub use timeline::{layout_timeline, Granularity, TimelineLayout};
