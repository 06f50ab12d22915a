//! Pipeline orchestration and snapshot persistence for TrendLens.
//!
//! [`pipeline::run`] drives the whole enrichment sequence against the
//! provider clients and writes the snapshot; [`snapshot`] reads it back for
//! rendering.

pub mod pipeline;
pub mod snapshot;

pub use pipeline::{ProgressReporter, RunConfig, RunSummary, SilentProgress, run};
pub use snapshot::{read_snapshot, write_snapshot};
