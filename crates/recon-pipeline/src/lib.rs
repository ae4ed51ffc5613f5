//! Configuration-driven photogrammetry pipeline orchestration.
//!
//! A run is described by one JSON document and executed against an external
//! reconstruction host through the [`host::ProcessingHost`] trait:
//!
//! ```no_run
//! use recon_pipeline::{DryRunHost, WorkflowLaunch};
//! # fn main() -> recon_pipeline::Result<()> {
//! let launch = WorkflowLaunch::resolve(None, Some("aerial_rtk_no_gcps".into()), ".")?;
//! let mut host = DryRunHost::new();
//! let report = launch.run(&mut host)?;
//! println!("{} photos, QC {}", report.photos, report.qc);
//! # Ok(())
//! # }
//! ```
//!
//! Step functions in [`engine`] can also be driven one at a time on a
//! [`PipelineRun`].

pub mod collect;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod journal;
pub mod launch;
pub mod orchestrator;
pub mod params;
pub mod probe;
pub mod qc;
pub mod runlog;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use crate::collect::{DEFAULT_PHOTO_GLOBS, collect_photos};
pub use crate::config::{Document, Section};
pub use crate::engine::{PipelineRun, PipelineState, Stage, run_pipeline};
pub use crate::error::{PipelineError, Result};
pub use crate::host::{
    CapabilityRegistry, ChunkIntrospection, DryRunHost, HostCall, HostError, ProcessingHost, Token,
};
pub use crate::journal::{Journal, JournalEntry, Outcome};
pub use crate::launch::WorkflowLaunch;
pub use crate::orchestrator::{RunOptions, RunReport, run_with_log, run_workflow};
pub use crate::qc::{QcSnapshot, qc_snapshot};
pub use crate::runlog::{Console, RunLog};
