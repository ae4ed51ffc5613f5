//! Stage pipeline engine.
//!
//! Drives the host through referencing, alignment and one product branch
//! selected by `processing.stage`, tracking progress as a [`PipelineState`].

mod state;
mod steps;

pub use state::{Branch, PipelineState, Stage};
pub use steps::{
    PipelineRun, run_pipeline, step_align, step_crs, step_dense, step_export, step_match,
    step_model, step_optimize, step_reference, step_terrain,
};
