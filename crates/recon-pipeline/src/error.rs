//! Error taxonomy for pipeline runs.
//!
//! Every variant is fatal for the run that produced it. The only place where
//! failures are tolerated is the QC snapshotter, which never returns an error.

use std::path::PathBuf;

use thiserror::Error;

use crate::host::HostError;

/// Result alias used throughout the crate.
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

/// Errors raised while resolving configuration or driving the host.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration document is missing, unreadable or not a JSON object.
    #[error("failed to load config {}: {reason}", path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    /// A required host constant or constructor is not declared by the host.
    #[error("host constant or capability not found: {0}")]
    MissingCapability(String),

    /// Photo discovery produced nothing.
    #[error("no photos found; check input.photo_dirs and input.photo_globs")]
    EmptyInput,

    /// `processing.stage` names no known product pipeline.
    #[error("unknown processing.stage: {0}")]
    UnknownStage(String),

    /// Reference import is enabled but cannot be configured.
    #[error("reference import misconfigured: {0}")]
    ReferenceConfig(String),

    /// A configuration value could not be coerced to the parameter's type.
    #[error("invalid value for {key}: expected {expected}, found {found}")]
    InvalidParameter {
        key: String,
        expected: &'static str,
        found: String,
    },

    /// Neither a config path nor a workflow name was supplied.
    #[error("no config path provided; pass a config file or select a workflow by name")]
    MissingConfigPath,

    /// A host operation failed; propagated unmodified.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Local file-system work around the run (log files, output directories).
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub(crate) fn invalid(key: impl Into<String>, expected: &'static str, found: impl ToString) -> Self {
        Self::InvalidParameter {
            key: key.into(),
            expected,
            found: found.to_string(),
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
