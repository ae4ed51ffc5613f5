//! Resolve which configuration to run and under which workflow name.

use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::host::ProcessingHost;
use crate::orchestrator::{RunOptions, RunReport, run_workflow};

/// Fallback workflow name for config paths without a usable file stem.
const DEFAULT_WORKFLOW: &str = "workflow";

/// A fully resolved run request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowLaunch {
    pub config_path: PathBuf,
    pub workflow: String,
    pub root: PathBuf,
}

impl WorkflowLaunch {
    /// Resolve a launch from an optional config path and workflow name.
    ///
    /// - An explicit config path wins; the workflow name defaults to its
    ///   file stem.
    /// - A bare workflow name selects `<root>/workflows/<name>/config.json`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::MissingConfigPath`] when neither is given.
    pub fn resolve(
        config: Option<PathBuf>,
        workflow: Option<String>,
        root: impl Into<PathBuf>,
    ) -> Result<Self> {
        let root = root.into();
        let workflow = workflow.filter(|w| !w.trim().is_empty());
        match (config, workflow) {
            (Some(config_path), workflow) => {
                let workflow = workflow.unwrap_or_else(|| workflow_from_path(&config_path));
                Ok(Self {
                    config_path,
                    workflow,
                    root,
                })
            }
            (None, Some(workflow)) => Ok(Self {
                config_path: workflow_config_path(&root, &workflow),
                workflow,
                root,
            }),
            (None, None) => Err(PipelineError::MissingConfigPath),
        }
    }

    pub fn options(&self) -> RunOptions {
        RunOptions {
            workflow: self.workflow.clone(),
            root: self.root.clone(),
        }
    }

    /// Run with a fresh per-run log.
    pub fn run<H: ProcessingHost + ?Sized>(&self, host: &mut H) -> Result<RunReport> {
        run_workflow(host, &self.config_path, &self.options())
    }
}

/// `<root>/workflows/<name>/config.json`
pub fn workflow_config_path(root: &Path, workflow: &str) -> PathBuf {
    root.join("workflows").join(workflow).join("config.json")
}

fn workflow_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_WORKFLOW.to_string())
}
