//! Top-level run procedure.
//!
//! One run: load the configuration, reset the host document, add photos,
//! drive the engine, snapshot QC, export and optionally save the project.
//! Everything is logged to a single [`RunLog`].

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::collect::{DEFAULT_PHOTO_GLOBS, absolute, collect_photos, normalize_path};
use crate::config;
use crate::engine::{PipelineRun, PipelineState, Stage, run_pipeline, step_export};
use crate::error::{PipelineError, Result};
use crate::host::ProcessingHost;
use crate::journal::Journal;
use crate::qc::{QcSnapshot, qc_snapshot};
use crate::runlog::{RunLog, workflow_log_path};

/// Per-run settings that do not come from the configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Names the log directory and is the default chunk label.
    pub workflow: String,
    /// Base for `logs/`, relative `export.output_dir` and relative
    /// `project.project_path`.
    pub root: PathBuf,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub workflow: String,
    pub config_path: PathBuf,
    pub host_version: Option<String>,
    pub photos: usize,
    pub stage: Stage,
    pub state: PipelineState,
    pub qc: QcSnapshot,
    pub project_path: Option<PathBuf>,
    pub journal: Journal,
    pub log_path: Option<PathBuf>,
}

/// Run a workflow with a fresh log under `<root>/logs/<workflow>/`.
///
/// The log is opened before the configuration is read, so load failures are
/// logged too.
///
/// # Errors
///
/// Any fatal [`PipelineError`]; it has already been written to the log.
pub fn run_workflow<H: ProcessingHost + ?Sized>(
    host: &mut H,
    config_path: &Path,
    options: &RunOptions,
) -> Result<RunReport> {
    let log = RunLog::create(&workflow_log_path(&options.root, &options.workflow))?;
    run_with_log(host, config_path, options, &log)
}

/// Run a workflow against an already opened log.
///
/// # Errors
///
/// Any fatal [`PipelineError`]; it is logged at ERROR before returning.
pub fn run_with_log<H: ProcessingHost + ?Sized>(
    host: &mut H,
    config_path: &Path,
    options: &RunOptions,
    log: &RunLog,
) -> Result<RunReport> {
    execute(host, config_path, options, log).inspect_err(|err| log.error(err.to_string()))
}

fn execute<H: ProcessingHost + ?Sized>(
    host: &mut H,
    config_path: &Path,
    options: &RunOptions,
    log: &RunLog,
) -> Result<RunReport> {
    let config_path = absolute(config_path).unwrap_or_else(|| config_path.to_path_buf());
    let root = absolute(&options.root).unwrap_or_else(|| options.root.clone());
    let mut document = config::load(&config_path)?;

    let host_version = host.version();
    log.info(format!("Config: {}", config_path.display()));
    log.info(format!(
        "Host version: {}",
        host_version.as_deref().unwrap_or("unknown")
    ));
    log.info(format!("Workflow: {}", options.workflow));

    let mut run = PipelineRun::new(host, log);

    // ── session ────────────────────────────────────────────────────────────
    if let Err(err) = run.call("clear_document", |h| h.clear_document()) {
        log.warn(format!("Could not clear document, continuing: {err}"));
    }
    let chunk_label = document
        .section("project")?
        .string_or("chunk_label", &options.workflow)?;
    run.call_with_detail("add_chunk", chunk_label.clone(), |h| {
        h.add_chunk(&chunk_label)
    })?;

    // ── inputs ─────────────────────────────────────────────────────────────
    let input = document.section("input")?;
    let photos = collect_photos(
        &input.strings_or("photo_dirs", &[])?,
        &input.strings_or("photo_globs", DEFAULT_PHOTO_GLOBS)?,
        input.bool_or("recursive", true)?,
    );
    if photos.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    log.info(format!("Photos found: {}", photos.len()));
    run.call_with_detail("add_photos", format!("{} photos", photos.len()), |h| {
        h.add_photos(&photos)
    })?;

    // ── processing ─────────────────────────────────────────────────────────
    let stage = run_pipeline(&mut run, &document)?;

    let qc = qc_snapshot(run.host());
    log.info(format!("QC: {qc}"));

    // ── outputs ────────────────────────────────────────────────────────────
    if !document.section("export")?.is_empty() {
        document.normalize_output_dir(&root);
        step_export(&mut run, &document.section("export")?)?;
    }

    let project_path = document
        .section("project")?
        .string_or("project_path", "")?;
    let project_path = if project_path.is_empty() {
        None
    } else {
        let path = normalize_path(&root.join(project_path));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PipelineError::io(format!("creating project dir {}", parent.display()), e)
            })?;
        }
        log.info(format!("Saving project: {}", path.display()));
        run.call_with_detail("save_document", path.display().to_string(), |h| {
            h.save_document(&path)
        })?;
        Some(path)
    };

    log.info("DONE");

    let state = run.state();
    Ok(RunReport {
        workflow: options.workflow.clone(),
        config_path,
        host_version,
        photos: photos.len(),
        stage,
        state,
        qc,
        project_path,
        journal: run.into_journal(),
        log_path: log.path().map(Path::to_path_buf),
    })
}
