//! Step functions for the reconstruction pipeline.
//!
//! Each step reads its own configuration section, builds fully defaulted
//! parameters, and issues host calls through [`PipelineRun::call`] so that
//! every operation lands in the run journal.

use std::path::PathBuf;

use crate::config::{Document, Section};
use crate::error::{PipelineError, Result};
use crate::host::{
    COORDINATE_SYSTEM, CapabilityRegistry, CoordinateSystem, HostResult, ProcessingHost,
};
use crate::journal::{Journal, JournalEntry};
use crate::params::{
    AlignCamerasParams, DemParams, DepthMapsParams, MatchPhotosParams, ModelExportParams,
    ModelParams, OptimizeCamerasParams, OrthomosaicParams, PointCloudParams, RasterExportParams,
    ReferenceImportParams, ReportExportParams, TextureParams, UvParams, crs_definition,
};
use crate::runlog::RunLog;

use super::state::{Branch, PipelineState, Stage};

// ─────────────────────────────────────────────────────────────────────────────
// Run Context
// ─────────────────────────────────────────────────────────────────────────────

/// Mutable context threaded through every step: the host being driven, the
/// run log, current progress and the operation journal.
pub struct PipelineRun<'a, H: ProcessingHost + ?Sized> {
    host: &'a mut H,
    log: &'a RunLog,
    state: PipelineState,
    journal: Journal,
}

impl<'a, H: ProcessingHost + ?Sized> PipelineRun<'a, H> {
    pub fn new(host: &'a mut H, log: &'a RunLog) -> Self {
        Self {
            host,
            log,
            state: PipelineState::Initialized,
            journal: Journal::new(),
        }
    }

    pub fn host(&self) -> &H {
        self.host
    }

    pub fn log(&self) -> &RunLog {
        self.log
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn into_journal(self) -> Journal {
        self.journal
    }

    /// Issue one host operation and journal its outcome.
    ///
    /// # Errors
    ///
    /// The host error, unmodified, wrapped in [`PipelineError::Host`].
    pub fn call(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut H) -> HostResult<()>,
    ) -> Result<()> {
        self.record(operation, None, f)
    }

    /// Like [`call`](Self::call), with a detail attached to the journal entry.
    pub fn call_with_detail(
        &mut self,
        operation: &'static str,
        detail: impl Into<String>,
        f: impl FnOnce(&mut H) -> HostResult<()>,
    ) -> Result<()> {
        self.record(operation, Some(detail.into()), f)
    }

    fn record(
        &mut self,
        operation: &'static str,
        detail: Option<String>,
        f: impl FnOnce(&mut H) -> HostResult<()>,
    ) -> Result<()> {
        match f(&mut *self.host) {
            Ok(()) => {
                self.journal
                    .push(JournalEntry::completed(operation, self.state, detail));
                Ok(())
            }
            Err(err) => {
                self.journal.push(JournalEntry::failed(
                    operation,
                    self.state,
                    err.message.clone(),
                ));
                Err(err.into())
            }
        }
    }

    fn advance(&mut self, state: PipelineState) {
        log::debug!("pipeline state: {} -> {}", self.state, state);
        self.state = state;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

fn build_crs<H: ProcessingHost + ?Sized>(host: &H, definition: &str) -> Result<CoordinateSystem> {
    host.capabilities().require_constructor(COORDINATE_SYSTEM)?;
    Ok(host.coordinate_system(definition)?)
}

/// Run `processing.<key>` unless its mapping says `enabled: false`.
fn run_enabled<H, P>(
    run: &mut PipelineRun<'_, H>,
    processing: &Section<'_>,
    key: &'static str,
    build: impl FnOnce(&Section<'_>, &CapabilityRegistry) -> Result<P>,
    exec: impl FnOnce(&mut H, &P) -> HostResult<()>,
) -> Result<()>
where
    H: ProcessingHost + ?Sized,
{
    let section = processing.section(key)?;
    if !section.enabled(true)? {
        run.log.info(format!("Skipping {key} (disabled)"));
        return Ok(());
    }
    let params = build(&section, run.host.capabilities())?;
    run.call(key, |h| exec(h, &params))
}

// ─────────────────────────────────────────────────────────────────────────────
// Step Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Assign the chunk CRS from `input.crs_epsg`, if set.
pub fn step_crs<H: ProcessingHost + ?Sized>(
    run: &mut PipelineRun<'_, H>,
    input: &Section<'_>,
) -> Result<()> {
    let Some(definition) = crs_definition(input, "crs_epsg")? else {
        return Ok(());
    };
    run.log.info(format!("Setting CRS: {definition}"));
    let crs = build_crs(&*run.host, &definition)?;
    run.call_with_detail("set_crs", definition, |h| h.set_crs(&crs))?;
    run.call("update_transform", |h| h.update_transform())?;
    run.advance(PipelineState::Referenced);
    Ok(())
}

/// Import camera / ground control reference data when `reference.enabled`.
pub fn step_reference<H: ProcessingHost + ?Sized>(
    run: &mut PipelineRun<'_, H>,
    reference: &Section<'_>,
) -> Result<()> {
    if !reference.enabled(false)? {
        return Ok(());
    }
    run.log.info("Importing reference data...");
    let mut params = ReferenceImportParams::from_section(reference, run.host.capabilities())?;
    if let Some(definition) = crs_definition(reference, "crs_epsg")? {
        params.crs = Some(build_crs(&*run.host, &definition)?);
    }
    let detail = params.path.clone();
    run.call_with_detail("import_reference", detail, |h| h.import_reference(&params))?;
    run.call("update_transform", |h| h.update_transform())?;
    run.advance(PipelineState::Referenced);
    Ok(())
}

/// Feature detection and matching. Always runs.
pub fn step_match<H: ProcessingHost + ?Sized>(
    run: &mut PipelineRun<'_, H>,
    processing: &Section<'_>,
) -> Result<()> {
    let params = MatchPhotosParams::from_section(&processing.section("match_photos")?)?;
    run.call("match_photos", |h| h.match_photos(&params))?;
    run.advance(PipelineState::Matched);
    Ok(())
}

/// Camera alignment. Always runs.
pub fn step_align<H: ProcessingHost + ?Sized>(
    run: &mut PipelineRun<'_, H>,
    processing: &Section<'_>,
) -> Result<()> {
    let params = AlignCamerasParams::from_section(&processing.section("align_cameras")?)?;
    run.call("align_cameras", |h| h.align_cameras(&params))?;
    run.advance(PipelineState::Aligned);
    Ok(())
}

/// Camera optimization, skippable with `optimize_cameras.enabled: false`.
pub fn step_optimize<H: ProcessingHost + ?Sized>(
    run: &mut PipelineRun<'_, H>,
    processing: &Section<'_>,
) -> Result<()> {
    run_enabled(
        run,
        processing,
        "optimize_cameras",
        |s, _| OptimizeCamerasParams::from_section(s),
        |h, p| h.optimize_cameras(p),
    )?;
    run.advance(PipelineState::Optimized);
    Ok(())
}

/// Depth maps, then the dense point cloud.
pub fn step_dense<H: ProcessingHost + ?Sized>(
    run: &mut PipelineRun<'_, H>,
    processing: &Section<'_>,
) -> Result<()> {
    run_enabled(
        run,
        processing,
        "build_depth_maps",
        DepthMapsParams::from_section,
        |h, p| h.build_depth_maps(p),
    )?;
    run_enabled(
        run,
        processing,
        "build_point_cloud",
        PointCloudParams::from_section,
        |h, p| h.build_point_cloud(p),
    )?;
    run.advance(PipelineState::DenseBuilt);
    Ok(())
}

/// Elevation model, then orthomosaic.
pub fn step_terrain<H: ProcessingHost + ?Sized>(
    run: &mut PipelineRun<'_, H>,
    processing: &Section<'_>,
) -> Result<()> {
    run_enabled(
        run,
        processing,
        "build_dem",
        DemParams::from_section,
        |h, p| h.build_dem(p),
    )?;
    run_enabled(
        run,
        processing,
        "build_orthomosaic",
        OrthomosaicParams::from_section,
        |h, p| h.build_orthomosaic(p),
    )?;
    run.advance(PipelineState::TerrainBuilt);
    Ok(())
}

/// Mesh, UV layout, then texture.
pub fn step_model<H: ProcessingHost + ?Sized>(
    run: &mut PipelineRun<'_, H>,
    processing: &Section<'_>,
) -> Result<()> {
    run_enabled(
        run,
        processing,
        "build_model",
        ModelParams::from_section,
        |h, p| h.build_model(p),
    )?;
    run_enabled(
        run,
        processing,
        "build_uv",
        UvParams::from_section,
        |h, p| h.build_uv(p),
    )?;
    run_enabled(
        run,
        processing,
        "build_texture",
        TextureParams::from_section,
        |h, p| h.build_texture(p),
    )?;
    run.advance(PipelineState::MeshBuilt);
    Ok(())
}

/// Report, raster and model exports.
///
/// Does nothing for an empty `export` mapping. A non-empty `output_dir` is
/// created first; it also anchors the default report and model paths.
/// Raster paths are used as written.
pub fn step_export<H: ProcessingHost + ?Sized>(
    run: &mut PipelineRun<'_, H>,
    export: &Section<'_>,
) -> Result<()> {
    if export.is_empty() {
        return Ok(());
    }

    let output_dir = PathBuf::from(export.string_or("output_dir", "")?);
    if !output_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&output_dir).map_err(|e| {
            PipelineError::io(format!("creating output dir {}", output_dir.display()), e)
        })?;
    }

    let report = export.section("report")?;
    if report.enabled(false)? {
        let params = ReportExportParams::from_section(&report, &output_dir)?;
        run.log
            .info(format!("Exporting report: {}", params.path.display()));
        let detail = params.path.display().to_string();
        run.call_with_detail("export_report", detail, |h| h.export_report(&params))?;
    }

    for raster in export.sections("rasters")? {
        if !raster.enabled(true)? {
            continue;
        }
        if raster.string_or("path", "")?.is_empty() {
            run.log.debug("Skipping raster export without a path");
            continue;
        }
        let params = RasterExportParams::from_section(&raster, run.host.capabilities())?;
        run.log
            .info(format!("Exporting raster: {}", params.path.display()));
        let detail = params.path.display().to_string();
        run.call_with_detail("export_raster", detail, |h| h.export_raster(&params))?;
    }

    let model = export.section("model")?;
    if model.enabled(false)? {
        let params =
            ModelExportParams::from_section(&model, &output_dir, run.host.capabilities())?;
        run.log
            .info(format!("Exporting model: {}", params.path.display()));
        let detail = params.path.display().to_string();
        run.call_with_detail("export_model", detail, |h| h.export_model(&params))?;
    }

    run.advance(PipelineState::Exported);
    Ok(())
}

/// Run referencing, alignment and the stage's product operations.
///
/// The stage is validated only after optimization, so an unknown stage still
/// performs matching, alignment and optimization before failing.
///
/// # Errors
///
/// Any configuration, capability or host error from the steps, or
/// [`PipelineError::UnknownStage`].
pub fn run_pipeline<H: ProcessingHost + ?Sized>(
    run: &mut PipelineRun<'_, H>,
    document: &Document,
) -> Result<Stage> {
    let input = document.section("input")?;
    let reference = document.section("reference")?;
    let processing = document.section("processing")?;

    step_crs(run, &input)?;
    step_reference(run, &reference)?;

    let stage_value = processing.get("stage");
    run.log
        .info(format!("Processing stage: {}", Stage::label(stage_value)));

    step_match(run, &processing)?;
    step_align(run, &processing)?;
    step_optimize(run, &processing)?;

    let stage = Stage::from_config(stage_value)?;
    step_dense(run, &processing)?;
    match stage.branch() {
        Branch::Terrain => step_terrain(run, &processing)?,
        Branch::Mesh => step_model(run, &processing)?,
    }
    Ok(stage)
}
