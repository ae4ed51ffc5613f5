#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use recon_pipeline::host::{
    CameraHandle, CapabilityRegistry, ChunkIntrospection, CoordinateSystem, HostError,
    HostResult, MarkerHandle, PointSet, Transform,
};
use recon_pipeline::params::{
    AlignCamerasParams, DemParams, DepthMapsParams, MatchPhotosParams, ModelExportParams,
    ModelParams, OptimizeCamerasParams, OrthomosaicParams, PointCloudParams, RasterExportParams,
    ReferenceImportParams, ReportExportParams, TextureParams, UvParams,
};
use recon_pipeline::{DryRunHost, ProcessingHost, RunOptions};
use serde_json::Value;

/// Create `count` empty `.jpg` files under `<root>/photos`.
pub fn write_photos(root: &Path, count: usize) -> PathBuf {
    let dir = root.join("photos");
    fs::create_dir_all(&dir).unwrap();
    for i in 0..count {
        fs::write(dir.join(format!("DJI_{i:04}.jpg")), b"").unwrap();
    }
    dir
}

pub fn write_config(root: &Path, name: &str, value: &Value) -> PathBuf {
    let path = root.join(format!("{name}.json"));
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

pub fn options(root: &Path, workflow: &str) -> RunOptions {
    RunOptions {
        workflow: workflow.to_string(),
        root: root.to_path_buf(),
    }
}

/// Recording host that fails one named operation.
pub struct FaultyHost {
    pub inner: DryRunHost,
    fail_on: &'static str,
}

impl FaultyHost {
    pub fn new(fail_on: &'static str) -> Self {
        Self {
            inner: DryRunHost::new(),
            fail_on,
        }
    }

    fn check(&self, operation: &str) -> HostResult<()> {
        if operation == self.fail_on {
            return Err(HostError::new(operation, "injected failure"));
        }
        Ok(())
    }
}

impl ChunkIntrospection for FaultyHost {
    fn cameras(&self) -> HostResult<Option<Vec<CameraHandle>>> {
        self.inner.cameras()
    }

    fn camera_transform(&self, camera: &CameraHandle) -> HostResult<Option<Transform>> {
        self.inner.camera_transform(camera)
    }

    fn tie_points(&self) -> HostResult<Option<PointSet>> {
        self.inner.tie_points()
    }

    fn point_cloud(&self) -> HostResult<Option<PointSet>> {
        self.inner.point_cloud()
    }

    fn markers(&self) -> HostResult<Option<Vec<MarkerHandle>>> {
        self.inner.markers()
    }
}

impl ProcessingHost for FaultyHost {
    fn capabilities(&self) -> &CapabilityRegistry {
        self.inner.capabilities()
    }

    fn version(&self) -> Option<String> {
        None
    }

    fn clear_document(&mut self) -> HostResult<()> {
        self.check("clear_document")?;
        self.inner.clear_document()
    }

    fn add_chunk(&mut self, label: &str) -> HostResult<()> {
        self.check("add_chunk")?;
        self.inner.add_chunk(label)
    }

    fn add_photos(&mut self, photos: &[PathBuf]) -> HostResult<()> {
        self.check("add_photos")?;
        self.inner.add_photos(photos)
    }

    fn save_document(&mut self, path: &Path) -> HostResult<()> {
        self.check("save_document")?;
        self.inner.save_document(path)
    }

    fn coordinate_system(&self, definition: &str) -> HostResult<CoordinateSystem> {
        self.check("coordinate_system")?;
        self.inner.coordinate_system(definition)
    }

    fn set_crs(&mut self, crs: &CoordinateSystem) -> HostResult<()> {
        self.check("set_crs")?;
        self.inner.set_crs(crs)
    }

    fn update_transform(&mut self) -> HostResult<()> {
        self.check("update_transform")?;
        self.inner.update_transform()
    }

    fn import_reference(&mut self, params: &ReferenceImportParams) -> HostResult<()> {
        self.check("import_reference")?;
        self.inner.import_reference(params)
    }

    fn match_photos(&mut self, params: &MatchPhotosParams) -> HostResult<()> {
        self.check("match_photos")?;
        self.inner.match_photos(params)
    }

    fn align_cameras(&mut self, params: &AlignCamerasParams) -> HostResult<()> {
        self.check("align_cameras")?;
        self.inner.align_cameras(params)
    }

    fn optimize_cameras(&mut self, params: &OptimizeCamerasParams) -> HostResult<()> {
        self.check("optimize_cameras")?;
        self.inner.optimize_cameras(params)
    }

    fn build_depth_maps(&mut self, params: &DepthMapsParams) -> HostResult<()> {
        self.check("build_depth_maps")?;
        self.inner.build_depth_maps(params)
    }

    fn build_point_cloud(&mut self, params: &PointCloudParams) -> HostResult<()> {
        self.check("build_point_cloud")?;
        self.inner.build_point_cloud(params)
    }

    fn build_dem(&mut self, params: &DemParams) -> HostResult<()> {
        self.check("build_dem")?;
        self.inner.build_dem(params)
    }

    fn build_orthomosaic(&mut self, params: &OrthomosaicParams) -> HostResult<()> {
        self.check("build_orthomosaic")?;
        self.inner.build_orthomosaic(params)
    }

    fn build_model(&mut self, params: &ModelParams) -> HostResult<()> {
        self.check("build_model")?;
        self.inner.build_model(params)
    }

    fn build_uv(&mut self, params: &UvParams) -> HostResult<()> {
        self.check("build_uv")?;
        self.inner.build_uv(params)
    }

    fn build_texture(&mut self, params: &TextureParams) -> HostResult<()> {
        self.check("build_texture")?;
        self.inner.build_texture(params)
    }

    fn export_report(&mut self, params: &ReportExportParams) -> HostResult<()> {
        self.check("export_report")?;
        self.inner.export_report(params)
    }

    fn export_raster(&mut self, params: &RasterExportParams) -> HostResult<()> {
        self.check("export_raster")?;
        self.inner.export_raster(params)
    }

    fn export_model(&mut self, params: &ModelExportParams) -> HostResult<()> {
        self.check("export_model")?;
        self.inner.export_model(params)
    }
}
