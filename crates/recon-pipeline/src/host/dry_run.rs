//! Recording host that performs no reconstruction.
//!
//! Every operation is appended to a call list together with its fully
//! resolved parameters, which makes the host useful both as a planner
//! ("what would this configuration do?") and as the collaborator in tests.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::registry::{COORDINATE_SYSTEM, Capability, CapabilityRegistry};
use super::{
    CameraHandle, ChunkIntrospection, CoordinateSystem, HostError, HostResult, MarkerHandle,
    PointSet, ProcessingHost, Transform,
};
use crate::params::{
    AlignCamerasParams, DemParams, DepthMapsParams, MatchPhotosParams, ModelExportParams,
    ModelParams, OptimizeCamerasParams, OrthomosaicParams, PointCloudParams, RasterExportParams,
    ReferenceImportParams, ReportExportParams, TextureParams, UvParams,
};

/// Constants and constructors the dry-run host declares.
pub const DECLARED_SURFACE: &[(&str, Capability)] = &[
    (COORDINATE_SYSTEM, Capability::Constructor),
    // depth map filtering
    ("NoFiltering", Capability::Constant(0)),
    ("MildFiltering", Capability::Constant(1)),
    ("ModerateFiltering", Capability::Constant(2)),
    ("AggressiveFiltering", Capability::Constant(3)),
    // data sources
    ("PointCloudData", Capability::Constant(0)),
    ("TiePointsData", Capability::Constant(1)),
    ("ModelData", Capability::Constant(2)),
    ("TiledModelData", Capability::Constant(3)),
    ("ElevationData", Capability::Constant(4)),
    ("OrthomosaicData", Capability::Constant(5)),
    ("DepthMapsData", Capability::Constant(6)),
    ("ImagesData", Capability::Constant(7)),
    // interpolation
    ("DisabledInterpolation", Capability::Constant(0)),
    ("EnabledInterpolation", Capability::Constant(1)),
    ("Extrapolated", Capability::Constant(2)),
    // blending
    ("AverageBlending", Capability::Constant(0)),
    ("MosaicBlending", Capability::Constant(1)),
    ("MinBlending", Capability::Constant(2)),
    ("MaxBlending", Capability::Constant(3)),
    ("DisabledBlending", Capability::Constant(4)),
    ("NaturalBlending", Capability::Constant(5)),
    // surface types
    ("Arbitrary", Capability::Constant(0)),
    ("HeightField", Capability::Constant(1)),
    // face counts
    ("LowFaceCount", Capability::Constant(0)),
    ("MediumFaceCount", Capability::Constant(1)),
    ("HighFaceCount", Capability::Constant(2)),
    ("CustomFaceCount", Capability::Constant(3)),
    // UV mapping
    ("GenericMapping", Capability::Constant(0)),
    ("OrthophotoMapping", Capability::Constant(1)),
    ("AdaptiveOrthophotoMapping", Capability::Constant(2)),
    ("SphericalMapping", Capability::Constant(3)),
    ("CameraMapping", Capability::Constant(4)),
    // texture types
    ("DiffuseMap", Capability::Constant(0)),
    ("NormalMap", Capability::Constant(1)),
    ("OcclusionMap", Capability::Constant(2)),
    // reference import
    ("ReferenceFormatNone", Capability::Constant(0)),
    ("ReferenceFormatXML", Capability::Constant(1)),
    ("ReferenceFormatTEL", Capability::Constant(2)),
    ("ReferenceFormatCSV", Capability::Constant(3)),
    ("ReferenceFormatMavinci", Capability::Constant(4)),
    ("ReferenceFormatBramor", Capability::Constant(5)),
    ("ReferenceFormatAPM", Capability::Constant(6)),
    ("ReferenceItemsCameras", Capability::Constant(1)),
    ("ReferenceItemsMarkers", Capability::Constant(2)),
    ("ReferenceItemsScalebars", Capability::Constant(4)),
    ("ReferenceItemsAll", Capability::Constant(7)),
    // raster formats
    ("RasterFormatNone", Capability::Constant(0)),
    ("RasterFormatTiles", Capability::Constant(1)),
    ("RasterFormatKMZ", Capability::Constant(2)),
    ("RasterFormatXYZ", Capability::Constant(3)),
    ("RasterFormatMBTiles", Capability::Constant(4)),
    ("RasterFormatWW", Capability::Constant(5)),
    ("RasterFormatTMS", Capability::Constant(6)),
    ("RasterFormatGeoPackage", Capability::Constant(7)),
    ("RasterFormatGeoTIFF", Capability::Constant(8)),
    // image formats
    ("ImageFormatNone", Capability::Constant(0)),
    ("ImageFormatJPEG", Capability::Constant(1)),
    ("ImageFormatTIFF", Capability::Constant(2)),
    ("ImageFormatPNG", Capability::Constant(3)),
    ("ImageFormatBMP", Capability::Constant(4)),
    ("ImageFormatEXR", Capability::Constant(5)),
    // model formats
    ("ModelFormatNone", Capability::Constant(0)),
    ("ModelFormatOBJ", Capability::Constant(1)),
    ("ModelFormatPLY", Capability::Constant(2)),
    ("ModelFormatFBX", Capability::Constant(3)),
    ("ModelFormatGLTF", Capability::Constant(4)),
    ("ModelFormatCOLLADA", Capability::Constant(5)),
];

/// One recorded host invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", content = "params", rename_all = "snake_case")]
pub enum HostCall {
    ClearDocument,
    AddChunk { label: String },
    AddPhotos { paths: Vec<PathBuf> },
    SaveDocument { path: PathBuf },
    SetCrs { crs: CoordinateSystem },
    UpdateTransform,
    ImportReference(ReferenceImportParams),
    MatchPhotos(MatchPhotosParams),
    AlignCameras(AlignCamerasParams),
    OptimizeCameras(OptimizeCamerasParams),
    BuildDepthMaps(DepthMapsParams),
    BuildPointCloud(PointCloudParams),
    BuildDem(DemParams),
    BuildOrthomosaic(OrthomosaicParams),
    BuildModel(ModelParams),
    BuildUv(UvParams),
    BuildTexture(TextureParams),
    ExportReport(ReportExportParams),
    ExportRaster(RasterExportParams),
    ExportModel(ModelExportParams),
}

impl HostCall {
    /// Snake-case operation name, as used in the serialized plan.
    pub fn operation(&self) -> &'static str {
        match self {
            HostCall::ClearDocument => "clear_document",
            HostCall::AddChunk { .. } => "add_chunk",
            HostCall::AddPhotos { .. } => "add_photos",
            HostCall::SaveDocument { .. } => "save_document",
            HostCall::SetCrs { .. } => "set_crs",
            HostCall::UpdateTransform => "update_transform",
            HostCall::ImportReference(_) => "import_reference",
            HostCall::MatchPhotos(_) => "match_photos",
            HostCall::AlignCameras(_) => "align_cameras",
            HostCall::OptimizeCameras(_) => "optimize_cameras",
            HostCall::BuildDepthMaps(_) => "build_depth_maps",
            HostCall::BuildPointCloud(_) => "build_point_cloud",
            HostCall::BuildDem(_) => "build_dem",
            HostCall::BuildOrthomosaic(_) => "build_orthomosaic",
            HostCall::BuildModel(_) => "build_model",
            HostCall::BuildUv(_) => "build_uv",
            HostCall::BuildTexture(_) => "build_texture",
            HostCall::ExportReport(_) => "export_report",
            HostCall::ExportRaster(_) => "export_raster",
            HostCall::ExportModel(_) => "export_model",
        }
    }
}

#[derive(Debug, Clone)]
struct DryRunCamera {
    photo: PathBuf,
    transform: Option<Transform>,
}

/// Host that records calls instead of executing them.
#[derive(Debug, Clone)]
pub struct DryRunHost {
    registry: CapabilityRegistry,
    chunk_label: Option<String>,
    crs: Option<CoordinateSystem>,
    cameras: Vec<DryRunCamera>,
    markers: Vec<MarkerHandle>,
    calls: Vec<HostCall>,
}

impl Default for DryRunHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DryRunHost {
    /// Host declaring the full [`DECLARED_SURFACE`].
    pub fn new() -> Self {
        Self::with_registry(CapabilityRegistry::from_surface(DECLARED_SURFACE))
    }

    /// Host with a custom declared surface.
    pub fn with_registry(registry: CapabilityRegistry) -> Self {
        Self {
            registry,
            chunk_label: None,
            crs: None,
            cameras: Vec::new(),
            markers: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Every call issued so far, in order.
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Operation names of all calls, in order.
    pub fn operations(&self) -> Vec<&'static str> {
        self.calls.iter().map(HostCall::operation).collect()
    }

    pub fn chunk_label(&self) -> Option<&str> {
        self.chunk_label.as_deref()
    }

    pub fn crs(&self) -> Option<&CoordinateSystem> {
        self.crs.as_ref()
    }

    pub fn photos(&self) -> Vec<&Path> {
        self.cameras.iter().map(|c| c.photo.as_path()).collect()
    }

    fn record(&mut self, call: HostCall) -> HostResult<()> {
        log::debug!("dry-run host: {}", call.operation());
        self.calls.push(call);
        Ok(())
    }

    fn require_chunk(&self, operation: &str) -> HostResult<()> {
        if self.chunk_label.is_none() {
            return Err(HostError::new(operation, "document has no chunk"));
        }
        Ok(())
    }
}

impl ChunkIntrospection for DryRunHost {
    fn cameras(&self) -> HostResult<Option<Vec<CameraHandle>>> {
        if self.chunk_label.is_none() {
            return Ok(None);
        }
        let handles = self
            .cameras
            .iter()
            .enumerate()
            .map(|(index, cam)| CameraHandle {
                index,
                label: cam
                    .photo
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            })
            .collect();
        Ok(Some(handles))
    }

    fn camera_transform(&self, camera: &CameraHandle) -> HostResult<Option<Transform>> {
        self.cameras
            .get(camera.index)
            .map(|c| c.transform)
            .ok_or_else(|| HostError::new("camera_transform", format!("no camera {}", camera.index)))
    }

    // Nothing is reconstructed, so neither collection exists.
    fn tie_points(&self) -> HostResult<Option<PointSet>> {
        Ok(None)
    }

    fn point_cloud(&self) -> HostResult<Option<PointSet>> {
        Ok(None)
    }

    fn markers(&self) -> HostResult<Option<Vec<MarkerHandle>>> {
        Ok(Some(self.markers.clone()))
    }
}

impl ProcessingHost for DryRunHost {
    fn capabilities(&self) -> &CapabilityRegistry {
        &self.registry
    }

    fn version(&self) -> Option<String> {
        Some(format!("dry-run {}", env!("CARGO_PKG_VERSION")))
    }

    fn clear_document(&mut self) -> HostResult<()> {
        self.chunk_label = None;
        self.crs = None;
        self.cameras.clear();
        self.markers.clear();
        self.record(HostCall::ClearDocument)
    }

    fn add_chunk(&mut self, label: &str) -> HostResult<()> {
        self.chunk_label = Some(label.to_string());
        self.record(HostCall::AddChunk {
            label: label.to_string(),
        })
    }

    fn add_photos(&mut self, photos: &[PathBuf]) -> HostResult<()> {
        self.require_chunk("add_photos")?;
        self.cameras.extend(photos.iter().map(|p| DryRunCamera {
            photo: p.clone(),
            transform: None,
        }));
        self.record(HostCall::AddPhotos {
            paths: photos.to_vec(),
        })
    }

    fn save_document(&mut self, path: &Path) -> HostResult<()> {
        self.record(HostCall::SaveDocument {
            path: path.to_path_buf(),
        })
    }

    fn coordinate_system(&self, definition: &str) -> HostResult<CoordinateSystem> {
        let code = definition.strip_prefix("EPSG::").unwrap_or_default();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(HostError::new(
                "coordinate_system",
                format!("malformed CRS definition {definition:?}"),
            ));
        }
        Ok(CoordinateSystem {
            definition: definition.to_string(),
        })
    }

    fn set_crs(&mut self, crs: &CoordinateSystem) -> HostResult<()> {
        self.require_chunk("set_crs")?;
        self.crs = Some(crs.clone());
        self.record(HostCall::SetCrs { crs: crs.clone() })
    }

    fn update_transform(&mut self) -> HostResult<()> {
        self.record(HostCall::UpdateTransform)
    }

    fn import_reference(&mut self, params: &ReferenceImportParams) -> HostResult<()> {
        self.require_chunk("import_reference")?;
        self.record(HostCall::ImportReference(params.clone()))
    }

    fn match_photos(&mut self, params: &MatchPhotosParams) -> HostResult<()> {
        self.record(HostCall::MatchPhotos(params.clone()))
    }

    fn align_cameras(&mut self, params: &AlignCamerasParams) -> HostResult<()> {
        self.record(HostCall::AlignCameras(params.clone()))
    }

    fn optimize_cameras(&mut self, params: &OptimizeCamerasParams) -> HostResult<()> {
        self.record(HostCall::OptimizeCameras(params.clone()))
    }

    fn build_depth_maps(&mut self, params: &DepthMapsParams) -> HostResult<()> {
        self.record(HostCall::BuildDepthMaps(params.clone()))
    }

    fn build_point_cloud(&mut self, params: &PointCloudParams) -> HostResult<()> {
        self.record(HostCall::BuildPointCloud(params.clone()))
    }

    fn build_dem(&mut self, params: &DemParams) -> HostResult<()> {
        self.record(HostCall::BuildDem(params.clone()))
    }

    fn build_orthomosaic(&mut self, params: &OrthomosaicParams) -> HostResult<()> {
        self.record(HostCall::BuildOrthomosaic(params.clone()))
    }

    fn build_model(&mut self, params: &ModelParams) -> HostResult<()> {
        self.record(HostCall::BuildModel(params.clone()))
    }

    fn build_uv(&mut self, params: &UvParams) -> HostResult<()> {
        self.record(HostCall::BuildUv(params.clone()))
    }

    fn build_texture(&mut self, params: &TextureParams) -> HostResult<()> {
        self.record(HostCall::BuildTexture(params.clone()))
    }

    fn export_report(&mut self, params: &ReportExportParams) -> HostResult<()> {
        self.record(HostCall::ExportReport(params.clone()))
    }

    fn export_raster(&mut self, params: &RasterExportParams) -> HostResult<()> {
        self.record(HostCall::ExportRaster(params.clone()))
    }

    fn export_model(&mut self, params: &ModelExportParams) -> HostResult<()> {
        self.record(HostCall::ExportModel(params.clone()))
    }
}
