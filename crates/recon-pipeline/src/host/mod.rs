//! Processing host surface.
//!
//! All geometry and imagery work happens inside an external reconstruction
//! host. The pipeline talks to it only through [`ProcessingHost`] (operations)
//! and [`ChunkIntrospection`] (read-only state used for QC).

pub mod dry_run;
pub mod registry;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::{
    AlignCamerasParams, DemParams, DepthMapsParams, MatchPhotosParams, ModelExportParams,
    ModelParams, OptimizeCamerasParams, OrthomosaicParams, PointCloudParams, RasterExportParams,
    ReferenceImportParams, ReportExportParams, TextureParams, UvParams,
};

pub use dry_run::{DryRunHost, HostCall};
pub use registry::{COORDINATE_SYSTEM, Capability, CapabilityRegistry, HostConstant, Token};

/// Failure reported by the host for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("host operation {operation} failed: {message}")]
pub struct HostError {
    pub operation: String,
    pub message: String,
}

impl HostError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

pub type HostResult<T> = Result<T, HostError>;

/// Coordinate reference system built by the host (e.g. `EPSG::32641`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    pub definition: String,
}

/// Camera pose as a row-major 4×4 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform(pub [f64; 16]);

impl Transform {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);
}

/// Opaque reference to a camera inside the current chunk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraHandle {
    pub index: usize,
    pub label: String,
}

/// Opaque reference to a marker (ground control point) in the current chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerHandle {
    pub label: String,
}

/// A sparse or dense point collection as seen from outside the host.
///
/// The host may expose the collection without being able to report how many
/// points it holds, or fail while counting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointSet {
    points: HostResult<Option<u64>>,
}

impl PointSet {
    pub fn counted(points: u64) -> Self {
        Self {
            points: Ok(Some(points)),
        }
    }

    /// Collection present, point count not exposed.
    pub fn uncounted() -> Self {
        Self { points: Ok(None) }
    }

    /// Collection present, counting raises.
    pub fn failing(error: HostError) -> Self {
        Self { points: Err(error) }
    }

    pub fn point_count(&self) -> HostResult<Option<u64>> {
        self.points.clone()
    }
}

/// Read-only view of the working chunk.
///
/// Every accessor distinguishes three outcomes: `Ok(Some(_))` the attribute
/// is available, `Ok(None)` the host does not expose it, `Err(_)` the host
/// raised while reading it.
pub trait ChunkIntrospection {
    fn cameras(&self) -> HostResult<Option<Vec<CameraHandle>>>;
    fn camera_transform(&self, camera: &CameraHandle) -> HostResult<Option<Transform>>;
    fn tie_points(&self) -> HostResult<Option<PointSet>>;
    fn point_cloud(&self) -> HostResult<Option<PointSet>>;
    fn markers(&self) -> HostResult<Option<Vec<MarkerHandle>>>;
}

/// Operations the pipeline issues against the reconstruction host.
///
/// Calls are blocking and strictly ordered; each must complete before the
/// next one is issued.
pub trait ProcessingHost: ChunkIntrospection {
    /// Constants and constructors declared by this host binding.
    fn capabilities(&self) -> &CapabilityRegistry;

    fn version(&self) -> Option<String>;

    // ── document lifecycle ──────────────────────────────────────────────────
    fn clear_document(&mut self) -> HostResult<()>;
    fn add_chunk(&mut self, label: &str) -> HostResult<()>;
    fn add_photos(&mut self, photos: &[PathBuf]) -> HostResult<()>;
    fn save_document(&mut self, path: &Path) -> HostResult<()>;

    // ── referencing ─────────────────────────────────────────────────────────
    fn coordinate_system(&self, definition: &str) -> HostResult<CoordinateSystem>;
    fn set_crs(&mut self, crs: &CoordinateSystem) -> HostResult<()>;
    fn update_transform(&mut self) -> HostResult<()>;
    fn import_reference(&mut self, params: &ReferenceImportParams) -> HostResult<()>;

    // ── alignment ───────────────────────────────────────────────────────────
    fn match_photos(&mut self, params: &MatchPhotosParams) -> HostResult<()>;
    fn align_cameras(&mut self, params: &AlignCamerasParams) -> HostResult<()>;
    fn optimize_cameras(&mut self, params: &OptimizeCamerasParams) -> HostResult<()>;

    // ── dense reconstruction ────────────────────────────────────────────────
    fn build_depth_maps(&mut self, params: &DepthMapsParams) -> HostResult<()>;
    fn build_point_cloud(&mut self, params: &PointCloudParams) -> HostResult<()>;

    // ── products ────────────────────────────────────────────────────────────
    fn build_dem(&mut self, params: &DemParams) -> HostResult<()>;
    fn build_orthomosaic(&mut self, params: &OrthomosaicParams) -> HostResult<()>;
    fn build_model(&mut self, params: &ModelParams) -> HostResult<()>;
    fn build_uv(&mut self, params: &UvParams) -> HostResult<()>;
    fn build_texture(&mut self, params: &TextureParams) -> HostResult<()>;

    // ── export ──────────────────────────────────────────────────────────────
    fn export_report(&mut self, params: &ReportExportParams) -> HostResult<()>;
    fn export_raster(&mut self, params: &RasterExportParams) -> HostResult<()>;
    fn export_model(&mut self, params: &ModelExportParams) -> HostResult<()>;
}
