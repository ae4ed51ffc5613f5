//! Per-operation parameter sets.
//!
//! Each host operation has a parameter struct whose fields are read one by
//! one from the operation's optional configuration mapping, every field with
//! its own built-in default. A missing mapping therefore means "all
//! defaults"; only the mapping's `enabled` flag can skip an operation.
//!
//! Token-valued defaults name host constants and are resolved against the
//! host's [`CapabilityRegistry`](crate::host::CapabilityRegistry), so building
//! parameters needs the registry even when the mapping is empty.

mod alignment;
mod dense;
mod export;
mod products;
mod reference;

pub use alignment::{AlignCamerasParams, MatchPhotosParams, OptimizeCamerasParams};
pub use dense::{DepthMapsParams, PointCloudParams};
pub use export::{ModelExportParams, RasterExportParams, ReportExportParams};
pub use products::{DemParams, ModelParams, OrthomosaicParams, TextureParams, UvParams};
pub use reference::{ReferenceImportParams, crs_definition};
