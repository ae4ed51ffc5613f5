//! Report, raster and model exports.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Section;
use crate::error::Result;
use crate::host::{CapabilityRegistry, Token};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportExportParams {
    pub path: PathBuf,
    pub title: String,
    pub description: String,
    pub font_size: i64,
    pub page_numbers: bool,
    pub save_system_info: bool,
}

impl ReportExportParams {
    /// `output_dir` supplies the default path `<output_dir>/report.pdf`.
    pub fn from_section(s: &Section<'_>, output_dir: &Path) -> Result<Self> {
        Ok(Self {
            path: path_or(s, "path", output_dir.join("report.pdf"))?,
            title: s.string_or("title", "")?,
            description: s.string_or("description", "")?,
            font_size: s.int_or("font_size", 12)?,
            page_numbers: s.bool_or("page_numbers", true)?,
            save_system_info: s.bool_or("save_system_info", true)?,
        })
    }
}

/// One raster export (elevation model or orthomosaic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterExportParams {
    /// Empty means "not configured"; such entries are skipped.
    pub path: PathBuf,
    pub format: Token,
    pub image_format: Token,
    pub source_data: Token,
    pub save_world: bool,
    pub save_alpha: bool,
    pub white_background: bool,
    pub clip_to_boundary: bool,
}

impl RasterExportParams {
    pub fn from_section(s: &Section<'_>, caps: &CapabilityRegistry) -> Result<Self> {
        Ok(Self {
            path: PathBuf::from(s.string_or("path", "")?),
            format: s.token_or("format", "RasterFormatGeoTIFF", caps)?,
            image_format: s.token_or("image_format", "ImageFormatNone", caps)?,
            source_data: s.token_or("source_data", "OrthomosaicData", caps)?,
            save_world: s.bool_or("save_world", true)?,
            save_alpha: s.bool_or("save_alpha", true)?,
            white_background: s.bool_or("white_background", true)?,
            clip_to_boundary: s.bool_or("clip_to_boundary", true)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelExportParams {
    pub path: PathBuf,
    pub format: Token,
    pub texture_format: Token,
    pub save_texture: bool,
    pub save_uv: bool,
    pub save_normals: bool,
    pub save_colors: bool,
    pub binary: bool,
}

impl ModelExportParams {
    /// `output_dir` supplies the default path `<output_dir>/model.obj`.
    pub fn from_section(
        s: &Section<'_>,
        output_dir: &Path,
        caps: &CapabilityRegistry,
    ) -> Result<Self> {
        Ok(Self {
            path: path_or(s, "path", output_dir.join("model.obj"))?,
            format: s.token_or("format", "ModelFormatOBJ", caps)?,
            texture_format: s.token_or("texture_format", "ImageFormatJPEG", caps)?,
            save_texture: s.bool_or("save_texture", true)?,
            save_uv: s.bool_or("save_uv", true)?,
            save_normals: s.bool_or("save_normals", true)?,
            save_colors: s.bool_or("save_colors", true)?,
            binary: s.bool_or("binary", true)?,
        })
    }
}

fn path_or(s: &Section<'_>, key: &str, default: PathBuf) -> Result<PathBuf> {
    match s.get(key) {
        None => Ok(default),
        Some(_) => Ok(PathBuf::from(s.string_or(key, "")?)),
    }
}
