//! Terminal products: elevation model and orthomosaic, or mesh, UV layout
//! and texture.

use serde::{Deserialize, Serialize};

use crate::config::Section;
use crate::error::Result;
use crate::host::{CapabilityRegistry, Token};

/// Digital elevation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemParams {
    pub source_data: Token,
    pub interpolation: Token,
    /// Ground sampling distance; `0` lets the host choose.
    pub resolution: f64,
    pub subdivide_task: bool,
}

impl DemParams {
    pub fn defaults(caps: &CapabilityRegistry) -> Result<Self> {
        Self::from_section(&Section::empty("build_dem"), caps)
    }

    pub fn from_section(s: &Section<'_>, caps: &CapabilityRegistry) -> Result<Self> {
        Ok(Self {
            source_data: s.token_or("source_data", "PointCloudData", caps)?,
            interpolation: s.token_or("interpolation", "EnabledInterpolation", caps)?,
            resolution: s.float_or("resolution", 0.0)?,
            subdivide_task: s.bool_or("subdivide_task", true)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrthomosaicParams {
    pub surface_data: Token,
    pub blending_mode: Token,
    pub fill_holes: bool,
    pub ghosting_filter: bool,
    pub refine_seamlines: bool,
    pub resolution: f64,
    pub subdivide_task: bool,
}

impl OrthomosaicParams {
    pub fn defaults(caps: &CapabilityRegistry) -> Result<Self> {
        Self::from_section(&Section::empty("build_orthomosaic"), caps)
    }

    pub fn from_section(s: &Section<'_>, caps: &CapabilityRegistry) -> Result<Self> {
        Ok(Self {
            surface_data: s.token_or("surface_data", "ElevationData", caps)?,
            blending_mode: s.token_or("blending_mode", "MosaicBlending", caps)?,
            fill_holes: s.bool_or("fill_holes", true)?,
            ghosting_filter: s.bool_or("ghosting_filter", false)?,
            refine_seamlines: s.bool_or("refine_seamlines", false)?,
            resolution: s.float_or("resolution", 0.0)?,
            subdivide_task: s.bool_or("subdivide_task", true)?,
        })
    }
}

/// Polygonal mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub surface_type: Token,
    pub interpolation: Token,
    pub face_count: Token,
    /// Only used by the host when `face_count` selects a custom budget.
    pub face_count_custom: i64,
    pub source_data: Token,
    pub vertex_colors: bool,
    pub vertex_confidence: bool,
    pub keep_depth: bool,
}

impl ModelParams {
    pub fn defaults(caps: &CapabilityRegistry) -> Result<Self> {
        Self::from_section(&Section::empty("build_model"), caps)
    }

    pub fn from_section(s: &Section<'_>, caps: &CapabilityRegistry) -> Result<Self> {
        Ok(Self {
            surface_type: s.token_or("surface_type", "Arbitrary", caps)?,
            interpolation: s.token_or("interpolation", "EnabledInterpolation", caps)?,
            face_count: s.token_or("face_count", "HighFaceCount", caps)?,
            face_count_custom: s.int_or("face_count_custom", 200_000)?,
            source_data: s.token_or("source_data", "DepthMapsData", caps)?,
            vertex_colors: s.bool_or("vertex_colors", true)?,
            vertex_confidence: s.bool_or("vertex_confidence", true)?,
            keep_depth: s.bool_or("keep_depth", true)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvParams {
    pub mapping_mode: Token,
    pub page_count: i64,
    pub texture_size: i64,
    pub pixel_size: f64,
}

impl UvParams {
    pub fn defaults(caps: &CapabilityRegistry) -> Result<Self> {
        Self::from_section(&Section::empty("build_uv"), caps)
    }

    pub fn from_section(s: &Section<'_>, caps: &CapabilityRegistry) -> Result<Self> {
        Ok(Self {
            mapping_mode: s.token_or("mapping_mode", "GenericMapping", caps)?,
            page_count: s.int_or("page_count", 1)?,
            texture_size: s.int_or("texture_size", 8192)?,
            pixel_size: s.float_or("pixel_size", 0.0)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureParams {
    pub blending_mode: Token,
    pub texture_size: i64,
    pub downscale: i64,
    pub sharpening: i64,
    pub fill_holes: bool,
    pub ghosting_filter: bool,
    pub texture_type: Token,
    pub source_data: Token,
    pub transfer_texture: bool,
    pub anti_aliasing: i64,
}

impl TextureParams {
    pub fn defaults(caps: &CapabilityRegistry) -> Result<Self> {
        Self::from_section(&Section::empty("build_texture"), caps)
    }

    pub fn from_section(s: &Section<'_>, caps: &CapabilityRegistry) -> Result<Self> {
        Ok(Self {
            blending_mode: s.token_or("blending_mode", "NaturalBlending", caps)?,
            texture_size: s.int_or("texture_size", 8192)?,
            downscale: s.int_or("downscale", 2)?,
            sharpening: s.int_or("sharpening", 1)?,
            fill_holes: s.bool_or("fill_holes", true)?,
            ghosting_filter: s.bool_or("ghosting_filter", true)?,
            texture_type: s.token_or("texture_type", "DiffuseMap", caps)?,
            source_data: s.token_or("source_data", "ImagesData", caps)?,
            transfer_texture: s.bool_or("transfer_texture", true)?,
            anti_aliasing: s.int_or("anti_aliasing", 1)?,
        })
    }
}
