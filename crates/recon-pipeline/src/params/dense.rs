//! Depth maps and dense point cloud.

use serde::{Deserialize, Serialize};

use crate::config::Section;
use crate::error::Result;
use crate::host::{CapabilityRegistry, Token};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthMapsParams {
    pub downscale: i64,
    pub filter_mode: Token,
    pub reuse_depth: bool,
    pub max_neighbors: i64,
    pub subdivide_task: bool,
}

impl DepthMapsParams {
    pub fn defaults(caps: &CapabilityRegistry) -> Result<Self> {
        Self::from_section(&Section::empty("build_depth_maps"), caps)
    }

    pub fn from_section(s: &Section<'_>, caps: &CapabilityRegistry) -> Result<Self> {
        Ok(Self {
            downscale: s.int_or("downscale", 4)?,
            filter_mode: s.token_or("filter_mode", "MildFiltering", caps)?,
            reuse_depth: s.bool_or("reuse_depth", false)?,
            max_neighbors: s.int_or("max_neighbors", 16)?,
            subdivide_task: s.bool_or("subdivide_task", true)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloudParams {
    pub source_data: Token,
    pub point_colors: bool,
    pub point_confidence: bool,
    pub keep_depth: bool,
    pub max_neighbors: i64,
    pub uniform_sampling: bool,
    pub points_spacing: f64,
    pub subdivide_task: bool,
}

impl PointCloudParams {
    pub fn defaults(caps: &CapabilityRegistry) -> Result<Self> {
        Self::from_section(&Section::empty("build_point_cloud"), caps)
    }

    pub fn from_section(s: &Section<'_>, caps: &CapabilityRegistry) -> Result<Self> {
        Ok(Self {
            source_data: s.token_or("source_data", "DepthMapsData", caps)?,
            point_colors: s.bool_or("point_colors", true)?,
            point_confidence: s.bool_or("point_confidence", false)?,
            keep_depth: s.bool_or("keep_depth", true)?,
            max_neighbors: s.int_or("max_neighbors", 100)?,
            uniform_sampling: s.bool_or("uniform_sampling", true)?,
            points_spacing: s.float_or("points_spacing", 0.1)?,
            subdivide_task: s.bool_or("subdivide_task", true)?,
        })
    }
}
