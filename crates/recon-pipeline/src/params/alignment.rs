//! Feature matching, camera alignment and camera optimization.

use serde::{Deserialize, Serialize};

use crate::config::Section;
use crate::error::Result;

/// Parameters for feature detection and matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPhotosParams {
    pub downscale: i64,
    pub generic_preselection: bool,
    pub reference_preselection: bool,
    pub filter_mask: bool,
    pub mask_tiepoints: bool,
    pub filter_stationary_points: bool,
    pub keypoint_limit: i64,
    pub tiepoint_limit: i64,
    pub guided_matching: bool,
    pub reset_matches: bool,
    pub subdivide_task: bool,
}

impl Default for MatchPhotosParams {
    fn default() -> Self {
        Self {
            downscale: 1,
            generic_preselection: true,
            reference_preselection: true,
            filter_mask: false,
            mask_tiepoints: true,
            filter_stationary_points: true,
            keypoint_limit: 40_000,
            tiepoint_limit: 4_000,
            guided_matching: false,
            reset_matches: false,
            subdivide_task: true,
        }
    }
}

impl MatchPhotosParams {
    pub fn from_section(s: &Section<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            downscale: s.int_or("downscale", d.downscale)?,
            generic_preselection: s.bool_or("generic_preselection", d.generic_preselection)?,
            reference_preselection: s
                .bool_or("reference_preselection", d.reference_preselection)?,
            filter_mask: s.bool_or("filter_mask", d.filter_mask)?,
            mask_tiepoints: s.bool_or("mask_tiepoints", d.mask_tiepoints)?,
            filter_stationary_points: s
                .bool_or("filter_stationary_points", d.filter_stationary_points)?,
            keypoint_limit: s.int_or("keypoint_limit", d.keypoint_limit)?,
            tiepoint_limit: s.int_or("tiepoint_limit", d.tiepoint_limit)?,
            guided_matching: s.bool_or("guided_matching", d.guided_matching)?,
            reset_matches: s.bool_or("reset_matches", d.reset_matches)?,
            subdivide_task: s.bool_or("subdivide_task", d.subdivide_task)?,
        })
    }
}

/// Parameters for camera alignment (sparse bundle adjustment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignCamerasParams {
    pub min_image: i64,
    pub adaptive_fitting: bool,
    pub reset_alignment: bool,
    pub subdivide_task: bool,
    pub align_laser_scans: bool,
}

impl Default for AlignCamerasParams {
    fn default() -> Self {
        Self {
            min_image: 2,
            adaptive_fitting: false,
            reset_alignment: false,
            subdivide_task: true,
            align_laser_scans: false,
        }
    }
}

impl AlignCamerasParams {
    pub fn from_section(s: &Section<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            min_image: s.int_or("min_image", d.min_image)?,
            adaptive_fitting: s.bool_or("adaptive_fitting", d.adaptive_fitting)?,
            reset_alignment: s.bool_or("reset_alignment", d.reset_alignment)?,
            subdivide_task: s.bool_or("subdivide_task", d.subdivide_task)?,
            align_laser_scans: s.bool_or("align_laser_scans", d.align_laser_scans)?,
        })
    }
}

/// Which calibration coefficients camera optimization may refine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeCamerasParams {
    pub fit_f: bool,
    pub fit_cx: bool,
    pub fit_cy: bool,
    pub fit_b1: bool,
    pub fit_b2: bool,
    pub fit_k1: bool,
    pub fit_k2: bool,
    pub fit_k3: bool,
    pub fit_k4: bool,
    pub fit_p1: bool,
    pub fit_p2: bool,
    pub fit_corrections: bool,
    pub adaptive_fitting: bool,
    pub tiepoint_covariance: bool,
}

impl Default for OptimizeCamerasParams {
    fn default() -> Self {
        Self {
            fit_f: true,
            fit_cx: true,
            fit_cy: true,
            fit_b1: false,
            fit_b2: false,
            fit_k1: true,
            fit_k2: true,
            fit_k3: true,
            fit_k4: false,
            fit_p1: true,
            fit_p2: true,
            fit_corrections: false,
            adaptive_fitting: false,
            tiepoint_covariance: false,
        }
    }
}

impl OptimizeCamerasParams {
    pub fn from_section(s: &Section<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            fit_f: s.bool_or("fit_f", d.fit_f)?,
            fit_cx: s.bool_or("fit_cx", d.fit_cx)?,
            fit_cy: s.bool_or("fit_cy", d.fit_cy)?,
            fit_b1: s.bool_or("fit_b1", d.fit_b1)?,
            fit_b2: s.bool_or("fit_b2", d.fit_b2)?,
            fit_k1: s.bool_or("fit_k1", d.fit_k1)?,
            fit_k2: s.bool_or("fit_k2", d.fit_k2)?,
            fit_k3: s.bool_or("fit_k3", d.fit_k3)?,
            fit_k4: s.bool_or("fit_k4", d.fit_k4)?,
            fit_p1: s.bool_or("fit_p1", d.fit_p1)?,
            fit_p2: s.bool_or("fit_p2", d.fit_p2)?,
            fit_corrections: s.bool_or("fit_corrections", d.fit_corrections)?,
            adaptive_fitting: s.bool_or("adaptive_fitting", d.adaptive_fitting)?,
            tiepoint_covariance: s.bool_or("tiepoint_covariance", d.tiepoint_covariance)?,
        })
    }
}
