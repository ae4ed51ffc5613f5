//! Pipeline progress and product stage selection.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PipelineError, Result};

/// How far the run has progressed.
///
/// ```text
/// Initialized → Referenced → Matched → Aligned → Optimized → DenseBuilt
///     → { TerrainBuilt | MeshBuilt } → Exported
/// ```
///
/// `Referenced` is only entered when a CRS or reference import was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Initialized,
    Referenced,
    Matched,
    Aligned,
    Optimized,
    DenseBuilt,
    TerrainBuilt,
    MeshBuilt,
    Exported,
}

impl PipelineState {
    pub fn name(self) -> &'static str {
        match self {
            PipelineState::Initialized => "initialized",
            PipelineState::Referenced => "referenced",
            PipelineState::Matched => "matched",
            PipelineState::Aligned => "aligned",
            PipelineState::Optimized => "optimized",
            PipelineState::DenseBuilt => "dense_built",
            PipelineState::TerrainBuilt => "terrain_built",
            PipelineState::MeshBuilt => "mesh_built",
            PipelineState::Exported => "exported",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Product pipeline run after camera optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Dense cloud, elevation model and orthomosaic.
    AerialProducts,
    /// Same operations as [`Stage::AerialProducts`].
    AerialDemOrtho,
    /// Dense cloud, mesh, UV layout and texture.
    ObjectModelTexture,
}

/// Which terminal operations a stage runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Terrain,
    Mesh,
}

impl Stage {
    pub const DEFAULT: &'static str = "aerial_products";

    /// # Errors
    ///
    /// [`PipelineError::UnknownStage`] for any other spelling.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "aerial_products" => Ok(Stage::AerialProducts),
            "aerial_dem_ortho" => Ok(Stage::AerialDemOrtho),
            "object_model_texture" => Ok(Stage::ObjectModelTexture),
            other => Err(PipelineError::UnknownStage(other.to_string())),
        }
    }

    /// Label of a raw `processing.stage` value as it appears in the run log.
    pub fn label(value: Option<&Value>) -> String {
        match value {
            None => Self::DEFAULT.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Stage from a raw `processing.stage` value; absent selects
    /// [`DEFAULT`](Self::DEFAULT).
    ///
    /// # Errors
    ///
    /// [`PipelineError::UnknownStage`] for unknown strings and any non-string
    /// value, including `null`.
    pub fn from_config(value: Option<&Value>) -> Result<Self> {
        match value {
            None => Self::parse(Self::DEFAULT),
            Some(Value::String(s)) => Self::parse(s),
            Some(other) => Err(PipelineError::UnknownStage(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::AerialProducts => "aerial_products",
            Stage::AerialDemOrtho => "aerial_dem_ortho",
            Stage::ObjectModelTexture => "object_model_texture",
        }
    }

    pub fn branch(self) -> Branch {
        match self {
            Stage::AerialProducts | Stage::AerialDemOrtho => Branch::Terrain,
            Stage::ObjectModelTexture => Branch::Mesh,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
