//! Reference (camera positions / ground control) import.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Section;
use crate::error::{PipelineError, Result};
use crate::host::{CapabilityRegistry, CoordinateSystem, Token};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceImportParams {
    pub path: String,
    pub format: Token,
    pub columns: String,
    pub delimiter: String,
    pub group_delimiters: bool,
    pub skip_rows: i64,
    pub items: Token,
    /// Coordinate system of the reference file; filled in by the engine
    /// because construction goes through the host.
    pub crs: Option<CoordinateSystem>,
    pub create_markers: bool,
    pub ignore_labels: bool,
    pub threshold: f64,
    pub load_rotation: bool,
    pub load_location_accuracy: bool,
    pub load_rotation_accuracy: bool,
    pub load_enabled: bool,
}

impl ReferenceImportParams {
    /// Read the `reference` mapping.
    ///
    /// # Errors
    ///
    /// [`PipelineError::ReferenceConfig`] if `path` is empty.
    pub fn from_section(s: &Section<'_>, caps: &CapabilityRegistry) -> Result<Self> {
        let path = s.string_or("path", "")?;
        if path.is_empty() {
            return Err(PipelineError::ReferenceConfig(
                "reference.enabled is true but reference.path is empty".into(),
            ));
        }
        Ok(Self {
            path,
            format: s.token_or("format", "ReferenceFormatCSV", caps)?,
            columns: s.string_or("columns", "")?,
            delimiter: s.string_or("delimiter", ",")?,
            group_delimiters: s.bool_or("group_delimiters", false)?,
            skip_rows: s.int_or("skip_rows", 0)?,
            items: s.token_or("items", "ReferenceItemsAll", caps)?,
            crs: None,
            create_markers: s.bool_or("create_markers", false)?,
            ignore_labels: s.bool_or("ignore_labels", false)?,
            threshold: s.float_or("threshold", 0.1)?,
            load_rotation: s.bool_or("load_rotation", true)?,
            load_location_accuracy: s.bool_or("load_location_accuracy", false)?,
            load_rotation_accuracy: s.bool_or("load_rotation_accuracy", false)?,
            load_enabled: s.bool_or("load_enabled", false)?,
        })
    }
}

/// CRS definition string from a `crs_epsg` field.
///
/// Strings are taken verbatim (`"EPSG::32641"`); bare integers expand to
/// `EPSG::<code>`. Absent, `null` and empty strings mean "no CRS".
pub fn crs_definition(s: &Section<'_>, key: &str) -> Result<Option<String>> {
    match s.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(def)) if def.trim().is_empty() => Ok(None),
        Some(Value::String(def)) => Ok(Some(def.trim().to_string())),
        Some(Value::Number(n)) if n.as_u64().is_some() => Ok(Some(format!("EPSG::{n}"))),
        Some(other) => Err(PipelineError::invalid(
            format!("{}.{key}", s.name()),
            "an EPSG string or code",
            other,
        )),
    }
}
