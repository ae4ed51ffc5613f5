//! Configuration document access.
//!
//! A run is driven by one JSON document namespaced into `project`, `input`,
//! `reference`, `processing` and `export`. Nothing here validates semantics;
//! consumers read each field with an explicit default and fail at the point
//! of use when a value cannot be coerced.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{PipelineError, Result};
use crate::host::registry::{CapabilityRegistry, Token};

/// A loaded configuration document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Map<String, Value>,
}

/// Load a configuration document from a JSON file.
///
/// # Errors
///
/// Returns [`PipelineError::ConfigLoad`] if the file cannot be read, is not
/// valid JSON, or its top-level value is not an object.
pub fn load(path: &Path) -> Result<Document> {
    let load_err = |reason: String| PipelineError::ConfigLoad {
        path: path.to_path_buf(),
        reason,
    };
    let data = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
    let value: Value = serde_json::from_str(&data).map_err(|e| load_err(e.to_string()))?;
    Document::from_value(value).map_err(|_| load_err("top-level value is not an object".into()))
}

/// Single-level lookup returning `default` when `key` is absent.
pub fn get<'a>(map: &'a Map<String, Value>, key: &str, default: &'a Value) -> &'a Value {
    map.get(key).unwrap_or(default)
}

impl Document {
    /// Wrap an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ConfigLoad`] if `value` is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(PipelineError::ConfigLoad {
                path: Default::default(),
                reason: format!("expected a JSON object, found {}", kind(&other)),
            }),
        }
    }

    /// The whole document as a section.
    pub fn root(&self) -> Section<'_> {
        Section {
            name: "",
            map: Some(&self.root),
        }
    }

    /// Top-level namespace (`project`, `input`, ...).
    pub fn section(&self, key: &'static str) -> Result<Section<'_>> {
        self.root().section(key)
    }

    /// Rewrite a relative `export.output_dir` to an absolute path under `base`.
    ///
    /// This is the only mutation a document sees during a run.
    pub fn normalize_output_dir(&mut self, base: &Path) {
        let Some(Value::Object(export)) = self.root.get_mut("export") else {
            return;
        };
        let Some(Value::String(dir)) = export.get_mut("output_dir") else {
            return;
        };
        if dir.is_empty() || Path::new(dir.as_str()).is_absolute() {
            return;
        }
        let joined = crate::collect::normalize_path(&base.join(dir.as_str()));
        *dir = joined.to_string_lossy().into_owned();
    }
}

/// Borrowed view of one (possibly absent) mapping in the document.
///
/// An absent mapping behaves exactly like an empty one: every accessor
/// returns its default.
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    name: &'a str,
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Section<'a> {
    /// A section with no entries.
    pub fn empty(name: &'a str) -> Self {
        Self { name, map: None }
    }

    /// Section over an explicit map, used for list elements.
    pub fn from_map(name: &'a str, map: &'a Map<String, Value>) -> Self {
        Self {
            name,
            map: Some(map),
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// True if the mapping is absent or has no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_none_or(Map::is_empty)
    }

    /// Raw value for `key`; `None` only when the key is absent.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|m| m.get(key))
    }

    fn key_path(&self, key: &str) -> String {
        if self.name.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.name, key)
        }
    }

    /// Nested mapping. Absent or `null` yields an empty section.
    pub fn section(&self, key: &'a str) -> Result<Section<'a>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(Section::empty(key)),
            Some(Value::Object(map)) => Ok(Section::from_map(key, map)),
            Some(other) => Err(PipelineError::invalid(
                self.key_path(key),
                "a mapping",
                kind(other),
            )),
        }
    }

    /// A list of mappings (e.g. `export.rasters`). Absent or `null` is empty.
    pub fn sections(&self, key: &'a str) -> Result<Vec<Section<'a>>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(Section::from_map(key, map)),
                    other => Err(PipelineError::invalid(
                        self.key_path(key),
                        "a list of mappings",
                        kind(other),
                    )),
                })
                .collect(),
            Some(other) => Err(PipelineError::invalid(
                self.key_path(key),
                "a list of mappings",
                kind(other),
            )),
        }
    }

    /// The section's own `enabled` flag.
    pub fn enabled(&self, default: bool) -> Result<bool> {
        self.bool_or("enabled", default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => coerce_bool(value).ok_or_else(|| {
                PipelineError::invalid(self.key_path(key), "a boolean", value)
            }),
        }
    }

    pub fn int_or(&self, key: &str, default: i64) -> Result<i64> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => coerce_int(value).ok_or_else(|| {
                PipelineError::invalid(self.key_path(key), "an integer", value)
            }),
        }
    }

    pub fn float_or(&self, key: &str, default: f64) -> Result<f64> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => coerce_float(value)
                .ok_or_else(|| PipelineError::invalid(self.key_path(key), "a number", value)),
        }
    }

    pub fn string_or(&self, key: &str, default: &str) -> Result<String> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(default.to_string()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(PipelineError::invalid(
                self.key_path(key),
                "a string",
                other,
            )),
        }
    }

    pub fn strings_or(&self, key: &str, default: &[&str]) -> Result<Vec<String>> {
        let invalid = |found: &Value| {
            PipelineError::invalid(self.key_path(key), "a list of strings", found)
        };
        match self.get(key) {
            None | Some(Value::Null) => Ok(default.iter().map(|s| s.to_string()).collect()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(|| invalid(item)))
                .collect(),
            Some(other) => Err(invalid(other)),
        }
    }

    /// Host token for `key`, falling back to the host constant `default_name`.
    ///
    /// The fallback is itself a required lookup: a host that does not declare
    /// the default constant fails regardless of what the document says.
    pub fn token_or(
        &self,
        key: &str,
        default_name: &str,
        caps: &CapabilityRegistry,
    ) -> Result<Token> {
        let fallback = Token::Constant(caps.require_constant(default_name)?);
        Ok(caps.resolve_optional(self.get(key), fallback))
    }
}

/// Truthiness for flags. Strings must spell a boolean.
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Null => Some(false),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Integers; floats truncate toward zero.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn kind(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(_) => "a boolean".into(),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "a list".into(),
        Value::Object(_) => "a mapping".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn missing_file_is_config_load_error() {
        let err = load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigLoad { .. }));
    }

    #[test]
    fn malformed_json_is_config_load_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{ not json").unwrap();
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigLoad { .. }));
    }

    #[test]
    fn non_object_document_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[1, 2, 3]").unwrap();
        assert!(matches!(
            load(file.path()).unwrap_err(),
            PipelineError::ConfigLoad { .. }
        ));
    }

    #[test]
    fn get_returns_default_when_absent() {
        let map = json!({"a": 1});
        let map = map.as_object().unwrap();
        let fallback = json!("x");
        assert_eq!(get(map, "a", &fallback), &json!(1));
        assert_eq!(get(map, "b", &fallback), &json!("x"));
    }

    #[test]
    fn absent_section_yields_defaults() {
        let d = doc(json!({}));
        let processing = d.section("processing").unwrap();
        let mp = processing.section("match_photos").unwrap();
        assert!(mp.is_empty());
        assert_eq!(mp.int_or("downscale", 1).unwrap(), 1);
        assert!(mp.bool_or("generic_preselection", true).unwrap());
        assert!(mp.enabled(true).unwrap());
    }

    #[test]
    fn null_section_is_absent_but_list_section_is_invalid() {
        let d = doc(json!({"processing": {"build_dem": null, "build_uv": [1]}}));
        let processing = d.section("processing").unwrap();
        assert!(processing.section("build_dem").unwrap().is_empty());
        let err = processing.section("build_uv").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter { ref key, .. } if key == "processing.build_uv"));
    }

    #[test]
    fn coercions_follow_numeric_rules() {
        assert_eq!(coerce_int(&json!(2.9)), Some(2));
        assert_eq!(coerce_int(&json!(-2.9)), Some(-2));
        assert_eq!(coerce_int(&json!("16")), Some(16));
        assert_eq!(coerce_int(&json!(true)), Some(1));
        assert_eq!(coerce_int(&json!("4.5")), None);
        assert_eq!(coerce_int(&Value::Null), None);
        assert_eq!(coerce_float(&json!("0.25")), Some(0.25));
        assert_eq!(coerce_float(&json!(3)), Some(3.0));
        assert_eq!(coerce_bool(&json!(0)), Some(false));
        assert_eq!(coerce_bool(&json!("TRUE")), Some(true));
        assert_eq!(coerce_bool(&Value::Null), Some(false));
        assert_eq!(coerce_bool(&json!("maybe")), None);
        assert_eq!(coerce_bool(&json!([])), None);
    }

    #[test]
    fn string_flags_are_read_by_spelling_not_truthiness() {
        let d = doc(json!({"reference": {"enabled": "false", "load_rotation": "yes"}}));
        let reference = d.section("reference").unwrap();
        assert!(!reference.enabled(true).unwrap());
        match reference.bool_or("load_rotation", true).unwrap_err() {
            PipelineError::InvalidParameter { key, expected, .. } => {
                assert_eq!(key, "reference.load_rotation");
                assert_eq!(expected, "a boolean");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_value_reports_qualified_key() {
        let d = doc(json!({"processing": {"build_depth_maps": {"downscale": "fast"}}}));
        let section = d
            .section("processing")
            .unwrap()
            .section("build_depth_maps")
            .unwrap();
        match section.int_or("downscale", 4).unwrap_err() {
            PipelineError::InvalidParameter { key, expected, .. } => {
                assert_eq!(key, "build_depth_maps.downscale");
                assert_eq!(expected, "an integer");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn strings_or_uses_default_and_validates_items() {
        let d = doc(json!({"input": {"photo_globs": ["*.jpg", 3]}}));
        let input = d.section("input").unwrap();
        assert!(input.strings_or("photo_globs", &["*.png"]).is_err());
        assert_eq!(
            input.strings_or("photo_dirs", &[]).unwrap(),
            Vec::<String>::new()
        );
    }

    #[test]
    fn sections_reads_list_of_mappings() {
        let d = doc(json!({"export": {"rasters": [{"path": "a.tif"}, {"path": "b.tif"}]}}));
        let rasters = d.section("export").unwrap().sections("rasters").unwrap();
        assert_eq!(rasters.len(), 2);
        assert_eq!(rasters[1].string_or("path", "").unwrap(), "b.tif");
    }

    #[test]
    fn normalize_output_dir_only_touches_relative_paths() {
        let mut d = doc(json!({"export": {"output_dir": "out/run1"}}));
        d.normalize_output_dir(Path::new("/srv/recon"));
        let export = d.section("export").unwrap();
        assert_eq!(export.string_or("output_dir", "").unwrap(), "/srv/recon/out/run1");

        let mut d = doc(json!({"export": {"output_dir": "/abs/out"}}));
        d.normalize_output_dir(Path::new("/srv/recon"));
        let export = d.section("export").unwrap();
        assert_eq!(export.string_or("output_dir", "").unwrap(), "/abs/out");
    }
}
