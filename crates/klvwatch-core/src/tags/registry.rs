//! Immutable tag templates shared by every decoder.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::table::ST0601_TAGS;

/// Name, unit and declared range of a tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagTemplate {
    pub id: u8,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot read registry file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid range for tag {tag}: [{min}, {max}]")]
    InvalidRange { tag: u8, min: f64, max: f64 },
    #[error("tag {tag} is listed more than once")]
    DuplicateTag { tag: u8 },
}

/// Tag templates keyed by tag id.
///
/// # Examples
/// ```
/// use klvwatch_core::tags::TagRegistry;
///
/// let overrides = r#"[{"id": 1, "name": "Heading", "unit": "deg", "min": 0, "max": 360}]"#;
/// let registry = TagRegistry::st0601().with_overrides_from_json(overrides).unwrap();
/// assert_eq!(registry.get(1).unwrap().name, "Heading");
/// assert_eq!(registry.get(2).unwrap().name, "Precision Time Stamp");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagRegistry {
    templates: BTreeMap<u8, TagTemplate>,
}

impl TagRegistry {
    /// Default templates for ST 0601 tags 1 through 143.
    pub fn st0601() -> Self {
        let templates = ST0601_TAGS
            .iter()
            .map(|spec| {
                let template = TagTemplate {
                    id: spec.id,
                    name: spec.name.to_string(),
                    unit: spec.unit.to_string(),
                    min: spec.min,
                    max: spec.max,
                };
                (spec.id, template)
            })
            .collect();
        Self { templates }
    }

    /// Build a registry from scratch.
    ///
    /// # Errors
    /// `RegistryError::DuplicateTag` or `RegistryError::InvalidRange`.
    pub fn from_templates(templates: Vec<TagTemplate>) -> Result<Self, RegistryError> {
        Self::default().with_overrides(templates)
    }

    /// Replace or add templates. Tags not listed keep their current template.
    ///
    /// # Errors
    /// `RegistryError::DuplicateTag` when a tag appears twice in `overrides`,
    /// `RegistryError::InvalidRange` when `min > max` or a bound is not finite.
    pub fn with_overrides(mut self, overrides: Vec<TagTemplate>) -> Result<Self, RegistryError> {
        let mut seen = BTreeSet::new();
        for template in overrides {
            validate_range(&template)?;
            if !seen.insert(template.id) {
                return Err(RegistryError::DuplicateTag { tag: template.id });
            }
            self.templates.insert(template.id, template);
        }
        Ok(self)
    }

    /// Apply overrides given as a JSON array of templates.
    ///
    /// # Errors
    /// `RegistryError::Json` for malformed input, otherwise as
    /// [`TagRegistry::with_overrides`].
    pub fn with_overrides_from_json(self, json: &str) -> Result<Self, RegistryError> {
        let overrides: Vec<TagTemplate> = serde_json::from_str(json)?;
        self.with_overrides(overrides)
    }

    /// Apply overrides read from a JSON file.
    ///
    /// # Errors
    /// `RegistryError::Io` when the file cannot be read, otherwise as
    /// [`TagRegistry::with_overrides_from_json`].
    pub fn with_overrides_from_file(self, path: &Path) -> Result<Self, RegistryError> {
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.with_overrides_from_json(&json)
    }

    pub fn get(&self, tag: u8) -> Option<&TagTemplate> {
        self.templates.get(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn validate_range(template: &TagTemplate) -> Result<(), RegistryError> {
    let (min, max) = (template.min, template.max);
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(RegistryError::InvalidRange {
            tag: template.id,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{RegistryError, TagRegistry, TagTemplate};

    fn template(id: u8, min: f64, max: f64) -> TagTemplate {
        TagTemplate {
            id,
            name: format!("tag {id}"),
            unit: String::new(),
            min,
            max,
        }
    }

    #[test]
    fn defaults_cover_all_table_rows() {
        let registry = TagRegistry::st0601();
        assert_eq!(registry.len(), 143);
        let heading = registry.get(5).unwrap();
        assert_eq!(heading.unit, "deg");
        assert_eq!((heading.min, heading.max), (0.0, 360.0));
    }

    #[test]
    fn overrides_replace_and_extend() {
        let registry = TagRegistry::st0601()
            .with_overrides(vec![template(1, 0.0, 360.0), template(200, -1.0, 1.0)])
            .unwrap();
        assert_eq!(registry.get(1).unwrap().max, 360.0);
        assert_eq!(registry.get(200).unwrap().name, "tag 200");
        assert_eq!(registry.len(), 144);
    }

    #[test]
    fn duplicate_override_is_rejected() {
        let err = TagRegistry::from_templates(vec![template(3, 0.0, 1.0), template(3, 0.0, 2.0)])
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTag { tag: 3 }));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = TagRegistry::from_templates(vec![template(9, 10.0, 1.0)]).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidRange { tag: 9, .. }));
        assert!(err.to_string().contains("tag 9"));
    }

    #[test]
    fn json_defaults_unit_and_range() {
        let registry = TagRegistry::default()
            .with_overrides_from_json(r#"[{"id": 4, "name": "Tail"}]"#)
            .unwrap();
        let tail = registry.get(4).unwrap();
        assert_eq!(tail.unit, "");
        assert_eq!((tail.min, tail.max), (0.0, 0.0));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = TagRegistry::st0601()
            .with_overrides_from_json("{not json")
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid registry JSON"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TagRegistry::st0601()
            .with_overrides_from_file(std::path::Path::new("/nonexistent/registry.json"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
    }
}
