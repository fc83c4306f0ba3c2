use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DiffError, DiffResult};

/// Configuration for a [`TreeDiffer`](crate::TreeDiffer).
///
/// Every field is optional in TOML; missing fields take their defaults.
///
/// ```toml
/// flatten_paths = true
/// max_depth = 4
/// path_separator = "/"
///
/// [strategy]
/// ignore_key_prefixes = ["_"]
/// float_tolerance = 1e-6
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DifferConfig {
    /// Produce a single-level path-keyed result.
    pub flatten_paths: bool,
    /// Report side-only mapping subtrees as summary strings.
    pub summarize_collapsed_subtrees: bool,
    /// Maximum length of a summary before it is cut.
    pub summary_max_length: usize,
    /// No comparison happens below paths longer than this.
    pub max_depth: Option<usize>,
    /// Separator between path segments in flattened keys.
    pub path_separator: String,
    /// Rules for the [`RuleStrategy`](crate::RuleStrategy).
    pub strategy: StrategyConfig,
}

impl Default for DifferConfig {
    fn default() -> Self {
        Self {
            flatten_paths: false,
            summarize_collapsed_subtrees: false,
            summary_max_length: 80,
            max_depth: None,
            path_separator: ".".to_string(),
            strategy: StrategyConfig::default(),
        }
    }
}

/// Rules for a [`RuleStrategy`](crate::RuleStrategy).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyConfig {
    pub ignore_key_prefixes: Vec<String>,
    pub float_tolerance: Option<f64>,
    pub shallow_segments: Vec<String>,
    pub summary_segments: Vec<String>,
    pub zip_mapping_lists: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            ignore_key_prefixes: Vec::new(),
            float_tolerance: None,
            shallow_segments: Vec::new(),
            summary_segments: Vec::new(),
            zip_mapping_lists: true,
        }
    }
}

impl DifferConfig {
    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> DiffResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| DiffError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> DiffResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DiffError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "loaded differ config");
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> DiffResult<String> {
        toml::to_string(self).map_err(|e| DiffError::Config(e.to_string()))
    }

    /// Reject values the differ cannot work with.
    pub fn validate(&self) -> DiffResult<()> {
        if self.summary_max_length == 0 {
            return Err(DiffError::Config(
                "summary_max_length must be at least 1".into(),
            ));
        }
        if let Some(epsilon) = self.strategy.float_tolerance {
            if !epsilon.is_finite() || epsilon < 0.0 {
                return Err(DiffError::Config(format!(
                    "float_tolerance must be a finite, non-negative number, got {epsilon}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = DifferConfig::default();
        assert!(!c.flatten_paths);
        assert!(!c.summarize_collapsed_subtrees);
        assert_eq!(c.summary_max_length, 80);
        assert!(c.max_depth.is_none());
        assert_eq!(c.path_separator, ".");
        assert!(c.strategy.zip_mapping_lists);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(DifferConfig::from_toml_str("").unwrap(), DifferConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let c = DifferConfig::from_toml_str(
            r#"
            flatten_paths = true
            summarize_collapsed_subtrees = true
            summary_max_length = 40
            max_depth = 3
            path_separator = "/"

            [strategy]
            ignore_key_prefixes = ["_", "tmp"]
            float_tolerance = 1e-6
            shallow_segments = ["meta"]
            summary_segments = ["data"]
            zip_mapping_lists = false
            "#,
        )
        .unwrap();
        assert!(c.flatten_paths);
        assert_eq!(c.summary_max_length, 40);
        assert_eq!(c.max_depth, Some(3));
        assert_eq!(c.path_separator, "/");
        assert_eq!(c.strategy.ignore_key_prefixes, vec!["_", "tmp"]);
        assert_eq!(c.strategy.float_tolerance, Some(1e-6));
        assert!(!c.strategy.zip_mapping_lists);
    }

    #[test]
    fn unknown_field_rejected() {
        let err = DifferConfig::from_toml_str("flatten = true").unwrap_err();
        assert!(matches!(err, DiffError::Config(_)));
    }

    #[test]
    fn zero_summary_length_rejected() {
        let err = DifferConfig::from_toml_str("summary_max_length = 0").unwrap_err();
        assert!(err.to_string().contains("summary_max_length"));
    }

    #[test]
    fn negative_tolerance_rejected() {
        let err = DifferConfig::from_toml_str("[strategy]\nfloat_tolerance = -0.5").unwrap_err();
        assert!(err.to_string().contains("float_tolerance"));
    }

    #[test]
    fn toml_roundtrip() {
        let mut c = DifferConfig::default();
        c.max_depth = Some(2);
        c.strategy.shallow_segments.push("meta".into());
        let text = c.to_toml_string().unwrap();
        assert_eq!(DifferConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("differ.toml");
        std::fs::write(&path, "flatten_paths = true\n").unwrap();
        assert!(DifferConfig::from_file(&path).unwrap().flatten_paths);

        let missing = DifferConfig::from_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, DiffError::Io { .. }));
    }
}
