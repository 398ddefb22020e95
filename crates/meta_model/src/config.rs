//! Metamodel configuration.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, ModelResult};

/// Maps names matching `pattern` to a CSS class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssClassPattern {
    /// Regular expression; must match the whole name.
    pub pattern: String,
    pub css_class: String,
}

impl CssClassPattern {
    pub fn new(pattern: impl Into<String>, css_class: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            css_class: css_class.into(),
        }
    }
}

/// Settings for the post-build validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Rule ids that are not evaluated.
    pub disabled_rules: Vec<String>,
    /// Treat warnings as failures.
    pub fail_on_warnings: bool,
}

impl ValidationConfig {
    pub fn is_disabled(&self, rule_id: &str) -> bool {
        self.disabled_rules.iter().any(|r| r == rule_id)
    }
}

/// Configuration of one metamodel context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaModelConfig {
    /// Introspect disjoint classes on a worker pool.
    pub parallelize_introspection: bool,
    /// Size of the worker pool; the number of CPUs when unset.
    pub worker_threads: Option<usize>,
    /// Whether objects are editable unless a class says otherwise.
    pub objects_editable_by_default: bool,
    /// CSS classes applied to object and action names, first match wins.
    pub css_class_patterns: Vec<CssClassPattern>,
    pub validation: ValidationConfig,
    #[serde(skip)]
    compiled: OnceLock<Vec<(Regex, String)>>,
}

impl Default for MetaModelConfig {
    fn default() -> Self {
        Self {
            parallelize_introspection: false,
            worker_threads: None,
            objects_editable_by_default: true,
            css_class_patterns: Vec::new(),
            validation: ValidationConfig::default(),
            compiled: OnceLock::new(),
        }
    }
}

impl MetaModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ModelResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> ModelResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, choosing the format by extension.
    pub fn from_file(path: &Path) -> ModelResult<Self> {
        debug!("Loading metamodel configuration: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("toml") => Self::from_toml(&content),
            _ => Err(ModelError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallelize_introspection = enabled;
        self
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn objects_editable_by_default(mut self, editable: bool) -> Self {
        self.objects_editable_by_default = editable;
        self
    }

    pub fn css_class_pattern(mut self, pattern: impl Into<String>, css_class: impl Into<String>) -> Self {
        self.css_class_patterns
            .push(CssClassPattern::new(pattern, css_class));
        self.compiled = OnceLock::new();
        self
    }

    pub fn disable_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.validation.disabled_rules.push(rule_id.into());
        self
    }

    pub fn fail_on_warnings(mut self, fail: bool) -> Self {
        self.validation.fail_on_warnings = fail;
        self
    }

    /// Check settings that serde can not.
    pub fn validate(&self) -> ModelResult<()> {
        if self.worker_threads == Some(0) {
            return Err(ModelError::InvalidConfiguration(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        self.compiled_patterns().map(|_| ())
    }

    fn compiled_patterns(&self) -> ModelResult<&[(Regex, String)]> {
        if let Some(compiled) = self.compiled.get() {
            return Ok(compiled);
        }
        let compiled = self
            .css_class_patterns
            .iter()
            .map(|p| {
                Regex::new(&format!("^(?:{})$", p.pattern))
                    .map(|regex| (regex, p.css_class.clone()))
                    .map_err(|e| {
                        ModelError::InvalidConfiguration(format!(
                            "css class pattern '{}': {}",
                            p.pattern, e
                        ))
                    })
            })
            .collect::<ModelResult<Vec<_>>>()?;
        Ok(self.compiled.get_or_init(|| compiled))
    }

    /// CSS class of the first pattern matching `name`.
    pub fn css_class_for(&self, name: &str) -> ModelResult<Option<String>> {
        Ok(self
            .compiled_patterns()?
            .iter()
            .find(|(regex, _)| regex.is_match(name))
            .map(|(_, css_class)| css_class.clone()))
    }
}
