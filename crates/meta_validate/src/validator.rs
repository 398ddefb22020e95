//! Running rule sets over a metamodel and reporting the outcome.

use chrono::{DateTime, Utc};
use meta_loader::MetaModelSnapshot;
use meta_model::ValidationConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ValidationError, ValidationResult};
use crate::rules::{RuleSeverity, RuleSet, Violation};

/// Checks a finished metamodel. Validation never changes the snapshot.
#[derive(Debug, Clone)]
pub struct Validator {
    rules: RuleSet,
    fail_on_warnings: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(RuleSet::standard())
    }
}

impl Validator {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            fail_on_warnings: false,
        }
    }

    /// The standard rules, minus those the configuration disables.
    pub fn from_config(config: &ValidationConfig) -> ValidationResult<Self> {
        let mut rules = RuleSet::standard();
        for id in &config.disabled_rules {
            rules.disable(id)?;
        }
        Ok(Self {
            rules,
            fail_on_warnings: config.fail_on_warnings,
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn validate(&self, snapshot: &MetaModelSnapshot) -> ValidationReport {
        let mut violations = self.rules.evaluate(snapshot);
        violations.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then_with(|| a.identifier.cmp(&b.identifier))
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });

        let report = ValidationReport {
            generation: snapshot.generation(),
            generated_at: Utc::now(),
            specifications: snapshot.len(),
            fail_on_warnings: self.fail_on_warnings,
            violations,
        };
        if report.is_valid() {
            info!(
                "Metamodel valid: {} specifications, {} warning(s)",
                report.specifications,
                report.warnings().count()
            );
        } else {
            warn!(
                "Metamodel invalid: {} error(s), {} warning(s)",
                report.errors().count(),
                report.warnings().count()
            );
        }
        report
    }
}

/// Every violation found in one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub generation: Uuid,
    pub generated_at: DateTime<Utc>,
    pub specifications: usize,
    pub fail_on_warnings: bool,
    /// Errors first, then warnings; each group by identifier.
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == RuleSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == RuleSeverity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Whether the metamodel is usable.
    pub fn is_valid(&self) -> bool {
        !self.has_errors() && !(self.fail_on_warnings && self.warnings().next().is_some())
    }

    /// `Ok` with the report when valid.
    pub fn into_result(self) -> ValidationResult<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(ValidationError::Failed {
                errors: self.errors().count(),
                warnings: self.warnings().count(),
            })
        }
    }

    /// Human-readable listing of every violation.
    pub fn report(&self) -> String {
        let mut out = format!(
            "Validated {} specifications ({}): {} error(s), {} warning(s)\n",
            self.specifications,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.errors().count(),
            self.warnings().count()
        );
        for violation in &self.violations {
            out.push_str("  ");
            out.push_str(&violation.to_string());
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> ValidationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> ValidationResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
