//! Validation rules and rule sets.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use meta_loader::MetaModelSnapshot;
use meta_model::order::compare_sequence;
use meta_model::{FacetHolder, FacetType, HasFacets, MemberKind, ObjectSpecification, TypeRef};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ValidationError, ValidationResult};

/// A validation rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: RuleSeverity,
    pub rule_type: RuleType,
    pub enabled: bool,
}

/// Rule severity levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RuleSeverity {
    Error,
    Warning,
}

impl std::fmt::Display for RuleSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleSeverity::Error => write!(f, "error"),
            RuleSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// Types of rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    DuplicateLogicalTypeName,
    UnresolvableMemberType,
    OrphanedSupportMethod,
    MixinMemberCollision,
    MemberKindMismatch,
    ChoicesAndAutoComplete,
    DuplicateMemberOrder,
}

impl ValidationRule {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rule_type: RuleType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            severity: RuleSeverity::Error,
            rule_type,
            enabled: true,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_severity(mut self, severity: RuleSeverity) -> Self {
        self.severity = severity;
        self
    }

    fn violation(&self, identifier: impl ToString, message: impl Into<String>) -> Violation {
        Violation {
            identifier: identifier.to_string(),
            rule_id: self.id.clone(),
            severity: self.severity,
            message: message.into(),
        }
    }
}

/// A problem found in the metamodel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The class, member or parameter at fault.
    pub identifier: String,
    pub rule_id: String,
    pub severity: RuleSeverity,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity, self.identifier, self.rule_id, self.message
        )
    }
}

/// A set of validation rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    pub name: String,
    pub rules: Vec<ValidationRule>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Create the standard rule set.
    pub fn standard() -> Self {
        let mut rules = Self::new("Standard Rules");

        rules.add(
            ValidationRule::new(
                "duplicate-logical-type-name",
                "Unique Logical Type Names",
                RuleType::DuplicateLogicalTypeName,
            )
            .with_description("Two classes must not share a logical type name"),
        );

        rules.add(
            ValidationRule::new(
                "unresolvable-member-type",
                "Resolvable Member Types",
                RuleType::UnresolvableMemberType,
            )
            .with_description("Member, element, return and parameter types must be known classes"),
        );

        rules.add(
            ValidationRule::new(
                "orphaned-support-method",
                "No Orphaned Support Methods",
                RuleType::OrphanedSupportMethod,
            )
            .with_description("Every hide/disable/validate/choices... method must belong to a member"),
        );

        rules.add(
            ValidationRule::new(
                "mixin-member-collision",
                "No Mixin Collisions",
                RuleType::MixinMemberCollision,
            )
            .with_description("A mixin must not contribute a member id the class already has"),
        );

        rules.add(
            ValidationRule::new(
                "member-kind-mismatch",
                "Consistent Member Kinds",
                RuleType::MemberKindMismatch,
            )
            .with_description("A member must keep the kind it has in the superclass"),
        );

        rules.add(
            ValidationRule::new(
                "choices-and-autocomplete",
                "Choices Or Auto-Complete",
                RuleType::ChoicesAndAutoComplete,
            )
            .with_description("A property or parameter may offer choices or auto-complete, not both"),
        );

        rules.add(
            ValidationRule::new(
                "duplicate-member-order",
                "Distinct Member Order",
                RuleType::DuplicateMemberOrder,
            )
            .with_description("Members of a class should not share a sequence")
            .with_severity(RuleSeverity::Warning),
        );

        rules
    }

    /// Add a rule to the set.
    pub fn add(&mut self, rule: ValidationRule) {
        self.rules.push(rule);
    }

    pub fn get(&self, id: &str) -> Option<&ValidationRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Disable a rule by id.
    pub fn disable(&mut self, id: &str) -> ValidationResult<()> {
        let rule = self
            .rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ValidationError::UnknownRule(id.to_string()))?;
        rule.enabled = false;
        Ok(())
    }

    /// Evaluate the enabled rules against a snapshot.
    pub fn evaluate(&self, snapshot: &MetaModelSnapshot) -> Vec<Violation> {
        let mut violations = Vec::new();

        for rule in self.rules.iter().filter(|r| r.enabled) {
            let found = match rule.rule_type {
                RuleType::DuplicateLogicalTypeName => check_duplicate_logical_type_names(rule, snapshot),
                RuleType::UnresolvableMemberType => check_member_types(rule, snapshot),
                RuleType::OrphanedSupportMethod => check_orphaned_methods(rule, snapshot),
                RuleType::MixinMemberCollision => check_mixin_collisions(rule, snapshot),
                RuleType::MemberKindMismatch => check_member_kinds(rule, snapshot),
                RuleType::ChoicesAndAutoComplete => check_choices_and_autocomplete(rule, snapshot),
                RuleType::DuplicateMemberOrder => check_member_order(rule, snapshot),
            };
            debug!("Rule {}: {} violation(s)", rule.id, found.len());
            violations.extend(found);
        }

        violations
    }
}

fn check_duplicate_logical_type_names(
    rule: &ValidationRule,
    snapshot: &MetaModelSnapshot,
) -> Vec<Violation> {
    let mut first_by_name: HashMap<String, &str> = HashMap::new();
    let mut violations = Vec::new();
    for spec in snapshot.specifications() {
        let logical = spec.logical_type_name();
        match first_by_name.get(&logical) {
            Some(first) => violations.push(rule.violation(
                spec.name(),
                format!("logical type name '{}' is already used by {}", logical, first),
            )),
            None => {
                first_by_name.insert(logical, spec.name());
            }
        }
    }
    violations
}

fn check_member_types(rule: &ValidationRule, snapshot: &MetaModelSnapshot) -> Vec<Violation> {
    let unresolved = |type_ref: &TypeRef| {
        let name = type_ref.referenced_type();
        name != TypeRef::VOID && !snapshot.contains(name)
    };

    let mut violations = Vec::new();
    for spec in snapshot.specifications() {
        for member in spec.members() {
            if unresolved(member.type_ref()) {
                let what = match member.kind() {
                    MemberKind::Property => "property type",
                    MemberKind::Collection => "element type",
                    MemberKind::Action => "return type",
                };
                violations.push(rule.violation(
                    member.identifier(),
                    format!("{} '{}' is not a known class", what, member.referenced_type()),
                ));
            }
            for parameter in member.parameters() {
                if unresolved(parameter.type_ref()) {
                    violations.push(rule.violation(
                        parameter.identifier(),
                        format!(
                            "parameter type '{}' is not a known class",
                            parameter.type_ref().referenced_type()
                        ),
                    ));
                }
            }
        }
    }
    violations
}

fn check_orphaned_methods(rule: &ValidationRule, snapshot: &MetaModelSnapshot) -> Vec<Violation> {
    snapshot
        .specifications()
        .iter()
        .flat_map(|spec| {
            spec.orphaned_methods().into_iter().map(move |method| {
                rule.violation(
                    spec.name(),
                    format!("support method {} does not belong to any member", method),
                )
            })
        })
        .collect()
}

fn check_mixin_collisions(rule: &ValidationRule, snapshot: &MetaModelSnapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    for spec in snapshot.specifications() {
        let members = spec.members();
        for member in &members {
            let Some(mixin) = member.mixed_in_from() else {
                continue;
            };
            let clash = members
                .iter()
                .any(|other| !Arc::ptr_eq(other, member) && other.id() == member.id());
            if clash {
                violations.push(rule.violation(
                    member.identifier(),
                    format!("mixin {} contributes '{}', which {} already has", mixin, member.id(), spec.name()),
                ));
            }
        }
    }
    violations
}

fn check_member_kinds(rule: &ValidationRule, snapshot: &MetaModelSnapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    for spec in snapshot.specifications() {
        let Some(superclass) = spec.superclass() else {
            continue;
        };
        for member in spec.members() {
            let Some(inherited) = superclass.member(member.id()) else {
                continue;
            };
            if inherited.kind() != member.kind() {
                violations.push(rule.violation(
                    member.identifier(),
                    format!(
                        "'{}' is a {} here but a {} in {}",
                        member.id(),
                        member.kind().as_str(),
                        inherited.kind().as_str(),
                        superclass.name()
                    ),
                ));
            }
        }
    }
    violations
}

fn check_choices_and_autocomplete(
    rule: &ValidationRule,
    snapshot: &MetaModelSnapshot,
) -> Vec<Violation> {
    let both = |holder: &FacetHolder| {
        holder.contains(FacetType::Choices) && holder.contains(FacetType::AutoComplete)
    };

    let mut violations = Vec::new();
    for spec in snapshot.specifications() {
        for member in spec.members() {
            if both(member.facet_holder()) {
                violations.push(rule.violation(
                    member.identifier(),
                    "both choices and auto-complete are declared",
                ));
            }
            for parameter in member.parameters() {
                if both(parameter.facet_holder()) {
                    violations.push(rule.violation(
                        parameter.identifier(),
                        "both choices and auto-complete are declared",
                    ));
                }
            }
        }
    }
    violations
}

fn check_member_order(rule: &ValidationRule, snapshot: &MetaModelSnapshot) -> Vec<Violation> {
    snapshot
        .specifications()
        .iter()
        .flat_map(|spec| duplicate_sequences(rule, spec))
        .collect()
}

fn duplicate_sequences(rule: &ValidationRule, spec: &ObjectSpecification) -> Vec<Violation> {
    let members = spec.members();
    let mut violations = Vec::new();
    for (i, member) in members.iter().enumerate() {
        let Some(sequence) = member.sequence() else {
            continue;
        };
        let earlier = members[..i].iter().find(|other| {
            other
                .sequence()
                .map_or(false, |s| compare_sequence(s, sequence) == Ordering::Equal)
        });
        if let Some(other) = earlier {
            violations.push(rule.violation(
                member.identifier(),
                format!("sequence {} is shared with '{}'", sequence, other.id()),
            ));
        }
    }
    violations
}
