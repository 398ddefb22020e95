//! Factories shared by properties and action parameters.

use meta_model::{FacetType, FacetValue, FeatureType, Precedence};
use regex::Regex;

use super::{annotation_text, feature_annotation};
use crate::context::ProcessContext;
use crate::error::{FacetError, FacetResult};
use crate::prefix::MethodPrefix;

/// Support method name for the current property or parameter.
fn support_name(ctx: &ProcessContext<'_>, prefix: MethodPrefix) -> String {
    match (ctx.feature_type(), ctx.parameter_index()) {
        (FeatureType::ActionParameter, Some(index)) => {
            prefix.parameter_method_name(index, ctx.support_suffix())
        }
        _ => prefix.method_name(ctx.support_suffix()),
    }
}

/// Mandatory unless declared optional.
pub(super) fn mandatory(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    ctx.add_facet(FacetType::Mandatory, Precedence::Inferred, FacetValue::Flag(true));

    let semantic = feature_annotation(ctx.feature_type());
    let explicit = if ctx.annotation("Nullable").is_some() {
        Some(false)
    } else {
        ctx.annotation_str(&[semantic], "optionality")
            .and_then(|o| match o.to_uppercase().as_str() {
                "OPTIONAL" => Some(false),
                "MANDATORY" => Some(true),
                _ => None,
            })
    };
    if let Some(mandatory) = explicit {
        ctx.add_facet(FacetType::Mandatory, Precedence::Explicit, FacetValue::Flag(mandatory));
    }
    Ok(())
}

pub(super) fn max_length(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let semantic = feature_annotation(ctx.feature_type());
    let max_length = ctx
        .annotation(semantic)
        .and_then(|a| a.attr_u64("maxLength"))
        .or_else(|| ctx.annotation("MaxLength").and_then(|a| a.attr_u64("value")));
    if let Some(max_length) = max_length {
        ctx.add_facet(FacetType::MaxLength, Precedence::Explicit, FacetValue::Number(max_length));
    }
    Ok(())
}

/// A pattern that does not compile fails the class build.
pub(super) fn regex_pattern(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let semantic = feature_annotation(ctx.feature_type());
    let Some(pattern) = annotation_text(ctx, &[(semantic, "regexPattern"), ("RegEx", "value")])
    else {
        return Ok(());
    };
    if let Err(e) = Regex::new(&pattern) {
        return Err(FacetError::InvalidPattern {
            holder: ctx.identifier().to_string(),
            pattern,
            message: e.to_string(),
        });
    }
    ctx.add_facet(FacetType::RegEx, Precedence::Explicit, FacetValue::Text(pattern));
    Ok(())
}

/// `choicesX()` for a property, `choicesNX(..)` for parameter `N`.
pub(super) fn choices_method(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let name = support_name(ctx, MethodPrefix::Choices);
    let types: Option<&[String]> = match ctx.feature_type() {
        FeatureType::Property => Some(&[]),
        _ => None,
    };
    let returns_values = ctx
        .find_method(&name, types)
        .map(|m| !m.is_void())
        .unwrap_or(false);
    if returns_values {
        if let Some(method) = ctx.take_method(&name, types) {
            ctx.add_facet(
                FacetType::Choices,
                Precedence::Default,
                FacetValue::Method(method.name.clone()),
            );
        }
    }
    Ok(())
}

/// `defaultX()` for a property, `defaultNX(..)` for parameter `N`.
pub(super) fn default_method(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let name = support_name(ctx, MethodPrefix::Default);
    let types: Option<&[String]> = match ctx.feature_type() {
        FeatureType::Property => Some(&[]),
        _ => None,
    };
    let returns_value = ctx
        .find_method(&name, types)
        .map(|m| !m.is_void())
        .unwrap_or(false);
    if returns_value {
        if let Some(method) = ctx.take_method(&name, types) {
            ctx.add_facet(
                FacetType::Default,
                Precedence::Default,
                FacetValue::Method(method.name.clone()),
            );
        }
    }
    Ok(())
}

/// `autoCompleteX(String)` / `autoCompleteNX(String)`.
pub(super) fn auto_complete_method(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let name = support_name(ctx, MethodPrefix::AutoComplete);
    let search = ["String".to_string()];
    let returns_values = ctx
        .find_method(&name, Some(&search))
        .map(|m| !m.is_void())
        .unwrap_or(false);
    if returns_values {
        if let Some(method) = ctx.take_method(&name, Some(&search)) {
            ctx.add_facet(
                FacetType::AutoComplete,
                Precedence::Default,
                FacetValue::Method(method.name.clone()),
            );
        }
    }
    Ok(())
}
