//! Property, collection and shared member factories.

use meta_model::{FacetType, FacetValue, FeatureType, Precedence};

use super::{annotation_text, feature_annotation};
use crate::context::ProcessContext;
use crate::error::FacetResult;
use crate::prefix::MethodPrefix;

pub(super) fn property_accessor(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    if let Some(name) = ctx.method().map(|m| m.name.clone()) {
        ctx.add_facet(FacetType::PropertyAccessor, Precedence::Default, FacetValue::Method(name));
    }
    Ok(())
}

pub(super) fn collection_accessor(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let Some(method) = ctx.method() else {
        return Ok(());
    };
    let name = method.name.clone();
    let element = method.returns.element.clone();

    ctx.add_facet(FacetType::CollectionAccessor, Precedence::Default, FacetValue::Method(name));
    if let Some(element) = element {
        ctx.add_facet(FacetType::TypeOf, Precedence::Inferred, FacetValue::Text(element));
    }
    Ok(())
}

pub(super) fn collection_type_of_annotation(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    if let Some(type_of) = annotation_text(ctx, &[("TypeOf", "value"), ("Collection", "typeOf")]) {
        ctx.add_facet(FacetType::TypeOf, Precedence::Explicit, FacetValue::Text(type_of));
    }
    Ok(())
}

/// `setX(T)` or `modifyX(T)` become the setter, `clearX()` the clearer.
pub(super) fn property_setter(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let Some(property_type) = ctx.type_ref().map(|t| t.to_string()) else {
        return Ok(());
    };
    let suffix = ctx.support_suffix().to_string();
    let types = [property_type];

    let set = ctx.take_method(&MethodPrefix::Set.method_name(&suffix), Some(&types));
    let modify = ctx.take_method(&MethodPrefix::Modify.method_name(&suffix), Some(&types));
    if let Some(setter) = modify.or(set) {
        ctx.add_facet(
            FacetType::PropertySetter,
            Precedence::Default,
            FacetValue::Method(setter.name.clone()),
        );
    }

    if let Some(clear) = ctx.take_method(&MethodPrefix::Clear.method_name(&suffix), Some(&[])) {
        ctx.add_facet(
            FacetType::PropertyClear,
            Precedence::Default,
            FacetValue::Method(clear.name.clone()),
        );
    }
    Ok(())
}

/// `editing = DISABLED` on `Property` or `Collection`.
pub(super) fn editing_annotation(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let semantic = feature_annotation(ctx.feature_type());
    let Some(annotation) = ctx.annotation(semantic).cloned() else {
        return Ok(());
    };
    let disabled = annotation
        .attr_str("editing")
        .map(|e| e.eq_ignore_ascii_case("DISABLED"))
        .unwrap_or(false);
    if disabled {
        let reason = annotation
            .attr_str("editingDisabledReason")
            .unwrap_or("Disabled")
            .to_string();
        ctx.add_facet(FacetType::Disabled, Precedence::Explicit, FacetValue::Text(reason));
    }
    Ok(())
}

pub(super) fn collection_add_remove(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let Some(element) = ctx.type_ref().and_then(|t| t.element.clone()) else {
        return Ok(());
    };
    let suffix = ctx.support_suffix().to_string();
    let types = [element];

    let support = [
        (MethodPrefix::AddTo, FacetType::CollectionAddTo),
        (MethodPrefix::RemoveFrom, FacetType::CollectionRemoveFrom),
        (MethodPrefix::ValidateAddTo, FacetType::CollectionValidateAddTo),
        (MethodPrefix::ValidateRemoveFrom, FacetType::CollectionValidateRemoveFrom),
    ];
    for (prefix, facet_type) in support {
        if let Some(method) = ctx.take_method(&prefix.method_name(&suffix), Some(&types)) {
            ctx.add_facet(facet_type, Precedence::Default, FacetValue::Method(method.name.clone()));
        }
    }
    Ok(())
}

/// `hideX()` returning boolean.
pub(super) fn hide_method(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let name = MethodPrefix::Hide.method_name(ctx.support_suffix());
    let is_boolean = ctx
        .find_method(&name, Some(&[]))
        .map(|m| m.returns.is_boolean())
        .unwrap_or(false);
    if is_boolean {
        if let Some(method) = ctx.take_method(&name, Some(&[])) {
            ctx.add_facet(
                FacetType::HideForContext,
                Precedence::Default,
                FacetValue::Method(method.name.clone()),
            );
        }
    }
    Ok(())
}

/// `disableX()` returning the reason as a string.
pub(super) fn disable_method(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let name = MethodPrefix::Disable.method_name(ctx.support_suffix());
    let returns_reason = ctx
        .find_method(&name, Some(&[]))
        .map(|m| m.returns.is_string())
        .unwrap_or(false);
    if returns_reason {
        if let Some(method) = ctx.take_method(&name, Some(&[])) {
            ctx.add_facet(
                FacetType::DisableForContext,
                Precedence::Default,
                FacetValue::Method(method.name.clone()),
            );
        }
    }
    Ok(())
}

/// `validateX(T)` for a property, `validateX(args..)` for an action,
/// `validateNX(T)` for parameter `N`.
pub(super) fn validate_method(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let suffix = ctx.support_suffix().to_string();
    let (name, types) = match ctx.feature_type() {
        FeatureType::Property => match ctx.type_ref() {
            Some(t) => (MethodPrefix::Validate.method_name(&suffix), vec![t.to_string()]),
            None => return Ok(()),
        },
        FeatureType::Action => match ctx.method() {
            Some(m) => (MethodPrefix::Validate.method_name(&suffix), m.parameter_types()),
            None => return Ok(()),
        },
        FeatureType::ActionParameter => match (ctx.parameter_index(), ctx.type_ref()) {
            (Some(index), Some(t)) => (
                MethodPrefix::Validate.parameter_method_name(index, &suffix),
                vec![t.to_string()],
            ),
            _ => return Ok(()),
        },
        _ => return Ok(()),
    };

    let returns_reason = ctx
        .find_method(&name, Some(&types))
        .map(|m| m.returns.is_string())
        .unwrap_or(false);
    if returns_reason {
        if let Some(method) = ctx.take_method(&name, Some(&types)) {
            ctx.add_facet(
                FacetType::ValidateForContext,
                Precedence::Default,
                FacetValue::Method(method.name.clone()),
            );
        }
    }
    Ok(())
}
