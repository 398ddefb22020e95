//! Class-level factories.

use meta_model::order::compare_sequence;
use meta_model::{
    Annotated, BeanSort, ClassDescriptor, Contributing, FacetType, FacetValue, MixinShape,
    Precedence,
};

use super::{attr_text, take_query_method};
use crate::context::ProcessContext;
use crate::error::FacetResult;

/// Kind of member a mixin contributes, decided by its main method.
pub fn mixin_contributing(class: &ClassDescriptor, shape: &MixinShape) -> Contributing {
    let main = class.methods.iter().find(|m| m.name == shape.main_method);
    match main {
        Some(m) if m.has_annotation("Collection") => Contributing::Collection,
        Some(m) if m.has_annotation("Property") => Contributing::Property,
        _ => Contributing::Action,
    }
}

pub(super) fn logical_type_name_inferred(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let name = ctx.class().name.clone();
    ctx.add_facet(FacetType::LogicalTypeName, Precedence::Inferred, FacetValue::Text(name));
    Ok(())
}

pub(super) fn title_to_string(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let is_string = ctx
        .find_method("toString", Some(&[]))
        .map(|m| m.returns.is_string())
        .unwrap_or(false);
    if is_string {
        if let Some(method) = ctx.take_method("toString", Some(&[])) {
            ctx.add_facet(
                FacetType::Title,
                Precedence::Inferred,
                FacetValue::Method(method.name.clone()),
            );
        }
    }
    Ok(())
}

pub(super) fn title_method(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    if let Some(method) = take_query_method(ctx, "title") {
        ctx.add_facet(
            FacetType::Title,
            Precedence::Default,
            FacetValue::Method(method.name.clone()),
        );
    }
    Ok(())
}

/// Title composed from getters annotated `Title`, ordered by their `sequence`.
pub(super) fn title_annotation(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let mut parts: Vec<(String, String)> = ctx
        .remaining_methods()
        .iter()
        .filter(|m| m.parameters.is_empty() && !m.is_void())
        .filter_map(|m| {
            let annotation = m.annotation("Title")?;
            let sequence = attr_text(annotation, "sequence").unwrap_or_else(|| "1".to_string());
            Some((sequence, m.name.clone()))
        })
        .collect();
    if parts.is_empty() {
        return Ok(());
    }
    parts.sort_by(|a, b| compare_sequence(&a.0, &b.0));
    ctx.add_facet(
        FacetType::Title,
        Precedence::Explicit,
        FacetValue::Methods(parts.into_iter().map(|(_, name)| name).collect()),
    );
    Ok(())
}

pub(super) fn icon_name_method(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    if let Some(method) = take_query_method(ctx, "iconName") {
        ctx.add_facet(
            FacetType::IconName,
            Precedence::Default,
            FacetValue::Method(method.name.clone()),
        );
    }
    Ok(())
}

pub(super) fn css_class_method(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    if let Some(method) = take_query_method(ctx, "cssClass") {
        ctx.add_facet(
            FacetType::CssClass,
            Precedence::Explicit,
            FacetValue::Method(method.name.clone()),
        );
    }
    Ok(())
}

pub(super) fn layout_method(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    if let Some(method) = take_query_method(ctx, "layout") {
        ctx.add_facet(
            FacetType::Layout,
            Precedence::Default,
            FacetValue::Method(method.name.clone()),
        );
    }
    Ok(())
}

pub(super) fn disabled_object_method(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    if let Some(method) = take_query_method(ctx, "disabled") {
        ctx.add_facet(
            FacetType::DisabledObject,
            Precedence::Default,
            FacetValue::Method(method.name.clone()),
        );
    }
    Ok(())
}

pub(super) fn domain_object_annotation(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let Some(annotation) = ctx.annotation("DomainObject").cloned() else {
        return Ok(());
    };

    if let Some(name) = annotation
        .attr_str("logicalTypeName")
        .or_else(|| annotation.attr_str("objectType"))
    {
        ctx.add_facet(
            FacetType::LogicalTypeName,
            Precedence::Explicit,
            FacetValue::Text(name.to_string()),
        );
    }

    match annotation.attr_str("editing").map(str::to_uppercase).as_deref() {
        Some("DISABLED") => {
            ctx.add_facet(FacetType::Immutable, Precedence::Explicit, FacetValue::Flag(true));
        }
        Some("ENABLED") => {
            ctx.add_facet(FacetType::Immutable, Precedence::Explicit, FacetValue::Flag(false));
        }
        _ => {}
    }

    if let Some(nature) = annotation.attr_str("nature") {
        ctx.add_facet(
            FacetType::Nature,
            Precedence::Explicit,
            FacetValue::Text(nature.to_string()),
        );
    }
    Ok(())
}

pub(super) fn editing_from_configuration(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let immutable = !ctx.config().objects_editable_by_default;
    ctx.add_facet(
        FacetType::Immutable,
        Precedence::FromConfiguration,
        FacetValue::Flag(immutable),
    );
    Ok(())
}

pub(super) fn mixin(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let Some(shape) = ctx.class().mixin_shape() else {
        return Ok(());
    };
    let contributing = mixin_contributing(ctx.class(), &shape);
    ctx.add_facet(
        FacetType::Mixin,
        Precedence::Explicit,
        FacetValue::Mixin {
            target: shape.target,
            main_method: shape.main_method,
            contributing,
        },
    );
    Ok(())
}

pub(super) fn value_semantics(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    if ctx.class().sort == BeanSort::Value || ctx.annotation("Value").is_some() {
        ctx.add_facet(FacetType::Value, Precedence::Default, FacetValue::Marker);
    }
    Ok(())
}
