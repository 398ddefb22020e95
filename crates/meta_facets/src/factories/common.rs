//! Factories that apply to every kind of holder.

use meta_model::naming::{natural_name, simple_name};
use meta_model::{FacetType, FacetValue, FeatureType, Precedence};

use super::{annotation_text, feature_annotation, layout_annotation};
use crate::context::ProcessContext;
use crate::error::FacetResult;

pub(super) fn named_inferred(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let base = match ctx.feature_type() {
        FeatureType::Object => ctx.class().simple_name().to_string(),
        FeatureType::ActionParameter => match ctx.parameter() {
            Some(p) => p
                .name
                .clone()
                .unwrap_or_else(|| simple_name(p.type_ref.referenced_type()).to_string()),
            None => return Ok(()),
        },
        _ => match ctx.member_id() {
            Some(id) => id.to_string(),
            None => return Ok(()),
        },
    };
    ctx.add_facet(
        FacetType::Named,
        Precedence::Inferred,
        FacetValue::Text(natural_name(&base)),
    );
    Ok(())
}

pub(super) fn named_annotation(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let layout = layout_annotation(ctx.feature_type());
    if let Some(named) = annotation_text(ctx, &[("Named", "value"), (layout, "named")]) {
        ctx.add_facet(FacetType::Named, Precedence::Explicit, FacetValue::Text(named));
    }
    Ok(())
}

pub(super) fn described_as_annotation(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let layout = layout_annotation(ctx.feature_type());
    if let Some(description) =
        annotation_text(ctx, &[("DescribedAs", "value"), (layout, "describedAs")])
    {
        ctx.add_facet(
            FacetType::Description,
            Precedence::Explicit,
            FacetValue::Text(description),
        );
    }
    Ok(())
}

pub(super) fn hidden_annotation(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let layout = layout_annotation(ctx.feature_type());
    let hidden = ctx.annotation("Hidden").is_some()
        || ctx
            .annotation(layout)
            .and_then(|a| a.attr_bool("hidden"))
            .unwrap_or(false);
    if hidden {
        ctx.add_facet(FacetType::Hidden, Precedence::Explicit, FacetValue::Flag(true));
    }
    Ok(())
}

pub(super) fn css_class_annotation(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let layout = layout_annotation(ctx.feature_type());
    if let Some(css_class) = annotation_text(ctx, &[("CssClass", "value"), (layout, "cssClass")]) {
        ctx.add_facet(FacetType::CssClass, Precedence::Explicit, FacetValue::Text(css_class));
    }
    Ok(())
}

/// Matches configured patterns against the simple class name or the action id.
pub(super) fn css_class_from_configuration(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let name = match ctx.feature_type() {
        FeatureType::Object => ctx.class().simple_name().to_string(),
        _ => match ctx.member_id() {
            Some(id) => id.to_string(),
            None => return Ok(()),
        },
    };
    if let Some(css_class) = ctx.config().css_class_for(&name)? {
        ctx.add_facet(
            FacetType::CssClass,
            Precedence::FromConfiguration,
            FacetValue::Text(css_class),
        );
    }
    Ok(())
}

pub(super) fn member_order_annotation(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let layout = layout_annotation(ctx.feature_type());
    let semantic = feature_annotation(ctx.feature_type());
    if let Some(sequence) = annotation_text(
        ctx,
        &[
            ("MemberOrder", "sequence"),
            (layout, "sequence"),
            (semantic, "sequence"),
        ],
    ) {
        ctx.add_facet(FacetType::MemberOrder, Precedence::Explicit, FacetValue::Text(sequence));
    }
    Ok(())
}
