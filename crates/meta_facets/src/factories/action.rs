//! Action factories.

use meta_model::{ActionSemantics, FacetType, FacetValue, Precedence};

use crate::context::ProcessContext;
use crate::error::{FacetError, FacetResult};

/// Verbs that name actions without side effects.
const QUERY_VERBS: &[&str] = &["find", "list", "search", "lookup", "query", "count"];

pub(super) fn action_invocation(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let Some((method, return_type)) = ctx
        .method()
        .map(|m| (m.name.clone(), m.returns.to_string()))
    else {
        return Ok(());
    };
    ctx.add_facet(
        FacetType::ActionInvocation,
        Precedence::Default,
        FacetValue::Invocation {
            method,
            return_type,
        },
    );
    Ok(())
}

pub(super) fn action_semantics_inferred(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let Some(name) = ctx.method().map(|m| m.name.clone()) else {
        return Ok(());
    };
    let is_query = QUERY_VERBS.iter().any(|verb| {
        name.strip_prefix(verb)
            .map(|rest| rest.is_empty() || rest.starts_with(|c: char| c.is_uppercase()))
            .unwrap_or(false)
    });
    let semantics = if is_query {
        ActionSemantics::Safe
    } else {
        ActionSemantics::NonIdempotent
    };
    ctx.add_facet(
        FacetType::ActionSemantics,
        Precedence::Inferred,
        FacetValue::Semantics(semantics),
    );
    Ok(())
}

/// `Action(semantics, domainEvent, hidden)`.
pub(super) fn action_annotation(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    let Some(annotation) = ctx.annotation("Action").cloned() else {
        return Ok(());
    };

    if let Some(raw) = annotation.attr_str("semantics") {
        let semantics = ActionSemantics::parse(raw).ok_or_else(|| FacetError::FactoryFailed {
            factory: ctx.factory().to_string(),
            holder: ctx.identifier().to_string(),
            message: format!("unknown action semantics '{}'", raw),
        })?;
        ctx.add_facet(
            FacetType::ActionSemantics,
            Precedence::Explicit,
            FacetValue::Semantics(semantics),
        );
    }

    if let Some(event) = annotation.attr_str("domainEvent") {
        ctx.add_facet(
            FacetType::DomainEvent,
            Precedence::Explicit,
            FacetValue::Text(event.to_string()),
        );
    }

    let hidden = annotation
        .attr_str("hidden")
        .map(|h| !h.eq_ignore_ascii_case("NOWHERE"))
        .or_else(|| annotation.attr_bool("hidden"))
        .unwrap_or(false);
    if hidden {
        ctx.add_facet(FacetType::Hidden, Precedence::Explicit, FacetValue::Flag(true));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MethodRemover;
    use meta_model::{
        Annotation, ClassDescriptor, FacetHolder, FeatureType, Identifier, MetaModelConfig,
        MethodDescriptor,
    };
    use std::sync::Arc;

    fn run(method: MethodDescriptor, f: fn(&mut ProcessContext<'_>) -> FacetResult<()>) -> FacetResult<FacetHolder> {
        let class = ClassDescriptor::new("shop.Customer");
        let config = MetaModelConfig::default();
        let mut remover = MethodRemover::default();
        let id = Identifier::action("shop.Customer", method.name.clone(), method.parameter_types());
        let member_id = method.name.clone();
        let mut holder = FacetHolder::new(id);
        let mut ctx = ProcessContext::for_member(
            &class,
            FeatureType::Action,
            Arc::new(method),
            &member_id,
            "",
            &mut holder,
            &mut remover,
            &config,
        );
        f(&mut ctx)?;
        Ok(holder)
    }

    #[test]
    fn test_semantics_inferred_from_verb() {
        let holder = run(MethodDescriptor::new("findByName"), action_semantics_inferred).unwrap();
        assert_eq!(
            holder.facet(FacetType::ActionSemantics).and_then(|f| f.semantics()),
            Some(ActionSemantics::Safe)
        );

        let holder = run(MethodDescriptor::new("finalize"), action_semantics_inferred).unwrap();
        assert_eq!(
            holder.facet(FacetType::ActionSemantics).and_then(|f| f.semantics()),
            Some(ActionSemantics::NonIdempotent)
        );
    }

    #[test]
    fn test_action_annotation() {
        let method = MethodDescriptor::new("placeOrder").annotated(
            Annotation::new("Action")
                .with("semantics", "IDEMPOTENT")
                .with("domainEvent", "OrderPlaced"),
        );
        let holder = run(method, action_annotation).unwrap();
        assert_eq!(
            holder.facet(FacetType::ActionSemantics).and_then(|f| f.semantics()),
            Some(ActionSemantics::Idempotent)
        );
        assert_eq!(
            holder.facet(FacetType::DomainEvent).and_then(|f| f.text()),
            Some("OrderPlaced")
        );
        assert!(!holder.contains(FacetType::Hidden));
    }

    #[test]
    fn test_unknown_semantics_fails() {
        let method = MethodDescriptor::new("placeOrder")
            .annotated(Annotation::new("Action").with("semantics", "SOMETIMES"));
        assert!(matches!(
            run(method, action_annotation),
            Err(FacetError::FactoryFailed { .. })
        ));
    }
}
