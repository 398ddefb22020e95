//! Integration tests for the facet pipeline.

use std::sync::Arc;

use meta_facets::{FacetResult, FnFactory, MethodRemover, ProcessContext, ProgrammingModel};
use meta_model::{
    Annotation, ClassDescriptor, FacetHolder, FacetType, FacetValue, FeatureType, Identifier,
    MetaModelConfig, MethodDescriptor, Precedence, TypeRef,
};

const OBJECT: &[FeatureType] = &[FeatureType::Object];

fn css_first(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    ctx.add_facet(FacetType::CssClass, Precedence::Explicit, FacetValue::Text("first".into()));
    Ok(())
}

fn css_second(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    ctx.add_facet(FacetType::CssClass, Precedence::Explicit, FacetValue::Text("second".into()));
    Ok(())
}

fn css_from_config(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    ctx.add_facet(
        FacetType::CssClass,
        Precedence::FromConfiguration,
        FacetValue::Text("configured".into()),
    );
    Ok(())
}

fn consume_audit(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    if let Some(method) = ctx.take_method("audit", Some(&[])) {
        ctx.add_facet(FacetType::Layout, Precedence::Explicit, FacetValue::Method(method.name.clone()));
    }
    Ok(())
}

fn consume_audit_again(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    if ctx.take_method("audit", Some(&[])).is_some() {
        ctx.add_facet(FacetType::IconName, Precedence::Explicit, FacetValue::Marker);
    }
    Ok(())
}

fn run_object(
    model: &ProgrammingModel,
    class: &ClassDescriptor,
    config: &MetaModelConfig,
) -> (FacetHolder, MethodRemover) {
    let mut holder = FacetHolder::new(Identifier::class(class.name.clone()));
    let mut remover = MethodRemover::new(class.methods.iter().cloned().map(Arc::new).collect());
    let mut ctx = ProcessContext::for_object(class, &mut holder, &mut remover, config);
    model.process(&mut ctx).unwrap();
    (holder, remover)
}

/// Equal precedence keeps the factory registered first, in either order.
#[test]
fn test_equal_precedence_first_registered_wins() {
    let class = ClassDescriptor::new("shop.Customer");
    let config = MetaModelConfig::default();

    let forward = ProgrammingModel::new()
        .with_factory(Arc::new(FnFactory::new("first", OBJECT, css_first)))
        .with_factory(Arc::new(FnFactory::new("second", OBJECT, css_second)));
    let (holder, _) = run_object(&forward, &class, &config);
    let facet = holder.facet(FacetType::CssClass).unwrap();
    assert_eq!(facet.text(), Some("first"));
    assert_eq!(facet.source, "first");

    let reverse = ProgrammingModel::new()
        .with_factory(Arc::new(FnFactory::new("second", OBJECT, css_second)))
        .with_factory(Arc::new(FnFactory::new("first", OBJECT, css_first)));
    let (holder, _) = run_object(&reverse, &class, &config);
    assert_eq!(holder.facet(FacetType::CssClass).unwrap().text(), Some("second"));
}

/// Higher precedence wins regardless of registration order.
#[test]
fn test_higher_precedence_wins_in_both_orders() {
    let class = ClassDescriptor::new("shop.Customer");
    let config = MetaModelConfig::default();

    for model in [
        ProgrammingModel::new()
            .with_factory(Arc::new(FnFactory::new("config", OBJECT, css_from_config)))
            .with_factory(Arc::new(FnFactory::new("explicit", OBJECT, css_first))),
        ProgrammingModel::new()
            .with_factory(Arc::new(FnFactory::new("explicit", OBJECT, css_first)))
            .with_factory(Arc::new(FnFactory::new("config", OBJECT, css_from_config))),
    ] {
        let (holder, _) = run_object(&model, &class, &config);
        let facet = holder.facet(FacetType::CssClass).unwrap();
        assert_eq!(facet.text(), Some("first"));
        assert_eq!(facet.precedence, Precedence::Explicit);
    }
}

/// A method consumed by one factory is invisible to the next.
#[test]
fn test_consumed_method_is_not_offered_twice() {
    let class = ClassDescriptor::new("shop.Customer")
        .method(MethodDescriptor::new("audit").returns(TypeRef::of("String")))
        .method(MethodDescriptor::new("placeOrder"));
    let config = MetaModelConfig::default();

    let model = ProgrammingModel::new()
        .with_factory(Arc::new(FnFactory::new("audit", OBJECT, consume_audit)))
        .with_factory(Arc::new(FnFactory::new("audit-again", OBJECT, consume_audit_again)));
    let (holder, remover) = run_object(&model, &class, &config);

    assert!(holder.contains(FacetType::Layout));
    assert!(!holder.contains(FacetType::IconName));
    let remaining: Vec<_> = remover.remaining().iter().map(|m| m.name.clone()).collect();
    assert_eq!(remaining, vec!["placeOrder"]);
}

/// The title method beats `toString`, and a configured CSS class loses to `cssClass()`.
#[test]
fn test_standard_object_factories() {
    let class = ClassDescriptor::new("shop.Customer")
        .annotated(Annotation::new("DomainObject").with("logicalTypeName", "shop.customer"))
        .method(MethodDescriptor::new("toString").returns(TypeRef::of("String")))
        .method(MethodDescriptor::new("title").returns(TypeRef::of("String")))
        .method(MethodDescriptor::new("cssClass").returns(TypeRef::of("String")))
        .method(MethodDescriptor::new("placeOrder"));
    let config = MetaModelConfig::default().css_class_pattern("Cust.*", "from-config");

    let (holder, remover) = run_object(&ProgrammingModel::standard(), &class, &config);

    let title = holder.facet(FacetType::Title).unwrap();
    assert_eq!(title.method(), Some("title"));
    assert_eq!(title.precedence, Precedence::Default);

    let css = holder.facet(FacetType::CssClass).unwrap();
    assert_eq!(css.method(), Some("cssClass"));
    assert_eq!(css.source, "css-class-method");

    assert_eq!(
        holder.facet(FacetType::LogicalTypeName).and_then(|f| f.text()),
        Some("shop.customer")
    );
    assert_eq!(holder.facet(FacetType::Named).and_then(|f| f.text()), Some("Customer"));
    assert_eq!(holder.facet(FacetType::Immutable).and_then(|f| f.flag()), Some(false));

    let remaining: Vec<_> = remover.remaining().iter().map(|m| m.name.clone()).collect();
    assert_eq!(remaining, vec!["placeOrder"]);
}

/// Property support methods are consumed by the property pipeline.
#[test]
fn test_property_pipeline_consumes_support_methods() {
    let getter = MethodDescriptor::new("getName")
        .returns(TypeRef::of("String"))
        .annotated(Annotation::new("Property").with("maxLength", 40))
        .annotated(Annotation::new("MemberOrder").with("sequence", "1.1"));
    let class = ClassDescriptor::new("shop.Customer")
        .method(getter.clone())
        .method(MethodDescriptor::new("setName").param("name", TypeRef::of("String")))
        .method(MethodDescriptor::new("hideName").returns(TypeRef::of("boolean")))
        .method(MethodDescriptor::new("disableName").returns(TypeRef::of("String")))
        .method(
            MethodDescriptor::new("validateName")
                .returns(TypeRef::of("String"))
                .param("name", TypeRef::of("String")),
        )
        .method(MethodDescriptor::new("choicesName").returns(TypeRef::collection_of("List", "String")));
    let config = MetaModelConfig::default();

    let mut holder = FacetHolder::new(Identifier::property("shop.Customer", "name"));
    let mut remover = MethodRemover::new(class.methods.iter().cloned().map(Arc::new).collect());
    remover.remove_method(&getter.key());
    let mut ctx = ProcessContext::for_member(
        &class,
        FeatureType::Property,
        Arc::new(getter),
        "name",
        "Name",
        &mut holder,
        &mut remover,
        &config,
    );
    ProgrammingModel::standard().process(&mut ctx).unwrap();

    for facet_type in [
        FacetType::PropertyAccessor,
        FacetType::PropertySetter,
        FacetType::HideForContext,
        FacetType::DisableForContext,
        FacetType::ValidateForContext,
        FacetType::Choices,
        FacetType::Mandatory,
    ] {
        assert!(holder.contains(facet_type), "missing {}", facet_type);
    }
    assert_eq!(holder.facet(FacetType::MaxLength).and_then(|f| f.number()), Some(40));
    assert_eq!(holder.facet(FacetType::MemberOrder).and_then(|f| f.text()), Some("1.1"));
    assert_eq!(holder.facet(FacetType::Named).and_then(|f| f.text()), Some("Name"));
    assert_eq!(remover.remaining_count(), 0);
}
