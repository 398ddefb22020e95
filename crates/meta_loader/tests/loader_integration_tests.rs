//! Integration tests for the specification loader.

use std::fs;
use std::sync::mpsc;
use std::sync::{Arc, Barrier, Mutex, OnceLock, Weak};
use std::thread;
use std::time::Duration;

use meta_facets::{FacetFactory, FacetResult, FnFactory, ProcessContext, ProgrammingModel};
use meta_loader::{DomainSource, LoaderError, SpecificationLoader};
use meta_model::{
    Annotation, BeanSort, ClassDescriptor, ClassUniverse, FacetType, FeatureType, HasFacets,
    MemberKind, MetaModelConfig, MethodDescriptor, ObjectSpecification, ParameterDescriptor,
    TypeRef,
};
use tempfile::TempDir;

fn customer() -> ClassDescriptor {
    ClassDescriptor::new("shop.Customer")
        .sort(BeanSort::Entity)
        .method(MethodDescriptor::new("title").returns(TypeRef::of("String")))
        .method(MethodDescriptor::new("getName").returns(TypeRef::of("String")))
        .method(MethodDescriptor::new("setName").param("name", TypeRef::of("String")))
        .method(MethodDescriptor::new("placeOrder"))
}

fn shop() -> ClassUniverse {
    ClassUniverse::new()
        .with_class(
            ClassDescriptor::new("shop.Party")
                .sort(BeanSort::Entity)
                .abstract_class()
                .method(MethodDescriptor::new("getEmail").returns(TypeRef::of("String"))),
        )
        .with_class(customer().extends("shop.Party").method(
            MethodDescriptor::new("getOrders").returns(TypeRef::collection_of("List", "shop.Order")),
        ))
        .with_class(
            ClassDescriptor::new("shop.Order")
                .sort(BeanSort::Entity)
                .method(MethodDescriptor::new("getCustomer").returns(TypeRef::of("shop.Customer")))
                .method(
                    MethodDescriptor::new("getTotal")
                        .returns(TypeRef::of("BigDecimal"))
                        .annotated(Annotation::new("MemberOrder").with("sequence", "2")),
                )
                .method(
                    MethodDescriptor::new("getPlacedOn")
                        .returns(TypeRef::of("LocalDate"))
                        .annotated(Annotation::new("MemberOrder").with("sequence", "1")),
                )
                .method(
                    MethodDescriptor::new("cancel")
                        .param("reason", TypeRef::of("String"))
                        .returns(TypeRef::of("shop.Order")),
                ),
        )
        .with_class(
            ClassDescriptor::new("shop.Node")
                .sort(BeanSort::ViewModel)
                .method(MethodDescriptor::new("getChildren").returns(TypeRef::collection_of("List", "shop.Node"))),
        )
}

/// `title()`, `getName()/setName()` and `placeOrder()` give one editable
/// property and one action; the title method becomes a facet, not an action.
#[test]
fn test_customer_members() {
    let loader = SpecificationLoader::with_defaults(ClassUniverse::new().with_class(customer())).unwrap();
    let spec = loader.specification_for("shop.Customer").unwrap();

    let properties = spec.properties();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].id(), "name");
    assert!(properties[0].is_editable());

    let actions = spec.actions();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].id(), "placeOrder");

    assert_eq!(spec.facet(FacetType::Title).unwrap().method(), Some("title"));
    assert!(spec.member("title").is_none());
    assert!(spec.orphaned_methods().is_empty());
}

/// Concurrent first access builds the class once and hands out one instance.
#[test]
fn test_concurrent_first_access_builds_once() {
    let loader = SpecificationLoader::with_defaults(ClassUniverse::new().with_class(customer())).unwrap();
    let barrier = Barrier::new(8);

    let specs: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    loader.specification_for("shop.Customer").unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for spec in &specs {
        assert!(Arc::ptr_eq(&specs[0], spec));
        assert!(spec.is_fully_introspected());
    }
    // One build for Customer, one for the String its members refer to.
    assert_eq!(loader.stats().builds, 2);
    assert_eq!(loader.snapshot().names(), vec!["String", "shop.Customer"]);
}

/// A class whose collection holds its own type resolves to itself.
#[test]
fn test_self_referencing_collection() {
    let loader = SpecificationLoader::with_defaults(shop()).unwrap();
    let node = loader.specification_for("shop.Node").unwrap();

    let children = node.member("children").unwrap();
    assert_eq!(children.kind(), MemberKind::Collection);
    assert!(Arc::ptr_eq(&children.type_specification().unwrap(), &node));
    assert_eq!(loader.stats().builds, 1);
}

/// Mutually referencing classes see each other's final instances.
#[test]
fn test_mutual_references_resolve_to_cached_instances() {
    let loader = SpecificationLoader::with_defaults(shop()).unwrap();
    let snapshot = loader.create_meta_model().unwrap();

    let customer = snapshot.get("shop.Customer").unwrap();
    let order = snapshot.get("shop.Order").unwrap();
    let orders = customer.member("orders").unwrap();
    assert!(Arc::ptr_eq(&orders.type_specification().unwrap(), order));
    let back = order.member("customer").unwrap();
    assert!(Arc::ptr_eq(&back.type_specification().unwrap(), customer));

    // Referenced value types are built by the drain.
    assert!(snapshot.get("String").unwrap().is_fully_introspected());
    assert!(snapshot.get("BigDecimal").is_some());
}

/// Member types are finished once `specification_for` returns, without a
/// full metamodel build.
#[test]
fn test_member_types_resolve_after_specification_for() {
    let loader = SpecificationLoader::with_defaults(shop()).unwrap();
    let customer = loader.specification_for("shop.Customer").unwrap();

    let order = customer.member("orders").unwrap().type_specification().unwrap();
    assert!(order.is_fully_introspected());
    assert!(Arc::ptr_eq(&order, &loader.specification_for("shop.Order").unwrap()));

    let back = order.member("customer").unwrap().type_specification().unwrap();
    assert!(Arc::ptr_eq(&back, &customer));
    assert!(customer.member("name").unwrap().type_specification().is_some());
    assert_eq!(loader.stats().in_progress, 0);
}

#[test]
fn test_optional_getter_is_a_property() {
    let universe = ClassUniverse::new().with_class(
        customer()
            .method(MethodDescriptor::new("getNickname").returns(TypeRef::from("Optional<String>")))
            .method(MethodDescriptor::new("getTags").returns(TypeRef::from("Set<String>"))),
    );
    let loader = SpecificationLoader::with_defaults(universe).unwrap();
    let spec = loader.specification_for("shop.Customer").unwrap();

    let nickname = spec.member("nickname").unwrap();
    assert_eq!(nickname.kind(), MemberKind::Property);
    assert_eq!(nickname.referenced_type(), "String");
    assert!(nickname.type_specification().is_some());

    let tags = spec.member("tags").unwrap();
    assert_eq!(tags.kind(), MemberKind::Collection);
    assert_eq!(tags.referenced_type(), "String");
}

#[test]
fn test_superclass_members_and_ordering() {
    let loader = SpecificationLoader::with_defaults(shop()).unwrap();
    let customer = loader.specification_for("shop.Customer").unwrap();

    assert_eq!(customer.superclass().unwrap().name(), "shop.Party");
    let email = customer.member("email").unwrap();
    assert_eq!(email.declaring_class(), "shop.Party");

    let order = loader.specification_for("shop.Order").unwrap();
    let ids: Vec<_> = order.members().iter().map(|m| m.id().to_string()).collect();
    assert_eq!(ids, vec!["placedOn", "total", "customer", "cancel"]);

    let cancel = order.member("cancel").unwrap();
    assert_eq!(cancel.parameters().len(), 1);
    assert_eq!(cancel.parameter(0).unwrap().name(), "reason");
    assert!(cancel.parameter(0).unwrap().type_specification().is_some());
}

/// Sequential and parallel introspection produce the same metamodel.
#[test]
fn test_parallel_matches_sequential() {
    let sequential = SpecificationLoader::with_defaults(shop()).unwrap();
    let parallel = SpecificationLoader::new(
        shop(),
        ProgrammingModel::standard(),
        MetaModelConfig::default().parallel(true).worker_threads(4),
    )
    .unwrap();

    let a = sequential.create_meta_model().unwrap();
    let b = parallel.create_meta_model().unwrap();

    assert_eq!(a.names(), b.names());
    assert_eq!(a.describe(), b.describe());
}

/// Repeated dispose and create under concurrent readers finishes.
#[test]
fn test_repeated_dispose_does_not_deadlock() {
    let loader = Arc::new(
        SpecificationLoader::new(
            shop(),
            ProgrammingModel::standard(),
            MetaModelConfig::default().parallel(true).worker_threads(3),
        )
        .unwrap(),
    );
    let (tx, rx) = mpsc::channel();

    let mut handles = Vec::new();
    for i in 0..4 {
        let loader = loader.clone();
        let tx = tx.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..25 {
                if i == 0 {
                    loader.dispose_meta_model();
                    let _ = loader.create_meta_model();
                } else {
                    let _ = loader.specification_for("shop.Order");
                    let _ = loader.specification_for("shop.Customer");
                }
            }
            tx.send(i).unwrap();
        }));
    }
    drop(tx);

    for _ in 0..4 {
        rx.recv_timeout(Duration::from_secs(60))
            .expect("loader deadlocked under dispose/create");
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

/// A `cssClass()` method beats a configured pattern; other classes get the pattern.
#[test]
fn test_css_class_method_beats_configuration() {
    let universe = ClassUniverse::new()
        .with_class(customer().method(MethodDescriptor::new("cssClass").returns(TypeRef::of("String"))))
        .with_class(ClassDescriptor::new("shop.CustomerGroup").sort(BeanSort::Entity));
    let config = MetaModelConfig::default().css_class_pattern("Customer.*", "from-config");
    let loader = SpecificationLoader::new(universe, ProgrammingModel::standard(), config).unwrap();

    let customer = loader.specification_for("shop.Customer").unwrap();
    let css = customer.facet(FacetType::CssClass).unwrap();
    assert_eq!(css.method(), Some("cssClass"));

    let group = loader.specification_for("shop.CustomerGroup").unwrap();
    assert_eq!(
        group.facet(FacetType::CssClass).and_then(|f| f.text().map(str::to_string)),
        Some("from-config".to_string())
    );
}

fn explode(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
    if ctx.class().simple_name() == "Broken" {
        panic!("factory blew up");
    }
    Ok(())
}

/// Looks up the class being built from inside its own build.
#[derive(Default)]
struct SelfLookup {
    loader: OnceLock<Weak<SpecificationLoader>>,
    seen: Mutex<Option<(Arc<ObjectSpecification>, bool)>>,
}

impl FacetFactory for SelfLookup {
    fn name(&self) -> &str {
        "self-lookup"
    }

    fn feature_types(&self) -> &[FeatureType] {
        &[FeatureType::Object]
    }

    fn process(&self, ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
        if let Some(loader) = self.loader.get().and_then(Weak::upgrade) {
            let spec = loader.specification_for(&ctx.class().name).unwrap();
            let finished = spec.is_fully_introspected();
            *self.seen.lock().unwrap() = Some((spec, finished));
        }
        Ok(())
    }
}

/// `specification_for` on the building thread hands back the instance under
/// construction instead of building it again.
#[test]
fn test_specification_for_mid_build_returns_in_progress_instance() {
    let lookup = Arc::new(SelfLookup::default());
    let model = ProgrammingModel::standard().with_factory(lookup.clone());
    let universe = ClassUniverse::new().with_class(ClassDescriptor::new("shop.Tag").sort(BeanSort::ViewModel));
    let loader = Arc::new(SpecificationLoader::new(universe, model, MetaModelConfig::default()).unwrap());
    lookup.loader.set(Arc::downgrade(&loader)).unwrap();

    let spec = loader.specification_for("shop.Tag").unwrap();

    let (seen, finished_when_seen) = lookup.seen.lock().unwrap().take().unwrap();
    assert!(!finished_when_seen);
    assert!(Arc::ptr_eq(&seen, &spec));
    assert!(spec.is_fully_introspected());
    assert_eq!(loader.stats().builds, 1);
}

/// A failing class is reported without taking the others down.
#[test]
fn test_failures_are_isolated() {
    let universe = shop()
        .with_class(ClassDescriptor::new("shop.Broken").sort(BeanSort::Entity))
        .with_class(
            ClassDescriptor::new("shop.Orphan")
                .sort(BeanSort::Entity)
                .extends("shop.Missing"),
        );
    let model = ProgrammingModel::standard().with_factory(Arc::new(FnFactory::new(
        "explode",
        &[FeatureType::Object],
        explode,
    )));
    let loader = SpecificationLoader::new(universe, model, MetaModelConfig::default()).unwrap();

    let err = loader.create_meta_model().unwrap_err();
    let failed: Vec<_> = err.failures().iter().map(|(class, _)| class.as_str()).collect();
    assert_eq!(failed, vec!["shop.Broken", "shop.Orphan"]);
    assert!(err.failures()[0].1.contains("factory blew up"));

    assert!(loader.specification_for("shop.Customer").unwrap().is_fully_introspected());
    assert!(matches!(
        loader.specification_for("shop.Broken"),
        Err(LoaderError::BuildFailed { .. })
    ));
    assert!(!loader.snapshot().contains("shop.Broken"));
    assert_eq!(loader.stats().failed, 2);
}

#[test]
fn test_missing_supertype() {
    let universe = ClassUniverse::new().with_class(customer().extends("shop.Missing"));
    let loader = SpecificationLoader::with_defaults(universe).unwrap();

    assert!(matches!(
        loader.specification_for("shop.Customer"),
        Err(LoaderError::SupertypeFailed { .. })
    ));
}

#[test]
fn test_inheritance_cycle() {
    let universe = ClassUniverse::new()
        .with_class(ClassDescriptor::new("shop.A").sort(BeanSort::Entity).extends("shop.B"))
        .with_class(ClassDescriptor::new("shop.B").sort(BeanSort::Entity).extends("shop.A"));
    let loader = SpecificationLoader::with_defaults(universe).unwrap();

    match loader.specification_for("shop.A") {
        Err(LoaderError::InheritanceCycle { cycle, .. }) => {
            assert_eq!(cycle, vec!["shop.A", "shop.B", "shop.A"]);
        }
        other => panic!("expected inheritance cycle, got {:?}", other),
    }
}

/// Reloading rebuilds into the instance others already hold.
#[test]
fn test_reload_class_keeps_instance() {
    let loader = SpecificationLoader::with_defaults(shop()).unwrap();
    let before = loader.specification_for("shop.Node").unwrap();
    assert!(before.member("label").is_none());

    let reloaded = loader
        .reload_class(
            ClassDescriptor::new("shop.Node")
                .sort(BeanSort::ViewModel)
                .method(MethodDescriptor::new("getChildren").returns(TypeRef::collection_of("List", "shop.Node")))
                .method(MethodDescriptor::new("getLabel").returns(TypeRef::of("String"))),
        )
        .unwrap();

    assert!(Arc::ptr_eq(&before, &reloaded));
    let label = before.member("label").unwrap();
    assert!(label.type_specification().unwrap().is_fully_introspected());
    // Node twice, then the String the new member refers to.
    assert_eq!(loader.stats().builds, 3);
}

#[test]
fn test_mixins_contribute_members() {
    let target = || vec![ParameterDescriptor::new("customer", TypeRef::of("shop.Customer"))];
    let universe = shop()
        .with_class(
            ClassDescriptor::new("shop.Customer_placeOrder")
                .sort(BeanSort::Mixin)
                .constructor(target())
                .method(MethodDescriptor::new("act").returns(TypeRef::of("shop.Order"))),
        )
        .with_class(
            ClassDescriptor::new("shop.Customer_rating")
                .annotated(Annotation::new("Mixin").with("method", "prop"))
                .constructor(target())
                .method(
                    MethodDescriptor::new("prop")
                        .returns(TypeRef::of("int"))
                        .annotated(Annotation::new("Property")),
                ),
        )
        .with_class(
            ClassDescriptor::new("shop.VipCustomer")
                .sort(BeanSort::Entity)
                .extends("shop.Customer"),
        );
    let loader = SpecificationLoader::with_defaults(universe).unwrap();

    let customer = loader.specification_for("shop.Customer").unwrap();
    let contributed: Vec<_> = customer
        .members()
        .iter()
        .filter(|m| m.mixed_in_from().is_some())
        .map(|m| (m.id().to_string(), m.kind()))
        .collect();
    assert_eq!(
        contributed,
        vec![
            ("placeOrder".to_string(), MemberKind::Action),
            ("rating".to_string(), MemberKind::Property),
        ]
    );

    // The class declares placeOrder() itself; the first in display order wins.
    assert!(customer.member("placeOrder").unwrap().mixed_in_from().is_none());

    let vip = loader.specification_for("shop.VipCustomer").unwrap();
    let rating = vip.member("rating").unwrap();
    assert_eq!(rating.mixed_in_from(), Some("shop.Customer_rating"));
    assert!(rating.type_specification().is_some());
}

#[test]
fn test_load_from_domain_source() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("shop.yaml"),
        r#"
classes:
  - name: shop.Customer
    sort: entity
    methods:
      - name: title
        returns: String
      - name: getName
        returns: String
        annotations:
          - name: Property
            attributes:
              maxLength: 40
      - name: setName
        parameters:
          - name: name
            type: String
      - name: placeOrder
        returns: shop.Order
  - name: shop.Order
    sort: entity
    methods:
      - name: getLines
        returns: List<String>
"#,
    )
    .unwrap();

    let universe = DomainSource::new(dir.path()).load().unwrap();
    let loader = SpecificationLoader::with_defaults(universe).unwrap();
    let snapshot = loader.create_meta_model().unwrap();

    let customer = snapshot.get("shop.Customer").unwrap();
    let name = customer.member("name").unwrap();
    assert_eq!(name.facet(FacetType::MaxLength).and_then(|f| f.number()), Some(40));
    assert!(Arc::ptr_eq(
        &customer.member("placeOrder").unwrap().type_specification().unwrap(),
        snapshot.get("shop.Order").unwrap()
    ));
    assert_eq!(
        snapshot.get("shop.Order").unwrap().member("lines").unwrap().kind(),
        MemberKind::Collection
    );
}
