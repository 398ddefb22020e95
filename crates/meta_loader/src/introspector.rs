//! Turns one class descriptor into the parts of an object specification.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use meta_facets::{
    classify, is_support_method, mixin_contributing, FacetError, MethodPrefix, MethodRemover,
    ProcessContext, ProgrammingModel,
};
use meta_model::naming::{capitalize, decapitalize};
use meta_model::order::sort_by_sequence;
use meta_model::{
    ActionParameter, Annotated, ClassDescriptor, ClassUniverse, Contributing, FacetHolder,
    FeatureType, Identifier, MemberKind, MetaModelConfig, MethodDescriptor, ObjectMember,
    ObjectSpecification, SpecificationParts,
};
use tracing::{debug, trace, warn};

use crate::error::{LoaderError, LoaderResult};

/// Annotation that hides a method from the programming model.
pub const PROGRAMMATIC: &str = "Programmatic";

/// How the introspector reaches other specifications.
pub trait SpecificationResolver {
    /// A fully introspected supertype; may block until it is built.
    fn ancestor(&self, name: &str) -> LoaderResult<Arc<ObjectSpecification>>;

    /// The specification of a member type, finished or not. Never blocks.
    fn reference(&self, name: &str) -> Option<Weak<ObjectSpecification>>;
}

/// A method discovered on a class or one of its superclasses.
#[derive(Debug, Clone)]
pub struct ScannedMethods {
    pub methods: Vec<Arc<MethodDescriptor>>,
    declared_in: HashMap<String, String>,
}

impl ScannedMethods {
    /// Class declaring the most-derived version of `method`.
    pub fn declaring_class(&self, method: &MethodDescriptor) -> Option<&str> {
        self.declared_in
            .get(&method.key().to_string())
            .map(String::as_str)
    }
}

struct Accessor {
    id: String,
    suffix: String,
    method: Arc<MethodDescriptor>,
}

/// Drives the programming model over a class and its members.
pub struct Introspector<'a> {
    universe: &'a ClassUniverse,
    model: &'a ProgrammingModel,
    config: &'a MetaModelConfig,
}

impl<'a> Introspector<'a> {
    pub fn new(
        universe: &'a ClassUniverse,
        model: &'a ProgrammingModel,
        config: &'a MetaModelConfig,
    ) -> Self {
        Self {
            universe,
            model,
            config,
        }
    }

    /// Behaviorally relevant methods of `descriptor`, own declarations first,
    /// then each superclass in turn. A signature already seen is skipped so
    /// that the most-derived declaration wins.
    pub fn scan_methods(&self, descriptor: &ClassDescriptor) -> ScannedMethods {
        let mut seen = HashSet::new();
        let mut methods = Vec::new();
        let mut declared_in = HashMap::new();

        let chain = self.universe.superclass_chain(&descriptor.name);
        let classes = std::iter::once(descriptor).chain(chain.iter().map(|d| d.as_ref()));
        for class in classes {
            for method in &class.methods {
                if method.synthetic
                    || method.bridge
                    || method.is_static
                    || method.has_annotation(PROGRAMMATIC)
                {
                    trace!("{}: skipping {}", descriptor.name, method.key());
                    continue;
                }
                let key = method.key().to_string();
                if seen.insert(key.clone()) {
                    declared_in.insert(key, class.name.clone());
                    methods.push(Arc::new(method.clone()));
                }
            }
        }

        ScannedMethods {
            methods,
            declared_in,
        }
    }

    /// Introspect `descriptor`, resolving supertypes and member types through `resolver`.
    pub fn introspect(
        &self,
        descriptor: &Arc<ClassDescriptor>,
        resolver: &dyn SpecificationResolver,
    ) -> LoaderResult<SpecificationParts> {
        let name = descriptor.name.as_str();
        if let Some(cycle) = self.universe.hierarchy_cycle(name) {
            return Err(LoaderError::InheritanceCycle {
                class: name.to_string(),
                cycle,
            });
        }

        let superclass = match &descriptor.superclass {
            Some(superclass) => Some(self.resolve_ancestor(name, superclass, resolver)?),
            None => None,
        };
        let interfaces = descriptor
            .interfaces
            .iter()
            .map(|interface| self.resolve_ancestor(name, interface, resolver))
            .collect::<LoaderResult<Vec<_>>>()?;

        let scanned = self.scan_methods(descriptor);
        let mut remover = MethodRemover::new(scanned.methods.clone());

        let mut facets = FacetHolder::new(Identifier::class(name));
        {
            let mut ctx =
                ProcessContext::for_object(descriptor, &mut facets, &mut remover, self.config);
            self.model.process(&mut ctx)?;
        }

        let mut members = Vec::new();
        for accessor in self.find_accessors(name, &mut remover)? {
            let declaring = scanned
                .declaring_class(&accessor.method)
                .unwrap_or(name)
                .to_string();
            members.push(self.association(descriptor, accessor, declaring, &mut remover)?);
        }

        let candidates: Vec<_> = remover
            .remaining()
            .into_iter()
            .filter(|m| !is_support_method(&m.name))
            .collect();
        for method in candidates {
            // An earlier action's factories may have consumed this method.
            if !remover.remove_method(&method.key()) {
                continue;
            }
            let declaring = scanned
                .declaring_class(&method)
                .unwrap_or(name)
                .to_string();
            let id = method.name.clone();
            let suffix = capitalize(&id);
            members.push(self.action(
                descriptor,
                name,
                &id,
                &suffix,
                method,
                declaring,
                &mut remover,
                resolver,
            )?);
        }

        let orphaned_methods: Vec<String> = remover
            .remaining()
            .iter()
            .filter(|m| is_support_method(&m.name))
            .map(|m| m.key().to_string())
            .collect();
        if !orphaned_methods.is_empty() {
            debug!("{}: orphaned support methods: {:?}", name, orphaned_methods);
        }

        members.extend(self.mixed_in_members(descriptor, resolver)?);
        sort_by_sequence(&mut members, |m| m.sequence());

        let members = members
            .into_iter()
            .map(|member| {
                let type_spec = resolver.reference(member.referenced_type());
                Arc::new(member.with_type_spec(type_spec))
            })
            .collect();

        Ok(SpecificationParts {
            descriptor: descriptor.clone(),
            facets,
            superclass,
            interfaces,
            members,
            orphaned_methods,
        })
    }

    fn resolve_ancestor(
        &self,
        class: &str,
        supertype: &str,
        resolver: &dyn SpecificationResolver,
    ) -> LoaderResult<Weak<ObjectSpecification>> {
        resolver
            .ancestor(supertype)
            .map(|spec| Arc::downgrade(&spec))
            .map_err(|e| match e {
                LoaderError::InheritanceCycle { .. } => e,
                other => LoaderError::SupertypeFailed {
                    class: class.to_string(),
                    supertype: supertype.to_string(),
                    message: other.to_string(),
                },
            })
    }

    /// Claim `getX()` and `isX()` accessors in discovery order.
    fn find_accessors(&self, class: &str, remover: &mut MethodRemover) -> LoaderResult<Vec<Accessor>> {
        let mut accessors: Vec<Accessor> = Vec::new();
        for method in remover.remaining() {
            if !method.parameters.is_empty() || method.is_void() {
                continue;
            }
            let suffix = match classify(&method.name) {
                Some((MethodPrefix::Get, rest)) => rest,
                Some((MethodPrefix::Is, rest)) if method.returns.is_boolean() => rest,
                _ => continue,
            };
            let id = decapitalize(suffix);
            if let Some(existing) = accessors.iter().find(|a| a.id == id) {
                return Err(FacetError::AmbiguousMember {
                    class: class.to_string(),
                    member: id,
                    first: existing.method.name.clone(),
                    second: method.name.clone(),
                }
                .into());
            }
            accessors.push(Accessor {
                id,
                suffix: suffix.to_string(),
                method: method.clone(),
            });
        }
        for accessor in &accessors {
            remover.remove_method(&accessor.method.key());
        }
        Ok(accessors)
    }

    fn association(
        &self,
        descriptor: &ClassDescriptor,
        accessor: Accessor,
        declaring: String,
        remover: &mut MethodRemover,
    ) -> LoaderResult<ObjectMember> {
        let (kind, feature_type) = if accessor.method.returns.is_collection() {
            (MemberKind::Collection, FeatureType::Collection)
        } else {
            (MemberKind::Property, FeatureType::Property)
        };
        let mut holder = FacetHolder::new(Identifier::property(descriptor.name.clone(), &accessor.id));
        {
            let mut ctx = ProcessContext::for_member(
                descriptor,
                feature_type,
                accessor.method.clone(),
                &accessor.id,
                accessor.suffix.clone(),
                &mut holder,
                remover,
                self.config,
            );
            self.model.process(&mut ctx)?;
        }
        Ok(ObjectMember::new(
            accessor.id,
            kind,
            accessor.method.returns.clone(),
            holder,
            declaring,
        ))
    }

    /// An action owned by `owner` and backed by `method` of `descriptor`.
    #[allow(clippy::too_many_arguments)]
    fn action(
        &self,
        descriptor: &ClassDescriptor,
        owner: &str,
        id: &str,
        suffix: &str,
        method: Arc<MethodDescriptor>,
        declaring: String,
        remover: &mut MethodRemover,
        resolver: &dyn SpecificationResolver,
    ) -> LoaderResult<ObjectMember> {
        let identifier = Identifier::action(owner, id, method.parameter_types());
        let mut holder = FacetHolder::new(identifier.clone());
        {
            let mut ctx = ProcessContext::for_member(
                descriptor,
                FeatureType::Action,
                method.clone(),
                id,
                suffix,
                &mut holder,
                remover,
                self.config,
            );
            self.model.process(&mut ctx)?;
        }

        let mut parameters = Vec::with_capacity(method.parameters.len());
        for (index, parameter) in method.parameters.iter().enumerate() {
            let mut param_holder = FacetHolder::new(identifier.parameter(index));
            {
                let mut ctx = ProcessContext::for_parameter(
                    descriptor,
                    method.clone(),
                    index,
                    id,
                    suffix,
                    &mut param_holder,
                    remover,
                    self.config,
                );
                self.model.process(&mut ctx)?;
            }
            let name = parameter
                .name
                .clone()
                .unwrap_or_else(|| format!("arg{}", index));
            let type_spec = resolver.reference(parameter.type_ref.referenced_type());
            parameters.push(
                ActionParameter::new(index, name, parameter.type_ref.clone(), param_holder)
                    .with_type_spec(type_spec),
            );
        }

        Ok(
            ObjectMember::new(id, MemberKind::Action, method.returns.clone(), holder, declaring)
                .with_parameters(parameters),
        )
    }

    /// Members contributed by mixins targeting the class or its supertypes.
    fn mixed_in_members(
        &self,
        descriptor: &ClassDescriptor,
        resolver: &dyn SpecificationResolver,
    ) -> LoaderResult<Vec<ObjectMember>> {
        let mut members = Vec::new();
        for mixin in self.universe.mixins_targeting(&descriptor.name) {
            if mixin.name == descriptor.name {
                continue;
            }
            let Some(shape) = mixin.mixin_shape() else {
                continue;
            };

            let scanned = self.scan_methods(&mixin);
            let mut remover = MethodRemover::new(scanned.methods);
            let Some(main) = remover.find_method(&shape.main_method, None) else {
                warn!(
                    "Mixin {} has no main method '{}'",
                    mixin.name, shape.main_method
                );
                continue;
            };
            remover.remove_method(&main.key());

            let suffix = capitalize(&shape.main_method);
            let member = match mixin_contributing(&mixin, &shape) {
                Contributing::Action => self.action(
                    &mixin,
                    &descriptor.name,
                    &shape.member_name,
                    &suffix,
                    main,
                    mixin.name.clone(),
                    &mut remover,
                    resolver,
                )?,
                contributing => {
                    let accessor = Accessor {
                        id: shape.member_name.clone(),
                        suffix,
                        method: main,
                    };
                    self.contributed_association(
                        &mixin,
                        &descriptor.name,
                        accessor,
                        contributing,
                        &mut remover,
                    )?
                }
            };
            trace!("{}: mixin {} contributes {}", descriptor.name, mixin.name, member.id());
            members.push(member.with_mixin(mixin.name.clone()));
        }
        Ok(members)
    }

    fn contributed_association(
        &self,
        mixin: &ClassDescriptor,
        owner: &str,
        accessor: Accessor,
        contributing: Contributing,
        remover: &mut MethodRemover,
    ) -> LoaderResult<ObjectMember> {
        let (kind, feature_type) = match contributing {
            Contributing::Collection => (MemberKind::Collection, FeatureType::Collection),
            _ => (MemberKind::Property, FeatureType::Property),
        };
        let mut holder = FacetHolder::new(Identifier::property(owner, &accessor.id));
        {
            let mut ctx = ProcessContext::for_member(
                mixin,
                feature_type,
                accessor.method.clone(),
                &accessor.id,
                accessor.suffix.clone(),
                &mut holder,
                remover,
                self.config,
            );
            self.model.process(&mut ctx)?;
        }
        Ok(ObjectMember::new(
            accessor.id,
            kind,
            accessor.method.returns.clone(),
            holder,
            mixin.name.clone(),
        ))
    }
}
