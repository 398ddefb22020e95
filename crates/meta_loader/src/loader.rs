//! The specification cache.
//!
//! Every class gets one slot per generation. A slot is claimed by the first
//! thread that needs the class fully introspected; that thread builds it while
//! everybody else either waits on the slot (complete and ancestor demands) or
//! takes the in-progress specification (reference demands and re-entrant
//! calls from the building thread). Disposing the metamodel swaps in a fresh
//! generation, so builds still running finish into the old one.
//!
//! Member types are only referenced during a build. Once the requested class
//! is finished and its claim released, `specification_for` builds whatever
//! those references still leave pending, so every reachable type is fully
//! introspected when the call returns.

use std::any::Any;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::thread::{self, ThreadId};
use std::time::Instant;

use chrono::{DateTime, Utc};
use meta_facets::ProgrammingModel;
use meta_model::{ClassDescriptor, ClassUniverse, MetaModelConfig, ObjectSpecification};
use parking_lot::{Condvar, Mutex, RwLock};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{LoaderError, LoaderResult};
use crate::introspector::{Introspector, SpecificationResolver};
use crate::snapshot::{LoaderStats, MetaModelSnapshot};

thread_local! {
    /// Builds running on this thread, counting nested ancestor builds.
    static BUILD_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Marks the current thread as building for its lifetime.
struct BuildScope;

impl BuildScope {
    fn enter() -> Self {
        BUILD_DEPTH.with(|depth| depth.set(depth.get() + 1));
        BuildScope
    }

    fn active() -> bool {
        BUILD_DEPTH.with(|depth| depth.get() > 0)
    }
}

impl Drop for BuildScope {
    fn drop(&mut self) {
        BUILD_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// What the caller needs from a specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Demand {
    /// Fully introspected, or in progress on the calling thread.
    Complete,
    /// Fully introspected; a supertype of the class being built.
    Ancestor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SlotState {
    Pending,
    Building(ThreadId),
    Ready,
    Failed(String),
}

#[derive(Debug)]
struct Slot {
    spec: Arc<ObjectSpecification>,
    state: Mutex<SlotState>,
    ready: Condvar,
    /// Every specification reachable from this one is finished.
    linked: AtomicBool,
}

impl Slot {
    fn new(name: &str) -> Self {
        Self {
            spec: Arc::new(ObjectSpecification::placeholder(name)),
            state: Mutex::new(SlotState::Pending),
            ready: Condvar::new(),
            linked: AtomicBool::new(false),
        }
    }

    fn state(&self) -> SlotState {
        self.state.lock().clone()
    }
}

#[derive(Debug)]
struct Generation {
    id: Uuid,
    started_at: DateTime<Utc>,
    slots: Mutex<HashMap<String, Arc<Slot>>>,
}

impl Generation {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// The slot for `name`, allocating a pending placeholder if absent.
    fn slot(&self, name: &str) -> Arc<Slot> {
        self.slots
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Slot::new(name)))
            .clone()
    }

    fn slots(&self) -> Vec<(String, Arc<Slot>)> {
        let mut slots: Vec<_> = self
            .slots
            .lock()
            .iter()
            .map(|(name, slot)| (name.clone(), slot.clone()))
            .collect();
        slots.sort_by(|a, b| a.0.cmp(&b.0));
        slots
    }

    /// Names of slots not yet ready or failed.
    fn unfinished(&self) -> Vec<String> {
        self.slots()
            .into_iter()
            .filter(|(_, slot)| matches!(slot.state(), SlotState::Pending | SlotState::Building(_)))
            .map(|(name, _)| name)
            .collect()
    }
}

/// Resolves dependencies of a build against the generation it runs in.
struct GenerationResolver<'a> {
    loader: &'a SpecificationLoader,
    generation: &'a Arc<Generation>,
    universe: &'a ClassUniverse,
}

impl SpecificationResolver for GenerationResolver<'_> {
    fn ancestor(&self, name: &str) -> LoaderResult<Arc<ObjectSpecification>> {
        self.loader.load(self.generation, name, Demand::Ancestor)
    }

    fn reference(&self, name: &str) -> Option<Weak<ObjectSpecification>> {
        if !self.universe.contains(name) {
            return None;
        }
        Some(Arc::downgrade(&self.generation.slot(name).spec))
    }
}

/// Builds and caches object specifications.
pub struct SpecificationLoader {
    universe: RwLock<Arc<ClassUniverse>>,
    model: Arc<ProgrammingModel>,
    config: Arc<MetaModelConfig>,
    current: RwLock<Arc<Generation>>,
    builds: AtomicUsize,
    pool: OnceLock<rayon::ThreadPool>,
}

impl SpecificationLoader {
    /// Create a loader. Fails if the configuration is invalid.
    pub fn new(
        universe: ClassUniverse,
        model: ProgrammingModel,
        config: MetaModelConfig,
    ) -> LoaderResult<Self> {
        config.validate()?;
        debug!(
            "Creating loader: {} classes, {} factories",
            universe.len(),
            model.len()
        );
        Ok(Self {
            universe: RwLock::new(Arc::new(universe)),
            model: Arc::new(model),
            config: Arc::new(config),
            current: RwLock::new(Arc::new(Generation::new())),
            builds: AtomicUsize::new(0),
            pool: OnceLock::new(),
        })
    }

    /// A loader over `universe` with the standard programming model.
    pub fn with_defaults(universe: ClassUniverse) -> LoaderResult<Self> {
        Self::new(universe, ProgrammingModel::standard(), MetaModelConfig::default())
    }

    pub fn universe(&self) -> Arc<ClassUniverse> {
        self.universe.read().clone()
    }

    pub fn model(&self) -> &ProgrammingModel {
        &self.model
    }

    pub fn config(&self) -> &MetaModelConfig {
        &self.config
    }

    fn generation(&self) -> Arc<Generation> {
        self.current.read().clone()
    }

    pub fn generation_id(&self) -> Uuid {
        self.current.read().id
    }

    /// The fully introspected specification of `name`, with every type its
    /// members refer to introspected as well.
    ///
    /// Called from the thread currently building `name`, this returns the
    /// in-progress instance instead, and referenced types stay pending until
    /// the outermost build has finished.
    pub fn specification_for(&self, name: &str) -> LoaderResult<Arc<ObjectSpecification>> {
        let generation = self.generation();
        let spec = self.load(&generation, name, Demand::Complete)?;
        self.link(&generation, &spec);
        Ok(spec)
    }

    /// The specification of `name` in whatever state it is in, without
    /// building or waiting. Unknown classes yield `None`.
    pub fn reference(&self, name: &str) -> Option<Arc<ObjectSpecification>> {
        if !self.universe.read().contains(name) {
            return None;
        }
        Some(self.generation().slot(name).spec.clone())
    }

    fn load(
        &self,
        generation: &Arc<Generation>,
        name: &str,
        demand: Demand,
    ) -> LoaderResult<Arc<ObjectSpecification>> {
        if !self.universe.read().contains(name) {
            return Err(LoaderError::ClassNotFound(name.to_string()));
        }
        let slot = generation.slot(name);
        let me = thread::current().id();
        {
            let mut state = slot.state.lock();
            loop {
                match *state {
                    SlotState::Ready => return Ok(slot.spec.clone()),
                    SlotState::Failed(ref message) => {
                        return Err(LoaderError::BuildFailed {
                            class: name.to_string(),
                            message: message.clone(),
                        })
                    }
                    SlotState::Building(owner) if owner == me => {
                        return match demand {
                            Demand::Complete => Ok(slot.spec.clone()),
                            Demand::Ancestor => Err(LoaderError::InheritanceCycle {
                                class: name.to_string(),
                                cycle: vec![name.to_string(), name.to_string()],
                            }),
                        };
                    }
                    SlotState::Building(_) => {
                        debug!("Waiting for {}", name);
                        slot.ready.wait(&mut state);
                    }
                    SlotState::Pending => {
                        *state = SlotState::Building(me);
                        break;
                    }
                }
            }
        }
        self.build(generation, &slot)?;
        Ok(slot.spec.clone())
    }

    /// Build the pending specifications reachable from `root` through member,
    /// parameter and supertype references.
    ///
    /// Runs only outside of any build, when the thread holds no claim, so the
    /// waits it may do cannot close a cycle. Failures stay recorded on their
    /// own slots.
    fn link(&self, generation: &Arc<Generation>, root: &Arc<ObjectSpecification>) {
        if BuildScope::active() {
            return;
        }
        let mut seen = HashSet::new();
        let mut queue = vec![root.clone()];
        let mut linked = Vec::new();
        while let Some(spec) = queue.pop() {
            if !seen.insert(spec.name().to_string()) {
                continue;
            }
            let slot = generation.slot(spec.name());
            if slot.linked.load(Ordering::Acquire) {
                continue;
            }
            if !spec.is_fully_introspected() {
                if let Err(e) = self.load(generation, spec.name(), Demand::Complete) {
                    debug!("Referenced type {} unavailable: {}", spec.name(), e);
                    continue;
                }
            }
            queue.extend(referenced_specifications(&spec));
            linked.push(slot);
        }
        for slot in linked {
            slot.linked.store(true, Ordering::Release);
        }
    }

    /// Introspect a claimed slot and publish the outcome to waiters.
    fn build(&self, generation: &Arc<Generation>, slot: &Slot) -> LoaderResult<()> {
        let name = slot.spec.name().to_string();
        let universe = self.universe();
        self.builds.fetch_add(1, Ordering::Relaxed);
        debug!("Introspecting {}", name);
        let scope = BuildScope::enter();

        let outcome = match universe.get(&name) {
            None => Err(LoaderError::ClassNotFound(name.clone())),
            Some(descriptor) => {
                let resolver = GenerationResolver {
                    loader: self,
                    generation,
                    universe: &universe,
                };
                let introspector = Introspector::new(&universe, &self.model, &self.config);
                catch_unwind(AssertUnwindSafe(|| {
                    introspector.introspect(&descriptor, &resolver)
                }))
                .unwrap_or_else(|panic| {
                    Err(LoaderError::BuildFailed {
                        class: name.clone(),
                        message: format!("introspection panicked: {}", panic_message(&*panic)),
                    })
                })
            }
        };
        drop(scope);

        let mut state = slot.state.lock();
        let result = match outcome {
            Ok(parts) => {
                slot.spec.install(parts);
                *state = SlotState::Ready;
                debug!("Introspected {}", name);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to introspect {}: {}", name, e);
                *state = SlotState::Failed(e.to_string());
                Err(e)
            }
        };
        slot.ready.notify_all();
        result
    }

    fn pool(&self) -> LoaderResult<&rayon::ThreadPool> {
        if let Some(pool) = self.pool.get() {
            return Ok(pool);
        }
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("meta-introspect-{}", i));
        if let Some(threads) = self.config.worker_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|e| LoaderError::ThreadPool(e.to_string()))?;
        Ok(self.pool.get_or_init(|| pool))
    }

    /// Introspect every domain class, then every placeholder they referenced.
    ///
    /// All per-class failures are collected into a single
    /// [`LoaderError::MetaModelIncomplete`].
    pub fn create_meta_model(&self) -> LoaderResult<MetaModelSnapshot> {
        let generation = self.generation();
        let names = self.universe().domain_classes();
        let started = Instant::now();
        info!(
            "Creating metamodel {}: {} domain classes",
            generation.id,
            names.len()
        );

        if self.config.parallelize_introspection {
            let pool = self.pool()?;
            pool.install(|| {
                names.par_iter().for_each(|name| {
                    let _ = self.load(&generation, name, Demand::Complete);
                })
            });
        } else {
            for name in &names {
                let _ = self.load(&generation, name, Demand::Complete);
            }
        }

        loop {
            let pending = generation.unfinished();
            if pending.is_empty() {
                break;
            }
            debug!("Draining {} placeholder(s)", pending.len());
            for name in &pending {
                let _ = self.load(&generation, name, Demand::Complete);
            }
        }

        let failures: Vec<(String, String)> = generation
            .slots()
            .into_iter()
            .filter_map(|(name, slot)| match slot.state() {
                SlotState::Failed(message) => Some((name, message)),
                _ => None,
            })
            .collect();
        if !failures.is_empty() {
            for (class, message) in &failures {
                warn!("  {}: {}", class, message);
            }
            return Err(LoaderError::MetaModelIncomplete { failures });
        }

        let snapshot = self.snapshot_of(&generation);
        info!(
            "Metamodel {} ready: {} specifications in {:?}",
            generation.id,
            snapshot.len(),
            started.elapsed()
        );
        Ok(snapshot)
    }

    /// Drop every cached specification.
    pub fn dispose_meta_model(&self) {
        let previous = std::mem::replace(&mut *self.current.write(), Arc::new(Generation::new()));
        info!("Disposed metamodel {}", previous.id);
    }

    /// Replace the descriptor of one class and rebuild its specification in
    /// place. Specifications that already reference it keep the same instance.
    ///
    /// Dependents are not rebuilt.
    pub fn reload_class(&self, descriptor: ClassDescriptor) -> LoaderResult<Arc<ObjectSpecification>> {
        let name = descriptor.name.clone();
        {
            let mut universe = self.universe.write();
            let mut next = ClassUniverse::clone(&universe);
            next.register(descriptor);
            *universe = Arc::new(next);
        }

        let generation = self.generation();
        let slot = generation.slot(&name);
        let me = thread::current().id();
        {
            let mut state = slot.state.lock();
            loop {
                match *state {
                    SlotState::Building(owner) if owner == me => {
                        return Err(LoaderError::BuildFailed {
                            class: name,
                            message: "reload requested while the class is being built".to_string(),
                        });
                    }
                    SlotState::Building(_) => slot.ready.wait(&mut state),
                    _ => break,
                }
            }
            *state = SlotState::Building(me);
        }

        info!("Reloading {}", name);
        slot.linked.store(false, Ordering::Release);
        slot.spec.reset();
        self.build(&generation, &slot)?;
        self.link(&generation, &slot.spec);
        Ok(slot.spec.clone())
    }

    /// Every ready specification of the current generation.
    pub fn snapshot(&self) -> MetaModelSnapshot {
        self.snapshot_of(&self.generation())
    }

    fn snapshot_of(&self, generation: &Generation) -> MetaModelSnapshot {
        let specs = generation
            .slots()
            .into_iter()
            .filter(|(_, slot)| slot.state() == SlotState::Ready)
            .map(|(_, slot)| slot.spec.clone())
            .collect();
        MetaModelSnapshot::new(generation.id, specs)
    }

    pub fn stats(&self) -> LoaderStats {
        let generation = self.generation();
        let (mut ready, mut in_progress, mut failed) = (0, 0, 0);
        for (_, slot) in generation.slots() {
            match slot.state() {
                SlotState::Ready => ready += 1,
                SlotState::Failed(_) => failed += 1,
                SlotState::Pending | SlotState::Building(_) => in_progress += 1,
            }
        }
        LoaderStats {
            generation: generation.id,
            generation_started_at: generation.started_at,
            known_classes: self.universe.read().len(),
            ready,
            in_progress,
            failed,
            builds: self.builds.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for SpecificationLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecificationLoader")
            .field("generation", &self.generation_id())
            .field("model", &self.model)
            .field("builds", &self.builds.load(Ordering::Relaxed))
            .finish()
    }
}

/// Specifications `spec` points at, in whatever state they are in.
fn referenced_specifications(spec: &ObjectSpecification) -> Vec<Arc<ObjectSpecification>> {
    let mut referenced: Vec<_> = spec.superclass().into_iter().collect();
    referenced.extend(spec.interfaces());
    for member in spec.members() {
        referenced.extend(member.type_reference());
        referenced.extend(member.parameters().iter().filter_map(|p| p.type_reference()));
    }
    referenced
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
