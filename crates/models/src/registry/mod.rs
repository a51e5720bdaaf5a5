//! Memoized class metadata registry.
//!
//! # Role
//!
//! Resolves qualified names to shared [`ClassDetails`] instances through one
//! active backend, records the reverse subclass index as classes are
//! discovered, and publishes an immutable [`MetadataSnapshot`].
//!
//! # Invariants
//!
//! - One `ClassDetails` per name per registry: concurrent first access may run
//!   the builder more than once, but only the first insert is ever handed out.
//! - After [`MetadataRegistry::snapshot`], every operation that would build or
//!   register fails with [`ModelsError::ImmutableRegistry`].
//! - Static-index misses fall back to the live backend; `UnknownClass` is only
//!   raised when both miss.
//! - Annotation descriptors are process-wide, not per registry; sealing only
//!   stops this registry from adding new ones.

mod descriptors;
mod lookup;
mod snapshot;
mod subclasses;

use std::collections::hash_map::Entry;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use self::descriptors::DescriptorRegistry;
pub use self::lookup::ClassDetailsLookup;
pub use self::snapshot::MetadataSnapshot;
use self::subclasses::SubclassIndex;
use crate::annotations::{AnnotationDescriptor, DescriptorSource};
use crate::source::{ClassIndex, ClassLoading, ClassShape, ClassSource, IndexedSource, LiveSource};
use crate::{ClassDetails, ModelsError};

/// Which discovery backend a registry builds from.
#[derive(Clone)]
pub enum RegistryBackend {
	/// Introspect loaded classes.
	Live(Arc<dyn ClassLoading>),
	/// Prefer the precomputed index; fall back to the loader (if any) on a miss.
	Indexed {
		index: Arc<ClassIndex>,
		fallback: Option<Arc<dyn ClassLoading>>,
	},
}

pub struct MetadataRegistry {
	primary: Box<dyn ClassSource>,
	fallback: Option<Box<dyn ClassSource>>,
	classes: RwLock<FxHashMap<Box<str>, Arc<ClassDetails>>>,
	subclasses: RwLock<SubclassIndex>,
	descriptors: DescriptorRegistry,
	sealed: ArcSwapOption<MetadataSnapshot>,
}

impl MetadataRegistry {
	pub fn new(backend: RegistryBackend) -> Self {
		let (primary, fallback): (Box<dyn ClassSource>, Option<Box<dyn ClassSource>>) = match backend {
			RegistryBackend::Live(loader) => (Box::new(LiveSource::new(loader)), None),
			RegistryBackend::Indexed { index, fallback } => (
				Box::new(IndexedSource::new(index)),
				fallback.map(|loader| Box::new(LiveSource::new(loader)) as Box<dyn ClassSource>),
			),
		};
		Self::with_sources(primary, fallback)
	}

	/// Builds a registry over arbitrary sources.
	pub fn with_sources(primary: Box<dyn ClassSource>, fallback: Option<Box<dyn ClassSource>>) -> Self {
		Self {
			primary,
			fallback,
			classes: RwLock::new(FxHashMap::default()),
			subclasses: RwLock::new(SubclassIndex::default()),
			descriptors: DescriptorRegistry::default(),
			sealed: ArcSwapOption::empty(),
		}
	}

	pub fn live(loader: impl ClassLoading + 'static) -> Self {
		Self::new(RegistryBackend::Live(Arc::new(loader)))
	}

	pub fn indexed(index: ClassIndex, fallback: Option<Arc<dyn ClassLoading>>) -> Self {
		Self::new(RegistryBackend::Indexed {
			index: Arc::new(index),
			fallback,
		})
	}

	pub fn is_sealed(&self) -> bool {
		self.sealed.load().is_some()
	}

	/// Number of classes built so far.
	pub fn len(&self) -> usize {
		self.classes.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.read().is_empty()
	}

	/// Whether `name` has already been built.
	pub fn contains(&self, name: &str) -> bool {
		self.classes.read().contains_key(name)
	}

	/// Returns the one [`ClassDetails`] for `name`, building it (and its
	/// superclass chain) on first access.
	pub fn resolve(&self, name: &str) -> Result<Arc<ClassDetails>, ModelsError> {
		self.resolve_in(name, &mut Vec::new())
	}

	/// Resolves every name, stopping at the first failure.
	pub fn resolve_all<'a>(
		&self,
		names: impl IntoIterator<Item = &'a str>,
	) -> Result<Vec<Arc<ClassDetails>>, ModelsError> {
		names.into_iter().map(|name| self.resolve(name)).collect()
	}

	/// Registers a custom annotation shape in the process-wide table. Must
	/// happen before any class using it is resolved anywhere in the process,
	/// or the name will already be bound to a lenient shape.
	pub fn register_descriptor(&self, descriptor: AnnotationDescriptor) -> Result<Arc<AnnotationDescriptor>, ModelsError> {
		self.descriptors.register(descriptor)
	}

	/// Seals the registry and returns its snapshot. Repeated calls return the
	/// same snapshot.
	pub fn snapshot(&self) -> Arc<MetadataSnapshot> {
		let classes = self.classes.write();
		if let Some(existing) = self.sealed.load_full() {
			return existing;
		}
		let subclasses = self.subclasses.read().clone();
		self.descriptors.seal();
		let snapshot = Arc::new(MetadataSnapshot::new(Arc::new(classes.clone()), Arc::new(subclasses)));
		self.sealed.store(Some(snapshot.clone()));
		tracing::info!(domain = "models", classes = classes.len(), "metadata registry sealed");
		snapshot
	}

	fn resolve_in(&self, name: &str, chain: &mut Vec<String>) -> Result<Arc<ClassDetails>, ModelsError> {
		if let Some(found) = self.classes.read().get(name) {
			return Ok(found.clone());
		}
		if self.is_sealed() {
			return Err(ModelsError::immutable("build", name));
		}
		if chain.iter().any(|n| n == name) {
			let mut chain = chain.clone();
			chain.push(name.to_string());
			return Err(ModelsError::CyclicHierarchy { chain });
		}

		let shape = self.find_shape(name)?;
		chain.push(name.to_string());
		let superclass = match &shape.superclass {
			Some(superclass) => Some(self.resolve_in(superclass, chain)?),
			None => None,
		};
		chain.pop();

		let built = Arc::new(ClassDetails::from_shape(&shape, superclass, &self.descriptors)?);
		self.publish(name, built)
	}

	fn find_shape(&self, name: &str) -> Result<ClassShape, ModelsError> {
		if let Some(shape) = self.primary.find(name)? {
			tracing::debug!(domain = "models", name, backend = self.primary.label(), "building class details");
			return Ok(shape);
		}
		if let Some(fallback) = &self.fallback
			&& let Some(shape) = fallback.find(name)?
		{
			tracing::debug!(
				domain = "models",
				name,
				preferred = self.primary.label(),
				backend = fallback.label(),
				"preferred backend has no entry; falling back",
			);
			return Ok(shape);
		}
		Err(ModelsError::unknown_class(name))
	}

	/// Atomic insert-or-get. Whoever inserts first wins; later builders'
	/// results are dropped.
	fn publish(&self, name: &str, built: Arc<ClassDetails>) -> Result<Arc<ClassDetails>, ModelsError> {
		let mut classes = self.classes.write();
		if self.is_sealed() {
			return Err(ModelsError::immutable("build", name));
		}
		match classes.entry(Box::from(name)) {
			Entry::Occupied(existing) => Ok(existing.get().clone()),
			Entry::Vacant(slot) => {
				if let Some(superclass) = built.superclass_name() {
					self.subclasses.write().record(superclass, built.name_arc());
				}
				Ok(slot.insert(built).clone())
			}
		}
	}
}

impl DescriptorSource for MetadataRegistry {
	fn descriptor(&self, name: &str) -> Result<Arc<AnnotationDescriptor>, ModelsError> {
		self.descriptors.get(name)
	}
}

impl ClassDetailsLookup for MetadataRegistry {
	fn resolve(&self, name: &str) -> Result<Arc<ClassDetails>, ModelsError> {
		MetadataRegistry::resolve(self, name)
	}

	fn direct_subclasses(&self, name: &str) -> Vec<Arc<str>> {
		self.subclasses.read().direct(name)
	}
}
