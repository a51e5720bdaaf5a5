//! Flat class list → [`CategorizedDomainModel`].
//!
//! Classes are resolved through a [`ClassDetailsLookup`], classified by their
//! category annotation, and grouped under the topmost entity of their chain.
//! Global registrations are collected from every input class, categorized or
//! not.

use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use rustc_hash::{FxHashMap, FxHashSet};
use strata_models::annotations::{AnnotationTarget, builtins};
use strata_models::{ClassDetails, ClassDetailsLookup};

use crate::hierarchy::{EntityHierarchy, HierarchyBuilder, InheritanceStrategy};
use crate::managed::{AccessType, Category, ManagedType};
use crate::{CacheRegion, CategorizeError, GlobalRegistrations, SharedCacheMode};

/// Output of categorization, consumed by the binder.
#[derive(Debug)]
pub struct CategorizedDomainModel {
	hierarchies: Vec<EntityHierarchy>,
	managed_types: IndexMap<Arc<str>, Arc<ManagedType>>,
	registrations: GlobalRegistrations,
	cache_mode: SharedCacheMode,
}

impl CategorizedDomainModel {
	pub fn hierarchies(&self) -> &[EntityHierarchy] {
		&self.hierarchies
	}

	pub fn registrations(&self) -> &GlobalRegistrations {
		&self.registrations
	}

	pub fn cache_mode(&self) -> SharedCacheMode {
		self.cache_mode
	}

	/// Every managed type, keyed by class name, in discovery order.
	pub fn managed_types(&self) -> impl Iterator<Item = &Arc<ManagedType>> + '_ {
		self.managed_types.values()
	}

	pub fn managed_type(&self, class_name: &str) -> Option<&Arc<ManagedType>> {
		self.managed_types.get(class_name)
	}

	pub fn embeddables(&self) -> impl Iterator<Item = &Arc<ManagedType>> + '_ {
		self.managed_types().filter(|t| t.category() == Category::Embeddable)
	}

	/// Mapped superclasses that no hierarchy reaches.
	pub fn stray_mapped_superclasses(&self) -> impl Iterator<Item = &Arc<ManagedType>> + '_ {
		self.managed_types()
			.filter(|t| t.category() == Category::MappedSuperclass)
			.filter(|t| self.hierarchy_of(t.name()).is_none())
	}

	pub fn hierarchy_of(&self, class_name: &str) -> Option<&EntityHierarchy> {
		self.hierarchies.iter().find(|h| h.contains(class_name))
	}

	pub fn entity_by_name(&self, entity_name: &str) -> Option<&Arc<ManagedType>> {
		self.managed_types().find(|t| t.entity_name() == Some(entity_name))
	}
}

pub struct Categorizer<'a> {
	lookup: &'a dyn ClassDetailsLookup,
	cache_mode: SharedCacheMode,
}

impl<'a> Categorizer<'a> {
	pub fn new(lookup: &'a dyn ClassDetailsLookup) -> Self {
		Self {
			lookup,
			cache_mode: SharedCacheMode::default(),
		}
	}

	pub fn with_cache_mode(mut self, mode: SharedCacheMode) -> Self {
		self.cache_mode = mode;
		self
	}

	pub fn categorize<I, S>(&self, names: I) -> Result<CategorizedDomainModel, CategorizeError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut classes: IndexMap<Arc<str>, (Arc<ClassDetails>, Option<Category>)> = IndexMap::new();
		let mut registrations = GlobalRegistrations::default();
		for name in names {
			let class = self.lookup.resolve(name.as_ref())?;
			if let Entry::Vacant(slot) = classes.entry(class.name_arc().clone()) {
				registrations.collect(&class)?;
				let category = Category::of(&class)?;
				slot.insert((class, category));
			}
		}

		let embeddables: FxHashSet<Arc<str>> = classes
			.iter()
			.filter(|(_, (_, c))| *c == Some(Category::Embeddable))
			.map(|(name, _)| name.clone())
			.collect();

		let mut roots: IndexMap<Arc<str>, Arc<ClassDetails>> = IndexMap::new();
		for (class, _) in classes.values().filter(|(_, c)| *c == Some(Category::Entity)) {
			let root = topmost_entity(class);
			roots.entry(root.name_arc().clone()).or_insert_with(|| root.clone());
		}

		let mut session = Session {
			lookup: self.lookup,
			embeddables: &embeddables,
			managed: IndexMap::new(),
		};
		let mut hierarchies = Vec::with_capacity(roots.len());
		for root in roots.values() {
			hierarchies.push(session.hierarchy(root, self.cache_mode)?);
		}

		for (class, category) in classes.values() {
			if let Some(category @ (Category::Embeddable | Category::MappedSuperclass)) = *category {
				session.managed_type(class, category, None)?;
			}
		}

		check_entity_names(session.managed.values())?;

		tracing::info!(
			domain = "categorize",
			classes = classes.len(),
			hierarchies = hierarchies.len(),
			managed_types = session.managed.len(),
			"categorized domain model"
		);

		Ok(CategorizedDomainModel {
			hierarchies,
			managed_types: session.managed,
			registrations,
			cache_mode: self.cache_mode,
		})
	}
}

/// Mutable state for one categorization run.
struct Session<'a> {
	lookup: &'a dyn ClassDetailsLookup,
	embeddables: &'a FxHashSet<Arc<str>>,
	managed: IndexMap<Arc<str>, Arc<ManagedType>>,
}

impl Session<'_> {
	/// Builds a managed type once; a type shared by two hierarchies keeps the
	/// access type of the first.
	fn managed_type(
		&mut self,
		class: &Arc<ClassDetails>,
		category: Category,
		inherited_access: Option<AccessType>,
	) -> Result<Arc<ManagedType>, CategorizeError> {
		if let Some(existing) = self.managed.get(class.name()) {
			return Ok(existing.clone());
		}
		let access = AccessType::declared_on(class)?
			.or(inherited_access)
			.unwrap_or_default();
		let ty = Arc::new(ManagedType::build(category, class.clone(), access, self.embeddables));
		self.managed.insert(class.name_arc().clone(), ty.clone());
		Ok(ty)
	}

	fn hierarchy(&mut self, root: &Arc<ClassDetails>, mode: SharedCacheMode) -> Result<EntityHierarchy, CategorizeError> {
		let mut above = Vec::new();
		for ancestor in root.ancestors() {
			if Category::of(ancestor)? == Some(Category::MappedSuperclass) {
				above.push(ancestor.clone());
			}
		}
		above.reverse();

		let access = match AccessType::declared_on(root)? {
			Some(access) => access,
			None => infer_access(above.iter().chain(std::iter::once(root))),
		};

		let root_type = self.managed_type(root, Category::Entity, Some(access))?;
		let mut builder = HierarchyBuilder::new(root_type.clone());
		for class in &above {
			let ty = self.managed_type(class, Category::MappedSuperclass, Some(access))?;
			builder.add_type(ty)?;
		}
		builder.add_type(root_type)?;

		for name in self.lookup.all_subclasses(root.name()) {
			let class = self.lookup.resolve(&name)?;
			match Category::of(&class)? {
				Some(category @ (Category::Entity | Category::MappedSuperclass)) => {
					let ty = self.managed_type(&class, category, Some(access))?;
					builder.add_type(ty)?;
				}
				_ => tracing::trace!(domain = "categorize", class = %name, "unmanaged subclass skipped"),
			}
		}

		builder.resolve(
			self.lookup,
			InheritanceStrategy::declared_on(root)?,
			CacheRegion::for_root(root, mode),
			access,
		)
	}
}

fn topmost_entity(class: &Arc<ClassDetails>) -> &Arc<ClassDetails> {
	let entity = &builtins().entity;
	class
		.ancestors()
		.filter(|a| a.local_usages().has(entity))
		.last()
		.unwrap_or(class)
}

/// Access follows the placement of the identifier: on a field means field
/// access, on a getter means property access. Field access otherwise.
fn infer_access<'a>(chain: impl Iterator<Item = &'a Arc<ClassDetails>>) -> AccessType {
	let b = builtins();
	let marks_id = |target: &dyn AnnotationTarget| target.has_usage(&b.id) || target.has_usage(&b.embedded_id);
	for class in chain {
		if class.fields().iter().any(|f| marks_id(&**f)) {
			return AccessType::Field;
		}
		if class.methods().iter().any(|m| m.is_persistable() && marks_id(&**m)) {
			return AccessType::Property;
		}
	}
	AccessType::Field
}

fn check_entity_names<'a>(types: impl Iterator<Item = &'a Arc<ManagedType>>) -> Result<(), CategorizeError> {
	let mut seen: FxHashMap<&str, &str> = FxHashMap::default();
	for ty in types {
		let Some(entity_name) = ty.entity_name() else {
			continue;
		};
		if let Some(first) = seen.insert(entity_name, ty.name()) {
			return Err(CategorizeError::DuplicateEntityName {
				name: entity_name.to_owned(),
				first: first.to_owned(),
				second: ty.name().to_owned(),
			});
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests;
