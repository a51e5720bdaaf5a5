//! Type-level binders, one per identifiable type of a hierarchy.
//!
//! # Role
//!
//! [`bind_hierarchy`] walks a hierarchy supertype before subtype. Each entity
//! gets an [`EntityBinder`] that declares (or shares) its table and binds the
//! attributes it can bind inline; each mapped superclass gets a
//! [`MappedSuperclassBinder`] that owns no table. Work that needs a peer bound
//! first goes onto the [`PassQueue`].
//!
//! # Invariants
//!
//! - An entity's parent entity is bound before the entity itself, so
//!   subclass binders may read the parent's binding from the model.
//! - Deferred closures capture owned names and a cloned
//!   [`BindingEnvironment`]; they never borrow the categorized model.
//! - [`TypeBinder::finish`] runs only after the queue converged.

mod attributes;
mod entity;
mod mapped;
mod passes;

use std::sync::Arc;

use strata_categorize::{CategorizedDomainModel, Category, EntityHierarchy};
use strata_models::annotations::{AnnotationUsage, AttributeValue, attribute_or_default, names};

pub(crate) use self::entity::EntityBinder;
pub(crate) use self::mapped::MappedSuperclassBinder;
use crate::env::BindingEnvironment;
use crate::globals::GlobalLookups;
use crate::model::BoundModel;
use crate::second_pass::SecondPassQueue;
use crate::BindingError;

/// Mutable state threaded through inline binding and every deferred pass.
#[derive(Debug, Default)]
pub(crate) struct BindingState {
	pub(crate) model: BoundModel,
	pub(crate) globals: GlobalLookups,
}

pub(crate) type PassQueue = SecondPassQueue<BindingState, BindingError>;

/// Read-only inputs of one hierarchy walk.
#[derive(Clone, Copy)]
pub(crate) struct HierarchyContext<'a> {
	pub(crate) env: &'a BindingEnvironment,
	pub(crate) domain: &'a CategorizedDomainModel,
	pub(crate) hierarchy: &'a EntityHierarchy,
}

#[derive(Debug)]
pub(crate) enum TypeBinder {
	Entity(EntityBinder),
	MappedSuperclass(MappedSuperclassBinder),
}

impl TypeBinder {
	pub(crate) fn class_name(&self) -> &str {
		match self {
			Self::Entity(binder) => binder.class_name(),
			Self::MappedSuperclass(binder) => binder.class_name(),
		}
	}

	/// Closing pass, run once deferred binding has converged.
	pub(crate) fn finish(&self, state: &mut BindingState) -> Result<(), BindingError> {
		match self {
			Self::Entity(binder) => binder.finish(state),
			Self::MappedSuperclass(binder) => {
				binder.finish(state);
				Ok(())
			}
		}
	}
}

pub(crate) fn bind_hierarchy(
	cx: HierarchyContext<'_>,
	state: &mut BindingState,
	queue: &mut PassQueue,
) -> Result<Vec<TypeBinder>, BindingError> {
	let root = cx.hierarchy.root().name();
	let _span = tracing::debug_span!("binder.hierarchy", root).entered();
	let mut binders = Vec::with_capacity(cx.hierarchy.types().len());
	for ty in cx.hierarchy.types() {
		let binder = match ty.category() {
			Category::Entity => TypeBinder::Entity(EntityBinder::bind(cx, ty, state, queue)?),
			Category::MappedSuperclass => TypeBinder::MappedSuperclass(MappedSuperclassBinder::bind(cx, ty, state)),
			Category::Embeddable => continue,
		};
		binders.push(binder);
	}
	tracing::debug!(
		domain = "binder",
		root,
		types = binders.len(),
		queued = queue.len(),
		"hierarchy bound"
	);
	Ok(binders)
}

/// A class-valued attribute or its default, treating `void` as unset.
fn class_attribute<'a>(usage: &'a AnnotationUsage, name: &str) -> Option<&'a str> {
	attribute_or_default(usage, name)
		.and_then(AttributeValue::as_class)
		.filter(|c| *c != names::VOID)
}

fn arc_path(path: &[&str]) -> Vec<Arc<str>> {
	path.iter().map(|segment| Arc::from(*segment)).collect()
}
