//! Entity hierarchies and their identifier classification.
//!
//! # Role
//!
//! A hierarchy is an entity root plus every mapped superclass above it and
//! every entity (or mapped superclass) below it. All members share one id
//! mapping, at most one version and one tenant-id attribute, one inheritance
//! strategy and one cache region.
//!
//! # Invariants
//!
//! - Exactly one [`IdMapping`] per hierarchy; a hierarchy without identifier
//!   attributes is rejected.
//! - A second version or tenant-id attribute is a [`CategorizeError::HierarchyConflict`],
//!   never a silent overwrite.
//! - [`EntityHierarchy::types`] is ordered supertype before subtype.

mod builder;

use std::sync::Arc;

use strata_models::ClassDetails;
use strata_models::annotations::{AnnotationTarget, builtins, enum_or_default};

pub(crate) use self::builder::HierarchyBuilder;
use crate::managed::{AccessType, AttributeMetadata, ManagedType};
use crate::{CacheRegion, CategorizeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InheritanceStrategy {
	#[default]
	SingleTable,
	Joined,
	TablePerClass,
}

impl InheritanceStrategy {
	/// Reads `@Inheritance(strategy)` from the root, defaulting to single-table.
	pub(crate) fn declared_on(root: &ClassDetails) -> Result<Self, CategorizeError> {
		let Some(usage) = root.local_usages().get(&builtins().inheritance) else {
			return Ok(Self::default());
		};
		match enum_or_default(usage, "strategy") {
			Some("SINGLE_TABLE") | None => Ok(Self::SingleTable),
			Some("JOINED") => Ok(Self::Joined),
			Some("TABLE_PER_CLASS") => Ok(Self::TablePerClass),
			Some(other) => Err(CategorizeError::invalid("Inheritance.strategy", other, root.location())),
		}
	}
}

/// How a hierarchy's identifier is composed.
#[derive(Debug, Clone)]
pub enum IdMapping {
	/// One `@Id` attribute.
	Basic { attribute: Arc<AttributeMetadata> },
	/// One `@EmbeddedId` attribute; the id class is its declared type.
	Aggregated {
		attribute: Arc<AttributeMetadata>,
		id_class: Arc<ClassDetails>,
	},
	/// Several `@Id` attributes mirrored by an `@IdClass`.
	NonAggregated {
		attributes: Vec<Arc<AttributeMetadata>>,
		id_class: Arc<ClassDetails>,
	},
}

impl IdMapping {
	pub fn attributes(&self) -> &[Arc<AttributeMetadata>] {
		match self {
			Self::Basic { attribute } | Self::Aggregated { attribute, .. } => std::slice::from_ref(attribute),
			Self::NonAggregated { attributes, .. } => attributes,
		}
	}

	pub fn id_class(&self) -> Option<&Arc<ClassDetails>> {
		match self {
			Self::Basic { .. } => None,
			Self::Aggregated { id_class, .. } | Self::NonAggregated { id_class, .. } => Some(id_class),
		}
	}
}

#[derive(Debug, Clone)]
pub struct NaturalIdMapping {
	pub attributes: Vec<Arc<AttributeMetadata>>,
	pub mutable: bool,
}

#[derive(Debug)]
pub struct EntityHierarchy {
	root: Arc<ManagedType>,
	types: Vec<Arc<ManagedType>>,
	inheritance: InheritanceStrategy,
	id_mapping: IdMapping,
	version: Option<Arc<AttributeMetadata>>,
	tenant_id: Option<Arc<AttributeMetadata>>,
	natural_id: Option<NaturalIdMapping>,
	cache: CacheRegion,
	access: AccessType,
}

impl EntityHierarchy {
	pub fn root(&self) -> &Arc<ManagedType> {
		&self.root
	}

	/// Every managed type in the hierarchy, supertype before subtype.
	pub fn types(&self) -> &[Arc<ManagedType>] {
		&self.types
	}

	pub fn entities(&self) -> impl Iterator<Item = &Arc<ManagedType>> + '_ {
		self.types.iter().filter(|t| t.is_entity())
	}

	pub fn contains(&self, class_name: &str) -> bool {
		self.types.iter().any(|t| t.name() == class_name)
	}

	/// Nearest managed supertype of `class_name` within this hierarchy.
	pub fn super_type_of(&self, class_name: &str) -> Option<&Arc<ManagedType>> {
		let ty = self.types.iter().find(|t| t.name() == class_name)?;
		ty.class()
			.ancestors()
			.find_map(|ancestor| self.types.iter().find(|t| t.name() == ancestor.name()))
	}

	/// Nearest entity supertype of `class_name` within this hierarchy.
	pub fn entity_super_type_of(&self, class_name: &str) -> Option<&Arc<ManagedType>> {
		let ty = self.types.iter().find(|t| t.name() == class_name)?;
		ty.class()
			.ancestors()
			.find_map(|ancestor| self.entities().find(|t| t.name() == ancestor.name()))
	}

	pub fn has_subtypes(&self) -> bool {
		self.entities().count() > 1
	}

	pub fn inheritance(&self) -> InheritanceStrategy {
		self.inheritance
	}

	pub fn id_mapping(&self) -> &IdMapping {
		&self.id_mapping
	}

	pub fn version(&self) -> Option<&Arc<AttributeMetadata>> {
		self.version.as_ref()
	}

	pub fn tenant_id(&self) -> Option<&Arc<AttributeMetadata>> {
		self.tenant_id.as_ref()
	}

	pub fn natural_id(&self) -> Option<&NaturalIdMapping> {
		self.natural_id.as_ref()
	}

	pub fn cache(&self) -> &CacheRegion {
		&self.cache
	}

	pub fn access(&self) -> AccessType {
		self.access
	}
}

#[cfg(test)]
mod tests;
