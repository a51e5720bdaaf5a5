//! Managed types and the attribute walk they share.
//!
//! # Mental Model
//!
//! A [`ManagedType`] is one of three closed variants (entity, mapped
//! superclass, embeddable) wrapping the same [`TypeMetadata`]: the class, its
//! access type, and the attributes declared directly on it. Attribute lookup
//! goes through [`AttributeContainer`], so callers never care which variant
//! they hold.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use strata_models::annotations::{
	AnnotationDescriptor, AnnotationTarget, AnnotationUsage, builtins, enum_or_default, string_or_default,
};
use strata_models::{ClassDetails, MemberDetails};

use crate::CategorizeError;

/// Where attribute state is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessType {
	#[default]
	Field,
	Property,
}

impl AccessType {
	/// Reads an explicit `@Access` from a class.
	pub(crate) fn declared_on(class: &ClassDetails) -> Result<Option<Self>, CategorizeError> {
		let Some(usage) = class.local_usages().get(&builtins().access) else {
			return Ok(None);
		};
		match enum_or_default(usage, "value") {
			Some("FIELD") => Ok(Some(Self::Field)),
			Some("PROPERTY") => Ok(Some(Self::Property)),
			other => Err(CategorizeError::invalid(
				"Access.value",
				other.unwrap_or_default(),
				class.location(),
			)),
		}
	}
}

/// Coarse classification of a persistent attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeNature {
	Basic,
	Embedded,
	ToOne,
	Plural,
}

#[derive(Debug)]
pub struct AttributeMetadata {
	name: Arc<str>,
	member: Arc<MemberDetails>,
	nature: AttributeNature,
}

impl AttributeMetadata {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn member(&self) -> &Arc<MemberDetails> {
		&self.member
	}

	pub fn nature(&self) -> AttributeNature {
		self.nature
	}

	pub fn declaring_type(&self) -> &str {
		self.member.declaring_class()
	}

	/// `com.acme.Order.total`, as used in diagnostics.
	pub fn qualified_name(&self) -> String {
		format!("{}.{}", self.member.declaring_class(), self.name)
	}

	pub fn usage(&self, descriptor: &AnnotationDescriptor) -> Option<&Arc<AnnotationUsage>> {
		self.member.local_usages().get(descriptor)
	}

	pub fn has(&self, descriptor: &AnnotationDescriptor) -> bool {
		self.member.has_usage(descriptor)
	}

	pub fn repeated(&self, descriptor: &AnnotationDescriptor) -> Vec<Arc<AnnotationUsage>> {
		self.member.local_usages().repeated(descriptor)
	}
}

/// The common part of every managed type.
#[derive(Debug)]
pub struct TypeMetadata {
	class: Arc<ClassDetails>,
	access: AccessType,
	attributes: Vec<Arc<AttributeMetadata>>,
}

impl TypeMetadata {
	pub(crate) fn new(class: Arc<ClassDetails>, access: AccessType, embeddables: &FxHashSet<Arc<str>>) -> Self {
		let attributes = collect_attributes(&class, access, embeddables);
		Self {
			class,
			access,
			attributes,
		}
	}

	pub fn class(&self) -> &Arc<ClassDetails> {
		&self.class
	}

	pub fn access(&self) -> AccessType {
		self.access
	}
}

/// Shared attribute walk over any managed type.
pub trait AttributeContainer {
	/// Attributes declared directly on this type, in member order.
	fn attributes(&self) -> &[Arc<AttributeMetadata>];

	fn find_attribute(&self, name: &str) -> Option<&Arc<AttributeMetadata>> {
		self.attributes().iter().find(|a| a.name() == name)
	}

	fn attributes_with<'a>(
		&'a self,
		descriptor: &'a AnnotationDescriptor,
	) -> Box<dyn Iterator<Item = &'a Arc<AttributeMetadata>> + 'a> {
		Box::new(self.attributes().iter().filter(move |a| a.has(descriptor)))
	}
}

impl AttributeContainer for TypeMetadata {
	fn attributes(&self) -> &[Arc<AttributeMetadata>] {
		&self.attributes
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
	Entity,
	MappedSuperclass,
	Embeddable,
}

impl Category {
	pub fn label(self) -> &'static str {
		match self {
			Self::Entity => "@Entity",
			Self::MappedSuperclass => "@MappedSuperclass",
			Self::Embeddable => "@Embeddable",
		}
	}

	/// The category a class declares, if any. Declaring two is an error.
	pub fn of(class: &ClassDetails) -> Result<Option<Self>, CategorizeError> {
		let b = builtins();
		let usages = class.local_usages();
		let mut found = None;
		for (descriptor, category) in [
			(&b.entity, Self::Entity),
			(&b.mapped_superclass, Self::MappedSuperclass),
			(&b.embeddable, Self::Embeddable),
		] {
			if !usages.has(descriptor) {
				continue;
			}
			if let Some(first) = found {
				return Err(CategorizeError::ConflictingCategory {
					class: class.name().to_owned(),
					first: Self::label(first),
					second: category.label(),
				});
			}
			found = Some(category);
		}
		Ok(found)
	}
}

#[derive(Debug)]
pub enum ManagedType {
	Entity { entity_name: Arc<str>, metadata: TypeMetadata },
	MappedSuperclass(TypeMetadata),
	Embeddable(TypeMetadata),
}

impl ManagedType {
	pub(crate) fn build(
		category: Category,
		class: Arc<ClassDetails>,
		access: AccessType,
		embeddables: &FxHashSet<Arc<str>>,
	) -> Self {
		match category {
			Category::Entity => {
				let entity_name = class
					.local_usages()
					.get(&builtins().entity)
					.and_then(|u| string_or_default(u, "name"))
					.map(Arc::from)
					.unwrap_or_else(|| Arc::from(class.simple_name()));
				Self::Entity {
					entity_name,
					metadata: TypeMetadata::new(class, access, embeddables),
				}
			}
			Category::MappedSuperclass => Self::MappedSuperclass(TypeMetadata::new(class, access, embeddables)),
			Category::Embeddable => Self::Embeddable(TypeMetadata::new(class, access, embeddables)),
		}
	}

	pub fn metadata(&self) -> &TypeMetadata {
		match self {
			Self::Entity { metadata, .. } | Self::MappedSuperclass(metadata) | Self::Embeddable(metadata) => metadata,
		}
	}

	pub fn category(&self) -> Category {
		match self {
			Self::Entity { .. } => Category::Entity,
			Self::MappedSuperclass(_) => Category::MappedSuperclass,
			Self::Embeddable(_) => Category::Embeddable,
		}
	}

	pub fn class(&self) -> &Arc<ClassDetails> {
		self.metadata().class()
	}

	pub fn name(&self) -> &str {
		self.class().name()
	}

	pub fn access(&self) -> AccessType {
		self.metadata().access()
	}

	pub fn entity_name(&self) -> Option<&str> {
		match self {
			Self::Entity { entity_name, .. } => Some(&**entity_name),
			_ => None,
		}
	}

	pub fn is_entity(&self) -> bool {
		matches!(self, Self::Entity { .. })
	}
}

impl AttributeContainer for ManagedType {
	fn attributes(&self) -> &[Arc<AttributeMetadata>] {
		self.metadata().attributes()
	}
}

/// Persistent attributes declared on `class` for the given access type.
fn collect_attributes(
	class: &ClassDetails,
	access: AccessType,
	embeddables: &FxHashSet<Arc<str>>,
) -> Vec<Arc<AttributeMetadata>> {
	let members = match access {
		AccessType::Field => class.fields(),
		AccessType::Property => class.methods(),
	};
	members
		.iter()
		.filter(|m| m.is_persistable() && !m.has_usage(&builtins().transient))
		.map(|member| {
			Arc::new(AttributeMetadata {
				name: member.attribute_name(),
				nature: nature_of(member, embeddables),
				member: member.clone(),
			})
		})
		.collect()
}

fn nature_of(member: &MemberDetails, embeddables: &FxHashSet<Arc<str>>) -> AttributeNature {
	let b = builtins();
	let has = |d: &AnnotationDescriptor| member.has_usage(d);
	if has(&b.embedded) || has(&b.embedded_id) {
		AttributeNature::Embedded
	} else if has(&b.many_to_one) || has(&b.one_to_one) {
		AttributeNature::ToOne
	} else if has(&b.one_to_many) || has(&b.many_to_many) || has(&b.element_collection) {
		AttributeNature::Plural
	} else if embeddables.contains(member.type_name()) {
		AttributeNature::Embedded
	} else {
		AttributeNature::Basic
	}
}
