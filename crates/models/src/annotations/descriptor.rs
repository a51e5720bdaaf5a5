//! Per-shape annotation metadata.
//!
//! # Invariants
//!
//! - One descriptor per annotation name per process, whether built-in, custom
//!   or lenient. Usages hold the descriptor by `Arc`; shape metadata is never
//!   re-derived per usage.

use std::sync::Arc;

use bitflags::bitflags;

use super::AttributeValue;

bitflags! {
	/// Program elements an annotation may be declared on.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct AnnotationTargets: u8 {
		const TYPE = 1 << 0;
		const FIELD = 1 << 1;
		const METHOD = 1 << 2;
		const ANNOTATION_TYPE = 1 << 3;
		const PARAMETER = 1 << 4;
		const PACKAGE = 1 << 5;
		/// Fields and methods; the usual placement for attribute-level annotations.
		const MEMBER = Self::FIELD.bits() | Self::METHOD.bits();
	}
}

/// A declared annotation attribute and its default, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
	pub name: Arc<str>,
	pub default: Option<AttributeValue>,
}

/// Immutable metadata for one annotation shape.
#[derive(Debug)]
pub struct AnnotationDescriptor {
	name: Arc<str>,
	targets: AnnotationTargets,
	inherited: bool,
	container: Option<Arc<AnnotationDescriptor>>,
	attributes: Vec<AttributeDescriptor>,
	/// Lenient descriptors accept any attribute; used for shapes nothing registered.
	lenient: bool,
}

impl AnnotationDescriptor {
	pub fn builder(name: impl Into<Arc<str>>, targets: AnnotationTargets) -> DescriptorBuilder {
		DescriptorBuilder {
			name: name.into(),
			targets,
			inherited: false,
			container: None,
			attributes: Vec::new(),
		}
	}

	/// Builds the descriptor used for annotation names nothing registered.
	pub(crate) fn lenient(name: &str) -> Self {
		Self {
			name: Arc::from(name),
			targets: AnnotationTargets::all(),
			inherited: false,
			container: None,
			attributes: Vec::new(),
			lenient: true,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn name_arc(&self) -> &Arc<str> {
		&self.name
	}

	pub fn targets(&self) -> AnnotationTargets {
		self.targets
	}

	pub fn allows(&self, target: AnnotationTargets) -> bool {
		self.targets.contains(target)
	}

	pub fn is_inherited(&self) -> bool {
		self.inherited
	}

	pub fn is_lenient(&self) -> bool {
		self.lenient
	}

	/// The container descriptor when this shape is the singular form of a
	/// repeatable group.
	pub fn repeatable_container(&self) -> Option<&Arc<AnnotationDescriptor>> {
		self.container.as_ref()
	}

	/// Declared attributes in declaration order.
	pub fn attributes(&self) -> &[AttributeDescriptor] {
		&self.attributes
	}

	pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
		self.attributes.iter().find(|a| &*a.name == name)
	}

	pub fn declares(&self, name: &str) -> bool {
		self.lenient || self.attribute(name).is_some()
	}

	pub fn default_value(&self, name: &str) -> Option<&AttributeValue> {
		self.attribute(name).and_then(|a| a.default.as_ref())
	}

	/// Compares every declared property, not just the name.
	pub fn same_shape(&self, other: &Self) -> bool {
		let containers = match (&self.container, &other.container) {
			(Some(a), Some(b)) => Arc::ptr_eq(a, b) || a.same_shape(b),
			(None, None) => true,
			_ => false,
		};
		self.name == other.name
			&& self.targets == other.targets
			&& self.inherited == other.inherited
			&& self.lenient == other.lenient
			&& self.attributes == other.attributes
			&& containers
	}
}

impl PartialEq for AnnotationDescriptor {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
	}
}

impl Eq for AnnotationDescriptor {}

pub struct DescriptorBuilder {
	name: Arc<str>,
	targets: AnnotationTargets,
	inherited: bool,
	container: Option<Arc<AnnotationDescriptor>>,
	attributes: Vec<AttributeDescriptor>,
}

impl DescriptorBuilder {
	pub fn inherited(mut self) -> Self {
		self.inherited = true;
		self
	}

	/// Marks the shape as repeatable, grouped under `container`.
	pub fn repeatable(mut self, container: Arc<AnnotationDescriptor>) -> Self {
		self.container = Some(container);
		self
	}

	/// Declares an attribute with no default; usages must state it to have it.
	pub fn required(mut self, name: &str) -> Self {
		self.attributes.push(AttributeDescriptor {
			name: Arc::from(name),
			default: None,
		});
		self
	}

	pub fn attr(mut self, name: &str, default: AttributeValue) -> Self {
		self.attributes.push(AttributeDescriptor {
			name: Arc::from(name),
			default: Some(default),
		});
		self
	}

	pub fn build(self) -> AnnotationDescriptor {
		AnnotationDescriptor {
			name: self.name,
			targets: self.targets,
			inherited: self.inherited,
			container: self.container,
			attributes: self.attributes,
			lenient: false,
		}
	}

	pub fn build_arc(self) -> Arc<AnnotationDescriptor> {
		Arc::new(self.build())
	}
}
