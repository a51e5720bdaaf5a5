use std::sync::Arc;

use indexmap::IndexMap;

use super::{AnnotationDescriptor, AttributeValue};
use crate::ModelsError;
use crate::source::{AnnotationShape, ValueShape};

/// Resolves annotation names to their shared descriptors.
pub trait DescriptorSource {
	fn descriptor(&self, name: &str) -> Result<Arc<AnnotationDescriptor>, ModelsError>;
}

/// One annotation occurrence with its attribute map resolved at construction.
///
/// Only explicitly declared attributes are present. Defaults live on the
/// descriptor; see [`attribute_or_default`].
#[derive(Debug, Clone)]
pub struct AnnotationUsage {
	descriptor: Arc<AnnotationDescriptor>,
	attributes: IndexMap<Arc<str>, AttributeValue>,
}

impl AnnotationUsage {
	pub fn new(descriptor: Arc<AnnotationDescriptor>, attributes: IndexMap<Arc<str>, AttributeValue>) -> Self {
		Self { descriptor, attributes }
	}

	/// Resolves a raw occurrence against its descriptor.
	pub(crate) fn from_shape(
		shape: &AnnotationShape,
		descriptors: &dyn DescriptorSource,
		location: &str,
	) -> Result<Self, ModelsError> {
		let descriptor = descriptors.descriptor(&shape.type_name)?;
		let mut attributes = IndexMap::with_capacity(shape.values.len());
		for (name, raw) in &shape.values {
			if !descriptor.declares(name) {
				return Err(ModelsError::UnknownAnnotationAttribute {
					annotation: shape.type_name.clone(),
					attribute: name.clone(),
					location: location.to_string(),
				});
			}
			let value = resolve_value(raw, descriptors, location)?;
			attributes.insert(Arc::from(name.as_str()), value);
		}
		Ok(Self { descriptor, attributes })
	}

	pub fn descriptor(&self) -> &Arc<AnnotationDescriptor> {
		&self.descriptor
	}

	pub fn name(&self) -> &str {
		self.descriptor.name()
	}

	pub fn is(&self, descriptor: &AnnotationDescriptor) -> bool {
		*self.descriptor == *descriptor
	}

	/// Returns the explicitly declared value. Never falls back to the default.
	pub fn get(&self, name: &str) -> Option<&AttributeValue> {
		self.attributes.get(name)
	}

	pub fn attributes(&self) -> &IndexMap<Arc<str>, AttributeValue> {
		&self.attributes
	}

	pub fn string(&self, name: &str) -> Option<&str> {
		self.get(name).and_then(AttributeValue::as_str)
	}

	pub fn bool(&self, name: &str) -> Option<bool> {
		self.get(name).and_then(AttributeValue::as_bool)
	}

	pub fn int(&self, name: &str) -> Option<i64> {
		self.get(name).and_then(AttributeValue::as_int)
	}

	pub fn class_name(&self, name: &str) -> Option<&str> {
		self.get(name).and_then(AttributeValue::as_class)
	}

	pub fn enum_constant(&self, name: &str) -> Option<&str> {
		self.get(name).and_then(AttributeValue::as_enum_constant)
	}

	/// Nested usages held by `name`, whether written as one value or an array.
	pub fn nested(&self, name: &str) -> Vec<&Arc<AnnotationUsage>> {
		self.get(name)
			.map(|v| v.elements().iter().filter_map(AttributeValue::as_annotation).collect())
			.unwrap_or_default()
	}
}

impl PartialEq for AnnotationUsage {
	fn eq(&self, other: &Self) -> bool {
		self.descriptor == other.descriptor && self.attributes == other.attributes
	}
}

/// Two-step lookup: the usage's explicit value, then the descriptor default.
pub fn attribute_or_default<'a>(usage: &'a AnnotationUsage, name: &str) -> Option<&'a AttributeValue> {
	usage.get(name).or_else(|| usage.descriptor().default_value(name))
}

/// [`attribute_or_default`] narrowed to strings; empty strings count as unset.
pub fn string_or_default<'a>(usage: &'a AnnotationUsage, name: &str) -> Option<&'a str> {
	attribute_or_default(usage, name)
		.and_then(AttributeValue::as_str)
		.filter(|s| !s.is_empty())
}

pub fn bool_or_default(usage: &AnnotationUsage, name: &str) -> Option<bool> {
	attribute_or_default(usage, name).and_then(AttributeValue::as_bool)
}

pub fn int_or_default(usage: &AnnotationUsage, name: &str) -> Option<i64> {
	attribute_or_default(usage, name).and_then(AttributeValue::as_int)
}

pub fn enum_or_default<'a>(usage: &'a AnnotationUsage, name: &str) -> Option<&'a str> {
	attribute_or_default(usage, name).and_then(AttributeValue::as_enum_constant)
}

fn resolve_value(
	raw: &ValueShape,
	descriptors: &dyn DescriptorSource,
	location: &str,
) -> Result<AttributeValue, ModelsError> {
	Ok(match raw {
		ValueShape::Bool(b) => AttributeValue::Bool(*b),
		ValueShape::Int(i) => AttributeValue::Int(*i),
		ValueShape::Double(d) => AttributeValue::Double(*d),
		ValueShape::String(s) => AttributeValue::string(s.as_str()),
		ValueShape::Class(c) => AttributeValue::class(c.as_str()),
		ValueShape::Enum { type_name, constant } => AttributeValue::enum_constant(type_name.as_str(), constant.as_str()),
		ValueShape::Annotation(nested) => {
			AttributeValue::Annotation(Arc::new(AnnotationUsage::from_shape(nested, descriptors, location)?))
		}
		ValueShape::Array(items) => AttributeValue::Array(
			items
				.iter()
				.map(|item| resolve_value(item, descriptors, location))
				.collect::<Result<_, _>>()?,
		),
	})
}
