use std::sync::Arc;

use super::AnnotationUsage;

/// A resolved annotation attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
	Bool(bool),
	Int(i64),
	Double(f64),
	String(Arc<str>),
	/// A class literal, by qualified name.
	Class(Arc<str>),
	Enum { type_name: Arc<str>, constant: Arc<str> },
	Annotation(Arc<AnnotationUsage>),
	Array(Vec<AttributeValue>),
}

impl AttributeValue {
	pub fn string(s: impl Into<Arc<str>>) -> Self {
		Self::String(s.into())
	}

	pub fn class(name: impl Into<Arc<str>>) -> Self {
		Self::Class(name.into())
	}

	pub fn enum_constant(type_name: impl Into<Arc<str>>, constant: impl Into<Arc<str>>) -> Self {
		Self::Enum {
			type_name: type_name.into(),
			constant: constant.into(),
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_class(&self) -> Option<&str> {
		match self {
			Self::Class(c) => Some(c),
			_ => None,
		}
	}

	/// Returns the enum constant name, ignoring the enum type.
	pub fn as_enum_constant(&self) -> Option<&str> {
		match self {
			Self::Enum { constant, .. } => Some(constant),
			_ => None,
		}
	}

	pub fn as_annotation(&self) -> Option<&Arc<AnnotationUsage>> {
		match self {
			Self::Annotation(usage) => Some(usage),
			_ => None,
		}
	}

	/// Views the value as a list. A single value stands in for a one-element
	/// array, matching how array-typed attributes may be written.
	pub fn elements(&self) -> &[AttributeValue] {
		match self {
			Self::Array(items) => items,
			other => std::slice::from_ref(other),
		}
	}

	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Bool(_) => "bool",
			Self::Int(_) => "int",
			Self::Double(_) => "double",
			Self::String(_) => "string",
			Self::Class(_) => "class",
			Self::Enum { .. } => "enum",
			Self::Annotation(_) => "annotation",
			Self::Array(_) => "array",
		}
	}
}
