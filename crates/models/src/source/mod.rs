//! Discovery backends and the class shape they lower into.
//!
//! # Role
//!
//! A backend answers "what does class `name` look like" and nothing more.
//! Both backends lower into [`ClassShape`]; [`crate::ClassDetails`] is built
//! from the shape by a single code path, which is what keeps the live and
//! static-index views of the same class equal.

mod indexed;
mod live;

pub use indexed::{ClassIndex, IndexedSource};
pub use live::{ClassLoading, DefinedClass, InMemoryClassLoader, LiveSource, LoadedClass};

use crate::ModelsError;
use crate::class::{ClassKind, Modifiers, TypeRef};

/// A discovery backend.
pub trait ClassSource: Send + Sync {
	/// Short name for diagnostics ("live", "index").
	fn label(&self) -> &'static str;

	/// Returns `Ok(None)` when this backend has no entry for `name`.
	fn find(&self, name: &str) -> Result<Option<ClassShape>, ModelsError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassShape {
	pub name: String,
	pub kind: ClassKind,
	pub modifiers: Modifiers,
	pub superclass: Option<String>,
	pub interfaces: Vec<String>,
	pub fields: Vec<MemberShape>,
	pub methods: Vec<MemberShape>,
	pub annotations: Vec<AnnotationShape>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberShape {
	pub name: String,
	pub type_ref: TypeRef,
	pub parameters: Vec<String>,
	pub modifiers: Modifiers,
	pub annotations: Vec<AnnotationShape>,
}

impl MemberShape {
	pub fn field(name: &str, type_ref: TypeRef) -> Self {
		Self {
			name: name.to_string(),
			type_ref,
			parameters: Vec::new(),
			modifiers: Modifiers::empty(),
			annotations: Vec::new(),
		}
	}

	/// A parameterless method returning `type_ref`.
	pub fn method(name: &str, type_ref: TypeRef) -> Self {
		Self::field(name, type_ref)
	}

	pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
		self.modifiers = modifiers;
		self
	}

	pub fn with_parameters(mut self, parameters: &[&str]) -> Self {
		self.parameters = parameters.iter().map(|p| p.to_string()).collect();
		self
	}

	pub fn annotated(mut self, annotation: AnnotationShape) -> Self {
		self.annotations.push(annotation);
		self
	}
}

/// One annotation occurrence with its explicitly written values.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationShape {
	pub type_name: String,
	pub values: Vec<(String, ValueShape)>,
}

impl AnnotationShape {
	pub fn new(type_name: &str) -> Self {
		Self {
			type_name: type_name.to_string(),
			values: Vec::new(),
		}
	}

	pub fn with(mut self, name: &str, value: ValueShape) -> Self {
		self.values.push((name.to_string(), value));
		self
	}

	pub fn with_str(self, name: &str, value: &str) -> Self {
		self.with(name, ValueShape::String(value.to_string()))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueShape {
	Bool(bool),
	Int(i64),
	Double(f64),
	String(String),
	Class(String),
	Enum { type_name: String, constant: String },
	Annotation(AnnotationShape),
	Array(Vec<ValueShape>),
}

impl ValueShape {
	pub fn enum_constant(type_name: &str, constant: &str) -> Self {
		Self::Enum {
			type_name: type_name.to_string(),
			constant: constant.to_string(),
		}
	}

	pub fn class(name: &str) -> Self {
		Self::Class(name.to_string())
	}
}
