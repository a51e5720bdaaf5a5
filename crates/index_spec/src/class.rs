use serde::{Deserialize, Serialize};

use crate::AnnotationSpec;

/// Modifier bits stored in [`ClassSpec::flags`] and [`MemberSpec::flags`].
pub mod flags {
	pub const STATIC: u16 = 1 << 0;
	pub const FINAL: u16 = 1 << 1;
	pub const TRANSIENT: u16 = 1 << 2;
	pub const ABSTRACT: u16 = 1 << 3;
	pub const SYNTHETIC: u16 = 1 << 4;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKindSpec {
	Class,
	Interface,
	Enum,
	Record,
	Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKindSpec {
	Field,
	Method,
}

/// A (possibly parameterized) type reference, e.g. `java.util.List<com.acme.Line>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
	pub name: String,
	#[serde(default)]
	pub arguments: Vec<String>,
}

impl TypeSpec {
	pub fn simple(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			arguments: Vec::new(),
		}
	}
}

/// One field or method. Fields and methods share a single list in the index;
/// `kind` tells them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSpec {
	pub kind: MemberKindSpec,
	pub name: String,
	/// Field type, or method return type (`void` for none).
	pub type_ref: TypeSpec,
	#[serde(default)]
	pub parameters: Vec<String>,
	#[serde(default)]
	pub flags: u16,
	#[serde(default)]
	pub annotations: Vec<AnnotationSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSpec {
	pub name: String,
	pub kind: ClassKindSpec,
	#[serde(default)]
	pub flags: u16,
	pub superclass: Option<String>,
	#[serde(default)]
	pub interfaces: Vec<String>,
	#[serde(default)]
	pub members: Vec<MemberSpec>,
	#[serde(default)]
	pub annotations: Vec<AnnotationSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassIndexSpec {
	pub classes: Vec<ClassSpec>,
}
