//! Static-index backend: derives class shapes from a precomputed index, so the
//! classes never need to be loadable.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use strata_index_spec::{
	AnnotationSpec, ClassIndexSpec, ClassKindSpec, ClassSpec, MemberKindSpec, MemberSpec, ValueSpec, flags,
};

use super::{AnnotationShape, ClassShape, ClassSource, MemberShape, ValueShape};
use crate::ModelsError;
use crate::class::{ClassKind, Modifiers, TypeRef};

/// A decoded class index keyed by qualified name.
#[derive(Debug, Default, Clone)]
pub struct ClassIndex {
	entries: FxHashMap<Box<str>, ClassSpec>,
}

impl ClassIndex {
	/// Decodes a postcard blob produced by `strata_index_spec::compile::encode`.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelsError> {
		let spec: ClassIndexSpec = postcard::from_bytes(bytes).map_err(|e| ModelsError::Index(e.to_string()))?;
		Ok(Self::from_spec(spec))
	}

	pub fn from_spec(spec: ClassIndexSpec) -> Self {
		let entries = spec
			.classes
			.into_iter()
			.map(|class| (Box::from(class.name.as_str()), class))
			.collect();
		Self { entries }
	}

	pub fn get(&self, name: &str) -> Option<&ClassSpec> {
		self.entries.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Indexed class names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.entries.keys().map(|k| &**k).collect();
		names.sort_unstable();
		names
	}
}

pub struct IndexedSource {
	index: Arc<ClassIndex>,
}

impl IndexedSource {
	pub fn new(index: Arc<ClassIndex>) -> Self {
		Self { index }
	}
}

impl ClassSource for IndexedSource {
	fn label(&self) -> &'static str {
		"index"
	}

	fn find(&self, name: &str) -> Result<Option<ClassShape>, ModelsError> {
		Ok(self.index.get(name).map(lower_class))
	}
}

fn lower_class(spec: &ClassSpec) -> ClassShape {
	let (fields, methods): (Vec<&MemberSpec>, Vec<&MemberSpec>) =
		spec.members.iter().partition(|m| m.kind == MemberKindSpec::Field);
	ClassShape {
		name: spec.name.clone(),
		kind: lower_kind(spec.kind),
		modifiers: lower_flags(spec.flags),
		superclass: spec.superclass.clone(),
		interfaces: spec.interfaces.clone(),
		fields: fields.into_iter().map(lower_member).collect(),
		methods: methods.into_iter().map(lower_member).collect(),
		annotations: spec.annotations.iter().map(lower_annotation).collect(),
	}
}

fn lower_kind(kind: ClassKindSpec) -> ClassKind {
	match kind {
		ClassKindSpec::Class => ClassKind::Class,
		ClassKindSpec::Interface => ClassKind::Interface,
		ClassKindSpec::Enum => ClassKind::Enum,
		ClassKindSpec::Record => ClassKind::Record,
		ClassKindSpec::Annotation => ClassKind::Annotation,
	}
}

fn lower_flags(bits: u16) -> Modifiers {
	let mut modifiers = Modifiers::empty();
	for (flag, modifier) in [
		(flags::STATIC, Modifiers::STATIC),
		(flags::FINAL, Modifiers::FINAL),
		(flags::TRANSIENT, Modifiers::TRANSIENT),
		(flags::ABSTRACT, Modifiers::ABSTRACT),
		(flags::SYNTHETIC, Modifiers::SYNTHETIC),
	] {
		if bits & flag != 0 {
			modifiers |= modifier;
		}
	}
	modifiers
}

fn lower_member(spec: &MemberSpec) -> MemberShape {
	MemberShape {
		name: spec.name.clone(),
		type_ref: TypeRef {
			name: Arc::from(spec.type_ref.name.as_str()),
			arguments: spec.type_ref.arguments.iter().map(|a| Arc::from(a.as_str())).collect(),
		},
		parameters: spec.parameters.clone(),
		modifiers: lower_flags(spec.flags),
		annotations: spec.annotations.iter().map(lower_annotation).collect(),
	}
}

fn lower_annotation(spec: &AnnotationSpec) -> AnnotationShape {
	AnnotationShape {
		type_name: spec.type_name.clone(),
		values: spec
			.values
			.iter()
			.map(|v| (v.name.clone(), lower_value(&v.value)))
			.collect(),
	}
}

fn lower_value(spec: &ValueSpec) -> ValueShape {
	match spec {
		ValueSpec::Bool(b) => ValueShape::Bool(*b),
		ValueSpec::Int(i) => ValueShape::Int(*i),
		ValueSpec::Double(d) => ValueShape::Double(*d),
		ValueSpec::String(s) => ValueShape::String(s.clone()),
		ValueSpec::Class(c) => ValueShape::Class(c.clone()),
		ValueSpec::Enum { type_name, constant } => ValueShape::Enum {
			type_name: type_name.clone(),
			constant: constant.clone(),
		},
		ValueSpec::Nested(nested) => ValueShape::Annotation(lower_annotation(nested)),
		ValueSpec::Array(items) => ValueShape::Array(items.iter().map(lower_value).collect()),
	}
}
