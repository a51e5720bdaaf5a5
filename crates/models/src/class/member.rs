use std::sync::Arc;

use bitflags::bitflags;

use crate::ModelsError;
use crate::annotations::{AnnotationTarget, AnnotationTargets, DescriptorSource, UsageSet};
use crate::source::MemberShape;

bitflags! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Modifiers: u16 {
		const STATIC = 1 << 0;
		const FINAL = 1 << 1;
		const TRANSIENT = 1 << 2;
		const ABSTRACT = 1 << 3;
		const SYNTHETIC = 1 << 4;
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
	Field,
	Method,
}

impl MemberKind {
	pub fn target(self) -> AnnotationTargets {
		match self {
			Self::Field => AnnotationTargets::FIELD,
			Self::Method => AnnotationTargets::METHOD,
		}
	}
}

/// A declared type with its generic arguments, e.g. `java.util.Set<com.acme.Tag>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
	pub name: Arc<str>,
	pub arguments: Vec<Arc<str>>,
}

impl TypeRef {
	pub fn new(name: &str) -> Self {
		Self {
			name: Arc::from(name),
			arguments: Vec::new(),
		}
	}

	pub fn generic(name: &str, arguments: &[&str]) -> Self {
		Self {
			name: Arc::from(name),
			arguments: arguments.iter().map(|a| Arc::from(*a)).collect(),
		}
	}

	pub fn is_void(&self) -> bool {
		&*self.name == "void"
	}

	/// The element type of a collection (last argument, so maps yield values).
	pub fn element_type(&self) -> Option<&str> {
		self.arguments.last().map(|a| &**a)
	}
}

/// A field or method of a [`super::ClassDetails`].
#[derive(Debug)]
pub struct MemberDetails {
	name: Arc<str>,
	kind: MemberKind,
	declaring_class: Arc<str>,
	type_ref: TypeRef,
	parameters: Vec<Arc<str>>,
	modifiers: Modifiers,
	persistable: bool,
	usages: UsageSet,
}

impl MemberDetails {
	pub(crate) fn from_shape(
		shape: &MemberShape,
		kind: MemberKind,
		declaring_class: &Arc<str>,
		descriptors: &dyn DescriptorSource,
	) -> Result<Self, ModelsError> {
		let location = describe(kind, &shape.name, declaring_class);
		let usages = UsageSet::build(&shape.annotations, descriptors, kind.target(), &location)?;
		let persistable = is_persistable(shape, kind);
		Ok(Self {
			name: Arc::from(shape.name.as_str()),
			kind,
			declaring_class: declaring_class.clone(),
			type_ref: shape.type_ref.clone(),
			parameters: shape.parameters.iter().map(|p| Arc::from(p.as_str())).collect(),
			modifiers: shape.modifiers,
			persistable,
			usages,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> MemberKind {
		self.kind
	}

	pub fn is_field(&self) -> bool {
		self.kind == MemberKind::Field
	}

	pub fn declaring_class(&self) -> &str {
		&self.declaring_class
	}

	/// Field type, or method return type.
	pub fn type_ref(&self) -> &TypeRef {
		&self.type_ref
	}

	pub fn type_name(&self) -> &str {
		&self.type_ref.name
	}

	pub fn parameters(&self) -> &[Arc<str>] {
		&self.parameters
	}

	pub fn modifiers(&self) -> Modifiers {
		self.modifiers
	}

	/// Whether the member can back a persistent attribute at all. Mapping
	/// annotations such as `@Transient` are a separate, later decision.
	pub fn is_persistable(&self) -> bool {
		self.persistable
	}

	/// The attribute name this member stands for: the field name, or the
	/// decapitalized property name of a getter.
	pub fn attribute_name(&self) -> Arc<str> {
		match self.kind {
			MemberKind::Field => self.name.clone(),
			MemberKind::Method => property_name(&self.name)
				.map(Arc::from)
				.unwrap_or_else(|| self.name.clone()),
		}
	}
}

impl AnnotationTarget for MemberDetails {
	fn local_usages(&self) -> &UsageSet {
		&self.usages
	}

	fn location(&self) -> String {
		describe(self.kind, &self.name, &self.declaring_class)
	}
}

fn describe(kind: MemberKind, name: &str, class: &str) -> String {
	match kind {
		MemberKind::Field => format!("field `{name}` of `{class}`"),
		MemberKind::Method => format!("method `{name}()` of `{class}`"),
	}
}

fn is_persistable(shape: &MemberShape, kind: MemberKind) -> bool {
	if shape.modifiers.intersects(Modifiers::STATIC | Modifiers::SYNTHETIC) {
		return false;
	}
	match kind {
		MemberKind::Field => !shape.modifiers.contains(Modifiers::TRANSIENT),
		MemberKind::Method => {
			shape.parameters.is_empty() && !shape.type_ref.is_void() && property_name(&shape.name).is_some()
		}
	}
}

/// `getTotal` → `total`, `isActive` → `active`.
pub(crate) fn property_name(method: &str) -> Option<String> {
	let rest = method
		.strip_prefix("get")
		.or_else(|| method.strip_prefix("is"))
		.filter(|r| r.chars().next().is_some_and(char::is_uppercase))?;
	let mut chars = rest.chars();
	let first = chars.next()?;
	Some(first.to_lowercase().chain(chars).collect())
}
