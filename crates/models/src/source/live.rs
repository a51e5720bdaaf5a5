//! Live backend: introspects classes a collaborator has already loaded.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{AnnotationShape, ClassShape, ClassSource, MemberShape};
use crate::ModelsError;
use crate::class::{ClassKind, Modifiers};

/// A loaded class reference. Implementations expose declared (not inherited)
/// members and annotations only.
pub trait LoadedClass: Send + Sync {
	fn name(&self) -> &str;
	fn kind(&self) -> ClassKind;
	fn modifiers(&self) -> Modifiers;
	/// `None` for roots; the universal base class is never reported.
	fn superclass_name(&self) -> Option<&str>;
	fn interface_names(&self) -> &[String];
	fn declared_fields(&self) -> &[MemberShape];
	fn declared_methods(&self) -> &[MemberShape];
	fn declared_annotations(&self) -> &[AnnotationShape];
}

/// Loads classes by qualified name.
pub trait ClassLoading: Send + Sync {
	fn load_class(&self, name: &str) -> Option<Arc<dyn LoadedClass>>;
}

/// [`ClassLoading`] over a fixed set of classes.
#[derive(Default, Clone)]
pub struct InMemoryClassLoader {
	classes: FxHashMap<Box<str>, Arc<dyn LoadedClass>>,
}

impl InMemoryClassLoader {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, class: impl LoadedClass + 'static) -> &mut Self {
		self.classes.insert(Box::from(class.name()), Arc::new(class));
		self
	}

	pub fn with(mut self, class: impl LoadedClass + 'static) -> Self {
		self.add(class);
		self
	}

	pub fn len(&self) -> usize {
		self.classes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.is_empty()
	}
}

impl ClassLoading for InMemoryClassLoader {
	fn load_class(&self, name: &str) -> Option<Arc<dyn LoadedClass>> {
		self.classes.get(name).cloned()
	}
}

/// A class defined in memory, for collaborators that build classes rather
/// than load them.
#[derive(Debug, Clone)]
pub struct DefinedClass {
	name: String,
	kind: ClassKind,
	modifiers: Modifiers,
	superclass: Option<String>,
	interfaces: Vec<String>,
	fields: Vec<MemberShape>,
	methods: Vec<MemberShape>,
	annotations: Vec<AnnotationShape>,
}

impl DefinedClass {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_string(),
			kind: ClassKind::Class,
			modifiers: Modifiers::empty(),
			superclass: None,
			interfaces: Vec::new(),
			fields: Vec::new(),
			methods: Vec::new(),
			annotations: Vec::new(),
		}
	}

	pub fn kind(mut self, kind: ClassKind) -> Self {
		self.kind = kind;
		self
	}

	pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
		self.modifiers = modifiers;
		self
	}

	pub fn extends(mut self, superclass: &str) -> Self {
		self.superclass = Some(superclass.to_string());
		self
	}

	pub fn implements(mut self, interface: &str) -> Self {
		self.interfaces.push(interface.to_string());
		self
	}

	pub fn field(mut self, field: MemberShape) -> Self {
		self.fields.push(field);
		self
	}

	pub fn method(mut self, method: MemberShape) -> Self {
		self.methods.push(method);
		self
	}

	pub fn annotated(mut self, annotation: AnnotationShape) -> Self {
		self.annotations.push(annotation);
		self
	}
}

impl LoadedClass for DefinedClass {
	fn name(&self) -> &str {
		&self.name
	}

	fn kind(&self) -> ClassKind {
		self.kind
	}

	fn modifiers(&self) -> Modifiers {
		self.modifiers
	}

	fn superclass_name(&self) -> Option<&str> {
		self.superclass.as_deref()
	}

	fn interface_names(&self) -> &[String] {
		&self.interfaces
	}

	fn declared_fields(&self) -> &[MemberShape] {
		&self.fields
	}

	fn declared_methods(&self) -> &[MemberShape] {
		&self.methods
	}

	fn declared_annotations(&self) -> &[AnnotationShape] {
		&self.annotations
	}
}

/// [`ClassSource`] that loads lazily through a [`ClassLoading`] collaborator.
pub struct LiveSource {
	loader: Arc<dyn ClassLoading>,
}

impl LiveSource {
	pub fn new(loader: Arc<dyn ClassLoading>) -> Self {
		Self { loader }
	}
}

impl ClassSource for LiveSource {
	fn label(&self) -> &'static str {
		"live"
	}

	fn find(&self, name: &str) -> Result<Option<ClassShape>, ModelsError> {
		let Some(class) = self.loader.load_class(name) else {
			return Ok(None);
		};
		Ok(Some(ClassShape {
			name: class.name().to_string(),
			kind: class.kind(),
			modifiers: class.modifiers(),
			superclass: class.superclass_name().map(str::to_string),
			interfaces: class.interface_names().to_vec(),
			fields: class.declared_fields().to_vec(),
			methods: class.declared_methods().to_vec(),
			annotations: class.declared_annotations().to_vec(),
		}))
	}
}
