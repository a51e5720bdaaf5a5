//! Backend-independent class representation.

mod member;

use std::sync::Arc;

pub use member::{MemberDetails, MemberKind, Modifiers, TypeRef};

use crate::ModelsError;
use crate::annotations::{
	AnnotationDescriptor, AnnotationTarget, AnnotationTargets, AnnotationUsage, DescriptorSource, UsageSet, find_named,
};
use crate::source::ClassShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
	Class,
	Interface,
	Enum,
	Record,
	Annotation,
}

/// A class as seen by the metadata layer, independent of how it was discovered.
///
/// Built once per qualified name per registry; the superclass is resolved
/// through the same registry, so every instance in a chain is the shared one.
#[derive(Debug)]
pub struct ClassDetails {
	name: Arc<str>,
	kind: ClassKind,
	modifiers: Modifiers,
	superclass: Option<Arc<ClassDetails>>,
	interfaces: Vec<Arc<str>>,
	fields: Vec<Arc<MemberDetails>>,
	methods: Vec<Arc<MemberDetails>>,
	usages: UsageSet,
}

impl ClassDetails {
	pub(crate) fn from_shape(
		shape: &ClassShape,
		superclass: Option<Arc<ClassDetails>>,
		descriptors: &dyn DescriptorSource,
	) -> Result<Self, ModelsError> {
		let name: Arc<str> = Arc::from(shape.name.as_str());
		let usages = UsageSet::build(
			&shape.annotations,
			descriptors,
			AnnotationTargets::TYPE,
			&format!("class `{name}`"),
		)?;
		let fields = shape
			.fields
			.iter()
			.map(|f| MemberDetails::from_shape(f, MemberKind::Field, &name, descriptors).map(Arc::new))
			.collect::<Result<Vec<_>, _>>()?;
		let methods = shape
			.methods
			.iter()
			.map(|m| MemberDetails::from_shape(m, MemberKind::Method, &name, descriptors).map(Arc::new))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self {
			name,
			kind: shape.kind,
			modifiers: shape.modifiers,
			superclass,
			interfaces: shape.interfaces.iter().map(|i| Arc::from(i.as_str())).collect(),
			fields,
			methods,
			usages,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn name_arc(&self) -> &Arc<str> {
		&self.name
	}

	/// Name without package or enclosing-class prefix.
	pub fn simple_name(&self) -> &str {
		simple_name(&self.name)
	}

	pub fn kind(&self) -> ClassKind {
		self.kind
	}

	pub fn is_abstract(&self) -> bool {
		self.modifiers.contains(Modifiers::ABSTRACT)
	}

	pub fn superclass(&self) -> Option<&Arc<ClassDetails>> {
		self.superclass.as_ref()
	}

	pub fn superclass_name(&self) -> Option<&str> {
		self.superclass.as_deref().map(ClassDetails::name)
	}

	/// Superclasses from the direct parent upwards.
	pub fn ancestors(&self) -> impl Iterator<Item = &Arc<ClassDetails>> + '_ {
		std::iter::successors(self.superclass.as_ref(), |c| c.superclass.as_ref())
	}

	pub fn interfaces(&self) -> &[Arc<str>] {
		&self.interfaces
	}

	pub fn fields(&self) -> &[Arc<MemberDetails>] {
		&self.fields
	}

	pub fn methods(&self) -> &[Arc<MemberDetails>] {
		&self.methods
	}

	pub fn find_field(&self, name: &str) -> Option<&Arc<MemberDetails>> {
		self.fields.iter().find(|f| f.name() == name)
	}

	pub fn find_method(&self, name: &str) -> Option<&Arc<MemberDetails>> {
		self.methods.iter().find(|m| m.name() == name)
	}

	/// Finds the usage locally, then (for inherited shapes only) up the superclass chain.
	pub fn get_usage(&self, descriptor: &AnnotationDescriptor) -> Option<Arc<AnnotationUsage>> {
		if let Some(local) = self.usages.get(descriptor) {
			return Some(local.clone());
		}
		if descriptor.is_inherited() {
			return self.superclass.as_ref().and_then(|s| s.get_usage(descriptor));
		}
		None
	}

	/// Local repeated usages followed by inherited ones. Nothing is merged or
	/// deduplicated across levels.
	pub fn get_repeated_usages(&self, descriptor: &AnnotationDescriptor) -> Vec<Arc<AnnotationUsage>> {
		let mut out = self.usages.repeated(descriptor);
		if descriptor.is_inherited()
			&& let Some(superclass) = &self.superclass
		{
			out.extend(superclass.get_repeated_usages(descriptor));
		}
		out
	}

	/// First repeated usage (local first, then inherited) whose `attribute` equals `value`.
	pub fn get_named_usage(
		&self,
		descriptor: &AnnotationDescriptor,
		attribute: &str,
		value: &str,
	) -> Option<Arc<AnnotationUsage>> {
		find_named(self.get_repeated_usages(descriptor), attribute, value)
	}
}

impl AnnotationTarget for ClassDetails {
	fn local_usages(&self) -> &UsageSet {
		&self.usages
	}

	fn location(&self) -> String {
		format!("class `{}`", self.name)
	}
}

pub fn simple_name(qualified: &str) -> &str {
	qualified.rsplit(['.', '$']).next().unwrap_or(qualified)
}

#[cfg(test)]
mod tests;
