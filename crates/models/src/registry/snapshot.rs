use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::subclasses::SubclassIndex;
use super::ClassDetailsLookup;
use crate::annotations::catalog::shared_descriptor;
use crate::annotations::{AnnotationDescriptor, DescriptorSource};
use crate::{ClassDetails, ModelsError};

/// Read-only view of a sealed registry. Shares every instance the registry
/// built; anything not built before sealing is unreachable.
pub struct MetadataSnapshot {
	classes: Arc<FxHashMap<Box<str>, Arc<ClassDetails>>>,
	subclasses: Arc<SubclassIndex>,
}

impl MetadataSnapshot {
	pub(super) fn new(classes: Arc<FxHashMap<Box<str>, Arc<ClassDetails>>>, subclasses: Arc<SubclassIndex>) -> Self {
		Self { classes, subclasses }
	}

	pub fn len(&self) -> usize {
		self.classes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.is_empty()
	}

	/// Built class names, sorted.
	pub fn class_names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.classes.keys().map(|k| &**k).collect();
		names.sort_unstable();
		names
	}

	/// Always fails: snapshots accept no new shapes.
	pub fn register_descriptor(&self, descriptor: AnnotationDescriptor) -> Result<Arc<AnnotationDescriptor>, ModelsError> {
		Err(ModelsError::immutable("register descriptor", descriptor.name()))
	}
}

impl DescriptorSource for MetadataSnapshot {
	fn descriptor(&self, name: &str) -> Result<Arc<AnnotationDescriptor>, ModelsError> {
		shared_descriptor(name).ok_or_else(|| ModelsError::immutable("create descriptor", name))
	}
}

impl ClassDetailsLookup for MetadataSnapshot {
	/// Returns the shared instance, or `ImmutableRegistry` for anything that
	/// would have to be built.
	fn resolve(&self, name: &str) -> Result<Arc<ClassDetails>, ModelsError> {
		self.classes
			.get(name)
			.cloned()
			.ok_or_else(|| ModelsError::immutable("build", name))
	}

	fn direct_subclasses(&self, name: &str) -> Vec<Arc<str>> {
		self.subclasses.direct(name)
	}
}
