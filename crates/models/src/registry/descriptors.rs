use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ModelsError;
use crate::annotations::catalog::{lenient_descriptor, register_shape, shared_descriptor};
use crate::annotations::{AnnotationDescriptor, DescriptorSource};

/// One registry's gate onto the process-wide descriptor table. Once sealed it
/// serves existing shapes only.
#[derive(Default)]
pub(crate) struct DescriptorRegistry {
	sealed: AtomicBool,
}

impl DescriptorRegistry {
	pub(crate) fn get(&self, name: &str) -> Result<Arc<AnnotationDescriptor>, ModelsError> {
		if let Some(found) = shared_descriptor(name) {
			return Ok(found);
		}
		if self.sealed.load(Ordering::Acquire) {
			return Err(ModelsError::immutable("create descriptor", name));
		}
		Ok(lenient_descriptor(name))
	}

	pub(crate) fn register(&self, descriptor: AnnotationDescriptor) -> Result<Arc<AnnotationDescriptor>, ModelsError> {
		if self.sealed.load(Ordering::Acquire) {
			return Err(ModelsError::immutable("register descriptor", descriptor.name()));
		}
		register_shape(descriptor)
	}

	pub(crate) fn seal(&self) {
		self.sealed.store(true, Ordering::Release);
	}
}

impl DescriptorSource for DescriptorRegistry {
	fn descriptor(&self, name: &str) -> Result<Arc<AnnotationDescriptor>, ModelsError> {
		self.get(name)
	}
}
