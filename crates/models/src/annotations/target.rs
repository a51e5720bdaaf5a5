use std::sync::Arc;

use super::{AnnotationDescriptor, AnnotationTargets, AnnotationUsage, AttributeValue, DescriptorSource};
use crate::ModelsError;
use crate::source::AnnotationShape;

/// Usages declared directly on one annotation target, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageSet {
	usages: Vec<Arc<AnnotationUsage>>,
}

impl UsageSet {
	/// Resolves raw occurrences, rejecting any whose descriptor does not allow `target`.
	pub(crate) fn build(
		shapes: &[AnnotationShape],
		descriptors: &dyn DescriptorSource,
		target: AnnotationTargets,
		location: &str,
	) -> Result<Self, ModelsError> {
		let mut usages = Vec::with_capacity(shapes.len());
		for shape in shapes {
			let usage = AnnotationUsage::from_shape(shape, descriptors, location)?;
			let descriptor = usage.descriptor();
			if !descriptor.allows(target) {
				return Err(ModelsError::AnnotationPlacement {
					annotation: descriptor.name().to_string(),
					location: location.to_string(),
					allowed: descriptor.targets(),
				});
			}
			usages.push(Arc::new(usage));
		}
		Ok(Self { usages })
	}

	pub fn from_usages(usages: Vec<Arc<AnnotationUsage>>) -> Self {
		Self { usages }
	}

	pub fn iter(&self) -> impl Iterator<Item = &Arc<AnnotationUsage>> + '_ {
		self.usages.iter()
	}

	pub fn len(&self) -> usize {
		self.usages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.usages.is_empty()
	}

	/// First usage of `descriptor`.
	pub fn get(&self, descriptor: &AnnotationDescriptor) -> Option<&Arc<AnnotationUsage>> {
		self.usages.iter().find(|u| u.is(descriptor))
	}

	pub fn has(&self, descriptor: &AnnotationDescriptor) -> bool {
		self.get(descriptor).is_some()
	}

	/// All usages of a repeatable shape, whether declared individually or
	/// grouped inside its container, in declaration order.
	pub fn repeated(&self, descriptor: &AnnotationDescriptor) -> Vec<Arc<AnnotationUsage>> {
		let container = descriptor.repeatable_container();
		let mut out = Vec::new();
		for usage in &self.usages {
			if usage.is(descriptor) {
				out.push(usage.clone());
			} else if let Some(container) = container
				&& usage.is(container)
				&& let Some(value) = usage.get("value")
			{
				out.extend(
					value
						.elements()
						.iter()
						.filter_map(AttributeValue::as_annotation)
						.filter(|nested| nested.is(descriptor))
						.cloned(),
				);
			}
		}
		out
	}

	/// First repeated usage whose `attribute` equals `value`.
	pub fn named(&self, descriptor: &AnnotationDescriptor, attribute: &str, value: &str) -> Option<Arc<AnnotationUsage>> {
		find_named(self.repeated(descriptor), attribute, value)
	}
}

pub(crate) fn find_named(
	usages: Vec<Arc<AnnotationUsage>>,
	attribute: &str,
	value: &str,
) -> Option<Arc<AnnotationUsage>> {
	usages.into_iter().find(|u| u.string(attribute) == Some(value))
}

/// Anything annotations can be declared on.
pub trait AnnotationTarget {
	/// Usages declared directly on this target.
	fn local_usages(&self) -> &UsageSet;

	/// Describes the target for diagnostics, e.g. "field `id` of `com.acme.Order`".
	fn location(&self) -> String;

	fn has_usage(&self, descriptor: &AnnotationDescriptor) -> bool {
		self.local_usages().has(descriptor)
	}
}
