//! Annotation shapes and occurrences.
//!
//! # Mental Model
//!
//! - [`AnnotationDescriptor`]: one immutable record per annotation shape
//!   (allowed targets, inherited flag, repeatable container, attribute defaults).
//! - [`AnnotationUsage`]: one occurrence, its attribute map resolved once at
//!   construction. A usage only carries what was written; defaults are a
//!   caller-side second step ([`attribute_or_default`]).
//! - [`UsageSet`]: the usages declared directly on one target. Inheritance
//!   walks live on [`crate::ClassDetails`].

pub mod catalog;
mod descriptor;
mod target;
mod usage;
mod value;

pub use catalog::{BuiltinDescriptors, builtins, names};
pub use descriptor::{AnnotationDescriptor, AnnotationTargets, AttributeDescriptor, DescriptorBuilder};
pub use target::{AnnotationTarget, UsageSet};
pub(crate) use target::find_named;
pub use usage::{
	AnnotationUsage, DescriptorSource, attribute_or_default, bool_or_default, enum_or_default, int_or_default,
	string_or_default,
};
pub use value::AttributeValue;

#[cfg(test)]
mod tests;
