//! Serializable records for a precomputed class index.
//!
//! An index is produced offline from compiled classes and shipped as a postcard
//! blob. It describes the same shape a live class loader would expose (members,
//! supertypes, declared annotation values) without requiring the classes to be
//! loadable. Only explicitly declared annotation values are recorded.

pub mod annotation;
pub mod class;

#[cfg(feature = "compile")]
pub mod compile;

pub use annotation::{AnnotationSpec, AnnotationValueSpec, ValueSpec};
pub use class::{ClassIndexSpec, ClassKindSpec, ClassSpec, MemberKindSpec, MemberSpec, TypeSpec, flags};
