//! Class and annotation metadata, independent of how classes were discovered.
//!
//! # Mental Model
//!
//! 1. **Discovery:** a [`source::ClassSource`] (live loader or precomputed
//!    [`source::ClassIndex`]) describes a class as a [`source::ClassShape`].
//! 2. **Building:** [`MetadataRegistry::resolve`] lowers the shape into a shared
//!    [`ClassDetails`], resolving every annotation occurrence into an
//!    [`annotations::AnnotationUsage`] bound to its [`annotations::AnnotationDescriptor`].
//! 3. **Publication:** [`MetadataRegistry::snapshot`] seals the registry; later
//!    stages read through [`ClassDetailsLookup`].
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`MetadataRegistry`] | Memoized name → [`ClassDetails`] resolution, reverse subclass index. |
//! | [`MetadataSnapshot`] | Sealed, read-only registry view. |
//! | [`ClassDetails`] / [`MemberDetails`] | Backend-independent class and member records. |
//! | [`annotations::AnnotationDescriptor`] | Shared per-shape metadata. |
//! | [`annotations::AnnotationUsage`] | Per-occurrence resolved attribute map. |

pub mod annotations;
pub mod class;
mod error;
pub mod registry;
pub mod source;

pub use class::{ClassDetails, ClassKind, MemberDetails, MemberKind, Modifiers, TypeRef, simple_name};
pub use error::ModelsError;
pub use registry::{ClassDetailsLookup, MetadataRegistry, MetadataSnapshot, RegistryBackend};

#[cfg(test)]
pub(crate) mod test_fixtures;
