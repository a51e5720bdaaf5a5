//! Hierarchy-aware categorization of annotated classes.
//!
//! # Mental Model
//!
//! The input is a flat list of class names. [`Categorizer`] resolves them
//! through a [`strata_models::ClassDetailsLookup`] and produces a
//! [`CategorizedDomainModel`]:
//!
//! - one [`EntityHierarchy`] per root entity, with its identifier mapping,
//!   version, tenant-id and natural-id attributes already classified;
//! - every [`ManagedType`] (entity, mapped superclass, embeddable);
//! - the [`GlobalRegistrations`] declared anywhere in the input.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Categorizer`] | Runs categorization against a lookup. |
//! | [`EntityHierarchy`] | Root, member types, id mapping, version/tenant-id, cache region. |
//! | [`IdMapping`] | Basic, aggregated or non-aggregated identifier. |
//! | [`ManagedType`] | Closed entity / mapped-superclass / embeddable sum. |

mod cache;
mod categorizer;
mod error;
pub mod hierarchy;
pub mod managed;
pub mod registrations;

pub use cache::{CacheRegion, SharedCacheMode};
pub use categorizer::{CategorizedDomainModel, Categorizer};
pub use error::{CategorizeError, SingularRole};
pub use hierarchy::{EntityHierarchy, IdMapping, InheritanceStrategy, NaturalIdMapping};
pub use managed::{AccessType, AttributeContainer, AttributeMetadata, AttributeNature, Category, ManagedType};
pub use registrations::GlobalRegistrations;

#[cfg(test)]
pub(crate) mod test_fixtures;
