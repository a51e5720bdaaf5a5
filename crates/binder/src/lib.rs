//! Binding of categorized entity hierarchies into a relational model.
//!
//! # Mental Model
//!
//! [`BindingCoordinator::coordinate`] takes a
//! [`strata_categorize::CategorizedDomainModel`] and produces a [`BoundModel`]:
//! tables, columns, keys, and one value binding per persistent attribute.
//! Anything that needs a peer bound first is deferred to a
//! [`second_pass::SecondPassQueue`] and resolved by fixed-point iteration.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`BindingCoordinator`] | Runs global lookups, hierarchy walks, deferred work and closing passes. |
//! | [`BindingEnvironment`] | [`BootstrapSettings`] plus the naming-strategy pair. |
//! | [`BoundModel`] | The bound relational graph. |
//! | [`SchemaSink`] | Downstream consumer of the bound model. |
//! | [`second_pass::SecondPassQueue`] | Retryable work items processed to a fixed point. |

mod binders;
mod coordinator;
mod env;
mod error;
mod globals;
pub mod model;
pub mod naming;
pub mod relational;
pub mod second_pass;
mod settings;

pub use coordinator::{BindingCoordinator, SchemaSink};
pub use env::BindingEnvironment;
pub use error::BindingError;
pub use model::{AttributeBinding, BoundModel, CollectionBinding, EntityBinding, EntityVariant, ValueBinding};
pub use naming::{Identifier, ImplicitNamingStrategy, PhysicalNamingStrategy};
pub use relational::{Column, Table, TableId, TableReference};
pub use second_pass::{ConvergenceFailure, ConvergenceReport};
pub use settings::{BootstrapSettings, ImplicitNaming, PhysicalNaming, SettingsError};

#[cfg(test)]
pub(crate) mod test_fixtures;
