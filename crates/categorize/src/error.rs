use std::fmt;

use strata_models::ModelsError;
use thiserror::Error;

/// Attribute role that may appear at most once per hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingularRole {
	Version,
	TenantId,
}

impl fmt::Display for SingularRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Version => "version",
			Self::TenantId => "tenant-id",
		})
	}
}

#[derive(Debug, Clone, Error)]
pub enum CategorizeError {
	#[error(transparent)]
	Models(#[from] ModelsError),
	#[error(
		"hierarchy rooted at `{root}` declares more than one {role} attribute: `{existing}` and `{attribute}`"
	)]
	HierarchyConflict {
		role: SingularRole,
		attribute: String,
		existing: String,
		root: String,
	},
	#[error("hierarchy rooted at `{root}` declares no identifier attribute")]
	MissingId { root: String },
	#[error("hierarchy rooted at `{root}` has a conflicting identifier mapping: {detail}")]
	IdMappingConflict { root: String, detail: String },
	#[error("hierarchy rooted at `{root}` has a composite identifier ({attributes}) but no @IdClass")]
	IdClassRequired { root: String, attributes: String },
	#[error("class `{class}` is declared as both {first} and {second}")]
	ConflictingCategory {
		class: String,
		first: &'static str,
		second: &'static str,
	},
	#[error("entity name `{name}` is used by both `{first}` and `{second}`")]
	DuplicateEntityName { name: String, first: String, second: String },
	#[error("invalid value `{value}` for `{attribute}` on {location}")]
	InvalidValue {
		attribute: &'static str,
		value: String,
		location: String,
	},
}

impl CategorizeError {
	pub(crate) fn invalid(attribute: &'static str, value: &str, location: String) -> Self {
		Self::InvalidValue {
			attribute,
			value: value.to_owned(),
			location,
		}
	}
}
