use crate::annotations::AnnotationTargets;

/// Errors raised while building or reading class metadata.
///
/// None of these are retried: they describe malformed input rather than
/// transient contention.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelsError {
	/// The name resolves under neither the static index nor the live loader.
	#[error("unknown class '{name}'")]
	UnknownClass { name: String },

	/// An annotation was declared on a member kind its descriptor does not allow.
	#[error("annotation '{annotation}' is not applicable to {location} (allowed targets: {allowed:?})")]
	AnnotationPlacement {
		annotation: String,
		location: String,
		allowed: AnnotationTargets,
	},

	/// A usage names an attribute its descriptor does not declare.
	#[error("annotation '{annotation}' has no attribute '{attribute}' (declared on {location})")]
	UnknownAnnotationAttribute {
		annotation: String,
		attribute: String,
		location: String,
	},

	/// A custom descriptor was registered under a name that already has one.
	#[error("annotation descriptor '{name}' is already registered")]
	DuplicateDescriptor { name: String },

	/// The class extends itself, directly or through its supertypes.
	#[error("cyclic superclass chain: {}", chain.join(" -> "))]
	CyclicHierarchy { chain: Vec<String> },

	/// A mutation was attempted after the registry was snapshotted.
	#[error("registry is read-only after snapshot; cannot {operation} '{name}'")]
	ImmutableRegistry { operation: &'static str, name: String },

	/// The static index blob could not be decoded.
	#[error("malformed class index: {0}")]
	Index(String),
}

impl ModelsError {
	pub(crate) fn unknown_class(name: &str) -> Self {
		Self::UnknownClass { name: name.to_string() }
	}

	pub(crate) fn immutable(operation: &'static str, name: &str) -> Self {
		Self::ImmutableRegistry {
			operation,
			name: name.to_string(),
		}
	}
}
