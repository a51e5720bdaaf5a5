//! [`ClassIndexSpec`] → postcard blob.

use std::collections::HashSet;

use crate::ClassIndexSpec;

#[derive(Debug)]
pub enum CompileError {
	/// Two entries describe the same class.
	DuplicateClass(String),
	Encode(postcard::Error),
}

impl std::fmt::Display for CompileError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::DuplicateClass(name) => write!(f, "duplicate class entry: '{name}'"),
			Self::Encode(e) => write!(f, "failed to serialize class index: {e}"),
		}
	}
}

impl std::error::Error for CompileError {}

/// Validates and encodes an index. Entries are written in name order so the
/// blob is stable across runs.
pub fn encode(spec: &ClassIndexSpec) -> Result<Vec<u8>, CompileError> {
	let mut seen = HashSet::new();
	for class in &spec.classes {
		if !seen.insert(class.name.as_str()) {
			return Err(CompileError::DuplicateClass(class.name.clone()));
		}
	}

	let mut sorted = spec.clone();
	sorted.classes.sort_by(|a, b| a.name.cmp(&b.name));
	postcard::to_stdvec(&sorted).map_err(CompileError::Encode)
}
