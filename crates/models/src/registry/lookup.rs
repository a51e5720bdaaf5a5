use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::annotations::DescriptorSource;
use crate::{ClassDetails, ModelsError};

/// Read access shared by the live registry and its snapshots.
pub trait ClassDetailsLookup: DescriptorSource + Send + Sync {
	/// Returns the one [`ClassDetails`] instance for `name`.
	fn resolve(&self, name: &str) -> Result<Arc<ClassDetails>, ModelsError>;

	/// Names of classes discovered so far whose direct superclass is `name`,
	/// in discovery order.
	fn direct_subclasses(&self, name: &str) -> Vec<Arc<str>>;

	/// All discovered descendants of `name`, breadth-first.
	fn all_subclasses(&self, name: &str) -> Vec<Arc<str>> {
		let mut out = Vec::new();
		let mut seen = FxHashSet::default();
		let mut queue: VecDeque<Arc<str>> = self.direct_subclasses(name).into();
		while let Some(next) = queue.pop_front() {
			if !seen.insert(next.clone()) {
				continue;
			}
			queue.extend(self.direct_subclasses(&next));
			out.push(next);
		}
		out
	}
}
