use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Reverse index: superclass name → direct subclasses, in discovery order.
#[derive(Debug, Default, Clone)]
pub(crate) struct SubclassIndex {
	by_super: FxHashMap<Arc<str>, Vec<Arc<str>>>,
}

impl SubclassIndex {
	pub(crate) fn record(&mut self, superclass: &str, subclass: &Arc<str>) {
		let entry = self.by_super.entry(Arc::from(superclass)).or_default();
		if !entry.iter().any(|s| s == subclass) {
			entry.push(subclass.clone());
		}
	}

	pub(crate) fn direct(&self, superclass: &str) -> Vec<Arc<str>> {
		self.by_super.get(superclass).cloned().unwrap_or_default()
	}
}
