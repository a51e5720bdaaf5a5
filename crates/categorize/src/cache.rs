use std::sync::Arc;

use serde::Deserialize;
use strata_models::ClassDetails;
use strata_models::annotations::{AnnotationTarget, bool_or_default, builtins, enum_or_default, string_or_default};

/// Which entities participate in the second-level cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharedCacheMode {
	All,
	None,
	EnableSelective,
	DisableSelective,
	/// Behaves like [`SharedCacheMode::EnableSelective`].
	#[default]
	Unspecified,
}

/// Second-level cache configuration of one hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRegion {
	pub region: Arc<str>,
	/// `CacheConcurrencyStrategy` constant from `@Cache(usage)`.
	pub access: Option<Arc<str>>,
	pub cached: bool,
}

impl CacheRegion {
	pub(crate) fn for_root(root: &ClassDetails, mode: SharedCacheMode) -> Self {
		let b = builtins();
		let usages = root.local_usages();
		let cache = usages.get(&b.cache);
		let cacheable = usages.get(&b.cacheable).and_then(|u| bool_or_default(u, "value"));

		let cached = match mode {
			SharedCacheMode::All => true,
			SharedCacheMode::None => false,
			SharedCacheMode::DisableSelective => cacheable != Some(false),
			SharedCacheMode::EnableSelective | SharedCacheMode::Unspecified => {
				cacheable.unwrap_or(cache.is_some())
			}
		};

		Self {
			region: cache
				.and_then(|u| string_or_default(u, "region"))
				.map_or_else(|| root.name_arc().clone(), Arc::from),
			access: cache.and_then(|u| enum_or_default(u, "usage")).map(Arc::from),
			cached,
		}
	}
}
