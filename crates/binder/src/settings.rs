//! Bootstrap settings shared by every binder.

use serde::Deserialize;
use strata_categorize::SharedCacheMode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("failed to parse bootstrap settings: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Built-in physical naming strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalNaming {
	/// Logical names are used as-is.
	#[default]
	Standard,
	/// `orderLine` becomes `order_line`.
	SnakeCase,
}

/// Built-in implicit naming strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplicitNaming {
	/// Columns are named after the attribute alone.
	#[default]
	Jpa,
	/// Columns of embedded attributes carry the full attribute path.
	ComponentPath,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapSettings {
	pub default_catalog: Option<String>,
	pub default_schema: Option<String>,
	/// Quote every identifier, not only those written in backticks.
	pub globally_quoted_identifiers: bool,
	pub shared_cache_mode: SharedCacheMode,
	pub physical_naming: PhysicalNaming,
	pub implicit_naming: ImplicitNaming,
}

impl BootstrapSettings {
	/// ```
	/// use strata_binder::{BootstrapSettings, PhysicalNaming};
	///
	/// let settings = BootstrapSettings::from_toml_str("physical_naming = \"snake_case\"").unwrap();
	/// assert_eq!(settings.physical_naming, PhysicalNaming::SnakeCase);
	/// ```
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}
}
