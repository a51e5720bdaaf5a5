use std::sync::Arc;

use crate::naming::{
	ComponentPathImplicitNaming, Identifier, ImplicitNamingStrategy, JpaImplicitNaming, PhysicalNamingStrategy,
	SnakeCasePhysicalNaming, StandardPhysicalNaming,
};
use crate::relational::Namespace;
use crate::settings::{BootstrapSettings, ImplicitNaming, PhysicalNaming};

/// Settings plus the naming-strategy pair every binder consults.
#[derive(Debug, Clone)]
pub struct BindingEnvironment {
	settings: BootstrapSettings,
	physical: Arc<dyn PhysicalNamingStrategy>,
	implicit: Arc<dyn ImplicitNamingStrategy>,
}

impl Default for BindingEnvironment {
	fn default() -> Self {
		Self::from_settings(BootstrapSettings::default())
	}
}

impl BindingEnvironment {
	pub fn from_settings(settings: BootstrapSettings) -> Self {
		let physical: Arc<dyn PhysicalNamingStrategy> = match settings.physical_naming {
			PhysicalNaming::Standard => Arc::new(StandardPhysicalNaming),
			PhysicalNaming::SnakeCase => Arc::new(SnakeCasePhysicalNaming),
		};
		let implicit: Arc<dyn ImplicitNamingStrategy> = match settings.implicit_naming {
			ImplicitNaming::Jpa => Arc::new(JpaImplicitNaming),
			ImplicitNaming::ComponentPath => Arc::new(ComponentPathImplicitNaming),
		};
		Self {
			settings,
			physical,
			implicit,
		}
	}

	pub fn with_physical_naming(mut self, strategy: Arc<dyn PhysicalNamingStrategy>) -> Self {
		self.physical = strategy;
		self
	}

	pub fn with_implicit_naming(mut self, strategy: Arc<dyn ImplicitNamingStrategy>) -> Self {
		self.implicit = strategy;
		self
	}

	pub fn settings(&self) -> &BootstrapSettings {
		&self.settings
	}

	pub fn physical_naming(&self) -> &dyn PhysicalNamingStrategy {
		&*self.physical
	}

	pub fn implicit_naming(&self) -> &dyn ImplicitNamingStrategy {
		&*self.implicit
	}

	/// Parses a logical name, forcing quotes when quoting is global.
	pub fn identifier(&self, text: &str) -> Identifier {
		let id = Identifier::parse(text);
		if self.settings.globally_quoted_identifiers {
			id.quoted()
		} else {
			id
		}
	}

	pub fn table_name(&self, logical: &str) -> Identifier {
		self.physical.to_physical_table_name(self.identifier(logical))
	}

	pub fn column_name(&self, logical: &str) -> Identifier {
		self.physical.to_physical_column_name(self.identifier(logical))
	}

	pub fn sequence_name(&self, logical: &str) -> Identifier {
		self.physical.to_physical_sequence_name(self.identifier(logical))
	}

	/// Explicit catalog/schema, falling back to the configured defaults.
	pub fn namespace(&self, catalog: Option<&str>, schema: Option<&str>) -> Namespace {
		let catalog = catalog.or(self.settings.default_catalog.as_deref());
		let schema = schema.or(self.settings.default_schema.as_deref());
		Namespace {
			catalog: catalog.map(|c| self.physical.to_physical_catalog_name(self.identifier(c))),
			schema: schema.map(|s| self.physical.to_physical_schema_name(self.identifier(s))),
		}
	}
}
