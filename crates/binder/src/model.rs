//! The bound relational graph handed to the schema collaborator.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`BoundModel`] | Table arena plus per-entity, per-collection bindings. |
//! | [`EntityBinding`] | Table, variant and attribute bindings of one entity. |
//! | [`AttributeBinding`] | How one attribute maps onto columns. |
//! | [`CollectionBinding`] | Key/element columns of a plural attribute. |

use std::sync::Arc;

use indexmap::IndexMap;
use strata_categorize::CacheRegion;
use strata_categorize::registrations::{FilterDefRegistration, GeneratorRegistration};

use crate::naming::Identifier;
use crate::relational::{Namespace, Table, TableId, TableReference};
use crate::second_pass::ConvergenceReport;

/// Where an entity's rows live relative to its hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityVariant {
	Root,
	/// Own table joined to the parent's on the primary key.
	JoinedSubclass { parent: Arc<str> },
	/// Rows share the root table, told apart by the discriminator.
	SingleTableSubclass { parent: Arc<str> },
	/// Own table repeating every parent column.
	UnionSubclass { parent: Arc<str> },
}

impl EntityVariant {
	pub fn parent(&self) -> Option<&str> {
		match self {
			Self::Root => None,
			Self::JoinedSubclass { parent } | Self::SingleTableSubclass { parent } | Self::UnionSubclass { parent } => {
				Some(parent)
			}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
	/// `GenerationType` constant.
	pub strategy: Arc<str>,
	/// Named generator registration, if one was referenced.
	pub generator: Option<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierBinding {
	pub attributes: Vec<AttributeBinding>,
	pub id_class: Option<Arc<str>>,
	pub generator: Option<IdGenerator>,
}

impl IdentifierBinding {
	pub fn columns(&self) -> Vec<Identifier> {
		self.attributes.iter().flat_map(AttributeBinding::columns).collect()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueBinding {
	Basic {
		column: Identifier,
		converter: Option<Arc<str>>,
		java_type_descriptor: Option<Arc<str>>,
	},
	Embedded {
		embeddable: Arc<str>,
		components: Vec<AttributeBinding>,
	},
	/// Foreign-key columns are filled in once the target's key is known.
	ToOne {
		target_entity: Arc<str>,
		columns: Vec<Identifier>,
		/// Set on the inverse side of a one-to-one.
		mapped_by: Option<Arc<str>>,
	},
	/// Details live in [`BoundModel::collection`] under this role.
	Plural { role: Arc<str> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBinding {
	pub name: Arc<str>,
	pub value: ValueBinding,
}

impl AttributeBinding {
	/// Columns owned by this attribute on its entity table.
	pub fn columns(&self) -> Vec<Identifier> {
		match &self.value {
			ValueBinding::Basic { column, .. } => vec![column.clone()],
			ValueBinding::Embedded { components, .. } => components.iter().flat_map(Self::columns).collect(),
			ValueBinding::ToOne { columns, .. } => columns.clone(),
			ValueBinding::Plural { .. } => Vec::new(),
		}
	}

	/// An owning to-one whose foreign key has not been bound yet.
	pub fn has_pending_columns(&self) -> bool {
		match &self.value {
			ValueBinding::ToOne {
				columns, mapped_by: None, ..
			} => columns.is_empty(),
			ValueBinding::Embedded { components, .. } => components.iter().any(Self::has_pending_columns),
			_ => false,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscriminatorBinding {
	pub column: Identifier,
	/// `DiscriminatorType` constant.
	pub discriminator_type: Arc<str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBinding {
	pub name: Arc<str>,
	pub condition: Option<Arc<str>>,
}

#[derive(Debug, Clone)]
pub struct EntityBinding {
	pub class_name: Arc<str>,
	pub entity_name: Arc<str>,
	/// Class name of the hierarchy root.
	pub root: Arc<str>,
	pub table: TableId,
	pub variant: EntityVariant,
	/// Present on roots only; subclasses share the root's identifier.
	pub identifier: Option<IdentifierBinding>,
	pub version: Option<AttributeBinding>,
	pub tenant_id: Option<AttributeBinding>,
	pub attributes: Vec<AttributeBinding>,
	pub discriminator: Option<DiscriminatorBinding>,
	pub discriminator_value: Option<Arc<str>>,
	pub filters: Vec<FilterBinding>,
	pub cache: Option<CacheRegion>,
}

impl EntityBinding {
	pub fn attribute(&self, name: &str) -> Option<&AttributeBinding> {
		self.attributes.iter().find(|a| &*a.name == name)
	}

	/// Binding at an attribute path, descending into embedded components and
	/// the identifier.
	pub(crate) fn binding_at_path_mut(&mut self, path: &[Arc<str>]) -> Option<&mut AttributeBinding> {
		if let Some(found) = binding_at_path(&mut self.attributes, path) {
			return Some(found);
		}
		self.identifier
			.as_mut()
			.and_then(|id| binding_at_path(&mut id.attributes, path))
	}
}

fn binding_at_path<'m>(attributes: &'m mut [AttributeBinding], path: &[Arc<str>]) -> Option<&'m mut AttributeBinding> {
	let (first, rest) = path.split_first()?;
	let binding = attributes.iter_mut().find(|a| a.name == *first)?;
	if rest.is_empty() {
		return Some(binding);
	}
	match &mut binding.value {
		ValueBinding::Embedded { components, .. } => binding_at_path(components, rest),
		_ => None,
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedSuperclassBinding {
	pub class_name: Arc<str>,
	pub attributes: Vec<Arc<str>>,
	/// Nearest entity whose table stores these attributes.
	pub table_owner: Option<Arc<str>>,
	pub table: Option<TableId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionNature {
	OneToMany,
	ManyToMany,
	ElementCollection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionElement {
	Entity(Arc<str>),
	Basic(Arc<str>),
	Embeddable(Arc<str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionBinding {
	/// `OwnerClass.attribute`.
	pub role: Arc<str>,
	pub owner: Arc<str>,
	pub nature: CollectionNature,
	pub element: CollectionElement,
	/// The join or collection table, or the target table of a `mappedBy`
	/// one-to-many.
	pub table: TableId,
	pub key_columns: Vec<Identifier>,
	pub element_columns: Vec<Identifier>,
	pub mapped_by: Option<Arc<str>>,
}

#[derive(Debug, Clone, Default)]
pub struct BoundModel {
	tables: Vec<Table>,
	entities: IndexMap<Arc<str>, EntityBinding>,
	mapped_superclasses: IndexMap<Arc<str>, MappedSuperclassBinding>,
	collections: IndexMap<Arc<str>, CollectionBinding>,
	generators: IndexMap<Arc<str>, GeneratorRegistration>,
	filter_defs: IndexMap<Arc<str>, FilterDefRegistration>,
	convergence: ConvergenceReport,
}

impl BoundModel {
	pub fn tables(&self) -> &[Table] {
		&self.tables
	}

	pub fn table(&self, id: TableId) -> &Table {
		&self.tables[id.0]
	}

	pub(crate) fn table_mut(&mut self, id: TableId) -> &mut Table {
		&mut self.tables[id.0]
	}

	/// First table whose unqualified name has this text.
	pub fn table_named(&self, name: &str) -> Option<&Table> {
		self.tables.iter().find(|t| t.name().text() == name)
	}

	pub(crate) fn add_table(&mut self, namespace: Namespace, name: Identifier, reference: TableReference) -> TableId {
		self.attach_table(self.detached_table(namespace, name, reference))
	}

	/// A table carrying the next id but not yet part of the model. Only one
	/// may be outstanding at a time.
	pub(crate) fn detached_table(&self, namespace: Namespace, name: Identifier, reference: TableReference) -> Table {
		Table::new(TableId(self.tables.len()), namespace, name, reference)
	}

	pub(crate) fn attach_table(&mut self, table: Table) -> TableId {
		let id = table.id();
		debug_assert_eq!(id.0, self.tables.len());
		self.tables.push(table);
		id
	}

	pub fn entities(&self) -> impl Iterator<Item = &EntityBinding> + '_ {
		self.entities.values()
	}

	pub fn entity(&self, class_name: &str) -> Option<&EntityBinding> {
		self.entities.get(class_name)
	}

	pub(crate) fn entity_mut(&mut self, class_name: &str) -> Option<&mut EntityBinding> {
		self.entities.get_mut(class_name)
	}

	pub fn entity_by_name(&self, entity_name: &str) -> Option<&EntityBinding> {
		self.entities.values().find(|e| &*e.entity_name == entity_name)
	}

	/// The root binding of `class_name`'s hierarchy.
	pub fn root_of(&self, class_name: &str) -> Option<&EntityBinding> {
		self.entity(class_name).and_then(|e| self.entity(&e.root))
	}

	/// Finds `name` on `class_name` or the nearest entity supertype declaring
	/// it, returning the declaring binding too.
	pub fn attribute_of(&self, class_name: &str, name: &str) -> Option<(&EntityBinding, &AttributeBinding)> {
		let mut current = self.entity(class_name);
		while let Some(entity) = current {
			let identifier = entity.identifier.iter().flat_map(|id| id.attributes.iter());
			let found = entity
				.attributes
				.iter()
				.chain(identifier)
				.chain(entity.version.iter())
				.chain(entity.tenant_id.iter())
				.find(|a| &*a.name == name);
			if let Some(found) = found {
				return Some((entity, found));
			}
			current = entity.variant.parent().and_then(|parent| self.entity(parent));
		}
		None
	}

	pub(crate) fn insert_entity(&mut self, binding: EntityBinding) {
		self.entities.insert(binding.class_name.clone(), binding);
	}

	pub fn mapped_superclasses(&self) -> impl Iterator<Item = &MappedSuperclassBinding> + '_ {
		self.mapped_superclasses.values()
	}

	pub fn mapped_superclass(&self, class_name: &str) -> Option<&MappedSuperclassBinding> {
		self.mapped_superclasses.get(class_name)
	}

	pub(crate) fn mapped_superclass_mut(&mut self, class_name: &str) -> Option<&mut MappedSuperclassBinding> {
		self.mapped_superclasses.get_mut(class_name)
	}

	pub(crate) fn insert_mapped_superclass(&mut self, binding: MappedSuperclassBinding) {
		self.mapped_superclasses.insert(binding.class_name.clone(), binding);
	}

	pub fn collections(&self) -> impl Iterator<Item = &CollectionBinding> + '_ {
		self.collections.values()
	}

	pub fn collection(&self, role: &str) -> Option<&CollectionBinding> {
		self.collections.get(role)
	}

	pub(crate) fn insert_collection(&mut self, binding: CollectionBinding) {
		self.collections.insert(binding.role.clone(), binding);
	}

	pub fn generators(&self) -> impl Iterator<Item = &GeneratorRegistration> + '_ {
		self.generators.values()
	}

	pub fn generator(&self, name: &str) -> Option<&GeneratorRegistration> {
		self.generators.get(name)
	}

	pub fn filter_defs(&self) -> impl Iterator<Item = &FilterDefRegistration> + '_ {
		self.filter_defs.values()
	}

	/// Scan counters of the deferred-binding run that produced this model.
	pub fn convergence(&self) -> &ConvergenceReport {
		&self.convergence
	}

	pub(crate) fn set_convergence(&mut self, report: ConvergenceReport) {
		self.convergence = report;
	}

	pub(crate) fn install_globals<'g>(
		&mut self,
		generators: impl IntoIterator<Item = (&'g Arc<str>, &'g GeneratorRegistration)>,
		filter_defs: impl IntoIterator<Item = (&'g Arc<str>, &'g FilterDefRegistration)>,
	) {
		self.generators = generators.into_iter().map(|(k, v)| (k.clone(), v.clone())).collect();
		self.filter_defs = filter_defs.into_iter().map(|(k, v)| (k.clone(), v.clone())).collect();
	}
}
