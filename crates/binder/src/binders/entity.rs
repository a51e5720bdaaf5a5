use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use strata_categorize::{
	AttributeContainer, AttributeMetadata, Category, IdMapping, InheritanceStrategy, ManagedType,
};
use strata_models::annotations::{AnnotationTarget, builtins, enum_or_default, int_or_default, string_or_default};

use super::attributes::{AttributeBinder, generation_strategy};
use super::passes::{self, JoinedKeyPass, UnionCopyPass};
use super::{BindingState, HierarchyContext, PassQueue};
use crate::BindingError;
use crate::model::{
	AttributeBinding, DiscriminatorBinding, EntityBinding, EntityVariant, FilterBinding, IdGenerator,
	IdentifierBinding,
};
use crate::naming::Identifier;
use crate::relational::{Column, TableId, TableReference, UniqueKey};

/// Binds one entity and keeps what its closing pass needs.
#[derive(Debug)]
pub(crate) struct EntityBinder {
	class_name: Arc<str>,
	table: TableId,
	/// Present on hierarchy roots only.
	root: Option<RootChecks>,
}

#[derive(Debug)]
struct RootChecks {
	entities: Vec<Arc<str>>,
	natural_id: Vec<Arc<str>>,
	discriminated: bool,
}

impl EntityBinder {
	pub(crate) fn bind(
		cx: HierarchyContext<'_>,
		ty: &Arc<ManagedType>,
		state: &mut BindingState,
		queue: &mut PassQueue,
	) -> Result<Self, BindingError> {
		let class_name = ty.class().name_arc().clone();
		let entity_name: Arc<str> = Arc::from(ty.entity_name().unwrap_or_else(|| ty.class().simple_name()));
		let binder = match cx.hierarchy.entity_super_type_of(ty.name()) {
			None => Self::bind_root(cx, ty, class_name, entity_name, state, queue)?,
			Some(parent) => {
				let parent = parent.class().name_arc().clone();
				Self::bind_subclass(cx, ty, class_name, entity_name, parent, state, queue)?
			}
		};
		tracing::debug!(
			domain = "binder",
			entity = %binder.class_name,
			table = %state.model.table(binder.table).qualified_name(),
			"entity bound"
		);
		Ok(binder)
	}

	pub(crate) fn class_name(&self) -> &str {
		&self.class_name
	}

	fn bind_root(
		cx: HierarchyContext<'_>,
		ty: &ManagedType,
		class_name: Arc<str>,
		entity_name: Arc<str>,
		state: &mut BindingState,
		queue: &mut PassQueue,
	) -> Result<Self, BindingError> {
		let hierarchy = cx.hierarchy;
		let table = declare_table(cx, ty, &entity_name, state)?;
		let mut binder = AttributeBinder::new(cx, ty, table, false);

		let identifier = bind_identifier(cx, &mut binder, state, queue)?;
		let version = match hierarchy.version() {
			Some(attribute) => Some(binder.bind(attribute, true, state, queue)?),
			None => None,
		};
		let tenant_id = match hierarchy.tenant_id() {
			Some(attribute) => Some(binder.bind(attribute, true, state, queue)?),
			None => None,
		};
		let discriminator = declare_discriminator(cx, ty, table, state)?;
		let attributes = bind_attributes(cx, ty, &mut binder, state, queue)?;

		if identifier.attributes.iter().any(AttributeBinding::has_pending_columns) {
			queue.push(
				format!("primary key {class_name}"),
				passes::identifier_key(class_name.clone(), table),
			);
		} else {
			state.model.table_mut(table).set_primary_key(identifier.columns());
		}

		let checks = RootChecks {
			entities: hierarchy.entities().map(|e| e.class().name_arc().clone()).collect(),
			natural_id: hierarchy
				.natural_id()
				.map(|n| n.attributes.iter().map(|a| Arc::from(a.name())).collect())
				.unwrap_or_default(),
			discriminated: discriminator.is_some(),
		};
		let filters = bind_filters(ty, state)?;
		state.model.insert_entity(EntityBinding {
			class_name: class_name.clone(),
			root: class_name.clone(),
			table,
			variant: EntityVariant::Root,
			identifier: Some(identifier),
			version,
			tenant_id,
			attributes,
			discriminator_value: discriminator.as_ref().map(|_| discriminator_value(ty, &entity_name)),
			discriminator,
			filters,
			cache: hierarchy.cache().cached.then(|| hierarchy.cache().clone()),
			entity_name,
		});
		Ok(Self {
			class_name,
			table,
			root: Some(checks),
		})
	}

	fn bind_subclass(
		cx: HierarchyContext<'_>,
		ty: &ManagedType,
		class_name: Arc<str>,
		entity_name: Arc<str>,
		parent: Arc<str>,
		state: &mut BindingState,
		queue: &mut PassQueue,
	) -> Result<Self, BindingError> {
		let root = cx.hierarchy.root().class().name_arc().clone();
		let (root_table, discriminated) = state
			.model
			.entity(&root)
			.map(|r| (r.table, r.discriminator.is_some()))
			.ok_or_else(|| BindingError::UnknownTargetEntity {
				attribute: class_name.to_string(),
				target: root.to_string(),
			})?;

		let (variant, table, shared) = match cx.hierarchy.inheritance() {
			InheritanceStrategy::SingleTable => (EntityVariant::SingleTableSubclass { parent }, root_table, true),
			InheritanceStrategy::Joined => {
				let table = declare_table(cx, ty, &entity_name, state)?;
				let explicit_column = ty
					.class()
					.local_usages()
					.get(&builtins().primary_key_join_column)
					.and_then(|u| string_or_default(u, "name"))
					.map(Arc::from);
				queue.push(
					format!("joined key {class_name}"),
					passes::joined_primary_key(JoinedKeyPass {
						child: class_name.clone(),
						parent: parent.clone(),
						table,
						explicit_column,
						env: cx.env.clone(),
					}),
				);
				(EntityVariant::JoinedSubclass { parent }, table, false)
			}
			InheritanceStrategy::TablePerClass => {
				let table = declare_table(cx, ty, &entity_name, state)?;
				state.model.table_mut(table).expect_columns();
				queue.push(
					format!("union columns {class_name}"),
					passes::union_columns(UnionCopyPass {
						child: class_name.clone(),
						parent: parent.clone(),
						table,
					}),
				);
				(EntityVariant::UnionSubclass { parent }, table, false)
			}
		};

		let mut binder = AttributeBinder::new(cx, ty, table, shared);
		let attributes = bind_attributes(cx, ty, &mut binder, state, queue)?;
		let filters = bind_filters(ty, state)?;
		state.model.insert_entity(EntityBinding {
			class_name: class_name.clone(),
			root,
			table,
			variant,
			identifier: None,
			version: None,
			tenant_id: None,
			attributes,
			discriminator: None,
			discriminator_value: discriminated.then(|| discriminator_value(ty, &entity_name)),
			filters,
			cache: None,
			entity_name,
		});
		Ok(Self {
			class_name,
			table,
			root: None,
		})
	}

	/// Primary key sanity; on roots also the natural-id unique key and
	/// discriminator uniqueness across the hierarchy.
	pub(crate) fn finish(&self, state: &mut BindingState) -> Result<(), BindingError> {
		let table = state.model.table(self.table);
		if table.primary_key().is_empty() {
			return Err(BindingError::MissingPrimaryKey {
				entity: self.class_name.to_string(),
				table: table.qualified_name(),
			});
		}
		let Some(root) = &self.root else {
			return Ok(());
		};

		if !root.natural_id.is_empty() {
			let columns: Vec<Identifier> = root
				.natural_id
				.iter()
				.filter_map(|name| state.model.attribute_of(&self.class_name, name))
				.flat_map(|(_, binding)| binding.columns())
				.collect();
			if !columns.is_empty() {
				state.model.table_mut(self.table).add_unique_key(UniqueKey { columns });
			}
		}

		if root.discriminated {
			let mut seen: FxHashMap<Arc<str>, &Arc<str>> = FxHashMap::default();
			for entity in &root.entities {
				let Some(binding) = state.model.entity(entity) else {
					continue;
				};
				let value = binding
					.discriminator_value
					.clone()
					.unwrap_or_else(|| binding.entity_name.clone());
				if let Some(first) = seen.insert(value.clone(), entity) {
					return Err(BindingError::DuplicateDiscriminator {
						value: value.to_string(),
						first: first.to_string(),
						second: entity.to_string(),
					});
				}
			}
		}
		Ok(())
	}
}

/// The entity's table node: `@Table` names it, `@View` and `@Subselect`
/// change what it stands for.
fn declare_table(
	cx: HierarchyContext<'_>,
	ty: &ManagedType,
	entity_name: &str,
	state: &mut BindingState,
) -> Result<TableId, BindingError> {
	let b = builtins();
	let usages = ty.class().local_usages();
	let declared = usages.get(&b.table);
	let text = |name: &str| declared.and_then(|u| string_or_default(u, name));

	let logical = text("name")
		.map(str::to_owned)
		.unwrap_or_else(|| cx.env.implicit_naming().entity_table_name(entity_name));
	let reference = if let Some(view) = usages.get(&b.view) {
		TableReference::View {
			query: Arc::from(view.string("query").unwrap_or_default()),
		}
	} else if let Some(subselect) = usages.get(&b.subselect) {
		TableReference::InLineView {
			query: Arc::from(subselect.string("value").unwrap_or_default()),
		}
	} else {
		TableReference::Physical
	};

	let namespace = cx.env.namespace(text("catalog"), text("schema"));
	Ok(state.model.add_table(namespace, cx.env.table_name(&logical), reference))
}

fn bind_identifier(
	cx: HierarchyContext<'_>,
	binder: &mut AttributeBinder<'_>,
	state: &mut BindingState,
	queue: &mut PassQueue,
) -> Result<IdentifierBinding, BindingError> {
	let mapping = cx.hierarchy.id_mapping();
	let mut attributes = Vec::with_capacity(mapping.attributes().len());
	for attribute in mapping.attributes() {
		attributes.push(binder.bind(attribute, true, state, queue)?);
	}

	let generator = match mapping {
		IdMapping::Basic { attribute } => match attribute.usage(&builtins().generated_value) {
			Some(usage) => {
				let generator = match string_or_default(usage, "generator") {
					Some(name) => Some(state.globals.generator(name, &attribute.qualified_name())?.name.clone()),
					None => None,
				};
				Some(IdGenerator {
					strategy: generation_strategy(usage),
					generator,
				})
			}
			None => None,
		},
		IdMapping::Aggregated { .. } | IdMapping::NonAggregated { .. } => None,
	};

	Ok(IdentifierBinding {
		attributes,
		id_class: mapping.id_class().map(|c| c.name_arc().clone()),
		generator,
	})
}

/// Attributes stored on `ty`'s table: its own plus those of the mapped
/// superclasses between it and its entity supertype, minus the identifier,
/// version and tenant-id attributes the root binds itself.
fn persistent_attributes(cx: HierarchyContext<'_>, ty: &ManagedType) -> Vec<Arc<AttributeMetadata>> {
	let hierarchy = cx.hierarchy;
	let mut inherited = Vec::new();
	for ancestor in ty.class().ancestors() {
		match hierarchy.types().iter().find(|t| t.name() == ancestor.name()) {
			Some(t) if t.category() == Category::MappedSuperclass => inherited.push(t.clone()),
			Some(_) => break,
			None => {}
		}
	}
	inherited.reverse();

	let special: FxHashSet<String> = hierarchy
		.id_mapping()
		.attributes()
		.iter()
		.chain(hierarchy.version())
		.chain(hierarchy.tenant_id())
		.map(|a| a.qualified_name())
		.collect();

	inherited
		.iter()
		.flat_map(|t| t.attributes().iter())
		.chain(ty.attributes())
		.filter(|a| !special.contains(&a.qualified_name()))
		.cloned()
		.collect()
}

fn bind_attributes(
	cx: HierarchyContext<'_>,
	ty: &ManagedType,
	binder: &mut AttributeBinder<'_>,
	state: &mut BindingState,
	queue: &mut PassQueue,
) -> Result<Vec<AttributeBinding>, BindingError> {
	persistent_attributes(cx, ty)
		.iter()
		.map(|attribute| binder.bind(attribute, false, state, queue))
		.collect()
}

/// Discriminator column on a root: declared with `@DiscriminatorColumn`, or
/// implied by a single-table hierarchy with subclasses.
fn declare_discriminator(
	cx: HierarchyContext<'_>,
	ty: &ManagedType,
	table: TableId,
	state: &mut BindingState,
) -> Result<Option<DiscriminatorBinding>, BindingError> {
	let declared = ty.class().local_usages().get(&builtins().discriminator_column);
	let implied = cx.hierarchy.inheritance() == InheritanceStrategy::SingleTable && cx.hierarchy.has_subtypes();
	if declared.is_none() && !implied {
		return Ok(None);
	}

	let logical = declared
		.and_then(|u| u.string("name"))
		.filter(|name| !name.is_empty())
		.map(str::to_owned)
		.unwrap_or_else(|| cx.env.implicit_naming().discriminator_column_name());
	let column = Column {
		length: Some(declared.and_then(|u| int_or_default(u, "length")).unwrap_or(31)),
		..Column::new(cx.env.column_name(&logical)).not_null()
	};
	let column = state.model.table_mut(table).add_column(column)?;
	let discriminator_type = declared
		.and_then(|u| enum_or_default(u, "discriminatorType"))
		.unwrap_or("STRING");
	Ok(Some(DiscriminatorBinding {
		column,
		discriminator_type: Arc::from(discriminator_type),
	}))
}

fn discriminator_value(ty: &ManagedType, entity_name: &Arc<str>) -> Arc<str> {
	ty.class()
		.local_usages()
		.get(&builtins().discriminator_value)
		.and_then(|u| string_or_default(u, "value"))
		.map_or_else(|| entity_name.clone(), Arc::from)
}

/// `@Filter` usages, each checked against a `@FilterDef`.
fn bind_filters(ty: &ManagedType, state: &BindingState) -> Result<Vec<FilterBinding>, BindingError> {
	let location = ty.class().location();
	ty.class()
		.local_usages()
		.repeated(&builtins().filter)
		.iter()
		.map(|usage| -> Result<FilterBinding, BindingError> {
			let name = string_or_default(usage, "name").unwrap_or_default();
			let definition = state.globals.filter_def(name, &location)?;
			Ok(FilterBinding {
				name: definition.name.clone(),
				condition: string_or_default(usage, "condition")
					.map(Arc::from)
					.or_else(|| definition.default_condition.clone()),
			})
		})
		.collect()
}
