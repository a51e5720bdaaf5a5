//! Attribute → column binding.
//!
//! Basic and embedded attributes bind inline. To-one and plural attributes
//! depend on another entity's key, so they record a placeholder binding and
//! queue the work that fills it in.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use strata_categorize::{AttributeContainer, AttributeMetadata, AttributeNature, Category, ManagedType};
use strata_models::annotations::{
	AnnotationTarget, AnnotationUsage, bool_or_default, builtins, enum_or_default, int_or_default, string_or_default,
};

use super::passes::{self, CollectionPass, ForeignKeyPass, InverseToOnePass};
use super::{BindingState, HierarchyContext, PassQueue, arc_path, class_attribute};
use crate::BindingError;
use crate::model::{AttributeBinding, CollectionElement, CollectionNature, ValueBinding};
use crate::naming::Identifier;
use crate::relational::{Column, TableId};

/// Binds the attributes of one entity onto one table.
pub(crate) struct AttributeBinder<'a> {
	cx: HierarchyContext<'a>,
	owner: Arc<str>,
	owner_entity_name: Arc<str>,
	table: TableId,
	/// Columns live on a table shared with sibling subclasses: they stay
	/// nullable and may already exist.
	shared_table: bool,
	/// Column names from `@AttributeOverride`, keyed by dotted attribute path.
	overrides: FxHashMap<String, Arc<str>>,
}

impl<'a> AttributeBinder<'a> {
	pub(crate) fn new(cx: HierarchyContext<'a>, ty: &ManagedType, table: TableId, shared_table: bool) -> Self {
		let mut binder = Self {
			cx,
			owner: ty.class().name_arc().clone(),
			owner_entity_name: Arc::from(ty.entity_name().unwrap_or_else(|| ty.class().simple_name())),
			table,
			shared_table,
			overrides: FxHashMap::default(),
		};
		let overrides = ty.class().local_usages().repeated(&builtins().attribute_override);
		binder.collect_overrides(&[], &overrides);
		binder
	}

	/// Outer overrides win over ones declared deeper in the path.
	fn collect_overrides(&mut self, path: &[&str], usages: &[Arc<AnnotationUsage>]) {
		for usage in usages {
			let Some(name) = string_or_default(usage, "name") else {
				continue;
			};
			let column = usage.nested("column").into_iter().next();
			let Some(column) = column.and_then(|c| string_or_default(c, "name")) else {
				continue;
			};
			let key = path.iter().copied().chain(std::iter::once(name)).collect::<Vec<_>>().join(".");
			self.overrides.entry(key).or_insert_with(|| Arc::from(column));
		}
	}

	pub(crate) fn bind(
		&mut self,
		attribute: &AttributeMetadata,
		not_null: bool,
		state: &mut BindingState,
		queue: &mut PassQueue,
	) -> Result<AttributeBinding, BindingError> {
		self.bind_at(attribute, &[attribute.name()], not_null, state, queue)
	}

	fn bind_at(
		&mut self,
		attribute: &AttributeMetadata,
		path: &[&str],
		not_null: bool,
		state: &mut BindingState,
		queue: &mut PassQueue,
	) -> Result<AttributeBinding, BindingError> {
		let value = match attribute.nature() {
			AttributeNature::Basic => self.basic(attribute, path, not_null, state)?,
			AttributeNature::Embedded => self.embedded(attribute, path, not_null, state, queue)?,
			AttributeNature::ToOne => self.to_one(attribute, path, not_null, state, queue),
			AttributeNature::Plural => self.plural(attribute, path, queue)?,
		};
		Ok(AttributeBinding {
			name: Arc::from(attribute.name()),
			value,
		})
	}

	fn basic(
		&mut self,
		attribute: &AttributeMetadata,
		path: &[&str],
		not_null: bool,
		state: &mut BindingState,
	) -> Result<ValueBinding, BindingError> {
		let b = builtins();
		let member = attribute.member();
		let declared = attribute.usage(&b.column);
		let logical = match self.overrides.get(&path.join(".")) {
			Some(name) => name.to_string(),
			None => declared
				.and_then(|u| string_or_default(u, "name"))
				.map(str::to_owned)
				.unwrap_or_else(|| self.cx.env.implicit_naming().basic_column_name(path)),
		};

		let mut column = Column::new(self.cx.env.column_name(&logical)).of_type(member.type_name());
		if let Some(usage) = declared {
			column.nullable = bool_or_default(usage, "nullable").unwrap_or(true);
			column.unique = bool_or_default(usage, "unique").unwrap_or(false);
			column.length = int_or_default(usage, "length");
		}
		column.nullable = self.shared_table || (column.nullable && !not_null);
		let name = self.add_column(column, state)?;

		Ok(ValueBinding::Basic {
			column: name,
			converter: converter_of(attribute, state),
			java_type_descriptor: state.globals.java_type_descriptor(member.type_name()).cloned(),
		})
	}

	fn embedded(
		&mut self,
		attribute: &AttributeMetadata,
		path: &[&str],
		not_null: bool,
		state: &mut BindingState,
		queue: &mut PassQueue,
	) -> Result<ValueBinding, BindingError> {
		let embeddable = embeddable_of(self.cx, attribute)?;
		let overrides = attribute.repeated(&builtins().attribute_override);
		self.collect_overrides(path, &overrides);

		let mut components = Vec::with_capacity(embeddable.attributes().len());
		for component in embeddable.attributes() {
			let child: Vec<&str> = path.iter().copied().chain(std::iter::once(component.name())).collect();
			components.push(self.bind_at(component, &child, not_null, state, queue)?);
		}
		Ok(ValueBinding::Embedded {
			embeddable: embeddable.class().name_arc().clone(),
			components,
		})
	}

	fn to_one(
		&mut self,
		attribute: &AttributeMetadata,
		path: &[&str],
		not_null: bool,
		state: &mut BindingState,
		queue: &mut PassQueue,
	) -> ValueBinding {
		let b = builtins();
		let one_to_one = attribute.usage(&b.one_to_one);
		let usage = attribute.usage(&b.many_to_one).or(one_to_one);
		let target: Arc<str> = Arc::from(
			usage
				.and_then(|u| class_attribute(u, "targetEntity"))
				.unwrap_or_else(|| attribute.member().type_name()),
		);

		if let Some(mapped_by) = one_to_one.and_then(|u| string_or_default(u, "mappedBy")) {
			let mapped_by: Arc<str> = Arc::from(mapped_by);
			queue.push(
				format!("inverse one-to-one {}", attribute.qualified_name()),
				passes::inverse_to_one(InverseToOnePass {
					attribute: attribute.qualified_name(),
					target: target.clone(),
					mapped_by: mapped_by.clone(),
				}),
			);
			return ValueBinding::ToOne {
				target_entity: target,
				columns: Vec::new(),
				mapped_by: Some(mapped_by),
			};
		}

		let optional = usage.and_then(|u| bool_or_default(u, "optional")).unwrap_or(true);
		let join_column = attribute.usage(&b.join_column);
		let join_nullable = join_column.and_then(|u| bool_or_default(u, "nullable")).unwrap_or(true);
		state.model.table_mut(self.table).expect_columns();
		queue.push(
			format!("foreign key {}", attribute.qualified_name()),
			passes::foreign_key(ForeignKeyPass {
				owner: self.owner.clone(),
				attribute: attribute.qualified_name(),
				path: arc_path(path),
				table: self.table,
				target: target.clone(),
				join_column: join_column.and_then(|u| string_or_default(u, "name")).map(Arc::from),
				nullable: self.shared_table || (optional && join_nullable && !not_null),
				shared_table: self.shared_table,
				env: self.cx.env.clone(),
			}),
		);
		ValueBinding::ToOne {
			target_entity: target,
			columns: Vec::new(),
			mapped_by: None,
		}
	}

	fn plural(
		&mut self,
		attribute: &AttributeMetadata,
		path: &[&str],
		queue: &mut PassQueue,
	) -> Result<ValueBinding, BindingError> {
		let b = builtins();
		let member = attribute.member();
		let (nature, explicit, mapped_by) = if let Some(u) = attribute.usage(&b.one_to_many) {
			(
				CollectionNature::OneToMany,
				class_attribute(u, "targetEntity"),
				string_or_default(u, "mappedBy"),
			)
		} else if let Some(u) = attribute.usage(&b.many_to_many) {
			(
				CollectionNature::ManyToMany,
				class_attribute(u, "targetEntity"),
				string_or_default(u, "mappedBy"),
			)
		} else {
			let explicit = attribute
				.usage(&b.element_collection)
				.and_then(|u| class_attribute(u, "targetClass"));
			(CollectionNature::ElementCollection, explicit, None)
		};
		let element_type = explicit
			.or_else(|| member.type_ref().element_type())
			.ok_or_else(|| BindingError::UnknownElementType {
				attribute: attribute.qualified_name(),
				type_name: member.type_name().to_owned(),
			})?;

		let (element, element_columns) = match nature {
			CollectionNature::OneToMany | CollectionNature::ManyToMany => {
				(CollectionElement::Entity(Arc::from(element_type)), Vec::new())
			}
			CollectionNature::ElementCollection => match self.cx.domain.managed_type(element_type) {
				Some(ty) if ty.category() == Category::Embeddable => (
					CollectionElement::Embeddable(Arc::from(element_type)),
					self.flatten_embeddable(ty, &[attribute.name()])?,
				),
				_ => {
					let logical = self.cx.env.implicit_naming().basic_column_name(&[attribute.name()]);
					let column = Column::new(self.cx.env.column_name(&logical))
						.of_type(element_type)
						.not_null();
					(CollectionElement::Basic(Arc::from(element_type)), vec![column])
				}
			},
		};

		let role: Arc<str> = Arc::from(format!("{}.{}", self.owner, path.join(".")));
		queue.push(
			format!("collection {role}"),
			passes::collection(CollectionPass {
				role: role.clone(),
				owner: self.owner.clone(),
				owner_entity_name: self.owner_entity_name.clone(),
				attribute: Arc::from(path.join("_")),
				nature,
				element,
				element_columns,
				mapped_by: mapped_by.map(Arc::from),
				env: self.cx.env.clone(),
			}),
		);
		Ok(ValueBinding::Plural { role })
	}

	/// Basic leaf columns of an embeddable used as a collection element.
	fn flatten_embeddable(&self, embeddable: &ManagedType, path: &[&str]) -> Result<Vec<Column>, BindingError> {
		let mut columns = Vec::new();
		for component in embeddable.attributes() {
			let child: Vec<&str> = path.iter().copied().chain(std::iter::once(component.name())).collect();
			match component.nature() {
				AttributeNature::Basic => {
					let logical = component
						.usage(&builtins().column)
						.and_then(|u| string_or_default(u, "name"))
						.map(str::to_owned)
						.unwrap_or_else(|| self.cx.env.implicit_naming().basic_column_name(&child));
					columns.push(
						Column::new(self.cx.env.column_name(&logical)).of_type(component.member().type_name()),
					);
				}
				AttributeNature::Embedded => {
					let nested = embeddable_of(self.cx, component)?;
					columns.extend(self.flatten_embeddable(nested, &child)?);
				}
				AttributeNature::ToOne | AttributeNature::Plural => {
					return Err(BindingError::UnknownElementType {
						attribute: component.qualified_name(),
						type_name: component.member().type_name().to_owned(),
					});
				}
			}
		}
		Ok(columns)
	}

	fn add_column(&self, column: Column, state: &mut BindingState) -> Result<Identifier, BindingError> {
		let table = state.model.table_mut(self.table);
		if self.shared_table {
			Ok(table.ensure_column(column))
		} else {
			table.add_column(column)
		}
	}
}

fn embeddable_of<'d>(cx: HierarchyContext<'d>, attribute: &AttributeMetadata) -> Result<&'d Arc<ManagedType>, BindingError> {
	let type_name = attribute.member().type_name();
	cx.domain
		.managed_type(type_name)
		.filter(|ty| ty.category() == Category::Embeddable)
		.ok_or_else(|| BindingError::UnknownEmbeddable {
			attribute: attribute.qualified_name(),
			type_name: type_name.to_owned(),
		})
}

/// Explicit `@Convert`, else an auto-apply registration for the type.
fn converter_of(attribute: &AttributeMetadata, state: &BindingState) -> Option<Arc<str>> {
	if let Some(usage) = attribute.usage(&builtins().convert) {
		if bool_or_default(usage, "disableConversion") == Some(true) {
			return None;
		}
		if let Some(converter) = class_attribute(usage, "converter") {
			return Some(Arc::from(converter));
		}
	}
	state
		.globals
		.auto_apply_converter(attribute.member().type_name())
		.map(|c| c.converter.clone())
}

/// `GenerationType` constant of a `@GeneratedValue`, defaulting to `AUTO`.
pub(crate) fn generation_strategy(usage: &AnnotationUsage) -> Arc<str> {
	Arc::from(enum_or_default(usage, "strategy").unwrap_or("AUTO"))
}
