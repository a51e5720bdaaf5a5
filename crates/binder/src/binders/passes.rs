//! Deferred binding steps.
//!
//! Each constructor returns the closure queued on the
//! [`super::PassQueue`]. A closure answers [`Resolution::Pending`] while the
//! peer it needs (a primary key, the owning side of an association, a
//! parent's columns) is not bound yet, and `Err` when the peer can never
//! exist.

use std::sync::Arc;

use super::BindingState;
use crate::BindingError;
use crate::env::BindingEnvironment;
use crate::model::{BoundModel, CollectionBinding, CollectionElement, CollectionNature, ValueBinding};
use crate::naming::Identifier;
use crate::relational::{Column, ForeignKey, Table, TableId, TableReference, UniqueKey};
use crate::second_pass::Resolution;

type PassResult = Result<Resolution, BindingError>;

/// Table and primary key of a bound entity; `None` while the key is unset.
fn key_of(model: &BoundModel, entity: &str, attribute: &str) -> Result<Option<(TableId, Vec<Identifier>)>, BindingError> {
	let binding = model.entity(entity).ok_or_else(|| BindingError::UnknownTargetEntity {
		attribute: attribute.to_owned(),
		target: entity.to_owned(),
	})?;
	let key = model.table(binding.table).primary_key();
	if key.is_empty() {
		return Ok(None);
	}
	Ok(Some((binding.table, key.to_vec())))
}

/// Not-null columns referencing `key` on `referenced`, named by `name`.
fn referencing_columns(
	model: &BoundModel,
	env: &BindingEnvironment,
	referenced: TableId,
	key: &[Identifier],
	name: impl Fn(&str) -> String,
) -> Vec<Column> {
	let table = model.table(referenced);
	key.iter()
		.map(|column| Column {
			java_type: table.column(column).and_then(|c| c.java_type.clone()),
			..Column::new(env.column_name(&name(column.text()))).not_null()
		})
		.collect()
}

/// Adds every column or none of them.
fn add_all(table: &mut Table, columns: Vec<Column>) -> Result<Vec<Identifier>, BindingError> {
	table.check_columns(&columns)?;
	columns.into_iter().map(|column| table.add_column(column)).collect()
}

pub(super) struct ForeignKeyPass {
	pub(super) owner: Arc<str>,
	pub(super) attribute: String,
	pub(super) path: Vec<Arc<str>>,
	pub(super) table: TableId,
	pub(super) target: Arc<str>,
	pub(super) join_column: Option<Arc<str>>,
	pub(super) nullable: bool,
	pub(super) shared_table: bool,
	pub(super) env: BindingEnvironment,
}

/// Owning side of a to-one: foreign-key columns once the target has a key.
pub(super) fn foreign_key(pass: ForeignKeyPass) -> impl FnMut(&mut BindingState) -> PassResult + 'static {
	move |state| {
		let Some((target_table, target_key)) = key_of(&state.model, &pass.target, &pass.attribute)? else {
			return Ok(Resolution::Pending);
		};
		let path: Vec<&str> = pass.path.iter().map(|segment| &**segment).collect();
		let naming = pass.env.implicit_naming();
		let mut columns = referencing_columns(&state.model, &pass.env, target_table, &target_key, |referenced| {
			naming.join_column_name(&path, referenced)
		});
		if let (Some(explicit), [column]) = (&pass.join_column, columns.as_mut_slice()) {
			column.name = pass.env.column_name(explicit);
		}
		for column in &mut columns {
			column.nullable = pass.nullable;
		}

		let table = state.model.table_mut(pass.table);
		let added: Vec<Identifier> = if pass.shared_table {
			columns.into_iter().map(|column| table.ensure_column(column)).collect()
		} else {
			add_all(table, columns)?
		};
		table.add_foreign_key(ForeignKey {
			columns: added.clone(),
			referenced_table: target_table,
			referenced_columns: target_key,
		});
		table.columns_arrived();

		if let Some(binding) = state
			.model
			.entity_mut(&pass.owner)
			.and_then(|entity| entity.binding_at_path_mut(&pass.path))
			&& let ValueBinding::ToOne { columns, .. } = &mut binding.value
		{
			*columns = added;
		}
		Ok(Resolution::Resolved)
	}
}

pub(super) struct InverseToOnePass {
	pub(super) attribute: String,
	pub(super) target: Arc<str>,
	pub(super) mapped_by: Arc<str>,
}

/// Checks that a `mappedBy` one-to-one names an owning to-one on the target.
pub(super) fn inverse_to_one(pass: InverseToOnePass) -> impl FnMut(&mut BindingState) -> PassResult + 'static {
	move |state| {
		if state.model.entity(&pass.target).is_none() {
			return Err(BindingError::UnknownTargetEntity {
				attribute: pass.attribute.clone(),
				target: pass.target.to_string(),
			});
		}
		match state.model.attribute_of(&pass.target, &pass.mapped_by) {
			Some((_, binding)) if matches!(binding.value, ValueBinding::ToOne { mapped_by: None, .. }) => {
				Ok(Resolution::Resolved)
			}
			_ => Err(unknown_mapped_by(&pass.attribute, &pass.target, &pass.mapped_by)),
		}
	}
}

fn unknown_mapped_by(attribute: &str, target: &str, mapped_by: &str) -> BindingError {
	BindingError::UnknownMappedBy {
		attribute: attribute.to_owned(),
		target: target.to_owned(),
		mapped_by: mapped_by.to_owned(),
	}
}

pub(super) struct CollectionPass {
	pub(super) role: Arc<str>,
	pub(super) owner: Arc<str>,
	pub(super) owner_entity_name: Arc<str>,
	/// Attribute path joined with `_`, used for implicit names.
	pub(super) attribute: Arc<str>,
	pub(super) nature: CollectionNature,
	pub(super) element: CollectionElement,
	/// Element columns of an element collection, already named.
	pub(super) element_columns: Vec<Column>,
	pub(super) mapped_by: Option<Arc<str>>,
	pub(super) env: BindingEnvironment,
}

pub(super) fn collection(pass: CollectionPass) -> impl FnMut(&mut BindingState) -> PassResult + 'static {
	move |state| match (&pass.mapped_by, pass.nature) {
		(Some(mapped_by), CollectionNature::OneToMany) => pass.inverse_one_to_many(state, mapped_by),
		(Some(mapped_by), CollectionNature::ManyToMany) => pass.inverse_many_to_many(state, mapped_by),
		(_, CollectionNature::ElementCollection) => pass.collection_table(state),
		(None, _) => pass.join_table(state),
	}
}

impl CollectionPass {
	fn target(&self) -> &str {
		match &self.element {
			CollectionElement::Entity(name) | CollectionElement::Basic(name) | CollectionElement::Embeddable(name) => {
				name
			}
		}
	}

	fn finish(
		&self,
		state: &mut BindingState,
		table: TableId,
		key_columns: Vec<Identifier>,
		element_columns: Vec<Identifier>,
	) -> PassResult {
		state.model.insert_collection(CollectionBinding {
			role: self.role.clone(),
			owner: self.owner.clone(),
			nature: self.nature,
			element: self.element.clone(),
			table,
			key_columns,
			element_columns,
			mapped_by: self.mapped_by.clone(),
		});
		Ok(Resolution::Resolved)
	}

	/// Keyed by the target's foreign key to the owner.
	fn inverse_one_to_many(&self, state: &mut BindingState, mapped_by: &str) -> PassResult {
		let target = self.target();
		if state.model.entity(target).is_none() {
			return Err(BindingError::UnknownTargetEntity {
				attribute: self.role.to_string(),
				target: target.to_owned(),
			});
		}
		let (table, columns) = match state.model.attribute_of(target, mapped_by) {
			Some((declaring, binding)) => match &binding.value {
				ValueBinding::ToOne {
					columns,
					mapped_by: None,
					..
				} => (declaring.table, columns.clone()),
				_ => return Err(unknown_mapped_by(&self.role, target, mapped_by)),
			},
			None => return Err(unknown_mapped_by(&self.role, target, mapped_by)),
		};
		if columns.is_empty() {
			return Ok(Resolution::Pending);
		}
		self.finish(state, table, columns, Vec::new())
	}

	/// Mirrors the owning side's join table.
	fn inverse_many_to_many(&self, state: &mut BindingState, mapped_by: &str) -> PassResult {
		let target = self.target();
		let owning_role = match state.model.attribute_of(target, mapped_by) {
			Some((_, binding)) => match &binding.value {
				ValueBinding::Plural { role } => role.clone(),
				_ => return Err(unknown_mapped_by(&self.role, target, mapped_by)),
			},
			None if state.model.entity(target).is_none() => {
				return Err(BindingError::UnknownTargetEntity {
					attribute: self.role.to_string(),
					target: target.to_owned(),
				});
			}
			None => return Err(unknown_mapped_by(&self.role, target, mapped_by)),
		};
		let Some(owning) = state.model.collection(&owning_role) else {
			return Ok(Resolution::Pending);
		};
		if owning.mapped_by.is_some() {
			return Err(unknown_mapped_by(&self.role, target, mapped_by));
		}
		let (table, keys, elements) = (owning.table, owning.element_columns.clone(), owning.key_columns.clone());
		self.finish(state, table, keys, elements)
	}

	fn join_table(&self, state: &mut BindingState) -> PassResult {
		let Some((owner_table, owner_key)) = key_of(&state.model, &self.owner, &self.role)? else {
			return Ok(Resolution::Pending);
		};
		let Some((target_table, target_key)) = key_of(&state.model, self.target(), &self.role)? else {
			return Ok(Resolution::Pending);
		};

		let naming = self.env.implicit_naming();
		let logical = naming.join_table_name(
			state.model.table(owner_table).name().text(),
			state.model.table(target_table).name().text(),
		);
		let namespace = state.model.table(owner_table).namespace().clone();
		let keys = referencing_columns(&state.model, &self.env, owner_table, &owner_key, |referenced| {
			naming.owner_key_column_name(&self.owner_entity_name, referenced)
		});
		let elements = referencing_columns(&state.model, &self.env, target_table, &target_key, |referenced| {
			naming.join_column_name(&[&*self.attribute], referenced)
		});

		let mut table = state
			.model
			.detached_table(namespace, self.env.table_name(&logical), TableReference::Physical);
		let keys = add_all(&mut table, keys)?;
		let elements = add_all(&mut table, elements)?;
		table.add_foreign_key(ForeignKey {
			columns: keys.clone(),
			referenced_table: owner_table,
			referenced_columns: owner_key,
		});
		table.add_foreign_key(ForeignKey {
			columns: elements.clone(),
			referenced_table: target_table,
			referenced_columns: target_key,
		});
		match self.nature {
			CollectionNature::ManyToMany => table.set_primary_key(keys.iter().chain(&elements).cloned().collect()),
			CollectionNature::OneToMany | CollectionNature::ElementCollection => table.add_unique_key(UniqueKey {
				columns: elements.clone(),
			}),
		}
		let id = state.model.attach_table(table);
		self.finish(state, id, keys, elements)
	}

	fn collection_table(&self, state: &mut BindingState) -> PassResult {
		let Some((owner_table, owner_key)) = key_of(&state.model, &self.owner, &self.role)? else {
			return Ok(Resolution::Pending);
		};

		let naming = self.env.implicit_naming();
		let logical = naming.collection_table_name(&self.owner_entity_name, &self.attribute);
		let namespace = state.model.table(owner_table).namespace().clone();
		let keys = referencing_columns(&state.model, &self.env, owner_table, &owner_key, |referenced| {
			naming.owner_key_column_name(&self.owner_entity_name, referenced)
		});

		let mut table = state
			.model
			.detached_table(namespace, self.env.table_name(&logical), TableReference::Physical);
		let keys = add_all(&mut table, keys)?;
		let elements = add_all(&mut table, self.element_columns.clone())?;
		table.add_foreign_key(ForeignKey {
			columns: keys.clone(),
			referenced_table: owner_table,
			referenced_columns: owner_key,
		});
		let id = state.model.attach_table(table);
		self.finish(state, id, keys, elements)
	}
}

pub(super) struct JoinedKeyPass {
	pub(super) child: Arc<str>,
	pub(super) parent: Arc<str>,
	pub(super) table: TableId,
	/// `@PrimaryKeyJoinColumn(name)` for a single-column key.
	pub(super) explicit_column: Option<Arc<str>>,
	pub(super) env: BindingEnvironment,
}

/// Joined subclass: primary key columns referencing the parent's key.
pub(super) fn joined_primary_key(pass: JoinedKeyPass) -> impl FnMut(&mut BindingState) -> PassResult + 'static {
	move |state| {
		let Some((parent_table, parent_key)) = key_of(&state.model, &pass.parent, &pass.child)? else {
			return Ok(Resolution::Pending);
		};
		let mut columns =
			referencing_columns(&state.model, &pass.env, parent_table, &parent_key, str::to_owned);
		for (column, referenced) in columns.iter_mut().zip(&parent_key) {
			column.name = referenced.clone();
		}
		if let (Some(explicit), [column]) = (&pass.explicit_column, columns.as_mut_slice()) {
			column.name = pass.env.column_name(explicit);
		}

		let table = state.model.table_mut(pass.table);
		let key = add_all(table, columns)?;
		table.set_primary_key(key.clone());
		table.add_foreign_key(ForeignKey {
			columns: key,
			referenced_table: parent_table,
			referenced_columns: parent_key,
		});
		Ok(Resolution::Resolved)
	}
}

pub(super) struct UnionCopyPass {
	pub(super) child: Arc<str>,
	pub(super) parent: Arc<str>,
	pub(super) table: TableId,
}

/// Union subclass: repeats every parent column once the parent table is
/// complete.
pub(super) fn union_columns(pass: UnionCopyPass) -> impl FnMut(&mut BindingState) -> PassResult + 'static {
	move |state| {
		let parent = state
			.model
			.entity(&pass.parent)
			.ok_or_else(|| BindingError::UnknownTargetEntity {
				attribute: pass.child.to_string(),
				target: pass.parent.to_string(),
			})?;
		let parent_table = state.model.table(parent.table);
		if parent_table.has_pending_columns() || parent_table.primary_key().is_empty() {
			return Ok(Resolution::Pending);
		}
		let columns = parent_table.columns().to_vec();
		let key = parent_table.primary_key().to_vec();

		let table = state.model.table_mut(pass.table);
		for column in columns {
			table.ensure_column(column);
		}
		table.set_primary_key(key);
		table.columns_arrived();
		Ok(Resolution::Resolved)
	}
}

/// Primary key of a root whose identifier includes a to-one.
pub(super) fn identifier_key(entity: Arc<str>, table: TableId) -> impl FnMut(&mut BindingState) -> PassResult + 'static {
	move |state| {
		let Some(identifier) = state.model.entity(&entity).and_then(|e| e.identifier.as_ref()) else {
			return Ok(Resolution::Pending);
		};
		if identifier.attributes.iter().any(|a| a.has_pending_columns()) {
			return Ok(Resolution::Pending);
		}
		let columns = identifier.columns();
		state.model.table_mut(table).set_primary_key(columns);
		Ok(Resolution::Resolved)
	}
}
