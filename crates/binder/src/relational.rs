//! Relational nodes produced by binding.

use std::sync::Arc;

use crate::BindingError;
use crate::naming::Identifier;

/// Index of a [`Table`] in its [`crate::BoundModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub(crate) usize);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
	pub catalog: Option<Identifier>,
	pub schema: Option<Identifier>,
}

/// What a table node stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableReference {
	/// A physical table.
	Physical,
	/// A physical database view over `query`.
	View { query: Arc<str> },
	/// A subquery used in place of a table; never exported.
	InLineView { query: Arc<str> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
	pub name: Identifier,
	pub nullable: bool,
	pub unique: bool,
	pub length: Option<i64>,
	/// Declared type of the attribute the column stores.
	pub java_type: Option<Arc<str>>,
}

impl Column {
	pub fn new(name: Identifier) -> Self {
		Self {
			name,
			nullable: true,
			unique: false,
			length: None,
			java_type: None,
		}
	}

	pub fn not_null(mut self) -> Self {
		self.nullable = false;
		self
	}

	pub fn of_type(mut self, java_type: &str) -> Self {
		self.java_type = Some(Arc::from(java_type));
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
	pub columns: Vec<Identifier>,
	pub referenced_table: TableId,
	pub referenced_columns: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
	pub columns: Vec<Identifier>,
}

#[derive(Debug, Clone)]
pub struct Table {
	id: TableId,
	namespace: Namespace,
	name: Identifier,
	reference: TableReference,
	columns: Vec<Column>,
	primary_key: Vec<Identifier>,
	foreign_keys: Vec<ForeignKey>,
	unique_keys: Vec<UniqueKey>,
	/// Deferred work that will still add columns to this table.
	pending_columns: usize,
}

impl Table {
	pub(crate) fn new(id: TableId, namespace: Namespace, name: Identifier, reference: TableReference) -> Self {
		Self {
			id,
			namespace,
			name,
			reference,
			columns: Vec::new(),
			primary_key: Vec::new(),
			foreign_keys: Vec::new(),
			unique_keys: Vec::new(),
			pending_columns: 0,
		}
	}

	pub fn id(&self) -> TableId {
		self.id
	}

	pub fn namespace(&self) -> &Namespace {
		&self.namespace
	}

	pub fn name(&self) -> &Identifier {
		&self.name
	}

	/// `catalog.schema.name`, omitting absent parts.
	pub fn qualified_name(&self) -> String {
		[self.namespace.catalog.as_ref(), self.namespace.schema.as_ref(), Some(&self.name)]
			.into_iter()
			.flatten()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join(".")
	}

	pub fn reference(&self) -> &TableReference {
		&self.reference
	}

	pub fn is_exportable(&self) -> bool {
		!matches!(self.reference, TableReference::InLineView { .. })
	}

	pub fn columns(&self) -> &[Column] {
		&self.columns
	}

	pub fn column(&self, name: &Identifier) -> Option<&Column> {
		self.columns.iter().find(|c| c.name.matches(name))
	}

	pub fn column_named(&self, text: &str) -> Option<&Column> {
		self.columns.iter().find(|c| c.name.text() == text)
	}

	pub fn primary_key(&self) -> &[Identifier] {
		&self.primary_key
	}

	pub fn foreign_keys(&self) -> &[ForeignKey] {
		&self.foreign_keys
	}

	pub fn unique_keys(&self) -> &[UniqueKey] {
		&self.unique_keys
	}

	pub fn has_pending_columns(&self) -> bool {
		self.pending_columns > 0
	}

	/// Fails on the first of `columns` whose name is taken, either by this
	/// table or by an earlier entry of the batch. Nothing is added.
	pub(crate) fn check_columns(&self, columns: &[Column]) -> Result<(), BindingError> {
		for (i, column) in columns.iter().enumerate() {
			if self.column(&column.name).is_some() || columns[..i].iter().any(|c| c.name.matches(&column.name)) {
				return Err(BindingError::DuplicateColumn {
					kind: "column",
					name: column.name.to_string(),
					table: self.qualified_name(),
				});
			}
		}
		Ok(())
	}

	/// Adds a column; a second column with the same name is an error.
	pub(crate) fn add_column(&mut self, column: Column) -> Result<Identifier, BindingError> {
		if self.column(&column.name).is_some() {
			return Err(BindingError::DuplicateColumn {
				kind: "column",
				name: column.name.to_string(),
				table: self.qualified_name(),
			});
		}
		let name = column.name.clone();
		self.columns.push(column);
		Ok(name)
	}

	/// Adds a column unless one with the same name exists (single-table
	/// subclasses may share columns).
	pub(crate) fn ensure_column(&mut self, column: Column) -> Identifier {
		if let Some(existing) = self.column(&column.name) {
			return existing.name.clone();
		}
		let name = column.name.clone();
		self.columns.push(column);
		name
	}

	pub(crate) fn set_primary_key(&mut self, columns: Vec<Identifier>) {
		for column in &mut self.columns {
			if columns.iter().any(|pk| pk.matches(&column.name)) {
				column.nullable = false;
			}
		}
		self.primary_key = columns;
	}

	pub(crate) fn add_foreign_key(&mut self, key: ForeignKey) {
		self.foreign_keys.push(key);
	}

	pub(crate) fn add_unique_key(&mut self, key: UniqueKey) {
		if !self.unique_keys.contains(&key) {
			self.unique_keys.push(key);
		}
	}

	pub(crate) fn expect_columns(&mut self) {
		self.pending_columns += 1;
	}

	pub(crate) fn columns_arrived(&mut self) {
		self.pending_columns = self.pending_columns.saturating_sub(1);
	}
}
