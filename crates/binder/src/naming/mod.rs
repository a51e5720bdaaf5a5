//! Logical → physical identifier handling.
//!
//! # Mental Model
//!
//! - [`Identifier`]: a name plus its quoting flag. Backticks (or double quotes)
//!   around a declared name request quoting; the global quoting setting forces it.
//! - [`ImplicitNamingStrategy`]: invents logical names the mapping leaves out
//!   (entity tables, attribute columns, join and collection tables).
//! - [`PhysicalNamingStrategy`]: rewrites every logical name, explicit or
//!   implicit, into the name that reaches the schema.

use std::fmt;
use std::sync::Arc;

use heck::ToSnakeCase;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
	text: Arc<str>,
	quoted: bool,
}

impl Identifier {
	pub fn new(text: impl Into<Arc<str>>, quoted: bool) -> Self {
		Self {
			text: text.into(),
			quoted,
		}
	}

	/// Reads a declared name; surrounding backticks or double quotes mark it quoted.
	pub fn parse(text: &str) -> Self {
		let trimmed = text.trim();
		for (open, close) in [('`', '`'), ('"', '"')] {
			if let Some(inner) = trimmed.strip_prefix(open).and_then(|t| t.strip_suffix(close))
				&& !inner.is_empty()
			{
				return Self::new(inner, true);
			}
		}
		Self::new(trimmed, false)
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn is_quoted(&self) -> bool {
		self.quoted
	}

	pub fn quoted(self) -> Self {
		Self { quoted: true, ..self }
	}

	/// Same quoting, different text.
	pub fn with_text(&self, text: impl Into<Arc<str>>) -> Self {
		Self::new(text, self.quoted)
	}

	/// Unquoted names compare case-insensitively.
	pub fn matches(&self, other: &Identifier) -> bool {
		if self.quoted || other.quoted {
			self.text == other.text
		} else {
			self.text.eq_ignore_ascii_case(&other.text)
		}
	}
}

impl fmt::Display for Identifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.quoted {
			write!(f, "\"{}\"", self.text)
		} else {
			f.write_str(&self.text)
		}
	}
}

/// Final rewrite applied to every logical name. Defaults are the identity.
pub trait PhysicalNamingStrategy: Send + Sync + fmt::Debug {
	fn to_physical_catalog_name(&self, logical: Identifier) -> Identifier {
		logical
	}

	fn to_physical_schema_name(&self, logical: Identifier) -> Identifier {
		logical
	}

	fn to_physical_table_name(&self, logical: Identifier) -> Identifier {
		logical
	}

	fn to_physical_sequence_name(&self, logical: Identifier) -> Identifier {
		logical
	}

	fn to_physical_column_name(&self, logical: Identifier) -> Identifier {
		logical
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPhysicalNaming;

impl PhysicalNamingStrategy for StandardPhysicalNaming {}

/// `orderLine` → `order_line`. Quoted names are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCasePhysicalNaming;

impl SnakeCasePhysicalNaming {
	fn apply(logical: Identifier) -> Identifier {
		if logical.is_quoted() {
			return logical;
		}
		let snake = logical.text().to_snake_case();
		logical.with_text(snake)
	}
}

impl PhysicalNamingStrategy for SnakeCasePhysicalNaming {
	fn to_physical_catalog_name(&self, logical: Identifier) -> Identifier {
		Self::apply(logical)
	}

	fn to_physical_schema_name(&self, logical: Identifier) -> Identifier {
		Self::apply(logical)
	}

	fn to_physical_table_name(&self, logical: Identifier) -> Identifier {
		Self::apply(logical)
	}

	fn to_physical_sequence_name(&self, logical: Identifier) -> Identifier {
		Self::apply(logical)
	}

	fn to_physical_column_name(&self, logical: Identifier) -> Identifier {
		Self::apply(logical)
	}
}

/// Names for things the mapping does not name explicitly. Results are
/// logical; the physical strategy runs afterwards.
pub trait ImplicitNamingStrategy: Send + Sync + fmt::Debug {
	fn entity_table_name(&self, entity_name: &str) -> String {
		entity_name.to_owned()
	}

	/// `path` is the attribute path from the owning entity, outermost first.
	fn basic_column_name(&self, path: &[&str]) -> String;

	fn join_column_name(&self, attribute_path: &[&str], referenced_column: &str) -> String {
		format!("{}_{referenced_column}", attribute_path.join("_"))
	}

	fn join_table_name(&self, owner_table: &str, target_table: &str) -> String {
		format!("{owner_table}_{target_table}")
	}

	fn collection_table_name(&self, owner_entity: &str, attribute: &str) -> String {
		format!("{owner_entity}_{attribute}")
	}

	/// Key column of a join or collection table pointing back at its owner.
	fn owner_key_column_name(&self, owner_entity: &str, referenced_column: &str) -> String {
		format!("{owner_entity}_{referenced_column}")
	}

	fn discriminator_column_name(&self) -> String {
		"DTYPE".to_owned()
	}
}

/// Columns take the innermost attribute name.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpaImplicitNaming;

impl ImplicitNamingStrategy for JpaImplicitNaming {
	fn basic_column_name(&self, path: &[&str]) -> String {
		path.last().copied().unwrap_or_default().to_owned()
	}
}

/// Columns take the whole attribute path, so two embeddings of one type do
/// not collide.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentPathImplicitNaming;

impl ImplicitNamingStrategy for ComponentPathImplicitNaming {
	fn basic_column_name(&self, path: &[&str]) -> String {
		path.join("_")
	}
}

#[cfg(test)]
mod tests;
