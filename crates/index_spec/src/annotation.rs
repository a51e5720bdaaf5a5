use serde::{Deserialize, Serialize};

/// One annotation occurrence with its explicitly declared values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSpec {
	pub type_name: String,
	#[serde(default)]
	pub values: Vec<AnnotationValueSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationValueSpec {
	pub name: String,
	pub value: ValueSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueSpec {
	Bool(bool),
	Int(i64),
	Double(f64),
	String(String),
	Class(String),
	Enum { type_name: String, constant: String },
	Nested(AnnotationSpec),
	Array(Vec<ValueSpec>),
}
