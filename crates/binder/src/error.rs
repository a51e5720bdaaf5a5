use strata_categorize::CategorizeError;
use strata_models::ModelsError;
use thiserror::Error;

use crate::second_pass::ConvergenceFailure;

#[derive(Debug, Error)]
pub enum BindingError {
	#[error(transparent)]
	Models(#[from] ModelsError),
	#[error(transparent)]
	Categorize(#[from] CategorizeError),
	#[error(transparent)]
	Convergence(#[from] ConvergenceFailure),
	#[error("{kind} `{name}` is registered twice: {first} and {second}")]
	DuplicateRegistration {
		kind: &'static str,
		name: String,
		first: String,
		second: String,
	},
	#[error("unknown id generator `{name}` referenced by `{attribute}`")]
	UnknownGenerator { name: String, attribute: String },
	#[error("unknown filter `{name}` referenced by `{location}`")]
	UnknownFilter { name: String, location: String },
	#[error("`{attribute}` targets `{target}`, which is not a bound entity")]
	UnknownTargetEntity { attribute: String, target: String },
	#[error("`{attribute}` has type `{type_name}`, which is not an embeddable")]
	UnknownEmbeddable { attribute: String, type_name: String },
	#[error("`{attribute}` is mapped by `{target}.{mapped_by}`, which is not a to-one or collection attribute")]
	UnknownMappedBy {
		attribute: String,
		target: String,
		mapped_by: String,
	},
	#[error("`{attribute}`: cannot determine the element type of `{type_name}`")]
	UnknownElementType { attribute: String, type_name: String },
	#[error("table `{table}` of entity `{entity}` has no primary key")]
	MissingPrimaryKey { entity: String, table: String },
	#[error("entities `{first}` and `{second}` share discriminator value `{value}`")]
	DuplicateDiscriminator { value: String, first: String, second: String },
	#[error("{kind} `{name}` is defined twice on table `{table}`")]
	DuplicateColumn { kind: &'static str, name: String, table: String },
	#[error("schema sink rejected the bound model: {0}")]
	Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}
