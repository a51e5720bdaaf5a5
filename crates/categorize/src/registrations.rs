//! Global registrations: generators, converters, java-type descriptors and
//! filter definitions.
//!
//! These are declared on arbitrary classes (or their members) but apply to the
//! whole model, so they are collected from every input class before any
//! hierarchy is bound. Collection keeps declaration order; duplicate and
//! dangling-reference checks happen when the binder builds its lookup tables.

use std::sync::Arc;

use strata_models::annotations::{
	AnnotationTarget, AnnotationUsage, AttributeValue, attribute_or_default, bool_or_default, builtins, int_or_default,
	names, string_or_default,
};
use strata_models::ClassDetails;

use crate::CategorizeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorKind {
	Sequence {
		sequence_name: Option<Arc<str>>,
		catalog: Option<Arc<str>>,
		schema: Option<Arc<str>>,
		initial_value: i64,
		allocation_size: i64,
	},
	Table {
		table: Option<Arc<str>>,
		pk_column_name: Option<Arc<str>>,
		value_column_name: Option<Arc<str>>,
		pk_column_value: Option<Arc<str>>,
		initial_value: i64,
		allocation_size: i64,
	},
	/// A named strategy or implementation class.
	Generic { strategy: Arc<str> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorRegistration {
	pub name: Arc<str>,
	pub kind: GeneratorKind,
	/// Where the registration was declared.
	pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterRegistration {
	pub converter: Arc<str>,
	/// Domain type the converter handles; `None` lets the binder infer it.
	pub domain_type: Option<Arc<str>>,
	pub auto_apply: bool,
	pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaTypeRegistration {
	pub java_type: Arc<str>,
	pub descriptor: Arc<str>,
	pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParameter {
	pub name: Arc<str>,
	pub type_name: Arc<str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDefRegistration {
	pub name: Arc<str>,
	pub default_condition: Option<Arc<str>>,
	pub parameters: Vec<FilterParameter>,
	pub source: String,
}

#[derive(Debug, Clone, Default)]
pub struct GlobalRegistrations {
	generators: Vec<GeneratorRegistration>,
	converters: Vec<ConverterRegistration>,
	java_types: Vec<JavaTypeRegistration>,
	filter_defs: Vec<FilterDefRegistration>,
}

impl GlobalRegistrations {
	pub fn generators(&self) -> &[GeneratorRegistration] {
		&self.generators
	}

	pub fn converters(&self) -> &[ConverterRegistration] {
		&self.converters
	}

	pub fn java_types(&self) -> &[JavaTypeRegistration] {
		&self.java_types
	}

	pub fn filter_defs(&self) -> &[FilterDefRegistration] {
		&self.filter_defs
	}

	pub fn is_empty(&self) -> bool {
		self.generators.is_empty()
			&& self.converters.is_empty()
			&& self.java_types.is_empty()
			&& self.filter_defs.is_empty()
	}

	/// Collects every registration declared on `class` and its members.
	pub(crate) fn collect(&mut self, class: &ClassDetails) -> Result<(), CategorizeError> {
		self.collect_generators(class)?;

		let b = builtins();
		let location = class.location();
		let usages = class.local_usages();
		for usage in usages.repeated(&b.converter_registration) {
			self.converters.push(ConverterRegistration {
				converter: required_class(&usage, "converter", &location)?,
				domain_type: class_or_default(&usage, "domainType").map(Arc::from),
				auto_apply: bool_or_default(&usage, "autoApply").unwrap_or(true),
				source: location.clone(),
			});
		}
		for usage in usages.repeated(&b.java_type_registration) {
			self.java_types.push(JavaTypeRegistration {
				java_type: required_class(&usage, "javaType", &location)?,
				descriptor: required_class(&usage, "descriptorClass", &location)?,
				source: location.clone(),
			});
		}
		for usage in usages.repeated(&b.filter_def) {
			let parameters = usage
				.nested("parameters")
				.into_iter()
				.map(|param| {
					Ok(FilterParameter {
						name: required_str(param, "name", &location)?,
						type_name: required_class(param, "type", &location)?,
					})
				})
				.collect::<Result<_, CategorizeError>>()?;
			self.filter_defs.push(FilterDefRegistration {
				name: required_str(&usage, "name", &location)?,
				default_condition: string_or_default(&usage, "defaultCondition").map(Arc::from),
				parameters,
				source: location.clone(),
			});
		}
		Ok(())
	}

	fn collect_generators(&mut self, class: &ClassDetails) -> Result<(), CategorizeError> {
		self.collect_generators_on(class, class.location())?;
		for member in class.fields().iter().chain(class.methods()) {
			self.collect_generators_on(&**member, member.location())?;
		}
		Ok(())
	}

	fn collect_generators_on(&mut self, target: &dyn AnnotationTarget, location: String) -> Result<(), CategorizeError> {
		let b = builtins();
		let usages = target.local_usages();
		for usage in usages.repeated(&b.sequence_generator) {
			self.generators.push(GeneratorRegistration {
				name: required_str(&usage, "name", &location)?,
				kind: GeneratorKind::Sequence {
					sequence_name: string_or_default(&usage, "sequenceName").map(Arc::from),
					catalog: string_or_default(&usage, "catalog").map(Arc::from),
					schema: string_or_default(&usage, "schema").map(Arc::from),
					initial_value: int_or_default(&usage, "initialValue").unwrap_or(1),
					allocation_size: int_or_default(&usage, "allocationSize").unwrap_or(50),
				},
				source: location.clone(),
			});
		}
		for usage in usages.repeated(&b.table_generator) {
			self.generators.push(GeneratorRegistration {
				name: required_str(&usage, "name", &location)?,
				kind: GeneratorKind::Table {
					table: string_or_default(&usage, "table").map(Arc::from),
					pk_column_name: string_or_default(&usage, "pkColumnName").map(Arc::from),
					value_column_name: string_or_default(&usage, "valueColumnName").map(Arc::from),
					pk_column_value: string_or_default(&usage, "pkColumnValue").map(Arc::from),
					initial_value: int_or_default(&usage, "initialValue").unwrap_or(0),
					allocation_size: int_or_default(&usage, "allocationSize").unwrap_or(50),
				},
				source: location.clone(),
			});
		}
		for usage in usages.repeated(&b.generic_generator) {
			let strategy = class_or_default(&usage, "type")
				.or_else(|| string_or_default(&usage, "strategy"))
				.ok_or_else(|| CategorizeError::invalid("GenericGenerator.strategy", "", location.clone()))?;
			self.generators.push(GeneratorRegistration {
				name: required_str(&usage, "name", &location)?,
				kind: GeneratorKind::Generic {
					strategy: Arc::from(strategy),
				},
				source: location.clone(),
			});
		}
		Ok(())
	}
}

/// A class-valued attribute, treating `void` as unset.
pub(crate) fn class_or_default<'a>(usage: &'a AnnotationUsage, name: &str) -> Option<&'a str> {
	attribute_or_default(usage, name)
		.and_then(AttributeValue::as_class)
		.filter(|c| *c != names::VOID)
}

fn required_class(usage: &AnnotationUsage, name: &'static str, location: &str) -> Result<Arc<str>, CategorizeError> {
	class_or_default(usage, name)
		.map(Arc::from)
		.ok_or_else(|| CategorizeError::invalid(name, "", location.to_owned()))
}

fn required_str(usage: &AnnotationUsage, name: &'static str, location: &str) -> Result<Arc<str>, CategorizeError> {
	string_or_default(usage, name)
		.map(Arc::from)
		.ok_or_else(|| CategorizeError::invalid(name, "", location.to_owned()))
}
