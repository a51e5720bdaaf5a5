//! Class graph in, relational model out, through the public API only.

use std::error::Error;

use pretty_assertions::assert_eq;
use rstest::rstest;
use strata_binder::{
	BindingCoordinator, BindingEnvironment, BindingError, BootstrapSettings, BoundModel, PhysicalNaming, SchemaSink,
	ValueBinding,
};
use strata_categorize::{Categorizer, IdMapping};
use strata_models::annotations::names;
use strata_models::source::{AnnotationShape, DefinedClass, InMemoryClassLoader, LoadedClass, MemberShape};
use strata_models::{MetadataRegistry, TypeRef};

use heck as _;
use indexmap as _;
use rustc_hash as _;
use serde as _;
use thiserror as _;
use toml as _;
use tracing as _;

fn versioned(class_name: &str, table: &str) -> DefinedClass {
	DefinedClass::new(class_name)
		.annotated(AnnotationShape::new(names::ENTITY))
		.annotated(AnnotationShape::new(names::TABLE).with_str("name", table))
		.field(MemberShape::field("id", TypeRef::new("long")).annotated(AnnotationShape::new(names::ID)))
		.field(MemberShape::field("version", TypeRef::new("int")).annotated(AnnotationShape::new(names::VERSION)))
}

fn registry(classes: Vec<DefinedClass>) -> (MetadataRegistry, Vec<String>) {
	let names = classes.iter().map(|c| c.name().to_owned()).collect();
	let mut loader = InMemoryClassLoader::new();
	for class in classes {
		loader.add(class);
	}
	(MetadataRegistry::live(loader), names)
}

fn bind(settings: BootstrapSettings, classes: Vec<DefinedClass>) -> Result<BoundModel, BindingError> {
	let (registry, names) = registry(classes);
	BindingCoordinator::new(BindingEnvironment::from_settings(settings)).bind_classes(&registry, &names)
}

#[test]
fn one_versioned_entity_yields_one_hierarchy() {
	let (registry, names) = registry(vec![versioned("app.Account", "t1")]);
	let domain = Categorizer::new(&registry).categorize(&names).unwrap();

	let [hierarchy] = domain.hierarchies() else {
		panic!("expected exactly one hierarchy");
	};
	let IdMapping::Basic { attribute } = hierarchy.id_mapping() else {
		panic!("expected a basic id");
	};
	assert_eq!(attribute.name(), "id");
	assert_eq!(hierarchy.version().map(|v| v.name()), Some("version"));

	let model = BindingCoordinator::default().coordinate(&domain).unwrap();
	let account = model.entity("app.Account").unwrap();
	let table = model.table(account.table);
	assert_eq!(table.name().text(), "t1");
	let key: Vec<&str> = table.primary_key().iter().map(|c| c.text()).collect();
	assert_eq!(key, vec!["id"]);
	assert!(matches!(
		&account.version.as_ref().unwrap().value,
		ValueBinding::Basic { column, .. } if column.text() == "version"
	));
	assert_eq!(model.convergence().resolved(), 0);
}

#[rstest]
#[case(PhysicalNaming::Standard, "t1", "t1")]
#[case(PhysicalNaming::SnakeCase, "t1", "t1")]
#[case(PhysicalNaming::Standard, "OrderLine", "OrderLine")]
#[case(PhysicalNaming::SnakeCase, "OrderLine", "order_line")]
fn table_name_follows_the_physical_strategy(
	#[case] physical_naming: PhysicalNaming,
	#[case] declared: &str,
	#[case] expected: &str,
) {
	let settings = BootstrapSettings {
		physical_naming,
		..Default::default()
	};
	let model = bind(settings, vec![versioned("app.Account", declared)]).unwrap();
	let account = model.entity("app.Account").unwrap();
	assert_eq!(model.table(account.table).name().text(), expected);
}

#[test]
fn global_quoting_quotes_every_table() {
	let settings = BootstrapSettings {
		globally_quoted_identifiers: true,
		..Default::default()
	};
	let model = bind(settings, vec![versioned("app.Account", "t1")]).unwrap();
	let table = model.table_named("t1").unwrap();
	assert!(table.name().is_quoted());
	assert_eq!(table.name().to_string(), "\"t1\"");
}

#[test]
fn default_schema_qualifies_tables() {
	let settings = BootstrapSettings::from_toml_str("default_schema = \"app\"").unwrap();
	let model = bind(settings, vec![versioned("app.Account", "t1")]).unwrap();
	assert_eq!(model.table_named("t1").unwrap().qualified_name(), "app.t1");
}

#[derive(Default)]
struct RecordingSink {
	tables: Vec<String>,
}

impl SchemaSink for RecordingSink {
	fn accept(&mut self, model: &BoundModel) -> Result<(), Box<dyn Error + Send + Sync>> {
		self.tables = model.tables().iter().map(|t| t.qualified_name()).collect();
		Ok(())
	}
}

struct RejectingSink;

impl SchemaSink for RejectingSink {
	fn accept(&mut self, _model: &BoundModel) -> Result<(), Box<dyn Error + Send + Sync>> {
		Err("schema export disabled".into())
	}
}

#[test]
fn sink_receives_the_converged_model() {
	let (registry, names) = registry(vec![versioned("app.Account", "t1"), versioned("app.Ledger", "t2")]);
	let domain = Categorizer::new(&registry).categorize(&names).unwrap();

	let mut sink = RecordingSink::default();
	BindingCoordinator::default().coordinate_into(&domain, &mut sink).unwrap();
	assert_eq!(sink.tables, vec!["t1", "t2"]);

	let err = BindingCoordinator::default()
		.coordinate_into(&domain, &mut RejectingSink)
		.unwrap_err();
	assert!(matches!(err, BindingError::Sink(_)));
	assert!(err.to_string().contains("schema export disabled"));
}
