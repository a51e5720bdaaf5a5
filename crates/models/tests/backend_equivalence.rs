//! The live and index backends must produce equivalent class metadata.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use strata_index_spec::compile::encode;
use strata_index_spec::{
	AnnotationSpec, AnnotationValueSpec, ClassIndexSpec, ClassKindSpec, ClassSpec, MemberKindSpec, MemberSpec, TypeSpec,
	ValueSpec, flags,
};
use strata_models::annotations::{AttributeValue, builtins, names};
use strata_models::source::{AnnotationShape, ClassIndex, DefinedClass, InMemoryClassLoader, MemberShape};
use strata_models::{ClassDetails, ClassDetailsLookup, MetadataRegistry, Modifiers, TypeRef};

use arc_swap as _;
use bitflags as _;
use indexmap as _;
use parking_lot as _;
use postcard as _;
use rustc_hash as _;
use thiserror as _;
use tracing as _;

const PERSON: &str = "com.acme.Person";
const PARTY: &str = "com.acme.Party";

fn annotation(type_name: &str, values: &[(&str, &str)]) -> AnnotationSpec {
	AnnotationSpec {
		type_name: type_name.to_owned(),
		values: values
			.iter()
			.map(|(name, value)| AnnotationValueSpec {
				name: (*name).to_owned(),
				value: ValueSpec::String((*value).to_owned()),
			})
			.collect(),
	}
}

fn member(kind: MemberKindSpec, name: &str, type_name: &str, flags: u16, annotations: Vec<AnnotationSpec>) -> MemberSpec {
	MemberSpec {
		kind,
		name: name.to_owned(),
		type_ref: TypeSpec::simple(type_name),
		parameters: Vec::new(),
		flags,
		annotations,
	}
}

fn index_registry() -> MetadataRegistry {
	let spec = ClassIndexSpec {
		classes: vec![
			ClassSpec {
				name: PERSON.to_owned(),
				kind: ClassKindSpec::Class,
				flags: 0,
				superclass: Some(PARTY.to_owned()),
				interfaces: Vec::new(),
				members: vec![
					member(
						MemberKindSpec::Field,
						"name",
						"java.lang.String",
						0,
						vec![annotation(names::COLUMN, &[("name", "full_name")])],
					),
					member(MemberKindSpec::Field, "cache", "java.util.Map", flags::TRANSIENT, Vec::new()),
					member(MemberKindSpec::Method, "getName", "java.lang.String", 0, Vec::new()),
				],
				annotations: vec![
					annotation(names::ENTITY, &[]),
					annotation(names::TABLE, &[("name", "people")]),
				],
			},
			ClassSpec {
				name: PARTY.to_owned(),
				kind: ClassKindSpec::Class,
				flags: flags::ABSTRACT,
				superclass: None,
				interfaces: Vec::new(),
				members: vec![member(
					MemberKindSpec::Field,
					"id",
					"long",
					0,
					vec![annotation(names::ID, &[])],
				)],
				annotations: vec![annotation(names::MAPPED_SUPERCLASS, &[])],
			},
		],
	};
	let bytes = encode(&spec).unwrap();
	MetadataRegistry::indexed(ClassIndex::from_bytes(&bytes).unwrap(), None)
}

fn live_registry() -> MetadataRegistry {
	let column = AnnotationShape::new(names::COLUMN).with_str("name", "full_name");
	let loader = InMemoryClassLoader::new()
		.with(
			DefinedClass::new(PERSON)
				.extends(PARTY)
				.annotated(AnnotationShape::new(names::ENTITY))
				.annotated(AnnotationShape::new(names::TABLE).with_str("name", "people"))
				.field(MemberShape::field("name", TypeRef::new("java.lang.String")).annotated(column))
				.field(MemberShape::field("cache", TypeRef::new("java.util.Map")).with_modifiers(Modifiers::TRANSIENT))
				.method(MemberShape::method("getName", TypeRef::new("java.lang.String"))),
		)
		.with(
			DefinedClass::new(PARTY)
				.modifiers(Modifiers::ABSTRACT)
				.annotated(AnnotationShape::new(names::MAPPED_SUPERCLASS))
				.field(MemberShape::field("id", TypeRef::new("long")).annotated(AnnotationShape::new(names::ID))),
		);
	MetadataRegistry::live(loader)
}

#[derive(Debug, PartialEq)]
struct Summary {
	superclass: Option<String>,
	is_abstract: bool,
	fields: Vec<(String, bool)>,
	methods: Vec<(String, bool)>,
	annotations: Vec<(String, Vec<(String, AttributeValue)>)>,
}

fn summarize(class: &Arc<ClassDetails>) -> Summary {
	use strata_models::annotations::AnnotationTarget;

	let mut annotations: Vec<_> = class
		.local_usages()
		.iter()
		.map(|u| {
			let attrs = u.attributes().iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
			(u.name().to_owned(), attrs)
		})
		.collect();
	annotations.sort_by(|a, b| a.0.cmp(&b.0));
	Summary {
		superclass: class.superclass_name().map(str::to_owned),
		is_abstract: class.is_abstract(),
		fields: class.fields().iter().map(|f| (f.name().to_owned(), f.is_persistable())).collect(),
		methods: class.methods().iter().map(|m| (m.name().to_owned(), m.is_persistable())).collect(),
		annotations,
	}
}

#[rstest]
#[case(PERSON)]
#[case(PARTY)]
fn backends_agree(#[case] name: &str) {
	let live = live_registry().resolve(name).unwrap();
	let indexed = index_registry().resolve(name).unwrap();
	assert_eq!(summarize(&live), summarize(&indexed));
}

#[test]
fn index_backend_builds_the_superclass_chain() {
	let registry = index_registry();
	let person = registry.resolve(PERSON).unwrap();
	let party = registry.resolve(PARTY).unwrap();
	assert!(Arc::ptr_eq(person.superclass().unwrap(), &party));
	assert_eq!(registry.direct_subclasses(PARTY), vec![Arc::<str>::from(PERSON)]);
	assert!(person.get_usage(&builtins().entity).is_some());
}

#[test]
fn duplicate_classes_are_rejected_at_compile_time() {
	let class = ClassSpec {
		name: PARTY.to_owned(),
		kind: ClassKindSpec::Class,
		flags: 0,
		superclass: None,
		interfaces: Vec::new(),
		members: Vec::new(),
		annotations: Vec::new(),
	};
	let spec = ClassIndexSpec {
		classes: vec![class.clone(), class],
	};
	assert!(encode(&spec).is_err());
}
