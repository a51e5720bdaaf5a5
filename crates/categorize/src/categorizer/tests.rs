use pretty_assertions::assert_eq;
use strata_models::annotations::names;
use strata_models::source::{DefinedClass, ValueShape};

use super::*;
use crate::managed::{AttributeContainer, AttributeNature};
use crate::registrations::{FilterParameter, GeneratorKind};
use crate::test_fixtures::*;

fn order_model() -> Vec<DefinedClass> {
	vec![
		entity("shop.RushOrder").extends("shop.Order"),
		entity("shop.Order")
			.field(id("id"))
			.field(field("total", "java.math.BigDecimal"))
			.field(field("address", "shop.Address"))
			.field(field("customer", "shop.Customer").annotated(ann(names::MANY_TO_ONE)))
			.field(field("lines", "java.util.List").annotated(ann(names::ONE_TO_MANY).with_str("mappedBy", "order")))
			.field(field("scratch", "java.lang.String").annotated(ann(names::TRANSIENT))),
		entity("shop.Customer").annotated(ann(names::ENTITY).with_str("name", "Client")).field(id("id")),
		DefinedClass::new("shop.Address")
			.annotated(ann(names::EMBEDDABLE))
			.field(field("street", "java.lang.String")),
	]
}

#[test]
fn classes_group_under_their_topmost_entity() {
	let model = categorize(order_model()).unwrap();

	let roots: Vec<&str> = model.hierarchies().iter().map(|h| h.root().name()).collect();
	assert_eq!(roots, vec!["shop.Order", "shop.Customer"]);
	assert_eq!(model.hierarchy_of("shop.RushOrder").map(|h| h.root().name()), Some("shop.Order"));
	assert!(model.hierarchy_of("shop.Address").is_none());
}

#[test]
fn attributes_are_classified_by_nature() {
	let model = categorize(order_model()).unwrap();
	let order = model.managed_type("shop.Order").unwrap();

	let natures: Vec<(&str, AttributeNature)> = order.attributes().iter().map(|a| (a.name(), a.nature())).collect();
	assert_eq!(
		natures,
		vec![
			("id", AttributeNature::Basic),
			("total", AttributeNature::Basic),
			("address", AttributeNature::Embedded),
			("customer", AttributeNature::ToOne),
			("lines", AttributeNature::Plural),
		]
	);
}

#[test]
fn entity_names_default_to_the_simple_class_name() {
	let model = categorize(order_model()).unwrap();
	assert_eq!(model.managed_type("shop.Order").unwrap().entity_name(), Some("Order"));
	assert_eq!(model.entity_by_name("Client").map(|t| t.name()), Some("shop.Customer"));
	assert_eq!(model.managed_type("shop.Address").unwrap().entity_name(), None);
}

#[test]
fn duplicate_entity_names_are_rejected() {
	let err = categorize(vec![
		entity("a.Item").field(id("id")),
		entity("b.Item").field(id("id")),
	])
	.unwrap_err();
	assert!(matches!(err, CategorizeError::DuplicateEntityName { ref name, .. } if name == "Item"));
}

#[test]
fn two_categories_on_one_class_conflict() {
	let err = categorize(vec![entity("a.Odd").annotated(ann(names::EMBEDDABLE)).field(id("id"))]).unwrap_err();
	assert!(matches!(err, CategorizeError::ConflictingCategory { .. }), "{err}");
}

#[test]
fn id_on_getter_selects_property_access() {
	let model = categorize(vec![
		entity("a.Person")
			.field(field("name", "java.lang.String"))
			.method(getter("getId", "long").annotated(ann(names::ID)))
			.method(getter("getName", "java.lang.String"))
			.method(getter("isRetired", "boolean")),
	])
	.unwrap();
	let hierarchy = &model.hierarchies()[0];

	assert_eq!(hierarchy.access(), AccessType::Property);
	let names: Vec<&str> = hierarchy.root().attributes().iter().map(|a| a.name()).collect();
	assert_eq!(names, vec!["id", "name", "retired"]);
}

#[test]
fn explicit_access_selects_the_member_kind() {
	let model = categorize(vec![
		DefinedClass::new("a.Money")
			.annotated(ann(names::EMBEDDABLE))
			.annotated(ann(names::ACCESS).with("value", ValueShape::enum_constant(names::ACCESS_TYPE, "PROPERTY")))
			.field(field("cents", "long"))
			.method(getter("getAmount", "long"))
			.method(getter("getCurrency", "java.lang.String")),
	])
	.unwrap();
	let money = model.managed_type("a.Money").unwrap();

	assert_eq!(money.access(), AccessType::Property);
	let names: Vec<&str> = money.attributes().iter().map(|a| a.name()).collect();
	assert_eq!(names, vec!["amount", "currency"]);
}

#[test]
fn embeddables_and_stray_mapped_superclasses_are_kept() {
	let model = categorize(vec![
		DefinedClass::new("a.Money")
			.annotated(ann(names::EMBEDDABLE))
			.field(field("amount", "long")),
		DefinedClass::new("a.Auditable")
			.annotated(ann(names::MAPPED_SUPERCLASS))
			.field(field("created", "long")),
	])
	.unwrap();

	assert!(model.hierarchies().is_empty());
	let embeddables: Vec<&str> = model.embeddables().map(|t| t.name()).collect();
	assert_eq!(embeddables, vec!["a.Money"]);
	let strays: Vec<&str> = model.stray_mapped_superclasses().map(|t| t.name()).collect();
	assert_eq!(strays, vec!["a.Auditable"]);
	assert!(model.managed_type("a.Money").unwrap().find_attribute("amount").is_some());
}

#[test]
fn registrations_come_from_every_input_class() {
	let model = categorize(vec![
		DefinedClass::new("a.Registrations")
			.annotated(
				ann(names::SEQUENCE_GENERATOR)
					.with_str("name", "order_seq")
					.with_str("sequenceName", "orders_sequence"),
			)
			.annotated(
				ann(names::FILTER_DEF).with_str("name", "byRegion").with(
					"parameters",
					ValueShape::Array(vec![ValueShape::Annotation(
						ann(names::PARAM_DEF)
							.with_str("name", "region")
							.with("type", class_value("java.lang.String")),
					)]),
				),
			)
			.annotated(
				ann(names::CONVERTER_REGISTRATIONS).with(
					"value",
					ValueShape::Array(vec![
						ValueShape::Annotation(ann(names::CONVERTER_REGISTRATION).with("converter", class_value("a.YesNo"))),
						ValueShape::Annotation(
							ann(names::CONVERTER_REGISTRATION)
								.with("converter", class_value("a.Cents"))
								.with("domainType", class_value("a.Money"))
								.with("autoApply", ValueShape::Bool(false)),
						),
					]),
				),
			),
		entity("a.Ticket").field(
			id("id").annotated(ann(names::GENERIC_GENERATOR).with_str("name", "uuid").with_str("strategy", "uuid2")),
		),
	])
	.unwrap();
	let registrations = model.registrations();

	let generators: Vec<(&str, &GeneratorKind)> =
		registrations.generators().iter().map(|g| (&*g.name, &g.kind)).collect();
	assert_eq!(generators.len(), 2);
	assert_eq!(generators[0].0, "order_seq");
	assert!(matches!(
		generators[0].1,
		GeneratorKind::Sequence { sequence_name: Some(s), initial_value: 1, allocation_size: 50, .. } if &**s == "orders_sequence"
	));
	assert_eq!(generators[1].0, "uuid");
	assert_eq!(generators[1].1, &GeneratorKind::Generic { strategy: "uuid2".into() });
	assert_eq!(registrations.generators()[1].source, "field `id` of `a.Ticket`");

	let filter = &registrations.filter_defs()[0];
	assert_eq!(&*filter.name, "byRegion");
	assert_eq!(
		filter.parameters,
		vec![FilterParameter {
			name: "region".into(),
			type_name: "java.lang.String".into(),
		}]
	);
	assert_eq!(filter.default_condition, None);

	let converters: Vec<(&str, Option<&str>, bool)> = registrations
		.converters()
		.iter()
		.map(|c| (&*c.converter, c.domain_type.as_deref(), c.auto_apply))
		.collect();
	assert_eq!(converters, vec![("a.YesNo", None, true), ("a.Cents", Some("a.Money"), false)]);
}
