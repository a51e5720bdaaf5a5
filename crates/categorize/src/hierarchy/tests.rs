use pretty_assertions::assert_eq;
use rstest::rstest;
use strata_models::annotations::names;
use strata_models::source::{DefinedClass, ValueShape};

use super::*;
use crate::managed::AttributeContainer;
use crate::test_fixtures::*;
use crate::{CategorizedDomainModel, SharedCacheMode, SingularRole};

fn only_hierarchy(classes: Vec<DefinedClass>) -> CategorizedDomainModel {
	let model = categorize(classes).unwrap();
	assert_eq!(model.hierarchies().len(), 1);
	model
}

fn id_names(mapping: &IdMapping) -> Vec<&str> {
	mapping.attributes().iter().map(|a| a.name()).collect()
}

#[test]
fn single_id_field_is_basic() {
	let model = only_hierarchy(vec![entity("a.Book").field(id("id")).field(field("title", "java.lang.String"))]);
	let hierarchy = &model.hierarchies()[0];

	assert!(matches!(hierarchy.id_mapping(), IdMapping::Basic { .. }));
	assert_eq!(id_names(hierarchy.id_mapping()), vec!["id"]);
	assert!(hierarchy.id_mapping().id_class().is_none());
}

#[test]
fn embedded_id_is_aggregated_over_its_declared_type() {
	let model = only_hierarchy(vec![
		entity("a.Line").field(field("key", "a.LineKey").annotated(ann(names::EMBEDDED_ID))),
		DefinedClass::new("a.LineKey")
			.annotated(ann(names::EMBEDDABLE))
			.field(field("order", "long"))
			.field(field("position", "int")),
	]);
	let hierarchy = &model.hierarchies()[0];

	let IdMapping::Aggregated { attribute, id_class } = hierarchy.id_mapping() else {
		panic!("expected aggregated id, got {:?}", hierarchy.id_mapping());
	};
	assert_eq!(attribute.name(), "key");
	assert_eq!(id_class.name(), "a.LineKey");
}

#[test]
fn several_ids_with_id_class_are_non_aggregated() {
	let model = only_hierarchy(vec![
		entity("a.Line")
			.annotated(ann(names::ID_CLASS).with("value", class_value("a.LinePk")))
			.field(id("order"))
			.field(id("position"))
			.field(field("quantity", "int")),
		DefinedClass::new("a.LinePk").field(field("order", "long")).field(field("position", "long")),
	]);
	let hierarchy = &model.hierarchies()[0];

	let IdMapping::NonAggregated { attributes, id_class } = hierarchy.id_mapping() else {
		panic!("expected non-aggregated id, got {:?}", hierarchy.id_mapping());
	};
	let names: Vec<&str> = attributes.iter().map(|a| a.name()).collect();
	assert_eq!(names, vec!["order", "position"]);
	assert_eq!(id_class.name(), "a.LinePk");
}

#[test]
fn id_class_forces_non_aggregated_for_a_single_id() {
	let model = only_hierarchy(vec![
		entity("a.Tag")
			.annotated(ann(names::ID_CLASS).with("value", class_value("a.TagPk")))
			.field(id("code")),
		DefinedClass::new("a.TagPk").field(field("code", "long")),
	]);
	let hierarchy = &model.hierarchies()[0];
	assert!(matches!(hierarchy.id_mapping(), IdMapping::NonAggregated { .. }));
}

#[test]
fn composite_id_without_id_class_fails() {
	let err = categorize(vec![entity("a.Line").field(id("order")).field(id("position"))]).unwrap_err();
	assert!(matches!(err, CategorizeError::IdClassRequired { ref root, .. } if root == "a.Line"));
}

#[test]
fn unknown_id_class_fails_resolution() {
	let err = categorize(vec![
		entity("a.Line")
			.annotated(ann(names::ID_CLASS).with("value", class_value("a.Missing")))
			.field(id("order"))
			.field(id("position")),
	])
	.unwrap_err();
	assert!(matches!(err, CategorizeError::Models(strata_models::ModelsError::UnknownClass { .. })));
}

#[test]
fn id_and_embedded_id_conflict() {
	let err = categorize(vec![
		entity("a.Line")
			.field(id("id"))
			.field(field("key", "a.LineKey").annotated(ann(names::EMBEDDED_ID))),
		DefinedClass::new("a.LineKey").annotated(ann(names::EMBEDDABLE)),
	])
	.unwrap_err();
	assert!(matches!(err, CategorizeError::IdMappingConflict { .. }), "{err}");
}

#[test]
fn hierarchy_without_id_fails() {
	let err = categorize(vec![entity("a.Nameless").field(field("label", "java.lang.String"))]).unwrap_err();
	assert!(matches!(err, CategorizeError::MissingId { ref root } if root == "a.Nameless"));
}

#[test]
fn second_version_names_both_attributes_and_the_root() {
	let err = categorize(vec![
		DefinedClass::new("a.Audited")
			.annotated(ann(names::MAPPED_SUPERCLASS))
			.field(field("revision", "int").annotated(ann(names::VERSION))),
		entity("a.Invoice")
			.extends("a.Audited")
			.field(id("id"))
			.field(field("stamp", "long").annotated(ann(names::VERSION))),
	])
	.unwrap_err();

	let CategorizeError::HierarchyConflict {
		role,
		ref attribute,
		ref existing,
		ref root,
	} = err
	else {
		panic!("expected hierarchy conflict, got {err}");
	};
	assert_eq!(role, SingularRole::Version);
	assert_eq!(existing, "a.Audited.revision");
	assert_eq!(attribute, "a.Invoice.stamp");
	assert_eq!(root, "a.Invoice");
	let message = err.to_string();
	assert!(message.contains("a.Invoice.stamp") && message.contains("`a.Invoice`"), "{message}");
}

#[test]
fn second_tenant_id_in_a_subclass_conflicts() {
	let err = categorize(vec![
		entity("a.Account")
			.field(id("id"))
			.field(field("tenant", "java.lang.String").annotated(ann(names::TENANT_ID))),
		entity("a.SavingsAccount")
			.extends("a.Account")
			.field(field("owner", "java.lang.String").annotated(ann(names::TENANT_ID))),
	])
	.unwrap_err();
	assert!(matches!(
		err,
		CategorizeError::HierarchyConflict {
			role: SingularRole::TenantId,
			..
		}
	));
}

#[test]
fn version_tenant_and_natural_id_are_classified() {
	let model = only_hierarchy(vec![
		entity("a.Member")
			.field(id("id"))
			.field(field("version", "int").annotated(ann(names::VERSION)))
			.field(field("tenant", "java.lang.String").annotated(ann(names::TENANT_ID)))
			.field(field("email", "java.lang.String").annotated(ann(names::NATURAL_ID)))
			.field(
				field("handle", "java.lang.String")
					.annotated(ann(names::NATURAL_ID).with("mutable", ValueShape::Bool(true))),
			),
	]);
	let hierarchy = &model.hierarchies()[0];

	assert_eq!(hierarchy.version().map(|a| a.name()), Some("version"));
	assert_eq!(hierarchy.tenant_id().map(|a| a.name()), Some("tenant"));
	let natural = hierarchy.natural_id().unwrap();
	let names: Vec<&str> = natural.attributes.iter().map(|a| a.name()).collect();
	assert_eq!(names, vec!["email", "handle"]);
	assert!(natural.mutable);
}

#[rstest]
#[case(None, InheritanceStrategy::SingleTable)]
#[case(Some("SINGLE_TABLE"), InheritanceStrategy::SingleTable)]
#[case(Some("JOINED"), InheritanceStrategy::Joined)]
#[case(Some("TABLE_PER_CLASS"), InheritanceStrategy::TablePerClass)]
fn inheritance_strategy_defaults_to_single_table(
	#[case] declared: Option<&str>,
	#[case] expected: InheritanceStrategy,
) {
	let mut root = entity("a.Animal").field(id("id"));
	if let Some(strategy) = declared {
		root = root.annotated(
			ann(names::INHERITANCE).with("strategy", ValueShape::enum_constant(names::INHERITANCE_TYPE, strategy)),
		);
	}
	let model = only_hierarchy(vec![root]);
	let hierarchy = &model.hierarchies()[0];
	assert_eq!(hierarchy.inheritance(), expected);
}

#[test]
fn types_are_ordered_supertype_first() {
	let model = only_hierarchy(vec![
		entity("a.Cat").extends("a.Animal"),
		DefinedClass::new("a.Living")
			.annotated(ann(names::MAPPED_SUPERCLASS))
			.field(id("id")),
		entity("a.Animal").extends("a.Living"),
		entity("a.Lion").extends("a.Cat"),
	]);
	let hierarchy = &model.hierarchies()[0];

	let names: Vec<&str> = hierarchy.types().iter().map(|t| t.name()).collect();
	assert_eq!(names, vec!["a.Living", "a.Animal", "a.Cat", "a.Lion"]);
	assert_eq!(hierarchy.root().name(), "a.Animal");
	assert_eq!(hierarchy.entity_super_type_of("a.Lion").map(|t| t.name()), Some("a.Cat"));
	assert_eq!(hierarchy.super_type_of("a.Animal").map(|t| t.name()), Some("a.Living"));
	assert_eq!(hierarchy.entity_super_type_of("a.Animal").map(|t| t.name()), None);
	assert!(hierarchy.has_subtypes());
	assert_eq!(id_names(hierarchy.id_mapping()), vec!["id"]);
	assert!(hierarchy.types()[0].find_attribute("id").is_some());
}

#[rstest]
#[case(SharedCacheMode::All, false, None, true)]
#[case(SharedCacheMode::None, true, Some(true), false)]
#[case(SharedCacheMode::EnableSelective, false, None, false)]
#[case(SharedCacheMode::EnableSelective, false, Some(true), true)]
#[case(SharedCacheMode::Unspecified, true, None, true)]
#[case(SharedCacheMode::DisableSelective, false, None, true)]
#[case(SharedCacheMode::DisableSelective, false, Some(false), false)]
fn cache_mode_decides_caching(
	#[case] mode: SharedCacheMode,
	#[case] with_cache: bool,
	#[case] cacheable: Option<bool>,
	#[case] cached: bool,
) {
	let mut root = entity("a.Country").field(id("id"));
	if with_cache {
		root = root.annotated(
			ann(names::CACHE)
				.with("usage", ValueShape::enum_constant("org.hibernate.annotations.CacheConcurrencyStrategy", "READ_ONLY"))
				.with_str("region", "countries"),
		);
	}
	if let Some(value) = cacheable {
		root = root.annotated(ann(names::CACHEABLE).with("value", ValueShape::Bool(value)));
	}

	let model = categorize_with(vec![root], mode).unwrap();
	let cache = model.hierarchies()[0].cache();
	assert_eq!(cache.cached, cached);
	if with_cache {
		assert_eq!(&*cache.region, "countries");
		assert_eq!(cache.access.as_deref(), Some("READ_ONLY"));
	} else {
		assert_eq!(&*cache.region, "a.Country");
		assert_eq!(cache.access, None);
	}
}
