use std::sync::Arc;

use pretty_assertions::assert_eq;
use strata_index_spec::{AnnotationSpec, ClassIndexSpec, ClassKindSpec, ClassSpec};

use super::*;
use crate::class::TypeRef;
use crate::source::{AnnotationShape, ClassIndex, DefinedClass, InMemoryClassLoader, MemberShape, ValueShape};
use crate::test_fixtures::*;
use crate::MetadataRegistry;

const TAG: &str = "com.acme.Tag";
const TAGS: &str = "com.acme.Tags";
const AUDITED: &str = "com.acme.Audited";
const LOCAL: &str = "com.acme.Local";

fn tag(label: &str) -> AnnotationShape {
	AnnotationShape::new(TAG).with_str("label", label)
}

/// Registers an inherited repeatable `Tag` (grouped by `Tags`), an inherited
/// marker `Audited` and a non-inherited `Local`.
fn tagged_registry(loader: InMemoryClassLoader) -> MetadataRegistry {
	let registry = MetadataRegistry::live(loader);
	let tags = registry
		.register_descriptor(
			AnnotationDescriptor::builder(TAGS, AnnotationTargets::TYPE)
				.inherited()
				.required("value")
				.build(),
		)
		.unwrap();
	registry
		.register_descriptor(
			AnnotationDescriptor::builder(TAG, AnnotationTargets::TYPE)
				.inherited()
				.required("label")
				.repeatable(tags)
				.build(),
		)
		.unwrap();
	registry
		.register_descriptor(AnnotationDescriptor::builder(AUDITED, AnnotationTargets::TYPE).inherited().build())
		.unwrap();
	registry
		.register_descriptor(AnnotationDescriptor::builder(LOCAL, AnnotationTargets::TYPE).build())
		.unwrap();
	registry
}

fn parent_child() -> InMemoryClassLoader {
	InMemoryClassLoader::new()
		.with(
			DefinedClass::new("a.Parent")
				.annotated(tag("inherited"))
				.annotated(AnnotationShape::new(AUDITED))
				.annotated(AnnotationShape::new(LOCAL)),
		)
		.with(
			DefinedClass::new("a.Child")
				.extends("a.Parent")
				.annotated(tag("first"))
				.annotated(tag("second")),
		)
}

fn labels(usages: &[Arc<AnnotationUsage>]) -> Vec<&str> {
	usages.iter().map(|u| u.string("label").unwrap()).collect()
}

#[test]
fn repeatable_inherited_usages_list_local_first() {
	let registry = tagged_registry(parent_child());
	let tag = registry.descriptor(TAG).unwrap();
	let child = registry.resolve("a.Child").unwrap();

	let usages = child.get_repeated_usages(&tag);
	assert_eq!(labels(&usages), vec!["first", "second", "inherited"]);
}

#[test]
fn repeatable_container_is_unpacked_in_order() {
	let loader = InMemoryClassLoader::new().with(
		DefinedClass::new("a.Grouped")
			.annotated(tag("loose"))
			.annotated(AnnotationShape::new(TAGS).with(
				"value",
				ValueShape::Array(vec![
					ValueShape::Annotation(tag("boxed-1")),
					ValueShape::Annotation(tag("boxed-2")),
				]),
			)),
	);
	let registry = tagged_registry(loader);
	let tag = registry.descriptor(TAG).unwrap();
	let grouped = registry.resolve("a.Grouped").unwrap();

	assert_eq!(labels(&grouped.get_repeated_usages(&tag)), vec!["loose", "boxed-1", "boxed-2"]);
}

#[test]
fn inherited_marker_is_found_through_superclass() {
	let registry = tagged_registry(parent_child());
	let child = registry.resolve("a.Child").unwrap();

	let audited = registry.descriptor(AUDITED).unwrap();
	let local = registry.descriptor(LOCAL).unwrap();
	assert!(child.get_usage(&audited).is_some());
	assert!(child.get_usage(&local).is_none(), "non-inherited shapes stay on the parent");
	assert!(!child.has_usage(&audited), "inherited usages are not local");
}

#[test]
fn named_usage_prefers_local_then_inherited() {
	let registry = tagged_registry(parent_child());
	let tag = registry.descriptor(TAG).unwrap();
	let child = registry.resolve("a.Child").unwrap();

	let found = child.get_named_usage(&tag, "label", "inherited").unwrap();
	assert_eq!(found.string("label"), Some("inherited"));
	assert!(child.get_named_usage(&tag, "label", "absent").is_none());
}

#[test]
fn builtin_container_is_unpacked() {
	let registry = MetadataRegistry::live(order_loader());
	let gift = registry.resolve(GIFT_ORDER).unwrap();
	let filter_def = &builtins().filter_def;

	let usages = gift.get_repeated_usages(filter_def);
	let names: Vec<&str> = usages.iter().map(|u| u.string("name").unwrap()).collect();
	assert_eq!(names, vec!["wrapped", "expensive"]);
	assert!(gift.local_usages().named(filter_def, "name", "expensive").is_some());
}

#[test]
fn usage_never_defaults_itself() {
	let registry = MetadataRegistry::live(order_loader());
	let order = registry.resolve(ORDER).unwrap();
	let table = order.get_usage(&builtins().table).unwrap();

	assert_eq!(table.string("name"), Some("orders"));
	assert_eq!(table.get("schema"), None);
	assert_eq!(attribute_or_default(&table, "schema"), Some(&AttributeValue::string("")));
	assert_eq!(string_or_default(&table, "schema"), None, "empty strings count as unset");
	assert_eq!(table.attributes().len(), 1);
}

#[test]
fn nested_usages_resolve_against_their_descriptors() {
	let loader = InMemoryClassLoader::new().with(
		DefinedClass::new("a.Money").field(
			MemberShape::field("amount", TypeRef::new("a.Amount")).annotated(
				AnnotationShape::new(names::ATTRIBUTE_OVERRIDE).with_str("name", "value").with(
					"column",
					ValueShape::Annotation(AnnotationShape::new(names::COLUMN).with_str("name", "amount_value")),
				),
			),
		),
	);
	let registry = MetadataRegistry::live(loader);
	let money = registry.resolve("a.Money").unwrap();
	let over = money.find_field("amount").unwrap().local_usages().repeated(&builtins().attribute_override);

	assert_eq!(over.len(), 1);
	let column = over[0].nested("column");
	assert_eq!(column.len(), 1);
	assert!(column[0].is(&builtins().column));
	assert_eq!(int_or_default(column[0], "length"), Some(255));
}

#[test]
fn builtin_descriptors_are_shared_across_registries() {
	let a = MetadataRegistry::live(InMemoryClassLoader::new());
	let b = MetadataRegistry::live(InMemoryClassLoader::new());
	assert!(Arc::ptr_eq(
		&a.descriptor(names::ENTITY).unwrap(),
		&b.descriptor(names::ENTITY).unwrap()
	));
	assert!(Arc::ptr_eq(&a.descriptor(names::ENTITY).unwrap(), &builtins().entity));
}

#[test]
fn lenient_descriptor_is_built_once() {
	let registry = MetadataRegistry::live(InMemoryClassLoader::new());
	let first = registry.descriptor("com.acme.Whatever").unwrap();
	let second = registry.descriptor("com.acme.Whatever").unwrap();
	assert!(Arc::ptr_eq(&first, &second));
	assert!(first.is_lenient());
	assert!(first.declares("anything"));
}

#[test]
fn lenient_descriptor_is_shared_across_registries() {
	const UNREGISTERED: &str = "com.acme.Unregistered";
	let class = || DefinedClass::new("a.Marked").annotated(AnnotationShape::new(UNREGISTERED));
	let first = MetadataRegistry::live(InMemoryClassLoader::new().with(class()));
	let second = MetadataRegistry::live(InMemoryClassLoader::new().with(class()));
	let indexed = MetadataRegistry::indexed(
		ClassIndex::from_spec(ClassIndexSpec {
			classes: vec![ClassSpec {
				name: "a.Marked".into(),
				kind: ClassKindSpec::Class,
				flags: 0,
				superclass: None,
				interfaces: vec![],
				members: vec![],
				annotations: vec![AnnotationSpec {
					type_name: UNREGISTERED.into(),
					values: vec![],
				}],
			}],
		}),
		None,
	);

	let lenient = AnnotationDescriptor::builder(UNREGISTERED, AnnotationTargets::TYPE).build();
	let descriptors: Vec<Arc<AnnotationDescriptor>> = [&first, &second, &indexed]
		.into_iter()
		.map(|registry| {
			let marked = registry.resolve("a.Marked").unwrap();
			marked.get_usage(&lenient).unwrap().descriptor().clone()
		})
		.collect();
	assert!(descriptors[0].is_lenient());
	assert!(Arc::ptr_eq(&descriptors[0], &descriptors[1]));
	assert!(Arc::ptr_eq(&descriptors[0], &descriptors[2]));
	assert!(Arc::ptr_eq(&descriptors[0], &second.descriptor(UNREGISTERED).unwrap()));
}

#[test]
fn custom_descriptor_is_shared_across_registries() {
	let shape = || {
		AnnotationDescriptor::builder("com.acme.Shared", AnnotationTargets::TYPE)
			.attr("level", AttributeValue::Int(1))
			.build()
	};
	let first = MetadataRegistry::live(InMemoryClassLoader::new());
	let second = MetadataRegistry::live(InMemoryClassLoader::new());
	let registered = first.register_descriptor(shape()).unwrap();

	assert!(Arc::ptr_eq(&registered, &second.register_descriptor(shape()).unwrap()));
	assert!(Arc::ptr_eq(&registered, &second.descriptor("com.acme.Shared").unwrap()));
}

#[test]
fn duplicate_descriptor_registration_fails() {
	let registry = MetadataRegistry::live(InMemoryClassLoader::new());
	let other = MetadataRegistry::live(InMemoryClassLoader::new());
	registry
		.register_descriptor(AnnotationDescriptor::builder("com.acme.Once", AnnotationTargets::TYPE).build())
		.unwrap();
	assert!(matches!(
		other.register_descriptor(AnnotationDescriptor::builder("com.acme.Once", AnnotationTargets::MEMBER).build()),
		Err(crate::ModelsError::DuplicateDescriptor { .. })
	));
	assert!(matches!(
		registry.register_descriptor(
			AnnotationDescriptor::builder("com.acme.Once", AnnotationTargets::TYPE)
				.inherited()
				.build()
		),
		Err(crate::ModelsError::DuplicateDescriptor { .. })
	));
	assert!(matches!(
		registry.register_descriptor(AnnotationDescriptor::builder(names::ENTITY, AnnotationTargets::TYPE).build()),
		Err(crate::ModelsError::DuplicateDescriptor { .. })
	));
}

#[test]
fn registration_after_lenient_use_fails() {
	let registry = MetadataRegistry::live(InMemoryClassLoader::new());
	assert!(registry.descriptor("com.acme.SeenFirst").unwrap().is_lenient());
	assert!(matches!(
		registry.register_descriptor(AnnotationDescriptor::builder("com.acme.SeenFirst", AnnotationTargets::TYPE).build()),
		Err(crate::ModelsError::DuplicateDescriptor { .. })
	));
}

#[test]
fn array_attributes_accept_single_values() {
	let single = AttributeValue::Int(3);
	assert_eq!(single.elements(), &[AttributeValue::Int(3)]);
	let many = AttributeValue::Array(vec![AttributeValue::Bool(true), AttributeValue::Bool(false)]);
	assert_eq!(many.elements().len(), 2);
}
