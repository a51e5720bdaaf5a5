//! Small class graph shared by unit tests.

use crate::annotations::names;
use crate::class::{Modifiers, TypeRef};
use crate::source::{AnnotationShape, DefinedClass, InMemoryClassLoader, MemberShape, ValueShape};

pub(crate) const BASE: &str = "com.acme.BaseEntity";
pub(crate) const ORDER: &str = "com.acme.Order";
pub(crate) const RUSH_ORDER: &str = "com.acme.RushOrder";
pub(crate) const GIFT_ORDER: &str = "com.acme.GiftOrder";

pub(crate) fn ann(name: &str) -> AnnotationShape {
	AnnotationShape::new(name)
}

pub(crate) fn order_classes() -> Vec<DefinedClass> {
	vec![
		DefinedClass::new(BASE)
			.annotated(ann(names::MAPPED_SUPERCLASS))
			.field(MemberShape::field("id", TypeRef::new("java.lang.Long")).annotated(ann(names::ID)))
			.field(MemberShape::field("version", TypeRef::new("int")).annotated(ann(names::VERSION))),
		DefinedClass::new(ORDER)
			.extends(BASE)
			.annotated(ann(names::ENTITY))
			.annotated(ann(names::TABLE).with_str("name", "orders"))
			.field(MemberShape::field("total", TypeRef::new("java.math.BigDecimal")))
			.field(MemberShape::field("draft", TypeRef::new("boolean")).with_modifiers(Modifiers::TRANSIENT))
			.field(MemberShape::field("COUNTER", TypeRef::new("long")).with_modifiers(Modifiers::STATIC))
			.method(MemberShape::method("getTotal", TypeRef::new("java.math.BigDecimal")))
			.method(MemberShape::method("recalculate", TypeRef::new("void")))
			.method(MemberShape::method("setTotal", TypeRef::new("void")).with_parameters(&["java.math.BigDecimal"])),
		DefinedClass::new(RUSH_ORDER)
			.extends(ORDER)
			.annotated(ann(names::ENTITY))
			.annotated(ann(names::DISCRIMINATOR_VALUE).with_str("value", "RUSH")),
		DefinedClass::new(GIFT_ORDER)
			.extends(ORDER)
			.annotated(ann(names::ENTITY))
			.annotated(
				ann(names::FILTER_DEFS).with(
					"value",
					ValueShape::Array(vec![
						ValueShape::Annotation(ann(names::FILTER_DEF).with_str("name", "wrapped")),
						ValueShape::Annotation(ann(names::FILTER_DEF).with_str("name", "expensive")),
					]),
				),
			),
	]
}

pub(crate) fn order_loader() -> InMemoryClassLoader {
	let mut loader = InMemoryClassLoader::new();
	for class in order_classes() {
		loader.add(class);
	}
	loader
}
