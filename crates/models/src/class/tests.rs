use pretty_assertions::assert_eq;
use rstest::rstest;

use super::member::property_name;
use super::*;
use crate::MetadataRegistry;
use crate::annotations::{AnnotationTarget, builtins};
use crate::test_fixtures::*;

#[rstest]
#[case("com.acme.Order", "Order")]
#[case("com.acme.Order$Line", "Line")]
#[case("Order", "Order")]
fn simple_name_strips_package_and_outer_class(#[case] qualified: &str, #[case] expected: &str) {
	assert_eq!(simple_name(qualified), expected);
}

#[rstest]
#[case("getTotal", Some("total"))]
#[case("isActive", Some("active"))]
#[case("getURL", Some("uRL"))]
#[case("get", None)]
#[case("getter", None)]
#[case("island", None)]
#[case("total", None)]
fn getter_names_map_to_properties(#[case] method: &str, #[case] expected: Option<&str>) {
	assert_eq!(property_name(method).as_deref(), expected);
}

#[test]
fn ancestors_walk_to_the_root() {
	let registry = MetadataRegistry::live(order_loader());
	let rush = registry.resolve(RUSH_ORDER).unwrap();
	let names: Vec<&str> = rush.ancestors().map(|c| c.name()).collect();
	assert_eq!(names, vec![ORDER, BASE]);
	assert_eq!(rush.superclass_name(), Some(ORDER));
	assert_eq!(rush.simple_name(), "RushOrder");
}

#[test]
fn members_carry_their_declaring_class() {
	let registry = MetadataRegistry::live(order_loader());
	let order = registry.resolve(ORDER).unwrap();
	let base = order.superclass().unwrap();

	let id = base.find_field("id").unwrap();
	assert_eq!(id.declaring_class(), BASE);
	assert!(id.has_usage(&builtins().id));
	assert_eq!(id.location(), format!("field `id` of `{BASE}`"));
	assert!(order.find_field("id").is_none(), "fields are declared, not inherited");
}

#[test]
fn non_inherited_usages_stay_local() {
	let registry = MetadataRegistry::live(order_loader());
	let rush = registry.resolve(RUSH_ORDER).unwrap();
	assert!(rush.get_usage(&builtins().table).is_none());
	assert!(rush.get_usage(&builtins().discriminator_value).is_some());
}

#[test]
fn element_type_reads_last_argument() {
	assert_eq!(TypeRef::generic("java.util.Map", &["a.K", "a.V"]).element_type(), Some("a.V"));
	assert_eq!(TypeRef::new("java.lang.String").element_type(), None);
	assert!(TypeRef::new("void").is_void());
}
