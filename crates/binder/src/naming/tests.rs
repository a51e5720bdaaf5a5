use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

#[rstest]
#[case("orders", "orders", false)]
#[case("`order`", "order", true)]
#[case("\"Line Item\"", "Line Item", true)]
#[case("  padded ", "padded", false)]
#[case("``", "``", false)]
fn parse_reads_quoting(#[case] declared: &str, #[case] text: &str, #[case] quoted: bool) {
	let id = Identifier::parse(declared);
	assert_eq!((id.text(), id.is_quoted()), (text, quoted));
}

#[test]
fn display_renders_quotes() {
	assert_eq!(Identifier::parse("`order`").to_string(), "\"order\"");
	assert_eq!(Identifier::parse("orders").to_string(), "orders");
}

#[test]
fn unquoted_names_match_case_insensitively() {
	assert!(Identifier::parse("ORDERS").matches(&Identifier::parse("orders")));
	assert!(!Identifier::parse("`ORDERS`").matches(&Identifier::parse("orders")));
}

#[rstest]
#[case("OrderLine", "order_line")]
#[case("customerId", "customer_id")]
#[case("t1", "t1")]
#[case("already_snake", "already_snake")]
fn snake_case_rewrites_unquoted_names(#[case] logical: &str, #[case] physical: &str) {
	let naming = SnakeCasePhysicalNaming;
	assert_eq!(naming.to_physical_table_name(Identifier::parse(logical)).text(), physical);
	assert_eq!(naming.to_physical_column_name(Identifier::parse(logical)).text(), physical);
}

#[test]
fn snake_case_keeps_quoted_names() {
	let quoted = Identifier::new("OrderLine", true);
	assert_eq!(SnakeCasePhysicalNaming.to_physical_table_name(quoted.clone()), quoted);
}

#[test]
fn implicit_strategies_differ_on_component_paths() {
	let path = ["shipping", "street"];
	assert_eq!(JpaImplicitNaming.basic_column_name(&path), "street");
	assert_eq!(ComponentPathImplicitNaming.basic_column_name(&path), "shipping_street");
	assert_eq!(JpaImplicitNaming.join_column_name(&["customer"], "id"), "customer_id");
	assert_eq!(JpaImplicitNaming.owner_key_column_name("Order", "id"), "Order_id");
}
