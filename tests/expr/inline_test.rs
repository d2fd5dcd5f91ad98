// tests/expr/inline_test.rs
use quarry::expr::inline::detect;

#[test]
fn test_plain_columns_are_not_promoted() {
    assert!(detect("totaldue").is_none());
    assert!(detect("t0.orderdate").is_none());
    assert!(detect("dim$caption").is_none());
}

#[test]
fn test_simple_alias_is_not_promoted() {
    assert!(detect("totaldue AS total").is_none());
    assert!(detect("t0.orderdate as od").is_none());
}

#[test]
fn test_function_call_with_alias() {
    let def = detect("YEAR(orderdate) AS orderYear").unwrap();
    assert_eq!(def.name, "orderYear");
    assert_eq!(def.expression, "YEAR(orderdate)");
}

#[test]
fn test_function_call_without_alias_named_after_expression() {
    let def = detect("UPPER(status)").unwrap();
    assert_eq!(def.name, "UPPER(status)");
    assert_eq!(def.expression, "UPPER(status)");
}

#[test]
fn test_operator_expression() {
    let def = detect("totaldue - discount AS net").unwrap();
    assert_eq!(def.name, "net");
    assert_eq!(def.expression, "totaldue - discount");
}

#[test]
fn test_comparison_expression() {
    let def = detect("qty >= 10 AS bulk").unwrap();
    assert_eq!(def.name, "bulk");
    assert_eq!(def.expression, "qty >= 10");
}

#[test]
fn test_nested_call_with_operators() {
    let def = detect("ROUND(price * qty, 2) AS total").unwrap();
    assert_eq!(def.expression, "ROUND(price * qty, 2)");
}

#[test]
fn test_detected_definition_compiles() {
    use quarry::prelude::*;

    struct Model;
    impl QueryModel for Model {
        fn find_column(&self, name: &str) -> Option<PhysicalColumn> {
            (name == "orderdate").then(|| {
                PhysicalColumn::new("orderdate", "t0", "order_date", ColumnType::Datetime)
            })
        }
    }

    let def = detect("YEAR(orderdate) AS orderYear").unwrap();
    let model = Model;
    let mut cx = ExprContext::new(&model);
    let compiler = FieldCompiler::new(SqlFactory::new(Dialect::Generic));
    let col = compiler.compile_field(&def, &mut cx).unwrap();
    assert_eq!(col.name, "orderYear");
    assert_eq!(col.fragment.sql, "YEAR(t0.order_date)");
}
