// tests/compiler/integration_test.rs
//
// End-to-end: one request with calculated fields and target tables,
// compiled for both backends, with the join path planned alongside.

use std::sync::Arc;

use quarry::prelude::*;
use serde_json::json;

struct SalesModel;

impl QueryModel for SalesModel {
    fn find_column(&self, name: &str) -> Option<PhysicalColumn> {
        match name {
            "price" => Some(PhysicalColumn::new("price", "t0", "price", ColumnType::Money)),
            "qty" => Some(PhysicalColumn::new("qty", "t0", "qty", ColumnType::Integer)),
            "amount" => Some(PhysicalColumn::new("amount", "t0", "amount", ColumnType::Money)),
            "categoryName" => Some(PhysicalColumn::new(
                "categoryName",
                "t2",
                "name",
                ColumnType::Text,
            )),
            _ => None,
        }
    }
}

fn defs() -> Vec<CalculatedFieldDef> {
    vec![
        CalculatedFieldDef::new("lineTotal", "price * qty"),
        CalculatedFieldDef::new("revenue", "SUM(amount)"),
        CalculatedFieldDef::new("avgLine", "lineTotal / qty").with_agg("avg"),
    ]
}

#[test]
fn test_backends_agree_on_aggregate_metadata() {
    let model = SalesModel;

    let mut sql_cx = ExprContext::new(&model);
    let sql_columns = FieldCompiler::new(SqlFactory::new(Dialect::Generic))
        .process_fields(&defs(), &mut sql_cx)
        .unwrap();

    let mut doc_cx = ExprContext::new(&model);
    let doc_columns = FieldCompiler::new(DocumentFactory::new())
        .process_fields(&defs(), &mut doc_cx)
        .unwrap();

    for (sql_col, doc_col) in sql_columns.iter().zip(&doc_columns) {
        assert_eq!(sql_col.name, doc_col.name);
        assert_eq!(sql_col.has_aggregate(), doc_col.has_aggregate());
        assert_eq!(sql_col.aggregation(), doc_col.aggregation());
        assert_eq!(sql_col.column_type(), doc_col.column_type());
    }
}

#[test]
fn test_chained_field_expands_in_both_backends() {
    let model = SalesModel;

    let mut sql_cx = ExprContext::new(&model);
    let sql_columns = FieldCompiler::new(SqlFactory::new(Dialect::Generic))
        .process_fields(&defs(), &mut sql_cx)
        .unwrap();
    assert_eq!(sql_columns[2].fragment.sql, "((t0.price * t0.qty) / t0.qty)");

    let mut doc_cx = ExprContext::new(&model);
    let doc_columns = FieldCompiler::new(DocumentFactory::new())
        .process_fields(&defs(), &mut doc_cx)
        .unwrap();
    assert_eq!(
        doc_columns[2].fragment.expression,
        json!({ "$divide": [{ "$multiply": ["$price", "$qty"] }, "$qty"] })
    );
}

#[test]
fn test_fields_and_join_path_for_one_request() {
    // Model loading: fact -> product -> category.
    let fact = QueryTable::new("sales_order", "t0");
    let product = QueryTable::new("product", "t1");
    let category = QueryTable::new("category", "t2");
    let mut graph = JoinGraph::new(Arc::clone(&fact));
    graph.add_fk_edge(Arc::clone(&fact), Arc::clone(&product), "product_id");
    graph.add_fk_edge(Arc::clone(&product), Arc::clone(&category), "category_id");
    graph.validate().unwrap();

    // Request: a calculated field over a category column plus the
    // tables its references require.
    let model = SalesModel;
    let mut cx = ExprContext::new(&model);
    let columns = FieldCompiler::new(SqlFactory::new(Dialect::Generic))
        .process_fields(
            &[CalculatedFieldDef::new("label", "UPPER(categoryName)")],
            &mut cx,
        )
        .unwrap();

    assert_eq!(
        columns[0].fragment.referenced_columns(),
        &[ColumnRef::new("t2", "name")]
    );

    // The referenced alias drives the join request.
    let path = graph.get_path(&[category]).unwrap();
    assert_eq!(path.len(), 2);
    assert_eq!(path[0].to.alias, "t1");
    assert_eq!(path[1].to.alias, "t2");
    assert_eq!(path[0].join_type, JoinType::Left);
}

#[test]
fn test_serialized_field_defs_round_trip_compile() {
    // Definitions arrive as request JSON; the parse cache is skipped
    // by serde and rebuilt on first compile.
    let payload = r#"[
        {"name": "lineTotal", "expression": "price * qty", "caption": "Line total"},
        {"name": "margin", "expression": "lineTotal - amount", "agg": "sum"}
    ]"#;
    let defs: Vec<CalculatedFieldDef> = serde_json::from_str(payload).unwrap();
    assert!(defs[0].compiled().is_none());

    let model = SalesModel;
    let mut cx = ExprContext::new(&model);
    let columns = FieldCompiler::new(SqlFactory::new(Dialect::Generic))
        .process_fields(&defs, &mut cx)
        .unwrap();
    assert_eq!(columns[0].caption, "Line total");
    assert_eq!(columns[1].aggregation(), Some(Aggregation::Sum));
    assert!(defs[0].compiled().is_some());
}
