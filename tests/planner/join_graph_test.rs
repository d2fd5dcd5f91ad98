// tests/planner/join_graph_test.rs
use std::sync::Arc;

use quarry::planner::{JoinGraph, JoinOn, JoinType, QueryTable};

fn tables() -> (Arc<QueryTable>, Arc<QueryTable>, Arc<QueryTable>) {
    (
        QueryTable::new("sales_order", "t0"),
        QueryTable::new("product", "t1"),
        QueryTable::new("customer", "t2"),
    )
}

#[test]
fn test_new_graph_contains_only_root() {
    let (fact, _, _) = tables();
    let graph = JoinGraph::new(fact);
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.root().alias, "t0");
}

#[test]
fn test_add_edge_registers_new_nodes() {
    let (fact, product, customer) = tables();
    let mut graph = JoinGraph::new(Arc::clone(&fact));
    graph.add_fk_edge(Arc::clone(&fact), product, "product_id");
    graph.add_fk_edge(fact, customer, "customer_id");
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn test_duplicate_edge_silently_ignored_first_wins() {
    let (fact, product, _) = tables();
    let mut graph = JoinGraph::new(Arc::clone(&fact));
    graph.add_fk_edge(Arc::clone(&fact), Arc::clone(&product), "product_id");
    graph.add_edge(
        Arc::clone(&fact),
        Arc::clone(&product),
        JoinOn::foreign_key("other_id"),
        JoinType::Inner,
    );

    assert_eq!(graph.edge_count(), 1);
    let edge = &graph.edges_from("t0")[0];
    assert_eq!(edge.on, JoinOn::foreign_key("product_id"));
    assert_eq!(edge.join_type, JoinType::Left);
}

#[test]
fn test_edges_from_and_to() {
    let (fact, product, customer) = tables();
    let mut graph = JoinGraph::new(Arc::clone(&fact));
    graph.add_fk_edge(Arc::clone(&fact), Arc::clone(&product), "product_id");
    graph.add_fk_edge(Arc::clone(&fact), customer, "customer_id");

    let out = graph.edges_from("t0");
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].to.alias, "t1");
    assert_eq!(out[1].to.alias, "t2");

    let inbound = graph.edges_to("t1");
    assert_eq!(inbound.len(), 1);
    assert_eq!(inbound[0].from.alias, "t0");

    assert!(graph.edges_from("missing").is_empty());
}

#[test]
fn test_builder_edge_kept_on_edge() {
    let (fact, product, _) = tables();
    let mut graph = JoinGraph::new(Arc::clone(&fact));
    graph.add_edge(
        fact,
        product,
        JoinOn::builder(|l, r| format!("{l}.region = {r}.region AND {r}.active = 1")),
        JoinType::Inner,
    );

    let edge = &graph.all_edges()[0];
    assert_eq!(edge.join_type, JoinType::Inner);
    match &edge.on {
        JoinOn::Builder(f) => {
            assert_eq!(f("t0", "t1"), "t0.region = t1.region AND t1.active = 1");
        }
        other => panic!("expected builder, got {other:?}"),
    }
}

#[test]
fn test_validate_accepts_acyclic_graph() {
    let (fact, product, customer) = tables();
    let mut graph = JoinGraph::new(Arc::clone(&fact));
    graph.add_fk_edge(Arc::clone(&fact), Arc::clone(&product), "product_id");
    graph.add_fk_edge(fact, customer, "customer_id");
    assert!(graph.validate().is_ok());
}

#[test]
fn test_validate_rejects_cycle_with_description() {
    let (fact, product, _) = tables();
    let mut graph = JoinGraph::new(Arc::clone(&fact));
    graph.add_fk_edge(Arc::clone(&fact), Arc::clone(&product), "product_id");
    graph.add_fk_edge(product, fact, "order_id");

    let err = graph.validate().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Cyclic"), "unexpected message: {msg}");
    assert!(msg.contains("t0") && msg.contains("t1"), "unexpected message: {msg}");
}

#[test]
fn test_copy_shares_tables_not_edges() {
    let (fact, product, customer) = tables();
    let mut graph = JoinGraph::new(Arc::clone(&fact));
    graph.add_fk_edge(Arc::clone(&fact), Arc::clone(&product), "product_id");

    let mut copy = graph.copy();
    assert_eq!(copy.node_count(), graph.node_count());
    assert_eq!(copy.all_edges(), graph.all_edges());
    assert!(Arc::ptr_eq(copy.root(), graph.root()));

    copy.add_fk_edge(Arc::clone(&fact), customer, "customer_id");
    assert_eq!(copy.edge_count(), 2);
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_display_lists_edges() {
    let (fact, product, _) = tables();
    let mut graph = JoinGraph::new(Arc::clone(&fact));
    graph.add_fk_edge(fact, product, "product_id");
    let rendered = graph.to_string();
    assert!(rendered.contains("sales_order t0"));
    assert!(rendered.contains("t0 -> t1 (LEFT JOIN)"));
}
