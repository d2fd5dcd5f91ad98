// tests/planner/join_path_test.rs
use std::sync::Arc;

use quarry::planner::{JoinEdge, JoinGraph, QueryTable};
use quarry::Error;

/// Every edge's `from` must be the root or an earlier edge's `to`.
fn assert_valid_emission_order(root: &str, path: &[JoinEdge]) {
    let mut introduced = vec![root.to_string()];
    for edge in path {
        assert!(
            introduced.contains(&edge.from.alias),
            "edge {} emitted before its left side was introduced",
            edge
        );
        introduced.push(edge.to.alias.clone());
    }
}

struct Snowflake {
    graph: JoinGraph,
    product: Arc<QueryTable>,
    category: Arc<QueryTable>,
    customer: Arc<QueryTable>,
    region: Arc<QueryTable>,
}

/// fact(t0) -> product(t1) -> category(t2)
/// fact(t0) -> customer(t3) -> region(t4)
fn snowflake() -> Snowflake {
    let fact = QueryTable::new("sales_order", "t0");
    let product = QueryTable::new("product", "t1");
    let category = QueryTable::new("category", "t2");
    let customer = QueryTable::new("customer", "t3");
    let region = QueryTable::new("region", "t4");

    let mut graph = JoinGraph::new(Arc::clone(&fact));
    graph.add_fk_edge(Arc::clone(&fact), Arc::clone(&product), "product_id");
    graph.add_fk_edge(Arc::clone(&product), Arc::clone(&category), "category_id");
    graph.add_fk_edge(Arc::clone(&fact), Arc::clone(&customer), "customer_id");
    graph.add_fk_edge(Arc::clone(&customer), Arc::clone(&region), "region_id");

    Snowflake {
        graph,
        product,
        category,
        customer,
        region,
    }
}

#[test]
fn test_direct_target() {
    let s = snowflake();
    let path = s.graph.get_path(&[s.product]).unwrap();
    assert_eq!(path.len(), 1);
    assert_eq!(path[0].from.alias, "t0");
    assert_eq!(path[0].to.alias, "t1");
}

#[test]
fn test_transitive_target_pulls_intermediate() {
    let s = snowflake();
    // Category requested directly, product not: the path must still
    // introduce product first.
    let path = s.graph.get_path(&[s.category]).unwrap();
    assert_eq!(path.len(), 2);
    assert_eq!(path[0].to.alias, "t1");
    assert_eq!(path[1].to.alias, "t2");
    assert_valid_emission_order("t0", &path);
}

#[test]
fn test_multiple_branches() {
    let s = snowflake();
    let path = s.graph.get_path(&[s.category, s.region]).unwrap();
    assert_eq!(path.len(), 4);
    assert_valid_emission_order("t0", &path);
}

#[test]
fn test_shared_prefix_not_duplicated() {
    let s = snowflake();
    // Both targets sit behind the customer edge.
    let mut graph = s.graph;
    let loyalty = QueryTable::new("loyalty_tier", "t5");
    graph.add_fk_edge(Arc::clone(&s.customer), Arc::clone(&loyalty), "tier_id");

    let path = graph.get_path(&[s.region, loyalty]).unwrap();
    assert_eq!(path.len(), 3);
    let customer_edges = path.iter().filter(|e| e.to.alias == "t3").count();
    assert_eq!(customer_edges, 1);
    assert_valid_emission_order("t0", &path);
}

#[test]
fn test_minimality_skips_unrelated_branch() {
    let s = snowflake();
    let path = s.graph.get_path(&[s.region]).unwrap();
    assert_eq!(path.len(), 2);
    assert!(path.iter().all(|e| e.to.alias != "t1" && e.to.alias != "t2"));
}

#[test]
fn test_root_only_request_is_empty() {
    let s = snowflake();
    let root = Arc::clone(s.graph.root());
    assert!(s.graph.get_path(&[root]).unwrap().is_empty());
    assert!(s.graph.get_path(&[]).unwrap().is_empty());
}

#[test]
fn test_unreachable_target_is_config_error() {
    let s = snowflake();
    let orphan = QueryTable::new("warehouse", "t9");
    let err = s.graph.get_path(&[orphan]).unwrap_err();
    match err {
        Error::NoJoinPath { from, to } => {
            assert_eq!(from, "t0");
            assert_eq!(to, "t9");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_target_order_does_not_change_result() {
    let s = snowflake();
    let a = s
        .graph
        .get_path(&[Arc::clone(&s.category), Arc::clone(&s.region)])
        .unwrap();
    let b = s.graph.get_path(&[s.region, s.category]).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_repeated_query_hits_cache() {
    let s = snowflake();
    let first = s.graph.get_path(&[Arc::clone(&s.category)]).unwrap();
    let second = s.graph.get_path(&[Arc::clone(&s.category)]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_cache_invalidated_by_add_edge() {
    let s = snowflake();
    let mut graph = s.graph;
    let before = graph.get_path(&[Arc::clone(&s.region)]).unwrap();
    assert_eq!(before.len(), 2);

    // A direct shortcut to region changes the best path.
    let fact = Arc::clone(graph.root());
    graph.add_fk_edge(fact, Arc::clone(&s.region), "region_id");

    let after = graph.get_path(&[s.region]).unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].from.alias, "t0");
    assert_eq!(after[0].to.alias, "t4");
}

#[test]
fn test_clear_path_cache_recomputes_equal_result() {
    let s = snowflake();
    let first = s.graph.get_path(&[Arc::clone(&s.category)]).unwrap();
    s.graph.clear_path_cache();
    let second = s.graph.get_path(&[s.category]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_deep_chain_ordering() {
    // t0 -> a -> b -> c -> d, request only the leaf.
    let root = QueryTable::new("fact", "t0");
    let mut graph = JoinGraph::new(Arc::clone(&root));
    let mut prev = root;
    let mut leaf = None;
    for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
        let node = QueryTable::new(*name, format!("t{}", i + 1));
        graph.add_fk_edge(Arc::clone(&prev), Arc::clone(&node), format!("{name}_id"));
        leaf = Some(Arc::clone(&node));
        prev = node;
    }

    let path = graph.get_path(&[leaf.unwrap()]).unwrap();
    assert_eq!(path.len(), 4);
    assert_valid_emission_order("t0", &path);
}
