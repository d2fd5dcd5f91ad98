//! The join graph and its path planner.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use dashmap::DashMap;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::error::{Error, Result};

use super::join::{JoinEdge, JoinOn, JoinType, QueryTable};

/// Edge payload: how to join, without the endpoints.
#[derive(Debug, Clone)]
struct JoinRelation {
    on: JoinOn,
    join_type: JoinType,
}

/// Directed graph of joinable tables, rooted at the primary table.
///
/// Built once during model loading (`add_edge` takes `&mut self`), then
/// queried concurrently: `get_path` takes `&self` and memoizes results
/// in a concurrent map keyed by the sorted target alias set. Every
/// mutation clears the cache.
pub struct JoinGraph {
    graph: DiGraph<Arc<QueryTable>, JoinRelation>,
    /// Alias to node lookup; aliases are node identity.
    nodes: HashMap<String, NodeIndex>,
    root: NodeIndex,
    path_cache: DashMap<String, Vec<JoinEdge>>,
}

impl JoinGraph {
    pub fn new(root: Arc<QueryTable>) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        let root_idx = graph.add_node(Arc::clone(&root));
        nodes.insert(root.alias.clone(), root_idx);
        Self {
            graph,
            nodes,
            root: root_idx,
            path_cache: DashMap::new(),
        }
    }

    /// The primary table the graph is rooted at.
    pub fn root(&self) -> &Arc<QueryTable> {
        &self.graph[self.root]
    }

    fn intern(&mut self, table: Arc<QueryTable>) -> NodeIndex {
        match self.nodes.get(&table.alias) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(Arc::clone(&table));
                self.nodes.insert(table.alias.clone(), idx);
                idx
            }
        }
    }

    /// Register a join edge, adding unseen tables as nodes.
    ///
    /// A second edge between the same (from, to) alias pair is skipped;
    /// the first registration wins. Clears the path cache.
    pub fn add_edge(
        &mut self,
        from: Arc<QueryTable>,
        to: Arc<QueryTable>,
        on: JoinOn,
        join_type: JoinType,
    ) {
        let from_idx = self.intern(from);
        let to_idx = self.intern(to);

        if self.graph.find_edge(from_idx, to_idx).is_some() {
            debug!(
                from = %self.graph[from_idx].alias,
                to = %self.graph[to_idx].alias,
                "duplicate join edge skipped, first registration wins"
            );
            return;
        }

        self.graph.add_edge(from_idx, to_idx, JoinRelation { on, join_type });
        self.path_cache.clear();
    }

    /// Register a LEFT JOIN edge over a foreign key column.
    pub fn add_fk_edge(
        &mut self,
        from: Arc<QueryTable>,
        to: Arc<QueryTable>,
        foreign_key: impl Into<String>,
    ) {
        self.add_edge(from, to, JoinOn::foreign_key(foreign_key), JoinType::Left);
    }

    /// Compute the ordered join path from the root to every target.
    ///
    /// The returned edges are the minimal set connecting the root to all
    /// targets, ordered so each edge's `from` table is the root or an
    /// earlier edge's `to` table. Results are cached per target set.
    pub fn get_path(&self, targets: &[Arc<QueryTable>]) -> Result<Vec<JoinEdge>> {
        // The root is always present and never joined to itself.
        let root_alias = &self.graph[self.root].alias;
        let mut aliases: Vec<&str> = targets
            .iter()
            .map(|t| t.alias.as_str())
            .filter(|a| a != root_alias)
            .collect();
        aliases.sort_unstable();
        aliases.dedup();

        if aliases.is_empty() {
            return Ok(Vec::new());
        }

        let key = aliases.join(",");
        if let Some(cached) = self.path_cache.get(&key) {
            return Ok(cached.clone());
        }

        let path = self.compute_path(&aliases)?;
        self.path_cache.insert(key, path.clone());
        Ok(path)
    }

    fn compute_path(&self, aliases: &[&str]) -> Result<Vec<JoinEdge>> {
        let root_alias = self.graph[self.root].alias.clone();

        // Targets that are not in the graph at all are unreachable too.
        let mut remaining: HashSet<NodeIndex> = HashSet::new();
        let mut target_order: Vec<NodeIndex> = Vec::new();
        for alias in aliases {
            match self.nodes.get(*alias) {
                Some(&idx) => {
                    if remaining.insert(idx) {
                        target_order.push(idx);
                    }
                }
                None => {
                    return Err(Error::NoJoinPath {
                        from: root_alias,
                        to: alias.to_string(),
                    })
                }
            }
        }

        // BFS from the root, recording each node's parent edge.
        let mut parent: HashMap<NodeIndex, EdgeIndex> = HashMap::new();
        let mut visited: HashSet<NodeIndex> = HashSet::from([self.root]);
        let mut queue: VecDeque<NodeIndex> = VecDeque::from([self.root]);

        while let Some(current) = queue.pop_front() {
            if remaining.is_empty() {
                break;
            }
            // petgraph iterates outgoing edges newest-first; walk them
            // in insertion order for deterministic paths.
            let mut outgoing: Vec<_> = self.graph.edges(current).collect();
            outgoing.reverse();
            for edge in outgoing {
                let next = edge.target();
                if visited.insert(next) {
                    parent.insert(next, edge.id());
                    remaining.remove(&next);
                    queue.push_back(next);
                }
            }
        }

        if let Some(&missed) = remaining.iter().next() {
            return Err(Error::NoJoinPath {
                from: root_alias,
                to: self.graph[missed].alias.clone(),
            });
        }

        // Walk parent edges back from each target. Shared prefix edges
        // (diamonds) are collected once.
        let mut edge_set: HashSet<EdgeIndex> = HashSet::new();
        let mut edges: Vec<EdgeIndex> = Vec::new();
        for &target in &target_order {
            let mut current = target;
            while current != self.root {
                let edge = parent[&current];
                if edge_set.insert(edge) {
                    edges.push(edge);
                }
                let (source, _) = self.graph.edge_endpoints(edge).expect("edge in graph");
                current = source;
            }
        }

        let ordered = self.topo_sort_edges(&edges)?;
        Ok(ordered.into_iter().map(|e| self.materialize(e)).collect())
    }

    /// Kahn's algorithm restricted to the collected edge set.
    ///
    /// In-degrees count only edges within the set; ties keep the set's
    /// discovery order.
    fn topo_sort_edges(&self, edges: &[EdgeIndex]) -> Result<Vec<EdgeIndex>> {
        let mut in_degree: HashMap<NodeIndex, usize> = HashMap::new();
        let mut touched: Vec<NodeIndex> = Vec::new();
        let mut outgoing: HashMap<NodeIndex, Vec<EdgeIndex>> = HashMap::new();

        for &edge in edges {
            let (source, dest) = self.graph.edge_endpoints(edge).expect("edge in graph");
            for node in [source, dest] {
                if !in_degree.contains_key(&node) {
                    in_degree.insert(node, 0);
                    touched.push(node);
                }
            }
            *in_degree.get_mut(&dest).expect("just inserted") += 1;
            outgoing.entry(source).or_default().push(edge);
        }

        let mut queue: VecDeque<NodeIndex> = touched
            .iter()
            .copied()
            .filter(|n| in_degree[n] == 0)
            .collect();
        let mut ordered = Vec::with_capacity(edges.len());

        while let Some(node) = queue.pop_front() {
            for &edge in outgoing.get(&node).map(Vec::as_slice).unwrap_or_default() {
                ordered.push(edge);
                let (_, dest) = self.graph.edge_endpoints(edge).expect("edge in graph");
                let degree = in_degree.get_mut(&dest).expect("touched node");
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(dest);
                }
            }
        }

        if ordered.len() < edges.len() {
            let involved: Vec<&str> = touched
                .iter()
                .filter(|n| in_degree[n] > 0)
                .map(|&n| self.graph[n].alias.as_str())
                .collect();
            return Err(Error::CircularJoin(involved.join(", ")));
        }
        Ok(ordered)
    }

    fn materialize(&self, edge: EdgeIndex) -> JoinEdge {
        let (source, dest) = self.graph.edge_endpoints(edge).expect("edge in graph");
        let relation = &self.graph[edge];
        JoinEdge {
            from: Arc::clone(&self.graph[source]),
            to: Arc::clone(&self.graph[dest]),
            on: relation.on.clone(),
            join_type: relation.join_type,
        }
    }

    /// Full-graph cycle check for model-load time.
    ///
    /// DFS with a recursion stack, independent of any path query.
    pub fn validate(&self) -> Result<()> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut on_stack: Vec<NodeIndex> = Vec::new();

        for start in self.graph.node_indices() {
            if visited.contains(&start) {
                continue;
            }
            self.dfs_check(start, &mut visited, &mut on_stack)?;
        }
        Ok(())
    }

    fn dfs_check(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        on_stack: &mut Vec<NodeIndex>,
    ) -> Result<()> {
        visited.insert(node);
        on_stack.push(node);

        for edge in self.graph.edges(node) {
            let next = edge.target();
            if let Some(pos) = on_stack.iter().position(|&n| n == next) {
                let cycle: Vec<&str> = on_stack[pos..]
                    .iter()
                    .chain(std::iter::once(&next))
                    .map(|&n| self.graph[n].alias.as_str())
                    .collect();
                return Err(Error::CircularJoin(cycle.join(" -> ")));
            }
            if !visited.contains(&next) {
                self.dfs_check(next, visited, on_stack)?;
            }
        }

        on_stack.pop();
        Ok(())
    }

    /// An independent graph with the same nodes and edges.
    ///
    /// Table `Arc`s are shared (tables are immutable); edges, adjacency,
    /// and the path cache are not.
    pub fn copy(&self) -> JoinGraph {
        let mut copy = JoinGraph::new(Arc::clone(self.root()));
        for edge in self.graph.edge_indices() {
            let (source, dest) = self.graph.edge_endpoints(edge).expect("edge in graph");
            let relation = &self.graph[edge];
            copy.add_edge(
                Arc::clone(&self.graph[source]),
                Arc::clone(&self.graph[dest]),
                relation.on.clone(),
                relation.join_type,
            );
        }
        copy
    }

    /// Drop all memoized paths.
    pub fn clear_path_cache(&self) {
        self.path_cache.clear();
    }

    /// All tables, in registration order.
    pub fn tables(&self) -> Vec<Arc<QueryTable>> {
        self.graph
            .node_indices()
            .map(|n| Arc::clone(&self.graph[n]))
            .collect()
    }

    /// All edges, in registration order.
    pub fn all_edges(&self) -> Vec<JoinEdge> {
        self.graph.edge_indices().map(|e| self.materialize(e)).collect()
    }

    /// Edges leaving the table with this alias, in registration order.
    pub fn edges_from(&self, alias: &str) -> Vec<JoinEdge> {
        self.directed_edges(alias, petgraph::Direction::Outgoing)
    }

    /// Edges arriving at the table with this alias, in registration order.
    pub fn edges_to(&self, alias: &str) -> Vec<JoinEdge> {
        self.directed_edges(alias, petgraph::Direction::Incoming)
    }

    fn directed_edges(&self, alias: &str, dir: petgraph::Direction) -> Vec<JoinEdge> {
        let Some(&idx) = self.nodes.get(alias) else {
            return Vec::new();
        };
        let mut edges: Vec<JoinEdge> = self
            .graph
            .edges_directed(idx, dir)
            .map(|e| self.materialize(e.id()))
            .collect();
        edges.reverse();
        edges
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl std::fmt::Debug for JoinGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinGraph")
            .field("root", &self.graph[self.root].alias)
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .finish()
    }
}

impl std::fmt::Display for JoinGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "JoinGraph rooted at {}", self.graph[self.root])?;
        for edge in self.all_edges() {
            writeln!(f, "  {}", edge)?;
        }
        Ok(())
    }
}
