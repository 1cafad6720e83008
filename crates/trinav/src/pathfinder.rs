//! A* search over the triangles of a [`NavmeshGraph`].

use std::{cmp::Ordering, collections::BinaryHeap};

use crate::{EdgeId, NavmeshGraph, NavmeshHeuristic, TriangleId, TrianglePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum NodeState {
    #[default]
    Unvisited,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeRecord {
    connection: Option<EdgeId>,
    cost_so_far: f32,
    estimated_total_cost: f32,
    state: NodeState,
    search_id: u32,
}

/// An entry of the open list. Stale entries are skipped when popped.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    estimated_total_cost: f32,
    triangle: TriangleId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap.
        other
            .estimated_total_cost
            .total_cmp(&self.estimated_total_cost)
            .then_with(|| other.triangle.cmp(&self.triangle))
    }
}

/// Counters describing the last search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchMetrics {
    /// Number of triangles taken off the open list and expanded
    pub visited_nodes: usize,
    /// Number of times a triangle was pushed onto the open list
    pub open_list_additions: usize,
    /// Largest size the open list reached
    pub max_open_list_size: usize,
}

/// Finds triangle corridors with A*.
///
/// Node records are kept between searches and invalidated by a search counter, so repeated
/// searches on the same graph do not allocate.
#[derive(Debug, Clone, Default)]
pub struct Pathfinder {
    records: Vec<NodeRecord>,
    open: BinaryHeap<OpenEntry>,
    search_id: u32,
    max_expansions: Option<usize>,
    metrics: SearchMetrics,
}

impl Pathfinder {
    /// Creates a pathfinder with scratch space for `graph`.
    pub fn new(graph: &NavmeshGraph) -> Self {
        Self {
            records: vec![NodeRecord::default(); graph.triangle_count()],
            ..Default::default()
        }
    }

    /// Limits how many triangles a single search may expand. `None` means unlimited.
    pub fn with_max_expansions(mut self, max_expansions: Option<usize>) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// See [`Pathfinder::with_max_expansions`].
    pub fn set_max_expansions(&mut self, max_expansions: Option<usize>) {
        self.max_expansions = max_expansions;
    }

    /// Counters of the last search.
    #[inline]
    pub fn metrics(&self) -> SearchMetrics {
        self.metrics
    }

    /// Searches for a sequence of edges leading from `start` to `goal`.
    ///
    /// On success, `out_path` holds the edges in walking order and `true` is returned. The edge list
    /// is empty if `start == goal`. Otherwise `out_path` is left cleared and `false` is returned.
    /// Triangles that do not exist in `graph` are never found.
    pub fn search_connection_path(
        &mut self,
        graph: &NavmeshGraph,
        heuristic: &mut NavmeshHeuristic,
        start: TriangleId,
        goal: TriangleId,
        out_path: &mut TrianglePath,
    ) -> bool {
        out_path.clear();
        self.init_search(graph);
        if start.0 >= graph.triangle_count() || goal.0 >= graph.triangle_count() {
            return false;
        }
        if !self.search(graph, heuristic, start, goal) {
            return false;
        }
        self.generate_connection_path(graph, start, goal, out_path);
        true
    }

    fn init_search(&mut self, graph: &NavmeshGraph) {
        self.metrics = SearchMetrics::default();
        self.open.clear();
        if self.records.len() != graph.triangle_count() {
            self.records = vec![NodeRecord::default(); graph.triangle_count()];
            self.search_id = 0;
        }
        self.search_id = self.search_id.wrapping_add(1);
        if self.search_id == 0 {
            // The counter wrapped around, old stamps could collide with new ones.
            self.records.fill(NodeRecord::default());
            self.search_id = 1;
        }
    }

    /// Returns the record of `triangle`, resetting it if it belongs to an earlier search.
    fn record(&mut self, triangle: TriangleId) -> &mut NodeRecord {
        let record = &mut self.records[triangle.0];
        if record.search_id != self.search_id {
            *record = NodeRecord {
                search_id: self.search_id,
                ..Default::default()
            };
        }
        record
    }

    fn push_open(&mut self, triangle: TriangleId, estimated_total_cost: f32) {
        self.open.push(OpenEntry {
            estimated_total_cost,
            triangle,
        });
        self.metrics.open_list_additions += 1;
        self.metrics.max_open_list_size = self.metrics.max_open_list_size.max(self.open.len());
    }

    fn search(
        &mut self,
        graph: &NavmeshGraph,
        heuristic: &mut NavmeshHeuristic,
        start: TriangleId,
        goal: TriangleId,
    ) -> bool {
        let start_estimate = heuristic.estimate(graph, start, goal);
        let start_record = self.record(start);
        start_record.cost_so_far = 0.0;
        start_record.estimated_total_cost = start_estimate;
        start_record.state = NodeState::Open;
        self.push_open(start, start_estimate);

        let mut expansions = 0;
        while let Some(entry) = self.open.pop() {
            let current = entry.triangle;
            let current_record = *self.record(current);
            if current_record.state != NodeState::Open
                || current_record.estimated_total_cost != entry.estimated_total_cost
            {
                continue;
            }
            self.records[current.0].state = NodeState::Closed;
            self.metrics.visited_nodes += 1;

            if current == goal {
                return true;
            }
            if self
                .max_expansions
                .is_some_and(|max_expansions| expansions >= max_expansions)
            {
                tracing::debug!(
                    ?start,
                    ?goal,
                    expansions,
                    "Search reached its expansion limit."
                );
                return false;
            }
            expansions += 1;

            for edge_id in graph.connections(current) {
                let edge = graph.edge(edge_id);
                let node = edge.to_node();
                let node_cost = current_record.cost_so_far + edge.cost();

                let node_record = *self.record(node);
                let node_heuristic = match node_record.state {
                    NodeState::Open | NodeState::Closed => {
                        if node_record.cost_so_far <= node_cost {
                            continue;
                        }
                        node_record.estimated_total_cost - node_record.cost_so_far
                    }
                    NodeState::Unvisited => heuristic.estimate(graph, node, goal),
                };

                let estimated_total_cost = node_cost + node_heuristic;
                let record = self.record(node);
                record.cost_so_far = node_cost;
                record.connection = Some(edge_id);
                record.estimated_total_cost = estimated_total_cost;
                record.state = NodeState::Open;
                self.push_open(node, estimated_total_cost);
            }
        }
        false
    }

    fn generate_connection_path(
        &self,
        graph: &NavmeshGraph,
        start: TriangleId,
        goal: TriangleId,
        out_path: &mut TrianglePath,
    ) {
        let mut current = goal;
        while current != start {
            let Some(edge_id) = self.records[current.0].connection else {
                break;
            };
            out_path.edges.push(edge_id);
            current = graph.edge(edge_id).from_node();
        }
        out_path.edges.reverse();
    }
}
