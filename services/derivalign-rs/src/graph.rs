//! Tie DAG over the alignment matrix.
//!
//! Each reachable cell is a node; each retained tie move is an edge from
//! the cell it starts in to the cell it lands in. Every origin-to-final
//! path in this graph is one minimal alignment.

use ahash::AHashMap;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::matrix::{Matrix, Position};
use crate::types::Operation;

/// Cells reachable backwards from the final cell through tie moves
pub struct TieGraph {
    graph: DiGraph<Position, Operation>,
    node_map: AHashMap<Position, NodeIndex>,
    sink: NodeIndex,
}

impl TieGraph {
    /// Walk tie moves back from the final cell
    pub fn from_matrix(matrix: &Matrix) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = AHashMap::new();

        let final_pos = matrix.final_position();
        let sink = graph.add_node(final_pos);
        node_map.insert(final_pos, sink);

        let mut stack = vec![final_pos];
        while let Some(pos) = stack.pop() {
            let target = node_map[&pos];
            for mv in matrix.cell(pos).moves() {
                let source = match node_map.get(&mv.from) {
                    Some(&idx) => idx,
                    None => {
                        let idx = graph.add_node(mv.from);
                        node_map.insert(mv.from, idx);
                        stack.push(mv.from);
                        idx
                    }
                };
                graph.add_edge(source, target, mv.op.clone());
            }
        }

        Self {
            graph,
            node_map,
            sink,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.node_map.contains_key(&pos)
    }

    /// Number of distinct origin-to-final paths, saturating at `u64::MAX`
    pub fn path_count(&self) -> u64 {
        let origin = match self.node_map.get(&(0, 0)) {
            Some(&idx) => idx,
            None => return 0,
        };
        // Moves always point to larger positions, so the graph is acyclic
        let order = match toposort(&self.graph, None) {
            Ok(order) => order,
            Err(_) => return 0,
        };

        let mut counts = vec![0u64; self.graph.node_count()];
        counts[origin.index()] = 1;
        for node in order {
            let here = counts[node.index()];
            if here == 0 {
                continue;
            }
            for edge in self.graph.edges(node) {
                let slot = &mut counts[edge.target().index()];
                *slot = slot.saturating_add(here);
            }
        }
        counts[self.sink.index()]
    }

    /// Cells where more than one move ties
    pub fn branching_cells(&self) -> Vec<Position> {
        let mut cells: Vec<Position> = self
            .graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .edges_directed(idx, petgraph::Direction::Incoming)
                    .count()
                    > 1
            })
            .map(|idx| self.graph[idx])
            .collect();
        cells.sort_unstable();
        cells
    }

    /// Export graph to JSON for inspection
    pub fn to_json(&self) -> String {
        let nodes: Vec<_> = self
            .graph
            .node_indices()
            .map(|idx| {
                let (row, col) = self.graph[idx];
                serde_json::json!({ "row": row, "col": col })
            })
            .collect();

        let edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|edge| {
                let (from_row, from_col) = self.graph[edge.source()];
                let (to_row, to_col) = self.graph[edge.target()];
                serde_json::json!({
                    "from": [from_row, from_col],
                    "to": [to_row, to_col],
                    "op": edge.weight().to_string(),
                })
            })
            .collect();

        serde_json::json!({
            "nodes": nodes,
            "edges": edges,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::UniformCost;
    use crate::matrix::compute_alignment;

    #[test]
    fn test_identity_has_single_path() {
        let m = compute_alignment(&["a", "b", "c"], &["a", "b", "c"], &UniformCost::default())
            .unwrap();
        let g = TieGraph::from_matrix(&m);
        assert_eq!(g.path_count(), 1);
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 4);
        assert!(g.branching_cells().is_empty());
    }

    #[test]
    fn test_swap_counts_paths() {
        // ab -> ba: sub+sub, del a/nop b/ins a, ins b/nop a/del b
        let m = compute_alignment(&["a", "b"], &["b", "a"], &UniformCost::default()).unwrap();
        let g = TieGraph::from_matrix(&m);
        assert_eq!(g.path_count(), 3);
        assert_eq!((g.node_count(), g.edge_count()), (8, 9));
        assert!(g.contains((0, 0)));
        assert_eq!(g.branching_cells(), vec![(2, 2)]);
    }

    #[test]
    fn test_json_export() {
        let m = compute_alignment(&["a"], &["b"], &UniformCost::default()).unwrap();
        let g = TieGraph::from_matrix(&m);
        let value: serde_json::Value = serde_json::from_str(&g.to_json()).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), g.node_count());
        assert_eq!(value["edges"][0]["op"], "nop");
    }
}
