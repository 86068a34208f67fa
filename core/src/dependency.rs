// ssheet-core/src/dependency.rs
// The bidirectional reference graph between formula cells, and the cycle
// check / rewiring primitives the sheet's write path drives.
//
// Edges never live inside a `Cell` (see design note: avoid owning
// back-references between cells) — they live here, keyed by `Position`,
// owned by the sheet alongside its cell storage.

use std::collections::HashSet;

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::position::Position;

/// `referenced(A)` = out-neighbours of A. `dependents(B)` = in-neighbours
/// of B. An edge A -> B means "A reads B".
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraphMap<Position, ()>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph { graph: DiGraphMap::new() }
    }

    pub fn ensure_node(&mut self, pos: Position) {
        self.graph.add_node(pos);
    }

    pub fn referenced(&self, pos: Position) -> Vec<Position> {
        self.graph.neighbors_directed(pos, Direction::Outgoing).collect()
    }

    pub fn dependents(&self, pos: Position) -> Vec<Position> {
        self.graph.neighbors_directed(pos, Direction::Incoming).collect()
    }

    pub fn is_referenced(&self, pos: Position) -> bool {
        self.graph.neighbors_directed(pos, Direction::Incoming).next().is_some()
    }

    /// Would installing `new_refs` as `pos`'s out-edges create a cycle?
    /// Pure query — never mutates the graph.
    ///
    /// A cycle forms iff `pos` is reachable from one of its prospective
    /// out-neighbours by following existing `referenced` (outgoing) edges
    /// — i.e. one of the cells `pos` would now read already, transitively,
    /// reads `pos`. A direct self-reference is the degenerate case of this.
    pub fn would_cycle(&self, pos: Position, new_refs: &[Position]) -> bool {
        if new_refs.contains(&pos) {
            return true;
        }
        let mut visited = HashSet::new();
        let mut stack: Vec<Position> = new_refs.to_vec();
        while let Some(current) = stack.pop() {
            if current == pos {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(self.graph.neighbors_directed(current, Direction::Outgoing));
        }
        false
    }

    /// Replace `pos`'s out-edges with `new_refs`. Callers must have already
    /// materialised a node for every position in `new_refs` (invariant 5).
    pub fn rewire(&mut self, pos: Position, new_refs: &[Position]) {
        self.ensure_node(pos);
        for old_ref in self.referenced(pos) {
            self.graph.remove_edge(pos, old_ref);
        }
        for &new_ref in new_refs {
            self.graph.add_edge(pos, new_ref, ());
        }
    }
}
