//! Static adjacency graph of the 45 intersections
//!
//! Every node connects orthogonally to its grid neighbours. Diagonal lines
//! exist only between strong nodes (`(row + col) % 2 == 0`); since a diagonal
//! step preserves the parity of `row + col`, both ends of a diagonal are
//! always strong.

use std::sync::OnceLock;

use smallvec::SmallVec;

use super::{Direction, Pos, NODE_COUNT};

/// One intersection and its neighbours (ascending node id).
#[derive(Debug, Clone)]
pub struct Node {
    pub id: u8,
    pub pos: Pos,
    pub strong: bool,
    pub neighbors: SmallVec<[Pos; 8]>,
}

/// Read-only adjacency graph shared by every board.
#[derive(Debug)]
pub struct Topology {
    nodes: Vec<Node>,
}

impl Topology {
    fn build() -> Self {
        let nodes = (0..NODE_COUNT)
            .map(|id| {
                let pos = Pos::from_index(id);
                let strong = pos.is_strong();
                let mut neighbors: SmallVec<[Pos; 8]> = Direction::ALL
                    .iter()
                    .filter(|dir| strong || !dir.is_diagonal())
                    .filter_map(|&dir| pos.offset(dir))
                    .collect();
                neighbors.sort();
                Node {
                    id: id as u8,
                    pos,
                    strong,
                    neighbors,
                }
            })
            .collect();
        Self { nodes }
    }

    #[inline]
    pub fn node(&self, pos: Pos) -> Option<&Node> {
        if pos.is_on_board() {
            self.nodes.get(pos.to_index())
        } else {
            None
        }
    }

    /// Neighbours of `pos`; empty for off-board positions.
    #[inline]
    pub fn neighbors(&self, pos: Pos) -> &[Pos] {
        match self.node(pos) {
            Some(n) => n.neighbors.as_slice(),
            None => &[],
        }
    }

    /// Whether a line joins `a` and `b` directly.
    #[inline]
    pub fn are_adjacent(&self, a: Pos, b: Pos) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Whether a line leaves `pos` along `dir`.
    #[inline]
    pub fn has_line(&self, pos: Pos, dir: Direction) -> bool {
        match pos.offset(dir) {
            Some(next) => !dir.is_diagonal() || (pos.is_strong() && next.is_strong()),
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

/// The standard 5x9 board graph, built on first use.
pub fn topology() -> &'static Topology {
    static TOPOLOGY: OnceLock<Topology> = OnceLock::new();
    TOPOLOGY.get_or_init(Topology::build)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_count() {
        assert_eq!(topology().iter().count(), 45);
    }

    #[test]
    fn test_corner_neighbors() {
        let topo = topology();
        // (0,0) is strong: right, down, and the diagonal
        let n = topo.neighbors(Pos::new(0, 0));
        assert_eq!(n, &[Pos::new(0, 1), Pos::new(1, 0), Pos::new(1, 1)]);

        // (0,1) is weak: orthogonal only
        let n = topo.neighbors(Pos::new(0, 1));
        assert_eq!(n, &[Pos::new(0, 0), Pos::new(0, 2), Pos::new(1, 1)]);
    }

    #[test]
    fn test_center_has_eight_neighbors() {
        let topo = topology();
        let center = Pos::new(2, 4);
        assert!(topo.node(center).unwrap().strong);
        assert_eq!(topo.neighbors(center).len(), 8);
    }

    #[test]
    fn test_weak_node_has_no_diagonals() {
        let topo = topology();
        let weak = Pos::new(2, 3);
        assert!(!topo.node(weak).unwrap().strong);
        assert_eq!(topo.neighbors(weak).len(), 4);
        assert!(!topo.are_adjacent(weak, Pos::new(1, 2)));
        assert!(!topo.has_line(weak, Direction::new(1, 1)));
    }

    #[test]
    fn test_adjacency_symmetric() {
        let topo = topology();
        for node in topo.iter() {
            for &n in &node.neighbors {
                assert!(topo.are_adjacent(n, node.pos), "{} <-> {}", node.pos, n);
            }
        }
    }

    #[test]
    fn test_off_board_has_no_neighbors() {
        assert!(topology().neighbors(Pos::INVALID).is_empty());
        assert!(topology().node(Pos::INVALID).is_none());
    }
}
