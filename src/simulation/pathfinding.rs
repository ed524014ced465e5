//! A* routing over the stitched road network.
//!
//! The routing graph is a snapshot of the road graph taken once per
//! generation, with every edge weighted by its Euclidean length. Node indices
//! match the road graph's handles.

use bevy::prelude::*;
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::procgen::roads::RoadGraph;

/// A found route.
#[derive(Clone, Debug, PartialEq)]
pub struct CityPath {
    /// Node indices from start to goal, inclusive.
    pub nodes: Vec<usize>,
    /// Total Euclidean length.
    pub cost: f32,
}

/// Weighted adjacency for path queries.
#[derive(Clone, Debug, Default)]
pub struct PathGraph {
    graph: UnGraph<Vec2, f32>,
}

impl PathGraph {
    /// Snapshot a road graph. Call after stitching.
    pub fn from_roads(roads: &RoadGraph) -> Self {
        let mut graph = UnGraph::with_capacity(roads.node_count(), roads.edge_count());
        for (_, node) in roads.nodes() {
            graph.add_node(node.position);
        }
        for (a, b) in roads.edge_pairs() {
            let weight = graph[a].distance(graph[b]);
            graph.add_edge(a, b, weight);
        }
        Self { graph }
    }

    /// Build from explicit positions and index pairs.
    pub fn from_parts(positions: &[Vec2], edges: &[(usize, usize)]) -> Self {
        let mut graph = UnGraph::with_capacity(positions.len(), edges.len());
        for &p in positions {
            graph.add_node(p);
        }
        for &(a, b) in edges {
            let (a, b) = (NodeIndex::new(a), NodeIndex::new(b));
            let weight = graph[a].distance(graph[b]);
            graph.add_edge(a, b, weight);
        }
        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn position(&self, index: usize) -> Option<Vec2> {
        self.graph.node_weight(NodeIndex::new(index)).copied()
    }

    /// `(neighbor, weight)` pairs for a node.
    pub fn neighbors(&self, index: usize) -> Vec<(usize, f32)> {
        if index >= self.graph.node_count() {
            return Vec::new();
        }
        self.graph
            .edges(NodeIndex::new(index))
            .map(|e| {
                let other = if e.source().index() == index {
                    e.target()
                } else {
                    e.source()
                };
                (other.index(), *e.weight())
            })
            .collect()
    }

    /// Shortest route between two node indices, or `None` when unreachable.
    pub fn shortest_path(&self, start: usize, end: usize) -> Option<CityPath> {
        let count = self.graph.node_count();
        if start >= count || end >= count {
            return None;
        }
        if start == end {
            return Some(CityPath {
                nodes: vec![start],
                cost: 0.0,
            });
        }

        let goal = NodeIndex::new(end);
        let goal_pos = self.graph[goal];

        astar(
            &self.graph,
            NodeIndex::new(start),
            |n| n == goal,
            |e| *e.weight(),
            |n| self.graph[n].distance(goal_pos),
        )
        .map(|(cost, path)| CityPath {
            nodes: path.into_iter().map(|n| n.index()).collect(),
            cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> PathGraph {
        let positions = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        PathGraph::from_parts(&positions, &[(0, 1), (1, 2), (2, 3), (3, 0)])
    }

    #[test]
    fn square_route_takes_two_edges() {
        let path = unit_square().shortest_path(0, 2).unwrap();
        assert!(path.nodes == vec![0, 1, 2] || path.nodes == vec![0, 3, 2]);
        assert!((path.cost - 2.0).abs() < 1e-5);
    }

    #[test]
    fn same_node_is_a_single_element_path() {
        let graph = unit_square();
        for n in 0..4 {
            assert_eq!(graph.shortest_path(n, n).unwrap().nodes, vec![n]);
        }
    }

    #[test]
    fn disconnected_components_have_no_path() {
        let positions = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(11.0, 0.0),
        ];
        let graph = PathGraph::from_parts(&positions, &[(0, 1), (2, 3)]);
        assert!(graph.shortest_path(0, 3).is_none());
        assert!(graph.shortest_path(3, 2).is_some());
    }

    #[test]
    fn empty_graph_and_bad_indices() {
        let graph = PathGraph::default();
        assert!(graph.shortest_path(0, 1).is_none());
        assert!(unit_square().shortest_path(0, 9).is_none());
    }

    #[test]
    fn prefers_cheaper_detour_over_fewer_hops() {
        // 0 -> 3 direct is long; 0 -> 1 -> 2 -> 3 hugs the straight line.
        let positions = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.1),
            Vec2::new(2.0, 0.1),
            Vec2::new(3.0, 0.0),
            Vec2::new(1.5, 5.0),
        ];
        let graph = PathGraph::from_parts(&positions, &[(0, 4), (4, 3), (0, 1), (1, 2), (2, 3)]);
        assert_eq!(graph.shortest_path(0, 3).unwrap().nodes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn built_from_roads_keeps_indices() {
        use crate::procgen::roads::RoadType;
        let segments = [
            (Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)),
            (Vec2::new(3.0, 4.0), Vec2::new(3.0, 10.0)),
        ];
        let roads = RoadGraph::from_segments(&segments, RoadType::Main);
        let graph = PathGraph::from_roads(&roads);

        assert_eq!(graph.neighbors(1).len(), 2);
        let path = graph.shortest_path(0, 2).unwrap();
        assert_eq!(path.nodes, vec![0, 1, 2]);
        assert!((path.cost - 11.0).abs() < 1e-4);
    }
}
