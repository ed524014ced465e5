//! Road graph with a coordinate-keyed node registry.
//!
//! Uses petgraph for the underlying graph structure. Positions are rounded to
//! [`COORD_PRECISION`] before lookup, so two turtle moves that land on the same
//! spot share one node handle even when floating point drift differs.

use std::collections::HashMap;

use bevy::prelude::*;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};

/// Registry keys are positions scaled by this factor and rounded.
pub const COORD_PRECISION: f32 = 1000.0;

/// How a node came into existence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoadNodeKind {
    /// Produced by the main plot.
    Plotted,
    /// Produced by a secondary district plot.
    Branch,
    /// Inserted while stitching dead ends.
    Stitched,
}

/// A node in the road network.
#[derive(Clone, Debug)]
pub struct RoadNode {
    pub position: Vec2,
    pub kind: RoadNodeKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoadType {
    Main,
    Branch,
    Connector,
}

impl RoadType {
    fn node_kind(self) -> RoadNodeKind {
        match self {
            RoadType::Main => RoadNodeKind::Plotted,
            RoadType::Branch => RoadNodeKind::Branch,
            RoadType::Connector => RoadNodeKind::Stitched,
        }
    }
}

/// A straight road segment. Stored directed, used undirected.
#[derive(Clone, Debug)]
pub struct RoadEdge {
    pub start: Vec2,
    pub end: Vec2,
    pub length: f32,
    pub road_type: RoadType,
}

impl RoadEdge {
    pub fn new(start: Vec2, end: Vec2, road_type: RoadType) -> Self {
        Self {
            start,
            end,
            length: start.distance(end),
            road_type,
        }
    }
}

/// The road network for one generated city.
#[derive(Clone, Debug, Default)]
pub struct RoadGraph {
    pub graph: UnGraph<RoadNode, RoadEdge>,
    registry: HashMap<(i64, i64), NodeIndex>,
}

fn registry_key(position: Vec2) -> (i64, i64) {
    (
        (position.x * COORD_PRECISION).round() as i64,
        (position.y * COORD_PRECISION).round() as i64,
    )
}

impl RoadGraph {
    /// Build a graph from raw plotter edges.
    pub fn from_segments<'a>(
        segments: impl IntoIterator<Item = &'a (Vec2, Vec2)>,
        road_type: RoadType,
    ) -> Self {
        let mut graph = Self::default();
        graph.add_segments(segments, road_type);
        graph
    }

    /// Register every segment, returning how many new edges were added.
    pub fn add_segments<'a>(
        &mut self,
        segments: impl IntoIterator<Item = &'a (Vec2, Vec2)>,
        road_type: RoadType,
    ) -> usize {
        let mut added = 0;
        for (a, b) in segments {
            if self.add_road(*a, *b, road_type).is_some() {
                added += 1;
            }
        }
        added
    }

    /// Look up a node by position.
    pub fn lookup(&self, position: Vec2) -> Option<NodeIndex> {
        self.registry.get(&registry_key(position)).copied()
    }

    /// Return the handle for a position, creating the node on first sight.
    pub fn register(&mut self, position: Vec2, kind: RoadNodeKind) -> NodeIndex {
        let key = registry_key(position);
        if let Some(&idx) = self.registry.get(&key) {
            return idx;
        }
        let idx = self.graph.add_node(RoadNode { position, kind });
        self.registry.insert(key, idx);
        idx
    }

    /// Add a segment between two positions.
    ///
    /// Returns `None` for zero-length segments and for segments already
    /// present in either direction.
    pub fn add_road(&mut self, a: Vec2, b: Vec2, road_type: RoadType) -> Option<EdgeIndex> {
        let kind = road_type.node_kind();
        let ia = self.register(a, kind);
        let ib = self.register(b, kind);
        self.connect(ia, ib, road_type)
    }

    /// Add an edge between two registered nodes.
    pub fn connect(&mut self, a: NodeIndex, b: NodeIndex, road_type: RoadType) -> Option<EdgeIndex> {
        if a == b || self.graph.find_edge(a, b).is_some() {
            return None;
        }
        let edge = RoadEdge::new(self.graph[a].position, self.graph[b].position, road_type);
        Some(self.graph.add_edge(a, b, edge))
    }

    /// Find the nearest node within a radius. Ties go to the lower index.
    pub fn find_nearest(&self, position: Vec2, max_distance: f32) -> Option<NodeIndex> {
        let mut best: Option<(NodeIndex, f32)> = None;

        for (idx, node) in self.nodes() {
            let dist = position.distance(node.position);
            if dist > max_distance {
                continue;
            }
            match best {
                Some((_, best_dist)) if best_dist <= dist => {}
                _ => best = Some((idx, dist)),
            }
        }

        best.map(|(idx, _)| idx)
    }

    /// Get all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &RoadNode)> {
        self.graph.node_indices().map(|i| (i, &self.graph[i]))
    }

    /// Node positions in handle order.
    pub fn positions(&self) -> Vec<Vec2> {
        self.graph.node_weights().map(|n| n.position).collect()
    }

    /// Get all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &RoadEdge> {
        self.graph.edge_weights()
    }

    /// Edge endpoints as handles, in insertion order.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn position(&self, idx: NodeIndex) -> Vec2 {
        self.graph[idx].position
    }

    /// Get neighbor node indices for a given node.
    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn has_edge(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph.find_edge(a, b).is_some()
    }

    /// Get the degree (number of connected edges) of a node.
    pub fn node_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    /// Nodes with degree <= 1, in index order.
    pub fn dead_ends(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| self.node_degree(idx) <= 1)
            .collect()
    }
}
