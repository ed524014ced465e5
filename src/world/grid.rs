//! Spatial hash over road nodes for radius queries.

use bevy::prelude::*;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

use crate::procgen::roads::RoadGraph;

/// Spatial hash grid for node lookups.
#[derive(Clone, Debug, Default)]
pub struct SpatialGrid {
    pub cell_size: f32,
    pub cells: HashMap<(i32, i32), Vec<(NodeIndex, Vec2)>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: HashMap::new(),
        }
    }

    /// Index every node of a road graph.
    pub fn from_roads(roads: &RoadGraph, cell_size: f32) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, node) in roads.nodes() {
            grid.insert(idx, node.position);
        }
        grid
    }

    /// Convert world position to cell coordinates.
    pub fn to_cell(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    /// Insert a node at a position.
    pub fn insert(&mut self, node: NodeIndex, pos: Vec2) {
        let cell = self.to_cell(pos);
        self.cells.entry(cell).or_default().push((node, pos));
    }

    /// Nodes within `radius` of `center`, in cell scan order.
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<(NodeIndex, Vec2)> {
        let min_cell = self.to_cell(center - Vec2::splat(radius));
        let max_cell = self.to_cell(center + Vec2::splat(radius));

        let mut result = Vec::new();

        for cx in min_cell.0..=max_cell.0 {
            for cy in min_cell.1..=max_cell.1 {
                if let Some(entries) = self.cells.get(&(cx, cy)) {
                    result.extend(
                        entries
                            .iter()
                            .filter(|(_, pos)| pos.distance(center) <= radius),
                    );
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_filters_by_true_distance() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(NodeIndex::new(0), Vec2::new(0.0, 0.0));
        grid.insert(NodeIndex::new(1), Vec2::new(9.0, 9.0));
        grid.insert(NodeIndex::new(2), Vec2::new(35.0, 0.0));

        let mut hits: Vec<usize> = grid
            .query_radius(Vec2::ZERO, 10.0)
            .into_iter()
            .map(|(idx, _)| idx.index())
            .collect();
        hits.sort_unstable();
        // (9, 9) is ~12.7 away even though its cell is adjacent.
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn negative_coordinates_land_in_their_own_cells() {
        let grid = SpatialGrid::new(10.0);
        assert_eq!(grid.to_cell(Vec2::new(-0.5, 0.5)), (-1, 0));
    }
}
