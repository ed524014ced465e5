//! City block extraction from the road graph.
//!
//! Walks the edge list in insertion order and treats every maximal chain of
//! edges (each starting where the previous one ended) as the outline of a
//! block. This follows the turtle's drawing order rather than computing true
//! planar faces, so blocks may be non-simple or overlap on busy branches.

use bevy::prelude::*;
use petgraph::graph::NodeIndex;

use super::parcels::Block;
use super::roads::RoadGraph;

/// Infer blocks from chained edges.
pub fn infer_blocks(roads: &RoadGraph) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut run: Vec<NodeIndex> = Vec::new();

    for (a, b) in roads.edge_pairs() {
        if run.last() == Some(&a) {
            if run.first() == Some(&b) {
                // The chain returned to its first node: the outline is closed.
                close_run(roads, &mut run, &mut blocks);
            } else {
                run.push(b);
            }
            continue;
        }

        close_run(roads, &mut run, &mut blocks);
        run.push(a);
        run.push(b);
    }

    close_run(roads, &mut run, &mut blocks);

    debug!("Inferred {} blocks from {} edges", blocks.len(), roads.edge_count());
    blocks
}

fn close_run(roads: &RoadGraph, run: &mut Vec<NodeIndex>, blocks: &mut Vec<Block>) {
    let mut distinct = run.clone();
    distinct.sort_unstable();
    distinct.dedup();

    if distinct.len() >= 3 {
        blocks.push(Block::new(run.iter().map(|&idx| roads.position(idx)).collect()));
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::roads::RoadType;

    #[test]
    fn closed_square_becomes_one_block() {
        let p = [
            Vec2::new(0.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(0.0, 20.0),
        ];
        let segments = [(p[0], p[1]), (p[1], p[2]), (p[2], p[3]), (p[3], p[0])];
        let roads = RoadGraph::from_segments(&segments, RoadType::Main);

        let blocks = infer_blocks(&roads);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].vertices, p.to_vec());
        assert!((blocks[0].area - 400.0).abs() < 1e-3);
    }

    #[test]
    fn broken_chain_starts_a_new_run() {
        let segments = [
            (Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)),
            (Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)),
            // jump: does not start at (10, 10)
            (Vec2::new(50.0, 0.0), Vec2::new(60.0, 0.0)),
            (Vec2::new(60.0, 0.0), Vec2::new(60.0, 10.0)),
            (Vec2::new(60.0, 10.0), Vec2::new(50.0, 10.0)),
        ];
        let roads = RoadGraph::from_segments(&segments, RoadType::Main);

        let blocks = infer_blocks(&roads);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].vertices.len(), 3);
        assert_eq!(blocks[1].vertices.len(), 4);
    }

    #[test]
    fn two_point_runs_are_dropped() {
        let segments = [
            (Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)),
            (Vec2::new(30.0, 0.0), Vec2::new(40.0, 0.0)),
        ];
        let roads = RoadGraph::from_segments(&segments, RoadType::Main);
        assert!(infer_blocks(&roads).is_empty());
    }
}
