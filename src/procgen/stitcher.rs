//! Dead-end stitching.
//!
//! Grammar output leaves many roads ending in the middle of nowhere. Each
//! dead end (degree <= 1) is joined to a nearby node, either with a straight
//! connector when the two share an x or y coordinate, or with an L-shaped
//! connector through a right-angle corner. Connectors are cut into pieces no
//! longer than `segment_length` so later stages see evenly sized edges.

use std::cmp::Ordering;

use bevy::prelude::*;
use petgraph::graph::NodeIndex;
use smallvec::{smallvec, SmallVec};

use super::lot_geometry::{point_inside_segment, segments_cross, segments_overlap};
use super::roads::{RoadGraph, RoadType};
use crate::world::grid::SpatialGrid;

/// Coordinates closer than this count as aligned.
const ALIGN_EPS: f32 = 1e-3;

/// A stitch path: leaf, optional corner, target.
type Route = SmallVec<[Vec2; 3]>;

/// Settings for dead-end stitching.
#[derive(Clone, Debug)]
pub struct StitchConfig {
    /// Longest connector (Manhattan length) that will be built.
    pub acceptance_radius: f32,
    /// Maximum length of a single connector piece.
    pub segment_length: f32,
    /// Ceiling on full passes over the remaining dead ends.
    pub max_passes: usize,
}

impl StitchConfig {
    /// Defaults scaled to the plotting step.
    pub fn for_step(step_size: f32) -> Self {
        Self {
            acceptance_radius: step_size * 3.0,
            segment_length: step_size,
            max_passes: 8,
        }
    }
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self::for_step(15.0)
    }
}

/// Outcome of a stitching run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StitchReport {
    pub passes: usize,
    /// Dead ends that received a connector.
    pub stitched: usize,
    /// Dead ends left after the final pass.
    pub unstitched: usize,
    pub nodes_added: usize,
    pub edges_added: usize,
}

#[derive(Clone, Copy)]
struct Candidate {
    node: NodeIndex,
    position: Vec2,
    cost: f32,
}

/// Connect dead ends to nearby nodes until none remain or no progress is made.
pub fn stitch(roads: &mut RoadGraph, config: &StitchConfig) -> StitchReport {
    let nodes_before = roads.node_count();
    let edges_before = roads.edge_count();
    let mut grid = SpatialGrid::from_roads(roads, config.acceptance_radius);
    let mut report = StitchReport::default();

    for pass in 0..config.max_passes {
        let leaves = roads.dead_ends();
        if leaves.is_empty() {
            break;
        }
        report.passes = pass + 1;

        let mut stitched = 0;
        for leaf in leaves {
            // An earlier connector in this pass may already have reached it.
            if roads.node_degree(leaf) > 1 {
                continue;
            }
            if let Some(route) = find_route(roads, &grid, leaf, config) {
                lay_route(roads, &mut grid, &route, config.segment_length);
                stitched += 1;
            }
        }

        debug!("Stitch pass {}: {} dead ends connected", pass + 1, stitched);
        report.stitched += stitched;
        if stitched == 0 {
            break;
        }
    }

    report.unstitched = roads.dead_ends().len();
    report.nodes_added = roads.node_count() - nodes_before;
    report.edges_added = roads.edge_count() - edges_before;

    if report.unstitched > 0 {
        info!(
            "{} dead ends left unstitched (no candidate within {:.1})",
            report.unstitched, config.acceptance_radius
        );
    }

    report
}

fn is_aligned(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < ALIGN_EPS || (a.y - b.y).abs() < ALIGN_EPS
}

fn by_cost(a: &Candidate, b: &Candidate) -> Ordering {
    a.cost
        .partial_cmp(&b.cost)
        .unwrap_or(Ordering::Equal)
        .then(a.node.cmp(&b.node))
}

/// Pick the cheapest conflict-free connector for a dead end.
fn find_route(
    roads: &RoadGraph,
    grid: &SpatialGrid,
    leaf: NodeIndex,
    config: &StitchConfig,
) -> Option<Route> {
    let origin = roads.position(leaf);
    let neighbors: SmallVec<[NodeIndex; 2]> = roads.neighbors(leaf).collect();

    let (mut aligned, mut general): (Vec<Candidate>, Vec<Candidate>) = grid
        .query_radius(origin, config.acceptance_radius)
        .into_iter()
        .filter(|(node, _)| *node != leaf && !neighbors.contains(node))
        .map(|(node, position)| {
            let delta = (position - origin).abs();
            Candidate {
                node,
                position,
                cost: delta.x + delta.y,
            }
        })
        .filter(|c| c.cost > ALIGN_EPS && c.cost <= config.acceptance_radius)
        .partition(|c| is_aligned(origin, c.position));

    aligned.sort_by(by_cost);
    general.sort_by(by_cost);

    let straight = aligned
        .iter()
        .map(|c| -> Route { smallvec![origin, c.position] })
        .find(|route| route_is_clear(roads, route));
    if straight.is_some() {
        return straight;
    }

    general.iter().find_map(|c| {
        let corners = [
            Vec2::new(origin.x, c.position.y),
            Vec2::new(c.position.x, origin.y),
        ];
        corners
            .into_iter()
            .map(|corner| -> Route { smallvec![origin, corner, c.position] })
            .find(|route| route_is_clear(roads, route))
    })
}

fn route_is_clear(roads: &RoadGraph, route: &Route) -> bool {
    let corners = &route[1..route.len() - 1];
    corners.iter().all(|&corner| !lands_on_road(roads, corner))
        && route.windows(2).all(|leg| !leg_conflicts(roads, leg[0], leg[1]))
}

/// A corner on the interior of a road would join it without a junction.
fn lands_on_road(roads: &RoadGraph, point: Vec2) -> bool {
    roads
        .edges()
        .any(|edge| point_inside_segment(point, edge.start, edge.end))
}

/// A leg conflicts when it crosses a road, runs along one, or passes
/// through an existing node.
fn leg_conflicts(roads: &RoadGraph, from: Vec2, to: Vec2) -> bool {
    roads.edges().any(|edge| {
        segments_cross(from, to, edge.start, edge.end)
            || segments_overlap(from, to, edge.start, edge.end)
            || point_inside_segment(edge.start, from, to)
            || point_inside_segment(edge.end, from, to)
    })
}

/// Insert a route as evenly subdivided connector edges.
fn lay_route(roads: &mut RoadGraph, grid: &mut SpatialGrid, route: &Route, segment_length: f32) {
    for leg in route.windows(2) {
        let (from, to) = (leg[0], leg[1]);
        let pieces = (from.distance(to) / segment_length - ALIGN_EPS).ceil().max(1.0) as usize;

        let mut prev = from;
        for i in 1..=pieces {
            let next = if i == pieces {
                to
            } else {
                from.lerp(to, i as f32 / pieces as f32)
            };

            let count = roads.node_count();
            roads.add_road(prev, next, RoadType::Connector);
            for idx in count..roads.node_count() {
                let node = NodeIndex::new(idx);
                grid.insert(node, roads.position(node));
            }
            prev = next;
        }
    }
}
