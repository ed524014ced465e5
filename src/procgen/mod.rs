//! Procedural generation systems.
//!
//! - L-system grammars expanded into turtle instructions
//! - Turtle plotting into a deduplicated road graph
//! - Dead-end stitching
//! - Block inference and building placement

use bevy::prelude::*;

pub mod block_extractor;
pub mod buildings;
pub mod grammar;
pub mod lot_geometry;
pub mod parcels;
pub mod road_generator;
pub mod roads;
pub mod stitcher;
pub mod turtle;

pub struct ProcgenPlugin;

impl Plugin for ProcgenPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(road_generator::RoadGeneratorPlugin);
    }
}
