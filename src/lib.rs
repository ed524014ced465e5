//! L-system city generator.
//!
//! Expands a stochastic grammar into a road network, closes dead ends,
//! fills the resulting blocks with buildings and answers shortest-route
//! queries between road nodes.

use bevy::prelude::*;

pub mod error;
pub mod procgen;
pub mod simulation;
pub mod tools;
pub mod world;

pub use error::{CityGenError, Result};
pub use procgen::road_generator::{
    generate_city, City, CityGenConfig, CityGenerationFailed, CurrentCity, GenerateCityEvent,
    SecondaryPass,
};
pub use tools::node_select::{NodeClickEvent, PathFoundEvent};

/// Registers generation and node selection.
pub struct CityGenPlugin;

impl Plugin for CityGenPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(tools::ToolsPlugin)
            .add_plugins(procgen::ProcgenPlugin);
    }
}
