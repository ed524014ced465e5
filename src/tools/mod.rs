//! Tools for interacting with a generated city.

use bevy::prelude::*;

pub mod node_select;

pub struct ToolsPlugin;

impl Plugin for ToolsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(node_select::NodeSelectPlugin);
    }
}
