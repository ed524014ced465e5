//! Headless city generation demo.
//!
//! Usage: `lsystem_city [angle] [draw_symbols] [seed]`
//!
//! Generates a city, then clicks the first node and the node farthest from
//! it and logs the route between them.

use bevy::log::LogPlugin;
use bevy::prelude::*;

use lsystem_city::procgen::grammar::ExpansionLimit;
use lsystem_city::{
    CityGenConfig, CityGenPlugin, CityGenerationFailed, CurrentCity, NodeClickEvent,
    PathFoundEvent, SecondaryPass,
};

fn main() {
    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(LogPlugin::default())
        .insert_resource(config_from_args())
        .add_plugins(CityGenPlugin)
        .add_systems(Update, (click_far_apart_nodes, exit_when_done))
        .run();
}

fn config_from_args() -> CityGenConfig {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = CityGenConfig::default();

    if let Some(angle) = args.first().and_then(|a| a.parse::<f32>().ok()) {
        config.turn_angle = angle;
    }
    if let Some(target) = args.get(1).and_then(|a| a.parse::<usize>().ok()) {
        config.limit = ExpansionLimit::DrawSymbols(target);
    }
    config.seed = args.get(2).and_then(|a| a.parse::<u64>().ok());

    // Arterial layouts get branching districts off their side streets.
    if config.turn_angle == 120.0 {
        config.secondary = Some(SecondaryPass::districts(config.step_size * 0.8));
    }

    config
}

fn click_far_apart_nodes(
    current: Res<CurrentCity>,
    mut clicks: EventWriter<NodeClickEvent>,
    mut done: Local<bool>,
) {
    if *done {
        return;
    }
    let Some(city) = current.0.as_ref() else {
        return;
    };
    *done = true;

    let nodes = city.nodes();
    let Some(&first) = nodes.first() else {
        warn!("Generated city has no roads");
        return;
    };
    let far = nodes
        .iter()
        .copied()
        .max_by(|a, b| first.distance(*a).total_cmp(&first.distance(*b)))
        .unwrap_or(first);

    clicks.send(NodeClickEvent::at(first));
    clicks.send(NodeClickEvent::at(far));
}

fn exit_when_done(
    current: Res<CurrentCity>,
    mut paths: EventReader<PathFoundEvent>,
    mut failures: EventReader<CityGenerationFailed>,
    mut exit: EventWriter<AppExit>,
) {
    if failures.read().next().is_some() {
        exit.send(AppExit::error());
        return;
    }
    if paths.read().next().is_some() {
        exit.send(AppExit::Success);
        return;
    }
    if current.0.as_ref().is_some_and(|city| city.nodes().len() < 2) {
        exit.send(AppExit::Success);
    }
}
