//! Start/end node selection for route queries.
//!
//! The first accepted click picks the start node, the second distinct click
//! picks the end node and requests a route. Clicking the start node again is
//! refused and keeps the current selection.

use bevy::prelude::*;

use crate::procgen::road_generator::CurrentCity;
use crate::simulation::pathfinding::CityPath;

/// Click radius used when the caller has no preference.
pub const DEFAULT_PICK_RADIUS: f32 = 10.0;

pub struct NodeSelectPlugin;

impl Plugin for NodeSelectPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NodeSelection>()
            .add_event::<NodeClickEvent>()
            .add_event::<PathFoundEvent>()
            .add_systems(Update, handle_node_clicks);
    }
}

/// A click in world coordinates.
#[derive(Event, Clone, Copy, Debug)]
pub struct NodeClickEvent {
    pub position: Vec2,
    pub radius: f32,
}

impl NodeClickEvent {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            radius: DEFAULT_PICK_RADIUS,
        }
    }
}

/// Result of a route request. `path` is `None` when the nodes are not connected.
#[derive(Event, Clone, Debug)]
pub struct PathFoundEvent {
    pub start: usize,
    pub end: usize,
    pub path: Option<CityPath>,
}

/// Current selection state.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeSelection {
    pub start: Option<usize>,
}

/// What a click on a node did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The node is now the route start.
    StartSelected(usize),
    /// The node is already the start; nothing changed.
    SameNode(usize),
    /// Both ends are known. The selection has been cleared.
    PathRequested { start: usize, end: usize },
}

impl NodeSelection {
    pub fn click(&mut self, node: usize) -> SelectionOutcome {
        match self.start {
            None => {
                self.start = Some(node);
                SelectionOutcome::StartSelected(node)
            }
            Some(start) if start == node => SelectionOutcome::SameNode(node),
            Some(start) => {
                self.start = None;
                SelectionOutcome::PathRequested { start, end: node }
            }
        }
    }

    pub fn clear(&mut self) {
        self.start = None;
    }
}

fn handle_node_clicks(
    mut clicks: EventReader<NodeClickEvent>,
    current: Res<CurrentCity>,
    mut selection: ResMut<NodeSelection>,
    mut found: EventWriter<PathFoundEvent>,
) {
    let Some(city) = current.0.as_ref() else {
        clicks.clear();
        return;
    };

    for click in clicks.read() {
        let Some(node) = city.find_nearest_node(click.position, click.radius) else {
            debug!("No node within {:.1} of {:?}", click.radius, click.position);
            continue;
        };

        match selection.click(node) {
            SelectionOutcome::StartSelected(start) => {
                info!("Start node {} selected", start);
            }
            SelectionOutcome::SameNode(node) => {
                warn!("Node {} is already the start; pick a different end node", node);
            }
            SelectionOutcome::PathRequested { start, end } => {
                let path = city.request_path(start, end);
                match &path {
                    Some(p) => info!(
                        "Path {} -> {}: {} nodes, length {:.1}",
                        start,
                        end,
                        p.nodes.len(),
                        p.cost
                    ),
                    None => info!("No path between {} and {}", start, end),
                }
                found.send(PathFoundEvent { start, end, path });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::road_generator::{generate_city, CityGenConfig};
    use crate::procgen::grammar::ExpansionLimit;

    #[test]
    fn two_distinct_clicks_request_a_path() {
        let mut selection = NodeSelection::default();
        assert_eq!(selection.click(3), SelectionOutcome::StartSelected(3));
        assert_eq!(
            selection.click(8),
            SelectionOutcome::PathRequested { start: 3, end: 8 }
        );
        assert_eq!(selection, NodeSelection::default());
    }

    #[test]
    fn repeated_start_click_is_rejected_without_reset() {
        let mut selection = NodeSelection::default();
        selection.click(5);
        assert_eq!(selection.click(5), SelectionOutcome::SameNode(5));
        assert_eq!(selection.start, Some(5));
        assert_eq!(
            selection.click(6),
            SelectionOutcome::PathRequested { start: 5, end: 6 }
        );
    }

    #[derive(Resource, Default)]
    struct Received(Vec<PathFoundEvent>);

    fn collect(mut events: EventReader<PathFoundEvent>, mut received: ResMut<Received>) {
        received.0.extend(events.read().cloned());
    }

    #[test]
    fn clicks_on_two_nodes_send_a_path() {
        let config = CityGenConfig {
            limit: ExpansionLimit::DrawSymbols(120),
            seed: Some(11),
            ..default()
        };
        let city = generate_city(&config, &mut config.make_rng()).unwrap();
        let nodes = city.nodes();
        let (a, b) = (nodes[0], nodes[nodes.len() - 1]);

        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(CurrentCity(Some(city)))
            .add_plugins(NodeSelectPlugin)
            .init_resource::<Received>()
            .add_systems(PostUpdate, collect);

        app.world_mut().send_event(NodeClickEvent::at(a));
        app.update();
        assert_eq!(app.world().resource::<NodeSelection>().start, Some(0));

        app.world_mut().send_event(NodeClickEvent::at(b));
        app.update();

        let received = &app.world().resource::<Received>().0;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].start, 0);
        assert_eq!(received[0].end, nodes.len() - 1);
        assert_eq!(app.world().resource::<NodeSelection>().start, None);
    }

    #[test]
    fn clicks_far_from_any_node_are_ignored() {
        let config = CityGenConfig {
            limit: ExpansionLimit::DrawSymbols(60),
            seed: Some(2),
            ..default()
        };
        let city = generate_city(&config, &mut config.make_rng()).unwrap();

        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(CurrentCity(Some(city)))
            .add_plugins(NodeSelectPlugin);

        app.world_mut().send_event(NodeClickEvent::at(Vec2::splat(1.0e6)));
        app.update();
        assert_eq!(*app.world().resource::<NodeSelection>(), NodeSelection::default());
    }
}
