//! City generation pipeline.
//!
//! Builds a complete city in one blocking call:
//! 1. Expand the grammar selected by the turn angle
//! 2. Plot it with the turtle, optionally marking district seeds
//! 3. Grow secondary districts from the marks
//! 4. Stitch dead ends into the network
//! 5. Infer blocks and place buildings
//! 6. Snapshot the routing graph
//!
//! Any structural error aborts the run before a [`City`] exists, so callers
//! never see a half-built network.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::block_extractor::infer_blocks;
use super::buildings::{place_buildings, Building, BuildingConfig};
use super::grammar::{expand, ExpansionLimit, RuleSet};
use super::parcels::Block;
use super::roads::{RoadGraph, RoadType};
use super::stitcher::{stitch, StitchConfig, StitchReport};
use super::turtle::{plot, PatternMarker, PlotConfig, PlotObserver, PlottedRoads};
use crate::error::{CityGenError, Result};
use crate::simulation::pathfinding::{CityPath, PathGraph};
use crate::tools::node_select::NodeSelection;

/// Second-generation districts grown from marked spots of the main plot.
#[derive(Clone, Debug)]
pub struct SecondaryPass {
    /// Instruction substring that marks a district seed.
    pub pattern: String,
    pub rules: RuleSet,
    pub limit: ExpansionLimit,
    pub turn_angle: f32,
    pub step_size: f32,
}

impl SecondaryPass {
    /// Branching districts hanging off the side streets of the arterial preset.
    pub fn districts(step_size: f32) -> Self {
        Self {
            pattern: "[+FF]FFF|".to_string(),
            rules: RuleSet::hexagonal(),
            limit: ExpansionLimit::DrawSymbols(40),
            turn_angle: 90.0,
            step_size,
        }
    }
}

/// Configuration for city generation.
#[derive(Resource, Clone, Debug)]
pub struct CityGenConfig {
    /// 60, 90 or 120 degrees; selects the grammar.
    pub turn_angle: f32,
    pub limit: ExpansionLimit,
    pub step_size: f32,
    /// Spur length multiplier, in (0, 1].
    pub depth_factor: f32,
    /// Fixed seed for reproducible cities.
    pub seed: Option<u64>,
    pub start: Vec2,
    /// Initial heading in degrees.
    pub heading: f32,
    pub stitch: StitchConfig,
    pub buildings: BuildingConfig,
    pub secondary: Option<SecondaryPass>,
}

impl Default for CityGenConfig {
    fn default() -> Self {
        let step_size = 15.0;
        Self {
            turn_angle: 90.0,
            limit: ExpansionLimit::DrawSymbols(600),
            step_size,
            depth_factor: 0.5,
            seed: None,
            start: Vec2::ZERO,
            heading: 90.0,
            stitch: StitchConfig::for_step(step_size),
            buildings: BuildingConfig::default(),
            secondary: None,
        }
    }
}

impl CityGenConfig {
    /// Reject out-of-range parameters before any work starts.
    pub fn validate(&self) -> Result<()> {
        RuleSet::for_angle(self.turn_angle)?;

        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(CityGenError::InvalidParameter {
                name: "step_size",
                reason: format!("must be positive, got {}", self.step_size),
            });
        }
        if !(self.depth_factor > 0.0 && self.depth_factor <= 1.0) {
            return Err(CityGenError::InvalidParameter {
                name: "depth_factor",
                reason: format!("must be in (0, 1], got {}", self.depth_factor),
            });
        }
        if !(self.stitch.segment_length > 0.0) {
            return Err(CityGenError::InvalidParameter {
                name: "stitch.segment_length",
                reason: format!("must be positive, got {}", self.stitch.segment_length),
            });
        }
        if self.buildings.min_building_size > self.buildings.max_building_size {
            return Err(CityGenError::InvalidParameter {
                name: "buildings.min_building_size",
                reason: "exceeds max_building_size".to_string(),
            });
        }
        if let Some(pass) = &self.secondary {
            if !(pass.step_size.is_finite() && pass.step_size > 0.0) {
                return Err(CityGenError::InvalidParameter {
                    name: "secondary.step_size",
                    reason: format!("must be positive, got {}", pass.step_size),
                });
            }
        }
        Ok(())
    }

    /// An RNG for this config: seeded when a seed is set, otherwise from entropy.
    pub fn make_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Counters describing one generation run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationStats {
    pub instruction_len: usize,
    pub plotted_nodes: usize,
    pub plotted_edges: usize,
    pub district_seeds: usize,
    pub road_nodes: usize,
    pub road_edges: usize,
    pub stitch: StitchReport,
    pub blocks: usize,
    pub buildings: usize,
    pub skipped_blocks: usize,
    pub unplaced_blocks: usize,
}

/// Everything produced by one generation run.
#[derive(Clone, Debug)]
pub struct City {
    /// Raw turtle output of the main plot.
    pub plotted: PlottedRoads,
    pub roads: RoadGraph,
    pub blocks: Vec<Block>,
    pub buildings: Vec<Building>,
    pub paths: PathGraph,
    pub stats: GenerationStats,
}

impl City {
    /// Road node positions; the index of each entry is its node index.
    pub fn nodes(&self) -> Vec<Vec2> {
        self.roads.positions()
    }

    pub fn edges(&self) -> Vec<(Vec2, Vec2)> {
        self.roads.edges().map(|e| (e.start, e.end)).collect()
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Node closest to a click, if any lies within `radius`.
    pub fn find_nearest_node(&self, click: Vec2, radius: f32) -> Option<usize> {
        self.roads.find_nearest(click, radius).map(|idx| idx.index())
    }

    pub fn request_path(&self, start: usize, end: usize) -> Option<CityPath> {
        self.paths.shortest_path(start, end)
    }
}

/// Run the whole pipeline.
pub fn generate_city<R: Rng + ?Sized>(config: &CityGenConfig, rng: &mut R) -> Result<City> {
    config.validate()?;
    let rules = RuleSet::for_angle(config.turn_angle)?;

    let instructions = expand(&rules, config.limit, rng)?;

    let plot_config = PlotConfig {
        start: config.start,
        heading: config.heading,
        ..PlotConfig::for_rules(&rules, config.turn_angle, config.step_size, config.depth_factor)
    };
    let mut marker = config
        .secondary
        .as_ref()
        .map(|pass| PatternMarker::new(&pass.pattern));
    let plotted = plot(
        &instructions,
        &plot_config,
        marker.as_mut().map(|m| m as &mut dyn PlotObserver),
    )?;

    let mut roads = RoadGraph::from_segments(&plotted.edges, RoadType::Main);

    let mut district_seeds = 0;
    if let (Some(pass), Some(marker)) = (&config.secondary, &marker) {
        district_seeds = marker.marks.len();
        for mark in &marker.marks {
            let branch_instructions = expand(&pass.rules, pass.limit, rng)?;
            let branch_config = PlotConfig {
                start: mark.position,
                heading: mark.heading,
                ..PlotConfig::for_rules(&pass.rules, pass.turn_angle, pass.step_size, config.depth_factor)
            };
            let branch = plot(&branch_instructions, &branch_config, None)?;
            roads.add_segments(&branch.edges, RoadType::Branch);
        }
    }

    let stitch_report = stitch(&mut roads, &config.stitch);
    let blocks = infer_blocks(&roads);
    let placement = place_buildings(&roads, &blocks, &config.buildings, rng);
    let paths = PathGraph::from_roads(&roads);

    let stats = GenerationStats {
        instruction_len: instructions.len(),
        plotted_nodes: plotted.nodes.len(),
        plotted_edges: plotted.edges.len(),
        district_seeds,
        road_nodes: roads.node_count(),
        road_edges: roads.edge_count(),
        stitch: stitch_report,
        blocks: blocks.len(),
        buildings: placement.buildings.len(),
        skipped_blocks: placement.skipped,
        unplaced_blocks: placement.unplaced,
    };

    Ok(City {
        plotted,
        roads,
        blocks,
        buildings: placement.buildings,
        paths,
        stats,
    })
}

/// Event to trigger city generation from the current [`CityGenConfig`].
#[derive(Event)]
pub struct GenerateCityEvent;

/// Sent when a generation run was rejected.
#[derive(Event, Debug)]
pub struct CityGenerationFailed(pub CityGenError);

/// Random source shared by generation runs.
#[derive(Resource)]
pub struct CityRng(pub StdRng);

impl Default for CityRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

/// The most recently generated city.
#[derive(Resource, Default)]
pub struct CurrentCity(pub Option<City>);

pub struct RoadGeneratorPlugin;

impl Plugin for RoadGeneratorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CityGenConfig>()
            .init_resource::<CityRng>()
            .init_resource::<CurrentCity>()
            .add_event::<GenerateCityEvent>()
            .add_event::<CityGenerationFailed>()
            .add_systems(Update, generate_city_on_event)
            .add_systems(Startup, trigger_initial_generation);
    }
}

fn trigger_initial_generation(mut events: EventWriter<GenerateCityEvent>) {
    events.send(GenerateCityEvent);
}

fn generate_city_on_event(
    mut events: EventReader<GenerateCityEvent>,
    config: Res<CityGenConfig>,
    mut rng: ResMut<CityRng>,
    mut current: ResMut<CurrentCity>,
    mut selection: ResMut<NodeSelection>,
    mut failures: EventWriter<CityGenerationFailed>,
) {
    for _ in events.read() {
        info!("Generating city at {}°...", config.turn_angle);

        if let Some(seed) = config.seed {
            rng.0 = StdRng::seed_from_u64(seed);
        }

        match generate_city(&config, &mut rng.0) {
            Ok(city) => {
                let stats = &city.stats;
                info!(
                    "City generation complete: {} nodes, {} edges, {} buildings",
                    stats.road_nodes, stats.road_edges, stats.buildings
                );
                info!(
                    "Stitched {} dead ends ({} left), {} of {} blocks without a building",
                    stats.stitch.stitched,
                    stats.stitch.unstitched,
                    stats.skipped_blocks + stats.unplaced_blocks,
                    stats.blocks
                );
                // Node indices from the previous city are meaningless now.
                selection.clear();
                current.0 = Some(city);
            }
            Err(err) => {
                warn!("City generation failed: {err}");
                failures.send(CityGenerationFailed(err));
            }
        }
    }
}
