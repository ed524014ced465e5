//! Building placement inside inferred blocks.
//!
//! Each block gets at most one building: a random axis-aligned rectangle drawn
//! inside the block's bounding box, kept only if its centre is inside the block
//! outline, no road touches it, and it overlaps no earlier building.

use bevy::prelude::*;
use rand::Rng;

use super::lot_geometry::{rects_overlap, segment_intersects_rect};
use super::parcels::Block;
use super::roads::RoadGraph;

/// Settings for building placement.
#[derive(Clone, Debug)]
pub struct BuildingConfig {
    /// Blocks smaller than this are skipped without drawing any randomness.
    pub min_block_area: f32,
    pub min_building_size: f32,
    pub max_building_size: f32,
    /// Random rectangles tried per block before giving up.
    pub max_attempts: usize,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            min_block_area: 100.0,
            min_building_size: 4.0,
            max_building_size: 12.0,
            max_attempts: 20,
        }
    }
}

/// A placed building footprint.
#[derive(Clone, Debug, PartialEq)]
pub struct Building {
    pub footprint: Rect,
    /// Index of the block it was placed in.
    pub block: usize,
}

impl Building {
    /// `(x, y, width, height)` with `(x, y)` the minimum corner.
    pub fn xywh(&self) -> (f32, f32, f32, f32) {
        (
            self.footprint.min.x,
            self.footprint.min.y,
            self.footprint.width(),
            self.footprint.height(),
        )
    }
}

/// Result of trying to fill one block.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementOutcome {
    pub attempts: usize,
    pub footprint: Option<Rect>,
}

/// Result of a full placement run.
#[derive(Clone, Debug, Default)]
pub struct PlacementReport {
    pub buildings: Vec<Building>,
    /// Attempts spent per block, in block order.
    pub attempts: Vec<usize>,
    /// Blocks below the area threshold or too narrow for a building.
    pub skipped: usize,
    /// Eligible blocks where every attempt was rejected.
    pub unplaced: usize,
}

/// Try to place one building inside a block.
pub fn place_in_block<R: Rng + ?Sized>(
    block: &Block,
    roads: &[(Vec2, Vec2)],
    placed: &[Building],
    config: &BuildingConfig,
    rng: &mut R,
) -> PlacementOutcome {
    let skipped = PlacementOutcome {
        attempts: 0,
        footprint: None,
    };

    if block.area < config.min_block_area {
        return skipped;
    }

    let bounds = block.bounds();
    if bounds.width() < config.min_building_size || bounds.height() < config.min_building_size {
        return skipped;
    }

    let max_width = config.max_building_size.min(bounds.width());
    let max_height = config.max_building_size.min(bounds.height());
    if max_width < config.min_building_size || max_height < config.min_building_size {
        return skipped;
    }

    for attempt in 1..=config.max_attempts {
        let width = rng.gen_range(config.min_building_size..=max_width);
        let height = rng.gen_range(config.min_building_size..=max_height);
        // Clamp so rounding never produces an empty range.
        let x = rng.gen_range(bounds.min.x..=(bounds.max.x - width).max(bounds.min.x));
        let y = rng.gen_range(bounds.min.y..=(bounds.max.y - height).max(bounds.min.y));
        let footprint = Rect::new(x, y, x + width, y + height);

        let fits = block.contains(footprint.center())
            && !roads.iter().any(|&(a, b)| segment_intersects_rect(a, b, footprint))
            && !placed.iter().any(|other| rects_overlap(other.footprint, footprint));

        if fits {
            return PlacementOutcome {
                attempts: attempt,
                footprint: Some(footprint),
            };
        }
    }

    PlacementOutcome {
        attempts: config.max_attempts,
        footprint: None,
    }
}

/// Place buildings in every qualifying block, in block order.
pub fn place_buildings<R: Rng + ?Sized>(
    roads: &RoadGraph,
    blocks: &[Block],
    config: &BuildingConfig,
    rng: &mut R,
) -> PlacementReport {
    let segments: Vec<(Vec2, Vec2)> = roads.edges().map(|e| (e.start, e.end)).collect();
    let mut report = PlacementReport::default();

    for (index, block) in blocks.iter().enumerate() {
        let outcome = place_in_block(block, &segments, &report.buildings, config, rng);
        report.attempts.push(outcome.attempts);

        match outcome.footprint {
            Some(footprint) => report.buildings.push(Building {
                footprint,
                block: index,
            }),
            None if outcome.attempts == 0 => report.skipped += 1,
            None => report.unplaced += 1,
        }
    }

    if report.unplaced > 0 {
        debug!(
            "{} blocks had no room for a building after {} attempts each",
            report.unplaced, config.max_attempts
        );
    }

    report
}
