//! Turtle interpretation of expanded instruction strings.
//!
//! Walks the string once, left to right, keeping an explicit stack of turtle
//! states for `[`/`]` branching. Headings are in degrees and `+` turns
//! clockwise on a Y-down canvas.

use bevy::prelude::*;

use super::grammar::{control_symbol, RuleSet, Symbol};
use crate::error::{CityGenError, Result};

/// Position and heading of the turtle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurtleState {
    pub position: Vec2,
    /// Degrees.
    pub heading: f32,
}

impl TurtleState {
    fn advance(&mut self, distance: f32) -> Vec2 {
        let radians = self.heading.to_radians();
        self.position += Vec2::new(radians.cos(), radians.sin()) * distance;
        self.position
    }
}

/// Parameters for one plotting pass.
#[derive(Clone, Debug)]
pub struct PlotConfig {
    pub start: Vec2,
    /// Initial heading in degrees.
    pub heading: f32,
    pub turn_angle: f32,
    pub step_size: f32,
    /// Spur length multiplier per nesting level.
    pub depth_factor: f32,
    pub draw_symbols: Vec<char>,
}

impl PlotConfig {
    pub fn for_rules(rules: &RuleSet, turn_angle: f32, step_size: f32, depth_factor: f32) -> Self {
        Self {
            start: Vec2::ZERO,
            heading: 90.0,
            turn_angle,
            step_size,
            depth_factor,
            draw_symbols: rules.draw_symbols.clone(),
        }
    }

    fn classify(&self, c: char) -> Symbol {
        if self.draw_symbols.contains(&c) {
            return Symbol::Draw;
        }
        control_symbol(c).unwrap_or(Symbol::Inert)
    }
}

/// Raw plotter output, in discovery order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlottedRoads {
    /// One entry per draw symbol; repeated coordinates are kept.
    pub nodes: Vec<Vec2>,
    pub edges: Vec<(Vec2, Vec2)>,
}

/// Hook invoked after every interpreted symbol.
pub trait PlotObserver {
    fn on_step(&mut self, index: usize, instructions: &str, turtle: &TurtleState);
}

/// Records the turtle state wherever the remaining input starts with a pattern.
#[derive(Clone, Debug)]
pub struct PatternMarker {
    pub pattern: String,
    pub marks: Vec<TurtleState>,
}

impl PatternMarker {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            marks: Vec::new(),
        }
    }
}

impl PlotObserver for PatternMarker {
    fn on_step(&mut self, index: usize, instructions: &str, turtle: &TurtleState) {
        if !self.pattern.is_empty() && instructions[index..].starts_with(&self.pattern) {
            self.marks.push(*turtle);
        }
    }
}

/// Interpret `instructions` into road nodes and edges.
pub fn plot(
    instructions: &str,
    config: &PlotConfig,
    mut observer: Option<&mut dyn PlotObserver>,
) -> Result<PlottedRoads> {
    let mut out = PlottedRoads::default();
    let mut turtle = TurtleState {
        position: config.start,
        heading: config.heading,
    };
    let mut stack: Vec<TurtleState> = Vec::new();

    for (index, c) in instructions.char_indices() {
        match config.classify(c) {
            Symbol::Draw => {
                let from = turtle.position;
                let to = turtle.advance(config.step_size);
                out.nodes.push(to);
                out.edges.push((from, to));
            }
            Symbol::TurnRight => turtle.heading += config.turn_angle,
            Symbol::TurnLeft => turtle.heading -= config.turn_angle,
            Symbol::Push => stack.push(turtle),
            Symbol::Pop => {
                turtle = stack
                    .pop()
                    .ok_or(CityGenError::UnbalancedBranch { index })?;
            }
            Symbol::Spur => {
                let length = config.step_size * stack.len() as f32 * config.depth_factor;
                if length > 0.0 {
                    let from = turtle.position;
                    let to = turtle.advance(length);
                    out.edges.push((from, to));
                }
            }
            Symbol::Replaceable | Symbol::Inert => {}
        }

        if let Some(observer) = observer.as_deref_mut() {
            observer.on_step(index, instructions, &turtle);
        }
    }

    if !stack.is_empty() {
        debug!("{} unclosed branches discarded at end of input", stack.len());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::grammar::{expand, ExpansionLimit};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(angle: f32) -> PlotConfig {
        PlotConfig {
            start: Vec2::ZERO,
            heading: 0.0,
            turn_angle: angle,
            step_size: 10.0,
            depth_factor: 0.5,
            draw_symbols: vec!['F'],
        }
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn plotter_and_rules_agree_on_symbols() {
        let rules = RuleSet::hexagonal();
        let config = PlotConfig::for_rules(&rules, 60.0, 10.0, 0.5);
        for c in ['B', '+', '-', '[', ']', '|', 'Q'] {
            assert_eq!(config.classify(c), rules.classify(c));
        }
        // Rewritable symbols draw nothing.
        assert_eq!(config.classify('A'), Symbol::Inert);
    }

    #[test]
    fn draws_forward_and_turns_clockwise() {
        let out = plot("F+F", &config(90.0), None).unwrap();
        assert_eq!(out.nodes.len(), 2);
        assert!(close(out.nodes[0], Vec2::new(10.0, 0.0)));
        // Heading 90 points down the Y axis on a Y-down canvas.
        assert!(close(out.nodes[1], Vec2::new(10.0, 10.0)));
        assert!(close(out.edges[1].0, Vec2::new(10.0, 0.0)));
    }

    #[test]
    fn branch_restores_state() {
        let out = plot("F[+F]F", &config(90.0), None).unwrap();
        assert_eq!(out.edges.len(), 3);
        assert!(close(out.edges[2].0, Vec2::new(10.0, 0.0)));
        assert!(close(out.nodes[2], Vec2::new(20.0, 0.0)));
    }

    #[test]
    fn unmatched_pop_is_an_error() {
        let err = plot("F]F", &config(90.0), None).unwrap_err();
        assert_eq!(err, CityGenError::UnbalancedBranch { index: 1 });
    }

    #[test]
    fn unmatched_push_is_tolerated() {
        let out = plot("F[+F[-F", &config(90.0), None).unwrap();
        assert_eq!(out.nodes.len(), 3);
    }

    #[test]
    fn spur_scales_with_depth() {
        let out = plot("[[|", &config(90.0), None).unwrap();
        assert_eq!(out.edges.len(), 1);
        // 10 * depth 2 * 0.5
        assert!(close(out.edges[0].1, Vec2::new(10.0, 0.0)));
        assert!(out.nodes.is_empty());
    }

    #[test]
    fn spur_at_root_emits_nothing() {
        let out = plot("|F", &config(90.0), None).unwrap();
        assert_eq!(out.edges.len(), 1);
    }

    #[test]
    fn marker_records_pattern_positions() {
        let mut marker = PatternMarker::new("[+FF]");
        plot("FF[+FF]F", &config(90.0), Some(&mut marker)).unwrap();
        assert_eq!(marker.marks.len(), 1);
        // The mark is taken once the pattern's opening `[` has been applied.
        assert!(close(marker.marks[0].position, Vec2::new(20.0, 0.0)));
    }

    #[test]
    fn expanded_presets_plot_within_draw_budget() {
        for angle in [60.0, 90.0, 120.0] {
            let rules = RuleSet::for_angle(angle).unwrap();
            let mut rng = StdRng::seed_from_u64(5);
            let target = 300;
            let instructions = expand(&rules, ExpansionLimit::DrawSymbols(target), &mut rng).unwrap();
            let cfg = PlotConfig::for_rules(&rules, angle, 10.0, 0.5);
            let out = plot(&instructions, &cfg, None).unwrap();
            assert!(out.nodes.len() <= target);
        }
    }

    #[test]
    fn balanced_strings_never_underflow() {
        let rules = RuleSet::grid();
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let instructions = expand(&rules, ExpansionLimit::Iterations(3), &mut rng).unwrap();
            let cfg = PlotConfig::for_rules(&rules, 90.0, 10.0, 0.5);
            assert!(plot(&instructions, &cfg, None).is_ok());
        }
    }
}
