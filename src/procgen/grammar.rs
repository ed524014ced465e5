//! Stochastic L-system rewriting.
//!
//! A [`RuleSet`] maps symbols to one or more replacement strings. Every
//! occurrence of a symbol draws one replacement uniformly at random, so two
//! expansions of the same axiom diverge unless the RNG is seeded.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{CityGenError, Result};

/// Upper bound on rewrite passes when growing toward a draw-symbol target.
pub const MAX_GROWTH_PASSES: usize = 32;

/// Working strings longer than this are treated as runaway growth.
pub const MAX_INSTRUCTION_LEN: usize = 1 << 24;

pub const TURN_RIGHT: char = '+';
pub const TURN_LEFT: char = '-';
pub const PUSH: char = '[';
pub const POP: char = ']';
pub const SPUR: char = '|';

/// How a character behaves for a given rule set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    /// Advances the turtle and emits a road segment.
    Draw,
    TurnRight,
    TurnLeft,
    Push,
    Pop,
    /// Depth-scaled extra segment.
    Spur,
    /// Has production rules but draws nothing.
    Replaceable,
    /// Ignored by the plotter, copied verbatim by the rewriter.
    Inert,
}

/// Turtle control characters, independent of any rule set.
pub fn control_symbol(c: char) -> Option<Symbol> {
    match c {
        TURN_RIGHT => Some(Symbol::TurnRight),
        TURN_LEFT => Some(Symbol::TurnLeft),
        PUSH => Some(Symbol::Push),
        POP => Some(Symbol::Pop),
        SPUR => Some(Symbol::Spur),
        _ => None,
    }
}

/// When to stop rewriting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpansionLimit {
    /// Apply exactly this many global rewrite passes.
    Iterations(u32),
    /// Rewrite until at least this many draw symbols exist, then cut the
    /// string right after the last one that fits.
    DrawSymbols(usize),
}

/// Axiom plus production rules.
#[derive(Clone, Debug)]
pub struct RuleSet {
    pub axiom: String,
    pub rules: HashMap<char, Vec<String>>,
    /// Symbols the plotter turns into road segments.
    pub draw_symbols: Vec<char>,
}

impl RuleSet {
    pub fn new(axiom: &str, draw_symbols: &[char]) -> Self {
        Self {
            axiom: axiom.to_string(),
            rules: HashMap::new(),
            draw_symbols: draw_symbols.to_vec(),
        }
    }

    /// Add a production. Calling this twice for one symbol adds an alternative.
    pub fn with_rule(mut self, symbol: char, replacement: &str) -> Self {
        self.rules
            .entry(symbol)
            .or_default()
            .push(replacement.to_string());
        self
    }

    /// Add several alternatives for one symbol.
    pub fn with_rules(mut self, symbol: char, replacements: &[&str]) -> Self {
        for replacement in replacements {
            self = self.with_rule(symbol, replacement);
        }
        self
    }

    /// Orthogonal street grid, used with 90° turns.
    pub fn grid() -> Self {
        Self::new("X", &['F'])
            .with_rules(
                'X',
                &[
                    "F[+X]F[-X]FX",
                    "F[+X]F[-X]+X",
                    "F-[[X]+X]+F[+FX]-X",
                    "F[X]F[+X]+F[-X]X",
                    "F[+X][-X]F+F[X]+F[+FX]-X",
                    "FF[+X][+X]FF[-X][-X]",
                    "F[X]+[X]+F-F",
                ],
            )
            .with_rules('F', &["FF", "F[+F]F[-F]F", "F[+FF][-FF]F"])
    }

    /// Branching districts with spurs, used with 60° turns.
    pub fn hexagonal() -> Self {
        Self::new("A", &['B'])
            .with_rules(
                'A',
                &[
                    "BB[+A]B[-A]|BA",
                    "B[+A]B[-A|]+B",
                    "B-[[A]+A]+B[+BA]-A",
                    "BB[+A][+A]BB[-A][-A]|",
                ],
            )
            .with_rules('B', &["BB", "B[+B]B[-B]B", "B[+BB][-BB]B"])
    }

    /// Long arterials with side streets, used with 120° turns.
    pub fn triangular() -> Self {
        Self::new("[F]--F", &['F']).with_rule('F', "FFF[+FF]FFF|")
    }

    /// Pick the preset that matches a turn angle in degrees.
    pub fn for_angle(angle: f32) -> Result<Self> {
        // Angles come from integer UI fields, so compare with a small tolerance.
        let matches = |target: f32| (angle - target).abs() < 1e-3;
        if matches(90.0) {
            Ok(Self::grid())
        } else if matches(60.0) {
            Ok(Self::hexagonal())
        } else if matches(120.0) {
            Ok(Self::triangular())
        } else {
            Err(CityGenError::InvalidAngle(angle))
        }
    }

    pub fn classify(&self, c: char) -> Symbol {
        if self.draw_symbols.contains(&c) {
            return Symbol::Draw;
        }
        match control_symbol(c) {
            Some(symbol) => symbol,
            None if self.rules.contains_key(&c) => Symbol::Replaceable,
            None => Symbol::Inert,
        }
    }

    pub fn count_draws(&self, s: &str) -> usize {
        s.chars().filter(|c| self.draw_symbols.contains(c)).count()
    }

    /// Whether some symbol in `s` has a replacement other than itself.
    ///
    /// A single pass may still leave the string unchanged when the RNG picks
    /// identity alternatives everywhere.
    pub fn can_grow(&self, s: &str) -> bool {
        s.chars().any(|c| {
            self.rules.get(&c).is_some_and(|options| {
                options
                    .iter()
                    .any(|r| r.chars().count() != 1 || !r.starts_with(c))
            })
        })
    }

    /// Byte offset just past the `target`-th draw symbol, if there are that many.
    fn truncation_point(&self, s: &str, target: usize) -> Option<usize> {
        let mut seen = 0;
        for (idx, c) in s.char_indices() {
            if self.draw_symbols.contains(&c) {
                seen += 1;
                if seen == target {
                    return Some(idx + c.len_utf8());
                }
            }
        }
        None
    }

    /// One global rewrite pass, choices drawn left to right.
    pub fn rewrite<R: Rng + ?Sized>(&self, current: &str, rng: &mut R) -> String {
        let mut next = String::with_capacity(current.len() * 2);
        for c in current.chars() {
            match self.rules.get(&c).and_then(|options| options.choose(rng)) {
                Some(replacement) => next.push_str(replacement),
                None => next.push(c),
            }
        }
        next
    }
}

/// Expand the rule set's axiom under the given limit.
pub fn expand<R: Rng + ?Sized>(rules: &RuleSet, limit: ExpansionLimit, rng: &mut R) -> Result<String> {
    match limit {
        ExpansionLimit::Iterations(passes) => {
            let mut current = rules.axiom.clone();
            for _ in 0..passes {
                current = rules.rewrite(&current, rng);
            }
            Ok(current)
        }
        ExpansionLimit::DrawSymbols(target) => grow_to_target(rules, target, rng),
    }
}

fn grow_to_target<R: Rng + ?Sized>(rules: &RuleSet, target: usize, rng: &mut R) -> Result<String> {
    if target == 0 {
        return Ok(String::new());
    }

    let mut current = rules.axiom.clone();
    let mut passes = 0;

    loop {
        if let Some(end) = rules.truncation_point(&current, target) {
            current.truncate(end);
            return Ok(current);
        }

        let stalled = || CityGenError::GenerationStalled {
            target,
            reached: rules.count_draws(&current),
            passes,
        };

        if passes == MAX_GROWTH_PASSES || current.len() > MAX_INSTRUCTION_LEN {
            return Err(stalled());
        }

        if !rules.can_grow(&current) {
            return Err(stalled());
        }

        passes += 1;
        current = rules.rewrite(&current, rng);
    }
}
