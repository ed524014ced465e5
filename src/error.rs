//! Error types for city generation.
//!
//! Only structural failures live here. Best-effort outcomes such as an
//! unstitched dead end or a block without a building are reported through
//! [`GenerationStats`](crate::procgen::road_generator::GenerationStats) instead.

use thiserror::Error;

/// Errors that abort a generation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CityGenError {
    /// The turn angle does not select a known grammar.
    #[error("Unsupported turn angle: {0}° (expected 60, 90 or 120)")]
    InvalidAngle(f32),

    /// The grammar never produced enough draw symbols.
    #[error("Grammar stalled after {passes} passes: {reached} of {target} draw symbols")]
    GenerationStalled {
        target: usize,
        reached: usize,
        passes: usize,
    },

    /// A `]` was found with nothing on the branch stack.
    #[error("Unbalanced branch: pop on empty stack at instruction {index}")]
    UnbalancedBranch { index: usize },

    /// A numeric parameter is outside its accepted range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, CityGenError>;
