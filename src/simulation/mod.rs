//! Route queries over the generated network.

pub mod pathfinding;
