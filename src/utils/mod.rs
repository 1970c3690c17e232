//! # Utilities Module
//!
//! Randomness, dice, field of view and path search shared by generation,
//! combat and monster behavior.

pub mod dice;
pub mod fov;
pub mod pathfinding;
pub mod random;

pub use self::pathfinding::*;
pub use dice::*;
pub use fov::*;
pub use random::*;
