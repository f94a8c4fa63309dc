//! Agents, obstacles and the headless world they live in.
//!
//! - [`WorldConfig`] - Canvas, physics, sensing and network constants
//! - [`Obstacle`] - A pipe with a vertical gap, moving right to left
//! - [`Agent`] - A bird: kinematics, survival record and its own [`DecisionNetwork`]
//! - [`sensing`] - Feature extraction and the jump decision
//! - [`World`] - Tick loop: spawning, movement, collisions and scoring
//!
//! # Episode Flow
//!
//! 1. Build a [`World`] from a population of agents
//! 2. Call [`World::step`] until [`World::is_extinct`] returns `true`
//! 3. Take the finished population with [`World::take_population`], breed a new
//!    one, and hand it back with [`World::install_population`]
//!
//! [`DecisionNetwork`]: evoflap_nn::DecisionNetwork

pub use self::{agent::*, config::*, obstacle::*, world::*};

mod agent;
mod config;
mod obstacle;
pub mod sensing;
mod world;
