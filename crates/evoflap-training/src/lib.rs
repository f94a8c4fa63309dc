//! Evolution of agent networks between episodes.
//!
//! Training is driven from outside: a simulation runs a population until every
//! agent is dead, then hands the finished population to an
//! [`EvolutionController`](genetic::EvolutionController), which returns the
//! next one.
//!
//! # How a Generation Is Bred
//!
//! 1. **Fitness** - `score × 1000 + distance`, normalized so the population sums to 1
//! 2. **Champion** - The best-ever network is cloned whenever an agent beats the best score
//! 3. **Elitism** - Top 10% with a non-zero score are copied unchanged
//! 4. **Selection** - Parents are drawn by roulette wheel over normalized fitness
//! 5. **Crossover** - Each weight comes from either parent with equal probability
//! 6. **Mutation** - Each weight and bias is perturbed with probability `mutation_rate`
//!
//! # Example
//!
//! ```
//! use evoflap_engine::{World, WorldConfig};
//! use evoflap_training::{EvolutionParams, genetic::EvolutionController};
//!
//! let mut rng = rand::rng();
//! let params = EvolutionParams { population_size: 10, ..EvolutionParams::default() };
//! let mut controller = EvolutionController::new(params).unwrap();
//! let mut world = World::random(WorldConfig::default(), 10, &mut rng).unwrap();
//!
//! world.step(5_000, &mut rng).unwrap();
//! world.end_episode();
//! let finished = world.take_population();
//! let next = controller
//!     .produce_next_generation(finished, world.config(), &mut rng)
//!     .unwrap();
//! world.install_population(next);
//!
//! assert_eq!(controller.generation(), 2);
//! assert_eq!(world.alive_count(), 10);
//! ```
//!
//! # Current Limitations
//!
//! - **Single objective**: score and distance are folded into one scalar
//! - **Fixed schedule**: the mutation rate never adapts
//! - **Unbounded drift**: mutated weights are never clamped
//! - **Weights only crossover**: biases always come from the first parent

use evoflap_nn::NetworkError;

pub use self::params::*;

pub mod genetic;
mod params;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EvolutionError {
    #[display("population is empty")]
    EmptyPopulation,
    #[display("population has {actual} agents, expected {expected}")]
    PopulationSizeMismatch { expected: usize, actual: usize },
    #[display("elite fraction {fraction} is outside [0, 1]")]
    InvalidEliteFraction { fraction: f64 },
    #[display("{_0}")]
    Network(NetworkError),
}

impl From<NetworkError> for EvolutionError {
    fn from(err: NetworkError) -> Self {
        Self::Network(err)
    }
}
