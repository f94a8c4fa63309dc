use serde::{Deserialize, Serialize};

/// How the first slots of a new generation are filled before breeding.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::FromStr,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum BreedingStrategy {
    /// Copy the top fraction (skipping score-0 agents); fall back to the
    /// best-ever network only when nothing was copied.
    #[default]
    Elitist,
    /// Always seed exactly one copy of the best-ever network, if any.
    Champion,
}

/// Parameters of the evolution controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvolutionParams {
    pub population_size: usize,
    /// Per-parameter probability of mutation.
    pub mutation_rate: f64,
    /// Share of the population eligible for elitism.
    pub elite_fraction: f64,
    pub strategy: BreedingStrategy,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population_size: 50,
            mutation_rate: 0.08,
            elite_fraction: 0.1,
            strategy: BreedingStrategy::Elitist,
        }
    }
}

impl EvolutionParams {
    /// Size of the elite slice, `floor(population_size × elite_fraction)`.
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn elite_count(&self) -> usize {
        (self.population_size as f64 * self.elite_fraction).floor() as usize
    }
}
