//! Fitness scoring, selection and breeding.
//!
//! # Fitness
//!
//! Raw fitness is `score × SCORE_WEIGHT + distance`, so passing one more
//! obstacle always outweighs any difference in survival time. Raw values are
//! then divided by their sum. When the sum is zero every agent gets
//! [`FLAT_FITNESS`] instead; those values do not sum to 1, and
//! [`select_parent_at`] copes with that by falling back to the last agent.
//!
//! # Selection
//!
//! Roulette wheel over the normalized fitness: draw `r` in `[0, 1)` and walk
//! the fitness-sorted population subtracting each fitness until `r <= 0`.
//! Parents are drawn independently and with replacement.
//!
//! # Crossover
//!
//! The child starts as a copy of the first parent. Each entry of both weight
//! matrices is then replaced by the second parent's with probability
//! [`CROSSOVER_RATE`]. Biases are inherited from the first parent only.

use evoflap_engine::{Agent, WorldConfig};
use evoflap_nn::{DecisionNetwork, validate_rate};
use evoflap_stats::descriptive::DescriptiveStats;
use rand::Rng;
use serde::Serialize;

use crate::{BreedingStrategy, EvolutionError, EvolutionParams};

/// Raw fitness earned per obstacle passed.
pub const SCORE_WEIGHT: f64 = 1000.0;

/// Fitness assigned to every agent when the raw fitness sum is zero.
pub const FLAT_FITNESS: f64 = 0.01;

/// Probability of taking a weight from the second parent.
pub const CROSSOVER_RATE: f64 = 0.5;

/// Unnormalized fitness of a finished agent.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn raw_fitness(agent: &Agent) -> f64 {
    agent.score() as f64 * SCORE_WEIGHT + agent.distance() as f64
}

/// What happened while breeding one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    /// Generation the finished population belonged to.
    pub generation: usize,
    /// Agents copied unchanged from the elite slice.
    pub elite_count: usize,
    /// Whether a copy of the best-ever network was seeded.
    pub champion_seeded: bool,
    /// Agents produced by crossover and mutation.
    pub offspring_count: usize,
    /// Highest score in the finished population.
    pub generation_best_score: usize,
    /// Highest score seen across all generations so far.
    pub best_score: usize,
    pub raw_fitness: DescriptiveStats,
}

/// Scores finished populations and breeds their successors.
///
/// The controller owns a clone of the best network ever seen. It is never
/// shared with a live agent, so replacing a population cannot invalidate it.
#[derive(Debug, Clone)]
pub struct EvolutionController {
    params: EvolutionParams,
    generation: usize,
    best_score: usize,
    best_network: Option<DecisionNetwork>,
    last_summary: Option<GenerationSummary>,
}

impl EvolutionController {
    /// Creates a controller starting at generation 1.
    ///
    /// # Errors
    ///
    /// - [`EvolutionError::EmptyPopulation`] if `population_size` is zero
    /// - [`EvolutionError::Network`] wrapping `InvalidRate` if `mutation_rate` is not in `[0, 1]`
    /// - [`EvolutionError::InvalidEliteFraction`] if `elite_fraction` is not in `[0, 1]`
    pub fn new(params: EvolutionParams) -> Result<Self, EvolutionError> {
        if params.population_size == 0 {
            return Err(EvolutionError::EmptyPopulation);
        }
        validate_rate(params.mutation_rate)?;
        if !(0.0..=1.0).contains(&params.elite_fraction) {
            return Err(EvolutionError::InvalidEliteFraction {
                fraction: params.elite_fraction,
            });
        }
        Ok(Self {
            params,
            generation: 1,
            best_score: 0,
            best_network: None,
            last_summary: None,
        })
    }

    #[must_use]
    pub fn params(&self) -> &EvolutionParams {
        &self.params
    }

    /// Current generation number, starting at 1.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Highest score any agent has reached.
    #[must_use]
    pub fn best_score(&self) -> usize {
        self.best_score
    }

    /// Clone of the network that reached [`best_score`](Self::best_score).
    ///
    /// `None` until some agent scores at least once.
    #[must_use]
    pub fn best_network(&self) -> Option<&DecisionNetwork> {
        self.best_network.as_ref()
    }

    /// Summary of the most recent call to [`produce_next_generation`](Self::produce_next_generation).
    #[must_use]
    pub fn last_summary(&self) -> Option<&GenerationSummary> {
        self.last_summary.as_ref()
    }

    /// Restarts generation numbering at 1, keeping the best-ever record.
    pub fn reset_generation(&mut self) {
        self.generation = 1;
    }

    /// Assigns normalized fitness to every agent and sorts the population best first.
    ///
    /// Also records a new best-ever network whenever an agent's score is strictly
    /// greater than the best score so far. Returns statistics of the raw fitness.
    ///
    /// # Errors
    ///
    /// Returns [`EvolutionError::EmptyPopulation`] if `population` is empty.
    pub fn compute_fitness(
        &mut self,
        population: &mut [Agent],
    ) -> Result<DescriptiveStats, EvolutionError> {
        let raw = population.iter().map(raw_fitness).collect::<Vec<_>>();
        let stats = DescriptiveStats::new(raw.iter().copied())
            .ok_or(EvolutionError::EmptyPopulation)?;

        for agent in population.iter() {
            if agent.score() > self.best_score {
                self.best_score = agent.score();
                self.best_network = Some(agent.network().clone());
                tracing::debug!(
                    generation = self.generation,
                    score = self.best_score,
                    "new best network"
                );
            }
        }

        let sum: f64 = raw.iter().sum();
        for (agent, raw) in population.iter_mut().zip(raw) {
            agent.set_fitness(if sum > 0.0 { raw / sum } else { FLAT_FITNESS });
        }

        population.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
        Ok(stats)
    }

    /// Consumes a finished population and returns the next generation.
    ///
    /// The returned population always has exactly `population_size` agents,
    /// all alive and at the start position.
    ///
    /// # Errors
    ///
    /// - [`EvolutionError::EmptyPopulation`] if `population` is empty
    /// - [`EvolutionError::PopulationSizeMismatch`] if its size differs from `population_size`
    pub fn produce_next_generation<R>(
        &mut self,
        mut population: Vec<Agent>,
        config: &WorldConfig,
        rng: &mut R,
    ) -> Result<Vec<Agent>, EvolutionError>
    where
        R: Rng + ?Sized,
    {
        let size = self.params.population_size;
        if population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        if population.len() != size {
            return Err(EvolutionError::PopulationSizeMismatch {
                expected: size,
                actual: population.len(),
            });
        }

        let raw_fitness = self.compute_fitness(&mut population)?;
        let generation_best_score = population.iter().map(Agent::score).max().unwrap_or(0);
        let mut next = Vec::with_capacity(size);

        if self.params.strategy == BreedingStrategy::Elitist {
            let elites = population
                .iter()
                .take(self.params.elite_count())
                .filter(|a| a.score() > 0)
                .map(|a| Agent::with_network(a.network().clone(), config));
            next.extend(elites);
        }
        let elite_count = next.len();

        let seed_champion = match self.params.strategy {
            BreedingStrategy::Elitist => next.is_empty(),
            BreedingStrategy::Champion => true,
        };
        let mut champion_seeded = false;
        if seed_champion && let Some(best) = &self.best_network {
            next.push(Agent::with_network(best.clone(), config));
            champion_seeded = true;
        }

        let offspring_count = size.saturating_sub(next.len());
        while next.len() < size {
            let p1 = select_parent(&population, rng).ok_or(EvolutionError::EmptyPopulation)?;
            let p2 = select_parent(&population, rng).ok_or(EvolutionError::EmptyPopulation)?;
            let mut child = crossover(p1, p2, config, rng)?;
            child
                .network_mut()
                .mutate_perturb(self.params.mutation_rate, rng)?;
            next.push(child);
        }

        let summary = GenerationSummary {
            generation: self.generation,
            elite_count,
            champion_seeded,
            offspring_count,
            generation_best_score,
            best_score: self.best_score,
            raw_fitness,
        };
        tracing::debug!(
            generation = summary.generation,
            elites = summary.elite_count,
            champion = summary.champion_seeded,
            offspring = summary.offspring_count,
            "bred next generation"
        );
        self.last_summary = Some(summary);
        self.generation += 1;
        Ok(next)
    }
}

/// Picks a parent by roulette wheel selection.
///
/// `population` should be sorted by fitness (best first) with fitness summing
/// to about 1. Returns `None` only for an empty population.
pub fn select_parent<'a, R>(population: &'a [Agent], rng: &mut R) -> Option<&'a Agent>
where
    R: Rng + ?Sized,
{
    select_parent_at(population, rng.random::<f64>())
}

/// Roulette wheel selection with an explicit draw `r`.
///
/// Walks the population subtracting each agent's fitness from `r` and returns
/// the agent at which `r` drops to zero or below. Running past the end, which
/// rounding or flat fitness can cause, selects the last agent.
#[must_use]
pub fn select_parent_at(population: &[Agent], mut r: f64) -> Option<&Agent> {
    for agent in population {
        r -= agent.fitness();
        if r <= 0.0 {
            return Some(agent);
        }
    }
    population.last()
}

/// Breeds a child from two parents, flipping a fair coin for each weight.
///
/// # Errors
///
/// Returns [`EvolutionError::Network`] if the parents have different topologies.
pub fn crossover<R>(
    parent1: &Agent,
    parent2: &Agent,
    config: &WorldConfig,
    rng: &mut R,
) -> Result<Agent, EvolutionError>
where
    R: Rng + ?Sized,
{
    crossover_with(parent1, parent2, config, || rng.random_bool(CROSSOVER_RATE))
}

/// Breeds a child from two parents using `take_second` as the coin.
///
/// `take_second` is called once per weight of `W_ih`, then once per weight of
/// `W_ho`; `true` takes the second parent's value.
///
/// # Errors
///
/// Returns [`EvolutionError::Network`] if the parents have different topologies.
pub fn crossover_with<F>(
    parent1: &Agent,
    parent2: &Agent,
    config: &WorldConfig,
    take_second: F,
) -> Result<Agent, EvolutionError>
where
    F: FnMut() -> bool,
{
    let mut network = parent1.network().clone();
    network.inherit_weights(parent2.network(), take_second)?;
    Ok(Agent::with_network(network, config))
}
