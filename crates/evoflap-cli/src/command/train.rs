use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use evoflap_engine::{World, WorldConfig};
use evoflap_training::{BreedingStrategy, EvolutionParams, genetic::EvolutionController};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    schema::report::{GenerationRecord, TrainingReport},
    util,
};

const DEFAULT_GENERATIONS: usize = 50;
const DEFAULT_MAX_TICKS: u64 = 20_000;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of birds per generation
    #[arg(long, default_value_t = EvolutionParams::default().population_size)]
    population: usize,
    /// Per-parameter mutation probability
    #[arg(long, default_value_t = EvolutionParams::default().mutation_rate)]
    mutation_rate: f64,
    /// Share of the population eligible for elitism
    #[arg(long, default_value_t = EvolutionParams::default().elite_fraction)]
    elite_fraction: f64,
    /// Breeding strategy (elitist or champion)
    #[arg(long, default_value = "elitist")]
    strategy: BreedingStrategy,
    /// Number of generations to evolve
    #[arg(long, default_value_t = DEFAULT_GENERATIONS)]
    generations: usize,
    /// Episode length limit; survivors are killed once it is reached
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: u64,
    /// Ticks simulated per step
    #[arg(long, default_value_t = 1)]
    speed: usize,
    /// Hidden layer size of every network
    #[arg(long)]
    hidden_nodes: Option<usize>,
    /// World configuration JSON file
    #[arg(long)]
    world: Option<PathBuf>,
    /// Random seed (drawn from the OS when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path for the training report
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Default for TrainArg {
    fn default() -> Self {
        let params = EvolutionParams::default();
        Self {
            population: params.population_size,
            mutation_rate: params.mutation_rate,
            elite_fraction: params.elite_fraction,
            strategy: params.strategy,
            generations: DEFAULT_GENERATIONS,
            max_ticks: DEFAULT_MAX_TICKS,
            speed: 1,
            hidden_nodes: None,
            world: None,
            seed: None,
            output: None,
        }
    }
}

impl TrainArg {
    fn params(&self) -> EvolutionParams {
        EvolutionParams {
            population_size: self.population,
            mutation_rate: self.mutation_rate,
            elite_fraction: self.elite_fraction,
            strategy: self.strategy,
        }
    }

    fn world_config(&self) -> anyhow::Result<WorldConfig> {
        let mut config = match &self.world {
            Some(path) => util::load_world_config(path)?,
            None => WorldConfig::default(),
        };
        if let Some(hidden) = self.hidden_nodes {
            config.topology.hidden = hidden;
        }
        Ok(config)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg32::seed_from_u64(seed);
    let params = arg.params();
    let config = arg.world_config()?;
    let speed = arg.speed.max(1);

    let mut controller =
        EvolutionController::new(params).context("Invalid evolution parameters")?;
    let mut world = World::random(config.clone(), params.population_size, &mut rng)
        .context("Failed to create initial population")?;

    tracing::info!(
        seed,
        population = params.population_size,
        mutation_rate = params.mutation_rate,
        strategy = %params.strategy,
        topology = %config.topology,
        "training started"
    );

    let started_at = Utc::now();
    let mut generations = Vec::with_capacity(arg.generations);
    for _ in 0..arg.generations {
        while !world.is_extinct() && world.frame() < arg.max_ticks {
            world.step(speed, &mut rng)?;
        }
        let timed_out = !world.is_extinct();
        if timed_out {
            world.end_episode();
        }
        let ticks = world.frame();

        let finished = world.take_population();
        let next = controller.produce_next_generation(finished, &config, &mut rng)?;
        world.install_population(next);

        let summary = controller
            .last_summary()
            .context("No summary after breeding")?
            .clone();
        tracing::info!(
            generation = summary.generation,
            ticks,
            timed_out,
            score = summary.generation_best_score,
            best_score = summary.best_score,
            max_fitness = summary.raw_fitness.max,
            mean_fitness = summary.raw_fitness.mean,
            elites = summary.elite_count,
            champion = summary.champion_seeded,
            "generation finished"
        );
        generations.push(GenerationRecord {
            ticks,
            timed_out,
            summary,
        });
    }

    let report = TrainingReport {
        started_at,
        finished_at: Utc::now(),
        seed,
        params,
        world: config,
        best_score: controller.best_score(),
        high_score: world.high_score(),
        generations,
    };
    tracing::info!(
        generations = report.generations.len(),
        best_score = report.best_score,
        "training completed"
    );
    util::save_report(&report, arg.output.as_deref())?;

    if let Some(path) = &arg.output {
        tracing::info!(path = %path.display(), "report saved");
    }
    Ok(())
}
