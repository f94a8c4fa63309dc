use chrono::{DateTime, Utc};
use evoflap_engine::WorldConfig;
use evoflap_training::{EvolutionParams, genetic::GenerationSummary};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub seed: u64,
    pub params: EvolutionParams,
    pub world: WorldConfig,
    pub best_score: usize,
    pub high_score: usize,
    pub generations: Vec<GenerationRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationRecord {
    /// Ticks the episode lasted.
    pub ticks: u64,
    /// Whether the episode hit the tick limit with agents still alive.
    pub timed_out: bool,
    #[serde(flatten)]
    pub summary: GenerationSummary,
}
