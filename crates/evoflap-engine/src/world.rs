use std::mem;

use evoflap_nn::NetworkError;
use rand::Rng;

use crate::{Agent, Obstacle, WorldConfig};

/// Headless simulation of a population flying through obstacles.
///
/// One [`tick`](Self::tick) spawns and moves obstacles, then updates every
/// living agent: physics, decision, collisions and scoring. The world never
/// breeds agents itself; once it is extinct the caller replaces the population
/// with [`install_population`](Self::install_population).
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    agents: Vec<Agent>,
    obstacles: Vec<Obstacle>,
    frame: u64,
    current_score: usize,
    high_score: usize,
}

impl World {
    #[must_use]
    pub fn new(config: WorldConfig, agents: Vec<Agent>) -> Self {
        Self {
            config,
            agents,
            obstacles: vec![],
            frame: 0,
            current_score: 0,
            high_score: 0,
        }
    }

    /// Creates a world populated with `population_size` randomly initialized agents.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidTopology`] if the configured topology is invalid.
    pub fn random<R>(
        config: WorldConfig,
        population_size: usize,
        rng: &mut R,
    ) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        let agents = (0..population_size)
            .map(|_| Agent::random(&config, rng))
            .collect::<Result<_, _>>()?;
        Ok(Self::new(config, agents))
    }

    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Ticks elapsed in the current episode.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Best score reached by any agent in the current episode.
    #[must_use]
    pub fn current_score(&self) -> usize {
        self.current_score
    }

    /// Best score reached by any agent since the world was created.
    #[must_use]
    pub fn high_score(&self) -> usize {
        self.high_score
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    #[must_use]
    pub fn is_extinct(&self) -> bool {
        self.agents.iter().all(|a| !a.is_alive())
    }

    /// Advances the world by one tick and returns the number of agents still alive.
    ///
    /// # Errors
    ///
    /// Propagates inference errors from [`Agent::update`].
    pub fn tick<R>(&mut self, rng: &mut R) -> Result<usize, NetworkError>
    where
        R: Rng + ?Sized,
    {
        let config = &self.config;
        self.frame += 1;

        let interval = config.obstacle.spawn_interval;
        if interval > 0 && self.frame % interval == 0 {
            self.obstacles.push(Obstacle::spawn(
                config.width,
                &config.obstacle,
                config.height,
                rng,
            ));
        }

        for obstacle in &mut self.obstacles {
            obstacle.advance(config.obstacle.speed);
        }
        self.obstacles.retain(|o| !o.is_off_screen());

        let mut alive = 0;
        for agent in self.agents.iter_mut().filter(|a| a.is_alive()) {
            agent.update(&self.obstacles, config)?;

            for obstacle in &mut self.obstacles {
                if agent.check_collision(obstacle, config) {
                    break;
                }
                if obstacle.try_pass(agent.kinematics().x) {
                    agent.set_score(agent.score() + 1);
                    self.current_score = self.current_score.max(agent.score());
                    self.high_score = self.high_score.max(agent.score());
                }
            }

            if agent.is_alive() {
                alive += 1;
            }
        }

        if alive == 0 {
            tracing::debug!(
                frame = self.frame,
                score = self.current_score,
                "population extinct"
            );
        }
        Ok(alive)
    }

    /// Runs up to `speed` ticks, stopping early once every agent is dead.
    ///
    /// Returns the number of agents still alive.
    ///
    /// # Errors
    ///
    /// Propagates inference errors from [`Agent::update`].
    pub fn step<R>(&mut self, speed: usize, rng: &mut R) -> Result<usize, NetworkError>
    where
        R: Rng + ?Sized,
    {
        let mut alive = self.alive_count();
        for _ in 0..speed {
            if alive == 0 {
                break;
            }
            alive = self.tick(rng)?;
        }
        Ok(alive)
    }

    /// Kills every surviving agent, ending the episode.
    pub fn end_episode(&mut self) {
        for agent in &mut self.agents {
            agent.kill();
        }
    }

    /// Removes the current population, leaving the world empty.
    pub fn take_population(&mut self) -> Vec<Agent> {
        mem::take(&mut self.agents)
    }

    /// Installs a new population and resets the episode state.
    ///
    /// The high score survives; obstacles, frame counter and current score do not.
    pub fn install_population(&mut self, agents: Vec<Agent>) {
        self.agents = agents;
        self.obstacles.clear();
        self.frame = 0;
        self.current_score = 0;
    }
}

#[cfg(test)]
mod tests {
    use evoflap_nn::DecisionNetwork;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn idle_world(count: usize) -> World {
        let config = WorldConfig::default();
        let agents = (0..count)
            .map(|_| {
                Agent::with_network(DecisionNetwork::zeroed(config.topology).unwrap(), &config)
            })
            .collect();
        World::new(config, agents)
    }

    #[test]
    fn test_idle_population_dies() {
        let mut world = idle_world(3);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ticks = 0;
        while world.tick(&mut rng).unwrap() > 0 {
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert!(world.is_extinct());
        assert_eq!(world.alive_count(), 0);
        assert!(world.agents().iter().all(|a| a.distance() > 0));
    }

    #[test]
    fn test_spawn_interval() {
        let mut world = World::new(WorldConfig::default(), vec![]);
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..119 {
            world.tick(&mut rng).unwrap();
        }
        assert!(world.obstacles().is_empty());
        world.tick(&mut rng).unwrap();
        assert_eq!(world.obstacles().len(), 1);
        // spawned at the right edge, then moved once
        assert_eq!(world.obstacles()[0].x(), 797.0);
    }

    #[test]
    fn test_step_stops_at_extinction() {
        let mut world = idle_world(2);
        let mut rng = Pcg32::seed_from_u64(3);
        let alive = world.step(10_000, &mut rng).unwrap();
        assert_eq!(alive, 0);
        let frame = world.frame();
        assert!(frame < 10_000);
        assert_eq!(world.step(5, &mut rng).unwrap(), 0);
        assert_eq!(world.frame(), frame);
    }

    #[test]
    fn test_end_episode_and_install() {
        let mut world = World::random(WorldConfig::default(), 4, &mut Pcg32::seed_from_u64(4))
            .unwrap();
        assert_eq!(world.alive_count(), 4);
        world.step(130, &mut Pcg32::seed_from_u64(5)).unwrap();
        world.end_episode();
        assert!(world.is_extinct());

        let finished = world.take_population();
        assert_eq!(finished.len(), 4);
        assert!(world.agents().is_empty());

        let config = world.config().clone();
        let fresh = finished
            .into_iter()
            .map(|a| Agent::with_network(a.into_network(), &config))
            .collect();
        world.install_population(fresh);
        assert_eq!(world.alive_count(), 4);
        assert_eq!(world.frame(), 0);
        assert!(world.obstacles().is_empty());
        assert_eq!(world.current_score(), 0);
    }

    #[test]
    fn test_scoring_through_gap() {
        // an agent hovering in an always-open gap scores once per obstacle it claims
        let config = WorldConfig::default();
        let mut world = World::new(config.clone(), vec![]);
        world.obstacles.push(Obstacle::new(150.0, 80.0, 0.0, 600.0));
        world.obstacles.push(Obstacle::new(400.0, 80.0, 0.0, 600.0));
        world.agents.push(Agent::with_network(
            DecisionNetwork::zeroed(config.topology).unwrap(),
            &config,
        ));

        // keep the agent airborne by jumping whenever it falls below the start height
        let mut rng = Pcg32::seed_from_u64(6);
        for _ in 0..60 {
            let a = &mut world.agents[0];
            if a.kinematics().y > config.agent.start_y {
                a.jump(&config);
            }
            world.tick(&mut rng).unwrap();
        }
        let agent = &world.agents[0];
        assert!(agent.is_alive());
        assert_eq!(agent.score(), 1);
        assert_eq!(world.current_score(), 1);
        assert_eq!(world.high_score(), 1);
        assert!(world.obstacles()[0].is_passed());
        assert!(!world.obstacles()[1].is_passed());
    }

    #[test]
    fn test_only_first_agent_scores_per_obstacle() {
        let config = WorldConfig::default();
        let mut world = World::new(config.clone(), vec![]);
        world.obstacles.push(Obstacle::new(150.0, 80.0, 0.0, 600.0));
        for _ in 0..2 {
            world.agents.push(Agent::with_network(
                DecisionNetwork::zeroed(config.topology).unwrap(),
                &config,
            ));
        }

        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..60 {
            for a in &mut world.agents {
                if a.kinematics().y > config.agent.start_y {
                    a.jump(&config);
                }
            }
            world.tick(&mut rng).unwrap();
        }
        let scores: Vec<_> = world.agents().iter().map(Agent::score).collect();
        assert_eq!(scores, [1, 0]);
        assert!(world.agents().iter().all(Agent::is_alive));
        assert_eq!(world.current_score(), 1);
    }
}
