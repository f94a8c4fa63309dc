use evoflap_nn::{DecisionNetwork, NetworkError};
use rand::Rng;

use crate::{
    Obstacle, WorldConfig,
    sensing::{self, Action},
};

/// Position and vertical velocity of an agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub x: f64,
    pub y: f64,
    /// Vertical velocity; positive is downwards.
    pub velocity: f64,
}

/// A simulated bird with its own decision network.
///
/// `alive` goes from `true` to `false` at most once; there is no way back.
/// `fitness` is only meaningful after the episode ends and the evolution
/// controller has scored the population.
#[derive(Debug, Clone)]
pub struct Agent {
    kinematics: Kinematics,
    score: usize,
    distance: u64,
    alive: bool,
    fitness: f64,
    network: DecisionNetwork,
}

impl Agent {
    /// Creates an agent at the start position with a freshly randomized network.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidTopology`] if the configured topology is invalid.
    pub fn random<R>(config: &WorldConfig, rng: &mut R) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        let network = DecisionNetwork::random(config.topology, rng)?;
        Ok(Self::with_network(network, config))
    }

    /// Creates an agent at the start position that owns `network`.
    #[must_use]
    pub fn with_network(network: DecisionNetwork, config: &WorldConfig) -> Self {
        Self {
            kinematics: Kinematics {
                x: config.agent.start_x,
                y: config.agent.start_y,
                velocity: 0.0,
            },
            score: 0,
            distance: 0,
            alive: true,
            fitness: 0.0,
            network,
        }
    }

    #[must_use]
    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    /// Number of obstacles passed.
    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    /// Number of ticks survived.
    #[must_use]
    pub fn distance(&self) -> u64 {
        self.distance
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    pub fn set_score(&mut self, score: usize) {
        self.score = score;
    }

    pub fn set_distance(&mut self, distance: u64) {
        self.distance = distance;
    }

    #[must_use]
    pub fn network(&self) -> &DecisionNetwork {
        &self.network
    }

    /// Mutable access to the network; its topology cannot change.
    pub fn network_mut(&mut self) -> &mut DecisionNetwork {
        &mut self.network
    }

    #[must_use]
    pub fn into_network(self) -> DecisionNetwork {
        self.network
    }

    /// Ends this agent's episode.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn jump(&mut self, config: &WorldConfig) {
        self.kinematics.velocity = config.agent.jump_velocity;
    }

    /// Advances physics by one tick, then lets the network decide whether to jump.
    ///
    /// Dead agents are left untouched. An agent that leaves the vertical bounds
    /// dies before it gets to decide.
    ///
    /// # Errors
    ///
    /// Propagates inference errors from [`think`](Self::think).
    pub fn update(
        &mut self,
        obstacles: &[Obstacle],
        config: &WorldConfig,
    ) -> Result<(), NetworkError> {
        if !self.alive {
            return Ok(());
        }

        let physics = &config.agent;
        let k = &mut self.kinematics;
        k.velocity = (k.velocity + physics.gravity).min(physics.max_velocity);
        k.y += k.velocity;
        self.distance += 1;

        if k.y - physics.radius <= 0.0 || k.y + physics.radius >= config.height {
            self.alive = false;
            return Ok(());
        }

        self.think(obstacles, config)?;
        Ok(())
    }

    /// Senses the obstacles ahead, asks the network, and applies a jump if requested.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InputSizeMismatch`] if the network does not take
    /// [`sensing::FEATURE_COUNT`] inputs.
    pub fn think(
        &mut self,
        obstacles: &[Obstacle],
        config: &WorldConfig,
    ) -> Result<Action, NetworkError> {
        let features = sensing::sense(&self.kinematics, obstacles, config);
        let action = sensing::decide(&self.network, &features)?;
        if action.is_jump() {
            self.jump(config);
        }
        Ok(action)
    }

    /// Kills the agent if its circle overlaps either pipe of `obstacle`.
    ///
    /// Returns `true` if this call caused the death.
    pub fn check_collision(&mut self, obstacle: &Obstacle, config: &WorldConfig) -> bool {
        if !self.alive {
            return false;
        }
        let Kinematics { x, y, .. } = self.kinematics;
        let r = config.agent.radius;
        let within_x = x + r > obstacle.x() && x - r < obstacle.trailing_edge();
        let outside_gap = y - r < obstacle.gap_top() || y + r > obstacle.gap_bottom();
        if within_x && outside_gap {
            self.alive = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use evoflap_nn::Topology;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn idle_agent(config: &WorldConfig) -> Agent {
        // a zeroed network outputs exactly 0.5 and never jumps
        Agent::with_network(DecisionNetwork::zeroed(config.topology).unwrap(), config)
    }

    #[test]
    fn test_new_agent_state() {
        let config = WorldConfig::default();
        let agent = Agent::random(&config, &mut Pcg32::seed_from_u64(1)).unwrap();
        assert!(agent.is_alive());
        assert_eq!(agent.score(), 0);
        assert_eq!(agent.distance(), 0);
        assert_eq!(agent.kinematics().x, 100.0);
        assert_eq!(agent.kinematics().y, 300.0);
        assert_eq!(agent.network().topology(), Topology::new(7, 16, 1));
    }

    #[test]
    fn test_gravity_and_velocity_cap() {
        let config = WorldConfig::default();
        let mut agent = idle_agent(&config);
        agent.update(&[], &config).unwrap();
        assert_eq!(agent.kinematics().velocity, 0.5);
        assert_eq!(agent.kinematics().y, 300.5);
        assert_eq!(agent.distance(), 1);

        for _ in 0..30 {
            agent.update(&[], &config).unwrap();
        }
        assert!(agent.kinematics().velocity <= config.agent.max_velocity);
    }

    #[test]
    fn test_falls_out_of_bounds_and_stays_dead() {
        let config = WorldConfig::default();
        let mut agent = idle_agent(&config);
        let mut ticks = 0;
        while agent.is_alive() {
            agent.update(&[], &config).unwrap();
            ticks += 1;
            assert!(ticks < 1000);
        }
        let distance = agent.distance();
        agent.update(&[], &config).unwrap();
        assert!(!agent.is_alive());
        assert_eq!(agent.distance(), distance);
    }

    #[test]
    fn test_jump() {
        let config = WorldConfig::default();
        let mut agent = idle_agent(&config);
        agent.jump(&config);
        assert_eq!(agent.kinematics().velocity, -9.0);
    }

    #[test]
    fn test_collision() {
        let config = WorldConfig::default();
        let mut agent = idle_agent(&config);

        // gap around the agent: no collision
        let open = Obstacle::new(90.0, 80.0, 200.0, 180.0);
        assert!(!agent.check_collision(&open, &config));
        assert!(agent.is_alive());

        // horizontally clear: no collision even though the gap is elsewhere
        let far = Obstacle::new(300.0, 80.0, 0.0, 100.0);
        assert!(!agent.check_collision(&far, &config));

        let wall = Obstacle::new(90.0, 80.0, 400.0, 180.0);
        assert!(agent.check_collision(&wall, &config));
        assert!(!agent.is_alive());
        // already dead
        assert!(!agent.check_collision(&wall, &config));
    }

    #[test]
    fn test_think_wrong_topology() {
        let config = WorldConfig::default();
        let network = DecisionNetwork::zeroed(Topology::new(2, 2, 1)).unwrap();
        let mut agent = Agent::with_network(network, &config);
        assert!(matches!(
            agent.update(&[], &config),
            Err(NetworkError::InputSizeMismatch {
                expected: 2,
                actual: 7
            })
        ));
    }
}
