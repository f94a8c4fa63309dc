use evoflap_nn::Topology;
use serde::{Deserialize, Serialize};

/// Physical constants of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub start_x: f64,
    pub start_y: f64,
    pub radius: f64,
    /// Added to the vertical velocity every tick.
    pub gravity: f64,
    /// Velocity set by a jump (negative is up).
    pub jump_velocity: f64,
    /// Magnitude cap on the falling velocity, also used to normalize velocity.
    pub max_velocity: f64,
}

/// Geometry and movement of obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub width: f64,
    pub gap_height: f64,
    /// Minimum distance between a gap and the top or bottom of the canvas.
    pub gap_margin: f64,
    /// Horizontal distance travelled per tick.
    pub speed: f64,
    /// Ticks between two spawns.
    pub spawn_interval: u64,
}

/// Scales used to normalize sensed distances into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensingConfig {
    pub vertical_scale: f64,
    pub horizontal_scale: f64,
}

/// All constants of a simulated world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    pub agent: AgentConfig,
    pub obstacle: ObstacleConfig,
    pub sensing: SensingConfig,
    pub topology: Topology,
}

impl WorldConfig {
    pub const DEFAULT: Self = Self {
        width: 800.0,
        height: 600.0,
        agent: AgentConfig {
            start_x: 100.0,
            start_y: 300.0,
            radius: 18.0,
            gravity: 0.5,
            jump_velocity: -9.0,
            max_velocity: 12.0,
        },
        obstacle: ObstacleConfig {
            width: 80.0,
            gap_height: 180.0,
            gap_margin: 80.0,
            speed: 3.0,
            spawn_interval: 120,
        },
        sensing: SensingConfig {
            vertical_scale: 600.0,
            horizontal_scale: 400.0,
        },
        topology: Topology::new(crate::sensing::FEATURE_COUNT, 16, 1),
    };
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_json() {
        let config = WorldConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: WorldConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
