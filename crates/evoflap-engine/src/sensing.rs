//! Turns an agent's view of the world into network inputs and a decision.
//!
//! # Features
//!
//! | index | meaning                                             |
//! |-------|-----------------------------------------------------|
//! | 0     | vertical position / vertical scale                  |
//! | 1     | velocity mapped from `[-vmax, vmax]` to `[0, 1]`    |
//! | 2     | horizontal gap to the nearest obstacle              |
//! | 3     | nearest gap top                                     |
//! | 4     | nearest gap bottom                                  |
//! | 5     | position relative to the nearest gap (0.5 = top)    |
//! | 6     | second nearest gap top, `0.5` if there is none      |
//!
//! Every entry except the velocity is clamped to `[0, 1]` when an obstacle is
//! ahead. With nothing ahead the fixed [`fallback`] vector is used instead.

use evoflap_nn::{DecisionNetwork, NetworkError};

use crate::{Kinematics, Obstacle, WorldConfig};

/// Length of the feature vector.
pub const FEATURE_COUNT: usize = 7;

/// Network outputs strictly above this value trigger a jump.
pub const JUMP_THRESHOLD: f64 = 0.5;

pub type Features = [f64; FEATURE_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Action {
    Jump,
    Glide,
}

/// The nearest and second nearest obstacles ahead of `x`.
///
/// An obstacle counts as ahead while its trailing edge has not passed `x`,
/// i.e. `obstacle.x - x > -obstacle.width`. Ties keep the earlier obstacle.
#[must_use]
pub fn nearest_ahead(x: f64, obstacles: &[Obstacle]) -> (Option<&Obstacle>, Option<&Obstacle>) {
    let ahead = move || {
        obstacles
            .iter()
            .enumerate()
            .map(move |(i, o)| (i, o, o.x() - x))
            .filter(|(_, o, gap)| *gap > -o.width())
    };
    let nearest = ahead().min_by(|a, b| a.2.total_cmp(&b.2));
    let Some((nearest_index, nearest, _)) = nearest else {
        return (None, None);
    };
    let second = ahead()
        .filter(|(i, _, _)| *i != nearest_index)
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(_, o, _)| o);
    (Some(nearest), second)
}

/// Inputs used when no obstacle is ahead.
#[must_use]
pub fn fallback(kinematics: &Kinematics, config: &WorldConfig) -> Features {
    [
        kinematics.y / config.sensing.vertical_scale,
        0.5,
        1.0,
        0.5,
        0.5,
        0.5,
        0.5,
    ]
}

/// Builds the feature vector for an agent.
#[must_use]
pub fn sense(kinematics: &Kinematics, obstacles: &[Obstacle], config: &WorldConfig) -> Features {
    let (Some(nearest), second) = nearest_ahead(kinematics.x, obstacles) else {
        return fallback(kinematics, config);
    };
    let vertical = config.sensing.vertical_scale;
    let horizontal = config.sensing.horizontal_scale;
    let max_velocity = config.agent.max_velocity;
    let unit = |v: f64| v.clamp(0.0, 1.0);

    [
        unit(kinematics.y / vertical),
        (kinematics.velocity + max_velocity) / (2.0 * max_velocity),
        unit((nearest.x() - kinematics.x) / horizontal),
        unit(nearest.gap_top() / vertical),
        unit(nearest.gap_bottom() / vertical),
        unit((kinematics.y - nearest.gap_top()) / nearest.gap_height() + 0.5),
        second.map_or(0.5, |o| unit(o.gap_top() / vertical)),
    ]
}

/// Runs `features` through `network` and reads the first output as a jump threshold.
///
/// # Errors
///
/// Returns [`NetworkError::InputSizeMismatch`] if the network does not take
/// [`FEATURE_COUNT`] inputs.
pub fn decide(network: &DecisionNetwork, features: &Features) -> Result<Action, NetworkError> {
    let output = network.infer(features)?;
    let jump = output.first().is_some_and(|v| *v > JUMP_THRESHOLD);
    Ok(if jump { Action::Jump } else { Action::Glide })
}

#[cfg(test)]
mod tests {
    use evoflap_nn::Topology;

    use super::*;

    fn kinematics(y: f64, velocity: f64) -> Kinematics {
        Kinematics {
            x: 100.0,
            y,
            velocity,
        }
    }

    fn assert_close(actual: &Features, expected: &Features) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_nearest_ahead_skips_passed() {
        let obstacles = [
            Obstacle::new(10.0, 80.0, 100.0, 180.0), // trailing edge 90, behind
            Obstacle::new(400.0, 80.0, 200.0, 180.0),
            Obstacle::new(250.0, 80.0, 150.0, 180.0),
        ];
        let (nearest, second) = nearest_ahead(100.0, &obstacles);
        assert_eq!(nearest.unwrap().x(), 250.0);
        assert_eq!(second.unwrap().x(), 400.0);
    }

    #[test]
    fn test_nearest_ahead_overlapping_counts() {
        // agent is inside the pipe: gap is -50 > -80
        let obstacles = [Obstacle::new(50.0, 80.0, 100.0, 180.0)];
        let (nearest, second) = nearest_ahead(100.0, &obstacles);
        assert_eq!(nearest.unwrap().x(), 50.0);
        assert!(second.is_none());
    }

    #[test]
    fn test_nearest_ahead_empty() {
        assert_eq!(nearest_ahead(100.0, &[]), (None, None));
        let behind = [Obstacle::new(0.0, 80.0, 100.0, 180.0)];
        assert_eq!(nearest_ahead(100.0, &behind), (None, None));
    }

    #[test]
    fn test_sense_fallback() {
        let config = WorldConfig::default();
        let features = sense(&kinematics(300.0, 4.0), &[], &config);
        assert_eq!(features, [0.5, 0.5, 1.0, 0.5, 0.5, 0.5, 0.5]);

        // the fallback does not clamp the vertical position
        let features = sense(&kinematics(900.0, 0.0), &[], &config);
        assert_eq!(features[0], 1.5);
    }

    #[test]
    fn test_sense_single_obstacle() {
        let config = WorldConfig::default();
        let obstacles = [Obstacle::new(300.0, 80.0, 240.0, 180.0)];
        let features = sense(&kinematics(300.0, -6.0), &obstacles, &config);
        assert_close(
            &features,
            &[
                0.5,
                0.25,
                0.5,
                0.4,
                0.7,
                60.0 / 180.0 + 0.5,
                0.5,
            ],
        );
    }

    #[test]
    fn test_sense_clamps() {
        let config = WorldConfig::default();
        let obstacles = [
            Obstacle::new(900.0, 80.0, 100.0, 180.0),
            Obstacle::new(1300.0, 80.0, 330.0, 180.0),
        ];
        let features = sense(&kinematics(-30.0, 12.0), &obstacles, &config);
        assert_eq!(features[0], 0.0);
        assert_eq!(features[1], 1.0);
        assert_eq!(features[2], 1.0);
        assert_eq!(features[5], 0.0);
        assert!((features[6] - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_decide_threshold() {
        let topology = Topology::new(FEATURE_COUNT, 4, 1);
        let zero = DecisionNetwork::zeroed(topology).unwrap();
        // sigmoid(0) == 0.5 is not above the threshold
        assert_eq!(decide(&zero, &[0.5; 7]).unwrap(), Action::Glide);

        let mut eager = zero.clone();
        // last parameter is the output bias
        if let Some(bias) = eager.parameters_mut().last() {
            *bias = 1.0;
        }
        assert!(decide(&eager, &[0.5; 7]).unwrap().is_jump());
    }

    #[test]
    fn test_decide_wrong_topology() {
        let network = DecisionNetwork::zeroed(Topology::new(3, 2, 1)).unwrap();
        assert!(decide(&network, &[0.0; 7]).is_err());
    }
}
