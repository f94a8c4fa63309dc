use rand::Rng;

use crate::ObstacleConfig;

/// A pipe pair with a gap, moving from right to left.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    x: f64,
    width: f64,
    gap_top: f64,
    gap_height: f64,
    passed: bool,
}

impl Obstacle {
    #[must_use]
    pub fn new(x: f64, width: f64, gap_top: f64, gap_height: f64) -> Self {
        Self {
            x,
            width,
            gap_top,
            gap_height,
            passed: false,
        }
    }

    /// Spawns an obstacle at `x` with its gap placed uniformly at random.
    ///
    /// The gap top is drawn from `[margin, canvas_height - gap_height - margin)`.
    /// If that range is empty the gap sits at `margin`.
    pub fn spawn<R>(x: f64, config: &ObstacleConfig, canvas_height: f64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let min = config.gap_margin;
        let max = canvas_height - config.gap_height - config.gap_margin;
        let gap_top = if max > min {
            rng.random_range(min..max)
        } else {
            min
        };
        Self::new(x, config.width, gap_top, config.gap_height)
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn gap_top(&self) -> f64 {
        self.gap_top
    }

    #[must_use]
    pub fn gap_height(&self) -> f64 {
        self.gap_height
    }

    #[must_use]
    pub fn gap_bottom(&self) -> f64 {
        self.gap_top + self.gap_height
    }

    #[must_use]
    pub fn trailing_edge(&self) -> f64 {
        self.x + self.width
    }

    /// Returns `true` once an agent has been credited for this obstacle.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.passed
    }

    /// Credits the obstacle to an agent at `x` if it is still unclaimed and
    /// its trailing edge lies behind `x`.
    ///
    /// Only the first agent to qualify gets `true`.
    pub fn try_pass(&mut self, x: f64) -> bool {
        if self.passed || x <= self.trailing_edge() {
            return false;
        }
        self.passed = true;
        true
    }

    /// Moves the obstacle `speed` units to the left.
    pub fn advance(&mut self, speed: f64) {
        self.x -= speed;
    }

    #[must_use]
    pub fn is_off_screen(&self) -> bool {
        self.trailing_edge() < 0.0
    }
}
