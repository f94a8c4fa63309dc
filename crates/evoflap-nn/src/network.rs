//! Fixed-topology feed-forward decision network.
//!
//! The network has a single hidden layer:
//!
//! ```text
//! hidden = tanh(W_ih · input + B_h)
//! output = sigmoid(W_ho · hidden + B_o)
//! ```
//!
//! `tanh` keeps hidden activations in `(-1, 1)`; `sigmoid` keeps outputs in
//! `(0, 1)` so they can be read as an action threshold.
//!
//! # Genetic Operators
//!
//! - [`DecisionNetwork::mutate_perturb`] nudges every weight *and bias* with
//!   probability `rate` by a uniform offset in `[-0.5, 0.5)`. Values are not
//!   clamped afterwards, so weights may drift over many generations.
//! - [`DecisionNetwork::inherit_weights`] copies individual entries of the two
//!   weight matrices from another network. Biases are never inherited this way;
//!   they always come from the network being written to.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::matrix::{Matrix, MatrixError};

/// Half-width of the uniform offset applied by [`DecisionNetwork::mutate_perturb`].
pub const MUTATION_SCALE: f64 = 0.5;

/// Errors raised by network construction, inference and genetic operators.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    #[display("invalid topology {input}-{hidden}-{output} (all layers need at least one node)")]
    InvalidTopology {
        input: usize,
        hidden: usize,
        output: usize,
    },
    #[display("input vector has {actual} values, network expects {expected}")]
    InputSizeMismatch { expected: usize, actual: usize },
    #[display("mutation rate {rate} is outside [0, 1]")]
    InvalidRate { rate: f64 },
    #[display("networks have different topologies: {left} vs {right}")]
    TopologyMismatch { left: Topology, right: Topology },
    #[display("{_0}")]
    Matrix(MatrixError),
}

impl From<MatrixError> for NetworkError {
    fn from(err: MatrixError) -> Self {
        Self::Matrix(err)
    }
}

/// Node counts of the three layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("{input}-{hidden}-{output}")]
pub struct Topology {
    pub input: usize,
    pub hidden: usize,
    pub output: usize,
}

impl Topology {
    #[must_use]
    pub const fn new(input: usize, hidden: usize, output: usize) -> Self {
        Self {
            input,
            hidden,
            output,
        }
    }

    fn validate(self) -> Result<Self, NetworkError> {
        if self.input == 0 || self.hidden == 0 || self.output == 0 {
            return Err(NetworkError::InvalidTopology {
                input: self.input,
                hidden: self.hidden,
                output: self.output,
            });
        }
        Ok(self)
    }

    /// Total number of weights and biases.
    #[must_use]
    pub const fn parameter_count(self) -> usize {
        self.hidden * self.input + self.output * self.hidden + self.hidden + self.output
    }
}

/// A feed-forward network with one hidden layer.
///
/// Cloning performs a deep copy: the clone shares no storage with its source,
/// so mutating one never affects the other.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionNetwork {
    topology: Topology,
    /// `hidden × input`
    weights_ih: Matrix,
    /// `output × hidden`
    weights_ho: Matrix,
    /// `hidden × 1`
    bias_h: Matrix,
    /// `output × 1`
    bias_o: Matrix,
}

impl DecisionNetwork {
    /// Creates a network with every weight and bias set to zero.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidTopology`] if any layer has zero nodes.
    pub fn zeroed(topology: Topology) -> Result<Self, NetworkError> {
        let Topology {
            input,
            hidden,
            output,
        } = topology.validate()?;
        Ok(Self {
            topology,
            weights_ih: Matrix::zeros(hidden, input)?,
            weights_ho: Matrix::zeros(output, hidden)?,
            bias_h: Matrix::zeros(hidden, 1)?,
            bias_o: Matrix::zeros(output, 1)?,
        })
    }

    /// Creates a network with every weight and bias drawn uniformly from `[-1, 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidTopology`] if any layer has zero nodes.
    pub fn random<R>(topology: Topology, rng: &mut R) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        let mut network = Self::zeroed(topology)?;
        for m in network.matrices_mut() {
            m.randomize(rng);
        }
        Ok(network)
    }

    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[must_use]
    pub fn weights_ih(&self) -> &Matrix {
        &self.weights_ih
    }

    #[must_use]
    pub fn weights_ho(&self) -> &Matrix {
        &self.weights_ho
    }

    #[must_use]
    pub fn bias_h(&self) -> &Matrix {
        &self.bias_h
    }

    #[must_use]
    pub fn bias_o(&self) -> &Matrix {
        &self.bias_o
    }

    fn matrices_mut(&mut self) -> [&mut Matrix; 4] {
        [
            &mut self.weights_ih,
            &mut self.weights_ho,
            &mut self.bias_h,
            &mut self.bias_o,
        ]
    }

    /// Mutable access to every parameter, in the order `W_ih`, `W_ho`, `B_h`, `B_o`.
    ///
    /// Shapes stay fixed; only values can be changed.
    pub fn parameters_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        self.matrices_mut()
            .into_iter()
            .flat_map(|m| m.values_mut().iter_mut())
    }

    /// Runs a forward pass and returns the output layer activations.
    ///
    /// Inference is a pure function of the weights and `input`.
    ///
    /// Outputs lie in `(0, 1)` while pre-activations stay moderate. The sigmoid
    /// saturates in `f64`: a pre-activation above about 36.7 yields exactly `1.0`,
    /// which drifting weights can reach since mutation never clamps.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InputSizeMismatch`] if `input.len()` differs from
    /// the topology's input node count.
    pub fn infer(&self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if input.len() != self.topology.input {
            return Err(NetworkError::InputSizeMismatch {
                expected: self.topology.input,
                actual: input.len(),
            });
        }
        let input = Matrix::column(input)?;

        let hidden = self
            .weights_ih
            .multiply(&input)?
            .add(&self.bias_h)?
            .map(f64::tanh);

        let output = self
            .weights_ho
            .multiply(&hidden)?
            .add(&self.bias_o)?
            .map(sigmoid);

        Ok(output.to_column_vec())
    }

    /// Perturbs each weight and bias independently with probability `rate`.
    ///
    /// A perturbed value receives an offset drawn uniformly from
    /// `[-MUTATION_SCALE, MUTATION_SCALE)`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidRate`] if `rate` is not within `[0, 1]`.
    pub fn mutate_perturb<R>(&mut self, rate: f64, rng: &mut R) -> Result<(), NetworkError>
    where
        R: Rng + ?Sized,
    {
        validate_rate(rate)?;
        for value in self.parameters_mut() {
            if rng.random_bool(rate) {
                *value += rng.random_range(-1.0_f64..1.0) * MUTATION_SCALE;
            }
        }
        Ok(())
    }

    /// Overwrites weight entries with `donor`'s wherever `pick` returns `true`.
    ///
    /// `pick` is called once per entry of `W_ih`, then once per entry of `W_ho`,
    /// both in row-major order. Biases are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::TopologyMismatch`] if the two networks differ in shape.
    pub fn inherit_weights<F>(&mut self, donor: &Self, mut pick: F) -> Result<(), NetworkError>
    where
        F: FnMut() -> bool,
    {
        if self.topology != donor.topology {
            return Err(NetworkError::TopologyMismatch {
                left: self.topology,
                right: donor.topology,
            });
        }
        self.weights_ih.inherit_from(&donor.weights_ih, &mut pick)?;
        self.weights_ho.inherit_from(&donor.weights_ho, &mut pick)?;
        Ok(())
    }
}

/// Logistic function `1 / (1 + e^-x)`.
#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Checks that `rate` is a probability.
///
/// # Errors
///
/// Returns [`NetworkError::InvalidRate`] if `rate` is not within `[0, 1]` (including NaN).
pub fn validate_rate(rate: f64) -> Result<f64, NetworkError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(NetworkError::InvalidRate { rate })
    }
}
