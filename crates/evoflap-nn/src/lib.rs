//! Fixed-topology feed-forward networks used as agent brains.
//!
//! This crate provides the numeric core that maps sensed state to an action:
//!
//! - [`Matrix`] - Dense row-major `f64` buffer with multiply, add and element-wise map
//! - [`DecisionNetwork`] - Input → hidden (`tanh`) → output (`sigmoid`) network built on [`Matrix`]
//!
//! Networks never change shape after construction. Evolution only touches their
//! values, through [`DecisionNetwork::mutate_perturb`] and
//! [`DecisionNetwork::inherit_weights`].
//!
//! # Example
//!
//! ```
//! use evoflap_nn::{DecisionNetwork, Topology};
//!
//! let topology = Topology::new(7, 16, 1);
//! let network = DecisionNetwork::random(topology, &mut rand::rng()).unwrap();
//!
//! let output = network.infer(&[0.5, 0.5, 1.0, 0.5, 0.5, 0.5, 0.5]).unwrap();
//! assert_eq!(output.len(), 1);
//! assert!(output[0] > 0.0 && output[0] < 1.0);
//! ```

pub use self::{matrix::*, network::*};

pub mod matrix;
pub mod network;
