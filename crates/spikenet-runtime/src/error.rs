//! Error types for the spiking network runtime

use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur in the spiking network runtime
///
/// Every variant is a programmer or configuration error. The engine performs
/// no I/O, so nothing here is transient or worth retrying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Invalid network configuration
    #[error("Invalid network configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for invalid configuration
        reason: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Connectivity and weights disagree, or reference missing neurons
    #[error("Network topology error: {reason}")]
    NetworkTopology {
        /// Reason for topology error
        reason: String,
    },

    /// Per-tick drive vector does not match the neuron count
    #[error("Drive vector has length {actual}, expected {expected}")]
    InputShape {
        /// Neuron count of the network
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Neuron not found
    #[error("Neuron {neuron_id} not found")]
    NeuronNotFound {
        /// Neuron ID that was not found
        neuron_id: u32,
    },
}

impl RuntimeError {
    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create a network topology error
    pub fn network_topology(reason: impl Into<String>) -> Self {
        Self::NetworkTopology {
            reason: reason.into(),
        }
    }

    /// Create an input shape error
    pub fn input_shape(expected: usize, actual: usize) -> Self {
        Self::InputShape { expected, actual }
    }
}
