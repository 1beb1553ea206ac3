//! Discrete-time simulation engine for networks of Leaky-Integrate-and-Fire
//! neurons.
//!
//! The crate is layered in two parts: [`neuron::LifNeuron`] is an isolated
//! integrate / fire / refractory state machine, and [`network::Network`]
//! drives an arena of them every tick, delivering each spike to downstream
//! neurons after a fixed transmission delay through per-neuron FIFO queues.
//! Topology generation, external drive and the run loop are pluggable
//! collaborators ([`topology`], [`stimulus`], [`simulation`]).

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod ids;
pub mod neuron;
pub mod queue;
pub mod topology;
pub mod network;
pub mod stimulus;
pub mod simulation;

// Re-export essential types
pub use error::{RuntimeError, Result};
pub use ids::NeuronId;
pub use neuron::{LifNeuron, NeuronPhase};
pub use queue::{DelayQueue, PendingInput};
pub use topology::{RandomTopology, Topology, TopologyProvider};
pub use network::{Network, NetworkBuilder, NetworkConfig};
pub use stimulus::{ConstantDrive, FnDrive, GaussianDrive, StimulusProvider};
pub use simulation::{
    run_random_network, PerfReport, SimulationEngine, SimulationParams, SimulationResult,
    SpikeEvent,
};

/// Default integration step
pub const DEFAULT_DT: f64 = 0.01;

/// Default refractory duration, in the same time units as `dt`
pub const DEFAULT_T_REF: f64 = 1.0;

/// Default transmission delay, in the same time units as `dt`
pub const DEFAULT_T_DELAY: f64 = 1.0;

/// Default firing threshold
pub const DEFAULT_THRESHOLD: f64 = 1.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        let config = NetworkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dt, DEFAULT_DT);
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);

        let params = SimulationParams::default();
        assert!(params.steps > 0);

        let network = NetworkBuilder::new(3).build().unwrap();
        assert_eq!(network.neuron_count(), 3);
    }
}
