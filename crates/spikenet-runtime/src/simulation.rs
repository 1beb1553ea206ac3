//! Run loop and spike recording

use std::time::Instant;

use crate::{
    error::*,
    network::{Network, NetworkConfig},
    stimulus::{GaussianDrive, StimulusProvider},
    topology::{RandomTopology, TopologyProvider},
    NeuronId,
};

/// Simulation parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationParams {
    /// Number of ticks to run
    pub steps: u64,
    /// Maximum spikes to record (prevents memory issues)
    pub max_recorded_spikes: Option<usize>,
    /// Enable performance sampling
    pub perf_enabled: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            steps: 1_000,
            max_recorded_spikes: Some(10_000_000),
            perf_enabled: false,
        }
    }
}

impl SimulationParams {
    /// Create new simulation parameters with validation
    pub fn new(steps: u64) -> Result<Self> {
        let params = Self {
            steps,
            ..Default::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Set maximum spike recording limit
    pub fn with_spike_limit(mut self, limit: Option<usize>) -> Self {
        self.max_recorded_spikes = limit;
        self
    }

    /// Enable or disable performance sampling
    pub fn with_perf(mut self, enabled: bool) -> Self {
        self.perf_enabled = enabled;
        self
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(RuntimeError::invalid_parameter(
                "steps",
                self.steps.to_string(),
                "> 0",
            ));
        }
        Ok(())
    }
}

/// A neuron firing on a given tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpikeEvent {
    /// Tick index the spike was emitted on
    pub tick: u64,
    /// Neuron that fired
    pub neuron: NeuronId,
}

/// Performance metrics collected during simulation steps.
/// Present when SimulationParams::with_perf(true) is used.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerfReport {
    /// Average step time in nanoseconds
    pub avg_step_ns: u64,
    /// Max step time in nanoseconds
    pub max_step_ns: u64,
    /// Steps sampled
    pub steps: usize,
}

/// Simulation results
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationResult {
    /// Recorded spikes in emission order
    pub spikes: Vec<SpikeEvent>,
    /// Number of ticks executed
    pub steps_executed: u64,
    /// Total spike count
    pub total_spikes: usize,
    /// Optional performance report
    pub perf: Option<PerfReport>,
}

impl SimulationResult {
    /// Spikes emitted by one neuron
    pub fn spikes_for_neuron(&self, neuron: NeuronId) -> Vec<&SpikeEvent> {
        self.spikes
            .iter()
            .filter(|spike| spike.neuron == neuron)
            .collect()
    }

    /// Number of spikes emitted by one neuron
    pub fn spike_count(&self, neuron: NeuronId) -> usize {
        self.spikes.iter().filter(|spike| spike.neuron == neuron).count()
    }

    /// Firing rate of one neuron in spikes per unit of simulated time
    pub fn firing_rate(&self, neuron: NeuronId, dt: f64) -> f64 {
        let duration = self.steps_executed as f64 * dt;
        if duration <= 0.0 {
            return 0.0;
        }
        self.spike_count(neuron) as f64 / duration
    }

    /// Mean firing rate across `neuron_count` neurons
    pub fn mean_firing_rate(&self, neuron_count: usize, dt: f64) -> f64 {
        let duration = self.steps_executed as f64 * dt;
        if duration <= 0.0 || neuron_count == 0 {
            return 0.0;
        }
        self.total_spikes as f64 / (duration * neuron_count as f64)
    }

    /// Export spikes as `(tick, neuron)` pairs
    pub fn export_spikes(&self) -> Vec<(u64, u32)> {
        self.spikes
            .iter()
            .map(|spike| (spike.tick, spike.neuron.raw()))
            .collect()
    }
}

/// Drives a network with a stimulus provider and records its spikes
#[derive(Debug)]
pub struct SimulationEngine<S> {
    network: Network,
    stimulus: S,
    params: SimulationParams,
}

impl<S: StimulusProvider> SimulationEngine<S> {
    /// Create a new simulation engine
    pub fn new(network: Network, stimulus: S, params: SimulationParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            network,
            stimulus,
            params,
        })
    }

    /// Run the configured number of ticks from the network's current state
    pub fn run(&mut self) -> Result<SimulationResult> {
        log::info!(
            "Starting simulation: {} steps of dt={} over {} neurons",
            self.params.steps,
            self.network.config().dt,
            self.network.neuron_count()
        );

        let mut result = SimulationResult::default();
        let mut drive = vec![0.0; self.network.neuron_count()];
        let mut perf_samples = Vec::new();
        let num_steps = self.params.steps;

        for step in 0..num_steps {
            let step_start = Instant::now();
            let tick = self.network.current_tick();

            self.stimulus.fill(tick, &mut drive)?;
            let fired = self.network.tick(&drive)?;
            result.total_spikes += fired.len();
            result.steps_executed += 1;

            let max_spikes = self.params.max_recorded_spikes.unwrap_or(usize::MAX);
            for neuron in fired {
                if result.spikes.len() >= max_spikes {
                    break;
                }
                result.spikes.push(SpikeEvent { tick, neuron });
            }
            let limit_reached = result.spikes.len() >= max_spikes;

            if self.params.perf_enabled {
                perf_samples.push(step_start.elapsed().as_nanos() as u64);
            }

            if limit_reached {
                log::warn!(
                    "Spike recording limit reached at tick {}: {:?}",
                    tick,
                    self.params.max_recorded_spikes
                );
                break;
            }

            if step % (num_steps / 10).max(1) == 0 {
                let progress = (step as f64 / num_steps as f64) * 100.0;
                log::debug!("Simulation progress: {:.1}%", progress);
            }
        }

        if !perf_samples.is_empty() {
            let steps = perf_samples.len();
            let sum: u128 = perf_samples.iter().map(|v| *v as u128).sum();
            let max = perf_samples.iter().copied().max().unwrap_or(0);
            result.perf = Some(PerfReport {
                avg_step_ns: (sum / steps as u128) as u64,
                max_step_ns: max,
                steps,
            });
        }

        log::info!(
            "Simulation completed: {} spikes in {} steps",
            result.total_spikes,
            result.steps_executed
        );
        Ok(result)
    }

    /// Get reference to network
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Get mutable reference to network
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Get simulation parameters
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Give back the network and stimulus provider
    pub fn into_parts(self) -> (Network, S) {
        (self.network, self.stimulus)
    }
}

/// Simulate a random network under a fixed gaussian drive
///
/// Every ordered pair of distinct neurons is connected with probability
/// `connection_probability` and weight `weight`; each neuron receives a
/// constant drive drawn once from `N(drive_mean, drive_std^2)`. Both draws
/// are seeded from `seed`, so equal arguments give equal results.
#[allow(clippy::too_many_arguments)]
pub fn run_random_network(
    neuron_count: usize,
    connection_probability: f64,
    weight: f64,
    config: NetworkConfig,
    drive_mean: f64,
    drive_std: f64,
    steps: u64,
    seed: u64,
) -> Result<SimulationResult> {
    let topology =
        RandomTopology::new(connection_probability, weight, seed)?.generate(neuron_count)?;
    let network = Network::new(config, topology)?;
    let stimulus = GaussianDrive::new(drive_mean, drive_std, seed.wrapping_add(1))?;
    let params = SimulationParams::new(steps)?;
    SimulationEngine::new(network, stimulus, params)?.run()
}
