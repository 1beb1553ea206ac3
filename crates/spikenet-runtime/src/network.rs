//! Delay-queued network scheduler

use crate::{
    error::*,
    neuron::LifNeuron,
    queue::DelayQueue,
    topology::Topology,
    NeuronId, DEFAULT_DT, DEFAULT_THRESHOLD, DEFAULT_T_DELAY, DEFAULT_T_REF,
};

/// Network configuration parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NetworkConfig {
    /// Membrane time constant shared by every neuron
    pub tau: f64,
    /// Refractory duration
    pub t_ref: f64,
    /// Transmission delay between a spike and its delivery
    pub t_delay: f64,
    /// Integration step
    pub dt: f64,
    /// Firing threshold
    pub threshold: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            tau: 8.0,
            t_ref: DEFAULT_T_REF,
            t_delay: DEFAULT_T_DELAY,
            dt: DEFAULT_DT,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl NetworkConfig {
    /// Set the membrane time constant
    pub fn with_tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    /// Set the refractory duration
    pub fn with_t_ref(mut self, t_ref: f64) -> Self {
        self.t_ref = t_ref;
        self
    }

    /// Set the transmission delay
    pub fn with_t_delay(mut self, t_delay: f64) -> Self {
        self.t_delay = t_delay;
        self
    }

    /// Set the integration step
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the firing threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(RuntimeError::invalid_parameter(
                "dt",
                self.dt.to_string(),
                "> 0.0",
            ));
        }
        if !(self.t_delay.is_finite() && self.t_delay >= 0.0) {
            return Err(RuntimeError::invalid_parameter(
                "t_delay",
                self.t_delay.to_string(),
                ">= 0.0",
            ));
        }
        // Neuron parameters are checked by the neuron itself
        LifNeuron::with_threshold(self.tau, self.t_ref, self.threshold)?;
        self.delay_ticks()?;
        Ok(())
    }

    /// Transmission delay expressed in whole ticks
    ///
    /// The delay is rounded up to a whole number of ticks so a spike is
    /// never delivered before `t_delay` has elapsed. Ratios within float
    /// noise of an integer stay on that integer.
    pub fn delay_ticks(&self) -> Result<u64> {
        let ticks = ((self.t_delay / self.dt) * (1.0 - 1e-9)).ceil();
        if !ticks.is_finite() || ticks > u32::MAX as f64 {
            return Err(RuntimeError::invalid_parameter(
                "t_delay",
                format!("{} (with dt={})", self.t_delay, self.dt),
                "a delay representable in ticks",
            ));
        }
        Ok(ticks as u64)
    }
}

/// Outgoing synaptic connection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Synapse {
    /// Post-synaptic neuron
    pub target: NeuronId,
    /// Synaptic weight
    pub weight: f64,
}

/// Network of LIF neurons with constant-delay spike delivery
///
/// Neurons live in an arena addressed by [`NeuronId`]. Outgoing synapses
/// and delay queues are index-aligned with it. The clock is an integer tick
/// counter; simulated time is `tick * dt`.
#[derive(Debug, Clone)]
pub struct Network {
    config: NetworkConfig,
    neurons: Vec<LifNeuron>,
    /// Outgoing synapses per source neuron
    synapses: Vec<Vec<Synapse>>,
    /// Pending inputs per target neuron
    queues: Vec<DelayQueue>,
    /// Delayed input each neuron received on the most recent tick
    neighbor_input: Vec<f64>,
    delay_ticks: u64,
    current_tick: u64,
}

impl Network {
    /// Build a network from a configuration and a topology
    ///
    /// Construction is all-or-nothing: any inconsistency between the
    /// configuration, connectivity and weights is reported here and no
    /// network is returned.
    pub fn new(config: NetworkConfig, topology: Topology) -> Result<Self> {
        config.validate()?;
        topology.validate()?;

        let neuron_count = topology.neuron_count;
        if u32::try_from(neuron_count).is_err() {
            return Err(RuntimeError::invalid_config(format!(
                "{} neurons exceed the id space",
                neuron_count
            )));
        }

        let prototype = LifNeuron::with_threshold(config.tau, config.t_ref, config.threshold)?;
        let mut synapses = vec![Vec::new(); neuron_count];
        for (&source, targets) in &topology.connectivity {
            let outgoing = &mut synapses[source.index()];
            for &target in targets {
                let weight = topology.weight(source, target).ok_or_else(|| {
                    RuntimeError::network_topology(format!(
                        "edge {} -> {} has no weight",
                        source, target
                    ))
                })?;
                outgoing.push(Synapse { target, weight });
            }
        }

        let delay_ticks = config.delay_ticks()?;
        if (delay_ticks as f64 * config.dt - config.t_delay).abs() > config.dt * 1e-9 {
            log::debug!(
                "Transmission delay {} is not a multiple of dt {}; using {} ticks",
                config.t_delay,
                config.dt,
                delay_ticks
            );
        }

        log::debug!(
            "Built network: {} neurons, {} edges, delay {} ticks",
            neuron_count,
            topology.edge_count(),
            delay_ticks
        );

        Ok(Self {
            config,
            neurons: vec![prototype; neuron_count],
            synapses,
            queues: vec![DelayQueue::new(); neuron_count],
            neighbor_input: vec![0.0; neuron_count],
            delay_ticks,
            current_tick: 0,
        })
    }

    /// Advance every neuron by one tick and return the ids that fired
    ///
    /// Each neuron first drains its queue of inputs due at the current tick,
    /// then steps with its external drive. Spikes fired on this tick are
    /// queued for their targets only after every neuron has stepped, so they
    /// can never influence the tick that produced them. Fired ids are
    /// returned in ascending order.
    pub fn tick(&mut self, external_drive: &[f64]) -> Result<Vec<NeuronId>> {
        if external_drive.len() != self.neurons.len() {
            return Err(RuntimeError::input_shape(
                self.neurons.len(),
                external_drive.len(),
            ));
        }

        let now = self.current_tick;
        let dt = self.config.dt;
        let mut fired = Vec::new();

        for (index, neuron) in self.neurons.iter_mut().enumerate() {
            let input = self.queues[index].drain_due(now);
            self.neighbor_input[index] = input;
            if neuron.step(dt, external_drive[index], input) {
                fired.push(NeuronId::new(index as u32));
            }
        }

        let delivery_tick = now + self.delay_ticks;
        for source in &fired {
            for synapse in &self.synapses[source.index()] {
                self.queues[synapse.target.index()].push(delivery_tick, synapse.weight);
            }
        }

        self.current_tick += 1;
        log::trace!("tick {}: {} neurons fired", now, fired.len());
        Ok(fired)
    }

    /// Same as [`Network::tick`] but returns one firing flag per neuron
    pub fn tick_indicators(&mut self, external_drive: &[f64]) -> Result<Vec<bool>> {
        let fired = self.tick(external_drive)?;
        let mut indicators = vec![false; self.neurons.len()];
        for id in fired {
            indicators[id.index()] = true;
        }
        Ok(indicators)
    }

    /// Return every neuron and queue to the initial state
    ///
    /// Configuration and topology are kept.
    pub fn reset(&mut self) {
        for neuron in &mut self.neurons {
            neuron.reset();
        }
        for queue in &mut self.queues {
            queue.clear();
        }
        self.neighbor_input.fill(0.0);
        self.current_tick = 0;
    }

    /// Network configuration
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Get neuron count
    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.synapses.iter().map(Vec::len).sum()
    }

    /// Number of ticks executed so far
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Simulated time at the start of the next tick
    pub fn time(&self) -> f64 {
        self.current_tick as f64 * self.config.dt
    }

    /// Transmission delay in ticks
    pub fn delay_ticks(&self) -> u64 {
        self.delay_ticks
    }

    /// Get a neuron by id
    pub fn neuron(&self, id: NeuronId) -> Result<&LifNeuron> {
        self.neurons
            .get(id.index())
            .ok_or(RuntimeError::NeuronNotFound { neuron_id: id.raw() })
    }

    /// Get neuron membrane potential
    pub fn potential(&self, id: NeuronId) -> Result<f64> {
        Ok(self.neuron(id)?.membrane_potential())
    }

    /// Whether a neuron is refractory
    pub fn is_refractory(&self, id: NeuronId) -> Result<bool> {
        Ok(self.neuron(id)?.is_refractory())
    }

    /// Membrane potentials of all neurons, by index
    pub fn potentials(&self) -> Vec<f64> {
        self.neurons.iter().map(LifNeuron::membrane_potential).collect()
    }

    /// Delayed input each neuron received on the most recent tick
    pub fn last_neighbor_input(&self) -> &[f64] {
        &self.neighbor_input
    }

    /// Pending-input queue of a neuron
    pub fn queue(&self, id: NeuronId) -> Result<&DelayQueue> {
        self.queues
            .get(id.index())
            .ok_or(RuntimeError::NeuronNotFound { neuron_id: id.raw() })
    }

    /// Number of inputs waiting for delivery to a neuron
    pub fn pending_inputs(&self, id: NeuronId) -> Result<usize> {
        Ok(self.queue(id)?.len())
    }

    /// Outgoing synapses of a neuron
    pub fn targets(&self, source: NeuronId) -> Result<&[Synapse]> {
        self.synapses
            .get(source.index())
            .map(Vec::as_slice)
            .ok_or(RuntimeError::NeuronNotFound { neuron_id: source.raw() })
    }

    /// Get synaptic weight of `source -> target`
    pub fn weight(&self, source: NeuronId, target: NeuronId) -> Result<f64> {
        self.targets(source)?
            .iter()
            .find(|synapse| synapse.target == target)
            .map(|synapse| synapse.weight)
            .ok_or_else(|| {
                RuntimeError::network_topology(format!("No synapse from {} to {}", source, target))
            })
    }
}

/// Builder for constructing networks
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    config: NetworkConfig,
    topology: Topology,
}

impl NetworkBuilder {
    /// Create a builder for `neuron_count` unconnected neurons
    pub fn new(neuron_count: usize) -> Self {
        Self {
            config: NetworkConfig::default(),
            topology: Topology::new(neuron_count),
        }
    }

    /// Start from an existing topology
    pub fn from_topology(topology: Topology) -> Self {
        Self {
            config: NetworkConfig::default(),
            topology,
        }
    }

    /// Set network configuration
    pub fn with_config(mut self, config: NetworkConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a synapse
    pub fn connect(mut self, source: u32, target: u32, weight: f64) -> Self {
        self.topology
            .connect(NeuronId::new(source), NeuronId::new(target), weight);
        self
    }

    /// Connect a chain `0 -> 1 -> ... -> n-1`
    pub fn chain(mut self, weight: f64) -> Self {
        let count = self.topology.neuron_count as u32;
        for source in 1..count {
            self.topology
                .connect(NeuronId::new(source - 1), NeuronId::new(source), weight);
        }
        self
    }

    /// Build the network
    pub fn build(self) -> Result<Network> {
        Network::new(self.config, self.topology)
    }
}
