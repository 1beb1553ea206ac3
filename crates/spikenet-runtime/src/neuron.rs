//! Leaky Integrate-and-Fire neuron state machine

use crate::{error::*, DEFAULT_THRESHOLD, DEFAULT_T_REF};

/// Phase of a LIF neuron
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NeuronPhase {
    /// Integrating input
    #[default]
    Active,
    /// Holding at reset after a spike
    Refractory,
}

/// Leaky Integrate-and-Fire neuron
///
/// The membrane is integrated with an implicit Euler step:
///
/// ```text
/// v <- (tau * v + drive * dt + neighbor_input) / (tau + dt)
/// ```
///
/// so external drive is a rate (scaled by `dt`) while neighbor input is an
/// impulse added once. Reaching `threshold` fires the neuron, resets `v` to 0
/// and starts a refractory period of `t_ref` simulated time. The tick on
/// which the refractory period ends never fires.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LifNeuron {
    tau: f64,
    t_ref: f64,
    threshold: f64,
    v: f64,
    t_last: f64,
    phase: NeuronPhase,
}

impl LifNeuron {
    /// Create a neuron with the default threshold, validating parameters
    pub fn new(tau: f64, t_ref: f64) -> Result<Self> {
        Self::with_threshold(tau, t_ref, DEFAULT_THRESHOLD)
    }

    /// Create a neuron with an explicit firing threshold
    pub fn with_threshold(tau: f64, t_ref: f64, threshold: f64) -> Result<Self> {
        if !(tau.is_finite() && tau > 0.0) {
            return Err(RuntimeError::invalid_parameter(
                "tau",
                tau.to_string(),
                "> 0.0",
            ));
        }
        if !(t_ref.is_finite() && t_ref >= 0.0) {
            return Err(RuntimeError::invalid_parameter(
                "t_ref",
                t_ref.to_string(),
                ">= 0.0",
            ));
        }
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(RuntimeError::invalid_parameter(
                "threshold",
                threshold.to_string(),
                "> 0.0",
            ));
        }

        Ok(Self {
            tau,
            t_ref,
            threshold,
            v: 0.0,
            t_last: 0.0,
            phase: NeuronPhase::Active,
        })
    }

    /// Advance the neuron by one tick, returning whether it fired
    ///
    /// `external_drive` and `neighbor_input` apply to this tick only.
    pub fn step(&mut self, dt: f64, external_drive: f64, neighbor_input: f64) -> bool {
        debug_assert!(dt > 0.0, "dt must be positive");

        match self.phase {
            NeuronPhase::Refractory => {
                if self.t_last >= self.t_ref {
                    self.phase = NeuronPhase::Active;
                    self.t_last = 0.0;
                } else {
                    self.t_last += dt;
                }
                false
            }
            NeuronPhase::Active => {
                self.v = (self.tau * self.v + external_drive * dt + neighbor_input)
                    / (self.tau + dt);

                if self.v >= self.threshold {
                    self.v = 0.0;
                    self.t_last = 0.0;
                    self.phase = NeuronPhase::Refractory;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Return to the initial state: active with `v = 0`
    pub fn reset(&mut self) {
        self.v = 0.0;
        self.t_last = 0.0;
        self.phase = NeuronPhase::Active;
    }

    /// Current membrane potential (held at 0 while refractory)
    pub fn membrane_potential(&self) -> f64 {
        self.v
    }

    /// Current phase
    pub fn phase(&self) -> NeuronPhase {
        self.phase
    }

    /// Whether the neuron is refractory
    pub fn is_refractory(&self) -> bool {
        self.phase == NeuronPhase::Refractory
    }

    /// Simulated time spent in the current refractory period
    pub fn refractory_elapsed(&self) -> f64 {
        self.t_last
    }

    /// Membrane time constant
    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Refractory duration
    pub fn t_ref(&self) -> f64 {
        self.t_ref
    }

    /// Firing threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for LifNeuron {
    fn default() -> Self {
        Self {
            tau: 8.0,
            t_ref: DEFAULT_T_REF,
            threshold: DEFAULT_THRESHOLD,
            v: 0.0,
            t_last: 0.0,
            phase: NeuronPhase::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neuron_creation() {
        let neuron = LifNeuron::new(8.0, 1.0).unwrap();
        assert_eq!(neuron.membrane_potential(), 0.0);
        assert_eq!(neuron.phase(), NeuronPhase::Active);
        assert_eq!(neuron.threshold(), 1.0);
    }

    #[test]
    fn test_parameter_validation() {
        assert!(LifNeuron::new(0.0, 1.0).is_err());
        assert!(LifNeuron::new(-2.0, 1.0).is_err());
        assert!(LifNeuron::new(f64::NAN, 1.0).is_err());
        assert!(LifNeuron::new(8.0, -0.5).is_err());
        assert!(LifNeuron::with_threshold(8.0, 1.0, 0.0).is_err());
        assert!(LifNeuron::new(8.0, 0.0).is_ok());
    }

    #[test]
    fn test_integration_formula() {
        let mut neuron = LifNeuron::new(8.0, 1.0).unwrap();
        let fired = neuron.step(0.01, 0.5, 0.1);
        assert!(!fired);
        let expected = (0.5 * 0.01 + 0.1) / (8.0 + 0.01);
        assert_eq!(neuron.membrane_potential(), expected);

        // Decay without input
        neuron.step(0.01, 0.0, 0.0);
        assert_eq!(neuron.membrane_potential(), 8.0 * expected / (8.0 + 0.01));
    }

    #[test]
    fn test_fires_exactly_at_threshold() {
        // (1 * 0 + 0 * 1 + 2) / (1 + 1) == 1.0 exactly
        let mut neuron = LifNeuron::new(1.0, 1.0).unwrap();
        assert!(neuron.step(1.0, 0.0, 2.0));
        assert_eq!(neuron.membrane_potential(), 0.0);
        assert!(neuron.is_refractory());
    }

    #[test]
    fn test_just_below_threshold_does_not_fire() {
        let mut neuron = LifNeuron::new(1.0, 1.0).unwrap();
        assert!(!neuron.step(1.0, 0.0, 1.999));
        assert!(neuron.membrane_potential() < 1.0);
        assert!(!neuron.is_refractory());
    }

    #[test]
    fn test_refractory_period() {
        // dt = 0.25 keeps the refractory clock exact
        let mut neuron = LifNeuron::new(1.0, 1.0).unwrap();
        assert!(neuron.step(0.25, 0.0, 10.0));

        // t_last goes 0 -> 0.25 -> 0.5 -> 0.75 -> 1.0, then exits on the fifth tick
        for _ in 0..4 {
            assert!(!neuron.step(0.25, 0.0, 10.0));
            assert!(neuron.is_refractory());
            assert_eq!(neuron.membrane_potential(), 0.0);
        }
        assert_eq!(neuron.refractory_elapsed(), 1.0);

        // Exit tick produces no spike even with suprathreshold input
        assert!(!neuron.step(0.25, 0.0, 10.0));
        assert!(!neuron.is_refractory());
        assert_eq!(neuron.refractory_elapsed(), 0.0);
        assert_eq!(neuron.membrane_potential(), 0.0);

        assert!(neuron.step(0.25, 0.0, 10.0));
    }

    #[test]
    fn test_zero_refractory_still_skips_one_tick() {
        let mut neuron = LifNeuron::new(1.0, 0.0).unwrap();
        assert!(neuron.step(0.5, 0.0, 10.0));
        assert!(!neuron.step(0.5, 0.0, 10.0));
        assert!(neuron.step(0.5, 0.0, 10.0));
    }

    #[test]
    fn test_reset() {
        let mut neuron = LifNeuron::new(8.0, 1.0).unwrap();
        neuron.step(0.01, 0.0, 0.5);
        assert!(neuron.membrane_potential() > 0.0);
        neuron.reset();
        assert_eq!(neuron.membrane_potential(), 0.0);
        assert_eq!(neuron.phase(), NeuronPhase::Active);
    }
}
