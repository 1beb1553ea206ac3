//! External drive providers

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::error::*;

/// Source of the per-tick external drive vector
pub trait StimulusProvider {
    /// Write the drive for `tick` into `drive`, one value per neuron
    fn fill(&mut self, tick: u64, drive: &mut [f64]) -> Result<()>;
}

/// Same drive vector on every tick
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDrive(pub Vec<f64>);

impl ConstantDrive {
    /// Uniform drive of `value` for `neuron_count` neurons
    pub fn uniform(neuron_count: usize, value: f64) -> Self {
        Self(vec![value; neuron_count])
    }
}

impl StimulusProvider for ConstantDrive {
    fn fill(&mut self, _tick: u64, drive: &mut [f64]) -> Result<()> {
        if drive.len() != self.0.len() {
            return Err(RuntimeError::input_shape(drive.len(), self.0.len()));
        }
        drive.copy_from_slice(&self.0);
        Ok(())
    }
}

/// Normally distributed drive, one sample per neuron
///
/// Samples are drawn on the first tick and reused afterwards unless
/// `redraw` is set, in which case every tick gets a fresh draw.
#[derive(Debug, Clone)]
pub struct GaussianDrive {
    normal: Normal<f64>,
    rng: StdRng,
    redraw: bool,
    cached: Option<Vec<f64>>,
}

impl GaussianDrive {
    /// Create a seeded generator drawing from `N(mean, std_dev^2)` once
    pub fn new(mean: f64, std_dev: f64, seed: u64) -> Result<Self> {
        if !mean.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "mean",
                mean.to_string(),
                "finite",
            ));
        }
        if !(std_dev.is_finite() && std_dev >= 0.0) {
            return Err(RuntimeError::invalid_parameter(
                "std_dev",
                std_dev.to_string(),
                ">= 0.0",
            ));
        }
        let normal = Normal::new(mean, std_dev).map_err(|e| {
            RuntimeError::invalid_parameter("std_dev", std_dev.to_string(), e.to_string())
        })?;

        Ok(Self {
            normal,
            rng: StdRng::seed_from_u64(seed),
            redraw: false,
            cached: None,
        })
    }

    /// Redraw the drive on every tick
    pub fn with_redraw(mut self, redraw: bool) -> Self {
        self.redraw = redraw;
        self
    }

    fn sample(&mut self, len: usize) -> Vec<f64> {
        (0..len).map(|_| self.normal.sample(&mut self.rng)).collect()
    }
}

impl StimulusProvider for GaussianDrive {
    fn fill(&mut self, _tick: u64, drive: &mut [f64]) -> Result<()> {
        if self.redraw {
            for value in drive.iter_mut() {
                *value = self.normal.sample(&mut self.rng);
            }
            return Ok(());
        }

        let stale = self
            .cached
            .as_ref()
            .map_or(true, |cached| cached.len() != drive.len());
        if stale {
            self.cached = Some(self.sample(drive.len()));
        }
        if let Some(cached) = &self.cached {
            drive.copy_from_slice(cached);
        }
        Ok(())
    }
}

/// Drive computed by a closure of `(tick, neuron index)`
pub struct FnDrive<F>(pub F);

impl<F> StimulusProvider for FnDrive<F>
where
    F: FnMut(u64, usize) -> f64,
{
    fn fill(&mut self, tick: u64, drive: &mut [f64]) -> Result<()> {
        for (index, value) in drive.iter_mut().enumerate() {
            *value = (self.0)(tick, index);
        }
        Ok(())
    }
}
