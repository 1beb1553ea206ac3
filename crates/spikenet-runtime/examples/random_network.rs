//! Random network under a fixed gaussian drive
//!
//! Builds a sparse random graph (p = 0.05, every weight 0.2), draws one
//! drive value per neuron from N(0.8, 0.4^2) and records the spike raster.
//!
//! Run with: RUST_LOG=info cargo run --example random_network

use spikenet_runtime::{
    GaussianDrive, Network, NetworkConfig, RandomTopology, Result, SimulationEngine,
    SimulationParams, TopologyProvider,
};

const NEURONS: usize = 200;
const STEPS: u64 = 10_000;
const SEED: u64 = 2024;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = NetworkConfig::default().with_tau(8.0);
    let topology = RandomTopology::new(0.05, 0.2, SEED)?.generate(NEURONS)?;
    let network = Network::new(config.clone(), topology)?;
    let stimulus = GaussianDrive::new(0.8, 0.4, SEED + 1)?;

    let params = SimulationParams::new(STEPS)?.with_perf(true);
    let mut engine = SimulationEngine::new(network, stimulus, params)?;
    let result = engine.run()?;

    println!("neurons:          {}", NEURONS);
    println!("edges:            {}", engine.network().edge_count());
    println!("ticks:            {}", result.steps_executed);
    println!("spikes:           {}", result.total_spikes);
    println!(
        "mean firing rate: {:.3} per unit time",
        result.mean_firing_rate(NEURONS, config.dt)
    );
    if let Some(perf) = &result.perf {
        println!("avg step:         {} ns (max {} ns)", perf.avg_step_ns, perf.max_step_ns);
    }
    for (tick, neuron) in result.export_spikes().iter().take(10) {
        println!("  tick {:>6}  N{}", tick, neuron);
    }
    Ok(())
}
