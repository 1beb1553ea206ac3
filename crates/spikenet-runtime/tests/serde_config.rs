#![cfg(feature = "serde")]
// Enable with: --features serde

use spikenet_runtime::{NetworkConfig, NeuronId, SimulationParams, SimulationResult, SpikeEvent};

#[test]
fn test_config_from_partial_json() {
    let config: NetworkConfig = serde_json::from_str(r#"{ "tau": 4.0, "dt": 0.5 }"#).unwrap();
    assert_eq!(config.tau, 4.0);
    assert_eq!(config.dt, 0.5);
    assert_eq!(config.t_delay, NetworkConfig::default().t_delay);
    assert!(config.validate().is_ok());
}

#[test]
fn test_params_and_result_serialize() {
    let params: SimulationParams = serde_json::from_str(r#"{ "steps": 250 }"#).unwrap();
    assert_eq!(params.steps, 250);
    assert!(!params.perf_enabled);

    let result = SimulationResult {
        spikes: vec![SpikeEvent { tick: 3, neuron: NeuronId::new(2) }],
        steps_executed: 10,
        total_spikes: 1,
        perf: None,
    };
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains(r#""neuron":2"#));
    let back: SimulationResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

#[test]
fn test_topology_round_trip() {
    use spikenet_runtime::{Network, Topology};

    let mut topology = Topology::new(3);
    topology.connect(NeuronId::new(0), NeuronId::new(1), 0.2);
    topology.connect(NeuronId::new(0), NeuronId::new(2), -0.1);
    topology.connect(NeuronId::new(2), NeuronId::new(1), 0.4);

    let json = serde_json::to_string(&topology).unwrap();
    assert!(json.contains(r#""weights":[[0,1,0.2],[0,2,-0.1],[2,1,0.4]]"#));

    let back: Topology = serde_json::from_str(&json).unwrap();
    assert_eq!(back, topology);
    assert!(back.validate().is_ok());

    let network = Network::new(NetworkConfig::default(), back).unwrap();
    assert_eq!(network.edge_count(), 3);
    assert_eq!(network.weight(NeuronId::new(2), NeuronId::new(1)).unwrap(), 0.4);
}

#[test]
fn test_topology_from_hand_written_json() {
    use spikenet_runtime::Topology;

    let json = r#"{
        "neuron_count": 2,
        "connectivity": { "0": [1] },
        "weights": [[0, 1, 0.2]]
    }"#;
    let topology: Topology = serde_json::from_str(json).unwrap();
    assert_eq!(topology.weight(NeuronId::new(0), NeuronId::new(1)), Some(0.2));
    assert!(topology.validate().is_ok());
}
