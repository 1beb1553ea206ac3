//! Connectivity and synaptic weights
//!
//! A [`Topology`] is the construction input of a [`crate::Network`]: which
//! neurons feed which, and with what weight. Connectivity and weights are
//! kept as two mappings so that a provider can supply them independently;
//! [`Topology::validate`] checks that they agree before a network is built.

use std::collections::{BTreeMap, HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{error::*, NeuronId};

/// Directed connectivity graph plus weight mapping
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Topology {
    /// Number of neurons the topology describes
    pub neuron_count: usize,
    /// Downstream targets of each source neuron
    pub connectivity: BTreeMap<NeuronId, Vec<NeuronId>>,
    /// Synaptic weight keyed by `(source, target)`
    #[cfg_attr(feature = "serde", serde(with = "weight_list"))]
    pub weights: HashMap<(NeuronId, NeuronId), f64>,
}

impl Topology {
    /// Create an unconnected topology over `neuron_count` neurons
    pub fn new(neuron_count: usize) -> Self {
        Self {
            neuron_count,
            ..Default::default()
        }
    }

    /// Assemble a topology from separately supplied mappings
    pub fn from_parts(
        neuron_count: usize,
        connectivity: BTreeMap<NeuronId, Vec<NeuronId>>,
        weights: HashMap<(NeuronId, NeuronId), f64>,
    ) -> Self {
        Self {
            neuron_count,
            connectivity,
            weights,
        }
    }

    /// Add an edge and its weight
    pub fn connect(&mut self, source: NeuronId, target: NeuronId, weight: f64) {
        self.connectivity.entry(source).or_default().push(target);
        self.weights.insert((source, target), weight);
    }

    /// Weight of the edge `source -> target`, if present
    pub fn weight(&self, source: NeuronId, target: NeuronId) -> Option<f64> {
        self.weights.get(&(source, target)).copied()
    }

    /// Downstream targets of `source`
    pub fn targets(&self, source: NeuronId) -> &[NeuronId] {
        self.connectivity
            .get(&source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of edges in the connectivity graph
    pub fn edge_count(&self) -> usize {
        self.connectivity.values().map(Vec::len).sum()
    }

    /// Check that connectivity and weights describe the same edge set
    ///
    /// Fails when an id is out of range, a source lists the same target
    /// twice, an edge has no weight, a weight has no edge, or a weight is
    /// not finite.
    pub fn validate(&self) -> Result<()> {
        let in_range = |id: NeuronId| id.index() < self.neuron_count;

        let mut seen = HashSet::new();
        for (&source, targets) in &self.connectivity {
            seen.clear();
            if !in_range(source) {
                return Err(RuntimeError::network_topology(format!(
                    "source {} out of range for {} neurons",
                    source, self.neuron_count
                )));
            }
            for &target in targets {
                if !in_range(target) {
                    return Err(RuntimeError::network_topology(format!(
                        "target {} of {} out of range for {} neurons",
                        target, source, self.neuron_count
                    )));
                }
                if !seen.insert(target) {
                    return Err(RuntimeError::network_topology(format!(
                        "duplicate edge {} -> {}",
                        source, target
                    )));
                }
                match self.weights.get(&(source, target)) {
                    None => {
                        return Err(RuntimeError::network_topology(format!(
                            "edge {} -> {} has no weight",
                            source, target
                        )));
                    }
                    Some(weight) if !weight.is_finite() => {
                        return Err(RuntimeError::network_topology(format!(
                            "edge {} -> {} has non-finite weight {}",
                            source, target, weight
                        )));
                    }
                    Some(_) => {}
                }
            }
        }

        if self.weights.len() != self.edge_count() {
            // Every edge has a weight, so any surplus is a weight without an edge
            let orphan = self
                .weights
                .keys()
                .filter(|(source, target)| !self.targets(*source).contains(target))
                .min()
                .copied();
            if let Some((source, target)) = orphan {
                return Err(RuntimeError::network_topology(format!(
                    "weight for {} -> {} has no matching edge",
                    source, target
                )));
            }
        }

        Ok(())
    }
}

/// Weights as an edge list `[(source, target, weight), ..]`
///
/// Tuple keys have no map-key form in most text formats.
#[cfg(feature = "serde")]
mod weight_list {
    use std::collections::HashMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::NeuronId;

    pub fn serialize<S>(
        weights: &HashMap<(NeuronId, NeuronId), f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut edges: Vec<(NeuronId, NeuronId, f64)> = weights
            .iter()
            .map(|(&(source, target), &weight)| (source, target, weight))
            .collect();
        edges.sort_by_key(|&(source, target, _)| (source, target));
        edges.serialize(serializer)
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<HashMap<(NeuronId, NeuronId), f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let edges = Vec::<(NeuronId, NeuronId, f64)>::deserialize(deserializer)?;
        Ok(edges
            .into_iter()
            .map(|(source, target, weight)| ((source, target), weight))
            .collect())
    }
}

/// Source of network topologies
pub trait TopologyProvider {
    /// Produce a topology over `neuron_count` neurons
    fn generate(&mut self, neuron_count: usize) -> Result<Topology>;
}

/// Random directed graph with a fixed synaptic weight
///
/// Every ordered pair of distinct neurons is connected independently with
/// probability `connection_probability`. No self-loops are generated.
#[derive(Debug, Clone)]
pub struct RandomTopology {
    /// Probability that a given ordered pair is connected
    pub connection_probability: f64,
    /// Weight assigned to every generated edge
    pub weight: f64,
    rng: StdRng,
}

impl RandomTopology {
    /// Create a seeded generator
    pub fn new(connection_probability: f64, weight: f64, seed: u64) -> Result<Self> {
        if !(0.0..=1.0).contains(&connection_probability) {
            return Err(RuntimeError::invalid_parameter(
                "connection_probability",
                connection_probability.to_string(),
                "within [0.0, 1.0]",
            ));
        }
        if !weight.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "weight",
                weight.to_string(),
                "finite",
            ));
        }

        Ok(Self {
            connection_probability,
            weight,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl TopologyProvider for RandomTopology {
    fn generate(&mut self, neuron_count: usize) -> Result<Topology> {
        let count = u32::try_from(neuron_count).map_err(|_| {
            RuntimeError::invalid_parameter("neuron_count", neuron_count.to_string(), "<= u32::MAX")
        })?;

        let mut topology = Topology::new(neuron_count);
        for source in 0..count {
            for target in 0..count {
                if source == target {
                    continue;
                }
                if self.rng.gen_bool(self.connection_probability) {
                    topology.connect(NeuronId::new(source), NeuronId::new(target), self.weight);
                }
            }
        }

        log::debug!(
            "Generated random topology: {} neurons, {} edges (p = {})",
            neuron_count,
            topology.edge_count(),
            self.connection_probability
        );
        Ok(topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> NeuronId {
        NeuronId::new(raw)
    }

    #[test]
    fn test_connect_and_lookup() {
        let mut topology = Topology::new(3);
        topology.connect(id(0), id(1), 0.2);
        topology.connect(id(0), id(2), -0.1);

        assert_eq!(topology.edge_count(), 2);
        assert_eq!(topology.targets(id(0)), &[id(1), id(2)]);
        assert!(topology.targets(id(1)).is_empty());
        assert_eq!(topology.weight(id(0), id(2)), Some(-0.1));
        assert_eq!(topology.weight(id(2), id(0)), None);
        assert!(topology.validate().is_ok());
    }

    #[test]
    fn test_edge_without_weight() {
        let mut connectivity = BTreeMap::new();
        connectivity.insert(id(0), vec![id(1)]);
        let topology = Topology::from_parts(2, connectivity, HashMap::new());

        let err = topology.validate().unwrap_err();
        assert!(err.to_string().contains("has no weight"));
    }

    #[test]
    fn test_weight_without_edge() {
        let mut topology = Topology::new(2);
        topology.connect(id(0), id(1), 0.2);
        topology.weights.insert((id(1), id(0)), 0.3);

        let err = topology.validate().unwrap_err();
        assert!(err.to_string().contains("no matching edge"));
    }

    #[test]
    fn test_out_of_range_and_duplicates() {
        let mut topology = Topology::new(2);
        topology.connect(id(0), id(2), 0.2);
        assert!(matches!(
            topology.validate(),
            Err(RuntimeError::NetworkTopology { .. })
        ));

        let mut topology = Topology::new(2);
        topology.connect(id(5), id(1), 0.2);
        assert!(topology.validate().is_err());

        let mut topology = Topology::new(2);
        topology.connect(id(0), id(1), 0.2);
        topology.connect(id(0), id(1), 0.2);
        let err = topology.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate edge"));
    }

    #[test]
    fn test_duplicate_detected_in_dense_fan_out() {
        let mut topology = Topology::new(500);
        for target in 1..500 {
            topology.connect(id(0), id(target), 0.1);
        }
        for target in 0..499 {
            topology.connect(id(499), id(target), 0.1);
        }
        assert!(topology.validate().is_ok());

        // Same target again at the far end of a long list
        topology.connect(id(0), id(1), 0.1);
        let err = topology.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate edge N0 -> N1"));
    }

    #[test]
    fn test_same_target_under_different_sources_is_not_duplicate() {
        let mut topology = Topology::new(3);
        topology.connect(id(0), id(2), 0.1);
        topology.connect(id(1), id(2), 0.1);
        assert!(topology.validate().is_ok());
    }

    #[test]
    fn test_non_finite_weight() {
        let mut topology = Topology::new(2);
        topology.connect(id(0), id(1), f64::INFINITY);
        assert!(topology.validate().is_err());
    }

    #[test]
    fn test_random_topology_is_seeded() {
        let a = RandomTopology::new(0.3, 0.2, 7).unwrap().generate(20).unwrap();
        let b = RandomTopology::new(0.3, 0.2, 7).unwrap().generate(20).unwrap();
        assert_eq!(a, b);
        assert!(a.validate().is_ok());

        for (source, targets) in &a.connectivity {
            assert!(!targets.contains(source));
        }
    }

    #[test]
    fn test_random_topology_extremes() {
        let empty = RandomTopology::new(0.0, 0.2, 1).unwrap().generate(10).unwrap();
        assert_eq!(empty.edge_count(), 0);

        let full = RandomTopology::new(1.0, 0.2, 1).unwrap().generate(10).unwrap();
        assert_eq!(full.edge_count(), 10 * 9);
        assert_eq!(full.weight(id(3), id(4)), Some(0.2));
    }

    #[test]
    fn test_random_topology_rejects_bad_probability() {
        assert!(RandomTopology::new(1.5, 0.2, 1).is_err());
        assert!(RandomTopology::new(-0.1, 0.2, 1).is_err());
        assert!(RandomTopology::new(f64::NAN, 0.2, 1).is_err());
    }
}
