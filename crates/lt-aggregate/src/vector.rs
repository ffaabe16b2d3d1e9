//! Vector aggregation: per-node power and outgoing packet-length series.

use lt_core::{event_samples, event_sum, mean_over};
use lt_results::{PowerNode, RawExport, RawRun, VectorRecord, VectorRollup, VectorRun, VectorRuns};
use tracing::{debug, info};

use crate::error::{AggregateError, AggregateResult};
use crate::{Aggregator, checked_index, node_count};

enum VectorTarget {
    Power,
    PacketLength,
}

impl Aggregator {
    /// Aggregate every run of a vector export, keyed by node count.
    pub fn vectors(&self, export: &RawExport) -> AggregateResult<VectorRuns> {
        let mut runs = VectorRuns::new();
        for raw in &export.runs {
            let run = self.vector_run(raw)?;
            if let Some(existing) = runs.get(&run.num_nodes) {
                return Err(AggregateError::DuplicateRun {
                    num_nodes: run.num_nodes,
                    first: existing.run_id.clone(),
                    second: run.run_id,
                });
            }
            runs.insert(run.num_nodes, run);
        }
        info!(runs = runs.len(), "aggregated vector export");
        Ok(runs)
    }

    pub fn vector_run(&self, run: &RawRun) -> AggregateResult<VectorRun> {
        let count = node_count(run)?;
        let mut nodes = vec![PowerNode::default(); count.as_usize()];
        let mut ignored = 0usize;

        for record in &run.vectors {
            let Some((target, raw_index)) = self.classify_vector(record) else {
                ignored += 1;
                continue;
            };
            let index = checked_index(run, &record.module, raw_index, count)?;
            if record.value.iter().any(|v| !v.is_finite()) {
                return Err(AggregateError::NonFiniteValue {
                    run: run.run_id.clone(),
                    module: record.module.clone(),
                    name: record.name.clone(),
                });
            }

            let node = &mut nodes[index.as_usize()];
            match target {
                VectorTarget::Power => {
                    node.power_samples.extend(event_samples(&record.value));
                    node.power_sum += event_sum(&record.value);
                }
                VectorTarget::PacketLength => {
                    node.packet_length_samples
                        .extend(event_samples(&record.value));
                    node.packet_length_sum += event_sum(&record.value);
                }
            }
        }

        let rollup = vector_rollup(&nodes);
        debug!(
            run = %run.run_id,
            num_nodes = count.get(),
            ignored,
            total_power_sum = rollup.total_power_sum,
            "aggregated vector run"
        );

        Ok(VectorRun {
            run_id: run.run_id.clone(),
            num_nodes: count.get(),
            nodes,
            rollup,
        })
    }

    fn classify_vector(&self, record: &VectorRecord) -> Option<(VectorTarget, u64)> {
        let metrics = self.metrics();
        let matchers = self.matchers();
        if record.name == metrics.power_vector {
            let index = matchers.energy_consumer.node_index(&record.module)?;
            Some((VectorTarget::Power, index))
        } else if record.name == metrics.packet_length_vector {
            let index = matchers.queue.node_index(&record.module)?;
            Some((VectorTarget::PacketLength, index))
        } else {
            None
        }
    }
}

fn vector_rollup(nodes: &[PowerNode]) -> VectorRollup {
    let total_power_sum: f64 = nodes.iter().map(|n| n.power_sum).sum();
    let total_packet_length_sum: f64 = nodes.iter().map(|n| n.packet_length_sum).sum();
    let sample_count = nodes.iter().map(|n| n.power_samples.len()).sum();
    VectorRollup {
        total_power_sum,
        total_packet_length_sum,
        sample_count,
        mean_node_power: mean_over(total_power_sum, nodes.len()),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::fixtures::*;
    use lt_config::PipelineConfig;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn run_total_is_sum_of_node_sums(
            per_node in prop::collection::vec(
                (
                    prop::collection::vec(prop_oneof![Just(0.0_f64), 0.001_f64..10.0], 0..16),
                    0.001_f64..10.0,
                    prop::collection::vec(prop_oneof![Just(0.0_f64), 1.0_f64..1e6], 0..8),
                    1.0_f64..1e6,
                ),
                1..12,
            )
        ) {
            let mut raw = run("General-0", &per_node.len().to_string());
            for (i, (power, last_power, lengths, last_length)) in per_node.iter().enumerate() {
                // Each node ends with one non-zero event of each kind.
                let mut power = power.clone();
                power.push(*last_power);
                let mut lengths = lengths.clone();
                lengths.push(*last_length);
                raw.vectors.push(vector(
                    energy_module(i as u32),
                    "powerConsumption:vector",
                    power,
                ));
                raw.vectors.push(vector(
                    queue_module(i as u32),
                    "outgoingPacketLengths:vector",
                    lengths,
                ));
            }

            let aggregator = Aggregator::from_config(&PipelineConfig::default()).unwrap();
            let agg = aggregator.vector_run(&raw).unwrap();

            prop_assert_eq!(agg.nodes.len(), per_node.len());
            let node_total: f64 = agg.nodes.iter().map(|n| n.power_sum).sum();
            prop_assert!((agg.rollup.total_power_sum - node_total).abs() < 1e-9);
            let length_total: f64 = agg.nodes.iter().map(|n| n.packet_length_sum).sum();
            prop_assert!((agg.rollup.total_packet_length_sum - length_total).abs() < 1e-6);
            for node in &agg.nodes {
                prop_assert!(!node.power_samples.is_empty());
                prop_assert!(!node.packet_length_samples.is_empty());
                prop_assert!(node.power_samples.iter().all(|v| *v != 0.0));
                prop_assert!(node.packet_length_samples.iter().all(|v| *v != 0.0));
            }
            let expected_mean = agg.rollup.total_power_sum / per_node.len() as f64;
            prop_assert!((agg.rollup.mean_node_power - expected_mean).abs() < 1e-12);
        }
    }
}
