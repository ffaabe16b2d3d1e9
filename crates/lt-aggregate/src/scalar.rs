//! Scalar aggregation: per-node total energy and MAC packet counters.

use lt_core::mean_over;
use lt_results::{EnergyNode, RawExport, RawRun, ScalarRecord, ScalarRollup, ScalarRun, ScalarRuns};
use tracing::{debug, info};

use crate::error::{AggregateError, AggregateResult};
use crate::{Aggregator, checked_index, node_count};

enum ScalarTarget {
    Energy,
    Sent,
    Received,
}

impl Aggregator {
    /// Aggregate every run of a scalar export, keyed by node count.
    pub fn scalars(&self, export: &RawExport) -> AggregateResult<ScalarRuns> {
        let mut runs = ScalarRuns::new();
        for raw in &export.runs {
            let run = self.scalar_run(raw)?;
            if let Some(existing) = runs.get(&run.num_nodes) {
                return Err(AggregateError::DuplicateRun {
                    num_nodes: run.num_nodes,
                    first: existing.run_id.clone(),
                    second: run.run_id,
                });
            }
            runs.insert(run.num_nodes, run);
        }
        info!(runs = runs.len(), "aggregated scalar export");
        Ok(runs)
    }

    pub fn scalar_run(&self, run: &RawRun) -> AggregateResult<ScalarRun> {
        let count = node_count(run)?;
        let mut nodes = vec![EnergyNode::default(); count.as_usize()];
        let mut ignored = 0usize;

        for record in &run.scalars {
            let Some((target, raw_index)) = self.classify_scalar(record) else {
                ignored += 1;
                continue;
            };
            let index = checked_index(run, &record.module, raw_index, count)?;
            let node = &mut nodes[index.as_usize()];
            match target {
                ScalarTarget::Energy => {
                    if !record.value.is_finite() {
                        return Err(AggregateError::NonFiniteValue {
                            run: run.run_id.clone(),
                            module: record.module.clone(),
                            name: record.name.clone(),
                        });
                    }
                    let previous = node.energy_consumed.unwrap_or(0.0);
                    node.energy_consumed = Some(previous + record.value);
                }
                ScalarTarget::Sent => {
                    let value = counter(run, record)?;
                    node.packets_sent = Some(add_counter(run, record, node.packets_sent, value)?);
                }
                ScalarTarget::Received => {
                    let value = counter(run, record)?;
                    node.packets_received =
                        Some(add_counter(run, record, node.packets_received, value)?);
                }
            }
        }

        let rollup = scalar_rollup(run, &nodes)?;
        debug!(
            run = %run.run_id,
            num_nodes = count.get(),
            ignored,
            total_energy_consumed = rollup.total_energy_consumed,
            "aggregated scalar run"
        );

        Ok(ScalarRun {
            run_id: run.run_id.clone(),
            num_nodes: count.get(),
            nodes,
            rollup,
        })
    }

    fn classify_scalar(&self, record: &ScalarRecord) -> Option<(ScalarTarget, u64)> {
        let metrics = self.metrics();
        let matchers = self.matchers();
        if record.name == metrics.energy_scalar {
            let index = matchers.energy_consumer.node_index(&record.module)?;
            Some((ScalarTarget::Energy, index))
        } else if record.name == metrics.sent_scalar {
            let index = matchers.mac.node_index(&record.module)?;
            Some((ScalarTarget::Sent, index))
        } else if record.name == metrics.received_scalar {
            let index = matchers.mac.node_index(&record.module)?;
            Some((ScalarTarget::Received, index))
        } else {
            None
        }
    }
}

fn invalid_counter(run: &RawRun, module: &str, name: &str, value: f64) -> AggregateError {
    AggregateError::InvalidCounter {
        run: run.run_id.clone(),
        module: module.to_string(),
        name: name.to_string(),
        value,
    }
}

fn counter(run: &RawRun, record: &ScalarRecord) -> AggregateResult<u64> {
    let value = record.value;
    // u64::MAX as f64 rounds up to 2^64, which does not fit
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= u64::MAX as f64 {
        return Err(invalid_counter(run, &record.module, &record.name, value));
    }
    Ok(value as u64)
}

fn add_counter(
    run: &RawRun,
    record: &ScalarRecord,
    current: Option<u64>,
    value: u64,
) -> AggregateResult<u64> {
    current
        .unwrap_or(0)
        .checked_add(value)
        .ok_or_else(|| invalid_counter(run, &record.module, &record.name, record.value))
}

fn counter_total(
    run: &RawRun,
    name: &str,
    counts: impl Iterator<Item = u64>,
) -> AggregateResult<u64> {
    let mut total = 0u64;
    for count in counts {
        total = total
            .checked_add(count)
            .ok_or_else(|| invalid_counter(run, "run total", name, total as f64 + count as f64))?;
    }
    Ok(total)
}

fn scalar_rollup(run: &RawRun, nodes: &[EnergyNode]) -> AggregateResult<ScalarRollup> {
    let total_energy_consumed: f64 = nodes.iter().filter_map(|n| n.energy_consumed).sum();
    Ok(ScalarRollup {
        total_energy_consumed,
        mean_node_energy_consumption: mean_over(total_energy_consumed, nodes.len()),
        total_packets_sent: counter_total(
            run,
            "packets sent",
            nodes.iter().filter_map(|n| n.packets_sent),
        )?,
        total_packets_received: counter_total(
            run,
            "packets received",
            nodes.iter().filter_map(|n| n.packets_received),
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use lt_config::PipelineConfig;

    const ENERGY: &str = "totalEnergyConsumed";

    fn aggregator() -> Aggregator {
        Aggregator::from_config(&PipelineConfig::default()).unwrap()
    }

    #[test]
    fn energy_is_attributed_to_its_node_only() {
        let mut raw = run("General-0", "10");
        raw.scalars.push(scalar(
            "LoRaNetworkTest.loRaNodes[7].LoRaNic.radio.energyConsumer".to_string(),
            ENERGY,
            1.23,
        ));

        let agg = aggregator().scalar_run(&raw).unwrap();
        for (i, node) in agg.nodes.iter().enumerate() {
            if i == 7 {
                assert_eq!(node.energy_consumed, Some(1.23));
            } else {
                assert_eq!(node.energy_consumed, None);
            }
        }
    }

    #[test]
    fn mean_is_total_over_node_count() {
        let mut raw = run("General-0", "3");
        for (i, e) in [10.0, 20.0, 30.0].into_iter().enumerate() {
            raw.scalars.push(scalar(energy_module(i as u32), ENERGY, e));
        }

        let agg = aggregator().scalar_run(&raw).unwrap();
        assert_eq!(agg.rollup.total_energy_consumed, 60.0);
        assert_eq!(agg.rollup.mean_node_energy_consumption, 20.0);
    }

    #[test]
    fn mean_divides_by_all_nodes_even_without_records() {
        let mut raw = run("General-0", "4");
        raw.scalars.push(scalar(energy_module(0), ENERGY, 8.0));

        let agg = aggregator().scalar_run(&raw).unwrap();
        assert_eq!(agg.nodes.len(), 4);
        assert_eq!(agg.rollup.mean_node_energy_consumption, 2.0);
    }

    #[test]
    fn gateway_label_is_ignored() {
        let mut raw = run("General-0", "2");
        raw.scalars.push(scalar(
            "LoRaNetworkTest.gateway.radio".to_string(),
            ENERGY,
            4.0,
        ));
        let agg = aggregator().scalar_run(&raw).unwrap();
        assert_eq!(agg.rollup.total_energy_consumed, 0.0);
        assert!(agg.nodes.iter().all(|n| n.energy_consumed.is_none()));
    }

    #[test]
    fn mac_counters_roll_up() {
        let mut raw = run("General-0", "2");
        raw.scalars.push(scalar(mac_module(0), "numSent", 12.0));
        raw.scalars.push(scalar(mac_module(1), "numSent", 8.0));
        raw.scalars.push(scalar(mac_module(1), "numReceived", 30.0));

        let agg = aggregator().scalar_run(&raw).unwrap();
        assert_eq!(agg.nodes[0].packets_sent, Some(12));
        assert_eq!(agg.nodes[0].packets_received, None);
        assert_eq!(agg.rollup.total_packets_sent, 20);
        assert_eq!(agg.rollup.total_packets_received, 30);
    }

    #[test]
    fn fractional_counter_is_rejected() {
        let mut raw = run("General-0", "1");
        raw.scalars.push(scalar(mac_module(0), "numSent", 1.5));
        assert!(matches!(
            aggregator().scalar_run(&raw),
            Err(AggregateError::InvalidCounter { .. })
        ));
    }

    #[test]
    fn counter_of_two_to_the_64_is_rejected() {
        let mut raw = run("General-0", "1");
        raw.scalars
            .push(scalar(mac_module(0), "numSent", 18_446_744_073_709_551_616.0));
        assert!(matches!(
            aggregator().scalar_run(&raw),
            Err(AggregateError::InvalidCounter { .. })
        ));
    }

    #[test]
    fn large_integral_counter_is_kept_exactly() {
        let mut raw = run("General-0", "1");
        raw.scalars
            .push(scalar(mac_module(0), "numSent", 9_007_199_254_740_992.0));
        let agg = aggregator().scalar_run(&raw).unwrap();
        assert_eq!(agg.nodes[0].packets_sent, Some(9_007_199_254_740_992));
    }

    #[test]
    fn per_node_counter_overflow_is_an_error() {
        let mut raw = run("General-0", "1");
        raw.scalars.push(scalar(mac_module(0), "numSent", 1e19));
        raw.scalars.push(scalar(mac_module(0), "numSent", 1e19));
        assert!(matches!(
            aggregator().scalar_run(&raw),
            Err(AggregateError::InvalidCounter { .. })
        ));
    }

    #[test]
    fn run_total_counter_overflow_is_an_error() {
        let mut raw = run("General-0", "2");
        raw.scalars.push(scalar(mac_module(0), "numReceived", 1e19));
        raw.scalars.push(scalar(mac_module(1), "numReceived", 1e19));
        assert!(matches!(
            aggregator().scalar_run(&raw),
            Err(AggregateError::InvalidCounter { .. })
        ));
    }

    #[test]
    fn out_of_range_index_aborts() {
        let mut raw = run("General-0", "3");
        raw.scalars.push(scalar(energy_module(3), ENERGY, 1.0));
        assert!(matches!(
            aggregator().scalar_run(&raw),
            Err(AggregateError::NodeIndexOutOfRange { index: 3, num_nodes: 3, .. })
        ));
    }

    #[test]
    fn nan_energy_aborts() {
        let mut raw = run("General-0", "1");
        raw.scalars.push(scalar(energy_module(0), ENERGY, f64::NAN));
        assert!(matches!(
            aggregator().scalar_run(&raw),
            Err(AggregateError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn duplicate_node_counts_are_rejected() {
        let export = RawExport {
            runs: vec![run("General-0", "2"), run("General-1", "2")],
        };
        assert!(matches!(
            aggregator().scalars(&export),
            Err(AggregateError::DuplicateRun { num_nodes: 2, .. })
        ));
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
        fn mean_is_total_over_node_count(
            energies in prop::collection::vec(0.0_f64..100.0, 1..40)
        ) {
            let mut raw = run("General-0", &energies.len().to_string());
            for (i, e) in energies.iter().enumerate() {
                raw.scalars.push(scalar(energy_module(i as u32), "totalEnergyConsumed", *e));
            }

            let aggregator = Aggregator::from_config(&PipelineConfig::default()).unwrap();
            let agg = aggregator.scalar_run(&raw).unwrap();
            let expected_total: f64 = energies.iter().sum();
            prop_assert!((agg.rollup.total_energy_consumed - expected_total).abs() < 1e-9);
            prop_assert_eq!(
                agg.rollup.mean_node_energy_consumption,
                agg.rollup.total_energy_consumed / energies.len() as f64
            );
        }
    }
}
