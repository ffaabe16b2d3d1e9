//! Derived metrics over aggregated runs.
//!
//! Throughput is the run's outgoing packet-length total spread over the fixed
//! observation window. Per-node and network energy are passthroughs of the
//! run rollups; which rollup depends on whether the run came from vector or
//! scalar data, so both run types implement [`RunEnergy`].

use std::collections::BTreeMap;

use lt_core::{InformationRate, Time, bits, mean_over, rate_over};
use lt_results::{ScalarRun, ScalarRuns, VectorRun, VectorRuns};
use serde::{Deserialize, Serialize};
use uom::si::information_rate::bit_per_second;

/// Energy view shared by vector- and scalar-derived runs.
pub trait RunEnergy {
    fn num_nodes(&self) -> u32;

    /// NEC: the run-level total summed across nodes.
    fn network_energy_consumption(&self) -> f64;

    /// Run total divided by node count.
    fn power_per_node(&self) -> f64;
}

impl RunEnergy for VectorRun {
    fn num_nodes(&self) -> u32 {
        self.num_nodes
    }

    fn network_energy_consumption(&self) -> f64 {
        self.rollup.total_power_sum
    }

    fn power_per_node(&self) -> f64 {
        self.rollup.mean_node_power
    }
}

impl RunEnergy for ScalarRun {
    fn num_nodes(&self) -> u32 {
        self.num_nodes
    }

    fn network_energy_consumption(&self) -> f64 {
        self.rollup.total_energy_consumed
    }

    fn power_per_node(&self) -> f64 {
        self.rollup.mean_node_energy_consumption
    }
}

pub fn throughput(run: &VectorRun, window: Time) -> InformationRate {
    rate_over(bits(run.rollup.total_packet_length_sum), window)
}

pub fn throughput_bps(run: &VectorRun, window: Time) -> f64 {
    throughput(run, window).get::<bit_per_second>()
}

pub fn power_per_node<R: RunEnergy>(run: &R) -> f64 {
    run.power_per_node()
}

pub fn network_energy_consumption<R: RunEnergy>(run: &R) -> f64 {
    run.network_energy_consumption()
}

pub fn packets_sent_per_node(run: &ScalarRun) -> f64 {
    mean_over(run.rollup.total_packets_sent as f64, run.num_nodes as usize)
}

/// All derived metrics for one node count. Fields are `None` when the
/// record kind they come from was not loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub num_nodes: u32,
    pub throughput_bps: Option<f64>,
    pub vector_power_per_node: Option<f64>,
    pub vector_network_energy: Option<f64>,
    pub energy_per_node_j: Option<f64>,
    pub network_energy_j: Option<f64>,
    pub packets_sent_per_node: Option<f64>,
}

impl MetricRow {
    fn empty(num_nodes: u32) -> Self {
        Self {
            num_nodes,
            throughput_bps: None,
            vector_power_per_node: None,
            vector_network_energy: None,
            energy_per_node_j: None,
            network_energy_j: None,
            packets_sent_per_node: None,
        }
    }
}

/// Merge vector- and scalar-derived metrics by node count, ascending.
pub fn metric_table(
    vectors: Option<&VectorRuns>,
    scalars: Option<&ScalarRuns>,
    window: Time,
) -> Vec<MetricRow> {
    let mut rows: BTreeMap<u32, MetricRow> = BTreeMap::new();

    for (n, run) in vectors.into_iter().flatten() {
        let row = rows.entry(*n).or_insert_with(|| MetricRow::empty(*n));
        row.throughput_bps = Some(throughput_bps(run, window));
        row.vector_power_per_node = Some(power_per_node(run));
        row.vector_network_energy = Some(network_energy_consumption(run));
    }

    for (n, run) in scalars.into_iter().flatten() {
        let row = rows.entry(*n).or_insert_with(|| MetricRow::empty(*n));
        row.energy_per_node_j = Some(power_per_node(run));
        row.network_energy_j = Some(network_energy_consumption(run));
        row.packets_sent_per_node = Some(packets_sent_per_node(run));
    }

    rows.into_values().collect()
}
