//! Query helpers over aggregated runs.

use lt_results::{ScalarRun, ScalarRuns, VectorRun, VectorRuns};

use crate::error::{AppError, AppResult};

/// One-line view of a vector run.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSummary {
    pub num_nodes: u32,
    pub run_id: String,
    pub nodes_with_power: usize,
    pub nodes_with_packets: usize,
    pub sample_count: usize,
    pub total_power_sum: f64,
    pub total_packet_length_sum: f64,
}

/// One-line view of a scalar run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarSummary {
    pub num_nodes: u32,
    pub run_id: String,
    pub nodes_with_energy: usize,
    pub total_energy_consumed: f64,
    pub mean_node_energy_consumption: f64,
    pub total_packets_sent: u64,
}

pub fn summarize_vectors(runs: &VectorRuns) -> Vec<VectorSummary> {
    runs.values()
        .map(|run| VectorSummary {
            num_nodes: run.num_nodes,
            run_id: run.run_id.clone(),
            nodes_with_power: run
                .nodes
                .iter()
                .filter(|n| !n.power_samples.is_empty())
                .count(),
            nodes_with_packets: run
                .nodes
                .iter()
                .filter(|n| !n.packet_length_samples.is_empty())
                .count(),
            sample_count: run.rollup.sample_count,
            total_power_sum: run.rollup.total_power_sum,
            total_packet_length_sum: run.rollup.total_packet_length_sum,
        })
        .collect()
}

pub fn summarize_scalars(runs: &ScalarRuns) -> Vec<ScalarSummary> {
    runs.values()
        .map(|run| ScalarSummary {
            num_nodes: run.num_nodes,
            run_id: run.run_id.clone(),
            nodes_with_energy: run
                .nodes
                .iter()
                .filter(|n| n.energy_consumed.is_some())
                .count(),
            total_energy_consumed: run.rollup.total_energy_consumed,
            mean_node_energy_consumption: run.rollup.mean_node_energy_consumption,
            total_packets_sent: run.rollup.total_packets_sent,
        })
        .collect()
}

pub fn get_vector_run(runs: &VectorRuns, num_nodes: u32) -> AppResult<&VectorRun> {
    runs.get(&num_nodes)
        .ok_or(AppError::RunNotFound(num_nodes))
}

pub fn get_scalar_run(runs: &ScalarRuns, num_nodes: u32) -> AppResult<&ScalarRun> {
    runs.get(&num_nodes)
        .ok_or(AppError::RunNotFound(num_nodes))
}
