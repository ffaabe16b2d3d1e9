//! Derived-result series over node count, written for the plotting layer.

use std::path::PathBuf;

use lt_results::{SeriesFile, SeriesStore};

use crate::error::AppResult;
use crate::metrics::MetricRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesMetric {
    Throughput,
    VectorPowerPerNode,
    VectorNetworkEnergy,
    EnergyPerNode,
    NetworkEnergy,
    PacketsSentPerNode,
}

impl SeriesMetric {
    pub const ALL: [SeriesMetric; 6] = [
        SeriesMetric::Throughput,
        SeriesMetric::VectorPowerPerNode,
        SeriesMetric::VectorNetworkEnergy,
        SeriesMetric::EnergyPerNode,
        SeriesMetric::NetworkEnergy,
        SeriesMetric::PacketsSentPerNode,
    ];

    /// File-name stem of the series.
    pub fn name(self) -> &'static str {
        match self {
            SeriesMetric::Throughput => "throughput",
            SeriesMetric::VectorPowerPerNode => "power_per_node_vec",
            SeriesMetric::VectorNetworkEnergy => "nec_vec",
            SeriesMetric::EnergyPerNode => "power_per_node",
            SeriesMetric::NetworkEnergy => "nec",
            SeriesMetric::PacketsSentPerNode => "packets_sent_per_node",
        }
    }

    fn value(self, row: &MetricRow) -> Option<f64> {
        match self {
            SeriesMetric::Throughput => row.throughput_bps,
            SeriesMetric::VectorPowerPerNode => row.vector_power_per_node,
            SeriesMetric::VectorNetworkEnergy => row.vector_network_energy,
            SeriesMetric::EnergyPerNode => row.energy_per_node_j,
            SeriesMetric::NetworkEnergy => row.network_energy_j,
            SeriesMetric::PacketsSentPerNode => row.packets_sent_per_node,
        }
    }
}

/// x = node count, y = metric value; rows without the metric are skipped.
pub fn build_series(rows: &[MetricRow], metric: SeriesMetric) -> SeriesFile {
    let mut series = SeriesFile::default();
    for row in rows {
        if let Some(y) = metric.value(row) {
            series.x.push(row.num_nodes as f64);
            series.y.push(y);
        }
    }
    series
}

/// Write every non-empty series as `<metric>_<param>.json`.
pub fn write_all_series(
    store: &SeriesStore,
    rows: &[MetricRow],
    param: &str,
) -> AppResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for metric in SeriesMetric::ALL {
        let series = build_series(rows, metric);
        if series.x.is_empty() {
            continue;
        }
        written.push(store.write_series(metric.name(), param, &series)?);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(num_nodes: u32, throughput_bps: Option<f64>, network_energy_j: Option<f64>) -> MetricRow {
        MetricRow {
            num_nodes,
            throughput_bps,
            vector_power_per_node: None,
            vector_network_energy: None,
            energy_per_node_j: None,
            network_energy_j,
            packets_sent_per_node: None,
        }
    }

    #[test]
    fn skips_rows_without_metric() {
        let rows = vec![row(5, None, Some(1.0)), row(10, Some(92.5), Some(2.0))];
        let tp = build_series(&rows, SeriesMetric::Throughput);
        assert_eq!(tp.x, vec![10.0]);
        assert_eq!(tp.y, vec![92.5]);

        let nec = build_series(&rows, SeriesMetric::NetworkEnergy);
        assert_eq!(nec.x, vec![5.0, 10.0]);
    }
}
