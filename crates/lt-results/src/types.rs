//! Result data types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which half of the simulator output a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Vector,
    Scalar,
}

impl RecordKind {
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Vector => "vector",
            RecordKind::Scalar => "scalar",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Raw export records (normalised, no dynamically-typed fields)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawExport {
    pub runs: Vec<RawRun>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawRun {
    pub run_id: String,
    pub itervars: BTreeMap<String, String>,
    pub attributes: BTreeMap<String, String>,
    pub vectors: Vec<VectorRecord>,
    pub scalars: Vec<ScalarRecord>,
}

impl RawRun {
    pub fn itervar(&self, name: &str) -> Option<&str> {
        self.itervars.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub module: String,
    pub name: String,
    pub time: Vec<f64>,
    pub value: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    pub module: String,
    pub name: String,
    pub value: f64,
}

// ---------------------------------------------------------------------------
// Aggregated runs
// ---------------------------------------------------------------------------

/// Per-node vector aggregate. Samples hold only non-zero events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PowerNode {
    pub power_samples: Vec<f64>,
    pub power_sum: f64,
    pub packet_length_samples: Vec<f64>,
    pub packet_length_sum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VectorRollup {
    pub total_power_sum: f64,
    pub total_packet_length_sum: f64,
    /// Number of power samples across all nodes.
    pub sample_count: usize,
    /// `total_power_sum / num_nodes`
    pub mean_node_power: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRun {
    pub run_id: String,
    pub num_nodes: u32,
    /// Indexed by node index; always `num_nodes` long.
    pub nodes: Vec<PowerNode>,
    pub rollup: VectorRollup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EnergyNode {
    pub energy_consumed: Option<f64>,
    pub packets_sent: Option<u64>,
    pub packets_received: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScalarRollup {
    pub total_energy_consumed: f64,
    /// `total_energy_consumed / num_nodes`
    pub mean_node_energy_consumption: f64,
    pub total_packets_sent: u64,
    pub total_packets_received: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRun {
    pub run_id: String,
    pub num_nodes: u32,
    /// Indexed by node index; always `num_nodes` long.
    pub nodes: Vec<EnergyNode>,
    pub rollup: ScalarRollup,
}

/// Aggregated runs keyed by node count.
pub type VectorRuns = BTreeMap<u32, VectorRun>;
pub type ScalarRuns = BTreeMap<u32, ScalarRun>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanManifest {
    pub kind: RecordKind,
    /// RFC 3339 timestamp of when the snapshot was written.
    pub created_at: String,
    /// sha256 of the raw snapshot the runs were aggregated from.
    pub source_fingerprint: String,
    pub run_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanSnapshot<R> {
    pub manifest: CleanManifest,
    pub runs: BTreeMap<u32, R>,
}

pub type CleanVectorData = CleanSnapshot<VectorRun>;
pub type CleanScalarData = CleanSnapshot<ScalarRun>;

/// Derived-result exchange file, one metric over one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeriesFile {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}
