//! Pipeline configuration schema.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_RESULTS_DIR: &str = "samples/flora-tdma/simulations/results";
pub const DEFAULT_OBSERVATION_WINDOW_S: f64 = 10_800.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    pub version: u32,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default)]
    pub cache: CacheLayout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_dir: Option<PathBuf>,
    #[serde(default)]
    pub patterns: PatternDef,
    #[serde(default)]
    pub metrics: MetricNames,
    #[serde(default = "default_observation_window_s")]
    pub observation_window_s: f64,
    #[serde(default)]
    pub export_tool: ExportToolDef,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: crate::LATEST_VERSION,
            results_dir: default_results_dir(),
            cache: CacheLayout::default(),
            series_dir: None,
            patterns: PatternDef::default(),
            metrics: MetricNames::default(),
            observation_window_s: DEFAULT_OBSERVATION_WINDOW_S,
            export_tool: ExportToolDef::default(),
        }
    }
}

impl PipelineConfig {
    /// Config rooted at another results directory, everything else default.
    pub fn for_results_dir(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            ..Self::default()
        }
    }

    pub fn series_dir(&self) -> PathBuf {
        self.series_dir
            .clone()
            .unwrap_or_else(|| self.results_dir.join("series"))
    }

    pub fn export_working_dir(&self) -> &Path {
        self.export_tool
            .working_dir
            .as_deref()
            .unwrap_or(&self.results_dir)
    }
}

/// File names of every cache tier, relative to `results_dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheLayout {
    pub vector_json: String,
    pub vector_snapshot: String,
    pub vector_clean: String,
    pub vector_clean_json: String,
    pub scalar_json: String,
    pub scalar_snapshot: String,
    pub scalar_clean: String,
    pub scalar_clean_json: String,
    #[serde(default = "default_true")]
    pub mirror_json: bool,
}

impl Default for CacheLayout {
    fn default() -> Self {
        Self {
            vector_json: "data_vec.json".to_string(),
            vector_snapshot: "data_vec.bin".to_string(),
            vector_clean: "data_clean_vec.bin".to_string(),
            vector_clean_json: "data_clean_vec.json".to_string(),
            scalar_json: "data_sca.json".to_string(),
            scalar_snapshot: "data_sca.bin".to_string(),
            scalar_clean: "data_clean_sca.bin".to_string(),
            scalar_clean_json: "data_clean_sca.json".to_string(),
            mirror_json: true,
        }
    }
}

impl CacheLayout {
    pub fn file_names(&self) -> [&str; 8] {
        [
            self.vector_json.as_str(),
            self.vector_snapshot.as_str(),
            self.vector_clean.as_str(),
            self.vector_clean_json.as_str(),
            self.scalar_json.as_str(),
            self.scalar_snapshot.as_str(),
            self.scalar_clean.as_str(),
            self.scalar_clean_json.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Label only has to start with the pattern; trailing submodules are ignored.
    #[default]
    Prefix,
    /// Pattern must cover the whole label.
    Exact,
}

/// Module-path patterns. Each must have exactly one capture group: the node index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternDef {
    pub energy_consumer: String,
    pub queue: String,
    pub mac: String,
    #[serde(default)]
    pub match_mode: MatchMode,
}

impl Default for PatternDef {
    fn default() -> Self {
        Self {
            energy_consumer: r"LoRaNetworkTest\.loRaNodes\[(\d+)\]\.LoRaNic\.radio\.energyConsumer"
                .to_string(),
            queue: r"LoRaNetworkTest\.loRaNodes\[(\d+)\]\.LoRaNic\.queue".to_string(),
            mac: r"LoRaNetworkTest\.loRaNodes\[(\d+)\]\.LoRaNic\.mac".to_string(),
            match_mode: MatchMode::Prefix,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricNames {
    pub power_vector: String,
    pub packet_length_vector: String,
    pub energy_scalar: String,
    pub sent_scalar: String,
    pub received_scalar: String,
}

impl Default for MetricNames {
    fn default() -> Self {
        Self {
            power_vector: "powerConsumption:vector".to_string(),
            packet_length_vector: "outgoingPacketLengths:vector".to_string(),
            energy_scalar: "totalEnergyConsumed".to_string(),
            sent_scalar: "numSent".to_string(),
            received_scalar: "numReceived".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportToolDef {
    pub program: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    #[serde(default = "default_vector_inputs")]
    pub vector_inputs: Vec<String>,
    #[serde(default = "default_scalar_inputs")]
    pub scalar_inputs: Vec<String>,
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
}

impl Default for ExportToolDef {
    fn default() -> Self {
        Self {
            program: "opp_scavetool".to_string(),
            working_dir: None,
            vector_inputs: default_vector_inputs(),
            scalar_inputs: default_scalar_inputs(),
            timeout_s: default_timeout_s(),
        }
    }
}

fn default_results_dir() -> PathBuf {
    PathBuf::from(DEFAULT_RESULTS_DIR)
}

fn default_observation_window_s() -> f64 {
    DEFAULT_OBSERVATION_WINDOW_S
}

fn default_true() -> bool {
    true
}

fn default_vector_inputs() -> Vec<String> {
    vec!["*.vec".to_string()]
}

fn default_scalar_inputs() -> Vec<String> {
    vec!["*.sca".to_string()]
}

fn default_timeout_s() -> u64 {
    600
}
