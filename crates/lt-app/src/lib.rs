//! Shared application service layer for the LoRa TDMA results pipeline.
//!
//! Frontends go through this crate to export simulator results, fill the
//! cache tiers, compute derived metrics and write series files.

pub mod error;
pub mod export_tool;
pub mod metrics;
pub mod pipeline;
pub mod positions;
pub mod progress;
pub mod query;
pub mod series;

pub use error::{AppError, AppResult};
pub use export_tool::{ExportCommand, build_export_command, run_export};
pub use metrics::{
    MetricRow, RunEnergy, metric_table, network_energy_consumption, packets_sent_per_node,
    power_per_node, throughput, throughput_bps,
};
pub use pipeline::{LoadedData, Pipeline, PipelineOptions, TierOutcome, TierStatus};
pub use positions::{Placement, Position, generate_positions, ini_lines};
pub use progress::{PipelineEvent, PipelineStage};
pub use query::{ScalarSummary, VectorSummary, summarize_scalars, summarize_vectors};
pub use series::{SeriesMetric, build_series, write_all_series};
