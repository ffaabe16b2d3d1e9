//! lt-aggregate: turns raw export runs into per-node and per-run aggregates.
//!
//! Records are attributed to nodes by matching their module path against the
//! configured patterns. Runs are keyed by their `numNodes` iteration variable.

pub mod error;
pub mod matcher;
pub mod scalar;
pub mod vector;

pub use error::{AggregateError, AggregateResult};
pub use matcher::{LabelMatcher, RecordMatchers};

use lt_config::{MetricNames, PipelineConfig};
use lt_core::{NodeCount, NodeIndex};
use lt_results::RawRun;

pub const NUM_NODES_ITERVAR: &str = "numNodes";

/// Matchers and metric names for one pipeline configuration.
#[derive(Debug, Clone)]
pub struct Aggregator {
    matchers: RecordMatchers,
    metrics: MetricNames,
}

impl Aggregator {
    pub fn new(matchers: RecordMatchers, metrics: MetricNames) -> Self {
        Self { matchers, metrics }
    }

    pub fn from_config(config: &PipelineConfig) -> AggregateResult<Self> {
        Ok(Self::new(
            RecordMatchers::from_patterns(&config.patterns)?,
            config.metrics.clone(),
        ))
    }

    pub fn matchers(&self) -> &RecordMatchers {
        &self.matchers
    }

    pub fn metrics(&self) -> &MetricNames {
        &self.metrics
    }
}

fn node_count(run: &RawRun) -> AggregateResult<NodeCount> {
    let text = run
        .itervar(NUM_NODES_ITERVAR)
        .ok_or_else(|| AggregateError::MissingNodeCount {
            run: run.run_id.clone(),
        })?;
    NodeCount::parse(text).map_err(|_| AggregateError::InvalidNodeCount {
        run: run.run_id.clone(),
        value: text.to_string(),
    })
}

fn checked_index(
    run: &RawRun,
    module: &str,
    raw: u64,
    count: NodeCount,
) -> AggregateResult<NodeIndex> {
    let out_of_range = || AggregateError::NodeIndexOutOfRange {
        run: run.run_id.clone(),
        module: module.to_string(),
        index: raw,
        num_nodes: count.get(),
    };
    let raw = u32::try_from(raw).map_err(|_| out_of_range())?;
    count.index(raw).map_err(|_| out_of_range())
}
