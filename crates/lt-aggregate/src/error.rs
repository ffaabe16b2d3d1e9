use thiserror::Error;

pub type AggregateResult<T> = Result<T, AggregateError>;

/// Malformed input aborts the whole export; no partial aggregate is produced.
#[derive(Error, Debug, PartialEq)]
pub enum AggregateError {
    #[error("Run {run} has no numNodes iteration variable")]
    MissingNodeCount { run: String },

    #[error("Run {run} has invalid numNodes: {value:?}")]
    InvalidNodeCount { run: String, value: String },

    #[error("Run {run}: node index {index} from {module} is outside 0..{num_nodes}")]
    NodeIndexOutOfRange {
        run: String,
        module: String,
        index: u64,
        num_nodes: u32,
    },

    #[error("Runs {first} and {second} both have numNodes = {num_nodes}")]
    DuplicateRun {
        num_nodes: u32,
        first: String,
        second: String,
    },

    #[error("Run {run}: non-finite value in {module} / {name}")]
    NonFiniteValue {
        run: String,
        module: String,
        name: String,
    },

    #[error("Run {run}: {module} / {name} is not a counter: {value}")]
    InvalidCounter {
        run: String,
        module: String,
        name: String,
        value: f64,
    },

    #[error("Invalid label pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
