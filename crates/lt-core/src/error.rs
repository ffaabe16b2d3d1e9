use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid node count: {value}")]
    InvalidNodeCount { value: String },

    #[error("Node index out of range: index={index}, node count={count}")]
    IndexOob { index: u32, count: u32 },
}
