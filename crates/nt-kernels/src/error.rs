use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("rank must be greater than zero")]
    ZeroRank,
    #[error("contraction mode {mode} out of range for rank {rank}")]
    InvalidMode { mode: usize, rank: usize },
    #[error("{0} operand is empty")]
    NullOperand(&'static str),
    #[error("rank mismatch: expected {expected}, got {got}")]
    RankMismatch { expected: usize, got: usize },
    #[error("extent mismatch in {what}: expected {expected}, got {got}")]
    ExtentMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("not a valid one-based permutation: {0:?}")]
    InvalidPermutation(Vec<usize>),
    #[error("{operand} operand of {len} elements cannot reach offset {offset}")]
    OutOfBounds {
        operand: &'static str,
        offset: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, KernelError>;
