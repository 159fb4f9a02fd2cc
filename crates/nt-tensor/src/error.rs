use nt_kernels::KernelError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("invalid shape {0:?}: extents must be greater than zero")]
    InvalidShape(Vec<usize>),
    #[error("size mismatch: shape holds {expected} elements, got {got}")]
    SizeMismatch { expected: usize, got: usize },
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
    #[error("storage order mismatch: expected {expected}, got {got}")]
    OrderMismatch { expected: String, got: String },
    #[error("invalid layout {0:?}: not a permutation of 1..=rank")]
    InvalidLayout(Vec<usize>),
    #[error("rank mismatch: expected {expected}, got {got}")]
    RankMismatch { expected: usize, got: usize },
    #[error("index {index:?} out of range for dims {dims:?}")]
    IndexOutOfRange { index: Vec<usize>, dims: Vec<usize> },
    #[error("invalid mode {mode} for tensor of rank {rank}")]
    InvalidMode { mode: usize, rank: usize },
    #[error("{0} operand is empty")]
    EmptyOperand(&'static str),
    #[error("invalid contraction: {0}")]
    ContractionDefinition(String),
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),
}

pub type Result<T> = std::result::Result<T, TensorError>;
