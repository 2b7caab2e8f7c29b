use thiserror::Error;
use crate::utils::types::NodeIdx;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    #[error("Node index {0} is not a valid index")]
    InvalidIndex(NodeIdx),
    #[error("Node index {0} is out of range for a graph with {1} nodes")]
    NodeOutOfRange(NodeIdx, usize),
    #[error("Edge index rows must have equal length. Got {0} sources and {1} targets")]
    LengthMismatch(usize, usize),
    #[error("At least one layer budget must be provided")]
    EmptyBudgets,
    #[error("Layer budget at position {0} must be positive")]
    InvalidBudget(usize),
    #[error("Target node set must not be empty")]
    EmptyTargets,
    #[error("Candidate edge weights sum to {0}, expected a positive finite value")]
    DegenerateDistribution(f64),
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),
    #[error("Invalid split ratios: train {0}, val {1}")]
    InvalidRatio(f64, f64),
    #[error("Invalid number of splits {0} for {1} samples")]
    InvalidSplitCount(usize, usize),
    #[error("Class {0} has {1} members but {2} are required")]
    ClassTooSmall(usize, usize, usize),
    #[cfg(feature = "tensor")]
    #[error(transparent)]
    Tensor(#[from] crate::utils::tensor::TensorConversionError),
}

pub type SamplingResult<T> = Result<T, SamplingError>;

#[cfg(feature = "extension-module")]
impl From<SamplingError> for pyo3::PyErr {
    fn from(err: SamplingError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(format!("{}", &err))
    }
}
