//! Error types for curvepack

use thiserror::Error;

/// Result type alias for curvepack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for curvepack
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Curve dimension outside the supported range
    #[error("Invalid dimension: {0} (must be 2-31)")]
    InvalidDimension(usize),

    /// Side length is not a power of two or is too small
    #[error("Invalid side length: {0} (must be a power of two >= 2)")]
    InvalidSide(i32),

    /// Array length does not match the curve dimension
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Bounds failed validation
    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    /// Negative index where a linear index was required
    #[error("Negative index: {0}")]
    NegativeIndex(i64),

    /// Rectangle start corner lies outside its bounds
    #[error("Start corner beyond bounds on axis {axis}: {start} not in [0, {bound})")]
    StartBeyondBounds { axis: usize, start: i32, bound: i32 },

    /// Moore stretch axis does not exist for this dimension
    #[error("Stretch axis out of range: {axis} (dimension is {dimension})")]
    StretchAxisOutOfRange { axis: usize, dimension: usize },

    /// Curve parameters produce a length beyond the index domain
    #[error("Capacity exceeded: curve length {length} does not fit the index domain")]
    CapacityExceeded { length: u64 },

    /// Required input data is null or empty
    #[error("Missing data: {0}")]
    MissingData(&'static str),

    /// Catch-all for invalid arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed serialized bytes
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}
