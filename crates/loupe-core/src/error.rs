use std::collections::TryReserveError;

/// Failures surfaced by storage and view operations.
///
/// Every variant is recoverable: an operation that fails produces no view,
/// allocates nothing, and leaves its sources untouched. Allocation failure
/// is reported to the caller rather than aborting the process.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    #[error("index {index} out of range for axis {axis} of extent {extent}")]
    IndexOutOfRange {
        axis: usize,
        index: isize,
        extent: usize,
    },
    #[error("size mismatch: {lhs} != {rhs}")]
    SizeMismatch { lhs: usize, rhs: usize },
    #[error("shape mismatch: {lhs:?} != {rhs:?}")]
    ShapeMismatch { lhs: [usize; 2], rhs: [usize; 2] },
    #[error("inner dimensions do not agree: {lhs} != {rhs}")]
    InnerDimMismatch { lhs: usize, rhs: usize },
    #[error("cannot reshape {from} elements into {to}")]
    ReshapeMismatch { from: usize, to: usize },
    #[error("reshape requires a contiguous view")]
    NonContiguous,
    #[error("slice step must be positive, got {0}")]
    InvalidStep(isize),
    #[error("slice start {start} is past end {end}")]
    EmptyRange { start: usize, end: usize },
    #[error("cannot convert a view of {0} elements to a scalar")]
    NotScalar(usize),
    #[error(transparent)]
    Allocation(#[from] TryReserveError),
}
