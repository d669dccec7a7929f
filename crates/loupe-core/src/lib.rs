//! Reference-counted storage shared by strided 1-D and 2-D views.
//!
//! A [`Storage`] owns a flat buffer of float elements; [`Tensor1D`] and
//! [`Tensor2D`] are cheap views (offset + shape + per-axis stride) into
//! it. Slicing and reshaping never copy element data: they return new
//! views holding another reference to the same storage. Arithmetic always
//! allocates a fresh Storage+View pair for its result, so operands may
//! alias each other arbitrarily.

mod dtype;
mod error;
mod ops;
mod rank1;
mod rank2;
mod slice;
mod storage;

pub use dtype::*;
pub use error::*;
pub use ops::*;
pub use rank1::*;
pub use rank2::*;
pub use slice::Slice;
pub use storage::*;

pub mod prelude {
    pub use crate::{BinaryOp, Slice, Tensor1D, Tensor2D};
}
