use std::fmt;
use std::sync::Arc;

use crate::{
    slice::{wrap_index, ResolvedSlice},
    BinaryOp, Slice, Storage, Tensor2D, TensorDType, TensorError,
};

#[cfg(feature = "rand")]
use {rand::prelude::*, rand_distr::StandardNormal};

/// A 1-D strided view over a shared [`Storage`].
///
/// Cloning a view is cheap and shares the underlying buffer, as do the
/// views returned by [`slice`](Self::slice) and [`select`](Self::select).
/// Writes through any view are visible through every other view of the
/// same storage. Dropping a view releases one storage reference; the
/// buffer is freed when the last view goes away.
///
/// Arithmetic never mutates in place: every result is a fresh contiguous
/// Storage+View pair, so operands may alias each other freely.
#[derive(Clone)]
pub struct Tensor1D<T: TensorDType = f32> {
    storage: Arc<Storage<T>>,
    offset: usize,
    len: usize,
    stride: usize,
}

impl<T: TensorDType> Tensor1D<T> {
    fn over(storage: Arc<Storage<T>>, offset: usize, len: usize, stride: usize) -> Self {
        // Every addressable element must land inside the buffer.
        debug_assert!(len == 0 || offset + (len - 1) * stride < storage.capacity());
        Self {
            storage,
            offset,
            len,
            stride,
        }
    }

    /// A zero-initialized tensor of `len` elements over a fresh contiguous
    /// storage.
    pub fn empty(len: usize) -> Result<Self, TensorError> {
        let storage = Arc::new(Storage::try_new(len)?);
        Ok(Self::over(storage, 0, len, 1))
    }

    /// `[0.0, 1.0, ..., len - 1]`.
    pub fn arange(len: usize) -> Result<Self, TensorError> {
        let t = Self::empty(len)?;
        {
            let mut data = t.storage.write();
            let mut val = T::zero();
            for slot in data.iter_mut() {
                *slot = val;
                val = val + T::one();
            }
        }
        Ok(t)
    }

    /// Copies `data` into a fresh contiguous tensor.
    pub fn from_data(data: &[T]) -> Result<Self, TensorError> {
        let t = Self::empty(data.len())?;
        t.storage.write().copy_from_slice(data);
        Ok(t)
    }

    /// A tensor of `len` samples from the standard normal distribution.
    #[cfg(feature = "rand")]
    pub fn randn(len: usize) -> Result<Self, TensorError> {
        let mut rng = rand::thread_rng();
        let t = Self::empty(len)?;
        for slot in t.storage.write().iter_mut() {
            let sample: f32 = StandardNormal.sample(&mut rng);
            *slot = T::from(sample).expect("float sample converts to every element type");
        }
        Ok(t)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn dt(&self) -> crate::DType {
        T::dt()
    }

    /// Number of views currently sharing this tensor's storage.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.storage)
    }

    /// True when this view walks its storage from the start with unit
    /// stride, i.e. logical order equals physical order.
    pub fn is_contiguous(&self) -> bool {
        self.offset == 0 && self.stride == 1
    }

    #[inline]
    fn physical(&self, ix: usize) -> usize {
        self.offset + ix * self.stride
    }

    /// Reads logical index `ix`. A negative index wraps once from the end.
    pub fn get(&self, ix: isize) -> Result<T, TensorError> {
        let ix = wrap_index(0, ix, self.len)?;
        Ok(self.storage.get(self.physical(ix)))
    }

    /// Writes logical index `ix`. The write lands in the shared storage and
    /// is visible through every aliasing view. Out-of-range indices mutate
    /// nothing.
    pub fn set(&self, ix: isize, value: T) -> Result<(), TensorError> {
        let ix = wrap_index(0, ix, self.len)?;
        self.storage.set(self.physical(ix), value);
        Ok(())
    }

    /// A size-1 view of logical index `ix`, sharing storage.
    pub fn select(&self, ix: isize) -> Result<Self, TensorError> {
        let ix = wrap_index(0, ix, self.len)?;
        Ok(Self::over(
            Arc::clone(&self.storage),
            self.physical(ix),
            1,
            self.stride,
        ))
    }

    /// The scalar held by a size-1 view.
    pub fn item(&self) -> Result<T, TensorError> {
        if self.len != 1 {
            return Err(TensorError::NotScalar(self.len));
        }
        self.get(0)
    }

    /// A new view of `slice`, sharing storage with no element copies.
    ///
    /// Bounds wrap and clamp against this view's extent, not the
    /// underlying storage, so slicing a slice composes.
    pub fn slice(&self, slice: Slice) -> Result<Self, TensorError> {
        let ResolvedSlice { start, len, step } = slice.resolve(self.len)?;
        log::trace!(
            "slice {:?} over extent {} -> start {} len {} step {}",
            slice,
            self.len,
            start,
            len,
            step
        );
        Ok(Self::over(
            Arc::clone(&self.storage),
            self.offset + start * self.stride,
            len,
            self.stride * step,
        ))
    }

    /// Reinterprets a contiguous view as an `nrows x ncols` matrix sharing
    /// the same storage.
    pub fn reshape(&self, nrows: usize, ncols: usize) -> Result<Tensor2D<T>, TensorError> {
        if nrows * ncols != self.len {
            return Err(TensorError::ReshapeMismatch {
                from: self.len,
                to: nrows * ncols,
            });
        }
        if !self.is_contiguous() {
            return Err(TensorError::NonContiguous);
        }
        Ok(Tensor2D::over(
            Arc::clone(&self.storage),
            0,
            nrows,
            ncols,
            [ncols, 1],
        ))
    }

    /// Elementwise `x + k` into a fresh tensor.
    pub fn add_scalar(&self, k: T) -> Result<Self, TensorError> {
        self.map(|x| x + k)
    }

    /// Elementwise `x * k` into a fresh tensor.
    pub fn mul_scalar(&self, k: T) -> Result<Self, TensorError> {
        self.map(|x| x * k)
    }

    fn map(&self, f: impl Fn(T) -> T) -> Result<Self, TensorError> {
        let out = Self::empty(self.len)?;
        {
            let src = self.storage.read();
            let mut dst = out.storage.write();
            for i in 0..self.len {
                dst[i] = f(src[self.physical(i)]);
            }
        }
        Ok(out)
    }

    /// Applies `op` elementwise with the restricted size-1 broadcast:
    /// lengths must match, or the length-1 operand is reused (effective
    /// stride 0) across the other operand's length.
    pub fn binary(&self, rhs: &Self, op: BinaryOp) -> Result<Self, TensorError> {
        let (len, ls, rs) = if self.len == rhs.len {
            (self.len, self.stride, rhs.stride)
        } else if self.len == 1 {
            (rhs.len, 0, rhs.stride)
        } else if rhs.len == 1 {
            (self.len, self.stride, 0)
        } else {
            return Err(TensorError::SizeMismatch {
                lhs: self.len,
                rhs: rhs.len,
            });
        };
        let out = Self::empty(len)?;
        {
            let a = self.storage.read();
            let b = rhs.storage.read();
            let mut dst = out.storage.write();
            for i in 0..len {
                dst[i] = op.apply(a[self.offset + i * ls], b[rhs.offset + i * rs]);
            }
        }
        Ok(out)
    }

    pub fn add(&self, rhs: &Self) -> Result<Self, TensorError> {
        self.binary(rhs, BinaryOp::Add)
    }

    pub fn sub(&self, rhs: &Self) -> Result<Self, TensorError> {
        self.binary(rhs, BinaryOp::Sub)
    }

    pub fn mul(&self, rhs: &Self) -> Result<Self, TensorError> {
        self.binary(rhs, BinaryOp::Mul)
    }

    pub fn div(&self, rhs: &Self) -> Result<Self, TensorError> {
        self.binary(rhs, BinaryOp::Div)
    }

    /// Materializes the logical contents in order.
    pub fn to_vec(&self) -> Vec<T> {
        let data = self.storage.read();
        (0..self.len).map(|i| data[self.physical(i)]).collect()
    }
}

impl<T: TensorDType> fmt::Display for Tensor1D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, val) in self.to_vec().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.1}", val)?;
        }
        write!(f, "]")
    }
}

impl<T: TensorDType> fmt::Debug for Tensor1D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor1D")
            .field("dt", &T::dt())
            .field("len", &self.len)
            .field("offset", &self.offset)
            .field("stride", &self.stride)
            .finish()
    }
}
