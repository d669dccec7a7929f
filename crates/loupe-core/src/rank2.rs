use std::fmt;
use std::sync::Arc;

use crate::{slice::wrap_index, BinaryOp, Slice, Storage, Tensor1D, TensorDType, TensorError};

/// A 2-D strided view over a shared [`Storage`].
///
/// The addressing scheme is one combined physical base offset plus a
/// stride per axis: `(r, c)` lives at `offset + r*strides[0] +
/// c*strides[1]`. Fresh allocations are row-major (`strides == [ncols,
/// 1]`, `offset == 0`); slicing produces arbitrary per-axis strides over
/// the same storage.
#[derive(Clone)]
pub struct Tensor2D<T: TensorDType = f32> {
    storage: Arc<Storage<T>>,
    offset: usize,
    nrows: usize,
    ncols: usize,
    strides: [usize; 2],
}

impl<T: TensorDType> Tensor2D<T> {
    pub(crate) fn over(
        storage: Arc<Storage<T>>,
        offset: usize,
        nrows: usize,
        ncols: usize,
        strides: [usize; 2],
    ) -> Self {
        // Every addressable element must land inside the buffer.
        debug_assert!(
            nrows * ncols == 0
                || offset + (nrows - 1) * strides[0] + (ncols - 1) * strides[1]
                    < storage.capacity()
        );
        Self {
            storage,
            offset,
            nrows,
            ncols,
            strides,
        }
    }

    /// A zero-initialized `nrows x ncols` tensor over a fresh row-major
    /// storage.
    pub fn empty(nrows: usize, ncols: usize) -> Result<Self, TensorError> {
        let storage = Arc::new(Storage::try_new(nrows * ncols)?);
        Ok(Self::over(storage, 0, nrows, ncols, [ncols, 1]))
    }

    /// Copies `data` (row-major) into a fresh `nrows x ncols` tensor.
    pub fn from_data(data: &[T], nrows: usize, ncols: usize) -> Result<Self, TensorError> {
        if data.len() != nrows * ncols {
            return Err(TensorError::SizeMismatch {
                lhs: data.len(),
                rhs: nrows * ncols,
            });
        }
        let t = Self::empty(nrows, ncols)?;
        t.storage.write().copy_from_slice(data);
        Ok(t)
    }

    /// A `(1, len)` tensor counting up from zero, reached by reshaping a
    /// 1-D arange over the same storage.
    pub fn arange(len: usize) -> Result<Self, TensorError> {
        Tensor1D::arange(len)?.reshape(1, len)
    }

    /// An `nrows x ncols` tensor of standard normal samples.
    #[cfg(feature = "rand")]
    pub fn randn(nrows: usize, ncols: usize) -> Result<Self, TensorError> {
        Tensor1D::randn(nrows * ncols)?.reshape(nrows, ncols)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.nrows, self.ncols]
    }

    pub fn numel(&self) -> usize {
        self.nrows * self.ncols
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn strides(&self) -> [usize; 2] {
        self.strides
    }

    pub fn dt(&self) -> crate::DType {
        T::dt()
    }

    /// Number of views currently sharing this tensor's storage.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.storage)
    }

    /// True when logical row-major order equals physical order from the
    /// start of the buffer.
    pub fn is_contiguous(&self) -> bool {
        self.offset == 0 && self.strides == [self.ncols, 1]
    }

    #[inline]
    fn physical(&self, r: usize, c: usize) -> usize {
        self.offset + r * self.strides[0] + c * self.strides[1]
    }

    /// Reads logical `(r, c)`. Negative indices wrap once per axis; bounds
    /// are checked per axis against `nrows` and `ncols` independently.
    pub fn get(&self, r: isize, c: isize) -> Result<T, TensorError> {
        let r = wrap_index(0, r, self.nrows)?;
        let c = wrap_index(1, c, self.ncols)?;
        Ok(self.storage.get(self.physical(r, c)))
    }

    /// Writes logical `(r, c)` into the shared storage. Out-of-range
    /// indices mutate nothing.
    pub fn set(&self, r: isize, c: isize, value: T) -> Result<(), TensorError> {
        let r = wrap_index(0, r, self.nrows)?;
        let c = wrap_index(1, c, self.ncols)?;
        self.storage.set(self.physical(r, c), value);
        Ok(())
    }

    /// A new view selecting `rows` and `cols`, sharing storage.
    ///
    /// Each axis resolves independently against this view's extents; the
    /// two start contributions fold into the single base offset.
    pub fn slice(&self, rows: Slice, cols: Slice) -> Result<Self, TensorError> {
        let r = rows.resolve(self.nrows)?;
        let c = cols.resolve(self.ncols)?;
        log::trace!(
            "slice rows {:?} cols {:?} over {:?} -> {}x{}",
            rows,
            cols,
            self.shape(),
            r.len,
            c.len
        );
        Ok(Self::over(
            Arc::clone(&self.storage),
            self.offset + r.start * self.strides[0] + c.start * self.strides[1],
            r.len,
            c.len,
            [self.strides[0] * r.step, self.strides[1] * c.step],
        ))
    }

    /// A fresh row-major interpretation of the same storage.
    pub fn reshape(&self, nrows: usize, ncols: usize) -> Result<Self, TensorError> {
        if nrows * ncols != self.numel() {
            return Err(TensorError::ReshapeMismatch {
                from: self.numel(),
                to: nrows * ncols,
            });
        }
        if !self.is_contiguous() {
            return Err(TensorError::NonContiguous);
        }
        Ok(Self::over(
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
        let out = Self::empty(self.nrows, self.ncols)?;
        {
            let src = self.storage.read();
            let mut dst = out.storage.write();
            for r in 0..self.nrows {
                for c in 0..self.ncols {
                    dst[r * self.ncols + c] = f(src[self.physical(r, c)]);
                }
            }
        }
        Ok(out)
    }

    /// Applies `op` elementwise. Both extents must match exactly; there is
    /// no broadcasting at rank 2.
    pub fn binary(&self, rhs: &Self, op: BinaryOp) -> Result<Self, TensorError> {
        if self.nrows != rhs.nrows || self.ncols != rhs.ncols {
            return Err(TensorError::ShapeMismatch {
                lhs: self.shape(),
                rhs: rhs.shape(),
            });
        }
        let out = Self::empty(self.nrows, self.ncols)?;
        {
            let a = self.storage.read();
            let b = rhs.storage.read();
            let mut dst = out.storage.write();
            for r in 0..self.nrows {
                for c in 0..self.ncols {
                    dst[r * self.ncols + c] =
                        op.apply(a[self.physical(r, c)], b[rhs.physical(r, c)]);
                }
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

    /// Matrix product. Requires `self.ncols == rhs.nrows`; the result is
    /// `(self.nrows, rhs.ncols)` with each element accumulated in `T`'s
    /// precision.
    pub fn dot(&self, rhs: &Self) -> Result<Self, TensorError> {
        if self.ncols != rhs.nrows {
            return Err(TensorError::InnerDimMismatch {
                lhs: self.ncols,
                rhs: rhs.nrows,
            });
        }
        log::debug!("dot {:?} x {:?}", self.shape(), rhs.shape());
        let out = Self::empty(self.nrows, rhs.ncols)?;
        {
            let a = self.storage.read();
            let b = rhs.storage.read();
            let mut dst = out.storage.write();
            for i in 0..self.nrows {
                for j in 0..rhs.ncols {
                    let mut acc = T::zero();
                    for k in 0..self.ncols {
                        acc = acc + a[self.physical(i, k)] * b[rhs.physical(k, j)];
                    }
                    dst[i * rhs.ncols + j] = acc;
                }
            }
        }
        Ok(out)
    }

    /// Materializes the logical contents in row-major order.
    pub fn to_vec(&self) -> Vec<T> {
        let data = self.storage.read();
        let mut out = Vec::with_capacity(self.numel());
        for r in 0..self.nrows {
            for c in 0..self.ncols {
                out.push(data[self.physical(r, c)]);
            }
        }
        out
    }
}

impl<T: TensorDType> fmt::Display for Tensor2D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for r in 0..self.nrows {
            if r > 0 {
                write!(f, "\n ")?;
            }
            write!(f, "[")?;
            for c in 0..self.ncols {
                if c > 0 {
                    write!(f, ", ")?;
                }
                // Rendering goes through the lock once per element; fine
                // for a debugging surface.
                write!(f, "{:.1}", self.storage.get(self.physical(r, c)))?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

impl<T: TensorDType> fmt::Debug for Tensor2D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor2D")
            .field("dt", &T::dt())
            .field("nrows", &self.nrows)
            .field("ncols", &self.ncols)
            .field("offset", &self.offset)
            .field("strides", &self.strides)
            .finish()
    }
}
