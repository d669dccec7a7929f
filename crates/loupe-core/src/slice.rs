use std::ops::Range;

use crate::TensorError;

/// Half-open logical range `start..end` walked with a positive `step`.
///
/// Negative bounds wrap once against the extent of the axis being sliced,
/// then both bounds are clamped into `[0, extent]`, so out-of-range bounds
/// silently become empty or truncated ranges. A zero or negative step, or a
/// start past the end after clamping, is an error rather than a silent
/// empty result.
#[derive(derive_new::new, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: isize,
    pub end: isize,
    pub step: isize,
}

impl Slice {
    /// The whole axis, in order.
    pub fn full() -> Self {
        Self::new(0, isize::MAX, 1)
    }

    /// `start..end` with step 1.
    pub fn range(start: isize, end: isize) -> Self {
        Self::new(start, end, 1)
    }

    /// Every `step`-th element of the whole axis.
    pub fn stepped(step: isize) -> Self {
        Self::new(0, isize::MAX, step)
    }

    /// Resolves this slice against one axis of logical extent `extent`.
    pub(crate) fn resolve(&self, extent: usize) -> Result<ResolvedSlice, TensorError> {
        if self.step <= 0 {
            return Err(TensorError::InvalidStep(self.step));
        }
        let clamp = |ix: isize| {
            let wrapped = if ix < 0 { ix + extent as isize } else { ix };
            wrapped.clamp(0, extent as isize) as usize
        };
        let (start, end) = (clamp(self.start), clamp(self.end));
        if start > end {
            return Err(TensorError::EmptyRange { start, end });
        }
        let step = self.step as usize;
        Ok(ResolvedSlice {
            start,
            len: (end - start).div_ceil(step),
            step,
        })
    }
}

impl From<Range<isize>> for Slice {
    fn from(r: Range<isize>) -> Self {
        Self::range(r.start, r.end)
    }
}

/// A [`Slice`] with wraparound and clamping already applied to one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolvedSlice {
    pub start: usize,
    pub len: usize,
    pub step: usize,
}

/// Wraps a possibly negative logical index once and bounds-checks it
/// against one axis.
pub(crate) fn wrap_index(axis: usize, index: isize, extent: usize) -> Result<usize, TensorError> {
    let wrapped = if index < 0 {
        index + extent as isize
    } else {
        index
    };
    if wrapped < 0 || wrapped >= extent as isize {
        return Err(TensorError::IndexOutOfRange {
            axis,
            index,
            extent,
        });
    }
    Ok(wrapped as usize)
}
