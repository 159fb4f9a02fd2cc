//! Multi-index to linear-offset translation.

use crate::error::{Result, TensorError};

/// `sum_r index[r] * strides[r]`, without bounds checks.
///
/// Extra trailing entries on either side are ignored, so a shorter index
/// addresses the leading dimensions only.
#[inline]
pub fn offset(strides: &[usize], index: &[usize]) -> usize {
    let mut o = 0;
    for (&i, &w) in index.iter().zip(strides) {
        o += i * w;
    }
    o
}

/// Bounds-checked variant of [`offset`]: the index must have one entry per
/// dimension and stay inside `dims`.
pub fn checked_offset(dims: &[usize], strides: &[usize], index: &[usize]) -> Result<usize> {
    if index.len() != dims.len() || index.iter().zip(dims).any(|(&i, &n)| i >= n) {
        return Err(TensorError::IndexOutOfRange {
            index: index.to_vec(),
            dims: dims.to_vec(),
        });
    }
    Ok(offset(strides, index))
}
