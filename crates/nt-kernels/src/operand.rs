use crate::error::{KernelError, Result};

/// Read-only strided operand: a flat buffer plus the extents and strides
/// that map a multi-index onto it.
#[derive(Debug, Clone, Copy)]
pub struct StridedRef<'a, T> {
    data: &'a [T],
    extents: &'a [usize],
    strides: &'a [usize],
}

impl<'a, T> StridedRef<'a, T> {
    pub fn new(data: &'a [T], extents: &'a [usize], strides: &'a [usize]) -> Self {
        StridedRef {
            data,
            extents,
            strides,
        }
    }

    pub fn data(&self) -> &'a [T] {
        self.data
    }

    pub fn extents(&self) -> &'a [usize] {
        self.extents
    }

    pub fn strides(&self) -> &'a [usize] {
        self.strides
    }

    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    pub(crate) fn validate(&self, name: &'static str) -> Result<()> {
        validate_layout(name, self.data.len(), self.extents, self.strides)
    }
}

/// Writable strided operand, the output side of every kernel.
#[derive(Debug)]
pub struct StridedMut<'a, T> {
    data: &'a mut [T],
    extents: &'a [usize],
    strides: &'a [usize],
}

impl<'a, T> StridedMut<'a, T> {
    pub fn new(data: &'a mut [T], extents: &'a [usize], strides: &'a [usize]) -> Self {
        StridedMut {
            data,
            extents,
            strides,
        }
    }

    pub fn data(&self) -> &[T] {
        &*self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut *self.data
    }

    pub fn extents(&self) -> &'a [usize] {
        self.extents
    }

    pub fn strides(&self) -> &'a [usize] {
        self.strides
    }

    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    pub fn into_parts(self) -> (&'a mut [T], &'a [usize], &'a [usize]) {
        (self.data, self.extents, self.strides)
    }

    pub(crate) fn validate(&self, name: &'static str) -> Result<()> {
        validate_layout(name, self.data.len(), self.extents, self.strides)
    }
}

/// Largest offset reachable by any multi-index inside `extents`.
pub fn max_offset(extents: &[usize], strides: &[usize]) -> usize {
    extents
        .iter()
        .zip(strides)
        .map(|(&n, &w)| n.saturating_sub(1) * w)
        .sum()
}

pub(crate) fn validate_layout(
    name: &'static str,
    len: usize,
    extents: &[usize],
    strides: &[usize],
) -> Result<()> {
    if len == 0 {
        return Err(KernelError::NullOperand(name));
    }
    if extents.len() != strides.len() {
        return Err(KernelError::RankMismatch {
            expected: extents.len(),
            got: strides.len(),
        });
    }
    let offset = max_offset(extents, strides);
    if offset >= len {
        return Err(KernelError::OutOfBounds {
            operand: name,
            offset,
            len,
        });
    }
    Ok(())
}

/// Checks that `pi` is a one-based permutation of `1..=p`.
pub(crate) fn validate_permutation(pi: &[usize], p: usize) -> Result<()> {
    if pi.len() != p {
        return Err(KernelError::InvalidPermutation(pi.to_vec()));
    }
    let mut seen = vec![false; p];
    for &k in pi {
        if k == 0 || k > p || seen[k - 1] {
            return Err(KernelError::InvalidPermutation(pi.to_vec()));
        }
        seen[k - 1] = true;
    }
    Ok(())
}
