use crate::error::{Result, TensorError};
use std::fmt;

/// Canonical storage orders a tensor can be laid out in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StorageOrder {
    /// The first dimension varies fastest in memory.
    #[default]
    FirstOrder,
    /// The last dimension varies fastest in memory.
    LastOrder,
}

impl StorageOrder {
    /// The layout permutation this order stands for at rank `p`.
    pub fn layout(self, p: usize) -> Layout {
        match self {
            StorageOrder::FirstOrder => Layout::first_order(p),
            StorageOrder::LastOrder => Layout::last_order(p),
        }
    }
}

impl fmt::Display for StorageOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageOrder::FirstOrder => write!(f, "first-order"),
            StorageOrder::LastOrder => write!(f, "last-order"),
        }
    }
}

/// A one-based permutation of `1..=rank`.
///
/// Entry `k` names the dimension occupying traversal position `k`: the
/// dimension `l[0] - 1` varies fastest in memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Layout {
    perm: Vec<usize>,
}

impl Layout {
    /// Create a layout, rejecting anything that is not a bijection on
    /// `1..=perm.len()`.
    pub fn new(perm: Vec<usize>) -> Result<Self> {
        let p = perm.len();
        let mut seen = vec![false; p];
        for &k in &perm {
            if k == 0 || k > p || seen[k - 1] {
                return Err(TensorError::InvalidLayout(perm));
            }
            seen[k - 1] = true;
        }
        Ok(Layout { perm })
    }

    /// Identity permutation `[1, 2, .., p]`.
    pub fn first_order(p: usize) -> Self {
        Layout {
            perm: (1..=p).collect(),
        }
    }

    /// Reversed permutation `[p, .., 2, 1]`.
    pub fn last_order(p: usize) -> Self {
        Layout {
            perm: (1..=p).rev().collect(),
        }
    }

    pub fn rank(&self) -> usize {
        self.perm.len()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.perm
    }

    /// The permutation that undoes this one.
    pub fn inverse(&self) -> Layout {
        let mut inv = vec![0; self.perm.len()];
        for (k, &l) in self.perm.iter().enumerate() {
            inv[l - 1] = k + 1;
        }
        Layout { perm: inv }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, l) in self.perm.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", l)?;
        }
        write!(f, "]")
    }
}
