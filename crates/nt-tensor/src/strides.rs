use crate::error::{Result, TensorError};
use crate::layout::{Layout, StorageOrder};
use crate::shape::Shape;
use std::fmt;

/// Per-dimension memory steps derived from a shape and a layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Strides {
    strides: Vec<usize>,
}

impl Strides {
    /// Computes strides for `shape` traversed in `layout` order.
    ///
    /// The dimension at traversal position 0 gets stride 1; each following
    /// position multiplies the previous stride by the previous extent.
    /// Scalar and vector shapes get unit strides throughout.
    pub fn new(shape: &Shape, layout: &Layout) -> Result<Self> {
        if layout.rank() != shape.rank() {
            return Err(TensorError::RankMismatch {
                expected: shape.rank(),
                got: layout.rank(),
            });
        }
        let n = shape.dims();
        let p = n.len();
        if p == 0 {
            return Ok(Strides::default());
        }
        if shape.is_scalar() || shape.is_vector() {
            return Ok(Strides {
                strides: vec![1; p],
            });
        }
        let l = layout.as_slice();
        let mut w = vec![0; p];
        w[l[0] - 1] = 1;
        for r in 1..p {
            let (cur, prev) = (l[r] - 1, l[r - 1] - 1);
            w[cur] = w[prev] * n[prev];
        }
        Ok(Strides { strides: w })
    }

    /// Strides for one of the canonical storage orders.
    pub fn from_order(shape: &Shape, order: StorageOrder) -> Self {
        let layout = order.layout(shape.rank());
        Strides::new(shape, &layout).unwrap_or_default()
    }

    pub fn rank(&self) -> usize {
        self.strides.len()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.strides
    }

    /// Linear offset of a multi-index.
    pub fn offset(&self, index: &[usize]) -> usize {
        crate::access::offset(self.as_slice(), index)
    }
}

impl fmt::Display for Strides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, w) in self.strides.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", w)?;
        }
        write!(f, "]")
    }
}
