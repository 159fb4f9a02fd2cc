use crate::error::{Result, TensorError};
use std::fmt;

/// The extents of a tensor, one per dimension.
///
/// Every extent is positive. A rank-1 input `[n]` is stored as `[n, 1]` so
/// that vectors and matrices share the 2-D stride math; the empty shape
/// describes the empty tensor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Create a shape, rejecting zero extents.
    pub fn new(dims: Vec<usize>) -> Result<Self> {
        if dims.contains(&0) {
            return Err(TensorError::InvalidShape(dims));
        }
        let dims = match dims.as_slice() {
            [n] => vec![*n, 1],
            _ => dims,
        };
        Ok(Shape { dims })
    }

    /// Create a shape from a slice of extents.
    pub fn from_slice(dims: &[usize]) -> Result<Self> {
        Shape::new(dims.to_vec())
    }

    /// The shape of the empty tensor.
    pub fn empty() -> Self {
        Shape { dims: Vec::new() }
    }

    /// Number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements; zero for the empty shape.
    pub fn numel(&self) -> usize {
        if self.dims.is_empty() {
            0
        } else {
            self.dims.iter().product()
        }
    }

    /// Returns the extent of dimension `i`.
    ///
    /// # Panics
    /// Panics if `i >= rank()`.
    pub fn dim(&self, i: usize) -> usize {
        self.dims[i]
    }

    /// Returns a reference to the underlying extents.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Every extent is one.
    pub fn is_scalar(&self) -> bool {
        !self.dims.is_empty() && self.dims.iter().all(|&n| n == 1)
    }

    /// A `[n, 1]` or `[1, n]` shape with `n > 1`, optionally followed by
    /// unit extents.
    pub fn is_vector(&self) -> bool {
        if self.dims.len() < 2 {
            return false;
        }
        let (n0, n1) = (self.dims[0], self.dims[1]);
        let leading = (n0 == 1) != (n1 == 1);
        leading && self.dims[2..].iter().all(|&n| n == 1)
    }

    pub fn is_matrix(&self) -> bool {
        self.dims.len() == 2 && self.dims[0] > 1 && self.dims[1] > 1
    }

    /// Rank above two with a non-unit extent past the second dimension.
    pub fn is_tensor(&self) -> bool {
        self.dims.len() > 2 && self.dims[2..].iter().any(|&n| n > 1)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

impl TryFrom<Vec<usize>> for Shape {
    type Error = TensorError;

    fn try_from(dims: Vec<usize>) -> Result<Self> {
        Shape::new(dims)
    }
}

impl TryFrom<&[usize]> for Shape {
    type Error = TensorError;

    fn try_from(dims: &[usize]) -> Result<Self> {
        Shape::from_slice(dims)
    }
}

impl<const N: usize> TryFrom<[usize; N]> for Shape {
    type Error = TensorError;

    fn try_from(dims: [usize; N]) -> Result<Self> {
        Shape::new(dims.to_vec())
    }
}
