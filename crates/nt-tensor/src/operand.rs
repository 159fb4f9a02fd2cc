//! Narrow interfaces for vector and matrix operands of the products.
//!
//! The engine never owns these containers; it only reads their contiguous
//! elements and, for matrices, the extents and strides.

use nt_kernels::{max_offset, Element, StridedRef};

use crate::error::{Result, TensorError};
use crate::layout::StorageOrder;
use crate::tensor::Tensor;

/// Anything exposing its elements as one contiguous slice.
pub trait VectorOperand<T> {
    fn as_vector(&self) -> &[T];
}

impl<T> VectorOperand<T> for [T] {
    fn as_vector(&self) -> &[T] {
        self
    }
}

impl<T, const N: usize> VectorOperand<T> for [T; N] {
    fn as_vector(&self) -> &[T] {
        self
    }
}

impl<T> VectorOperand<T> for Vec<T> {
    fn as_vector(&self) -> &[T] {
        self
    }
}

impl<T: Element> VectorOperand<T> for Tensor<T> {
    fn as_vector(&self) -> &[T] {
        self.data()
    }
}

/// Anything that can be viewed as a strided 2-D matrix.
pub trait MatrixOperand<T> {
    fn as_matrix(&self) -> Result<MatrixRef<'_, T>>;
}

/// Borrowed strided matrix: `data[i * strides[0] + j * strides[1]]` is
/// element `(i, j)`.
#[derive(Debug, Clone, Copy)]
pub struct MatrixRef<'a, T> {
    data: &'a [T],
    extents: [usize; 2],
    strides: [usize; 2],
}

impl<'a, T> MatrixRef<'a, T> {
    /// Wraps `data` as a `rows x cols` matrix with explicit strides.
    pub fn new(data: &'a [T], rows: usize, cols: usize, strides: [usize; 2]) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(TensorError::InvalidShape(vec![rows, cols]));
        }
        let extents = [rows, cols];
        let needed = max_offset(&extents, &strides) + 1;
        if !data.is_empty() && data.len() < needed {
            return Err(TensorError::SizeMismatch {
                expected: needed,
                got: data.len(),
            });
        }
        Ok(MatrixRef {
            data,
            extents,
            strides,
        })
    }

    /// Rows stored one after another.
    pub fn row_major(data: &'a [T], rows: usize, cols: usize) -> Result<Self> {
        Self::new(data, rows, cols, [cols, 1])
    }

    /// Columns stored one after another.
    pub fn column_major(data: &'a [T], rows: usize, cols: usize) -> Result<Self> {
        Self::new(data, rows, cols, [1, rows])
    }

    pub fn rows(&self) -> usize {
        self.extents[0]
    }

    pub fn cols(&self) -> usize {
        self.extents[1]
    }

    pub fn data(&self) -> &'a [T] {
        self.data
    }

    pub fn strides(&self) -> [usize; 2] {
        self.strides
    }

    pub(crate) fn as_strided(&self) -> StridedRef<'_, T> {
        StridedRef::new(self.data, &self.extents, &self.strides)
    }
}

impl<T: Copy> MatrixOperand<T> for MatrixRef<'_, T> {
    fn as_matrix(&self) -> Result<MatrixRef<'_, T>> {
        Ok(*self)
    }
}

impl<T: Element> MatrixOperand<T> for Tensor<T> {
    fn as_matrix(&self) -> Result<MatrixRef<'_, T>> {
        if self.rank() != 2 {
            return Err(TensorError::RankMismatch {
                expected: 2,
                got: self.rank(),
            });
        }
        let (dims, w) = (self.shape().dims(), self.strides().as_slice());
        MatrixRef::new(self.data(), dims[0], dims[1], [w[0], w[1]])
    }
}

impl<T: Element> Tensor<T> {
    /// Builds a `rows x cols` tensor from any matrix operand, keeping this
    /// tensor's default first order.
    pub fn from_matrix<M: MatrixOperand<T> + ?Sized>(m: &M) -> Result<Self> {
        let m = m.as_matrix()?;
        if m.data().is_empty() {
            return Err(TensorError::EmptyOperand("matrix"));
        }
        let shape = crate::shape::Shape::new(vec![m.rows(), m.cols()])?;
        let mut out = Tensor::with_order(shape, StorageOrder::FirstOrder);
        nt_kernels::copy(out.as_strided_mut(), m.as_strided())?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    #[test]
    fn test_vector_operands() {
        let v = vec![1.0f32, 2.0];
        assert_eq!(v.as_vector(), &[1.0, 2.0]);
        assert_eq!([1, 2, 3].as_vector().len(), 3);
        let t = Tensor::filled(Shape::from_slice(&[3]).unwrap(), 1i64);
        assert_eq!(t.as_vector(), &[1, 1, 1]);
    }

    #[test]
    fn test_matrix_ref() {
        let data = [1, 2, 3, 4, 5, 6];
        let m = MatrixRef::row_major(&data, 2, 3).unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 3));
        assert_eq!(m.strides(), [3, 1]);

        let t = Tensor::from_matrix(&m).unwrap();
        assert_eq!(t[[0, 2]], 3);
        assert_eq!(t[[1, 0]], 4);
        assert_eq!(t.data(), &[1, 4, 2, 5, 3, 6]);

        let c = MatrixRef::column_major(&data, 2, 3).unwrap();
        assert_eq!(Tensor::from_matrix(&c).unwrap().data(), &data);

        assert!(matches!(
            MatrixRef::row_major(&data, 3, 3),
            Err(TensorError::SizeMismatch { expected: 9, got: 6 })
        ));
        assert!(MatrixRef::row_major(&data, 0, 3).is_err());
    }

    #[test]
    fn test_tensor_as_matrix() {
        let t = Tensor::<f64>::with_order(
            Shape::from_slice(&[2, 3]).unwrap(),
            StorageOrder::LastOrder,
        );
        let m = t.as_matrix().unwrap();
        assert_eq!(m.strides(), [3, 1]);

        let t = Tensor::<f64>::new(Shape::from_slice(&[2, 3, 4]).unwrap());
        assert!(matches!(
            t.as_matrix(),
            Err(TensorError::RankMismatch { expected: 2, got: 3 })
        ));
    }
}
