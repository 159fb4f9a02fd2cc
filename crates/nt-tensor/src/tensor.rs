use std::ops::{AddAssign, DivAssign, Index, IndexMut, MulAssign, SubAssign};

use nt_kernels::{DType, Element, StridedMut, StridedRef};

use crate::access;
use crate::error::{Result, TensorError};
use crate::layout::StorageOrder;
use crate::shape::Shape;
use crate::strides::Strides;

/// A dense tensor owning a flat buffer.
///
/// The buffer holds exactly `shape.numel()` elements laid out according to
/// the tensor's storage order; the strides are derived from both and are
/// recomputed whenever the shape changes.
#[derive(Debug, Clone)]
pub struct Tensor<T> {
    shape: Shape,
    strides: Strides,
    order: StorageOrder,
    data: Vec<T>,
}

impl<T: Element> Tensor<T> {
    /// Create a zero-filled first-order tensor.
    pub fn new(shape: Shape) -> Self {
        Self::filled(shape, T::zero())
    }

    /// Create a first-order tensor with every element set to `value`.
    pub fn filled(shape: Shape, value: T) -> Self {
        let data = vec![value; shape.numel()];
        Self::assemble(shape, StorageOrder::FirstOrder, data)
    }

    /// Create a zero-filled tensor in the given storage order.
    pub fn with_order(shape: Shape, order: StorageOrder) -> Self {
        let data = vec![T::zero(); shape.numel()];
        Self::assemble(shape, order, data)
    }

    /// Wrap a donor buffer laid out in first order.
    pub fn from_vec(shape: Shape, data: Vec<T>) -> Result<Self> {
        Self::from_vec_with_order(shape, StorageOrder::FirstOrder, data)
    }

    /// Wrap a donor buffer laid out in `order`.
    ///
    /// Fails with `SizeMismatch` if the buffer length differs from the
    /// element count of `shape`.
    pub fn from_vec_with_order(shape: Shape, order: StorageOrder, data: Vec<T>) -> Result<Self> {
        if data.len() != shape.numel() {
            return Err(TensorError::SizeMismatch {
                expected: shape.numel(),
                got: data.len(),
            });
        }
        Ok(Self::assemble(shape, order, data))
    }

    /// The rank-0 tensor without elements.
    pub fn empty() -> Self {
        Self::assemble(Shape::empty(), StorageOrder::FirstOrder, Vec::new())
    }

    fn assemble(shape: Shape, order: StorageOrder, data: Vec<T>) -> Self {
        let strides = Strides::from_order(&shape, order);
        Tensor {
            shape,
            strides,
            order,
            data,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &Strides {
        &self.strides
    }

    pub fn order(&self) -> StorageOrder {
        self.order
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Iterates the buffer in storage order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Replaces the shape in place.
    ///
    /// The first `min(old, new)` elements keep their flat positions; slots
    /// beyond the old length are set to `fill`.
    pub fn reshape(&mut self, shape: Shape, fill: T) {
        self.data.resize(shape.numel(), fill);
        self.strides = Strides::from_order(&shape, self.order);
        self.shape = shape;
    }

    /// Adopts `shape` and `order`, resizing the buffer with zeros. Existing
    /// values are left in place and are expected to be overwritten.
    pub(crate) fn reset(&mut self, shape: Shape, order: StorageOrder) {
        self.data.resize(shape.numel(), T::zero());
        self.strides = Strides::from_order(&shape, order);
        self.shape = shape;
        self.order = order;
    }

    /// Bounds-checked element access by multi-index.
    pub fn at(&self, index: &[usize]) -> Result<&T> {
        let o = access::checked_offset(self.shape.dims(), self.strides.as_slice(), index)?;
        Ok(&self.data[o])
    }

    pub fn at_mut(&mut self, index: &[usize]) -> Result<&mut T> {
        let o = access::checked_offset(self.shape.dims(), self.strides.as_slice(), index)?;
        Ok(&mut self.data[o])
    }

    /// Copies the tensor into the other canonical storage order.
    pub fn to_order(&self, order: StorageOrder) -> Result<Self> {
        if order == self.order {
            return Ok(self.clone());
        }
        let mut out = Self::with_order(self.shape.clone(), order);
        if self.is_empty() {
            return Ok(out);
        }
        nt_kernels::copy(out.as_strided_mut(), self.as_strided())?;
        Ok(out)
    }

    pub fn as_strided(&self) -> StridedRef<'_, T> {
        StridedRef::new(&self.data, self.shape.dims(), self.strides.as_slice())
    }

    pub fn as_strided_mut(&mut self) -> StridedMut<'_, T> {
        StridedMut::new(&mut self.data, self.shape.dims(), self.strides.as_slice())
    }
}

impl<T: Element> Default for Tensor<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Equal shapes and equal elements at every multi-index, whatever the
/// storage orders.
impl<T: Element> PartialEq for Tensor<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.shape != other.shape {
            return false;
        }
        if self.order == other.order {
            return self.data == other.data;
        }
        match other.to_order(self.order) {
            Ok(o) => self.data == o.data,
            Err(_) => false,
        }
    }
}

impl<T> Index<usize> for Tensor<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T> IndexMut<usize> for Tensor<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}

impl<T, const N: usize> Index<[usize; N]> for Tensor<T> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        &self.data[access::offset(self.strides.as_slice(), &index)]
    }
}

impl<T, const N: usize> IndexMut<[usize; N]> for Tensor<T> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        let o = access::offset(self.strides.as_slice(), &index);
        &mut self.data[o]
    }
}

impl<'a, T> IntoIterator for &'a Tensor<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

macro_rules! impl_scalar_assign {
    ($trait:ident, $method:ident) => {
        impl<T: Element> $trait<T> for Tensor<T> {
            fn $method(&mut self, rhs: T) {
                for v in self.data.iter_mut() {
                    v.$method(rhs);
                }
            }
        }
    };
}

impl_scalar_assign!(AddAssign, add_assign);
impl_scalar_assign!(SubAssign, sub_assign);
impl_scalar_assign!(MulAssign, mul_assign);
impl_scalar_assign!(DivAssign, div_assign);

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    fn shape(dims: &[usize]) -> Shape {
        Shape::from_slice(dims).unwrap()
    }

    #[test]
    fn test_new_tensor() {
        let t = Tensor::<f32>::new(shape(&[2, 3]));
        assert_eq!(t.rank(), 2);
        assert_eq!(t.len(), 6);
        assert_eq!(t.dtype(), DType::F32);
        assert_eq!(t.order(), StorageOrder::FirstOrder);
        assert_eq!(t.strides().as_slice(), &[1, 2]);
        assert!(t.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_filled_and_orders() {
        let t = Tensor::filled(shape(&[2, 3, 4]), 7i32);
        assert!(t.iter().all(|&v| v == 7));

        let t = Tensor::<f64>::with_order(shape(&[2, 3, 4]), StorageOrder::LastOrder);
        assert_eq!(t.strides().as_slice(), &[12, 4, 1]);

        let t = Tensor::filled(shape(&[2, 2]), f16::from_f32(1.5));
        assert_eq!(t.dtype(), DType::F16);
        assert_eq!(t[[1, 1]], f16::from_f32(1.5));
    }

    #[test]
    fn test_from_vec() {
        let t = Tensor::from_vec(shape(&[2, 3]), vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(t[[0, 0]], 1);
        assert_eq!(t[[1, 0]], 2);
        assert_eq!(t[[0, 1]], 3);
        assert_eq!(t[[1, 2]], 6);
        assert_eq!(t[5], 6);

        let err = Tensor::from_vec(shape(&[2, 3]), vec![1, 2]);
        assert_eq!(
            err,
            Err(TensorError::SizeMismatch {
                expected: 6,
                got: 2
            })
        );
    }

    #[test]
    fn test_empty() {
        let t = Tensor::<f32>::empty();
        assert!(t.is_empty());
        assert_eq!(t.rank(), 0);
        assert_eq!(t, Tensor::default());
    }

    #[test]
    fn test_reshape_preserves_prefix() {
        let mut t = Tensor::from_vec(shape(&[2, 3]), (1..=6).collect::<Vec<i64>>()).unwrap();
        t.reshape(shape(&[2, 4]), -1);
        assert_eq!(t.data(), &[1, 2, 3, 4, 5, 6, -1, -1]);
        assert_eq!(t.strides().as_slice(), &[1, 2]);

        t.reshape(shape(&[3, 1]), 0);
        assert_eq!(t.data(), &[1, 2, 3]);
        assert!(t.shape().is_vector());
        assert_eq!(t.strides().as_slice(), &[1, 1]);
    }

    #[test]
    fn test_checked_access() {
        let mut t = Tensor::<f32>::new(shape(&[2, 3]));
        *t.at_mut(&[1, 2]).unwrap() = 4.0;
        assert_eq!(*t.at(&[1, 2]).unwrap(), 4.0);
        assert_eq!(t[[1, 2]], 4.0);
        assert!(matches!(
            t.at(&[2, 0]),
            Err(TensorError::IndexOutOfRange { .. })
        ));
        assert!(t.at(&[0, 0, 0]).is_err());
    }

    #[test]
    fn test_to_order_round_trip() {
        let t = Tensor::from_vec(shape(&[2, 3, 2]), (0..12).collect::<Vec<i32>>()).unwrap();
        let l = t.to_order(StorageOrder::LastOrder).unwrap();
        assert_eq!(l.order(), StorageOrder::LastOrder);
        assert_ne!(l.data(), t.data());
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..2 {
                    assert_eq!(t[[i, j, k]], l[[i, j, k]]);
                }
            }
        }
        assert_eq!(l, t);
        let back = l.to_order(StorageOrder::FirstOrder).unwrap();
        assert_eq!(back.data(), t.data());
    }

    #[test]
    fn test_scalar_assign() {
        let mut t = Tensor::filled(shape(&[2, 2]), 2.0f64);
        t += 1.0;
        t *= 4.0;
        t -= 2.0;
        t /= 5.0;
        assert!(t.iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_eq() {
        let a = Tensor::filled(shape(&[2, 3]), 1);
        let b = Tensor::filled(shape(&[3, 2]), 1);
        assert_ne!(a, b);
        let mut c = a.clone();
        c[0] = 2;
        assert_ne!(a, c);
    }
}
