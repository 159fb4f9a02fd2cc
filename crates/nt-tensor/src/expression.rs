//! Lazy elementwise expressions over tensors and scalars.
//!
//! Arithmetic on `&Tensor` values builds an [`Expr`] tree that only borrows
//! its operands. Nothing is computed until the tree is handed to an
//! evaluator, which calls [`Expr::value_at`] once per output index.

use std::ops::{Add, Div, Mul, Neg, Sub};

use half::f16;
use nt_kernels::Element;

use crate::error::{Result, TensorError};
use crate::layout::StorageOrder;
use crate::shape::Shape;
use crate::tensor::Tensor;

/// Elementwise binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    #[inline]
    pub fn apply<T: Element>(self, a: T, b: T) -> T {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

impl UnaryOp {
    #[inline]
    pub fn apply<T: Element>(self, a: T) -> T {
        match self {
            UnaryOp::Neg => -a,
        }
    }
}

/// Which side of the operator a scalar sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// An expression tree borrowing every tensor it reads.
#[derive(Debug, Clone)]
pub enum Expr<'a, T> {
    Tensor(&'a Tensor<T>),
    Binary {
        lhs: Box<Expr<'a, T>>,
        rhs: Box<Expr<'a, T>>,
        op: BinaryOp,
    },
    Unary {
        operand: Box<Expr<'a, T>>,
        op: UnaryOp,
    },
    ScalarCombine {
        operand: Box<Expr<'a, T>>,
        scalar: T,
        op: BinaryOp,
        side: Side,
    },
}

impl<'a, T: Element> Expr<'a, T> {
    pub fn binary(lhs: Expr<'a, T>, rhs: Expr<'a, T>, op: BinaryOp) -> Self {
        Expr::Binary {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            op,
        }
    }

    pub fn unary(operand: Expr<'a, T>, op: UnaryOp) -> Self {
        Expr::Unary {
            operand: Box::new(operand),
            op,
        }
    }

    pub fn scalar(operand: Expr<'a, T>, scalar: T, op: BinaryOp, side: Side) -> Self {
        Expr::ScalarCombine {
            operand: Box::new(operand),
            scalar,
            op,
            side,
        }
    }

    /// Evaluates the tree at linear index `i`.
    ///
    /// # Panics
    /// Panics if `i` is outside any tensor leaf; run [`Expr::verify`] first.
    pub fn value_at(&self, i: usize) -> T {
        match self {
            Expr::Tensor(t) => t[i],
            Expr::Binary { lhs, rhs, op } => op.apply(lhs.value_at(i), rhs.value_at(i)),
            Expr::Unary { operand, op } => op.apply(operand.value_at(i)),
            Expr::ScalarCombine {
                operand,
                scalar,
                op,
                side,
            } => match side {
                Side::Left => op.apply(*scalar, operand.value_at(i)),
                Side::Right => op.apply(operand.value_at(i), *scalar),
            },
        }
    }

    /// The first tensor leaf, searching left to right.
    pub fn first_tensor(&self) -> &'a Tensor<T> {
        match self {
            Expr::Tensor(t) => *t,
            Expr::Binary { lhs, .. } => lhs.first_tensor(),
            Expr::Unary { operand, .. } | Expr::ScalarCombine { operand, .. } => {
                operand.first_tensor()
            }
        }
    }

    /// Shape of the expression, taken from its first tensor leaf.
    pub fn shape(&self) -> &'a Shape {
        self.first_tensor().shape()
    }

    pub fn order(&self) -> StorageOrder {
        self.first_tensor().order()
    }

    fn for_each_tensor<F: FnMut(&'a Tensor<T>) -> Result<()>>(&self, f: &mut F) -> Result<()> {
        match self {
            Expr::Tensor(t) => f(*t),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.for_each_tensor(f)?;
                rhs.for_each_tensor(f)
            }
            Expr::Unary { operand, .. } | Expr::ScalarCombine { operand, .. } => {
                operand.for_each_tensor(f)
            }
        }
    }

    /// Checks that every tensor leaf has `shape` and `order`.
    pub fn check(&self, shape: &Shape, order: StorageOrder) -> Result<()> {
        self.for_each_tensor(&mut |t| {
            if t.shape() != shape {
                return Err(TensorError::ShapeMismatch {
                    expected: shape.dims().to_vec(),
                    got: t.shape().dims().to_vec(),
                });
            }
            if t.order() != order {
                return Err(TensorError::OrderMismatch {
                    expected: order.to_string(),
                    got: t.order().to_string(),
                });
            }
            Ok(())
        })
    }

    /// Checks that all tensor leaves agree and returns their common shape
    /// and storage order.
    pub fn verify(&self) -> Result<(&'a Shape, StorageOrder)> {
        let (shape, order) = (self.shape(), self.order());
        self.check(shape, order)?;
        Ok((shape, order))
    }

    /// Whether `pred` holds at every index of two compatible expressions.
    pub fn compare<F>(&self, other: &Expr<'_, T>, pred: F) -> Result<bool>
    where
        F: Fn(T, T) -> bool,
    {
        let (shape, order) = self.verify()?;
        other.check(shape, order)?;
        Ok((0..shape.numel()).all(|i| pred(self.value_at(i), other.value_at(i))))
    }
}

impl<'a, T> From<&'a Tensor<T>> for Expr<'a, T> {
    fn from(t: &'a Tensor<T>) -> Self {
        Expr::Tensor(t)
    }
}

impl<T: Element> Tensor<T> {
    /// A leaf expression reading this tensor.
    pub fn expr(&self) -> Expr<'_, T> {
        Expr::Tensor(self)
    }
}

macro_rules! impl_binary {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<'a, T: Element> $trait<Expr<'a, T>> for Expr<'a, T> {
            type Output = Expr<'a, T>;

            fn $method(self, rhs: Expr<'a, T>) -> Expr<'a, T> {
                Expr::binary(self, rhs, $op)
            }
        }

        impl<'a, T: Element> $trait<&'a Tensor<T>> for Expr<'a, T> {
            type Output = Expr<'a, T>;

            fn $method(self, rhs: &'a Tensor<T>) -> Expr<'a, T> {
                Expr::binary(self, Expr::Tensor(rhs), $op)
            }
        }

        impl<'a, T: Element> $trait<Expr<'a, T>> for &'a Tensor<T> {
            type Output = Expr<'a, T>;

            fn $method(self, rhs: Expr<'a, T>) -> Expr<'a, T> {
                Expr::binary(Expr::Tensor(self), rhs, $op)
            }
        }

        impl<'a, T: Element> $trait<&'a Tensor<T>> for &'a Tensor<T> {
            type Output = Expr<'a, T>;

            fn $method(self, rhs: &'a Tensor<T>) -> Expr<'a, T> {
                Expr::binary(Expr::Tensor(self), Expr::Tensor(rhs), $op)
            }
        }
    };
}

impl_binary!(Add, add, BinaryOp::Add);
impl_binary!(Sub, sub, BinaryOp::Sub);
impl_binary!(Mul, mul, BinaryOp::Mul);
impl_binary!(Div, div, BinaryOp::Div);

impl<'a, T: Element> Neg for Expr<'a, T> {
    type Output = Expr<'a, T>;

    fn neg(self) -> Expr<'a, T> {
        Expr::unary(self, UnaryOp::Neg)
    }
}

impl<'a, T: Element> Neg for &'a Tensor<T> {
    type Output = Expr<'a, T>;

    fn neg(self) -> Expr<'a, T> {
        Expr::unary(Expr::Tensor(self), UnaryOp::Neg)
    }
}

// Scalar operands, one concrete element type at a time.
macro_rules! impl_scalar {
    ($scalar:ty; $($trait:ident, $method:ident, $op:expr);+) => {
        $(
            impl<'a> $trait<$scalar> for Expr<'a, $scalar> {
                type Output = Expr<'a, $scalar>;

                fn $method(self, rhs: $scalar) -> Expr<'a, $scalar> {
                    Expr::scalar(self, rhs, $op, Side::Right)
                }
            }

            impl<'a> $trait<$scalar> for &'a Tensor<$scalar> {
                type Output = Expr<'a, $scalar>;

                fn $method(self, rhs: $scalar) -> Expr<'a, $scalar> {
                    Expr::scalar(Expr::Tensor(self), rhs, $op, Side::Right)
                }
            }

            impl<'a> $trait<Expr<'a, $scalar>> for $scalar {
                type Output = Expr<'a, $scalar>;

                fn $method(self, rhs: Expr<'a, $scalar>) -> Expr<'a, $scalar> {
                    Expr::scalar(rhs, self, $op, Side::Left)
                }
            }

            impl<'a> $trait<&'a Tensor<$scalar>> for $scalar {
                type Output = Expr<'a, $scalar>;

                fn $method(self, rhs: &'a Tensor<$scalar>) -> Expr<'a, $scalar> {
                    Expr::scalar(Expr::Tensor(rhs), self, $op, Side::Left)
                }
            }
        )+
    };
}

macro_rules! impl_scalar_ops {
    ($($scalar:ty),+) => {
        $(
            impl_scalar!($scalar;
                Add, add, BinaryOp::Add;
                Sub, sub, BinaryOp::Sub;
                Mul, mul, BinaryOp::Mul;
                Div, div, BinaryOp::Div);
        )+
    };
}

impl_scalar_ops!(f16, f32, f64, i32, i64);
