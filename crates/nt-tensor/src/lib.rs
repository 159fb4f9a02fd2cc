//! `nt-tensor` - dense N-dimensional tensors for ntensor.
//!
//! This crate provides:
//! - `Shape`, `Layout`/`StorageOrder` and the derived `Strides`
//! - A `Tensor<T>` owning a flat buffer in first or last storage order
//! - Products: `ttv`, `ttm`, `ttt`, `inner_prod`, `outer_prod`, `trans`
//! - Label-driven contraction through `Tensor::indexed`
//! - Lazy elementwise expressions (`&a + &b * 2.0`) and their evaluator
//!
//! The strided kernels live in `nt-kernels`; this crate sizes outputs,
//! checks operands and wires tensors into them.

pub mod access;
pub mod error;
pub mod evaluation;
pub mod expression;
pub mod functions;
pub mod layout;
pub mod multi_index;
pub mod operand;
pub mod shape;
pub mod strides;
pub mod tensor;

// Re-export primary types at the crate root for convenience.
pub use error::{Result, TensorError};
pub use evaluation::{EvalConfig, Evaluator};
pub use expression::{BinaryOp, Expr, Side, UnaryOp};
pub use functions::{inner_prod, outer_prod, trans, ttm, ttt, ttv};
pub use layout::{Layout, StorageOrder};
pub use multi_index::{extract_corresponding_indices, Indexed, Label, MultiIndex};
pub use nt_kernels::{DType, Element, KernelError};
pub use operand::{MatrixOperand, MatrixRef, VectorOperand};
pub use shape::Shape;
pub use strides::Strides;
pub use tensor::Tensor;
