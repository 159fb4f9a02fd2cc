//! `nt-kernels` - strided traversal and contraction kernels for ntensor.
//!
//! This crate provides:
//! - The `Element` trait and `DType` descriptor for supported element types
//! - `StridedRef` / `StridedMut` operands: a flat slice plus extents and strides
//! - Layout-to-layout `copy` and axis permutation (`trans`)
//! - Contraction kernels: `mtv`, `mtm`, `ttv`, `ttm`, `inner`, `outer`, `ttt`
//!
//! The kernels know nothing about shapes or layouts beyond the stride
//! tables they are handed, so any storage order works.

pub mod algorithms;
pub mod contraction;
pub mod element;
pub mod error;
pub mod operand;

pub use algorithms::{copy, trans};
pub use contraction::{inner, mtm, mtv, outer, ttm, ttt, ttv};
pub use element::{DType, Element};
pub use error::{KernelError, Result};
pub use operand::{max_offset, StridedMut, StridedRef};
