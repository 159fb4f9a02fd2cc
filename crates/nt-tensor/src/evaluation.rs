//! Materializing expressions into tensors.
//!
//! Every output index is independent, so the per-index loop runs on the
//! rayon pool once the destination is large enough.

use nt_kernels::Element;
use rayon::prelude::*;
use tracing::trace;

use crate::error::{Result, TensorError};
use crate::expression::{BinaryOp, Expr};
use crate::tensor::Tensor;

/// Below this many elements the evaluation loop stays on the calling thread.
pub const DEFAULT_MIN_PARALLEL_LEN: usize = 32 * 1024;

/// Controls how expressions are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Allow the rayon pool to be used at all.
    pub parallel: bool,
    /// Minimum destination length for a parallel loop.
    pub min_parallel_len: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            parallel: true,
            min_parallel_len: DEFAULT_MIN_PARALLEL_LEN,
        }
    }
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequential evaluation regardless of size.
    pub fn sequential() -> Self {
        Self::default().with_parallel(false)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_min_parallel_len(mut self, len: usize) -> Self {
        self.min_parallel_len = len;
        self
    }

    fn use_parallel(&self, len: usize) -> bool {
        self.parallel && len >= self.min_parallel_len
    }
}

/// Writes expressions into destination tensors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        Evaluator { config }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// `dst[i] = expr.value_at(i)` for every index.
    ///
    /// An empty destination adopts the shape and storage order shared by
    /// the tensors in `expr`. Any other destination must already have them;
    /// on a mismatch nothing is written.
    pub fn assign<T: Element>(&self, dst: &mut Tensor<T>, expr: &Expr<'_, T>) -> Result<()> {
        let (shape, order) = expr.verify()?;
        if dst.rank() == 0 {
            dst.reset(shape.clone(), order);
        } else {
            expr.check(dst.shape(), dst.order())?;
        }
        self.run(dst.data_mut(), |i, v| *v = expr.value_at(i));
        Ok(())
    }

    /// `dst[i] = op(dst[i], expr.value_at(i))` for every index.
    ///
    /// The destination must already have the shape and storage order of the
    /// expression, even when empty.
    pub fn assign_op<T: Element>(
        &self,
        dst: &mut Tensor<T>,
        expr: &Expr<'_, T>,
        op: BinaryOp,
    ) -> Result<()> {
        let (shape, order) = expr.verify()?;
        if dst.shape() != shape {
            return Err(TensorError::ShapeMismatch {
                expected: shape.dims().to_vec(),
                got: dst.shape().dims().to_vec(),
            });
        }
        if dst.order() != order {
            return Err(TensorError::OrderMismatch {
                expected: order.to_string(),
                got: dst.order().to_string(),
            });
        }
        self.run(dst.data_mut(), |i, v| *v = op.apply(*v, expr.value_at(i)));
        Ok(())
    }

    /// Evaluates `expr` into a fresh tensor.
    pub fn materialize<T: Element>(&self, expr: &Expr<'_, T>) -> Result<Tensor<T>> {
        let mut out = Tensor::empty();
        self.assign(&mut out, expr)?;
        Ok(out)
    }

    fn run<T, F>(&self, out: &mut [T], f: F)
    where
        T: Element,
        F: Fn(usize, &mut T) + Sync + Send,
    {
        let parallel = self.config.use_parallel(out.len());
        trace!(len = out.len(), parallel, "evaluating expression");
        if parallel {
            out.par_iter_mut().enumerate().for_each(|(i, v)| f(i, v));
        } else {
            out.iter_mut().enumerate().for_each(|(i, v)| f(i, v));
        }
    }
}

impl<T: Element> Tensor<T> {
    /// Builds a tensor from an expression; its shape and storage order are
    /// those of the tensors the expression reads.
    pub fn from_expr(expr: &Expr<'_, T>) -> Result<Self> {
        Evaluator::default().materialize(expr)
    }

    /// Overwrites this tensor with the value of `expr`; see
    /// [`Evaluator::assign`] for the shape rules.
    pub fn assign(&mut self, expr: &Expr<'_, T>) -> Result<()> {
        Evaluator::default().assign(self, expr)
    }

    pub fn add_assign_expr(&mut self, expr: &Expr<'_, T>) -> Result<()> {
        Evaluator::default().assign_op(self, expr, BinaryOp::Add)
    }

    pub fn sub_assign_expr(&mut self, expr: &Expr<'_, T>) -> Result<()> {
        Evaluator::default().assign_op(self, expr, BinaryOp::Sub)
    }

    pub fn mul_assign_expr(&mut self, expr: &Expr<'_, T>) -> Result<()> {
        Evaluator::default().assign_op(self, expr, BinaryOp::Mul)
    }

    pub fn div_assign_expr(&mut self, expr: &Expr<'_, T>) -> Result<()> {
        Evaluator::default().assign_op(self, expr, BinaryOp::Div)
    }
}

impl<'a, T: Element> Expr<'a, T> {
    /// Shorthand for [`Tensor::from_expr`].
    pub fn eval(&self) -> Result<Tensor<T>> {
        Tensor::from_expr(self)
    }
}
