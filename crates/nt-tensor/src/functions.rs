//! Tensor-level products.
//!
//! Each function checks its operands, sizes and zeroes a fresh output in
//! the storage order of the left operand, then hands the raw strided views
//! to the matching kernel in `nt_kernels`.

use nt_kernels::{Element, StridedRef};
use tracing::debug;

use crate::error::{Result, TensorError};
use crate::layout::Layout;
use crate::operand::{MatrixOperand, VectorOperand};
use crate::shape::Shape;
use crate::tensor::Tensor;

fn non_empty<T: Element>(t: &Tensor<T>, name: &'static str) -> Result<()> {
    if t.is_empty() {
        return Err(TensorError::EmptyOperand(name));
    }
    Ok(())
}

fn check_mode(m: usize, p: usize) -> Result<()> {
    if m == 0 || m > p {
        return Err(TensorError::InvalidMode { mode: m, rank: p });
    }
    Ok(())
}

/// Pads `dims` with unit extents up to rank 2.
fn padded(mut dims: Vec<usize>) -> Result<Shape> {
    while dims.len() < 2 {
        dims.push(1);
    }
    Shape::new(dims)
}

/// Tensor-times-vector along one-based mode `m`.
///
/// The result drops mode `m` of `a`; its rank is floored at 2.
pub fn ttv<T, V>(m: usize, a: &Tensor<T>, b: &V) -> Result<Tensor<T>>
where
    T: Element,
    V: VectorOperand<T> + ?Sized,
{
    non_empty(a, "tensor")?;
    let b = b.as_vector();
    if b.is_empty() {
        return Err(TensorError::EmptyOperand("vector"));
    }
    let p = a.rank();
    check_mode(m, p)?;
    debug!(op = "ttv", mode = m, a = %a.shape(), len = b.len(), dtype = %a.dtype(), "product");

    let mut nc = a.shape().dims().to_vec();
    nc.remove(m - 1);
    let mut c = Tensor::with_order(padded(nc)?, a.order());
    let nb = [b.len(), 1];
    nt_kernels::ttv(
        m,
        c.as_strided_mut(),
        a.as_strided(),
        StridedRef::new(b, &nb, &[1, 1]),
    )?;
    Ok(c)
}

/// Tensor-times-matrix along one-based mode `m`.
///
/// The result keeps the shape of `a` except that mode `m` takes the row
/// count of `b`; `b`'s column count must equal `a`'s extent at `m`.
pub fn ttm<T, M>(m: usize, a: &Tensor<T>, b: &M) -> Result<Tensor<T>>
where
    T: Element,
    M: MatrixOperand<T> + ?Sized,
{
    non_empty(a, "tensor")?;
    let b = b.as_matrix()?;
    if b.data().is_empty() {
        return Err(TensorError::EmptyOperand("matrix"));
    }
    let p = a.rank();
    check_mode(m, p)?;
    debug!(
        op = "ttm",
        mode = m,
        a = %a.shape(),
        rows = b.rows(),
        cols = b.cols(),
        dtype = %a.dtype(),
        "product"
    );

    let mut nc = a.shape().dims().to_vec();
    nc[m - 1] = b.rows();
    let mut c = Tensor::with_order(Shape::new(nc)?, a.order());
    nt_kernels::ttm(m, c.as_strided_mut(), a.as_strided(), b.as_strided())?;
    Ok(c)
}

/// Tensor-times-tensor over paired one-based modes.
///
/// Mode `phia[k]` of `a` is contracted against mode `phib[k]` of `b`. The
/// result holds the remaining modes of `a` followed by those of `b`, each
/// in ascending order; an empty pairing is the outer product.
pub fn ttt<T: Element>(
    a: &Tensor<T>,
    b: &Tensor<T>,
    phia: &[usize],
    phib: &[usize],
) -> Result<Tensor<T>> {
    non_empty(a, "left")?;
    non_empty(b, "right")?;
    if phia.len() != phib.len() {
        return Err(TensorError::ContractionDefinition(format!(
            "{} modes of the left operand paired with {} of the right",
            phia.len(),
            phib.len()
        )));
    }
    let q = phia.len();
    if q == 0 {
        return outer_prod(a, b);
    }
    let perm_a = free_first(phia, a.rank())?;
    let perm_b = free_first(phib, b.rank())?;
    let (na, nb) = (a.shape().dims(), b.shape().dims());
    for (&ma, &mb) in phia.iter().zip(phib) {
        if na[ma - 1] != nb[mb - 1] {
            return Err(TensorError::ContractionDefinition(format!(
                "mode {} of extent {} cannot contract with mode {} of extent {}",
                ma,
                na[ma - 1],
                mb,
                nb[mb - 1]
            )));
        }
    }
    debug!(op = "ttt", a = %a.shape(), b = %b.shape(), ?phia, ?phib, dtype = %a.dtype(), "product");

    let (r, s) = (a.rank() - q, b.rank() - q);
    let nc: Vec<usize> = perm_a[..r]
        .iter()
        .map(|&k| na[k - 1])
        .chain(perm_b[..s].iter().map(|&k| nb[k - 1]))
        .collect();
    let mut c = Tensor::with_order(padded(nc)?, a.order());
    nt_kernels::ttt(
        c.as_strided_mut(),
        a.as_strided(),
        b.as_strided(),
        &perm_a,
        &perm_b,
        q,
    )?;
    Ok(c)
}

/// Builds the full mode permutation: modes not in `phi` ascending, then
/// `phi` itself.
fn free_first(phi: &[usize], p: usize) -> Result<Vec<usize>> {
    let mut used = vec![false; p];
    for &k in phi {
        if k == 0 || k > p {
            return Err(TensorError::InvalidMode { mode: k, rank: p });
        }
        if used[k - 1] {
            return Err(TensorError::ContractionDefinition(format!(
                "mode {} contracted twice",
                k
            )));
        }
        used[k - 1] = true;
    }
    let mut perm: Vec<usize> = (1..=p).filter(|&k| !used[k - 1]).collect();
    perm.extend_from_slice(phi);
    Ok(perm)
}

/// Sum of the elementwise products of two equally shaped tensors.
pub fn inner_prod<T: Element>(a: &Tensor<T>, b: &Tensor<T>) -> Result<T> {
    non_empty(a, "left")?;
    non_empty(b, "right")?;
    if a.shape() != b.shape() {
        return Err(TensorError::ShapeMismatch {
            expected: a.shape().dims().to_vec(),
            got: b.shape().dims().to_vec(),
        });
    }
    debug!(op = "inner", a = %a.shape(), dtype = %a.dtype(), "product");
    Ok(nt_kernels::inner(a.as_strided(), b.as_strided())?)
}

/// Outer product; the result shape concatenates the shapes of `a` and `b`.
pub fn outer_prod<T: Element>(a: &Tensor<T>, b: &Tensor<T>) -> Result<Tensor<T>> {
    non_empty(a, "left")?;
    non_empty(b, "right")?;
    debug!(op = "outer", a = %a.shape(), b = %b.shape(), dtype = %a.dtype(), "product");

    let nc: Vec<usize> = a
        .shape()
        .dims()
        .iter()
        .chain(b.shape().dims())
        .copied()
        .collect();
    let mut c = Tensor::with_order(Shape::new(nc)?, a.order());
    nt_kernels::outer(c.as_strided_mut(), a.as_strided(), b.as_strided())?;
    Ok(c)
}

/// Transposes `a` by the one-based permutation `tau`: axis `r` of `a`
/// becomes axis `tau[r] - 1` of the result.
pub fn trans<T: Element>(a: &Tensor<T>, tau: &[usize]) -> Result<Tensor<T>> {
    non_empty(a, "tensor")?;
    let p = a.rank();
    if tau.len() != p {
        return Err(TensorError::RankMismatch {
            expected: p,
            got: tau.len(),
        });
    }
    Layout::new(tau.to_vec())?;
    debug!(op = "trans", a = %a.shape(), ?tau, "permutation");

    let na = a.shape().dims();
    let mut nc = vec![0; p];
    for (r, &t) in tau.iter().enumerate() {
        nc[t - 1] = na[r];
    }
    let mut c = Tensor::with_order(Shape::new(nc)?, a.order());
    nt_kernels::trans(c.as_strided_mut(), a.as_strided(), tau)?;
    Ok(c)
}
