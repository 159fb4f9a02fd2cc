//! Contraction kernels over strided operands.
//!
//! Every kernel that reduces (`mtv`, `mtm`, `ttv`, `ttm`, `ttt`) accumulates
//! into `c` with `+=`, so callers hand in a zeroed output. All shape checks
//! run before the first write. Modes are one-based at this interface.

use crate::element::Element;
use crate::error::{KernelError, Result};
use crate::operand::{validate_permutation, StridedMut, StridedRef};

fn check_mode(m: usize, p: usize) -> Result<()> {
    if p == 0 {
        return Err(KernelError::ZeroRank);
    }
    if m == 0 || m > p {
        return Err(KernelError::InvalidMode { mode: m, rank: p });
    }
    Ok(())
}

fn check_extent(what: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(KernelError::ExtentMismatch {
            what,
            expected,
            got,
        });
    }
    Ok(())
}

fn check_rank(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(KernelError::RankMismatch { expected, got });
    }
    Ok(())
}

/// Output extents past the meaningful ones must be padding.
fn check_padding(nc: &[usize], from: usize) -> Result<()> {
    for &n in &nc[from.min(nc.len())..] {
        check_extent("padding", 1, n)?;
    }
    Ok(())
}

/// Tensor-times-vector along one-based mode `m`.
///
/// `C[i1, .., i(m-1), i(m+1), .., ip] += sum_k A[i1, .., k, .., ip] * b[k]`.
/// `c` has rank `max(p - 1, 2)`; the vector is read contiguously and its
/// length is the larger of its two extents.
pub fn ttv<T: Element>(
    m: usize,
    c: StridedMut<'_, T>,
    a: StridedRef<'_, T>,
    b: StridedRef<'_, T>,
) -> Result<()> {
    let p = a.rank();
    check_mode(m, p)?;
    if p < 2 {
        return Err(KernelError::RankMismatch {
            expected: 2,
            got: p,
        });
    }
    c.validate("c")?;
    a.validate("a")?;
    b.validate("b")?;

    let (na, nc) = (a.extents(), c.extents());
    check_rank((p - 1).max(2), nc.len())?;
    for i in 0..m - 1 {
        check_extent("ttv free extent", na[i], nc[i])?;
    }
    for i in m..p {
        check_extent("ttv free extent", na[i], nc[i - 1])?;
    }
    check_padding(nc, p - 1)?;
    let len = b.extents().iter().copied().max().unwrap_or(0);
    check_extent("vector length", na[m - 1], len)?;

    let (data, _, wc) = c.into_parts();
    let walk = TtvWalk {
        m0: m - 1,
        na,
        wa: a.strides(),
        wc,
        b: b.data(),
    };
    if m != 1 && p > 2 {
        tracing::trace!(kernel = "ttv", mode = m, rank = p, "dispatch");
        walk.general(p - 1, p - 2, data, 0, a.data(), 0);
    } else if m == 1 && p > 2 {
        tracing::trace!(kernel = "ttv0", rank = p, "dispatch");
        walk.zero_mode(p - 1, data, 0, a.data(), 0);
    } else {
        tracing::trace!(kernel = "mtv", mode = m, "dispatch");
        walk.mtv(data, a.data());
    }
    Ok(())
}

struct TtvWalk<'s, T> {
    m0: usize,
    na: &'s [usize],
    wa: &'s [usize],
    wc: &'s [usize],
    b: &'s [T],
}

impl<T: Element> TtvWalk<'_, T> {
    fn reduce(&self, a: &[T], oa: usize) -> T {
        let mut sum = T::zero();
        for k in 0..self.na[self.m0] {
            sum += a[oa + k * self.wa[self.m0]] * self.b[k];
        }
        sum
    }

    fn mtv(&self, c: &mut [T], a: &[T]) {
        let o = 1 - self.m0;
        for i in 0..self.na[o] {
            c[i * self.wc[0]] += self.reduce(a, i * self.wa[o]);
        }
    }

    // `q` tracks the output axis matching input axis `r`; it lags by one
    // once the contracted axis has been passed.
    fn general(&self, r: usize, q: usize, c: &mut [T], oc: usize, a: &[T], oa: usize) {
        if r == self.m0 {
            self.general(r - 1, q, c, oc, a, oa);
        } else if r == 0 {
            for i in 0..self.na[0] {
                c[oc + i * self.wc[0]] += self.reduce(a, oa + i * self.wa[0]);
            }
        } else {
            for i in 0..self.na[r] {
                self.general(
                    r - 1,
                    q - 1,
                    c,
                    oc + i * self.wc[q],
                    a,
                    oa + i * self.wa[r],
                );
            }
        }
    }

    fn zero_mode(&self, r: usize, c: &mut [T], oc: usize, a: &[T], oa: usize) {
        if r > 1 {
            for i in 0..self.na[r] {
                self.zero_mode(r - 1, c, oc + i * self.wc[r - 1], a, oa + i * self.wa[r]);
            }
        } else {
            for i in 0..self.na[1] {
                c[oc + i * self.wc[0]] += self.reduce(a, oa + i * self.wa[1]);
            }
        }
    }
}

/// Tensor-times-matrix along one-based mode `m`.
///
/// `C[i1, .., j, .., ip] += sum_k A[i1, .., k, .., ip] * B[j, k]`, so `c`
/// has `A`'s extents except `nc[m-1] == nb[0]`.
pub fn ttm<T: Element>(
    m: usize,
    c: StridedMut<'_, T>,
    a: StridedRef<'_, T>,
    b: StridedRef<'_, T>,
) -> Result<()> {
    let p = a.rank();
    check_mode(m, p)?;
    if p < 2 {
        return Err(KernelError::RankMismatch {
            expected: 2,
            got: p,
        });
    }
    c.validate("c")?;
    a.validate("a")?;
    b.validate("b")?;

    let (na, nb, nc) = (a.extents(), b.extents(), c.extents());
    check_rank(2, nb.len())?;
    check_rank(p, nc.len())?;
    let m0 = m - 1;
    for i in (0..p).filter(|&i| i != m0) {
        check_extent("ttm free extent", na[i], nc[i])?;
    }
    check_extent("ttm contracted extent", nb[1], na[m0])?;
    check_extent("ttm output extent", nb[0], nc[m0])?;

    let (data, _, wc) = c.into_parts();
    let walk = TtmWalk {
        m0,
        na,
        nb,
        nc,
        wa: a.strides(),
        wb: b.strides(),
        wc,
        b: b.data(),
    };
    if m0 == 0 {
        tracing::trace!(kernel = "ttm0", rank = p, "dispatch");
        walk.zero_mode(p - 1, data, 0, a.data(), 0);
    } else {
        tracing::trace!(kernel = "ttm", mode = m, rank = p, "dispatch");
        walk.general(p - 1, data, 0, a.data(), 0);
    }
    Ok(())
}

struct TtmWalk<'s, T> {
    m0: usize,
    na: &'s [usize],
    nb: &'s [usize],
    nc: &'s [usize],
    wa: &'s [usize],
    wb: &'s [usize],
    wc: &'s [usize],
    b: &'s [T],
}

impl<T: Element> TtmWalk<'_, T> {
    /// Fills the output fibre along the mode axis for a fixed outer index.
    fn fibre(&self, c: &mut [T], oc: usize, a: &[T], oa: usize) {
        let m0 = self.m0;
        for j in 0..self.nc[m0] {
            let mut sum = T::zero();
            for k in 0..self.nb[1] {
                sum += a[oa + k * self.wa[m0]] * self.b[j * self.wb[0] + k * self.wb[1]];
            }
            c[oc + j * self.wc[m0]] += sum;
        }
    }

    fn general(&self, r: usize, c: &mut [T], oc: usize, a: &[T], oa: usize) {
        if r == self.m0 {
            self.general(r - 1, c, oc, a, oa);
        } else if r == 0 {
            for i in 0..self.nc[0] {
                self.fibre(c, oc + i * self.wc[0], a, oa + i * self.wa[0]);
            }
        } else {
            for i in 0..self.na[r] {
                self.general(r - 1, c, oc + i * self.wc[r], a, oa + i * self.wa[r]);
            }
        }
    }

    fn zero_mode(&self, r: usize, c: &mut [T], oc: usize, a: &[T], oa: usize) {
        if r > 1 {
            for i in 0..self.na[r] {
                self.zero_mode(r - 1, c, oc + i * self.wc[r], a, oa + i * self.wa[r]);
            }
        } else {
            for i in 0..self.nc[1] {
                self.fibre(c, oc + i * self.wc[1], a, oa + i * self.wa[1]);
            }
        }
    }
}

/// Matrix-times-vector along one-based mode `m` of a rank-2 `a`.
///
/// Mode 1 contracts rows, mode 2 contracts columns. `c` is an `[n, 1]`
/// column whose length is the surviving extent of `a`.
pub fn mtv<T: Element>(
    m: usize,
    c: StridedMut<'_, T>,
    a: StridedRef<'_, T>,
    b: StridedRef<'_, T>,
) -> Result<()> {
    check_rank(2, a.rank())?;
    ttv(m, c, a, b)
}

/// Matrix-times-matrix: `C[i, j] += sum_k A[i, k] * B[k, j]`.
pub fn mtm<T: Element>(
    c: StridedMut<'_, T>,
    a: StridedRef<'_, T>,
    b: StridedRef<'_, T>,
) -> Result<()> {
    check_rank(2, a.rank())?;
    check_rank(2, b.rank())?;
    check_rank(2, c.rank())?;
    c.validate("c")?;
    a.validate("a")?;
    b.validate("b")?;
    let (na, nb, nc) = (a.extents(), b.extents(), c.extents());
    check_extent("mtm inner extent", na[1], nb[0])?;
    check_extent("mtm rows", na[0], nc[0])?;
    check_extent("mtm columns", nb[1], nc[1])?;

    tracing::trace!(kernel = "mtm", m = na[0], k = na[1], n = nb[1], "dispatch");
    let (wa, wb) = (a.strides(), b.strides());
    let (a, b) = (a.data(), b.data());
    let (data, _, wc) = c.into_parts();
    for i in 0..nc[0] {
        for j in 0..nc[1] {
            let mut sum = T::zero();
            for k in 0..na[1] {
                sum += a[i * wa[0] + k * wa[1]] * b[k * wb[0] + j * wb[1]];
            }
            data[i * wc[0] + j * wc[1]] += sum;
        }
    }
    Ok(())
}

/// Inner product of two equally shaped operands, summed in traversal order.
pub fn inner<T: Element>(a: StridedRef<'_, T>, b: StridedRef<'_, T>) -> Result<T> {
    let p = a.rank();
    if p == 0 {
        return Err(KernelError::ZeroRank);
    }
    check_rank(p, b.rank())?;
    for (&na, &nb) in a.extents().iter().zip(b.extents()) {
        check_extent("inner", na, nb)?;
    }
    a.validate("a")?;
    b.validate("b")?;

    tracing::trace!(kernel = "inner", rank = p, "dispatch");
    Ok(inner_walk(
        p - 1,
        a.extents(),
        a.data(),
        a.strides(),
        0,
        b.data(),
        b.strides(),
        0,
        T::zero(),
    ))
}

#[allow(clippy::too_many_arguments)]
fn inner_walk<T: Element>(
    r: usize,
    n: &[usize],
    a: &[T],
    wa: &[usize],
    oa: usize,
    b: &[T],
    wb: &[usize],
    ob: usize,
    mut v: T,
) -> T {
    if r == 0 {
        for i in 0..n[0] {
            v += a[oa + i * wa[0]] * b[ob + i * wb[0]];
        }
    } else {
        for i in 0..n[r] {
            v = inner_walk(r - 1, n, a, wa, oa + i * wa[r], b, wb, ob + i * wb[r], v);
        }
    }
    v
}

/// Outer product: `C[i1, .., ir, j1, .., js] = A[i1, .., ir] * B[j1, .., js]`.
///
/// Writes every output element exactly once; `c` need not be zeroed.
pub fn outer<T: Element>(
    c: StridedMut<'_, T>,
    a: StridedRef<'_, T>,
    b: StridedRef<'_, T>,
) -> Result<()> {
    let (r, s) = (a.rank(), b.rank());
    if r == 0 || s == 0 {
        return Err(KernelError::ZeroRank);
    }
    c.validate("c")?;
    a.validate("a")?;
    b.validate("b")?;
    let (na, nb, nc) = (a.extents(), b.extents(), c.extents());
    check_rank(r + s, nc.len())?;
    for (k, &n) in na.iter().chain(nb).enumerate() {
        check_extent("outer", n, nc[k])?;
    }

    tracing::trace!(kernel = "outer", r, s, "dispatch");
    let (data, _, wc) = c.into_parts();
    let walk = OuterWalk {
        r,
        s,
        na,
        nb,
        wa: a.strides(),
        wb: b.strides(),
        wc,
    };
    walk.run(0, data, 0, a.data(), 0, b.data(), 0);
    Ok(())
}

struct OuterWalk<'s> {
    r: usize,
    s: usize,
    na: &'s [usize],
    nb: &'s [usize],
    wa: &'s [usize],
    wb: &'s [usize],
    wc: &'s [usize],
}

impl OuterWalk<'_> {
    #[allow(clippy::too_many_arguments)]
    fn run<T: Element>(
        &self,
        k: usize,
        c: &mut [T],
        oc: usize,
        a: &[T],
        oa: usize,
        b: &[T],
        ob: usize,
    ) {
        let (r, s) = (self.r, self.s);
        if k < r {
            for i in 0..self.na[k] {
                self.run(k + 1, c, oc + i * self.wc[k], a, oa + i * self.wa[k], b, ob);
            }
        } else if k < r + s - 1 {
            for i in 0..self.nb[k - r] {
                self.run(k + 1, c, oc + i * self.wc[k], a, oa, b, ob + i * self.wb[k - r]);
            }
        } else {
            let x = a[oa];
            for i in 0..self.nb[s - 1] {
                c[oc + i * self.wc[k]] = x * b[ob + i * self.wb[s - 1]];
            }
        }
    }
}

/// Tensor-times-tensor over `q` paired modes.
///
/// `phia` and `phib` are one-based permutations of the modes of `a` and
/// `b` listing the free modes first and the `q` contracted modes last;
/// `phia[r + j]` is contracted against `phib[s + j]`. The output holds the
/// free modes of `a` followed by those of `b`, padded with unit extents up
/// to rank 2.
pub fn ttt<T: Element>(
    c: StridedMut<'_, T>,
    a: StridedRef<'_, T>,
    b: StridedRef<'_, T>,
    phia: &[usize],
    phib: &[usize],
    q: usize,
) -> Result<()> {
    let (pa, pb) = (a.rank(), b.rank());
    if pa == 0 || pb == 0 {
        return Err(KernelError::ZeroRank);
    }
    validate_permutation(phia, pa)?;
    validate_permutation(phib, pb)?;
    if q > pa.min(pb) {
        return Err(KernelError::InvalidMode {
            mode: q,
            rank: pa.min(pb),
        });
    }
    c.validate("c")?;
    a.validate("a")?;
    b.validate("b")?;

    let (na, nb, nc) = (a.extents(), b.extents(), c.extents());
    let (r, s) = (pa - q, pb - q);
    check_rank((r + s).max(2), nc.len())?;
    for j in 0..q {
        check_extent("ttt contracted extent", na[phia[r + j] - 1], nb[phib[s + j] - 1])?;
    }
    for k in 0..r {
        check_extent("ttt free extent", na[phia[k] - 1], nc[k])?;
    }
    for k in 0..s {
        check_extent("ttt free extent", nb[phib[k] - 1], nc[r + k])?;
    }
    check_padding(nc, r + s)?;

    tracing::trace!(kernel = "ttt", r, s, q, "dispatch");
    let (data, _, wc) = c.into_parts();
    let walk = TttWalk {
        r,
        s,
        q,
        phia,
        phib,
        na,
        nc,
        wa: a.strides(),
        wb: b.strides(),
        wc,
    };
    walk.run(0, data, 0, a.data(), 0, b.data(), 0);
    Ok(())
}

struct TttWalk<'s> {
    r: usize,
    s: usize,
    q: usize,
    phia: &'s [usize],
    phib: &'s [usize],
    na: &'s [usize],
    nc: &'s [usize],
    wa: &'s [usize],
    wb: &'s [usize],
    wc: &'s [usize],
}

impl TttWalk<'_> {
    #[allow(clippy::too_many_arguments)]
    fn run<T: Element>(
        &self,
        k: usize,
        c: &mut [T],
        oc: usize,
        a: &[T],
        oa: usize,
        b: &[T],
        ob: usize,
    ) {
        let (r, s, q) = (self.r, self.s, self.q);
        if k < r {
            let wa = self.wa[self.phia[k] - 1];
            for i in 0..self.nc[k] {
                self.run(k + 1, c, oc + i * self.wc[k], a, oa + i * wa, b, ob);
            }
        } else if k < r + s {
            let wb = self.wb[self.phib[k - r] - 1];
            for i in 0..self.nc[k] {
                self.run(k + 1, c, oc + i * self.wc[k], a, oa, b, ob + i * wb);
            }
        } else if q == 0 {
            c[oc] += a[oa] * b[ob];
        } else {
            let mode = self.phia[k - s] - 1;
            let (wa, wb) = (self.wa[mode], self.wb[self.phib[k - r] - 1]);
            if k < r + s + q - 1 {
                for i in 0..self.na[mode] {
                    self.run(k + 1, c, oc, a, oa + i * wa, b, ob + i * wb);
                }
            } else {
                let mut sum = T::zero();
                for i in 0..self.na[mode] {
                    sum += a[oa + i * wa] * b[ob + i * wb];
                }
                c[oc] += sum;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn first_order(n: &[usize]) -> Vec<usize> {
        let mut w = vec![1; n.len()];
        for r in 1..n.len() {
            w[r] = w[r - 1] * n[r - 1];
        }
        w
    }

    fn last_order(n: &[usize]) -> Vec<usize> {
        let mut w = vec![1; n.len()];
        for r in (0..n.len() - 1).rev() {
            w[r] = w[r + 1] * n[r + 1];
        }
        w
    }

    fn numel(n: &[usize]) -> usize {
        n.iter().product()
    }

    #[test]
    fn test_ttv_constant_reduction() {
        let shapes: &[&[usize]] = &[&[2, 3], &[4, 2, 3], &[4, 2, 3, 5], &[1, 2, 3]];
        for &na in shapes {
            for layout in [first_order as fn(&[usize]) -> Vec<usize>, last_order] {
                let wa = layout(na);
                let a = vec![2.0f64; numel(na)];
                for m in 1..=na.len() {
                    let mut nc: Vec<usize> = na.to_vec();
                    nc.remove(m - 1);
                    if nc.len() < 2 {
                        nc.push(1);
                    }
                    let wc = layout(&nc);
                    let nb = [na[m - 1], 1];
                    let b = vec![1.0f64; na[m - 1]];
                    let mut c = vec![0.0f64; numel(&nc)];
                    ttv(
                        m,
                        StridedMut::new(&mut c, &nc, &wc),
                        StridedRef::new(&a, na, &wa),
                        StridedRef::new(&b, &nb, &[1, 1]),
                    )
                    .unwrap();
                    let expected = na[m - 1] as f64 * 2.0;
                    for v in &c {
                        assert_relative_eq!(*v, expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_ttv_constant_matrix() {
        let a = [2.0f32; 6];
        let b = [1.0f32; 3];
        let mut c = [0.0f32; 2];
        ttv(
            2,
            StridedMut::new(&mut c, &[2, 1], &[1, 1]),
            StridedRef::new(&a, &[2, 3], &[1, 2]),
            StridedRef::new(&b, &[3, 1], &[1, 1]),
        )
        .unwrap();
        assert_eq!(c, [6.0, 6.0]);
    }

    #[test]
    fn test_ttv_values() {
        // A = [[1,2,3],[4,5,6]] first-order, b = [1,0,-1]
        let a = [1, 4, 2, 5, 3, 6];
        let b = [1, 0, -1];
        let mut c = [0; 2];
        ttv(
            2,
            StridedMut::new(&mut c, &[2, 1], &[1, 1]),
            StridedRef::new(&a, &[2, 3], &[1, 2]),
            StridedRef::new(&b, &[3, 1], &[1, 1]),
        )
        .unwrap();
        assert_eq!(c, [-2, -2]);

        let b = [1, 1];
        let mut c = [0; 3];
        ttv(
            1,
            StridedMut::new(&mut c, &[3, 1], &[1, 1]),
            StridedRef::new(&a, &[2, 3], &[1, 2]),
            StridedRef::new(&b, &[2, 1], &[1, 1]),
        )
        .unwrap();
        assert_eq!(c, [5, 7, 9]);
    }

    #[test]
    fn test_ttv_preconditions() {
        let a = [1.0f32; 6];
        let b = [1.0f32; 3];
        let mut c = [0.0f32; 2];
        let err = ttv(
            3,
            StridedMut::new(&mut c, &[2, 1], &[1, 1]),
            StridedRef::new(&a, &[2, 3], &[1, 2]),
            StridedRef::new(&b, &[3, 1], &[1, 1]),
        );
        assert_eq!(err, Err(KernelError::InvalidMode { mode: 3, rank: 2 }));

        let err = ttv(
            1,
            StridedMut::new(&mut c, &[2, 1], &[1, 1]),
            StridedRef::new(&a, &[2, 3], &[1, 2]),
            StridedRef::new(&b, &[3, 1], &[1, 1]),
        );
        assert!(matches!(err, Err(KernelError::ExtentMismatch { .. })));
        assert_eq!(c, [0.0; 2]);

        let empty: [f32; 0] = [];
        let err = ttv(
            2,
            StridedMut::new(&mut c, &[2, 1], &[1, 1]),
            StridedRef::new(&a, &[2, 3], &[1, 2]),
            StridedRef::new(&empty, &[3, 1], &[1, 1]),
        );
        assert_eq!(err, Err(KernelError::NullOperand("b")));
    }

    #[test]
    fn test_ttm_constant_reduction() {
        let shapes: &[&[usize]] = &[&[2, 3], &[4, 2, 3], &[4, 2, 3, 5]];
        for &na in shapes {
            for layout in [first_order as fn(&[usize]) -> Vec<usize>, last_order] {
                let wa = layout(na);
                let a = vec![2.0f64; numel(na)];
                for m in 1..=na.len() {
                    let k = na[m - 1];
                    let nb = [k, k];
                    let wb = layout(&nb);
                    let b = vec![1.0f64; k * k];
                    let nc = na.to_vec();
                    let wc = layout(&nc);
                    let mut c = vec![0.0f64; numel(&nc)];
                    ttm(
                        m,
                        StridedMut::new(&mut c, &nc, &wc),
                        StridedRef::new(&a, na, &wa),
                        StridedRef::new(&b, &nb, &wb),
                    )
                    .unwrap();
                    for v in &c {
                        assert_relative_eq!(*v, k as f64 * 2.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_ttm_changes_mode_extent() {
        // A: 2x3 first-order [[1,2,3],[4,5,6]], B: 1x3 = [[1,1,1]] along mode 2
        let a = [1, 4, 2, 5, 3, 6];
        let b = [1, 1, 1];
        let mut c = [0; 2];
        ttm(
            2,
            StridedMut::new(&mut c, &[2, 1], &[1, 2]),
            StridedRef::new(&a, &[2, 3], &[1, 2]),
            StridedRef::new(&b, &[1, 3], &[1, 1]),
        )
        .unwrap();
        assert_eq!(c, [6, 15]);

        let err = ttm(
            2,
            StridedMut::new(&mut c, &[2, 1], &[1, 2]),
            StridedRef::new(&a, &[2, 3], &[1, 2]),
            StridedRef::new(&b, &[3, 1], &[1, 3]),
        );
        assert!(matches!(err, Err(KernelError::ExtentMismatch { .. })));
    }

    #[test]
    fn test_mtv_and_mtm() {
        // A = [[1,2],[3,4]] last-order
        let a = [1.0, 2.0, 3.0, 4.0];
        let x = [1.0, 1.0];
        let mut y = [0.0; 2];
        mtv(
            2,
            StridedMut::new(&mut y, &[2, 1], &[1, 1]),
            StridedRef::new(&a, &[2, 2], &[2, 1]),
            StridedRef::new(&x, &[2, 1], &[1, 1]),
        )
        .unwrap();
        assert_eq!(y, [3.0, 7.0]);

        let b = [1.0, 0.0, 0.0, 1.0];
        let mut c = [0.0; 4];
        mtm(
            StridedMut::new(&mut c, &[2, 2], &[2, 1]),
            StridedRef::new(&a, &[2, 2], &[2, 1]),
            StridedRef::new(&b, &[2, 2], &[2, 1]),
        )
        .unwrap();
        assert_eq!(c, a);

        let err = mtv(
            1,
            StridedMut::new(&mut y, &[2, 1], &[1, 1]),
            StridedRef::new(&a, &[2, 2, 1], &[2, 1, 1]),
            StridedRef::new(&x, &[2, 1], &[1, 1]),
        );
        assert_eq!(err, Err(KernelError::RankMismatch { expected: 2, got: 3 }));
    }

    #[test]
    fn test_inner() {
        let n = [2, 3];
        let a = [2.0f64; 6];
        let b = [3.0f64; 6];
        let v = inner(
            StridedRef::new(&a, &n, &first_order(&n)),
            StridedRef::new(&b, &n, &last_order(&n)),
        )
        .unwrap();
        assert_relative_eq!(v, 36.0);

        let err = inner(
            StridedRef::new(&a, &[2, 3], &[1, 2]),
            StridedRef::new(&b, &[3, 2], &[1, 3]),
        );
        assert!(matches!(err, Err(KernelError::ExtentMismatch { .. })));
    }

    #[test]
    fn test_outer() {
        let (na, nb) = ([2, 3], [4, 1, 2]);
        let a = [2.0f32; 6];
        let b = [3.0f32; 8];
        let nc = [2, 3, 4, 1, 2];
        let mut c = vec![0.0f32; 48];
        outer(
            StridedMut::new(&mut c, &nc, &first_order(&nc)),
            StridedRef::new(&a, &na, &first_order(&na)),
            StridedRef::new(&b, &nb, &last_order(&nb)),
        )
        .unwrap();
        assert!(c.iter().all(|&v| v == 6.0));

        // x = [1,2], y = [10,20,30] as columns
        let x = [1, 2];
        let y = [10, 20, 30];
        let nc = [2, 1, 3, 1];
        let mut c = [0; 6];
        outer(
            StridedMut::new(&mut c, &nc, &first_order(&nc)),
            StridedRef::new(&x, &[2, 1], &[1, 1]),
            StridedRef::new(&y, &[3, 1], &[1, 1]),
        )
        .unwrap();
        assert_eq!(c, [10, 20, 20, 40, 30, 60]);
    }

    #[test]
    fn test_ttt_matches_matrix_product() {
        // A = [[1,2],[3,4]], B = [[5,6],[7,8]] in first order
        let a = [1, 3, 2, 4];
        let b = [5, 7, 6, 8];
        let n = [2, 2];
        let w = first_order(&n);
        let mut c = [0; 4];
        // contract mode 2 of A with mode 1 of B
        ttt(
            StridedMut::new(&mut c, &n, &w),
            StridedRef::new(&a, &n, &w),
            StridedRef::new(&b, &n, &w),
            &[1, 2],
            &[2, 1],
            1,
        )
        .unwrap();
        let mut expected = [0; 4];
        mtm(
            StridedMut::new(&mut expected, &n, &w),
            StridedRef::new(&a, &n, &w),
            StridedRef::new(&b, &n, &w),
        )
        .unwrap();
        assert_eq!(c, expected);
        assert_eq!(c, [19, 43, 22, 50]);
    }

    #[test]
    fn test_ttt_full_and_empty_contraction() {
        let n = [2, 3];
        let w = first_order(&n);
        let a: Vec<f64> = (1..=6).map(|v| v as f64).collect();
        let b = vec![2.0f64; 6];

        let mut c = [0.0f64; 1];
        ttt(
            StridedMut::new(&mut c, &[1, 1], &[1, 1]),
            StridedRef::new(&a, &n, &w),
            StridedRef::new(&b, &n, &w),
            &[1, 2],
            &[1, 2],
            2,
        )
        .unwrap();
        let dot = inner(StridedRef::new(&a, &n, &w), StridedRef::new(&b, &n, &w)).unwrap();
        assert_relative_eq!(c[0], dot);
        assert_relative_eq!(c[0], 42.0);

        let nc = [2, 3, 2, 3];
        let mut c = vec![0.0f64; 36];
        ttt(
            StridedMut::new(&mut c, &nc, &first_order(&nc)),
            StridedRef::new(&a, &n, &w),
            StridedRef::new(&b, &n, &w),
            &[1, 2],
            &[1, 2],
            0,
        )
        .unwrap();
        let mut o = vec![0.0f64; 36];
        outer(
            StridedMut::new(&mut o, &nc, &first_order(&nc)),
            StridedRef::new(&a, &n, &w),
            StridedRef::new(&b, &n, &w),
        )
        .unwrap();
        assert_eq!(c, o);
    }

    #[test]
    fn test_ttt_preconditions() {
        let a = [1.0f32; 6];
        let mut c = [0.0f32; 4];
        let err = ttt(
            StridedMut::new(&mut c, &[2, 2], &[1, 2]),
            StridedRef::new(&a, &[2, 3], &[1, 2]),
            StridedRef::new(&a, &[2, 3], &[1, 2]),
            &[2, 1],
            &[1, 2],
            1,
        );
        assert!(matches!(err, Err(KernelError::ExtentMismatch { .. })));

        let err = ttt(
            StridedMut::new(&mut c, &[2, 2], &[1, 2]),
            StridedRef::new(&a, &[2, 3], &[1, 2]),
            StridedRef::new(&a, &[2, 3], &[1, 2]),
            &[1, 1],
            &[1, 2],
            1,
        );
        assert!(matches!(err, Err(KernelError::InvalidPermutation(_))));
        assert_eq!(c, [0.0; 4]);
    }
}
