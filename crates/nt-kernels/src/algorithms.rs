//! Layout-aware traversal: strided copy and axis permutation.
//!
//! Both walkers recurse from the outermost axis `p-1` down to axis 0 and
//! move the source and destination offsets independently, so source and
//! destination may use completely different stride tables.

use crate::error::{KernelError, Result};
use crate::operand::{validate_permutation, StridedMut, StridedRef};

/// Copies every element of `a` into `c`.
///
/// Both operands span the same extents; only their strides may differ,
/// which makes this the layout-to-layout conversion primitive.
pub fn copy<T: Copy>(c: StridedMut<'_, T>, a: StridedRef<'_, T>) -> Result<()> {
    let p = a.rank();
    if p == 0 {
        return Err(KernelError::ZeroRank);
    }
    check_rank(c.rank(), p)?;
    for (&nc, &na) in c.extents().iter().zip(a.extents()) {
        if nc != na {
            return Err(KernelError::ExtentMismatch {
                what: "copy",
                expected: na,
                got: nc,
            });
        }
    }
    c.validate("c")?;
    a.validate("a")?;

    tracing::trace!(rank = p, "copy");
    let (data, _, wc) = c.into_parts();
    let walk = Walk {
        n: a.extents(),
        wc,
        wa: a.strides(),
        pi: None,
    };
    walk.run(p - 1, data, 0, a.data(), 0);
    Ok(())
}

/// Writes `C[i_{pi(1)}, .., i_{pi(p)}] = A[i_1, .., i_p]`.
///
/// `pi` is one-based: axis `r` of `A` lands on axis `pi[r] - 1` of `C`, so
/// the extents of `c` must satisfy `nc[pi[r] - 1] == na[r]`.
pub fn trans<T: Copy>(c: StridedMut<'_, T>, a: StridedRef<'_, T>, pi: &[usize]) -> Result<()> {
    let p = a.rank();
    if p == 0 {
        return Err(KernelError::ZeroRank);
    }
    check_rank(c.rank(), p)?;
    validate_permutation(pi, p)?;
    let nc = c.extents();
    for (r, &na) in a.extents().iter().enumerate() {
        if nc[pi[r] - 1] != na {
            return Err(KernelError::ExtentMismatch {
                what: "permuted extent",
                expected: na,
                got: nc[pi[r] - 1],
            });
        }
    }
    c.validate("c")?;
    a.validate("a")?;

    tracing::trace!(rank = p, ?pi, "trans");
    let (data, _, wc) = c.into_parts();
    let walk = Walk {
        n: a.extents(),
        wc,
        wa: a.strides(),
        pi: Some(pi),
    };
    walk.run(p - 1, data, 0, a.data(), 0);
    Ok(())
}

fn check_rank(got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(KernelError::RankMismatch { expected, got });
    }
    Ok(())
}

struct Walk<'s> {
    n: &'s [usize],
    wc: &'s [usize],
    wa: &'s [usize],
    pi: Option<&'s [usize]>,
}

impl Walk<'_> {
    fn dst_stride(&self, r: usize) -> usize {
        match self.pi {
            Some(pi) => self.wc[pi[r] - 1],
            None => self.wc[r],
        }
    }

    fn run<T: Copy>(&self, r: usize, c: &mut [T], oc: usize, a: &[T], oa: usize) {
        let sc = self.dst_stride(r);
        let sa = self.wa[r];
        if r == 0 {
            for i in 0..self.n[0] {
                c[oc + i * sc] = a[oa + i * sa];
            }
        } else {
            for i in 0..self.n[r] {
                self.run(r - 1, c, oc + i * sc, a, oa + i * sa);
            }
        }
    }
}
