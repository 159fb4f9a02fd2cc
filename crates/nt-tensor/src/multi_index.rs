//! Label-driven contraction.
//!
//! A tensor tagged with one label per mode becomes an [`Indexed`] operand;
//! multiplying two of them contracts every pair of modes sharing a label,
//! so `A(i, j) * B(j, k)` contracts over `j`.

use std::collections::HashSet;
use std::ops::Mul;

use nt_kernels::Element;

use crate::error::{Result, TensorError};
use crate::functions;
use crate::tensor::Tensor;

/// A mode label. `Label::ANY` never matches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub usize);

impl Label {
    pub const ANY: Label = Label(0);

    pub fn is_any(self) -> bool {
        self == Label::ANY
    }
}

impl From<usize> for Label {
    fn from(v: usize) -> Self {
        Label(v)
    }
}

/// An ordered list of labels, one per mode, without repeated labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiIndex {
    labels: Vec<Label>,
}

impl MultiIndex {
    pub fn new<L: Into<Label>>(labels: impl IntoIterator<Item = L>) -> Result<Self> {
        let labels: Vec<Label> = labels.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for l in labels.iter().filter(|l| !l.is_any()) {
            if !seen.insert(*l) {
                return Err(TensorError::ContractionDefinition(format!(
                    "label {} appears more than once",
                    l.0
                )));
            }
        }
        Ok(MultiIndex { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// One-based position of `label`, ignoring `Label::ANY`.
    pub fn position(&self, label: Label) -> Option<usize> {
        if label.is_any() {
            return None;
        }
        self.labels.iter().position(|&l| l == label).map(|k| k + 1)
    }
}

/// One-based mode pairs `(lhs[k], rhs[k])` whose labels are equal, in the
/// order the labels appear on the left.
pub fn extract_corresponding_indices(
    lhs: &MultiIndex,
    rhs: &MultiIndex,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (i, &l) in lhs.labels.iter().enumerate() {
        if let Some(j) = rhs.position(l) {
            left.push(i + 1);
            right.push(j);
        }
    }
    if left.is_empty() {
        return Err(TensorError::ContractionDefinition(
            "no matching labels between operands".to_string(),
        ));
    }
    Ok((left, right))
}

/// A tensor borrowed together with its mode labels.
#[derive(Debug, Clone)]
pub struct Indexed<'a, T> {
    tensor: &'a Tensor<T>,
    index: MultiIndex,
}

impl<'a, T: Element> Indexed<'a, T> {
    pub fn tensor(&self) -> &'a Tensor<T> {
        self.tensor
    }

    pub fn index(&self) -> &MultiIndex {
        &self.index
    }

    /// Contracts every mode pair sharing a label; the result keeps the
    /// unmatched modes of `self` followed by those of `other`.
    pub fn contract(&self, other: &Indexed<'_, T>) -> Result<Tensor<T>> {
        let (phia, phib) = extract_corresponding_indices(&self.index, &other.index)?;
        tracing::debug!(?phia, ?phib, "label contraction");
        functions::ttt(self.tensor, other.tensor, &phia, &phib)
    }
}

impl<T: Element> Tensor<T> {
    /// Tags each mode with a label; the label count must equal the rank.
    pub fn indexed<L: Into<Label>>(
        &self,
        labels: impl IntoIterator<Item = L>,
    ) -> Result<Indexed<'_, T>> {
        let index = MultiIndex::new(labels)?;
        if index.len() != self.rank() {
            return Err(TensorError::RankMismatch {
                expected: self.rank(),
                got: index.len(),
            });
        }
        Ok(Indexed {
            tensor: self,
            index,
        })
    }
}

impl<'a, 'b, T: Element> Mul<Indexed<'b, T>> for Indexed<'a, T> {
    type Output = Result<Tensor<T>>;

    fn mul(self, rhs: Indexed<'b, T>) -> Self::Output {
        self.contract(&rhs)
    }
}

impl<'a, 'b, T: Element> Mul<&Indexed<'b, T>> for &Indexed<'a, T> {
    type Output = Result<Tensor<T>>;

    fn mul(self, rhs: &Indexed<'b, T>) -> Self::Output {
        self.contract(rhs)
    }
}
