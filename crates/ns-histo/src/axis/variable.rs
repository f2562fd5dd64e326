//! Numeric axis with explicit bin edges.

use super::{Extension, ExtensionInfo};
use crate::error::{HistError, Result};

/// Bins delimited by a strictly increasing list of edges.
///
/// A value resolves to the position of the first edge not less than it, so
/// offset 0 is the underflow bin, offset `edges.len()` the overflow bin, and
/// regular bin `i` covers `(edges[i-1], edges[i]]`. Never extendable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableBinAxis {
    label: String,
    edges: Vec<f64>,
}

impl VariableBinAxis {
    /// Create an axis from at least two finite, strictly increasing edges.
    pub fn new(label: impl Into<String>, edges: Vec<f64>) -> Result<Self> {
        let label = label.into();
        if edges.len() < 2 {
            return Err(HistError::InvalidAxis { axis: label, reason: "need at least two edges".into() });
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(HistError::InvalidAxis {
                axis: label,
                reason: "edges must be finite and strictly increasing".into(),
            });
        }
        Ok(Self { label, edges })
    }

    /// Axis label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Bin edges.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of regular bins.
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Number of bins including underflow and overflow.
    pub fn full_n_bins(&self) -> usize {
        self.edges.len() + 1
    }

    pub(crate) fn find_offset(&self, value: f64) -> usize {
        self.edges.partition_point(|&e| e < value)
    }

    pub(crate) fn contains_value(&self, value: f64) -> bool {
        let offset = self.find_offset(value);
        offset > 0 && offset < self.edges.len()
    }

    pub(crate) fn plan_extension(&self, value: f64) -> Extension {
        Extension::unchanged(self.full_n_bins(), self.find_offset(value))
    }

    pub(crate) fn compare(&self, other: &VariableBinAxis) -> Result<ExtensionInfo> {
        if self.edges != other.edges {
            return Err(HistError::IncompatibleMerge(format!(
                "axis '{}': bin edges do not match",
                self.label
            )));
        }
        Ok(ExtensionInfo::identity(self.full_n_bins()))
    }

    pub(crate) fn merge(&self, other: &VariableBinAxis) -> Result<()> {
        self.compare(other).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_edges() {
        assert!(VariableBinAxis::new("x", vec![0.0]).is_err());
        assert!(VariableBinAxis::new("x", vec![0.0, 1.0, 1.0]).is_err());
        assert!(VariableBinAxis::new("x", vec![0.0, f64::NAN]).is_err());
    }

    #[test]
    fn lower_bound_binning() {
        let a = VariableBinAxis::new("x", vec![0.0, 1.0, 3.0, 10.0]).unwrap();
        assert_eq!(a.n_bins(), 3);
        assert_eq!(a.full_n_bins(), 5);
        assert_eq!(a.find_offset(-1.0), 0);
        assert_eq!(a.find_offset(0.0), 0);
        assert_eq!(a.find_offset(0.5), 1);
        assert_eq!(a.find_offset(1.0), 1);
        assert_eq!(a.find_offset(2.0), 2);
        assert_eq!(a.find_offset(10.0), 3);
        assert_eq!(a.find_offset(11.0), 4);
        assert!(a.contains_value(10.0));
        assert!(!a.contains_value(0.0));
    }

    #[test]
    fn compare_requires_identical_edges() {
        let a = VariableBinAxis::new("x", vec![0.0, 1.0, 2.0]).unwrap();
        let b = VariableBinAxis::new("x", vec![0.0, 1.5, 2.0]).unwrap();
        assert!(a.compare(&a.clone()).unwrap().is_identity());
        assert!(matches!(a.compare(&b), Err(HistError::IncompatibleMerge(_))));
        assert!(a.merge(&b).is_err());
    }
}
