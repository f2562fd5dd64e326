//! Equal-width numeric axis.

use serde::{Deserialize, Serialize};

use super::{Extension, ExtensionInfo, Growth};
use crate::error::{HistError, Result};

/// Relative tolerance when checking that a distance is a whole number of bin widths.
const EDGE_TOLERANCE: f64 = 1e-9;

/// How a [`FixedBinAxis`] grows to admit out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionPolicy {
    /// Fixed range with underflow/overflow bins.
    #[default]
    None,
    /// Keep the bin count, widen the bins. Declared but not supported.
    PreserveBinCount,
    /// Keep the bin width, add bins at either end.
    PreserveBinWidth,
}

impl ExtensionPolicy {
    /// Stable byte code used by the codec.
    pub fn code(self) -> u8 {
        match self {
            ExtensionPolicy::None => 0,
            ExtensionPolicy::PreserveBinCount => 1,
            ExtensionPolicy::PreserveBinWidth => 2,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ExtensionPolicy::None),
            1 => Some(ExtensionPolicy::PreserveBinCount),
            2 => Some(ExtensionPolicy::PreserveBinWidth),
            _ => None,
        }
    }
}

/// `n_bins` equal-width bins spanning `[min, max)`.
///
/// A non-extendable axis keeps offset 0 for underflow and offset
/// `n_bins + 1` for overflow. An extendable axis has no flow bins: values
/// outside the range have no bin until the axis is extended.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedBinAxis {
    label: String,
    n_bins: usize,
    min: f64,
    max: f64,
    extension: ExtensionPolicy,
}

impl FixedBinAxis {
    /// Create an axis, rejecting an empty or inverted range.
    pub fn new(
        label: impl Into<String>,
        n_bins: usize,
        min: f64,
        max: f64,
        extension: ExtensionPolicy,
    ) -> Result<Self> {
        let label = label.into();
        if n_bins == 0 {
            return Err(HistError::InvalidAxis { axis: label, reason: "n_bins must be > 0".into() });
        }
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(HistError::InvalidAxis {
                axis: label,
                reason: format!("invalid range [{min}, {max})"),
            });
        }
        Ok(Self { label, n_bins, min, max, extension })
    }

    /// Axis label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Lower edge of the first regular bin.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper edge of the last regular bin.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Extension policy.
    pub fn extension(&self) -> ExtensionPolicy {
        self.extension
    }

    /// Width of a single bin.
    #[inline]
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.n_bins as f64
    }

    /// Whether the axis grows instead of using flow bins.
    pub fn is_extendable(&self) -> bool {
        self.extension != ExtensionPolicy::None
    }

    /// Number of regular bins.
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Number of bins including flow bins.
    pub fn full_n_bins(&self) -> usize {
        if self.is_extendable() { self.n_bins } else { self.n_bins + 2 }
    }

    /// Offset of the bin holding `value`.
    pub(crate) fn find_offset(&self, value: f64) -> Option<usize> {
        let idx = ((value - self.min) / self.bin_width()).floor();
        let extendable = self.is_extendable();
        if idx < 0.0 {
            (!extendable).then_some(0)
        } else if idx >= self.n_bins as f64 || idx.is_nan() {
            (!extendable).then_some(self.n_bins + 1)
        } else if extendable {
            Some(idx as usize)
        } else {
            Some(idx as usize + 1)
        }
    }

    pub(crate) fn contains_value(&self, value: f64) -> bool {
        let idx = ((value - self.min) / self.bin_width()).floor();
        idx >= 0.0 && idx < self.n_bins as f64
    }

    pub(crate) fn plan_extension(&self, value: f64) -> Result<Extension> {
        let old = self.full_n_bins();
        if let Some(offset) = self.find_offset(value) {
            return Ok(Extension::unchanged(old, offset));
        }
        match self.extension {
            ExtensionPolicy::None => Err(HistError::UnsupportedExtension(format!(
                "axis '{}' is not extendable",
                self.label
            ))),
            ExtensionPolicy::PreserveBinCount => Err(self.preserve_bin_count_error()),
            ExtensionPolicy::PreserveBinWidth => {
                if value < self.min {
                    let n = self.exact_growth(value, self.min - value)?;
                    Ok(Extension {
                        info: ExtensionInfo::shift(old, n),
                        offset: 0,
                        growth: Growth::Below(n),
                    })
                } else {
                    let n = self.exact_growth(value, value - self.max)?;
                    if n == 0 {
                        return Ok(Extension::unchanged(old, self.n_bins - 1));
                    }
                    Ok(Extension {
                        info: ExtensionInfo::identity(old),
                        offset: self.n_bins + n - 1,
                        growth: Growth::Above(n),
                    })
                }
            }
        }
    }

    pub(crate) fn grow_below(&mut self, n: usize) {
        let width = self.bin_width();
        self.min -= width * n as f64;
        self.n_bins += n;
    }

    pub(crate) fn grow_above(&mut self, n: usize) {
        let width = self.bin_width();
        self.max += width * n as f64;
        self.n_bins += n;
    }

    pub(crate) fn compare(&self, other: &FixedBinAxis) -> Result<ExtensionInfo> {
        self.check_policy(other)?;
        if self.same_binning(other) {
            return Ok(ExtensionInfo::identity(other.full_n_bins()));
        }
        match self.extension {
            ExtensionPolicy::None => Err(self.mismatch(other)),
            ExtensionPolicy::PreserveBinCount => Err(self.preserve_bin_count_error()),
            ExtensionPolicy::PreserveBinWidth => {
                let (below, above) = self.aligned_gaps(other)?;
                if below < 0 || above < 0 {
                    return Err(HistError::IncompatibleMerge(format!(
                        "axis '{}': range [{}, {}) extends beyond [{}, {})",
                        self.label, other.min, other.max, self.min, self.max
                    )));
                }
                Ok(ExtensionInfo::shift(other.full_n_bins(), below as usize))
            }
        }
    }

    pub(crate) fn merge(&mut self, other: &FixedBinAxis) -> Result<()> {
        self.check_policy(other)?;
        if self.same_binning(other) {
            return Ok(());
        }
        match self.extension {
            ExtensionPolicy::None => Err(self.mismatch(other)),
            ExtensionPolicy::PreserveBinCount => Err(self.preserve_bin_count_error()),
            ExtensionPolicy::PreserveBinWidth => {
                let (below, above) = self.aligned_gaps(other)?;
                if below < 0 {
                    self.min = other.min;
                    self.n_bins += below.unsigned_abs() as usize;
                }
                if above < 0 {
                    self.max = other.max;
                    self.n_bins += above.unsigned_abs() as usize;
                }
                Ok(())
            }
        }
    }

    /// `(other.min - self.min, self.max - other.max)` in whole bin widths.
    /// A negative entry means `other` reaches further on that side.
    fn aligned_gaps(&self, other: &FixedBinAxis) -> Result<(i64, i64)> {
        let width = self.bin_width();
        if !approx_eq(width, other.bin_width()) {
            return Err(HistError::IncompatibleMerge(format!(
                "axis '{}': bin widths do not match ({} != {})",
                self.label,
                width,
                other.bin_width()
            )));
        }
        let aligned = |diff: f64| {
            whole_multiple(diff / width).ok_or_else(|| {
                HistError::IncompatibleMerge(format!(
                    "axis '{}': bin edges are not aligned (offset {diff})",
                    self.label
                ))
            })
        };
        Ok((aligned(other.min - self.min)?, aligned(self.max - other.max)?))
    }

    /// Number of bins to add so that a value `gap` beyond the range is covered.
    fn exact_growth(&self, value: f64, gap: f64) -> Result<usize> {
        let widths = gap / self.bin_width();
        match whole_multiple(widths) {
            Some(n) if n >= 0 => Ok(n as usize),
            _ => Err(HistError::NonExactExtension { axis: self.label.clone(), value, gap: widths }),
        }
    }

    fn same_binning(&self, other: &FixedBinAxis) -> bool {
        self.n_bins == other.n_bins && self.min == other.min && self.max == other.max
    }

    fn check_policy(&self, other: &FixedBinAxis) -> Result<()> {
        if self.extension != other.extension {
            return Err(HistError::IncompatibleMerge(format!(
                "axis '{}': extension policies differ ({:?} != {:?})",
                self.label, self.extension, other.extension
            )));
        }
        Ok(())
    }

    fn mismatch(&self, other: &FixedBinAxis) -> HistError {
        HistError::IncompatibleMerge(format!(
            "axis '{}': binning ({}, {}, {}) != ({}, {}, {}) on a non-extendable axis",
            self.label, self.n_bins, self.min, self.max, other.n_bins, other.min, other.max
        ))
    }

    fn preserve_bin_count_error(&self) -> HistError {
        HistError::UnsupportedExtension(format!(
            "PreserveBinCount growth of axis '{}' is not implemented",
            self.label
        ))
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EDGE_TOLERANCE * a.abs().max(b.abs())
}

/// `Some(n)` if `x` is within tolerance of the integer `n`.
fn whole_multiple(x: f64) -> Option<i64> {
    if !x.is_finite() {
        return None;
    }
    let n = x.round();
    ((x - n).abs() <= EDGE_TOLERANCE * n.abs().max(1.0)).then_some(n as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(n: usize, min: f64, max: f64) -> FixedBinAxis {
        FixedBinAxis::new("x", n, min, max, ExtensionPolicy::None).unwrap()
    }

    fn growing(n: usize, min: f64, max: f64) -> FixedBinAxis {
        FixedBinAxis::new("x", n, min, max, ExtensionPolicy::PreserveBinWidth).unwrap()
    }

    #[test]
    fn rejects_bad_ranges() {
        assert!(FixedBinAxis::new("x", 0, 0.0, 1.0, ExtensionPolicy::None).is_err());
        assert!(FixedBinAxis::new("x", 2, 1.0, 1.0, ExtensionPolicy::None).is_err());
        assert!(FixedBinAxis::new("x", 2, 0.0, f64::INFINITY, ExtensionPolicy::None).is_err());
    }

    #[test]
    fn flow_bins_on_fixed_range() {
        let a = fixed(4, 0.0, 4.0);
        assert_eq!(a.full_n_bins(), 6);
        assert_eq!(a.find_offset(-1.0), Some(0));
        assert_eq!(a.find_offset(0.5), Some(1));
        assert_eq!(a.find_offset(3.99), Some(4));
        assert_eq!(a.find_offset(4.0), Some(5));
        assert_eq!(a.find_offset(4.5), Some(5));
        assert_eq!(a.find_offset(f64::NAN), Some(5));
        assert!(a.contains_value(0.0));
        assert!(!a.contains_value(4.0));
    }

    #[test]
    fn extendable_has_no_flow_bins() {
        let a = growing(2, 0.0, 2.0);
        assert_eq!(a.full_n_bins(), 2);
        assert_eq!(a.find_offset(0.5), Some(0));
        assert_eq!(a.find_offset(-0.5), None);
        assert_eq!(a.find_offset(2.0), None);
    }

    #[test]
    fn grow_above_keeps_numbering() {
        let mut a = growing(2, 0.0, 2.0);
        let ext = a.plan_extension(5.0).unwrap();
        assert_eq!(ext.growth, Growth::Above(3));
        assert!(ext.info.is_identity());
        assert_eq!(ext.offset, 4);
        a.grow_above(3);
        assert_eq!(a.n_bins(), 5);
        assert_eq!(a.max(), 5.0);
    }

    #[test]
    fn grow_below_shifts_numbering() {
        let mut a = growing(2, 0.0, 2.0);
        let ext = a.plan_extension(-3.0).unwrap();
        assert_eq!(ext.growth, Growth::Below(3));
        assert_eq!(ext.info.apply(0), 3);
        assert_eq!(ext.offset, 0);
        a.grow_below(3);
        assert_eq!(a.n_bins(), 5);
        assert_eq!(a.min(), -3.0);
        assert_eq!(a.find_offset(-3.0), Some(0));
    }

    #[test]
    fn value_on_max_needs_no_growth() {
        let a = growing(2, 0.0, 2.0);
        let ext = a.plan_extension(2.0).unwrap();
        assert_eq!(ext.growth, Growth::Unchanged);
        assert!(ext.info.is_identity());
        assert_eq!(ext.offset, 1);
    }

    #[test]
    fn fractional_growth_is_rejected() {
        let a = growing(2, 0.0, 2.0);
        assert!(matches!(a.plan_extension(3.5), Err(HistError::NonExactExtension { .. })));
        assert!(matches!(a.plan_extension(-0.5), Err(HistError::NonExactExtension { .. })));
    }

    #[test]
    fn preserve_bin_count_is_unsupported() {
        let a = FixedBinAxis::new("x", 2, 0.0, 2.0, ExtensionPolicy::PreserveBinCount).unwrap();
        assert!(a.is_extendable());
        assert!(matches!(a.plan_extension(3.0), Err(HistError::UnsupportedExtension(_))));
    }

    #[test]
    fn compare_contained_range() {
        let wide = growing(6, -2.0, 4.0);
        let narrow = growing(2, 0.0, 2.0);
        let info = wide.compare(&narrow).unwrap();
        assert_eq!(info.old_n_bins, 2);
        assert_eq!(info.apply(0), 2);
        assert_eq!(info.apply(1), 3);

        assert!(matches!(narrow.compare(&wide), Err(HistError::IncompatibleMerge(_))));
    }

    #[test]
    fn compare_rejects_misaligned() {
        let a = growing(4, 0.0, 4.0);
        assert!(a.compare(&growing(2, 0.0, 4.0)).is_err());
        assert!(a.compare(&growing(2, 0.5, 2.5)).is_err());
        assert!(fixed(4, 0.0, 4.0).compare(&fixed(4, 0.0, 8.0)).is_err());
        assert!(a.compare(&fixed(4, 0.0, 4.0)).is_err());
    }

    #[test]
    fn merge_widens_both_sides() {
        let mut a = growing(2, 0.0, 2.0);
        a.merge(&growing(3, -1.0, 2.0)).unwrap();
        a.merge(&growing(2, 3.0, 5.0)).unwrap();
        assert_eq!((a.n_bins(), a.min(), a.max()), (6, -1.0, 5.0));

        let mut b = fixed(2, 0.0, 2.0);
        assert!(b.merge(&fixed(2, 0.0, 2.0)).is_ok());
        assert!(b.merge(&fixed(3, 0.0, 3.0)).is_err());
    }
}
