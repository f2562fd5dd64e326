//! Axis bookkeeping shared by every histogram, independent of storage type.

use crate::axis::{Axis, AxisIndex, AxisValue, ExtensionInfo, Growth};
use crate::error::{HistError, Result};
use crate::indexer::ArrayIndexer;

/// An ordered list of axes plus the indexer built from their full bin counts.
///
/// The number of axes never changes after construction, and
/// `indexer().axis_sizes()[i] == axes()[i].full_n_bins()` holds between calls.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBase {
    axes: Vec<Axis>,
    indexer: ArrayIndexer,
}

impl HistogramBase {
    /// Build from at least one axis.
    pub fn new(axes: Vec<Axis>) -> Result<Self> {
        if axes.is_empty() {
            return Err(HistError::InvalidAxis {
                axis: String::new(),
                reason: "a histogram needs at least one axis".into(),
            });
        }
        let indexer = indexer_for(&axes);
        Ok(Self { axes, indexer })
    }

    /// Number of axes.
    #[inline]
    pub fn n_dims(&self) -> usize {
        self.axes.len()
    }

    /// All axes, in order.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Axis `idx`, if it exists.
    pub fn axis(&self, idx: usize) -> Option<&Axis> {
        self.axes.get(idx)
    }

    /// The flat-storage indexer.
    pub fn indexer(&self) -> &ArrayIndexer {
        &self.indexer
    }

    /// Product of the regular bin counts of all axes.
    pub fn n_bins(&self) -> usize {
        self.axes.iter().map(Axis::n_bins).product()
    }

    /// Number of storage cells, including flow bins.
    pub fn full_n_bins(&self) -> usize {
        self.indexer.total_entries()
    }

    /// Bin index on every axis for `values`.
    pub fn find_bin(&self, values: &[AxisValue]) -> Result<Vec<Option<AxisIndex>>> {
        self.check_dims(values.len())?;
        self.axes.iter().zip(values).map(|(axis, v)| axis.find_bin(v)).collect()
    }

    /// Per-axis offsets for `values`, or `None` if any axis has no bin for its value.
    pub fn axis_offsets_from_values(&self, values: &[AxisValue]) -> Result<Option<Vec<usize>>> {
        self.check_dims(values.len())?;
        let mut offsets = Vec::with_capacity(self.n_dims());
        for (axis, v) in self.axes.iter().zip(values) {
            match axis.bin_offset_from_value(v)? {
                Some(o) => offsets.push(o),
                None => return Ok(None),
            }
        }
        Ok(Some(offsets))
    }

    /// Per-axis offsets for `indices`, or `None` if any index names no bin.
    pub fn axis_offsets_from_indices(&self, indices: &[AxisIndex]) -> Result<Option<Vec<usize>>> {
        self.check_dims(indices.len())?;
        let mut offsets = Vec::with_capacity(self.n_dims());
        for (axis, i) in self.axes.iter().zip(indices) {
            match axis.bin_offset_from_index(i)? {
                Some(o) => offsets.push(o),
                None => return Ok(None),
            }
        }
        Ok(Some(offsets))
    }

    /// Flat storage offset for `values`, or `None` if some axis must be extended first.
    pub fn bin_offset_from_values(&self, values: &[AxisValue]) -> Result<Option<usize>> {
        Ok(self.axis_offsets_from_values(values)?.map(|o| self.indexer.offset_unchecked(&o)))
    }

    /// Flat storage offset for `indices`, or `None` if they name no bin.
    pub fn bin_offset_from_indices(&self, indices: &[AxisIndex]) -> Result<Option<usize>> {
        Ok(self.axis_offsets_from_indices(indices)?.map(|o| self.indexer.offset_unchecked(&o)))
    }

    /// Whether `values` resolve to a bin without extending any axis.
    pub fn contains(&self, values: &[AxisValue]) -> Result<bool> {
        Ok(self.bin_offset_from_values(values)?.is_some())
    }

    /// Bin indices of the cell at flat `offset`.
    pub fn indices_from_offset(&self, offset: usize) -> Vec<AxisIndex> {
        self.indexer
            .coords_from_offset(offset)
            .into_iter()
            .zip(&self.axes)
            .map(|(c, axis)| axis.index_from_bin_offset(c))
            .collect()
    }

    /// Extend every axis so that `values` have a bin.
    ///
    /// All extensions are validated before any axis changes, so on error the
    /// axes are untouched. Returns the per-axis remaps and the flat offset of
    /// `values` in the new layout.
    pub fn extend_axes(&mut self, values: &[AxisValue]) -> Result<(Vec<ExtensionInfo>, usize)> {
        self.check_dims(values.len())?;
        let plans = self
            .axes
            .iter()
            .zip(values)
            .map(|(axis, v)| axis.plan_extension(v))
            .collect::<Result<Vec<_>>>()?;

        let grows = plans.iter().any(|plan| plan.growth != Growth::Unchanged);
        let mut offsets = Vec::with_capacity(plans.len());
        let mut infos = Vec::with_capacity(plans.len());
        for (axis, plan) in self.axes.iter_mut().zip(plans) {
            axis.apply_extension(&plan.growth);
            offsets.push(plan.offset);
            infos.push(plan.info);
        }
        if !grows {
            return Ok((infos, self.indexer.offset_unchecked(&offsets)));
        }
        self.indexer = indexer_for(&self.axes);
        log::debug!(
            "extended axes to sizes {:?} for values {values:?}",
            self.indexer.axis_sizes()
        );
        Ok((infos, self.indexer.offset_unchecked(&offsets)))
    }

    pub(crate) fn check_dims(&self, got: usize) -> Result<()> {
        if got != self.n_dims() {
            return Err(HistError::DimensionMismatch { expected: self.n_dims(), got });
        }
        Ok(())
    }
}

fn indexer_for(axes: &[Axis]) -> ArrayIndexer {
    ArrayIndexer::new(axes.iter().map(Axis::full_n_bins).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{CategoryAxis, ExtensionPolicy, FixedBinAxis, VariableBinAxis};

    fn base() -> HistogramBase {
        HistogramBase::new(vec![
            FixedBinAxis::new("x", 4, 0.0, 4.0, ExtensionPolicy::None).unwrap().into(),
            CategoryAxis::new("c", vec!["a".into(), "b".into()], true).unwrap().into(),
        ])
        .unwrap()
    }

    #[test]
    fn needs_an_axis() {
        assert!(HistogramBase::new(vec![]).is_err());
    }

    #[test]
    fn offsets_compose_row_major() {
        let b = base();
        assert_eq!(b.full_n_bins(), 12);
        assert_eq!(b.n_bins(), 8);
        assert_eq!(b.bin_offset_from_values(&[0.5.into(), "b".into()]).unwrap(), Some(3));
        assert_eq!(
            b.bin_offset_from_indices(&[AxisIndex::Bin(1), AxisIndex::from("b")]).unwrap(),
            Some(3)
        );
        assert_eq!(b.indices_from_offset(3), vec![AxisIndex::Bin(1), AxisIndex::from("b")]);
        assert_eq!(b.bin_offset_from_values(&[0.5.into(), "z".into()]).unwrap(), None);
        assert!(!b.contains(&[0.5.into(), "z".into()]).unwrap());
    }

    #[test]
    fn dimension_mismatch() {
        let b = base();
        assert!(matches!(
            b.bin_offset_from_values(&[0.5.into()]),
            Err(HistError::DimensionMismatch { expected: 2, got: 1 })
        ));
        assert!(b.find_bin(&[]).is_err());
    }

    #[test]
    fn find_bin_per_axis() {
        let b = base();
        let found = b.find_bin(&[9.0.into(), "z".into()]).unwrap();
        assert_eq!(found, vec![Some(AxisIndex::Bin(5)), Some(AxisIndex::from("UNCATEGORISED"))]);
    }

    #[test]
    fn extend_axes_rebuilds_indexer() {
        let mut b = base();
        let (infos, offset) = b.extend_axes(&[0.5.into(), "z".into()]).unwrap();
        assert_eq!(infos.len(), 2);
        assert!(infos.iter().all(ExtensionInfo::is_identity));
        assert_eq!(b.indexer().axis_sizes(), &[6, 3]);
        assert_eq!(offset, 5);
        assert_eq!(b.bin_offset_from_values(&[0.5.into(), "z".into()]).unwrap(), Some(5));
    }

    #[test]
    fn failed_extension_leaves_axes_untouched() {
        let mut b = HistogramBase::new(vec![
            CategoryAxis::new("c", vec!["a".into()], true).unwrap().into(),
            FixedBinAxis::new("x", 2, 0.0, 2.0, ExtensionPolicy::PreserveBinWidth).unwrap().into(),
        ])
        .unwrap();
        let before = b.clone();
        assert!(b.extend_axes(&["new".into(), 2.5.into()]).is_err());
        assert_eq!(b, before);
    }

    #[test]
    fn variable_axis_never_grows() {
        let mut b = HistogramBase::new(vec![VariableBinAxis::new("v", vec![0.0, 1.0]).unwrap().into()])
            .unwrap();
        let (infos, offset) = b.extend_axes(&[5.0.into()]).unwrap();
        assert!(infos[0].is_identity());
        assert_eq!(offset, 2);
        assert_eq!(b.full_n_bins(), 3);
    }
}
