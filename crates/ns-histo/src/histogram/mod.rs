//! N-dimensional histograms with generic numeric storage.

mod base;
mod iter;

use crate::axis::{Axis, AxisIndex, AxisValue, ExtensionInfo};
use crate::error::{HistError, Result};
use crate::indexer::ArrayIndexer;
use crate::storage::Storage;

pub use base::HistogramBase;
pub use iter::{Bins, BinsMut};

/// Weighted counts and sums of squared weights over a set of axes.
///
/// Filling a value that no bin holds extends the extendable axes and moves
/// the existing contents into the new layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram<T: Storage> {
    base: HistogramBase,
    n_entries: u64,
    counts: Vec<T>,
    sum_w2: Vec<T>,
}

impl<T: Storage> Histogram<T> {
    /// Empty histogram over `axes`.
    pub fn new(axes: Vec<Axis>) -> Result<Self> {
        let base = HistogramBase::new(axes)?;
        let n = base.full_n_bins();
        Ok(Self { base, n_entries: 0, counts: vec![T::zero(); n], sum_w2: vec![T::zero(); n] })
    }

    /// Reassemble a histogram from its parts, checking storage lengths.
    pub fn from_parts(axes: Vec<Axis>, n_entries: u64, counts: Vec<T>, sum_w2: Vec<T>) -> Result<Self> {
        let base = HistogramBase::new(axes)?;
        let n = base.full_n_bins();
        if counts.len() != n || sum_w2.len() != n {
            return Err(HistError::Deserialization(format!(
                "storage length mismatch: axes need {n} cells, got counts={} sum_w2={}",
                counts.len(),
                sum_w2.len()
            )));
        }
        Ok(Self { base, n_entries, counts, sum_w2 })
    }

    /// Axis bookkeeping.
    pub fn base(&self) -> &HistogramBase {
        &self.base
    }

    /// Number of axes.
    pub fn n_dims(&self) -> usize {
        self.base.n_dims()
    }

    /// All axes, in order.
    pub fn axes(&self) -> &[Axis] {
        self.base.axes()
    }

    /// Axis `idx`, if it exists.
    pub fn axis(&self, idx: usize) -> Option<&Axis> {
        self.base.axis(idx)
    }

    /// Number of `fill` calls (plus entries merged in from other histograms).
    pub fn n_entries(&self) -> u64 {
        self.n_entries
    }

    /// Flat bin contents in indexer order.
    pub fn counts(&self) -> &[T] {
        &self.counts
    }

    /// Flat sums of squared weights in indexer order.
    pub fn sum_w2_values(&self) -> &[T] {
        &self.sum_w2
    }

    /// Fill with unit weight.
    pub fn fill(&mut self, values: &[AxisValue]) -> Result<()> {
        self.fill_weighted(values, T::one())
    }

    /// Add `weight` to the bin holding `values`, extending axes if needed.
    pub fn fill_weighted(&mut self, values: &[AxisValue], weight: T) -> Result<()> {
        let offset = match self.base.bin_offset_from_values(values)? {
            Some(offset) => offset,
            None => {
                let old_indexer = self.base.indexer().clone();
                let (extensions, offset) = self.base.extend_axes(values)?;
                if self.base.indexer() != &old_indexer {
                    self.resize(&old_indexer, &extensions);
                }
                offset
            }
        };
        self.counts[offset] += weight;
        self.sum_w2[offset] += weight * weight;
        self.n_entries += 1;
        Ok(())
    }

    /// Contents of the bin named by `indices`.
    pub fn contents(&self, indices: &[AxisIndex]) -> Result<T> {
        Ok(self.counts[self.cell(indices)?])
    }

    /// Mutable contents of the bin named by `indices`.
    pub fn contents_mut(&mut self, indices: &[AxisIndex]) -> Result<&mut T> {
        let cell = self.cell(indices)?;
        Ok(&mut self.counts[cell])
    }

    /// Sum of squared weights of the bin named by `indices`.
    pub fn sum_w2(&self, indices: &[AxisIndex]) -> Result<T> {
        Ok(self.sum_w2[self.cell(indices)?])
    }

    /// Mutable sum of squared weights of the bin named by `indices`.
    pub fn sum_w2_mut(&mut self, indices: &[AxisIndex]) -> Result<&mut T> {
        let cell = self.cell(indices)?;
        Ok(&mut self.sum_w2[cell])
    }

    /// Add the contents of `other` into this histogram.
    ///
    /// Every axis of `other` must fit inside the matching axis of `self`
    /// (see [`Axis::compare_axis`]). All axes are checked before anything is
    /// modified; axes of `self` are never extended.
    pub fn merge(&mut self, other: &Histogram<T>) -> Result<()> {
        self.base.check_dims(other.n_dims())?;
        let remaps = self
            .axes()
            .iter()
            .zip(other.axes())
            .map(|(mine, theirs)| mine.compare_axis(theirs))
            .collect::<Result<Vec<_>>>()?;

        let same_layout = self.base.indexer().axis_sizes() == other.base.indexer().axis_sizes();
        if same_layout && remaps.iter().all(ExtensionInfo::is_identity) {
            add_cells(&mut self.counts, &other.counts);
            add_cells(&mut self.sum_w2, &other.sum_w2);
        } else {
            let indexer = self.base.indexer();
            let mut mapped = vec![0usize; remaps.len()];
            for (src, coords) in other.base.indexer().iter().enumerate() {
                remap_coords(&coords, &remaps, &mut mapped);
                let dst = indexer.offset_unchecked(&mapped);
                self.counts[dst] += other.counts[src];
                self.sum_w2[dst] += other.sum_w2[src];
            }
        }
        self.n_entries += other.n_entries;
        log::debug!("merged histogram with {} entries", other.n_entries);
        Ok(())
    }

    /// Iterate over `(indices, contents, sum_w2)` for every cell in indexer order.
    pub fn iter(&self) -> Bins<'_, T> {
        Bins::new(&self.base, &self.counts, &self.sum_w2)
    }

    /// Like [`iter`](Self::iter), with mutable access to the cells.
    pub fn iter_mut(&mut self) -> BinsMut<'_, T> {
        BinsMut::new(&self.base, &mut self.counts, &mut self.sum_w2)
    }

    fn cell(&self, indices: &[AxisIndex]) -> Result<usize> {
        self.base.bin_offset_from_indices(indices)?.ok_or_else(|| {
            let names: Vec<String> = indices.iter().map(ToString::to_string).collect();
            HistError::OutOfRange(format!("no bin at [{}]", names.join(", ")))
        })
    }

    /// Move the contents laid out by `old_indexer` into the current layout.
    fn resize(&mut self, old_indexer: &ArrayIndexer, extensions: &[ExtensionInfo]) {
        let n = self.base.full_n_bins();
        let old_counts = std::mem::replace(&mut self.counts, vec![T::zero(); n]);
        let old_sum_w2 = std::mem::replace(&mut self.sum_w2, vec![T::zero(); n]);
        let indexer = self.base.indexer();
        let mut mapped = vec![0usize; extensions.len()];
        for (src, coords) in old_indexer.iter().enumerate() {
            remap_coords(&coords, extensions, &mut mapped);
            let dst = indexer.offset_unchecked(&mapped);
            self.counts[dst] += old_counts[src];
            self.sum_w2[dst] += old_sum_w2[src];
        }
        log::debug!("resized storage from {} to {n} cells", old_indexer.total_entries());
    }
}

impl<'a, T: Storage> IntoIterator for &'a Histogram<T> {
    type Item = (Vec<AxisIndex>, &'a T, &'a T);
    type IntoIter = Bins<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Storage> IntoIterator for &'a mut Histogram<T> {
    type Item = (Vec<AxisIndex>, &'a mut T, &'a mut T);
    type IntoIter = BinsMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

fn remap_coords(coords: &[usize], remaps: &[ExtensionInfo], out: &mut [usize]) {
    for ((o, &c), remap) in out.iter_mut().zip(coords).zip(remaps) {
        *o = remap.apply(c);
    }
}

fn add_cells<T: Storage>(dst: &mut [T], src: &[T]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d += s;
    }
}
