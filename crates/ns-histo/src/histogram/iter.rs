//! Cell iterators. Both borrow the histogram, so it cannot be resized while
//! an iterator is alive.

use std::slice;

use super::HistogramBase;
use crate::axis::AxisIndex;

/// Iterator over `(indices, contents, sum_w2)` of every cell.
#[derive(Debug, Clone)]
pub struct Bins<'a, T> {
    base: &'a HistogramBase,
    counts: slice::Iter<'a, T>,
    sum_w2: slice::Iter<'a, T>,
    front: usize,
    back: usize,
}

impl<'a, T> Bins<'a, T> {
    pub(super) fn new(base: &'a HistogramBase, counts: &'a [T], sum_w2: &'a [T]) -> Self {
        Self { base, counts: counts.iter(), sum_w2: sum_w2.iter(), front: 0, back: counts.len() }
    }
}

impl<'a, T> Iterator for Bins<'a, T> {
    type Item = (Vec<AxisIndex>, &'a T, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.counts.next()?;
        let w = self.sum_w2.next()?;
        let indices = self.base.indices_from_offset(self.front);
        self.front += 1;
        Some((indices, c, w))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.counts.size_hint()
    }
}

impl<T> DoubleEndedIterator for Bins<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let c = self.counts.next_back()?;
        let w = self.sum_w2.next_back()?;
        self.back -= 1;
        Some((self.base.indices_from_offset(self.back), c, w))
    }
}

impl<T> ExactSizeIterator for Bins<'_, T> {}

/// Iterator over `(indices, &mut contents, &mut sum_w2)` of every cell.
#[derive(Debug)]
pub struct BinsMut<'a, T> {
    base: &'a HistogramBase,
    counts: slice::IterMut<'a, T>,
    sum_w2: slice::IterMut<'a, T>,
    front: usize,
    back: usize,
}

impl<'a, T> BinsMut<'a, T> {
    pub(super) fn new(base: &'a HistogramBase, counts: &'a mut [T], sum_w2: &'a mut [T]) -> Self {
        let back = counts.len();
        Self { base, counts: counts.iter_mut(), sum_w2: sum_w2.iter_mut(), front: 0, back }
    }
}

impl<'a, T> Iterator for BinsMut<'a, T> {
    type Item = (Vec<AxisIndex>, &'a mut T, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.counts.next()?;
        let w = self.sum_w2.next()?;
        let indices = self.base.indices_from_offset(self.front);
        self.front += 1;
        Some((indices, c, w))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.counts.size_hint()
    }
}

impl<T> DoubleEndedIterator for BinsMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let c = self.counts.next_back()?;
        let w = self.sum_w2.next_back()?;
        self.back -= 1;
        Some((self.base.indices_from_offset(self.back), c, w))
    }
}

impl<T> ExactSizeIterator for BinsMut<'_, T> {}
