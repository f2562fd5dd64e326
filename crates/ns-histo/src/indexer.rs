//! Row-major offset arithmetic for a flat array that stores an N-d array.
//!
//! The last axis varies fastest (C ordering). [`Cursor`] walks every
//! coordinate like a mixed-radix odometer and can step in both directions;
//! [`Coords`] wraps a pair of cursors as a double-ended iterator.

use crate::error::{HistError, Result};

/// Maps between flat offsets and per-axis coordinates for fixed axis extents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayIndexer {
    axis_sizes: Vec<usize>,
    strides: Vec<usize>,
}

impl ArrayIndexer {
    /// Create an indexer for the given per-axis extents.
    pub fn new(axis_sizes: Vec<usize>) -> Self {
        let mut strides = vec![1usize; axis_sizes.len()];
        for i in (0..axis_sizes.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * axis_sizes[i + 1];
        }
        Self { axis_sizes, strides }
    }

    /// Number of dimensions.
    #[inline]
    pub fn n_dims(&self) -> usize {
        self.axis_sizes.len()
    }

    /// Extent of each axis.
    #[inline]
    pub fn axis_sizes(&self) -> &[usize] {
        &self.axis_sizes
    }

    /// Row-major strides (`strides[n-1] == 1`).
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Number of cells in the array. An indexer with no axes has one cell.
    pub fn total_entries(&self) -> usize {
        self.axis_sizes.iter().product()
    }

    /// Flat offset of `coords`, validating dimension and bounds.
    pub fn offset(&self, coords: &[usize]) -> Result<usize> {
        if coords.len() != self.n_dims() {
            return Err(HistError::DimensionMismatch { expected: self.n_dims(), got: coords.len() });
        }
        if let Some((axis, (&c, &s))) =
            coords.iter().zip(&self.axis_sizes).enumerate().find(|(_, (c, s))| c >= s)
        {
            return Err(HistError::OutOfRange(format!(
                "coordinate {c} on axis {axis} exceeds extent {s}"
            )));
        }
        Ok(self.offset_unchecked(coords))
    }

    /// Flat offset of `coords` without any validation.
    ///
    /// Callers must guarantee `coords.len() == n_dims()` and every coordinate
    /// is below its extent.
    #[inline]
    pub fn offset_unchecked(&self, coords: &[usize]) -> usize {
        coords.iter().zip(&self.strides).map(|(c, s)| c * s).sum()
    }

    /// Inverse of [`offset`](Self::offset): most-significant axis first.
    pub fn coords_from_offset(&self, mut offset: usize) -> Vec<usize> {
        self.strides
            .iter()
            .map(|&stride| {
                let c = offset.checked_div(stride).unwrap_or(0);
                offset = offset.checked_rem(stride).unwrap_or(0);
                c
            })
            .collect()
    }

    /// Cursor at the first coordinate (equal to [`end`](Self::end) if any extent is zero).
    pub fn begin(&self) -> Cursor<'_> {
        let pos = if self.axis_sizes.contains(&0) { None } else { Some(vec![0; self.n_dims()]) };
        Cursor { sizes: &self.axis_sizes, pos }
    }

    /// The end sentinel, one step past the last coordinate.
    pub fn end(&self) -> Cursor<'_> {
        Cursor { sizes: &self.axis_sizes, pos: None }
    }

    /// Iterate over every coordinate in row-major order.
    pub fn iter(&self) -> Coords<'_> {
        Coords { front: self.begin(), back: self.end(), remaining: self.total_entries() }
    }
}

impl<'a> IntoIterator for &'a ArrayIndexer {
    type Item = Vec<usize>;
    type IntoIter = Coords<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A bidirectional position in the coordinate sequence of an [`ArrayIndexer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<'a> {
    sizes: &'a [usize],
    /// `None` is the end sentinel.
    pos: Option<Vec<usize>>,
}

impl Cursor<'_> {
    /// Current coordinates, or `None` at the end sentinel.
    #[inline]
    pub fn coords(&self) -> Option<&[usize]> {
        self.pos.as_deref()
    }

    /// Whether this is the end sentinel.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.pos.is_none()
    }

    /// Flat offset of the current position, or `None` at the end sentinel.
    pub fn offset(&self) -> Option<usize> {
        let pos = self.pos.as_ref()?;
        let mut stride = 1;
        let mut offset = 0;
        for (&p, &s) in pos.iter().zip(self.sizes).rev() {
            offset += p * stride;
            stride *= s;
        }
        Some(offset)
    }

    /// Step forward, carrying into earlier axes. Incrementing the end sentinel is a no-op.
    pub fn increment(&mut self) {
        let Some(pos) = self.pos.as_mut() else {
            return;
        };
        for (p, &s) in pos.iter_mut().zip(self.sizes).rev() {
            *p += 1;
            if *p != s {
                return;
            }
            *p = 0;
        }
        self.pos = None;
    }

    /// Step backward. Decrementing the end sentinel yields the last coordinate;
    /// decrementing the first coordinate is an error and leaves the cursor unchanged.
    pub fn decrement(&mut self) -> Result<()> {
        let Some(pos) = self.pos.as_mut() else {
            if self.sizes.contains(&0) {
                return Err(HistError::InvalidIteration);
            }
            self.pos = Some(self.sizes.iter().map(|s| s - 1).collect());
            return Ok(());
        };
        for (p, &s) in pos.iter_mut().zip(self.sizes).rev() {
            if *p != 0 {
                *p -= 1;
                return Ok(());
            }
            *p = s - 1;
        }
        // every axis wrapped: we were at the first coordinate
        pos.iter_mut().for_each(|p| *p = 0);
        Err(HistError::InvalidIteration)
    }
}

/// Double-ended iterator over all coordinates of an [`ArrayIndexer`].
#[derive(Debug, Clone)]
pub struct Coords<'a> {
    front: Cursor<'a>,
    back: Cursor<'a>,
    remaining: usize,
}

impl Iterator for Coords<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let coords = self.front.coords()?.to_vec();
        self.front.increment();
        self.remaining -= 1;
        Some(coords)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Coords<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.back.decrement().ok()?;
        self.remaining -= 1;
        self.back.coords().map(<[usize]>::to_vec)
    }
}

impl ExactSizeIterator for Coords<'_> {}
