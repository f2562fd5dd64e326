//! Histogram axes.
//!
//! An [`Axis`] is one of three binning strategies. Every axis maps an
//! observed [`AxisValue`] to a bin offset within the axis (including any
//! reserved under/overflow bins), and a stable [`AxisIndex`] to and from that
//! offset.
//!
//! Two operations change or reconcile bin numbering. Both describe the change
//! as an [`ExtensionInfo`] remap from the old numbering to the new one:
//!
//! - extension grows an extendable axis so that a previously unknown value
//!   gets a bin;
//! - comparison aligns another instance of the same axis onto this one
//!   without mutating either.

mod category;
mod fixed;
mod variable;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HistError, Result};

pub use category::{CategoryAxis, OVERFLOW_NAME};
pub use fixed::{ExtensionPolicy, FixedBinAxis};
pub use variable::VariableBinAxis;

/// A raw observation along one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    /// Numeric observation.
    Number(f64),
    /// Category name.
    Str(String),
}

impl AxisValue {
    /// Numeric payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AxisValue::Number(v) => Some(*v),
            AxisValue::Str(_) => None,
        }
    }

    /// String payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AxisValue::Str(s) => Some(s),
            AxisValue::Number(_) => None,
        }
    }
}

impl From<f64> for AxisValue {
    fn from(v: f64) -> Self {
        AxisValue::Number(v)
    }
}

impl From<&str> for AxisValue {
    fn from(s: &str) -> Self {
        AxisValue::Str(s.to_string())
    }
}

impl From<String> for AxisValue {
    fn from(s: String) -> Self {
        AxisValue::Str(s)
    }
}

/// Stable identifier of a bin: a category name or a numeric bin number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisIndex {
    /// Numeric bin number (equal to the bin offset on numeric axes).
    Bin(usize),
    /// Category name.
    Name(String),
}

impl From<usize> for AxisIndex {
    fn from(i: usize) -> Self {
        AxisIndex::Bin(i)
    }
}

impl From<&str> for AxisIndex {
    fn from(s: &str) -> Self {
        AxisIndex::Name(s.to_string())
    }
}

impl From<String> for AxisIndex {
    fn from(s: String) -> Self {
        AxisIndex::Name(s)
    }
}

impl fmt::Display for AxisIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisIndex::Bin(i) => write!(f, "{i}"),
            AxisIndex::Name(s) => f.write_str(s),
        }
    }
}

/// The kind of data stored along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisType {
    /// String categories.
    Category,
    /// Numeric ranges.
    Numeric,
}

/// How old bin offsets move to new ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remap {
    /// Bin numbering is unchanged.
    Identity,
    /// Every bin moves up by a constant (bins were inserted below).
    Shift(usize),
    /// Bin `i` moves to `table[i]`.
    Lookup(Vec<usize>),
}

/// A remap from an old bin numbering to a new one, with the old bin count.
///
/// Applying it to every offset in `0..old_n_bins` yields an offset inside the
/// new axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionInfo {
    /// The offset mapping.
    pub remap: Remap,
    /// Number of bins (including under/overflow) in the old numbering.
    pub old_n_bins: usize,
}

impl ExtensionInfo {
    /// Numbering unchanged.
    pub fn identity(old_n_bins: usize) -> Self {
        Self { remap: Remap::Identity, old_n_bins }
    }

    /// Every old bin moves up by `shift`.
    pub fn shift(old_n_bins: usize, shift: usize) -> Self {
        if shift == 0 {
            return Self::identity(old_n_bins);
        }
        Self { remap: Remap::Shift(shift), old_n_bins }
    }

    /// Old bin `i` moves to `table[i]`.
    pub fn lookup(table: Vec<usize>) -> Self {
        Self { old_n_bins: table.len(), remap: Remap::Lookup(table) }
    }

    /// New offset of old bin `old`.
    #[inline]
    pub fn apply(&self, old: usize) -> usize {
        match &self.remap {
            Remap::Identity => old,
            Remap::Shift(k) => old + k,
            Remap::Lookup(table) => table[old],
        }
    }

    /// Whether this remap leaves every bin in place.
    pub fn is_identity(&self) -> bool {
        match &self.remap {
            Remap::Identity => true,
            Remap::Shift(k) => *k == 0,
            Remap::Lookup(table) => table.iter().enumerate().all(|(i, &t)| i == t),
        }
    }
}

/// Structural change an extension will make once applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Growth {
    Unchanged,
    Below(usize),
    Above(usize),
    Append(String),
}

/// A validated, not yet applied, axis extension.
#[derive(Debug, Clone)]
pub(crate) struct Extension {
    pub(crate) info: ExtensionInfo,
    /// Offset of the triggering value after the growth is applied.
    pub(crate) offset: usize,
    pub(crate) growth: Growth,
}

impl Extension {
    pub(crate) fn unchanged(old_n_bins: usize, offset: usize) -> Self {
        Self { info: ExtensionInfo::identity(old_n_bins), offset, growth: Growth::Unchanged }
    }
}

/// One histogram axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Axis {
    /// Equal-width numeric bins.
    Fixed(FixedBinAxis),
    /// Numeric bins with explicit edges.
    Variable(VariableBinAxis),
    /// String categories.
    Category(CategoryAxis),
}

impl Axis {
    /// Kind of data stored along the axis.
    pub fn axis_type(&self) -> AxisType {
        match self {
            Axis::Fixed(_) | Axis::Variable(_) => AxisType::Numeric,
            Axis::Category(_) => AxisType::Category,
        }
    }

    /// Descriptive label.
    pub fn label(&self) -> &str {
        match self {
            Axis::Fixed(a) => a.label(),
            Axis::Variable(a) => a.label(),
            Axis::Category(a) => a.label(),
        }
    }

    /// Whether the axis grows to admit unknown values.
    pub fn is_extendable(&self) -> bool {
        match self {
            Axis::Fixed(a) => a.is_extendable(),
            Axis::Variable(_) => false,
            Axis::Category(a) => a.is_extendable(),
        }
    }

    /// Number of regular (non-overflow) bins.
    pub fn n_bins(&self) -> usize {
        match self {
            Axis::Fixed(a) => a.n_bins(),
            Axis::Variable(a) => a.n_bins(),
            Axis::Category(a) => a.n_bins(),
        }
    }

    /// Number of bins including reserved under/overflow bins.
    pub fn full_n_bins(&self) -> usize {
        match self {
            Axis::Fixed(a) => a.full_n_bins(),
            Axis::Variable(a) => a.full_n_bins(),
            Axis::Category(a) => a.full_n_bins(),
        }
    }

    /// Bin offset holding `value`, or `None` if no bin exists yet.
    pub fn bin_offset_from_value(&self, value: &AxisValue) -> Result<Option<usize>> {
        match self {
            Axis::Fixed(a) => Ok(a.find_offset(self.numeric(value)?)),
            Axis::Variable(a) => Ok(Some(a.find_offset(self.numeric(value)?))),
            Axis::Category(a) => Ok(a.offset_of(self.string(value)?)),
        }
    }

    /// Bin offset identified by `index`, or `None` if no such bin exists.
    pub fn bin_offset_from_index(&self, index: &AxisIndex) -> Result<Option<usize>> {
        match (self, index) {
            (Axis::Fixed(_) | Axis::Variable(_), AxisIndex::Bin(i)) => {
                Ok((*i < self.full_n_bins()).then_some(*i))
            }
            (Axis::Category(a), AxisIndex::Name(name)) => Ok(a.offset_of(name)),
            (Axis::Category(a), AxisIndex::Bin(_)) => {
                Err(HistError::ValueKind { axis: a.label().to_string(), expected: "string" })
            }
            (_, AxisIndex::Name(_)) => {
                Err(HistError::ValueKind { axis: self.label().to_string(), expected: "numeric" })
            }
        }
    }

    /// Stable index of the bin at `offset`.
    pub fn index_from_bin_offset(&self, offset: usize) -> AxisIndex {
        match self {
            Axis::Fixed(_) | Axis::Variable(_) => AxisIndex::Bin(offset),
            Axis::Category(a) => AxisIndex::Name(a.name_at(offset).to_string()),
        }
    }

    /// Index of the bin that holds `value`.
    ///
    /// Values outside the range of a non-extendable axis map to its
    /// under/overflow bin. `None` is only returned by an extendable
    /// fixed-width axis for a value outside its current range.
    pub fn find_bin(&self, value: &AxisValue) -> Result<Option<AxisIndex>> {
        match self {
            Axis::Fixed(a) => Ok(a.find_offset(self.numeric(value)?).map(AxisIndex::Bin)),
            Axis::Variable(a) => Ok(Some(AxisIndex::Bin(a.find_offset(self.numeric(value)?)))),
            Axis::Category(a) => Ok(Some(AxisIndex::Name(a.find_bin(self.string(value)?).to_string()))),
        }
    }

    /// Whether `value` falls in a regular (non-overflow) bin.
    pub fn contains_value(&self, value: &AxisValue) -> Result<bool> {
        match self {
            Axis::Fixed(a) => Ok(a.contains_value(self.numeric(value)?)),
            Axis::Variable(a) => Ok(a.contains_value(self.numeric(value)?)),
            Axis::Category(a) => Ok(a.contains_value(self.string(value)?)),
        }
    }

    /// Grow the axis so that `value` has a bin.
    ///
    /// Returns the remap from the old bin numbering and the offset of the bin
    /// holding `value`. Axes that already hold `value` return an identity remap.
    pub fn extend_axis(&mut self, value: &AxisValue) -> Result<(ExtensionInfo, usize)> {
        let ext = self.plan_extension(value)?;
        self.apply_extension(&ext.growth);
        Ok((ext.info, ext.offset))
    }

    /// Remap from `other`'s bin numbering into this axis's numbering.
    ///
    /// Fails if `other` holds bins this axis cannot represent.
    pub fn compare_axis(&self, other: &Axis) -> Result<ExtensionInfo> {
        match (self, other) {
            (Axis::Fixed(a), Axis::Fixed(b)) => a.compare(b),
            (Axis::Variable(a), Axis::Variable(b)) => a.compare(b),
            (Axis::Category(a), Axis::Category(b)) => a.compare(b),
            _ => Err(self.kind_mismatch(other)),
        }
    }

    /// Widen this axis in place so that it covers `other` as well.
    pub fn merge(&mut self, other: &Axis) -> Result<()> {
        if self.label() != other.label() {
            return Err(HistError::IncompatibleMerge(format!(
                "axis labels do not match '{}' != '{}'",
                self.label(),
                other.label()
            )));
        }
        match (&mut *self, other) {
            (Axis::Fixed(a), Axis::Fixed(b)) => a.merge(b),
            (Axis::Variable(a), Axis::Variable(b)) => a.merge(b),
            (Axis::Category(a), Axis::Category(b)) => a.merge(b),
            _ => Err(self.kind_mismatch(other)),
        }
    }

    /// Validate an extension for `value` without mutating the axis.
    pub(crate) fn plan_extension(&self, value: &AxisValue) -> Result<Extension> {
        match self {
            Axis::Fixed(a) => a.plan_extension(self.numeric(value)?),
            Axis::Variable(a) => Ok(a.plan_extension(self.numeric(value)?)),
            Axis::Category(a) => a.plan_extension(self.string(value)?),
        }
    }

    /// Apply a growth previously returned by [`plan_extension`](Self::plan_extension).
    pub(crate) fn apply_extension(&mut self, growth: &Growth) {
        match (self, growth) {
            (_, Growth::Unchanged) => {}
            (Axis::Fixed(a), Growth::Below(n)) => a.grow_below(*n),
            (Axis::Fixed(a), Growth::Above(n)) => a.grow_above(*n),
            (Axis::Category(a), Growth::Append(name)) => a.push(name.clone()),
            // A plan only ever carries growths of its own axis kind.
            (axis, growth) => {
                log::warn!("ignoring growth {growth:?} for axis '{}'", axis.label());
            }
        }
    }

    fn numeric(&self, value: &AxisValue) -> Result<f64> {
        value
            .as_number()
            .ok_or_else(|| HistError::ValueKind { axis: self.label().to_string(), expected: "numeric" })
    }

    fn string<'v>(&self, value: &'v AxisValue) -> Result<&'v str> {
        value
            .as_str()
            .ok_or_else(|| HistError::ValueKind { axis: self.label().to_string(), expected: "string" })
    }

    fn kind_mismatch(&self, other: &Axis) -> HistError {
        HistError::IncompatibleMerge(format!(
            "axis '{}' ({}) cannot be combined with axis '{}' ({})",
            self.label(),
            self.kind_name(),
            other.label(),
            other.kind_name()
        ))
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Axis::Fixed(_) => "fixed-width",
            Axis::Variable(_) => "variable-width",
            Axis::Category(_) => "category",
        }
    }
}

impl From<FixedBinAxis> for Axis {
    fn from(a: FixedBinAxis) -> Self {
        Axis::Fixed(a)
    }
}

impl From<VariableBinAxis> for Axis {
    fn from(a: VariableBinAxis) -> Self {
        Axis::Variable(a)
    }
}

impl From<CategoryAxis> for Axis {
    fn from(a: CategoryAxis) -> Self {
        Axis::Category(a)
    }
}
