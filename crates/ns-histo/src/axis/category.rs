//! String category axis.

use super::{Extension, ExtensionInfo, Growth};
use crate::error::{HistError, Result};

/// Name of the overflow bin of a non-extendable category axis.
pub const OVERFLOW_NAME: &str = "UNCATEGORISED";

/// An ordered list of distinct category names.
///
/// A non-extendable axis sends unknown names to a reserved overflow bin
/// ([`OVERFLOW_NAME`]) after the last category. An extendable axis has no
/// overflow bin and appends unknown names when extended.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAxis {
    label: String,
    categories: Vec<String>,
    extendable: bool,
}

impl CategoryAxis {
    /// Create an axis; names must be distinct and must not be [`OVERFLOW_NAME`].
    pub fn new(label: impl Into<String>, categories: Vec<String>, extendable: bool) -> Result<Self> {
        let label = label.into();
        for (i, name) in categories.iter().enumerate() {
            if name == OVERFLOW_NAME {
                return Err(HistError::InvalidAxis {
                    axis: label,
                    reason: format!("'{OVERFLOW_NAME}' is reserved"),
                });
            }
            if categories[..i].contains(name) {
                return Err(HistError::InvalidAxis {
                    axis: label,
                    reason: format!("duplicate category '{name}'"),
                });
            }
        }
        Ok(Self { label, categories, extendable })
    }

    /// Axis label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Category names in bin order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Whether unknown names are appended rather than sent to overflow.
    pub fn is_extendable(&self) -> bool {
        self.extendable
    }

    /// Number of categories.
    pub fn n_bins(&self) -> usize {
        self.categories.len()
    }

    /// Number of bins including the overflow bin, if any.
    pub fn full_n_bins(&self) -> usize {
        if self.extendable { self.categories.len() } else { self.categories.len() + 1 }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == name)
    }

    /// Offset of `name`, falling back to the overflow bin when not extendable.
    pub(crate) fn offset_of(&self, name: &str) -> Option<usize> {
        match self.position(name) {
            Some(pos) => Some(pos),
            None if self.extendable => None,
            None => Some(self.categories.len()),
        }
    }

    pub(crate) fn name_at(&self, offset: usize) -> &str {
        self.categories.get(offset).map_or(OVERFLOW_NAME, String::as_str)
    }

    pub(crate) fn find_bin<'a>(&'a self, name: &'a str) -> &'a str {
        if self.contains_value(name) { name } else { OVERFLOW_NAME }
    }

    pub(crate) fn contains_value(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub(crate) fn plan_extension(&self, name: &str) -> Result<Extension> {
        let old = self.full_n_bins();
        match self.offset_of(name) {
            Some(offset) => Ok(Extension::unchanged(old, offset)),
            None if name == OVERFLOW_NAME => Err(HistError::InvalidAxis {
                axis: self.label.clone(),
                reason: format!("'{OVERFLOW_NAME}' is reserved"),
            }),
            None => Ok(Extension {
                info: ExtensionInfo::identity(old),
                offset: self.categories.len(),
                growth: Growth::Append(name.to_string()),
            }),
        }
    }

    pub(crate) fn push(&mut self, name: String) {
        self.categories.push(name);
    }

    pub(crate) fn compare(&self, other: &CategoryAxis) -> Result<ExtensionInfo> {
        if self.extendable != other.extendable {
            return Err(HistError::IncompatibleMerge(format!(
                "axis '{}': extendable flags differ",
                self.label
            )));
        }
        if self.categories == other.categories {
            return Ok(ExtensionInfo::identity(other.full_n_bins()));
        }
        if !self.extendable {
            return Err(HistError::IncompatibleMerge(format!(
                "axis '{}': categories do not match on a non-extendable axis",
                self.label
            )));
        }
        let table = other
            .categories
            .iter()
            .map(|name| {
                self.position(name).ok_or_else(|| {
                    HistError::IncompatibleMerge(format!(
                        "axis '{}': missing category '{name}'",
                        self.label
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ExtensionInfo::lookup(table))
    }

    /// Union with `other`. The caller has already checked labels.
    pub(crate) fn merge(&mut self, other: &CategoryAxis) -> Result<()> {
        if self.extendable != other.extendable {
            return Err(HistError::IncompatibleMerge(format!(
                "axis '{}': extendable flags differ",
                self.label
            )));
        }
        if !self.extendable {
            return self.compare(other).map(|_| ());
        }
        for name in &other.categories {
            if !self.contains_value(name) {
                self.categories.push(name.clone());
            }
        }
        Ok(())
    }
}
