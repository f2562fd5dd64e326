//! Declarative histogram definitions.
//!
//! A [`HistogramConfig`] describes a histogram's storage kind and axes in
//! JSON, e.g.
//!
//! ```json
//! {
//!   "storage": "f64",
//!   "axes": [
//!     { "type": "fixed", "label": "pt", "n_bins": 10, "min": 0.0, "max": 100.0,
//!       "extension": "preserve_bin_width" },
//!     { "type": "variable", "label": "eta", "edges": [-2.5, 0.0, 2.5] },
//!     { "type": "category", "label": "channel", "categories": ["ee", "mm"] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::axis::{Axis, CategoryAxis, ExtensionPolicy, FixedBinAxis, VariableBinAxis};
use crate::error::{HistError, Result};
use crate::histogram::Histogram;
use crate::storage::{Storage, StorageKind};

/// Top-level histogram definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramConfig {
    /// Storage kind the histogram is meant to be built with.
    #[serde(default = "default_storage")]
    pub storage: StorageKind,
    /// Axes in order.
    pub axes: Vec<AxisConfig>,
}

fn default_storage() -> StorageKind {
    StorageKind::F64
}

/// Definition of one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AxisConfig {
    /// Equal-width bins.
    Fixed {
        /// Axis label.
        label: String,
        /// Number of regular bins.
        n_bins: usize,
        /// Lower edge.
        min: f64,
        /// Upper edge.
        max: f64,
        /// Growth policy.
        #[serde(default)]
        extension: ExtensionPolicy,
    },
    /// Explicit bin edges.
    Variable {
        /// Axis label.
        label: String,
        /// Strictly increasing edges.
        edges: Vec<f64>,
    },
    /// String categories.
    Category {
        /// Axis label.
        label: String,
        /// Initial categories.
        #[serde(default)]
        categories: Vec<String>,
        /// Append unknown names instead of using the overflow bin.
        #[serde(default)]
        extendable: bool,
    },
}

impl AxisConfig {
    /// Construct the axis, applying constructor validation.
    pub fn build(&self) -> Result<Axis> {
        Ok(match self {
            AxisConfig::Fixed { label, n_bins, min, max, extension } => {
                FixedBinAxis::new(label.clone(), *n_bins, *min, *max, *extension)?.into()
            }
            AxisConfig::Variable { label, edges } => VariableBinAxis::new(label.clone(), edges.clone())?.into(),
            AxisConfig::Category { label, categories, extendable } => {
                CategoryAxis::new(label.clone(), categories.clone(), *extendable)?.into()
            }
        })
    }
}

impl From<&Axis> for AxisConfig {
    fn from(axis: &Axis) -> Self {
        match axis {
            Axis::Fixed(a) => AxisConfig::Fixed {
                label: a.label().to_string(),
                n_bins: a.n_bins(),
                min: a.min(),
                max: a.max(),
                extension: a.extension(),
            },
            Axis::Variable(a) => {
                AxisConfig::Variable { label: a.label().to_string(), edges: a.edges().to_vec() }
            }
            Axis::Category(a) => AxisConfig::Category {
                label: a.label().to_string(),
                categories: a.categories().to_vec(),
                extendable: a.is_extendable(),
            },
        }
    }
}

impl HistogramConfig {
    /// Parse a JSON definition.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Definition matching an existing histogram's current axes.
    pub fn from_histogram<T: Storage>(hist: &Histogram<T>) -> Self {
        Self { storage: T::KIND, axes: hist.axes().iter().map(AxisConfig::from).collect() }
    }

    /// Construct all axes.
    pub fn build_axes(&self) -> Result<Vec<Axis>> {
        self.axes.iter().map(AxisConfig::build).collect()
    }

    /// Construct an empty histogram with storage `T`.
    ///
    /// `T` must match the configured storage kind.
    pub fn build<T: Storage>(&self) -> Result<Histogram<T>> {
        if T::KIND != self.storage {
            return Err(HistError::Deserialization(format!(
                "config declares {} storage, requested {}",
                self.storage.name(),
                T::KIND.name()
            )));
        }
        Histogram::new(self.build_axes()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "storage": "u32",
        "axes": [
            { "type": "fixed", "label": "x", "n_bins": 2, "min": 0.0, "max": 2.0,
              "extension": "preserve_bin_width" },
            { "type": "variable", "label": "y", "edges": [0.0, 1.0, 4.0] },
            { "type": "category", "label": "c", "categories": ["a"] }
        ]
    }"#;

    #[test]
    fn parse_and_build() {
        let cfg = HistogramConfig::from_json_str(JSON).unwrap();
        assert_eq!(cfg.storage, StorageKind::U32);
        let h = cfg.build::<u32>().unwrap();
        assert_eq!(h.n_dims(), 3);
        assert!(h.axes()[0].is_extendable());
        assert!(!h.axes()[2].is_extendable());
        assert_eq!(h.counts().len(), 2 * 4 * 2);
    }

    #[test]
    fn defaults() {
        let cfg = HistogramConfig::from_json_str(
            r#"{ "axes": [{ "type": "fixed", "label": "x", "n_bins": 1, "min": 0, "max": 1 }] }"#,
        )
        .unwrap();
        assert_eq!(cfg.storage, StorageKind::F64);
        assert_eq!(
            cfg.axes[0],
            AxisConfig::Fixed { label: "x".into(), n_bins: 1, min: 0.0, max: 1.0, extension: ExtensionPolicy::None }
        );
    }

    #[test]
    fn storage_kind_must_match() {
        let cfg = HistogramConfig::from_json_str(JSON).unwrap();
        assert!(cfg.build::<f64>().is_err());
    }

    #[test]
    fn invalid_axis_is_reported() {
        let cfg = HistogramConfig::from_json_str(
            r#"{ "axes": [{ "type": "variable", "label": "y", "edges": [1.0, 0.0] }] }"#,
        )
        .unwrap();
        assert!(matches!(cfg.build_axes(), Err(HistError::InvalidAxis { .. })));
        assert!(matches!(HistogramConfig::from_json_str("{"), Err(HistError::Json(_))));
    }

    #[test]
    fn reflects_grown_axes() {
        let mut h = HistogramConfig::from_json_str(JSON).unwrap().build::<u32>().unwrap();
        h.fill(&[3.0.into(), 0.5.into(), "a".into()]).unwrap();
        let cfg = HistogramConfig::from_histogram(&h);
        let AxisConfig::Fixed { n_bins, max, .. } = &cfg.axes[0] else {
            panic!("expected a fixed axis");
        };
        assert_eq!((*n_bins, *max), (3, 3.0));
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(HistogramConfig::from_json_str(&json).unwrap(), cfg);
    }
}
