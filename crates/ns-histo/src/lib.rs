//! # ns-histo
//!
//! Extendable N-dimensional histograms for NextStat.
//!
//! A histogram is a list of axes (equal-width, explicit-edge or string
//! category) plus flat storage for weighted counts and sums of squared
//! weights. Extendable axes grow when a value outside the current range is
//! filled, and histograms filled independently (e.g. one per worker) can be
//! merged, in memory or in encoded form.
//!
//! ## Example
//!
//! ```
//! use ns_histo::{AxisIndex, CategoryAxis, ExtensionPolicy, FixedBinAxis, Histogram};
//!
//! let mut h = Histogram::<f64>::new(vec![
//!     FixedBinAxis::new("pt", 2, 0.0, 2.0, ExtensionPolicy::PreserveBinWidth).unwrap().into(),
//!     CategoryAxis::new("channel", vec!["ee".into()], true).unwrap().into(),
//! ])
//! .unwrap();
//!
//! h.fill_weighted(&[0.5.into(), "ee".into()], 0.8).unwrap();
//! // Grows "pt" by three bins and appends the "mm" category.
//! h.fill(&[5.0.into(), "mm".into()]).unwrap();
//!
//! assert_eq!(h.axes()[0].n_bins(), 5);
//! assert_eq!(h.contents(&[AxisIndex::Bin(0), "ee".into()]).unwrap(), 0.8);
//! assert_eq!(h.contents(&[AxisIndex::Bin(4), "mm".into()]).unwrap(), 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod axis;
pub mod codec;
pub mod config;
pub mod error;
pub mod histogram;
pub mod indexer;
pub mod storage;

pub use axis::{
    Axis, AxisIndex, AxisType, AxisValue, CategoryAxis, ExtensionInfo, ExtensionPolicy,
    FixedBinAxis, OVERFLOW_NAME, Remap, VariableBinAxis,
};
pub use codec::{
    AxisRegistry, AxisSchema, Encoded, EncodedAxis, HistogramSchema, decode, decode_axis, encode,
    encode_axis, merge_encoded,
};
pub use config::{AxisConfig, HistogramConfig};
pub use error::{HistError, Result};
pub use histogram::{Bins, BinsMut, Histogram, HistogramBase};
pub use indexer::{ArrayIndexer, Coords, Cursor};
pub use storage::{Storage, StorageKind};
