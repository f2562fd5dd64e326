//! Error types for histogram construction, filling, merging and encoding.

use thiserror::Error;

/// Errors that can occur while building, filling, merging or decoding histograms.
#[derive(Error, Debug)]
pub enum HistError {
    /// Wrong number of axis values/indices (or axes) supplied.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Number of dimensions the receiver has.
        expected: usize,
        /// Number of dimensions supplied.
        got: usize,
    },

    /// Two axes or histograms cannot be reconciled.
    #[error("incompatible merge: {0}")]
    IncompatibleMerge(String),

    /// The axis extension policy is declared but not supported.
    #[error("unsupported extension policy: {0}")]
    UnsupportedExtension(String),

    /// A requested growth does not land on a whole number of bin widths.
    #[error("non-exact extension of axis '{axis}': value {value} is {gap} bin widths away")]
    NonExactExtension {
        /// Axis label.
        axis: String,
        /// Value that triggered the extension.
        value: f64,
        /// Distance from the axis edge, in bin widths.
        gap: f64,
    },

    /// Decrementing the start-of-sequence position.
    #[error("invalid iteration: cannot step before the first coordinate")]
    InvalidIteration,

    /// Coordinates or indices resolve to no bin.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// A string was given to a numeric axis, or a number to a category axis.
    #[error("axis '{axis}' expects a {expected} value")]
    ValueKind {
        /// Axis label.
        axis: String,
        /// Expected kind ("numeric" or "string").
        expected: &'static str,
    },

    /// Axis definition rejected at construction.
    #[error("invalid axis '{axis}': {reason}")]
    InvalidAxis {
        /// Axis label.
        axis: String,
        /// What was wrong.
        reason: String,
    },

    /// Buffer underflow (tried to read past end).
    #[error("unexpected end of buffer at offset {offset}, need {need} bytes, have {have}")]
    BufferUnderflow {
        /// Current offset in buffer.
        offset: usize,
        /// Bytes requested.
        need: usize,
        /// Bytes remaining.
        have: usize,
    },

    /// No decoder registered for an axis type identifier.
    #[error("unknown axis type: {0}")]
    UnknownAxisType(String),

    /// Encoded payload does not match its schema.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// A stored value cannot be represented in the requested storage type.
    #[error("value not representable as {0}")]
    Unrepresentable(&'static str),

    /// JSON (schema or config) error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for histogram operations.
pub type Result<T> = std::result::Result<T, HistError>;
