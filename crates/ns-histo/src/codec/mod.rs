//! Binary encoding of axes and histograms, and merging of encoded histograms.
//!
//! An encoded object is a JSON-serializable schema plus a big-endian binary
//! payload. Axis types are named in the schema by a stable identifier and
//! resolved on decode through an explicit [`AxisRegistry`].
//!
//! Payload layout of a histogram: one length-prefixed block per axis, then
//! `n_entries` (u64), then all contents and all sums of squared weights in the
//! width of the schema's storage kind.

mod rbuffer;
mod wbuffer;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::axis::{Axis, CategoryAxis, ExtensionPolicy, FixedBinAxis, VariableBinAxis};
use crate::error::{HistError, Result};
use crate::histogram::Histogram;
use crate::storage::{Storage, StorageKind};

pub use rbuffer::RBuffer;
pub use wbuffer::WBuffer;

/// Version written into every [`HistogramSchema`].
pub const FORMAT_VERSION: u32 = 1;

/// Type identifier of [`FixedBinAxis`].
pub const FIXED_BIN_AXIS: &str = "FixedBinAxis";
/// Type identifier of [`VariableBinAxis`].
pub const VARIABLE_BIN_AXIS: &str = "VariableBinAxis";
/// Type identifier of [`CategoryAxis`].
pub const CATEGORY_AXIS: &str = "CategoryAxis";

/// Descriptor of one encoded axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSchema {
    /// Stable axis type identifier.
    pub type_id: String,
    /// Axis label.
    pub label: String,
}

/// Descriptor of an encoded histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramSchema {
    /// Payload format version.
    pub format_version: u32,
    /// Width and kind of the stored cells.
    pub storage: StorageKind,
    /// Axes in order.
    pub axes: Vec<AxisSchema>,
    /// Number of storage cells (including flow bins).
    pub n_cells: usize,
}

impl HistogramSchema {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// An encoded axis.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedAxis {
    /// Descriptor.
    pub schema: AxisSchema,
    /// Big-endian payload.
    pub buffer: Vec<u8>,
}

/// An encoded histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    /// Descriptor.
    pub schema: HistogramSchema,
    /// Big-endian payload.
    pub buffer: Vec<u8>,
}

/// Reads one axis payload.
pub type AxisDecoder = fn(&mut RBuffer<'_>) -> Result<Axis>;

/// Axis type identifier -> decoder.
#[derive(Debug, Clone, Default)]
pub struct AxisRegistry {
    decoders: HashMap<String, AxisDecoder>,
}

impl AxisRegistry {
    /// Registry with no decoders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry knowing the three built-in axis kinds.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(FIXED_BIN_AXIS, read_fixed);
        registry.register(VARIABLE_BIN_AXIS, read_variable);
        registry.register(CATEGORY_AXIS, read_category);
        registry
    }

    /// Add or replace the decoder for `type_id`.
    pub fn register(&mut self, type_id: impl Into<String>, decoder: AxisDecoder) {
        self.decoders.insert(type_id.into(), decoder);
    }

    /// Whether `type_id` has a decoder.
    pub fn contains(&self, type_id: &str) -> bool {
        self.decoders.contains_key(type_id)
    }

    /// Decode a single axis payload; the payload must be consumed exactly.
    pub fn decode(&self, schema: &AxisSchema, payload: &[u8]) -> Result<Axis> {
        let decoder = self
            .decoders
            .get(&schema.type_id)
            .ok_or_else(|| HistError::UnknownAxisType(schema.type_id.clone()))?;
        let mut r = RBuffer::new(payload);
        let axis = decoder(&mut r)?;
        if r.remaining() != 0 {
            return Err(HistError::Deserialization(format!(
                "{} trailing bytes after axis '{}'",
                r.remaining(),
                schema.label
            )));
        }
        if axis.label() != schema.label {
            return Err(HistError::Deserialization(format!(
                "axis label '{}' does not match schema label '{}'",
                axis.label(),
                schema.label
            )));
        }
        Ok(axis)
    }
}

/// Stable type identifier of `axis`.
pub fn type_id(axis: &Axis) -> &'static str {
    match axis {
        Axis::Fixed(_) => FIXED_BIN_AXIS,
        Axis::Variable(_) => VARIABLE_BIN_AXIS,
        Axis::Category(_) => CATEGORY_AXIS,
    }
}

/// Encode one axis.
pub fn encode_axis(axis: &Axis) -> Result<EncodedAxis> {
    let mut w = WBuffer::new();
    write_axis(&mut w, axis)?;
    Ok(EncodedAxis { schema: axis_schema(axis), buffer: w.into_bytes() })
}

/// Decode one axis through `registry`.
pub fn decode_axis(encoded: &EncodedAxis, registry: &AxisRegistry) -> Result<Axis> {
    registry.decode(&encoded.schema, &encoded.buffer)
}

/// Encode a histogram in its own storage kind.
pub fn encode<T: Storage>(hist: &Histogram<T>) -> Result<Encoded> {
    let mut w = WBuffer::new();
    for axis in hist.axes() {
        let mut block = WBuffer::new();
        write_axis(&mut block, axis)?;
        w.write_block(&block.into_bytes())?;
    }
    w.write_u64(hist.n_entries());
    w.write_cells(T::KIND, hist.counts())?;
    w.write_cells(T::KIND, hist.sum_w2_values())?;
    let schema = HistogramSchema {
        format_version: FORMAT_VERSION,
        storage: T::KIND,
        axes: hist.axes().iter().map(axis_schema).collect(),
        n_cells: hist.counts().len(),
    };
    Ok(Encoded { schema, buffer: w.into_bytes() })
}

/// Decode a histogram, casting every stored value to `T`.
pub fn decode<T: Storage>(encoded: &Encoded, registry: &AxisRegistry) -> Result<Histogram<T>> {
    let schema = &encoded.schema;
    let mut r = RBuffer::new(&encoded.buffer);
    let axes = read_axes(&mut r, schema, registry)?;
    let n_cells: usize = axes.iter().map(Axis::full_n_bins).product();
    if n_cells != schema.n_cells {
        return Err(HistError::Deserialization(format!(
            "schema declares {} cells, axes describe {n_cells}",
            schema.n_cells
        )));
    }
    let n_entries = r.read_u64()?;
    let counts = r.read_cells(schema.storage, n_cells)?;
    let sum_w2 = r.read_cells(schema.storage, n_cells)?;
    if r.remaining() != 0 {
        return Err(HistError::Deserialization(format!(
            "{} trailing bytes after histogram payload",
            r.remaining()
        )));
    }
    if schema.storage != T::KIND {
        log::debug!("decoded {} storage as {}", schema.storage.name(), T::KIND.name());
    }
    Histogram::from_parts(axes, n_entries, counts, sum_w2)
}

/// Combine encoded histograms (e.g. one per worker) into one.
///
/// Axes are union-merged across all inputs, so each input may cover a
/// different part of an extendable axis. The result uses the promoted
/// storage kind of all inputs.
pub fn merge_encoded(inputs: &[Encoded], registry: &AxisRegistry) -> Result<Encoded> {
    let (first, rest) = inputs
        .split_first()
        .ok_or_else(|| HistError::IncompatibleMerge("no histograms to merge".into()))?;

    let mut axes = decode_schema_axes(first, registry)?;
    let mut kind = first.schema.storage;
    for enc in rest {
        if enc.schema.axes.len() != axes.len() {
            return Err(HistError::DimensionMismatch {
                expected: axes.len(),
                got: enc.schema.axes.len(),
            });
        }
        for (mine, theirs) in first.schema.axes.iter().zip(&enc.schema.axes) {
            if mine.type_id != theirs.type_id {
                return Err(HistError::IncompatibleMerge(format!(
                    "axis '{}': type {} != {}",
                    mine.label, mine.type_id, theirs.type_id
                )));
            }
        }
        for (axis, other) in axes.iter_mut().zip(decode_schema_axes(enc, registry)?) {
            axis.merge(&other)?;
        }
        kind = kind.promote(enc.schema.storage);
    }
    if inputs.iter().any(|e| e.schema.storage != kind) {
        log::warn!("merge_encoded: promoting storage to {}", kind.name());
    }

    macro_rules! merge_as {
        ($t:ty) => {{
            let mut out = Histogram::<$t>::new(axes)?;
            for enc in inputs {
                out.merge(&decode::<$t>(enc, registry)?)?;
            }
            log::debug!("merge_encoded: combined {} histograms", inputs.len());
            encode(&out)
        }};
    }

    match kind {
        StorageKind::I8 => merge_as!(i8),
        StorageKind::U8 => merge_as!(u8),
        StorageKind::I16 => merge_as!(i16),
        StorageKind::U16 => merge_as!(u16),
        StorageKind::I32 => merge_as!(i32),
        StorageKind::U32 => merge_as!(u32),
        StorageKind::I64 => merge_as!(i64),
        StorageKind::U64 => merge_as!(u64),
        StorageKind::F32 => merge_as!(f32),
        StorageKind::F64 => merge_as!(f64),
    }
}

fn axis_schema(axis: &Axis) -> AxisSchema {
    AxisSchema { type_id: type_id(axis).to_string(), label: axis.label().to_string() }
}

fn decode_schema_axes(encoded: &Encoded, registry: &AxisRegistry) -> Result<Vec<Axis>> {
    read_axes(&mut RBuffer::new(&encoded.buffer), &encoded.schema, registry)
}

fn read_axes(r: &mut RBuffer<'_>, schema: &HistogramSchema, registry: &AxisRegistry) -> Result<Vec<Axis>> {
    if schema.format_version != FORMAT_VERSION {
        return Err(HistError::Deserialization(format!(
            "unsupported format version {}",
            schema.format_version
        )));
    }
    schema
        .axes
        .iter()
        .map(|axis_schema| {
            let len = r.read_u32()? as usize;
            registry.decode(axis_schema, r.read_bytes(len)?)
        })
        .collect()
}

fn write_axis(w: &mut WBuffer, axis: &Axis) -> Result<()> {
    w.write_string(axis.label())?;
    match axis {
        Axis::Fixed(a) => {
            w.write_len(a.n_bins());
            w.write_f64(a.min());
            w.write_f64(a.max());
            w.write_u8(a.extension().code());
        }
        Axis::Variable(a) => {
            w.write_len(a.edges().len());
            for &e in a.edges() {
                w.write_f64(e);
            }
        }
        Axis::Category(a) => {
            w.write_u8(u8::from(a.is_extendable()));
            w.write_len(a.categories().len());
            for name in a.categories() {
                w.write_string(name)?;
            }
        }
    }
    Ok(())
}

fn read_fixed(r: &mut RBuffer<'_>) -> Result<Axis> {
    let label = r.read_string()?;
    let n_bins = r.read_len()?;
    let min = r.read_f64()?;
    let max = r.read_f64()?;
    let code = r.read_u8()?;
    let policy = ExtensionPolicy::from_code(code)
        .ok_or_else(|| HistError::Deserialization(format!("unknown extension policy code {code}")))?;
    Ok(FixedBinAxis::new(label, n_bins, min, max, policy)?.into())
}

fn read_variable(r: &mut RBuffer<'_>) -> Result<Axis> {
    let label = r.read_string()?;
    let n = r.read_len()?;
    if n.saturating_mul(8) > r.remaining() {
        return Err(HistError::BufferUnderflow { offset: r.pos(), need: n.saturating_mul(8), have: r.remaining() });
    }
    let edges = (0..n).map(|_| r.read_f64()).collect::<Result<Vec<_>>>()?;
    Ok(VariableBinAxis::new(label, edges)?.into())
}

fn read_category(r: &mut RBuffer<'_>) -> Result<Axis> {
    let label = r.read_string()?;
    let extendable = match r.read_u8()? {
        0 => false,
        1 => true,
        b => return Err(HistError::Deserialization(format!("invalid extendable flag {b}"))),
    };
    let n = r.read_len()?;
    let mut names = Vec::with_capacity(n.min(r.remaining() / 4));
    for _ in 0..n {
        names.push(r.read_string()?);
    }
    Ok(CategoryAxis::new(label, names, extendable)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisIndex;

    fn sample() -> Histogram<u32> {
        let mut h = Histogram::new(vec![
            FixedBinAxis::new("x", 2, 0.0, 2.0, ExtensionPolicy::PreserveBinWidth).unwrap().into(),
            VariableBinAxis::new("y", vec![0.0, 1.0, 10.0]).unwrap().into(),
            CategoryAxis::new("c", vec!["a".into()], false).unwrap().into(),
        ])
        .unwrap();
        h.fill(&[0.5.into(), 3.0.into(), "a".into()]).unwrap();
        h.fill_weighted(&[4.0.into(), 0.5.into(), "q".into()], 2).unwrap();
        h
    }

    #[test]
    fn histogram_roundtrip() {
        let h = sample();
        let enc = encode(&h).unwrap();
        assert_eq!(enc.schema.storage, StorageKind::U32);
        assert_eq!(enc.schema.n_cells, h.counts().len());
        assert_eq!(enc.schema.axes[1].type_id, VARIABLE_BIN_AXIS);
        let back = decode::<u32>(&enc, &AxisRegistry::standard()).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn decode_casts_storage() {
        let enc = encode(&sample()).unwrap();
        let h = decode::<f64>(&enc, &AxisRegistry::standard()).unwrap();
        let idx = [AxisIndex::Bin(3), AxisIndex::Bin(1), AxisIndex::from("UNCATEGORISED")];
        assert_eq!(h.contents(&idx).unwrap(), 2.0);
        assert_eq!(h.sum_w2(&idx).unwrap(), 4.0);
        assert_eq!(h.n_entries(), 2);
    }

    #[test]
    fn unknown_type_rejected() {
        let mut enc = encode(&sample()).unwrap();
        enc.schema.axes[0].type_id = "LogAxis".into();
        let err = decode::<u32>(&enc, &AxisRegistry::standard()).unwrap_err();
        assert!(matches!(err, HistError::UnknownAxisType(id) if id == "LogAxis"));

        let empty = AxisRegistry::new();
        assert!(!empty.contains(FIXED_BIN_AXIS));
        assert!(decode::<u32>(&encode(&sample()).unwrap(), &empty).is_err());
    }

    #[test]
    fn truncated_payload_rejected() {
        let mut enc = encode(&sample()).unwrap();
        enc.buffer.pop();
        assert!(matches!(
            decode::<u32>(&enc, &AxisRegistry::standard()),
            Err(HistError::BufferUnderflow { .. })
        ));
    }

    #[test]
    fn axis_roundtrip() {
        let axis: Axis = CategoryAxis::new("c", vec!["a".into(), "b".into()], true).unwrap().into();
        let enc = encode_axis(&axis).unwrap();
        assert_eq!(enc.schema.type_id, CATEGORY_AXIS);
        assert_eq!(decode_axis(&enc, &AxisRegistry::standard()).unwrap(), axis);
    }

    #[test]
    fn schema_json_roundtrip() {
        let schema = encode(&sample()).unwrap().schema;
        let json = schema.to_json().unwrap();
        assert!(json.contains("\"storage\":\"u32\""));
        assert_eq!(HistogramSchema::from_json(&json).unwrap(), schema);
    }

    #[test]
    fn merge_encoded_rejects_empty_and_mismatch() {
        let registry = AxisRegistry::standard();
        assert!(merge_encoded(&[], &registry).is_err());

        let one_d = Histogram::<u32>::new(vec![VariableBinAxis::new("y", vec![0.0, 1.0]).unwrap().into()])
            .unwrap();
        let inputs = [encode(&sample()).unwrap(), encode(&one_d).unwrap()];
        assert!(matches!(
            merge_encoded(&inputs, &registry),
            Err(HistError::DimensionMismatch { expected: 3, got: 1 })
        ));
    }

    #[test]
    fn merge_encoded_promotes_storage() {
        let registry = AxisRegistry::standard();
        let a = sample();
        let mut b = Histogram::<f32>::new(a.axes().to_vec()).unwrap();
        b.fill_weighted(&[0.5.into(), 3.0.into(), "a".into()], 0.5).unwrap();
        let merged = merge_encoded(&[encode(&a).unwrap(), encode(&b).unwrap()], &registry).unwrap();
        assert_eq!(merged.schema.storage, StorageKind::F64);
        let h = decode::<f64>(&merged, &registry).unwrap();
        let idx = [AxisIndex::Bin(0), AxisIndex::Bin(2), AxisIndex::from("a")];
        assert_eq!(h.contents(&idx).unwrap(), 1.5);
        assert_eq!(h.n_entries(), 3);
    }
}
