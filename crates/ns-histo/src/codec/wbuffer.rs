//! Big-endian binary writer, the counterpart of [`RBuffer`](super::RBuffer).

use crate::error::{HistError, Result};
use crate::storage::{Storage, StorageKind};

/// Growable big-endian output buffer.
#[derive(Debug, Default)]
pub struct WBuffer {
    data: Vec<u8>,
}

impl WBuffer {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Append a single byte.
    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    /// Append a big-endian u32.
    pub fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_be_bytes());
    }

    /// Append a big-endian u64.
    pub fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_be_bytes());
    }

    /// Append a length or count as a big-endian u64.
    pub fn write_len(&mut self, n: usize) {
        self.write_u64(n as u64);
    }

    /// Append a big-endian f64.
    pub fn write_f64(&mut self, v: f64) {
        self.write_bytes(&v.to_be_bytes());
    }

    /// Append a string: u32 byte length, then UTF-8 bytes.
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        let len = u32::try_from(s.len())
            .map_err(|_| HistError::Deserialization(format!("string of {} bytes too long", s.len())))?;
        self.write_u32(len);
        self.write_bytes(s.as_bytes());
        Ok(())
    }

    /// Append a length-prefixed block (u32 byte length, then `bytes`).
    pub fn write_block(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| HistError::Deserialization(format!("block of {} bytes too long", bytes.len())))?;
        self.write_u32(len);
        self.write_bytes(bytes);
        Ok(())
    }

    /// Append every cell in the width of `kind`.
    pub fn write_cells<T: Storage>(&mut self, kind: StorageKind, cells: &[T]) -> Result<()> {
        self.data.reserve(cells.len() * kind.size());
        for &v in cells {
            self.write_cell(kind, v)?;
        }
        Ok(())
    }

    fn write_cell<T: Storage>(&mut self, kind: StorageKind, v: T) -> Result<()> {
        let err = || HistError::Unrepresentable(kind.name());
        match kind {
            StorageKind::I8 => self.write_bytes(&num::cast::<T, i8>(v).ok_or_else(err)?.to_be_bytes()),
            StorageKind::U8 => self.write_u8(num::cast::<T, u8>(v).ok_or_else(err)?),
            StorageKind::I16 => self.write_bytes(&num::cast::<T, i16>(v).ok_or_else(err)?.to_be_bytes()),
            StorageKind::U16 => self.write_bytes(&num::cast::<T, u16>(v).ok_or_else(err)?.to_be_bytes()),
            StorageKind::I32 => self.write_bytes(&num::cast::<T, i32>(v).ok_or_else(err)?.to_be_bytes()),
            StorageKind::U32 => self.write_u32(num::cast::<T, u32>(v).ok_or_else(err)?),
            StorageKind::I64 => self.write_bytes(&num::cast::<T, i64>(v).ok_or_else(err)?.to_be_bytes()),
            StorageKind::U64 => self.write_u64(num::cast::<T, u64>(v).ok_or_else(err)?),
            StorageKind::F32 => self.write_bytes(&num::cast::<T, f32>(v).ok_or_else(err)?.to_be_bytes()),
            StorageKind::F64 => self.write_f64(num::cast::<T, f64>(v).ok_or_else(err)?),
        }
        Ok(())
    }

    /// Consume the writer, returning the bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RBuffer;

    #[test]
    fn primitives_are_big_endian() {
        let mut w = WBuffer::new();
        w.write_u32(0x0102_0304);
        w.write_string("ab").unwrap();
        assert_eq!(w.into_bytes(), vec![1, 2, 3, 4, 0, 0, 0, 2, b'a', b'b']);
    }

    #[test]
    fn cells_in_requested_width() {
        let mut w = WBuffer::new();
        w.write_cells(StorageKind::U16, &[1.0f64, 258.0]).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes, vec![0, 1, 1, 2]);
        let back: Vec<u32> = RBuffer::new(&bytes).read_cells(StorageKind::U16, 2).unwrap();
        assert_eq!(back, vec![1, 258]);
    }

    #[test]
    fn negative_into_unsigned_fails() {
        let mut w = WBuffer::new();
        let err = w.write_cells(StorageKind::U8, &[-1i32]).unwrap_err();
        assert!(matches!(err, HistError::Unrepresentable("u8")));
    }
}
