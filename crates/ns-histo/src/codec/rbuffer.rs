//! Big-endian binary reader for encoded histogram payloads.

use crate::error::{HistError, Result};
use crate::storage::{Storage, StorageKind};

/// A cursor-based reader over a byte slice.
pub struct RBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RBuffer<'a> {
    /// Create a new reader over the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Remaining bytes from current position.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Read a sub-slice of `n` bytes, advancing the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read `N` bytes into an array.
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    /// Read a big-endian u32.
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian u64.
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian u64 as a length or count.
    pub fn read_len(&mut self) -> Result<usize> {
        let v = self.read_u64()?;
        usize::try_from(v).map_err(|_| HistError::Deserialization(format!("length {v} too large")))
    }

    /// Read a big-endian f64.
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    /// Read a string: u32 byte length, then UTF-8 bytes.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| HistError::Deserialization(format!("invalid UTF-8 at {}: {e}", self.pos - len)))
    }

    /// Read `n` cells stored as `kind`, casting each to `T`.
    pub fn read_cells<T: Storage>(&mut self, kind: StorageKind, n: usize) -> Result<Vec<T>> {
        self.ensure(n.saturating_mul(kind.size()))?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.read_cell(kind)?);
        }
        Ok(out)
    }

    fn read_cell<T: Storage>(&mut self, kind: StorageKind) -> Result<T> {
        let v: Option<T> = match kind {
            StorageKind::I8 => num::cast(i8::from_be_bytes(self.read_array()?)),
            StorageKind::U8 => num::cast(self.read_u8()?),
            StorageKind::I16 => num::cast(i16::from_be_bytes(self.read_array()?)),
            StorageKind::U16 => num::cast(u16::from_be_bytes(self.read_array()?)),
            StorageKind::I32 => num::cast(i32::from_be_bytes(self.read_array()?)),
            StorageKind::U32 => num::cast(self.read_u32()?),
            StorageKind::I64 => num::cast(i64::from_be_bytes(self.read_array()?)),
            StorageKind::U64 => num::cast(self.read_u64()?),
            StorageKind::F32 => num::cast(f32::from_be_bytes(self.read_array()?)),
            StorageKind::F64 => num::cast(self.read_f64()?),
        };
        v.ok_or(HistError::Unrepresentable(T::KIND.name()))
    }

    // ── internal ────────────────────────────────────────────────

    fn ensure(&self, n: usize) -> Result<()> {
        if self.pos.saturating_add(n) > self.data.len() {
            return Err(HistError::BufferUnderflow {
                offset: self.pos,
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_primitives() {
        // u32 big-endian: 0x01020304 = 16909060
        let data = [0x01, 0x02, 0x03, 0x04, 0x40, 0x09, 0x21, 0xfb, 0x54, 0x44, 0x2d, 0x18];
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_u32().unwrap(), 0x0102_0304);
        assert!((r.read_f64().unwrap() - std::f64::consts::PI).abs() < 1e-15);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn read_string_prefixed() {
        let data = [0, 0, 0, 3, b'a', b'b', b'c'];
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_string().unwrap(), "abc");
    }

    #[test]
    fn underflow_reports_position() {
        let mut r = RBuffer::new(&[1, 2]);
        r.read_u8().unwrap();
        let err = r.read_u32().unwrap_err();
        assert!(matches!(err, HistError::BufferUnderflow { offset: 1, need: 4, have: 1 }));
    }

    #[test]
    fn cells_cast_between_kinds() {
        let data = [0xff, 0xfe, 0x00, 0x05];
        let v: Vec<f64> = RBuffer::new(&data).read_cells(StorageKind::I16, 2).unwrap();
        assert_eq!(v, vec![-2.0, 5.0]);

        let err = RBuffer::new(&data).read_cells::<u8>(StorageKind::I16, 2).unwrap_err();
        assert!(matches!(err, HistError::Unrepresentable("u8")));
    }
}
