//! Numeric cell storage for [`Histogram`](crate::Histogram).

use std::fmt::Debug;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Closed set of primitive storage types a histogram can be encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// `i8`
    I8,
    /// `u8`
    U8,
    /// `i16`
    I16,
    /// `u16`
    U16,
    /// `i32`
    I32,
    /// `u32`
    U32,
    /// `i64`
    I64,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
}

impl StorageKind {
    /// Rust type name.
    pub fn name(self) -> &'static str {
        match self {
            StorageKind::I8 => "i8",
            StorageKind::U8 => "u8",
            StorageKind::I16 => "i16",
            StorageKind::U16 => "u16",
            StorageKind::I32 => "i32",
            StorageKind::U32 => "u32",
            StorageKind::I64 => "i64",
            StorageKind::U64 => "u64",
            StorageKind::F32 => "f32",
            StorageKind::F64 => "f64",
        }
    }

    /// Width in bits.
    pub fn bits(self) -> u32 {
        match self {
            StorageKind::I8 | StorageKind::U8 => 8,
            StorageKind::I16 | StorageKind::U16 => 16,
            StorageKind::I32 | StorageKind::U32 | StorageKind::F32 => 32,
            StorageKind::I64 | StorageKind::U64 | StorageKind::F64 => 64,
        }
    }

    /// Width in bytes.
    pub fn size(self) -> usize {
        self.bits() as usize / 8
    }

    /// Floating-point kind.
    pub fn is_float(self) -> bool {
        matches!(self, StorageKind::F32 | StorageKind::F64)
    }

    /// Signed kind (floats are signed).
    pub fn is_signed(self) -> bool {
        !matches!(self, StorageKind::U8 | StorageKind::U16 | StorageKind::U32 | StorageKind::U64)
    }

    /// A kind able to hold values of both `self` and `other`.
    ///
    /// Floats win over integers (`f32` only holds integers up to 16 bits
    /// exactly, wider integers promote to `f64`). Mixed-sign integers go to
    /// the next wider signed integer, capped at `i64`.
    pub fn promote(self, other: StorageKind) -> StorageKind {
        if self == other {
            return self;
        }
        let wider = |a: StorageKind, b: StorageKind| if a.bits() >= b.bits() { a } else { b };
        match (self.is_float(), other.is_float()) {
            (true, true) => wider(self, other),
            (true, false) | (false, true) => {
                let (float, int) = if self.is_float() { (self, other) } else { (other, self) };
                if int.bits() <= 16 { float } else { StorageKind::F64 }
            }
            (false, false) if self.is_signed() == other.is_signed() => wider(self, other),
            (false, false) => {
                let (signed, unsigned) = if self.is_signed() { (self, other) } else { (other, self) };
                if signed.bits() > unsigned.bits() {
                    signed
                } else {
                    match unsigned.bits() {
                        8 => StorageKind::I16,
                        16 => StorageKind::I32,
                        _ => StorageKind::I64,
                    }
                }
            }
        }
    }
}

/// Numeric type usable as histogram cell storage.
pub trait Storage:
    num::Num + num::NumCast + Copy + AddAssign + PartialOrd + Debug + Send + Sync + 'static
{
    /// The matching [`StorageKind`].
    const KIND: StorageKind;
}

macro_rules! impl_storage {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(impl Storage for $t {
            const KIND: StorageKind = StorageKind::$kind;
        })*
    };
}

impl_storage!(
    i8 => I8, u8 => U8, i16 => I16, u16 => U16, i32 => I32,
    u32 => U32, i64 => I64, u64 => U64, f32 => F32, f64 => F64,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_rules() {
        use StorageKind::*;
        assert_eq!(F32.promote(F64), F64);
        assert_eq!(F32.promote(I16), F32);
        assert_eq!(U32.promote(F32), F64);
        assert_eq!(U8.promote(U32), U32);
        assert_eq!(I8.promote(I64), I64);
        assert_eq!(I32.promote(U8), I32);
        assert_eq!(U16.promote(I16), I32);
        assert_eq!(U64.promote(I8), I64);
        assert_eq!(I64.promote(I64), I64);
    }

    #[test]
    fn promotion_is_symmetric() {
        use StorageKind::*;
        let all = [I8, U8, I16, U16, I32, U32, I64, U64, F32, F64];
        for a in all {
            for b in all {
                assert_eq!(a.promote(b), b.promote(a), "{a:?} / {b:?}");
            }
        }
    }

    #[test]
    fn kind_constants() {
        assert_eq!(<u16 as Storage>::KIND, StorageKind::U16);
        assert_eq!(<f64 as Storage>::KIND.size(), 8);
        assert!(!StorageKind::U64.is_signed());
    }
}
