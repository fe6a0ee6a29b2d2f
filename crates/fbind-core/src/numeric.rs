#![forbid(unsafe_code)]

//! Numeric kinds and conversion to and from the canonical `f64`.
//!
//! Numeric controls report their value as a plain `f64`, while model fields
//! carry concrete widths. [`NumericKind`] is the closed set of widths a field
//! may have, and the two pure functions [`to_canonical`] / [`from_canonical`]
//! convert between the field's bit pattern and the canonical double.
//!
//! # Bit layout
//!
//! | Kind | `bits` holds |
//! |------|--------------|
//! | `Signed(_)` | the value sign-extended to 64 bits |
//! | `Unsigned(_)` | the value zero-extended to 64 bits |
//! | `Float(F32)` | `f32::to_bits` in the low 32 bits |
//! | `Float(F64)` | `f64::to_bits` |
//!
//! # Conversion rules
//!
//! 1. Float → integer truncates toward zero.
//! 2. Values outside the target width saturate at its bounds.
//! 3. `NaN` converts to `0` for integer kinds.
//! 4. `f64` → `f32` rounds to nearest.
//! 5. Integer → `f64` is exact up to 2^53 and rounds to nearest above.

use std::fmt;

/// Width of an integer kind. `Size` is the platform pointer width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    Size,
}

/// Width of a floating-point kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    F32,
    F64,
}

/// The concrete numeric type of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Signed(IntWidth),
    Unsigned(IntWidth),
    Float(FloatWidth),
}

impl NumericKind {
    /// Rust primitive name for this kind (`"i32"`, `"usize"`, `"f64"`, ...).
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Signed(IntWidth::W8) => "i8",
            Self::Signed(IntWidth::W16) => "i16",
            Self::Signed(IntWidth::W32) => "i32",
            Self::Signed(IntWidth::W64) => "i64",
            Self::Signed(IntWidth::Size) => "isize",
            Self::Unsigned(IntWidth::W8) => "u8",
            Self::Unsigned(IntWidth::W16) => "u16",
            Self::Unsigned(IntWidth::W32) => "u32",
            Self::Unsigned(IntWidth::W64) => "u64",
            Self::Unsigned(IntWidth::Size) => "usize",
            Self::Float(FloatWidth::F32) => "f32",
            Self::Float(FloatWidth::F64) => "f64",
        }
    }

    /// Whether this is an integer kind (signed or unsigned).
    #[must_use]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Float(_))
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Convert a field's bit pattern of the given kind to the canonical `f64`.
#[must_use]
pub fn to_canonical(kind: NumericKind, bits: u64) -> f64 {
    match kind {
        NumericKind::Signed(_) => bits as i64 as f64,
        NumericKind::Unsigned(_) => bits as f64,
        NumericKind::Float(FloatWidth::F32) => f64::from(f32::from_bits(bits as u32)),
        NumericKind::Float(FloatWidth::F64) => f64::from_bits(bits),
    }
}

/// Convert a canonical `f64` to the bit pattern of the given kind.
///
/// Integer kinds truncate toward zero and saturate at the width's bounds.
#[must_use]
pub fn from_canonical(value: f64, kind: NumericKind) -> u64 {
    // `as` from float to int truncates toward zero, saturates and maps NaN to 0.
    match kind {
        NumericKind::Signed(IntWidth::W8) => value as i8 as i64 as u64,
        NumericKind::Signed(IntWidth::W16) => value as i16 as i64 as u64,
        NumericKind::Signed(IntWidth::W32) => value as i32 as i64 as u64,
        NumericKind::Signed(IntWidth::W64) => value as i64 as u64,
        NumericKind::Signed(IntWidth::Size) => value as isize as i64 as u64,
        NumericKind::Unsigned(IntWidth::W8) => u64::from(value as u8),
        NumericKind::Unsigned(IntWidth::W16) => u64::from(value as u16),
        NumericKind::Unsigned(IntWidth::W32) => u64::from(value as u32),
        NumericKind::Unsigned(IntWidth::W64) => value as u64,
        NumericKind::Unsigned(IntWidth::Size) => value as usize as u64,
        NumericKind::Float(FloatWidth::F32) => u64::from((value as f32).to_bits()),
        NumericKind::Float(FloatWidth::F64) => value.to_bits(),
    }
}

/// A Rust primitive with a fixed [`NumericKind`].
pub trait NumericPrimitive: Copy {
    const KIND: NumericKind;

    fn to_bits(self) -> u64;

    fn from_bits(bits: u64) -> Self;
}

macro_rules! int_primitive {
    ($($ty:ty => $kind:expr, $wide:ty;)*) => {
        $(
            impl NumericPrimitive for $ty {
                const KIND: NumericKind = $kind;

                fn to_bits(self) -> u64 {
                    self as $wide as u64
                }

                fn from_bits(bits: u64) -> Self {
                    bits as $ty
                }
            }
        )*
    };
}

int_primitive! {
    i8 => NumericKind::Signed(IntWidth::W8), i64;
    i16 => NumericKind::Signed(IntWidth::W16), i64;
    i32 => NumericKind::Signed(IntWidth::W32), i64;
    i64 => NumericKind::Signed(IntWidth::W64), i64;
    isize => NumericKind::Signed(IntWidth::Size), i64;
    u8 => NumericKind::Unsigned(IntWidth::W8), u64;
    u16 => NumericKind::Unsigned(IntWidth::W16), u64;
    u32 => NumericKind::Unsigned(IntWidth::W32), u64;
    u64 => NumericKind::Unsigned(IntWidth::W64), u64;
    usize => NumericKind::Unsigned(IntWidth::Size), u64;
}

impl NumericPrimitive for f32 {
    const KIND: NumericKind = NumericKind::Float(FloatWidth::F32);

    fn to_bits(self) -> u64 {
        u64::from(f32::to_bits(self))
    }

    fn from_bits(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }
}

impl NumericPrimitive for f64 {
    const KIND: NumericKind = NumericKind::Float(FloatWidth::F64);

    fn to_bits(self) -> u64 {
        f64::to_bits(self)
    }

    fn from_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}

/// A number of a concrete kind, as stored in a model field.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Numeric {
    kind: NumericKind,
    bits: u64,
}

impl Numeric {
    /// Wrap a primitive value.
    #[must_use]
    pub fn new<T: NumericPrimitive>(value: T) -> Self {
        Self {
            kind: T::KIND,
            bits: value.to_bits(),
        }
    }

    /// Build from a raw kind and bit pattern.
    #[must_use]
    pub const fn from_raw(kind: NumericKind, bits: u64) -> Self {
        Self { kind, bits }
    }

    /// Convert a canonical `f64` into the given kind.
    #[must_use]
    pub fn from_canonical(value: f64, kind: NumericKind) -> Self {
        Self {
            kind,
            bits: from_canonical(value, kind),
        }
    }

    #[must_use]
    pub const fn kind(self) -> NumericKind {
        self.kind
    }

    #[must_use]
    pub const fn bits(self) -> u64 {
        self.bits
    }

    /// The canonical `f64` for this number.
    #[must_use]
    pub fn to_canonical(self) -> f64 {
        to_canonical(self.kind, self.bits)
    }

    /// Extract as `T` if the kinds match exactly.
    #[must_use]
    pub fn get<T: NumericPrimitive>(self) -> Option<T> {
        (self.kind == T::KIND).then(|| T::from_bits(self.bits))
    }
}

impl fmt::Debug for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NumericKind::Signed(_) => write!(f, "{}{}", self.bits as i64, self.kind),
            NumericKind::Unsigned(_) => write!(f, "{}{}", self.bits, self.kind),
            NumericKind::Float(_) => write!(f, "{:?}{}", self.to_canonical(), self.kind),
        }
    }
}

macro_rules! numeric_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Numeric {
                fn from(value: $ty) -> Self {
                    Self::new(value)
                }
            }
        )*
    };
}

numeric_from!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
