//! Type-erased integer box.
//!
//! Every fixed-width integer is stored as its original width plus a canonical
//! `i128` magnitude, so containers can hold any of them uniformly and the
//! decoder can range-check on narrowing instead of truncating.

use std::fmt;

/// Width and signedness of a fixed-width integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl IntWidth {
    pub fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Self::I8 | Self::U8 => 8,
            Self::I16 | Self::U16 => 16,
            Self::I32 | Self::U32 => 32,
            Self::I64 | Self::U64 => 64,
            Self::Isize | Self::Usize => usize::BITS,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::Isize
        )
    }

    /// Smallest value representable at this width.
    pub fn min(self) -> i128 {
        match self {
            Self::I8 => i8::MIN as i128,
            Self::I16 => i16::MIN as i128,
            Self::I32 => i32::MIN as i128,
            Self::I64 => i64::MIN as i128,
            Self::Isize => isize::MIN as i128,
            Self::U8 | Self::U16 | Self::U32 | Self::U64 | Self::Usize => 0,
        }
    }

    /// Largest value representable at this width.
    pub fn max(self) -> i128 {
        match self {
            Self::I8 => i8::MAX as i128,
            Self::I16 => i16::MAX as i128,
            Self::I32 => i32::MAX as i128,
            Self::I64 => i64::MAX as i128,
            Self::Isize => isize::MAX as i128,
            Self::U8 => u8::MAX as i128,
            Self::U16 => u16::MAX as i128,
            Self::U32 => u32::MAX as i128,
            Self::U64 => u64::MAX as i128,
            Self::Usize => usize::MAX as i128,
        }
    }
}

impl fmt::Display for IntWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A primitive integer type with a known [`IntWidth`].
pub trait FixedWidth: Copy + TryFrom<i128> + Into<ScriptInt> {
    const WIDTH: IntWidth;
}

/// A boxed integer remembering the width it was produced at.
///
/// Equality and ordering look at the magnitude only.
#[derive(Debug, Clone, Copy)]
pub struct ScriptInt {
    width: IntWidth,
    value: i128,
}

impl ScriptInt {
    /// Boxes `value` at `width`, or returns `None` when it does not fit.
    pub fn new(width: IntWidth, value: i128) -> Option<Self> {
        if value < width.min() || value > width.max() {
            return None;
        }
        Some(Self { width, value })
    }

    pub fn width(self) -> IntWidth {
        self.width
    }

    pub fn value(self) -> i128 {
        self.value
    }

    /// Whether the magnitude lies inside `target`'s range.
    pub fn fits(self, target: IntWidth) -> bool {
        self.value >= target.min() && self.value <= target.max()
    }

    /// Narrows to `T`, or `None` on overflow. Never wraps.
    pub fn narrow<T: FixedWidth>(self) -> Option<T> {
        if !self.fits(T::WIDTH) {
            return None;
        }
        T::try_from(self.value).ok()
    }

    pub fn as_i64(self) -> Option<i64> {
        self.narrow()
    }

    pub fn as_u64(self) -> Option<u64> {
        self.narrow()
    }

    /// Lossy conversion used when an integer feeds a float target.
    pub fn as_f64(self) -> f64 {
        self.value as f64
    }
}

impl PartialEq for ScriptInt {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for ScriptInt {}

impl PartialOrd for ScriptInt {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScriptInt {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl fmt::Display for ScriptInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

macro_rules! fixed_width {
    ($($ty:ty => $width:ident),* $(,)?) => {
        $(
            impl FixedWidth for $ty {
                const WIDTH: IntWidth = IntWidth::$width;
            }

            impl From<$ty> for ScriptInt {
                fn from(value: $ty) -> Self {
                    Self {
                        width: IntWidth::$width,
                        value: value as i128,
                    }
                }
            }
        )*
    };
}

fixed_width! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_bounds_matrix() {
        let cases = [
            (IntWidth::I8, -128, 127),
            (IntWidth::I16, -32_768, 32_767),
            (IntWidth::I32, i32::MIN as i128, i32::MAX as i128),
            (IntWidth::I64, i64::MIN as i128, i64::MAX as i128),
            (IntWidth::U8, 0, 255),
            (IntWidth::U16, 0, 65_535),
            (IntWidth::U32, 0, u32::MAX as i128),
            (IntWidth::U64, 0, u64::MAX as i128),
        ];
        for (width, min, max) in cases {
            assert_eq!(width.min(), min, "min of {width}");
            assert_eq!(width.max(), max, "max of {width}");
        }
    }

    #[test]
    fn boxing_keeps_width_and_magnitude() {
        let boxed = ScriptInt::from(u64::MAX);
        assert_eq!(boxed.width(), IntWidth::U64);
        assert_eq!(boxed.value(), u64::MAX as i128);
        assert_eq!(boxed.as_i64(), None);
        assert_eq!(boxed.as_u64(), Some(u64::MAX));
    }

    #[test]
    fn narrow_rejects_instead_of_wrapping() {
        let boxed = ScriptInt::from(500i64);
        assert_eq!(boxed.narrow::<i8>(), None);
        assert_eq!(boxed.narrow::<u8>(), None);
        assert_eq!(boxed.narrow::<i16>(), Some(500));
        assert_eq!(ScriptInt::from(-1i32).narrow::<u32>(), None);
        assert_eq!(ScriptInt::from(-1i32).narrow::<isize>(), Some(-1));
    }

    #[test]
    fn new_is_range_checked() {
        assert!(ScriptInt::new(IntWidth::U8, 256).is_none());
        assert!(ScriptInt::new(IntWidth::I8, -128).is_some());
    }

    #[test]
    fn equality_ignores_width() {
        assert_eq!(ScriptInt::from(7u8), ScriptInt::from(7i64));
        assert!(ScriptInt::from(-3i8) < ScriptInt::from(2u16));
    }
}
