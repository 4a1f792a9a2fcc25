//! Bit-Field Helpers
//!
//! Small generic routines for pulling fields out of raw register words and
//! building new words from field values. All bit indices are zero-based and
//! inclusive, `msb` being the most significant bit of the field.
//!
//! # Example
//!
//! ```rust
//! use pchflash::bits;
//!
//! assert_eq!(bits::raw(15, 15, 0xFFFFu16), 0x8000);
//! assert_eq!(bits::value(6, 2, 0xFFu8), 0x1F);
//! assert_eq!(bits::set(6, 2, 0x1Fu8), 0x7C);
//! assert!(bits::test(15, 0xFFFFu16));
//! ```

/// Unsigned integer types that can hold a register word
pub trait Word: Copy {
    /// Width of the type in bits
    const BITS: u32;

    /// Zero-extend to 64 bits
    fn widen(self) -> u64;

    /// Truncate a 64-bit value to this width
    fn narrow(value: u64) -> Self;
}

macro_rules! impl_word {
    ($($ty:ty),*) => {
        $(
            impl Word for $ty {
                const BITS: u32 = <$ty>::BITS;

                #[inline(always)]
                fn widen(self) -> u64 {
                    self as u64
                }

                #[inline(always)]
                fn narrow(value: u64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

impl_word!(u8, u16, u32, u64);

/// Right-aligned mask covering `width` bits
#[inline(always)]
const fn low_mask(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

#[inline(always)]
fn check_range<T: Word>(msb: u32, lsb: u32) {
    debug_assert!(msb >= lsb, "bit range [{}:{}] is inverted", msb, lsb);
    debug_assert!(
        msb < T::BITS,
        "bit {} is outside of a {}-bit word",
        msb,
        T::BITS
    );
}

/// Extract the unshifted bit pattern of `bits[msb:lsb]`
#[inline]
pub fn raw<T: Word>(msb: u32, lsb: u32, bits: T) -> T {
    check_range::<T>(msb, lsb);
    T::narrow(bits.widen() & (low_mask(msb - lsb + 1) << lsb))
}

/// Extract the right-aligned value of `bits[msb:lsb]`
#[inline]
pub fn value<T: Word>(msb: u32, lsb: u32, bits: T) -> T {
    check_range::<T>(msb, lsb);
    T::narrow((bits.widen() >> lsb) & low_mask(msb - lsb + 1))
}

/// Test whether bit `bit` is set
#[inline]
pub fn test<T: Word>(bit: u32, bits: T) -> bool {
    check_range::<T>(bit, bit);
    bits.widen() & (1u64 << bit) != 0
}

/// Place `value` into `[msb:lsb]`, truncated to the field width
///
/// All bits outside of the field are zero.
#[inline]
pub fn set<T: Word>(msb: u32, lsb: u32, value: T) -> T {
    check_range::<T>(msb, lsb);
    T::narrow((value.widen() & low_mask(msb - lsb + 1)) << lsb)
}

/// Convenience for single-bit flags
#[inline]
pub fn flag<T: Word>(bit: u32, set_bit: bool) -> T {
    set(bit, bit, T::narrow(set_bit as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_raw_bits() {
        assert_eq!(raw(15, 15, 0xFFFFu16), 0x8000);
        assert_eq!(raw(6, 2, 0xFFu8), 0x7C);
        assert_eq!(raw(31, 14, 0xFED1_C001u32), 0xFED1_C000);
    }

    #[test]
    fn test_value_of_bits() {
        assert_eq!(value(15, 15, 0xFFFFu16), 1);
        assert_eq!(value(6, 2, 0xFFu8), 0x1F);
        assert_eq!(value(11, 10, 0x0000_0C00u32), 3);
    }

    #[test]
    fn test_single_bit() {
        assert!(test(15, 0xFFFFu16));
        assert!(!test(14, 0x8000u16));
        assert!(test(63, u64::MAX));
    }

    #[test]
    fn test_set_bits() {
        assert_eq!(set(15, 15, 1u16), 0x8000);
        assert_eq!(set(6, 2, 0x1Fu8), 0x7C);
        // Values wider than the field are truncated
        assert_eq!(set(6, 2, 0xFFu8), 0x7C);
        assert_eq!(flag::<u32>(31, true), 0x8000_0000);
        assert_eq!(flag::<u32>(31, false), 0);
    }

    #[test]
    fn test_full_width_field() {
        assert_eq!(value(63, 0, u64::MAX), u64::MAX);
        assert_eq!(set(31, 0, 0xDEAD_BEEFu32), 0xDEAD_BEEF);
        assert_eq!(raw(7, 0, 0xA5u8), 0xA5);
    }

    fn field() -> impl Strategy<Value = (u32, u32)> {
        (0u32..32).prop_flat_map(|lsb| (lsb..32, Just(lsb)))
    }

    proptest! {
        #[test]
        fn set_then_value_keeps_the_field((msb, lsb) in field(), v in any::<u32>()) {
            let width = msb - lsb + 1;
            let mask = if width == 32 { u32::MAX } else { (1u32 << width) - 1 };
            prop_assert_eq!(value(msb, lsb, set(msb, lsb, v)), v & mask);
        }

        #[test]
        fn test_agrees_with_single_bit_value(bit in 0u32..16, bits in any::<u16>()) {
            prop_assert_eq!(test(bit, bits), value(bit, bit, bits) == 1);
        }

        #[test]
        fn raw_is_value_shifted_back((msb, lsb) in field(), bits in any::<u32>()) {
            prop_assert_eq!(raw(msb, lsb, bits), value(msb, lsb, bits) << lsb);
        }
    }
}
