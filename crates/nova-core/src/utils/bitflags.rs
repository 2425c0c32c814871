// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Declarative macro generating strongly typed flag sets.

/// Defines a flag-set newtype over an unsigned integer.
///
/// The generated type is `Copy + Eq + Hash + Default`, supports the usual
/// bitwise operators and prints its named flags through `Debug`.
///
/// ```
/// nova_core::nova_bitflags! {
///     /// Example flags.
///     pub struct Access: u8 {
///         const READ = 1 << 0;
///         const WRITE = 1 << 1;
///     }
/// }
///
/// let rw = Access::READ | Access::WRITE;
/// assert!(rw.contains(Access::READ));
/// assert_eq!(format!("{:?}", rw), "Access(READ | WRITE)");
/// ```
#[macro_export]
macro_rules! nova_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// No flag set.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Builds a set from raw bits. Unknown bits are kept as-is.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits }
            }

            /// The raw bits.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// `true` when no bit is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// `true` when every bit of `other` is set in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// `true` when `self` and `other` share at least one bit.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Sets the bits of `other`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Clears the bits of `other`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }

            /// Flips the bits of `other`.
            pub fn toggle(&mut self, other: Self) {
                self.bits ^= other.bits;
            }

            /// Sets or clears `other` depending on `value`.
            pub fn set(&mut self, other: Self, value: bool) {
                if value {
                    self.insert(other);
                } else {
                    self.remove(other);
                }
            }

            /// Copy of `self` with `other` set.
            #[must_use]
            pub const fn with(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }

            /// Copy of `self` with `other` cleared.
            #[must_use]
            pub const fn without(self, other: Self) -> Self {
                Self { bits: self.bits & !other.bits }
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                self.with(rhs)
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                Self { bits: self.bits & rhs.bits }
            }
        }

        impl core::ops::BitXor for $name {
            type Output = Self;
            fn bitxor(self, rhs: Self) -> Self {
                Self { bits: self.bits ^ rhs.bits }
            }
        }

        impl core::ops::Not for $name {
            type Output = Self;
            fn not(self) -> Self {
                Self { bits: !self.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.insert(rhs);
            }
        }

        impl core::ops::BitAndAssign for $name {
            fn bitand_assign(&mut self, rhs: Self) {
                self.bits &= rhs.bits;
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                if self.bits == 0 {
                    return write!(f, "{}(EMPTY)", stringify!($name));
                }
                write!(f, "{}(", stringify!($name))?;
                let mut rest = self.bits;
                let mut first = true;
                $(
                    let flag: $ty = $flag_value;
                    if flag != 0 && (rest & flag) == flag {
                        if !first {
                            f.write_str(" | ")?;
                        }
                        f.write_str(stringify!($flag_name))?;
                        rest &= !flag;
                        first = false;
                    }
                )*
                if rest != 0 {
                    if !first {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{:#x}", rest)?;
                }
                f.write_str(")")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::nova_bitflags! {
        struct Probe: u16 {
            const A = 1 << 0;
            const B = 1 << 1;
            const C = 1 << 2;
            const AC = (1 << 0) | (1 << 2);
        }
    }

    #[test]
    fn test_empty_and_default_are_equal() {
        assert_eq!(Probe::default(), Probe::EMPTY);
        assert!(Probe::EMPTY.is_empty());
        assert_eq!(format!("{:?}", Probe::EMPTY), "Probe(EMPTY)");
    }

    #[test]
    fn test_contains_requires_every_bit() {
        let set = Probe::A | Probe::B;
        assert!(set.contains(Probe::A));
        assert!(!set.contains(Probe::AC));
        assert!(set.intersects(Probe::AC));
        assert!(set.contains(Probe::EMPTY));
    }

    #[test]
    fn test_mutation_helpers() {
        let mut set = Probe::A;
        set.insert(Probe::C);
        assert_eq!(set, Probe::AC);
        set.toggle(Probe::A);
        assert_eq!(set, Probe::C);
        set.set(Probe::B, true);
        set.remove(Probe::C);
        assert_eq!(set, Probe::B);
        assert_eq!(Probe::AC.without(Probe::A), Probe::C);
    }

    #[test]
    fn test_debug_names_flags_and_unknown_bits() {
        assert_eq!(format!("{:?}", Probe::A | Probe::B), "Probe(A | B)");
        let odd = Probe::from_bits_truncate(0b1_0001);
        assert_eq!(format!("{:?}", odd), "Probe(A | 0x10)");
    }

    #[test]
    fn test_operators_match_bit_arithmetic() {
        let x = Probe::A | Probe::B;
        let y = Probe::B | Probe::C;
        assert_eq!((x & y).bits(), 0b010);
        assert_eq!((x ^ y).bits(), 0b101);
        assert_eq!((!Probe::A).bits(), !1u16);
    }
}
