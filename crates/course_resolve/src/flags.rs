//! Small bit-set newtypes used for knot adjacency and composition flags.
//!
//! Each set is a transparent wrapper around an unsigned integer with named
//! constants and the usual set operations. Unknown bits are dropped by
//! `from_bits_truncate`, so values coming from the host never carry bits the
//! engine does not understand.

macro_rules! bit_set {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $repr:ty {
            $(
                $(#[$flag_meta:meta])*
                const $flag:ident = $value:expr;
            )*
        }
    ) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name($repr);

        impl $name {
            $(
                $(#[$flag_meta])*
                pub const $flag: Self = Self($value);
            )*

            /// Set with no bits.
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Set with every named bit.
            pub const fn all() -> Self {
                Self(0 $(| ($value))*)
            }

            pub const fn from_bits_truncate(bits: $repr) -> Self {
                Self(bits & Self::all().0)
            }

            pub const fn bits(self) -> $repr {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Returns `true` if every bit of `other` is set in `self`.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Returns `true` if any bit of `other` is set in `self`.
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            pub const fn intersection(self, other: Self) -> Self {
                Self(self.0 & other.0)
            }

            pub const fn difference(self, other: Self) -> Self {
                Self(self.0 & !other.0)
            }

            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }

            pub fn set(&mut self, other: Self, value: bool) {
                if value {
                    self.insert(other);
                } else {
                    self.remove(other);
                }
            }
        }

        impl ::std::ops::BitOr for $name {
            type Output = Self;

            #[inline]
            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl ::std::ops::BitOrAssign for $name {
            #[inline]
            fn bitor_assign(&mut self, rhs: Self) {
                self.insert(rhs);
            }
        }

        impl ::std::ops::BitAnd for $name {
            type Output = Self;

            #[inline]
            fn bitand(self, rhs: Self) -> Self {
                self.intersection(rhs)
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let mut names = Vec::new();
                $(
                    if ($value) != 0 && self.contains(Self::$flag) {
                        names.push(stringify!($flag));
                    }
                )*
                write!(f, "{}({})", stringify!($name), names.join(" | "))
            }
        }
    };
}

pub(crate) use bit_set;

#[cfg(test)]
mod tests {
    bit_set! {
        pub struct Sample: u8 {
            const A = 1 << 0;
            const B = 1 << 1;
            const C = 1 << 2;
        }
    }

    #[test]
    fn set_operations_match_bit_arithmetic() {
        let mut set = Sample::A | Sample::C;
        assert!(set.contains(Sample::A));
        assert!(!set.contains(Sample::A | Sample::B));
        assert!(set.intersects(Sample::A | Sample::B));

        set.remove(Sample::A);
        assert_eq!(set, Sample::C);
        set.set(Sample::B, true);
        assert_eq!(set.bits(), 0b110);
        assert_eq!(set.difference(Sample::C), Sample::B);
    }

    #[test]
    fn truncation_drops_unknown_bits() {
        assert_eq!(Sample::from_bits_truncate(0xff), Sample::all());
        assert!(Sample::from_bits_truncate(0b1000).is_empty());
    }

    #[test]
    fn debug_lists_set_flags() {
        assert_eq!(format!("{:?}", Sample::A | Sample::C), "Sample(A | C)");
        assert_eq!(format!("{:?}", Sample::empty()), "Sample()");
    }
}
