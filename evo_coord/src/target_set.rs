//! Target sets: bitmasks over the addressable targets of an actuator bus.
//!
//! Bit `i` set means target `i` is a member. [`TargetSet`] is implemented
//! for the fixed-width unsigned integers (`u8` through `u128`) and for the
//! dynamically sized [`DynTargetSet`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_TARGETS, TARGET_WORD_BITS};

/// A target index outside the addressable bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("target {target} out of range (max {max})")]
pub struct TargetOutOfRange {
    /// Offending target index.
    pub target: usize,
    /// Exclusive upper bound on target indices.
    pub max: usize,
}

/// Bitmask over a universe of addressable targets.
///
/// Only the operations the calibration store and the driver need are
/// required: membership, clear test, union and difference.
pub trait TargetSet: Clone + PartialEq + Default {
    /// `true` when no target is a member.
    fn is_none(&self) -> bool;

    /// `true` when `target` is a member.
    fn contains(&self, target: usize) -> bool;

    /// Add `target`. Fixed-width sets ignore indices beyond their width.
    fn insert(&mut self, target: usize);

    /// Remove every member of `other` (`self &= !other`).
    fn strip(&mut self, other: &Self);

    /// Add every member of `other` (`self |= other`).
    fn union_with(&mut self, other: &Self);

    /// Number of members.
    fn count(&self) -> usize;

    /// Number of addressable bit positions currently backing the set.
    fn width(&self) -> usize;

    /// Member indices in ascending order.
    fn members(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.width()).filter(move |&target| self.contains(target))
    }
}

macro_rules! impl_fixed_target_set {
    ($($t:ty),* $(,)?) => {$(
        impl TargetSet for $t {
            #[inline]
            fn is_none(&self) -> bool {
                *self == 0
            }

            #[inline]
            fn contains(&self, target: usize) -> bool {
                target < <$t>::BITS as usize && (*self >> target) & 1 == 1
            }

            #[inline]
            fn insert(&mut self, target: usize) {
                if target < <$t>::BITS as usize {
                    *self |= (1 as $t) << target;
                }
            }

            #[inline]
            fn strip(&mut self, other: &Self) {
                *self &= !*other;
            }

            #[inline]
            fn union_with(&mut self, other: &Self) {
                *self |= *other;
            }

            #[inline]
            fn count(&self) -> usize {
                self.count_ones() as usize
            }

            #[inline]
            fn width(&self) -> usize {
                <$t>::BITS as usize
            }
        }
    )*};
}

impl_fixed_target_set!(u8, u16, u32, u64, u128);

/// Dynamically sized target set.
///
/// Grows on [`insert`](TargetSet::insert) and never stores trailing clear
/// words, so two sets with the same members compare equal regardless of
/// how they were built. Serialized as a list of target indices, each below
/// [`MAX_TARGETS`]:
///
/// ```toml
/// targets = [0, 2, 4]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct DynTargetSet {
    words: Vec<u64>,
}

impl DynTargetSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Build a set from a bit pattern, bit `i` selecting target `i`.
    pub fn from_bits(bits: u128) -> Self {
        let mut set = Self {
            words: vec![bits as u64, (bits >> TARGET_WORD_BITS) as u64],
        };
        set.trim();
        set
    }

    /// Set containing targets `0..count`.
    pub fn all(count: usize) -> Self {
        (0..count).collect()
    }

    fn trim(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }
}

impl TargetSet for DynTargetSet {
    fn is_none(&self) -> bool {
        self.words.is_empty()
    }

    fn contains(&self, target: usize) -> bool {
        self.words
            .get(target / TARGET_WORD_BITS)
            .is_some_and(|word| (word >> (target % TARGET_WORD_BITS)) & 1 == 1)
    }

    fn insert(&mut self, target: usize) {
        let word = target / TARGET_WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (target % TARGET_WORD_BITS);
    }

    fn strip(&mut self, other: &Self) {
        for (word, mask) in self.words.iter_mut().zip(&other.words) {
            *word &= !mask;
        }
        self.trim();
    }

    fn union_with(&mut self, other: &Self) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (word, mask) in self.words.iter_mut().zip(&other.words) {
            *word |= mask;
        }
    }

    fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn width(&self) -> usize {
        self.words.len() * TARGET_WORD_BITS
    }
}

impl FromIterator<usize> for DynTargetSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = Self::new();
        for target in iter {
            set.insert(target);
        }
        set
    }
}

impl TryFrom<Vec<usize>> for DynTargetSet {
    type Error = TargetOutOfRange;

    /// Rejects indices `>= MAX_TARGETS` before any storage is grown.
    fn try_from(targets: Vec<usize>) -> Result<Self, Self::Error> {
        if let Some(&target) = targets.iter().find(|&&t| t >= MAX_TARGETS) {
            return Err(TargetOutOfRange {
                target,
                max: MAX_TARGETS,
            });
        }
        Ok(targets.into_iter().collect())
    }
}

impl From<DynTargetSet> for Vec<usize> {
    fn from(set: DynTargetSet) -> Self {
        set.members().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_membership() {
        let mask: u8 = 0b10101;
        assert!(mask.contains(0));
        assert!(!mask.contains(1));
        assert!(mask.contains(4));
        assert!(!mask.contains(200));
        assert_eq!(mask.count(), 3);
        assert_eq!(mask.members().collect::<Vec<_>>(), vec![0, 2, 4]);
    }

    #[test]
    fn fixed_width_strip_and_union() {
        let mut mask: u16 = 0b10101;
        mask.strip(&0b00111);
        assert_eq!(mask, 0b10000);
        mask.union_with(&0b00011);
        assert_eq!(mask, 0b10011);
        mask.strip(&0xFFFF);
        assert!(mask.is_none());
    }

    #[test]
    fn fixed_width_insert_ignores_out_of_range() {
        let mut mask: u8 = 0;
        mask.insert(3);
        mask.insert(8);
        assert_eq!(mask, 0b1000);
    }

    #[test]
    fn dyn_set_equality_ignores_width() {
        let a = DynTargetSet::from_bits(0b10000);
        let mut b: DynTargetSet = [4, 100].into_iter().collect();
        b.strip(&DynTargetSet::from_iter([100]));
        assert_eq!(a, b);
        assert_eq!(b.width(), TARGET_WORD_BITS);
    }

    #[test]
    fn dyn_set_strip_to_empty() {
        let mut set = DynTargetSet::from_bits(0b10101);
        set.strip(&DynTargetSet::from_bits(0b11111));
        assert!(set.is_none());
        assert_eq!(set, DynTargetSet::new());
    }

    #[test]
    fn dyn_set_strip_with_shorter_mask() {
        let mut set: DynTargetSet = [1, 70].into_iter().collect();
        set.strip(&DynTargetSet::from_bits(0b10));
        assert_eq!(set.members().collect::<Vec<_>>(), vec![70]);
    }

    #[test]
    fn dyn_set_union_grows() {
        let mut set = DynTargetSet::from_bits(0b1);
        set.union_with(&[65].into_iter().collect());
        assert!(set.contains(0));
        assert!(set.contains(65));
        assert_eq!(set.count(), 2);
    }

    #[test]
    fn dyn_set_all() {
        let set = DynTargetSet::all(5);
        assert_eq!(set, DynTargetSet::from_bits(0b11111));
        assert!(DynTargetSet::all(0).is_none());
    }

    #[test]
    fn try_from_rejects_targets_beyond_bus() {
        assert_eq!(
            DynTargetSet::try_from(vec![0, MAX_TARGETS]),
            Err(TargetOutOfRange {
                target: MAX_TARGETS,
                max: MAX_TARGETS
            })
        );
        assert_eq!(
            DynTargetSet::try_from(vec![MAX_TARGETS - 1]).unwrap().count(),
            1
        );
    }

    #[test]
    fn toml_rejects_huge_target_index() {
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            #[allow(dead_code)]
            targets: DynTargetSet,
        }

        let err = toml::from_str::<Wrapper>("targets = [9223372036854775807]").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn dyn_set_toml_round_trip() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Wrapper {
            targets: DynTargetSet,
        }

        let parsed: Wrapper = toml::from_str("targets = [4, 0, 2]").unwrap();
        assert_eq!(parsed.targets, DynTargetSet::from_bits(0b10101));

        let encoded = toml::to_string(&parsed).unwrap();
        let reparsed: Wrapper = toml::from_str(&encoded).unwrap();
        assert_eq!(reparsed, parsed);
    }
}
