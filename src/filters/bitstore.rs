//! Packed bit storage for filters.
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use fixedbitset::FixedBitSet;

/// Fixed-size array of `m` bits, all initialized to `0`.
///
/// Bits only ever go from `0` to `1`; there is no way to reset a single bit. Accessing an index
/// outside of `[0, m)` is a programming error and panics.
pub trait BitStore {
    /// Create new store of `m` bits, all set to `0`.
    fn with_len(m: usize) -> Self
    where
        Self: Sized;

    /// Number of bits `m`.
    fn len(&self) -> usize;

    /// Check whether bit `i` is set.
    fn get(&self, i: usize) -> bool;

    /// Set bit `i`. Setting a bit twice has no further effect.
    fn set(&mut self, i: usize);

    /// Number of bits that are set.
    fn count_ones(&self) -> usize;

    /// Set all bits that are set in `other`.
    ///
    /// Panics if the stores differ in length.
    fn union_with(&mut self, other: &Self)
    where
        Self: Sized;
}

/// Single-owner store backed by a [`FixedBitSet`].
#[derive(Clone, PartialEq, Eq)]
pub struct PackedBits {
    bs: FixedBitSet,
}

impl PackedBits {
    /// Iterate over the indices of all set bits in ascending order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bs.ones()
    }
}

impl BitStore for PackedBits {
    fn with_len(m: usize) -> Self {
        Self {
            bs: FixedBitSet::with_capacity(m),
        }
    }

    fn len(&self) -> usize {
        self.bs.len()
    }

    fn get(&self, i: usize) -> bool {
        assert!(i < self.bs.len(), "index {} out of range for {} bits", i, self.bs.len());
        self.bs.contains(i)
    }

    fn set(&mut self, i: usize) {
        self.bs.insert(i);
    }

    fn count_ones(&self) -> usize {
        self.bs.count_ones(..)
    }

    fn union_with(&mut self, other: &Self) {
        assert_eq!(
            self.bs.len(),
            other.bs.len(),
            "m must be equal (left={}, right={})",
            self.bs.len(),
            other.bs.len()
        );
        self.bs.union_with(&other.bs);
    }
}

impl fmt::Debug for PackedBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedBits {{ m: {} }}", self.bs.len())
    }
}

const WORD_BITS: usize = u64::BITS as usize;

/// Store of `AtomicU64` words that can be set through a shared reference.
///
/// Setting a bit is a single `fetch_or`, so concurrent writers never lose each other's bits
/// and no lock is required. Relaxed ordering is sufficient because bits are never cleared.
pub struct AtomicBits {
    words: Box<[AtomicU64]>,
    len: usize,
}

impl AtomicBits {
    /// Set bit `i` through a shared reference and return whether it was set before.
    pub fn set_shared(&self, i: usize) -> bool {
        let (word, mask) = self.locate(i);
        self.words[word].fetch_or(mask, Ordering::Relaxed) & mask != 0
    }

    fn locate(&self, i: usize) -> (usize, u64) {
        assert!(i < self.len, "index {} out of range for {} bits", i, self.len);
        (i / WORD_BITS, 1u64 << (i % WORD_BITS))
    }
}

impl BitStore for AtomicBits {
    fn with_len(m: usize) -> Self {
        let words = (0..m.div_ceil(WORD_BITS))
            .map(|_| AtomicU64::new(0))
            .collect();
        Self { words, len: m }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, i: usize) -> bool {
        let (word, mask) = self.locate(i);
        self.words[word].load(Ordering::Relaxed) & mask != 0
    }

    fn set(&mut self, i: usize) {
        self.set_shared(i);
    }

    fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }

    fn union_with(&mut self, other: &Self) {
        assert_eq!(
            self.len, other.len,
            "m must be equal (left={}, right={})",
            self.len, other.len
        );
        for (word, other_word) in self.words.iter().zip(other.words.iter()) {
            word.fetch_or(other_word.load(Ordering::Relaxed), Ordering::Relaxed);
        }
    }
}

impl fmt::Debug for AtomicBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtomicBits {{ m: {} }}", self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::{AtomicBits, BitStore, PackedBits};

    fn check_store<S: BitStore>() {
        let mut s = S::with_len(130);
        assert_eq!(s.len(), 130);
        assert_eq!(s.count_ones(), 0);
        assert!((0..130).all(|i| !s.get(i)));

        s.set(0);
        s.set(63);
        s.set(64);
        s.set(129);
        assert!(s.get(0));
        assert!(s.get(63));
        assert!(s.get(64));
        assert!(s.get(129));
        assert!(!s.get(1));
        assert!(!s.get(128));
        assert_eq!(s.count_ones(), 4);

        s.set(64);
        assert_eq!(s.count_ones(), 4);
    }

    fn check_union<S: BitStore>() {
        let mut s1 = S::with_len(100);
        s1.set(3);
        let mut s2 = S::with_len(100);
        s2.set(3);
        s2.set(97);

        s1.union_with(&s2);
        assert!(s1.get(3));
        assert!(s1.get(97));
        assert_eq!(s1.count_ones(), 2);
        assert_eq!(s2.count_ones(), 2);
    }

    #[test]
    fn packed() {
        check_store::<PackedBits>();
    }

    #[test]
    fn atomic() {
        check_store::<AtomicBits>();
    }

    #[test]
    fn packed_union() {
        check_union::<PackedBits>();
    }

    #[test]
    fn atomic_union() {
        check_union::<AtomicBits>();
    }

    #[test]
    fn single_bit() {
        let mut s = PackedBits::with_len(1);
        assert!(!s.get(0));
        s.set(0);
        assert!(s.get(0));

        let s = AtomicBits::with_len(1);
        assert!(!s.set_shared(0));
        assert!(s.set_shared(0));
        assert!(s.get(0));
    }

    #[test]
    fn packed_ones() {
        let mut s = PackedBits::with_len(10);
        s.set(7);
        s.set(2);
        assert_eq!(s.ones().collect::<Vec<_>>(), vec![2, 7]);
    }

    #[test]
    #[should_panic(expected = "index 10 out of range for 10 bits")]
    fn packed_get_out_of_range() {
        PackedBits::with_len(10).get(10);
    }

    #[test]
    #[should_panic(expected = "index 64 out of range for 64 bits")]
    fn atomic_set_out_of_range() {
        AtomicBits::with_len(64).set_shared(64);
    }

    #[test]
    #[should_panic(expected = "m must be equal (left=100, right=200)")]
    fn union_panics_m() {
        let mut s1 = PackedBits::with_len(100);
        let s2 = PackedBits::with_len(200);
        s1.union_with(&s2);
    }

    #[test]
    fn concurrent_set() {
        let s = AtomicBits::with_len(1024);
        std::thread::scope(|scope| {
            for t in 0..4 {
                let s = &s;
                scope.spawn(move || {
                    for i in (t..1024).step_by(4) {
                        s.set_shared(i);
                    }
                });
            }
        });
        assert_eq!(s.count_ones(), 1024);
    }

    #[test]
    fn debug() {
        assert_eq!(format!("{:?}", PackedBits::with_len(7)), "PackedBits { m: 7 }");
        assert_eq!(format!("{:?}", AtomicBits::with_len(7)), "AtomicBits { m: 7 }");
    }
}
