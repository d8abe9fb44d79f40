//! Hash-related utils.
use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::io::Cursor;

use murmur3::murmur3_32;

/// A family of hash functions `h_i(x), for i in 0..k`, each mapping an item to an integer
/// `>= 0` and `< m`.
///
/// Implementations must be deterministic: the same `(item, seed, m)` always yields the same
/// digest. Different seeds should behave like independent hash functions; cryptographic
/// strength is not required.
pub trait HashFamily {
    /// Compute `h_seed(item)`, reduced to `[0, m)`.
    ///
    /// `m` must be `> 0`.
    fn digest(&self, item: &[u8], seed: usize, m: usize) -> usize;
}

impl<H> HashFamily for &H
where
    H: HashFamily + ?Sized,
{
    fn digest(&self, item: &[u8], seed: usize, m: usize) -> usize {
        (**self).digest(item, seed, m)
    }
}

/// Seeded MurmurHash3 (x86, 32 bits).
///
/// The 32 bit hash is read as a signed integer and reduced with a floored modulo, so the
/// digests match those of the widespread `mmh3.hash(item, seed) % m` idiom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Murmur3;

impl HashFamily for Murmur3 {
    fn digest(&self, item: &[u8], seed: usize, m: usize) -> usize {
        // reads from an in-memory slice never fail
        let h = murmur3_32(&mut Cursor::new(item), seed as u32).unwrap_or_default() as i32;
        i64::from(h).rem_euclid(m as i64) as usize
    }
}

/// Hash family built on top of a [`BuildHasher`].
///
/// This is implemented by creating a new `Hasher` for each result, seeding it with the index of
/// the hash function, hashing the actual payload and then finalizing the `Hasher`. The
/// `BuildHasher` must be stable, i.e. create the same `Hasher` on every call.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BuildHasherFamily<B> {
    buildhasher: B,
}

impl<B> BuildHasherFamily<B>
where
    B: BuildHasher,
{
    /// Create new family from given `BuildHasher`.
    pub fn new(buildhasher: B) -> Self {
        Self { buildhasher }
    }

    /// Get `BuildHasher`.
    pub fn buildhasher(&self) -> &B {
        &self.buildhasher
    }
}

impl<B> HashFamily for BuildHasherFamily<B>
where
    B: BuildHasher,
{
    fn digest(&self, item: &[u8], seed: usize, m: usize) -> usize {
        let mut hasher = self.buildhasher.build_hasher();
        hasher.write_usize(seed);
        hasher.write(item);
        (hasher.finish() % (m as u64)) as usize
    }
}

impl<B> fmt::Debug for BuildHasherFamily<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("BuildHasherFamily")
    }
}

/// `Iterator` that creates `h_i(x), for i in 0..k` for a given item.
#[derive(Debug)]
pub struct DigestIter<'a, H>
where
    H: HashFamily,
{
    family: &'a H,
    item: &'a [u8],
    m: usize,
    k: usize,
    i: usize,
}

impl<'a, H> DigestIter<'a, H>
where
    H: HashFamily,
{
    /// Create new `DigestIter` with the following parameters:
    ///
    /// - `family`: the hash functions to evaluate
    /// - `item`: the item that should be hashed, i.e. `x` in `h_i(x)`
    /// - `m`: the exclusive upper bound of `h_i(x)`, must be `> 0`
    /// - `k`: number of hash functions to evaluate
    pub fn new(family: &'a H, item: &'a [u8], m: usize, k: usize) -> Self {
        assert!(m > 0, "m must be greater than 0");
        Self {
            family,
            item,
            m,
            k,
            i: 0,
        }
    }
}

impl<H> Iterator for DigestIter<'_, H>
where
    H: HashFamily,
{
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.i < self.k {
            let x = self.family.digest(self.item, self.i, self.m);
            self.i += 1;
            Some(x)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.k - self.i;
        (remaining, Some(remaining))
    }
}

impl<H> ExactSizeIterator for DigestIter<'_, H> where H: HashFamily {}
