//! MembershipFilter implementation.
use std::fmt;

use log::debug;

use crate::error::Result;
use crate::filters::bitstore::{AtomicBits, BitStore, PackedBits};
use crate::hash_utils::{DigestIter, HashFamily, Murmur3};
use crate::sizing::{FilterConfig, FilterParams};

/// A Bloom filter sized for an expected number of items and a target false positive rate.
///
/// # Examples
/// ```
/// use bloomcheck::filters::bloomfilter::MembershipFilter;
///
/// // set up filter
/// let false_positive_rate = 0.01;  // = 1%
/// let expected_items = 1000;
/// let mut filter = MembershipFilter::new(expected_items, false_positive_rate).unwrap();
/// assert_eq!(filter.m(), 9585);
/// assert_eq!(filter.k(), 6);
///
/// // add some data
/// filter.insert("apple");
///
/// // later
/// assert!(filter.query("apple"));
/// assert!(!filter.query("banana"));
/// ```
///
/// # Applications
/// - as a pre-filter for more expensive lookups, e.g. in combination with a database, so that
///   items which were never stored do not cause a slow lookup
///
/// # How It Works
/// The filter is represented by a bit vector of size `m`. Also given are `k` hash functions
/// `h_i(x), for i in 0..k`, every one mapping an item `x` to an integer `>= 0` and `< m`.
/// Initially, all bits are set to `False`.
///
/// During insertion of item `x`, the `k` bits addressed by `h_i(x), for i in 0..k` are set to
/// `True`.
///
/// During lookup, it is checked if all these bits are set. If so, the item might be in the
/// filter. If only a single bit is not set, it is clear that the item was never added to the
/// filter.
///
/// Bits are never cleared, so items cannot be removed and the filter never forgets an item.
///
/// # See Also
/// - [`SharedFilter`](crate::filters::shared::SharedFilter): the same filter behind a handle
///   that can be shared between threads
///
/// # References
/// - ["Space/Time Trade-offs in Hash Coding with Allowable Errors", Burton H. Bloom, 1970](http://dmod.eu/deca/ft_gateway.cfm.pdf)
/// - [Wikipedia: Bloom filter](https://en.wikipedia.org/wiki/Bloom_filter)
#[derive(Clone, PartialEq)]
pub struct MembershipFilter<H = Murmur3, S = PackedBits> {
    config: Option<FilterConfig>,
    params: FilterParams,
    hash_family: H,
    bits: S,
}

impl MembershipFilter {
    /// Create new, empty filter with given properties.
    ///
    /// - `expected_items` number of unique items the filter is expected to hold, must be `> 0`
    /// - `target_false_positive_rate` false positive rate when querying the filter after adding
    ///   `expected_items` unique items, must be `> 0` and `< 1`
    ///
    /// Fails with [`Error::InvalidConfiguration`](crate::error::Error::InvalidConfiguration) if
    /// the parameters are not in range. Nothing is allocated in that case.
    pub fn new(expected_items: usize, target_false_positive_rate: f64) -> Result<Self> {
        let config = FilterConfig::new(expected_items, target_false_positive_rate)?;
        Ok(Self::with_config(config))
    }

    /// Create new, empty filter from an already validated config.
    pub fn with_config(config: FilterConfig) -> Self {
        Self::with_config_and_hash(config, Murmur3)
    }

    /// Create new, empty filter with internal parameters.
    pub fn with_params(params: FilterParams) -> Self {
        Self::with_params_and_hash(params, Murmur3)
    }
}

impl<H, S> MembershipFilter<H, S> {
    /// Get `k` (number of hash functions).
    pub fn k(&self) -> usize {
        self.params.k()
    }

    /// Get `m` (number of stored bits).
    pub fn m(&self) -> usize {
        self.params.m()
    }

    /// Get config the filter was sized from, if any.
    pub fn config(&self) -> Option<&FilterConfig> {
        self.config.as_ref()
    }

    /// Get hash family.
    pub fn hash_family(&self) -> &H {
        &self.hash_family
    }

    /// Get underlying bit store.
    pub fn bit_store(&self) -> &S {
        &self.bits
    }
}

impl<H, S> MembershipFilter<H, S>
where
    H: HashFamily,
    S: BitStore,
{
    /// Same as `with_config` but with specific hash family and store.
    pub fn with_config_and_hash(config: FilterConfig, hash_family: H) -> Self {
        let params = config.params();
        debug!(
            "sized membership filter for {} items at rate {}: m={}, k={}",
            config.expected_items(),
            config.target_false_positive_rate(),
            params.m(),
            params.k()
        );
        Self::build(Some(config), params, hash_family)
    }

    /// Same as `with_params` but with specific hash family and store.
    pub fn with_params_and_hash(params: FilterParams, hash_family: H) -> Self {
        debug!("membership filter with m={}, k={}", params.m(), params.k());
        Self::build(None, params, hash_family)
    }

    fn build(config: Option<FilterConfig>, params: FilterParams, hash_family: H) -> Self {
        Self {
            config,
            params,
            hash_family,
            bits: S::with_len(params.m()),
        }
    }

    /// Iterate over the `k` bit positions addressed by `item`.
    pub fn digests<'a, T>(&'a self, item: &'a T) -> DigestIter<'a, H>
    where
        T: AsRef<[u8]> + ?Sized,
    {
        DigestIter::new(&self.hash_family, item.as_ref(), self.m(), self.k())
    }

    /// Add item to the filter.
    ///
    /// If the same item is added multiple times or if an item results in the same hash
    /// signature, this method does not have any effect.
    pub fn insert<T>(&mut self, item: &T)
    where
        T: AsRef<[u8]> + ?Sized,
    {
        let digests = DigestIter::new(
            &self.hash_family,
            item.as_ref(),
            self.params.m(),
            self.params.k(),
        );
        for pos in digests {
            self.bits.set(pos);
        }
    }

    /// Guess if the given item was added to the filter.
    ///
    /// `false` is exact: the item was never added. `true` means the item was added or is a
    /// false positive.
    pub fn query<T>(&self, item: &T) -> bool
    where
        T: AsRef<[u8]> + ?Sized,
    {
        for pos in self.digests(item) {
            if !self.bits.get(pos) {
                return false;
            }
        }
        true
    }

    /// Add item to the filter and report if it was likely already part of the filter.
    ///
    /// The result equals calling `query` before `insert`, but hashes only once.
    pub fn contains_and_insert<T>(&mut self, item: &T) -> bool
    where
        T: AsRef<[u8]> + ?Sized,
    {
        let mut present = true;
        let digests = DigestIter::new(
            &self.hash_family,
            item.as_ref(),
            self.params.m(),
            self.params.k(),
        );
        for pos in digests {
            if !self.bits.get(pos) {
                present = false;
                self.bits.set(pos);
            }
        }
        present
    }

    /// Check whether the filter is empty, i.e. no item was added yet.
    pub fn is_empty(&self) -> bool {
        self.bits.count_ones() == 0
    }

    /// Number of bits that are set.
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Probability that `query` returns `true` for an item that was never added, given the
    /// current fill level.
    pub fn estimated_fpp(&self) -> f64 {
        let fill = self.bits.count_ones() as f64 / self.m() as f64;
        fill.powi(self.k() as i32)
    }

    /// Add the entire content of another filter to this filter.
    ///
    /// The result is the same as adding all items added to `other` to `self` in the first
    /// place.
    ///
    /// Panics if `k`, `m` or the hash family of the two filters are not identical.
    pub fn union(&mut self, other: &Self)
    where
        H: PartialEq,
    {
        assert_eq!(
            self.k(),
            other.k(),
            "k must be equal (left={}, right={})",
            self.k(),
            other.k()
        );
        assert_eq!(
            self.m(),
            other.m(),
            "m must be equal (left={}, right={})",
            self.m(),
            other.m()
        );
        assert!(
            self.hash_family == other.hash_family,
            "hash family must be equal"
        );

        self.bits.union_with(&other.bits);
    }
}

impl<H> MembershipFilter<H, AtomicBits>
where
    H: HashFamily,
{
    /// Same as `insert`, but through a shared reference.
    ///
    /// A concurrent `query` may observe the insert only partially and report `false` until this
    /// method returns.
    pub fn insert_shared<T>(&self, item: &T)
    where
        T: AsRef<[u8]> + ?Sized,
    {
        for pos in self.digests(item) {
            self.bits.set_shared(pos);
        }
    }

    /// Same as `contains_and_insert`, but through a shared reference.
    pub fn contains_and_insert_shared<T>(&self, item: &T) -> bool
    where
        T: AsRef<[u8]> + ?Sized,
    {
        let mut present = true;
        for pos in self.digests(item) {
            present &= self.bits.set_shared(pos);
        }
        present
    }
}

impl<H, S> fmt::Debug for MembershipFilter<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MembershipFilter {{ m: {}, k: {} }}",
            self.params.m(),
            self.params.k()
        )
    }
}

impl<T, H, S> Extend<T> for MembershipFilter<H, S>
where
    T: AsRef<[u8]>,
    H: HashFamily,
    S: BitStore,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(&item);
        }
    }
}
