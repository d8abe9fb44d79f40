//! Filter handle that can be shared between threads.
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::filters::bitstore::AtomicBits;
use crate::filters::bloomfilter::MembershipFilter;
use crate::hash_utils::{HashFamily, Murmur3};
use crate::sizing::FilterConfig;

/// Cheaply cloneable handle to a single [`MembershipFilter`].
///
/// All clones see the same bits. Inserts set each bit with an atomic `fetch_or`, so concurrent
/// inserts never lose each other's bits and no lock is taken. A query running at the same time
/// as an insert of the same item may still answer `false`; once `insert` has returned, every
/// query for that item answers `true`.
///
/// # Examples
/// ```
/// use std::thread;
///
/// use bloomcheck::filters::shared::SharedFilter;
///
/// let filter = SharedFilter::new(1000, 0.01).unwrap();
///
/// let handle = {
///     let filter = filter.clone();
///     thread::spawn(move || filter.insert("apple"))
/// };
/// handle.join().unwrap();
///
/// assert!(filter.query("apple"));
/// ```
pub struct SharedFilter<H = Murmur3> {
    inner: Arc<MembershipFilter<H, AtomicBits>>,
}

impl SharedFilter {
    /// Create new, empty filter with given properties, see [`MembershipFilter::new`].
    pub fn new(expected_items: usize, target_false_positive_rate: f64) -> Result<Self> {
        let config = FilterConfig::new(expected_items, target_false_positive_rate)?;
        Ok(Self::with_config(config))
    }

    /// Create new, empty filter from an already validated config.
    pub fn with_config(config: FilterConfig) -> Self {
        Self::with_config_and_hash(config, Murmur3)
    }
}

impl<H> SharedFilter<H>
where
    H: HashFamily,
{
    /// Same as `with_config` but with specific hash family.
    pub fn with_config_and_hash(config: FilterConfig, hash_family: H) -> Self {
        let filter: MembershipFilter<H, AtomicBits> =
            MembershipFilter::with_config_and_hash(config, hash_family);
        filter.into()
    }

    /// Get `k` (number of hash functions).
    pub fn k(&self) -> usize {
        self.inner.k()
    }

    /// Get `m` (number of stored bits).
    pub fn m(&self) -> usize {
        self.inner.m()
    }

    /// Get config the filter was sized from, if any.
    pub fn config(&self) -> Option<&FilterConfig> {
        self.inner.config()
    }

    /// Add item to the filter.
    pub fn insert<T>(&self, item: &T)
    where
        T: AsRef<[u8]> + ?Sized,
    {
        self.inner.insert_shared(item)
    }

    /// Guess if the given item was added to the filter.
    pub fn query<T>(&self, item: &T) -> bool
    where
        T: AsRef<[u8]> + ?Sized,
    {
        self.inner.query(item)
    }

    /// Add item to the filter and report if it was likely already part of the filter.
    pub fn contains_and_insert<T>(&self, item: &T) -> bool
    where
        T: AsRef<[u8]> + ?Sized,
    {
        self.inner.contains_and_insert_shared(item)
    }

    /// Check whether the filter is empty, i.e. no item was added yet.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of bits that are set.
    pub fn bits_set(&self) -> usize {
        self.inner.bits_set()
    }

    /// See [`MembershipFilter::estimated_fpp`].
    pub fn estimated_fpp(&self) -> f64 {
        self.inner.estimated_fpp()
    }
}

impl<H> From<MembershipFilter<H, AtomicBits>> for SharedFilter<H> {
    fn from(filter: MembershipFilter<H, AtomicBits>) -> Self {
        Self {
            inner: Arc::new(filter),
        }
    }
}

impl<H> Clone for SharedFilter<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> fmt::Debug for SharedFilter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedFilter {{ m: {}, k: {} }}", self.inner.m(), self.inner.k())
    }
}
