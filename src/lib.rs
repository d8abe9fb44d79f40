//! Pre-sized Bloom filter for fast membership pre-checks.
//!
//! A [`MembershipFilter`](filters::bloomfilter::MembershipFilter) answers whether an item is
//! *possibly* part of a set or *definitely* not, before an expensive definitive lookup has to be
//! made. The filter is sized once from the number of items it is expected to hold and the false
//! positive rate it should show, see [`sizing`]. It never forgets an item and never grows.
//!
//! # Modules
//! - [`sizing`]: derives the number of bits `m` and hash functions `k`
//! - [`hash_utils`]: seeded hash families producing the `k` bit positions of an item
//! - [`filters`]: bit stores, the filter itself and a handle to share it between threads
//! - `gateway` (feature `gateway`): JSON request/response shim for a membership service
//!
//! # Example
//! ```
//! use bloomcheck::filters::bloomfilter::MembershipFilter;
//!
//! let mut filter = MembershipFilter::new(1000, 0.01).unwrap();
//! filter.insert("apple");
//!
//! assert!(filter.query("apple"));
//! assert!(!filter.query("grape"));
//! ```
#![deny(
    anonymous_parameters,
    bare_trait_objects,
    clippy::clone_on_ref_ptr,
    clippy::explicit_iter_loop,
    clippy::future_not_send,
    clippy::use_self,
    dead_code,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    non_camel_case_types,
    non_snake_case,
    non_upper_case_globals,
    rust_2018_idioms,
    rustdoc::bare_urls,
    rustdoc::broken_intra_doc_links,
    unknown_lints,
    unreachable_code,
    unreachable_patterns,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates
)]

pub mod error;

pub mod filters;

#[cfg(feature = "gateway")]
pub mod gateway;

pub mod hash_utils;

pub mod sizing;

pub use error::{Error, Result};
