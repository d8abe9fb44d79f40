//! Filters, Approximate Membership Queries (AMQs).
//!
//! A filter is a set-like data structure, that keeps track of items it has seen without the need
//! to store them. Looking up items has a certain false positive rate, but a false negative rate
//! of 0%.

pub mod bitstore;

pub mod bloomfilter;

pub mod shared;
