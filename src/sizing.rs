//! Sizing of a filter from its expected load.
//!
//! Given the number of items `n` a filter is expected to hold and the false positive rate `p`
//! it should show once these items are inserted, the number of bits `m` and the number of hash
//! functions `k` are:
//!
//! - `m = -(n * ln(p)) / ln(2)^2`
//! - `k = (m / n) * ln(2)`
//!
//! Both values are truncated towards zero and then raised to at least `1`. Truncation can leave
//! `m` and `k` one unit below the theoretical optimum, so the observed false positive rate may
//! slightly exceed `p`. It is kept so that sizing stays reproducible bit-for-bit; callers that
//! need a strict bound should ask for a smaller `p`.
//!
//! Configs whose `m` exceeds [`MAX_NUM_BITS`] are rejected up front instead of being clamped.
use std::f64::consts::LN_2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest number of bits a filter may have.
pub const MAX_NUM_BITS: usize = isize::MAX as usize;

/// Expected load of a filter.
///
/// # Examples
/// ```
/// use bloomcheck::sizing::FilterConfig;
///
/// let config = FilterConfig::new(1000, 0.01).unwrap();
/// let params = config.params();
/// assert_eq!(params.m(), 9585);
/// assert_eq!(params.k(), 6);
///
/// assert!(FilterConfig::new(0, 0.01).is_err());
/// assert!(FilterConfig::new(1000, 1.).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RawFilterConfig")
)]
pub struct FilterConfig {
    expected_items: usize,
    target_false_positive_rate: f64,
}

impl FilterConfig {
    /// Create new config.
    ///
    /// - `expected_items` number of unique items the filter is expected to hold, must be `> 0`
    /// - `target_false_positive_rate` false positive rate after `expected_items` inserts, must
    ///   be `> 0` and `< 1`
    pub fn new(expected_items: usize, target_false_positive_rate: f64) -> Result<Self> {
        if expected_items == 0 {
            return Err(Error::invalid_configuration(
                "expected_items must be greater than 0",
            ));
        }
        if !(target_false_positive_rate > 0. && target_false_positive_rate < 1.) {
            return Err(Error::invalid_configuration(format!(
                "target_false_positive_rate ({}) must be greater than 0 and smaller than 1",
                target_false_positive_rate
            )));
        }
        let m = num_bits(expected_items, target_false_positive_rate);
        if !(m < MAX_NUM_BITS as f64) {
            return Err(Error::invalid_configuration(format!(
                "{} expected items at rate {} need {:.0} bits, more than the maximum of {}",
                expected_items, target_false_positive_rate, m, MAX_NUM_BITS
            )));
        }

        Ok(Self {
            expected_items,
            target_false_positive_rate,
        })
    }

    /// Number of unique items the filter is expected to hold.
    pub fn expected_items(&self) -> usize {
        self.expected_items
    }

    /// False positive rate the filter should show after `expected_items` inserts.
    pub fn target_false_positive_rate(&self) -> f64 {
        self.target_false_positive_rate
    }

    /// Derive `m` and `k` for this config.
    pub fn params(&self) -> FilterParams {
        let m = optimal_num_bits(self.expected_items, self.target_false_positive_rate);
        let k = optimal_num_hashes(m, self.expected_items);
        FilterParams { m, k }
    }
}

impl Default for FilterConfig {
    /// 1000 items at a false positive rate of 1%.
    fn default() -> Self {
        Self {
            expected_items: 1000,
            target_false_positive_rate: 0.01,
        }
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFilterConfig {
    expected_items: usize,
    target_false_positive_rate: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawFilterConfig> for FilterConfig {
    type Error = Error;

    fn try_from(raw: RawFilterConfig) -> Result<Self> {
        Self::new(raw.expected_items, raw.target_false_positive_rate)
    }
}

/// Internal parameters of a filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FilterParams {
    m: usize,
    k: usize,
}

impl FilterParams {
    /// Create params directly.
    ///
    /// - `m` is the number of bits used to store state, must be `> 0` and `<=` [`MAX_NUM_BITS`]
    /// - `k` is the number of hash functions, must be `> 0`
    pub fn new(m: usize, k: usize) -> Result<Self> {
        if m == 0 {
            return Err(Error::invalid_configuration("m must be greater than 0"));
        }
        if m > MAX_NUM_BITS {
            return Err(Error::invalid_configuration(format!(
                "m ({}) must not exceed {}",
                m, MAX_NUM_BITS
            )));
        }
        if k == 0 {
            return Err(Error::invalid_configuration("k must be greater than 0"));
        }
        Ok(Self { m, k })
    }

    /// Get `m` (number of stored bits).
    pub fn m(&self) -> usize {
        self.m
    }

    /// Get `k` (number of hash functions).
    pub fn k(&self) -> usize {
        self.k
    }
}

/// Number of bits for `n` items at false positive rate `p`, at least `1`.
///
/// `n` and `p` are expected to be validated already, see [`FilterConfig::new`]. Results beyond
/// `usize::MAX` saturate.
pub fn optimal_num_bits(n: usize, p: f64) -> usize {
    (num_bits(n, p) as usize).max(1)
}

fn num_bits(n: usize, p: f64) -> f64 {
    -((n as f64) * p.ln()) / (LN_2 * LN_2)
}

/// Number of hash functions for `m` bits holding `n` items, at least `1`.
pub fn optimal_num_hashes(m: usize, n: usize) -> usize {
    let k = (m as f64 / n as f64) * LN_2;
    (k as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::{FilterConfig, FilterParams, MAX_NUM_BITS, optimal_num_bits, optimal_num_hashes};
    use crate::error::Error;

    #[test]
    fn params_1000_001() {
        let params = FilterConfig::new(1000, 0.01).unwrap().params();
        assert_eq!(params.m(), 9585);
        assert_eq!(params.k(), 6);
    }

    #[test]
    fn params_1000_01() {
        let params = FilterConfig::new(1000, 0.1).unwrap().params();
        assert_eq!(params.m(), 4792);
        assert_eq!(params.k(), 3);
    }

    #[test]
    fn truncates() {
        // 9585.06 bits, 6.64 hashes
        assert_eq!(optimal_num_bits(1000, 0.01), 9585);
        assert_eq!(optimal_num_hashes(9585, 1000), 6);
    }

    #[test]
    fn clamps_to_one() {
        let params = FilterConfig::new(1, 0.9).unwrap().params();
        assert_eq!(params.m(), 1);
        assert_eq!(params.k(), 1);

        assert_eq!(optimal_num_hashes(1, 1000), 1);
    }

    #[test]
    fn params_at_least_one() {
        for n in [1, 2, 3, 10, 100, 12345] {
            for p in [1e-9, 0.001, 0.01, 0.1, 0.5, 0.99, 0.999_999] {
                let params = FilterConfig::new(n, p).unwrap().params();
                assert!(params.m() >= 1, "m for n={} p={}", n, p);
                assert!(params.k() >= 1, "k for n={} p={}", n, p);
            }
        }
    }

    #[test]
    fn zero_items() {
        let err = FilterConfig::new(0, 0.01).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
        assert_eq!(
            err.to_string(),
            "invalid configuration: expected_items must be greater than 0"
        );
    }

    #[test]
    fn rate_bounds() {
        for p in [0., 1., -0.5, 1.5, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = FilterConfig::new(1000, p).unwrap_err();
            assert!(matches!(err, Error::InvalidConfiguration(_)), "p={}", p);
        }
    }

    #[test]
    fn rate_message() {
        let err = FilterConfig::new(1000, 1.).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: target_false_positive_rate (1) must be greater than 0 and smaller than 1"
        );
    }

    #[test]
    fn oversize() {
        let err = FilterConfig::new(usize::MAX / 2, 1e-12).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
        assert!(err.to_string().contains("more than the maximum"), "{}", err);

        assert!(matches!(
            FilterConfig::new(usize::MAX, 0.5),
            Err(Error::InvalidConfiguration(_))
        ));

        // largest loads that still fit
        assert!(FilterConfig::new(1 << 40, 0.01).is_ok());
        assert!(FilterConfig::new(usize::MAX / 16, 0.5).is_ok());
    }

    #[test]
    fn getter() {
        let config = FilterConfig::new(42, 0.25).unwrap();
        assert_eq!(config.expected_items(), 42);
        assert_eq!(config.target_false_positive_rate(), 0.25);
    }

    #[test]
    fn default() {
        let config = FilterConfig::default();
        assert_eq!(config, FilterConfig::new(1000, 0.01).unwrap());
    }

    #[test]
    fn params_new() {
        let params = FilterParams::new(100, 2).unwrap();
        assert_eq!(params.m(), 100);
        assert_eq!(params.k(), 2);

        assert!(matches!(
            FilterParams::new(0, 2),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            FilterParams::new(100, 0),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            FilterParams::new(MAX_NUM_BITS + 1, 2),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(FilterParams::new(MAX_NUM_BITS, 2).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde() {
        let config: FilterConfig = serde_json::from_str(
            r#"{"expected_items": 1000, "target_false_positive_rate": 0.01}"#,
        )
        .unwrap();
        assert_eq!(config, FilterConfig::new(1000, 0.01).unwrap());

        let s = serde_json::to_string(&config).unwrap();
        assert_eq!(
            s,
            r#"{"expected_items":1000,"target_false_positive_rate":0.01}"#
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_rejects_invalid() {
        let res = serde_json::from_str::<FilterConfig>(
            r#"{"expected_items": 0, "target_false_positive_rate": 0.01}"#,
        );
        let err = res.unwrap_err();
        assert!(
            err.to_string()
                .contains("expected_items must be greater than 0")
        );

        let res = serde_json::from_str::<FilterConfig>(
            r#"{"expected_items": 10, "target_false_positive_rate": 0.01, "m": 3}"#,
        );
        assert!(res.is_err());
    }
}
