//! Price oracle
//!
//! Maps each token to its value in the reference currency (USD), so that
//! payments denominated in other tokens can be converted into agreement
//! funds. USD is always present with a price of 1.0.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Reference currency every price is quoted in
pub const REFERENCE_TOKEN: &str = "USD";

/// Minor units (cents) per reference unit
const MINOR_UNITS_PER_REFERENCE: f64 = 100.0;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OracleError {
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Quantity must be finite and non-negative, got {0}")]
    InvalidQuantity(f64),

    #[error("Price for {token} must be finite and positive, got {price}")]
    InvalidPrice { token: String, price: f64 },
}

/// Token price table
///
/// # Example
/// ```
/// use proposal_inverter_core_rs::PriceOracle;
///
/// let oracle = PriceOracle::new([("ADA", 1.5), ("SOL", 96.0)]).unwrap();
/// assert_eq!(oracle.convert("ADA", "USD", 42.0).unwrap(), 63.0);
/// assert_eq!(oracle.convert("SOL", "ADA", 1.0).unwrap(), 64.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct PriceOracle {
    prices: BTreeMap<String, f64>,
}

impl Default for PriceOracle {
    fn default() -> Self {
        let mut prices = BTreeMap::new();
        prices.insert(REFERENCE_TOKEN.to_string(), 1.0);
        Self { prices }
    }
}

impl PriceOracle {
    /// Create an oracle seeded with `prices` on top of the reference token
    pub fn new<I, S>(prices: I) -> Result<Self, OracleError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut oracle = Self::default();
        for (token, price) in prices {
            oracle.set_price(token, price)?;
        }
        Ok(oracle)
    }

    /// Set or replace the reference price of a token
    pub fn set_price(&mut self, token: impl Into<String>, price: f64) -> Result<(), OracleError> {
        let token = token.into();
        if !price.is_finite() || price <= 0.0 {
            return Err(OracleError::InvalidPrice { token, price });
        }
        self.prices.insert(token, price);
        Ok(())
    }

    pub fn price(&self, token: &str) -> Option<f64> {
        self.prices.get(token).copied()
    }

    /// Convert `n` units of `from_token` into `to_token`
    pub fn convert(&self, from_token: &str, to_token: &str, n: f64) -> Result<f64, OracleError> {
        if !n.is_finite() || n < 0.0 {
            return Err(OracleError::InvalidQuantity(n));
        }
        let from = self
            .price(from_token)
            .ok_or_else(|| OracleError::UnknownToken(from_token.to_string()))?;
        let to = self
            .price(to_token)
            .ok_or_else(|| OracleError::UnknownToken(to_token.to_string()))?;

        Ok(n * from / to)
    }

    /// Value of `n` units of `token` in reference minor units (cents),
    /// rounded to the nearest cent
    pub fn to_minor_units(&self, token: &str, n: f64) -> Result<i64, OracleError> {
        let value = self.convert(token, REFERENCE_TOKEN, n)?;
        Ok((value * MINOR_UNITS_PER_REFERENCE).round() as i64)
    }
}

impl TryFrom<BTreeMap<String, f64>> for PriceOracle {
    type Error = OracleError;

    fn try_from(prices: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::new(prices)
    }
}

impl From<PriceOracle> for BTreeMap<String, f64> {
    fn from(oracle: PriceOracle) -> Self {
        oracle.prices
    }
}
