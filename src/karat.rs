// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Gold purity tiers and price conversion between them.

use crate::error::GoldError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grams per troy ounce, the unit spot gold is quoted in.
pub const TROY_OUNCE_GRAMS: Decimal = dec!(31.1035);

/// Purity tier of a piece of gold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Karat {
    K24,
    K21,
    K18,
    K14,
}

impl Karat {
    pub const ALL: [Karat; 4] = [Karat::K24, Karat::K21, Karat::K18, Karat::K14];

    /// Fraction of pure gold in this tier.
    pub fn ratio(self) -> Decimal {
        match self {
            Karat::K24 => dec!(1.000),
            Karat::K21 => dec!(0.875),
            Karat::K18 => dec!(0.750),
            Karat::K14 => dec!(0.583),
        }
    }

    pub fn value(self) -> u32 {
        match self {
            Karat::K24 => 24,
            Karat::K21 => 21,
            Karat::K18 => 18,
            Karat::K14 => 14,
        }
    }
}

impl TryFrom<u32> for Karat {
    type Error = GoldError;

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        match v {
            24 => Ok(Karat::K24),
            21 => Ok(Karat::K21),
            18 => Ok(Karat::K18),
            14 => Ok(Karat::K14),
            other => Err(GoldError::InvalidKarat(other.to_string())),
        }
    }
}

impl From<Karat> for u32 {
    fn from(k: Karat) -> u32 {
        k.value()
    }
}

impl FromStr for Karat {
    type Err = GoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix('k')
            .or_else(|| trimmed.strip_suffix('K'))
            .unwrap_or(trimmed);
        let n: u32 = digits
            .parse()
            .map_err(|_| GoldError::InvalidKarat(s.to_string()))?;
        Karat::try_from(n)
    }
}

impl fmt::Display for Karat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Re-express a price quoted at `from` purity as a price at `to` purity.
///
/// A non-positive price means nothing has been entered yet and converts to zero.
/// Results beyond `Decimal::MAX` saturate.
pub fn convert_price(price: Decimal, from: Karat, to: Karat) -> Decimal {
    checked_convert_price(price, from, to).unwrap_or(Decimal::MAX)
}

/// [`convert_price`], or `None` when the result does not fit in a `Decimal`.
pub fn checked_convert_price(price: Decimal, from: Karat, to: Karat) -> Option<Decimal> {
    if price <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    if from == to {
        return Some(price);
    }
    price.checked_div(from.ratio())?.checked_mul(to.ratio())
}
