// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::GoldError;
use crate::valuation::ValuationBasis;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_OWNER: &str = "local";
pub const DEFAULT_FALLBACK_USD_EGP: Decimal = dec!(30);

pub const KEYS: [&str; 4] = ["display_currency", "owner", "fallback_usd_egp", "valuation_basis"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisplayCurrency {
    #[default]
    Usd,
    Egp,
}

impl DisplayCurrency {
    /// Express a USD amount in this currency.
    pub fn from_usd(self, usd: Decimal, usd_to_egp: Decimal) -> Decimal {
        match self {
            DisplayCurrency::Usd => usd,
            DisplayCurrency::Egp => usd.saturating_mul(usd_to_egp),
        }
    }
}

impl FromStr for DisplayCurrency {
    type Err = GoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(DisplayCurrency::Usd),
            "EGP" => Ok(DisplayCurrency::Egp),
            _ => Err(GoldError::InvalidSetting {
                key: "display_currency".into(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DisplayCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayCurrency::Usd => f.write_str("USD"),
            DisplayCurrency::Egp => f.write_str("EGP"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub display_currency: DisplayCurrency,
    pub owner: String,
    pub fallback_usd_egp: Decimal,
    pub valuation_basis: ValuationBasis,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_currency: DisplayCurrency::default(),
            owner: DEFAULT_OWNER.to_string(),
            fallback_usd_egp: DEFAULT_FALLBACK_USD_EGP,
            valuation_basis: ValuationBasis::default(),
        }
    }
}

impl Settings {
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut s = Settings::default();
        if let Some(v) = get_setting(conn, "display_currency")? {
            s.display_currency = v.parse()?;
        }
        if let Some(v) = get_setting(conn, "owner")? {
            s.owner = v;
        }
        if let Some(v) = get_setting(conn, "fallback_usd_egp")? {
            s.fallback_usd_egp = parse_positive_rate(&v)?;
        }
        if let Some(v) = get_setting(conn, "valuation_basis")? {
            s.valuation_basis = v.parse()?;
        }
        Ok(s)
    }
}

/// Check `value` for `key` and return the normalized form to store.
pub fn normalize_setting(key: &str, value: &str) -> Result<String, GoldError> {
    match key {
        "display_currency" => Ok(value.parse::<DisplayCurrency>()?.to_string()),
        "owner" => {
            let v = value.trim();
            if v.is_empty() {
                return Err(GoldError::InvalidSetting {
                    key: key.into(),
                    value: value.into(),
                });
            }
            Ok(v.to_string())
        }
        "fallback_usd_egp" => Ok(parse_positive_rate(value)?.to_string()),
        "valuation_basis" => Ok(value.parse::<ValuationBasis>()?.to_string()),
        other => Err(GoldError::UnknownSetting(other.to_string())),
    }
}

fn parse_positive_rate(value: &str) -> Result<Decimal, GoldError> {
    let invalid = || GoldError::InvalidSetting {
        key: "fallback_usd_egp".into(),
        value: value.to_string(),
    };
    let d = value.trim().parse::<Decimal>().map_err(|_| invalid())?;
    if d <= Decimal::ZERO {
        return Err(invalid());
    }
    Ok(d)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<String> {
    let normalized = normalize_setting(key, value)?;
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, normalized],
    )?;
    Ok(normalized)
}

/// Owner for this invocation: the `--owner` flag, else the stored setting.
pub fn resolve_owner(conn: &Connection, m: &clap::ArgMatches) -> Result<String> {
    let flag = m
        .try_get_one::<String>("owner")
        .ok()
        .flatten()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    match flag {
        Some(o) => Ok(o),
        None => Ok(Settings::load(conn)?.owner),
    }
}
