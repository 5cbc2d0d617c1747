// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::get_text;
use crate::error::GoldError;
use crate::models::ExchangeRate;
use chrono::Utc;
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{info, warn};

const ER_API_URL: &str = "https://open.er-api.com/v6/latest/USD";
const SOURCE: &str = "open.er-api.com";

#[derive(Debug, Deserialize)]
struct LatestRates {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// EGP per 1 USD from an open.er-api.com `latest/USD` payload.
pub fn parse_er_api(body: &str) -> Result<Decimal, GoldError> {
    let latest: LatestRates = serde_json::from_str(body).map_err(|e| GoldError::feed(SOURCE, e))?;
    let rate = latest
        .rates
        .get("EGP")
        .copied()
        .ok_or_else(|| GoldError::feed(SOURCE, "response has no EGP rate"))?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(GoldError::feed(SOURCE, format!("invalid EGP rate {}", rate)));
    }
    Decimal::from_f64_retain(rate)
        .map(|d| d.round_dp(4))
        .ok_or_else(|| GoldError::feed(SOURCE, format!("unrepresentable EGP rate {}", rate)))
}

pub fn fetch_live_usd_egp(client: &Client) -> Result<ExchangeRate, GoldError> {
    let body = get_text(client, SOURCE, ER_API_URL)?;
    Ok(ExchangeRate {
        usd_to_egp: parse_er_api(&body)?,
        source: SOURCE.to_string(),
        as_of: Utc::now(),
    })
}

/// Keep a live rate, or substitute the configured fallback.
pub fn or_fallback(live: Result<ExchangeRate, GoldError>, fallback: Decimal) -> ExchangeRate {
    match live {
        Ok(rate) => {
            info!(rate = %rate.usd_to_egp, "USD/EGP rate");
            rate
        }
        Err(e) => {
            warn!(error = %e, fallback = %fallback, "exchange rate unavailable, using fallback");
            ExchangeRate {
                usd_to_egp: fallback,
                source: "fallback".to_string(),
                as_of: Utc::now(),
            }
        }
    }
}

/// Never fails: a network or payload problem yields the fallback rate.
pub fn fetch_usd_egp(client: &Client, fallback: Decimal) -> ExchangeRate {
    or_fallback(fetch_live_usd_egp(client), fallback)
}
