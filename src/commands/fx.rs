// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::json_flags;
use crate::config::Settings;
use crate::feeds::fx::fetch_usd_egp;
use crate::models::ExchangeRate;
use crate::store;
use crate::utils::{fmt_2dp, http_client, maybe_print_json, pretty_table};
use anyhow::{Result, bail};
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::debug;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("fetch", _)) => {
            let rate = fetch_and_record(conn)?;
            println!(
                "USD/EGP {} ({})",
                rate.usd_to_egp.round_dp(4),
                rate.source
            );
        }
        Some(("list", sub)) => list_rates(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Fetch the live rate, falling back to the configured one, and record it.
pub(crate) fn fetch_and_record(conn: &Connection) -> Result<ExchangeRate> {
    let settings = Settings::load(conn)?;
    let client = http_client()?;
    let rate = fetch_usd_egp(&client, settings.fallback_usd_egp);
    store::record_fx_rate(conn, &rate)?;
    Ok(rate)
}

/// Rate for a valuation: an explicit `--rate`, a live fetch, the latest
/// recorded rate, or the configured fallback, in that order.
pub(crate) fn resolve_rate(
    conn: &Connection,
    explicit: Option<Decimal>,
    live: bool,
) -> Result<ExchangeRate> {
    if let Some(r) = explicit {
        if r <= Decimal::ZERO {
            bail!("--rate must be greater than zero, got {}", r);
        }
        return Ok(ExchangeRate {
            usd_to_egp: r,
            source: "manual".into(),
            as_of: Utc::now(),
        });
    }
    if live {
        return fetch_and_record(conn);
    }
    if let Some(r) = store::latest_fx_rate(conn)? {
        debug!(rate = %r.usd_to_egp, as_of = %r.as_of, "using recorded USD/EGP rate");
        return Ok(r);
    }
    let settings = Settings::load(conn)?;
    Ok(ExchangeRate {
        usd_to_egp: settings.fallback_usd_egp,
        source: "fallback".into(),
        as_of: Utc::now(),
    })
}

fn list_rates(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(20);
    let rates = store::list_fx_rates(conn, limit)?;
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &rates)? {
        return Ok(());
    }
    let rows = rates
        .iter()
        .map(|r| {
            vec![
                r.as_of.format("%Y-%m-%d %H:%M").to_string(),
                fmt_2dp(r.usd_to_egp),
                r.source.clone(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["As of (UTC)", "USD/EGP", "Source"], rows));
    Ok(())
}
