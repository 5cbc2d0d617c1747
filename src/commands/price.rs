// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::json_flags;
use crate::config::{Settings, resolve_owner};
use crate::feeds::gold::{Timeframe, default_history, default_spot_sources, fetch_spot};
use crate::karat::Karat;
use crate::models::PriceQuote;
use crate::store::{self, PurchaseFilter};
use crate::utils::{fmt_2dp, fmt_money, http_client, maybe_print_json, opt_decimal, pretty_table};
use crate::valuation::{KaratSpotPrices, holding_value_series, karat_spot_prices, round2};
use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("fetch", _)) => {
            let q = fetch_and_record(conn)?;
            println!(
                "Gold spot {} per oz ({})",
                fmt_money(q.price_per_ounce_usd, "USD"),
                q.source
            );
            Ok(())
        }
        Some(("list", sub)) => list_prices(conn, sub),
        Some(("spot", sub)) => spot(conn, sub),
        Some(("history", sub)) => history(conn, sub),
        _ => Ok(()),
    }
}

pub(crate) fn fetch_and_record(conn: &Connection) -> Result<PriceQuote> {
    let client = http_client()?;
    let quote = fetch_spot(&default_spot_sources(&client)).context("Fetch gold spot price")?;
    store::record_gold_price(conn, &quote)?;
    Ok(quote)
}

/// Spot price for a valuation: an explicit `--price`, a live fetch, or the
/// latest recorded quote.
pub(crate) fn resolve_price(
    conn: &Connection,
    explicit: Option<Decimal>,
    live: bool,
) -> Result<PriceQuote> {
    if let Some(p) = explicit {
        if p <= Decimal::ZERO {
            bail!("--price must be greater than zero, got {}", p);
        }
        return Ok(PriceQuote {
            price_per_ounce_usd: p,
            source: "manual".into(),
            as_of: Utc::now(),
        });
    }
    if live {
        return fetch_and_record(conn);
    }
    let q = store::latest_gold_price(conn)?.ok_or_else(|| {
        anyhow!("No gold price recorded; run `goldclip price fetch` or pass --price")
    })?;
    debug!(price = %q.price_per_ounce_usd, as_of = %q.as_of, "using recorded gold price");
    Ok(q)
}

fn list_prices(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(20);
    let quotes = store::list_gold_prices(conn, limit)?;
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &quotes)? {
        return Ok(());
    }
    let rows = quotes
        .iter()
        .map(|q| {
            vec![
                q.as_of.format("%Y-%m-%d %H:%M").to_string(),
                fmt_2dp(q.price_per_ounce_usd),
                q.source.clone(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["As of (UTC)", "USD/oz", "Source"], rows));
    Ok(())
}

#[derive(Debug, Serialize)]
struct SpotTable {
    ounce_price_usd: Decimal,
    source: String,
    usd: KaratSpotPrices,
    #[serde(skip_serializing_if = "Option::is_none")]
    usd_to_egp: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    egp: Option<KaratSpotPrices>,
}

fn in_egp(usd: &KaratSpotPrices, rate: Decimal) -> KaratSpotPrices {
    KaratSpotPrices {
        karat24: round2(usd.karat24.saturating_mul(rate)),
        karat21: round2(usd.karat21.saturating_mul(rate)),
        karat18: round2(usd.karat18.saturating_mul(rate)),
        karat14: round2(usd.karat14.saturating_mul(rate)),
    }
}

fn spot(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let quote = resolve_price(conn, opt_decimal(sub, "price")?, false)?;
    let rate = opt_decimal(sub, "rate")?;
    if let Some(r) = rate {
        if r <= Decimal::ZERO {
            bail!("--rate must be greater than zero, got {}", r);
        }
    }
    let usd = karat_spot_prices(quote.price_per_ounce_usd);
    let table = SpotTable {
        ounce_price_usd: quote.price_per_ounce_usd,
        source: quote.source,
        egp: rate.map(|r| in_egp(&usd, r)),
        usd_to_egp: rate,
        usd,
    };
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &table)? {
        return Ok(());
    }

    let mut headers = vec!["Karat", "USD/g"];
    if table.egp.is_some() {
        headers.push("EGP/g");
    }
    let rows = Karat::ALL
        .iter()
        .map(|&k| {
            let mut row = vec![format!("{}k", k), fmt_2dp(table.usd.get(k))];
            if let Some(egp) = &table.egp {
                row.push(fmt_2dp(egp.get(k)));
            }
            row
        })
        .collect();
    println!(
        "Spot {} per oz ({})",
        fmt_money(table.ounce_price_usd, "USD"),
        table.source
    );
    println!("{}", pretty_table(&headers, rows));
    Ok(())
}

fn history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tf = Timeframe::from_name(
        sub.get_one::<String>("tf")
            .map(|s| s.as_str())
            .unwrap_or_default(),
    );
    let owner = resolve_owner(conn, sub)?;
    let basis = Settings::load(conn)?.valuation_basis;
    let purchases = store::list_purchases(conn, &owner, &PurchaseFilter::default())?;
    let weight = purchases
        .iter()
        .map(|p| basis.valued_weight(p))
        .fold(Decimal::ZERO, Decimal::saturating_add);

    let client = http_client()?;
    let points = default_history(&client, tf, Utc::now().date_naive());
    let series = holding_value_series(&points, weight);

    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &series)? {
        return Ok(());
    }
    if series.is_empty() {
        println!("No price history available for {}", tf.name());
        return Ok(());
    }
    let rows = series
        .iter()
        .map(|p| {
            vec![
                p.date.to_string(),
                fmt_2dp(p.price_usd),
                fmt_2dp(p.holding_value_usd),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "USD/oz", "Holding value (USD)"], rows)
    );
    Ok(())
}
