// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::resolve_owner;
use crate::models::PurchaseInput;
use crate::store;
use crate::utils::{parse_date, parse_decimal, parse_karat, required};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::info;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("purchases", sub)) => {
            let n = import_purchases(conn, sub)?;
            println!("Imported {} purchases", n);
            Ok(())
        }
        _ => Ok(()),
    }
}

fn optional_amount(raw: Option<&str>, field: &str, line: u64) -> Result<Decimal> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_decimal(s).with_context(|| format!("Line {}: invalid {}", line, field)),
        None => Ok(Decimal::ZERO),
    }
}

/// Import rows shaped like the purchase export. The `id` and `total_cost`
/// columns are ignored; costs are recomputed. Any bad row aborts the whole
/// import.
pub fn import_purchases(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<usize> {
    let path = required(sub, "path")?.trim();
    let owner = resolve_owner(conn, sub)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut count = 0usize;
    for result in rdr.records() {
        let rec = result?;
        let line = rec.position().map(|p| p.line()).unwrap_or_default();
        let date_raw = rec.get(1).with_context(|| format!("Line {}: date missing", line))?;
        let karat_raw = rec.get(2).with_context(|| format!("Line {}: karat missing", line))?;
        let weight_raw = rec.get(3).with_context(|| format!("Line {}: weight missing", line))?;
        let price_raw = rec
            .get(4)
            .with_context(|| format!("Line {}: price_per_gram missing", line))?;

        let karat =
            parse_karat(karat_raw).with_context(|| format!("Line {}: invalid karat", line))?;
        let input = PurchaseInput {
            date: parse_date(date_raw).with_context(|| format!("Line {}: invalid date", line))?,
            karat,
            weight: parse_decimal(weight_raw)
                .with_context(|| format!("Line {}: invalid weight", line))?,
            quoted_price: parse_decimal(price_raw)
                .with_context(|| format!("Line {}: invalid price_per_gram", line))?,
            quoted_karat: karat,
            manufacturing: optional_amount(rec.get(5), "manufacturing", line)?,
            other_expenses: optional_amount(rec.get(6), "other_expenses", line)?,
            note: None,
        };
        let validated = input
            .validate()
            .with_context(|| format!("Line {}: rejected", line))?;
        store::insert_purchase(&tx, &owner, &validated)?;
        count += 1;
    }
    tx.commit()?;
    info!(count, owner = %owner, path, "purchases imported");
    Ok(count)
}
