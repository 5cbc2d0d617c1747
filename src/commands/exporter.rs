// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::resolve_owner;
use crate::store::{self, PurchaseFilter};
use crate::utils::{opt_date, required};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub const PURCHASE_HEADER: [&str; 8] = [
    "id",
    "date",
    "karat",
    "weight",
    "price_per_gram",
    "manufacturing",
    "other_expenses",
    "total_cost",
];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("purchases", sub)) => export_purchases(conn, sub),
        _ => Ok(()),
    }
}

fn export_purchases(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "csv".to_string());
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    let out = required(sub, "out")?;
    let owner = resolve_owner(conn, sub)?;
    let filter = PurchaseFilter {
        from: opt_date(sub, "from")?,
        to: opt_date(sub, "to")?,
        limit: None,
    };
    let mut rows = store::list_purchases(conn, &owner, &filter)?;
    rows.reverse();

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(PURCHASE_HEADER)?;
        for p in &rows {
            wtr.write_record([
                p.id.to_string(),
                p.date.to_string(),
                p.karat.to_string(),
                p.weight.to_string(),
                p.price_per_gram.to_string(),
                p.manufacturing.to_string(),
                p.other_expenses.to_string(),
                p.total_cost.to_string(),
            ])?;
        }
        wtr.flush()?;
    } else {
        let items: Vec<_> = rows
            .iter()
            .map(|p| {
                json!({
                    "id": p.id,
                    "date": p.date,
                    "karat": p.karat,
                    "weight": p.weight,
                    "price_per_gram": p.price_per_gram,
                    "manufacturing": p.manufacturing,
                    "other_expenses": p.other_expenses,
                    "total_cost": p.total_cost,
                    "note": p.note,
                })
            })
            .collect();
        std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    }
    println!("Exported {} purchases to {}", rows.len(), out);
    Ok(())
}
