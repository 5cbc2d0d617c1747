// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::json_flags;
use crate::config::resolve_owner;
use crate::models::{Purchase, PurchaseInput, PurchasePatch};
use crate::store::{self, PurchaseFilter};
use crate::utils::{
    fmt_2dp, fmt_money, maybe_print_json, opt_date, opt_decimal, opt_karat, parse_date,
    parse_decimal, parse_karat, pretty_table, required,
};
use anyhow::{Result, anyhow, bail};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub),
        Some(("list", sub)) => list(conn, sub),
        Some(("edit", sub)) => edit(conn, sub),
        Some(("rm", sub)) => remove(conn, sub),
        _ => Ok(()),
    }
}

fn input_from_args(sub: &clap::ArgMatches) -> Result<PurchaseInput> {
    let karat = parse_karat(required(sub, "karat")?)?;
    Ok(PurchaseInput {
        date: parse_date(required(sub, "date")?)?,
        karat,
        weight: parse_decimal(required(sub, "weight")?)?,
        quoted_price: parse_decimal(required(sub, "price")?)?,
        quoted_karat: opt_karat(sub, "quoted-karat")?.unwrap_or(karat),
        manufacturing: opt_decimal(sub, "manufacturing")?.unwrap_or(Decimal::ZERO),
        other_expenses: opt_decimal(sub, "other")?.unwrap_or(Decimal::ZERO),
        note: note_arg(sub),
    })
}

fn note_arg(sub: &clap::ArgMatches) -> Option<String> {
    sub.get_one::<String>("note")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let owner = resolve_owner(conn, sub)?;
    let validated = input_from_args(sub)?.validate()?;
    let id = store::insert_purchase(conn, &owner, &validated)?;
    println!(
        "Recorded purchase {}: {} g of {}k at {}/g, total {}",
        id,
        validated.input.weight,
        validated.input.karat,
        fmt_2dp(validated.cost.adjusted_price_per_gram),
        fmt_money(validated.cost.total_cost, "EGP")
    );
    Ok(())
}

/// Purchases for `--owner` honoring the list filters, newest first.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Purchase>> {
    let owner = resolve_owner(conn, sub)?;
    let filter = PurchaseFilter {
        from: opt_date(sub, "from")?,
        to: opt_date(sub, "to")?,
        limit: sub.get_one::<usize>("limit").copied(),
    };
    store::list_purchases(conn, &owner, &filter)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let rows = query_rows(conn, sub)?;
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &rows)? {
        return Ok(());
    }
    let data = rows
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.date.to_string(),
                format!("{}k", p.karat),
                p.weight.to_string(),
                fmt_2dp(p.price_per_gram),
                fmt_2dp(p.manufacturing),
                fmt_2dp(p.other_expenses),
                fmt_2dp(p.total_cost),
                p.note.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "ID",
                "Date",
                "Karat",
                "Weight (g)",
                "Price/g",
                "Manufacturing",
                "Other",
                "Total (EGP)",
                "Note",
            ],
            data
        )
    );
    Ok(())
}

fn patch_from_args(sub: &clap::ArgMatches) -> Result<PurchasePatch> {
    Ok(PurchasePatch {
        date: opt_date(sub, "date")?,
        karat: opt_karat(sub, "karat")?,
        weight: opt_decimal(sub, "weight")?,
        quoted_price: opt_decimal(sub, "price")?,
        quoted_karat: opt_karat(sub, "quoted-karat")?,
        manufacturing: opt_decimal(sub, "manufacturing")?,
        other_expenses: opt_decimal(sub, "other")?,
        note: note_arg(sub),
    })
}

fn purchase_id(sub: &clap::ArgMatches) -> Result<i64> {
    sub.get_one::<i64>("id")
        .copied()
        .ok_or_else(|| anyhow!("Missing required argument --id"))
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let owner = resolve_owner(conn, sub)?;
    let id = purchase_id(sub)?;
    let patch = patch_from_args(sub)?;
    if patch.is_empty() {
        bail!("Nothing to change for purchase {}", id);
    }
    let updated = store::update_purchase(conn, &owner, id, &patch)?;
    println!(
        "Updated purchase {}: total {}",
        updated.id,
        fmt_money(updated.total_cost, "EGP")
    );
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let owner = resolve_owner(conn, sub)?;
    let id = purchase_id(sub)?;
    if !store::delete_purchase(conn, &owner, id)? {
        bail!("Purchase {} not found", id);
    }
    println!("Deleted purchase {}", id);
    Ok(())
}
