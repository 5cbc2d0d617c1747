// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Stateless calculators: karat price conversion and the purchase cost
//! preview shown before a purchase is recorded.

use super::json_flags;
use crate::karat::{Karat, convert_price};
use crate::models::check_fees;
use crate::utils::{
    fmt_2dp, fmt_money, maybe_print_json, opt_decimal, opt_karat, parse_decimal, parse_karat,
    pretty_table, required,
};
use crate::valuation::{PurchaseCost, checked_purchase_cost, round2};
use anyhow::{Result, anyhow};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Conversion {
    price: Decimal,
    from: Karat,
    to: Karat,
    converted: Decimal,
}

pub fn convert(m: &clap::ArgMatches) -> Result<()> {
    let price = parse_decimal(required(m, "price")?)?;
    let from = parse_karat(required(m, "from")?)?;
    let to = parse_karat(required(m, "to")?)?;
    let c = Conversion {
        price,
        from,
        to,
        converted: round2(convert_price(price, from, to)),
    };
    let (json, jsonl) = json_flags(m);
    if maybe_print_json(json, jsonl, &c)? {
        return Ok(());
    }
    println!(
        "{}/g at {}k = {}/g at {}k",
        fmt_2dp(c.price),
        c.from,
        fmt_2dp(c.converted),
        c.to
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct CostPreview {
    weight: Decimal,
    karat: Karat,
    quoted_karat: Karat,
    #[serde(flatten)]
    cost: PurchaseCost,
}

pub fn cost(m: &clap::ArgMatches) -> Result<()> {
    let karat = parse_karat(required(m, "karat")?)?;
    let quoted_karat = opt_karat(m, "quoted-karat")?.unwrap_or(karat);
    let weight = parse_decimal(required(m, "weight")?)?;
    let price = parse_decimal(required(m, "price")?)?;
    let manufacturing = opt_decimal(m, "manufacturing")?.unwrap_or(Decimal::ZERO);
    let other = opt_decimal(m, "other")?.unwrap_or(Decimal::ZERO);

    check_fees(manufacturing, other)?;

    let cost = checked_purchase_cost(weight, price, quoted_karat, karat, manufacturing, other)
        .ok_or_else(|| anyhow!("Cost of {} g at {}/g is out of range", weight, price))?;
    let preview = CostPreview {
        weight,
        karat,
        quoted_karat,
        cost,
    };
    let (json, jsonl) = json_flags(m);
    if maybe_print_json(json, jsonl, &preview)? {
        return Ok(());
    }
    let rows = vec![
        vec![
            format!("Price/g at {}k", karat),
            fmt_2dp(preview.cost.adjusted_price_per_gram),
        ],
        vec![
            format!("Gold ({} g)", weight),
            fmt_money(preview.cost.gold_cost, "EGP"),
        ],
        vec!["Manufacturing".into(), fmt_money(manufacturing, "EGP")],
        vec!["Other".into(), fmt_money(other, "EGP")],
        vec!["Total".into(), fmt_money(preview.cost.total_cost, "EGP")],
    ];
    println!("{}", pretty_table(&["Item", "Amount"], rows));
    Ok(())
}
