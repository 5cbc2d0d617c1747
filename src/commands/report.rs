// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{fx::resolve_rate, json_flags, price::resolve_price};
use crate::config::{DisplayCurrency, Settings, resolve_owner};
use crate::models::Purchase;
use crate::store::{self, PurchaseFilter};
use crate::utils::{
    fmt_2dp, fmt_money, fmt_percent, maybe_print_json, opt_date, opt_decimal, pretty_table,
};
use crate::valuation::{
    PortfolioAnalytics, PortfolioSummary, PurchasePerformance, ValuationBasis,
    compute_portfolio_summary_with, filter_by_date, portfolio_analytics, purchase_performance,
    purchases_by_date, round2,
};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub),
        Some(("performance", sub)) => performance(conn, sub),
        Some(("by-date", sub)) => by_date(conn, sub),
        _ => Ok(()),
    }
}

/// Prices and settings a valuation report runs against.
#[derive(Debug, Clone, Serialize)]
pub struct Market {
    pub ounce_price_usd: Decimal,
    pub price_source: String,
    pub usd_to_egp: Decimal,
    pub rate_source: String,
    pub currency: DisplayCurrency,
    pub basis: ValuationBasis,
}

impl Market {
    /// An amount in the display currency, unrounded. In EGP mode a known EGP
    /// figure is used as-is instead of converting the USD one back.
    pub fn display_amount(&self, usd: Decimal, egp: Option<Decimal>) -> Decimal {
        match (self.currency, egp) {
            (DisplayCurrency::Egp, Some(egp)) => egp,
            (currency, _) => currency.from_usd(usd, self.usd_to_egp),
        }
    }

    pub fn show(&self, usd: Decimal, egp: Option<Decimal>) -> String {
        fmt_money(self.display_amount(usd, egp), &self.currency.to_string())
    }
}

pub fn resolve_market(conn: &Connection, sub: &clap::ArgMatches) -> Result<Market> {
    let settings = Settings::load(conn)?;
    let live = sub.get_flag("live");
    let quote = resolve_price(conn, opt_decimal(sub, "price")?, live)?;
    let rate = resolve_rate(conn, opt_decimal(sub, "rate")?, live)?;
    let currency = match sub.get_one::<String>("currency") {
        Some(c) => c.parse::<DisplayCurrency>()?,
        None => settings.display_currency,
    };
    Ok(Market {
        ounce_price_usd: quote.price_per_ounce_usd,
        price_source: quote.source,
        usd_to_egp: rate.usd_to_egp,
        rate_source: rate.source,
        currency,
        basis: settings.valuation_basis,
    })
}

/// The owner's purchases inside the `--from`/`--to` range.
pub fn scoped_purchases(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Purchase>> {
    let owner = resolve_owner(conn, sub)?;
    let all = store::list_purchases(conn, &owner, &PurchaseFilter::default())?;
    Ok(filter_by_date(
        &all,
        opt_date(sub, "from")?,
        opt_date(sub, "to")?,
    ))
}

#[derive(Debug, Serialize)]
struct SummaryReport {
    market: Market,
    summary: PortfolioSummary,
}

pub fn build_summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<(Market, PortfolioSummary)> {
    let purchases = scoped_purchases(conn, sub)?;
    let market = resolve_market(conn, sub)?;
    let summary = compute_portfolio_summary_with(
        market.basis,
        &purchases,
        market.ounce_price_usd,
        market.usd_to_egp,
    );
    Ok((market, summary))
}

/// Metric rows of the summary table. Amounts are formatted from unrounded
/// values so EGP totals match what was recorded.
pub fn summary_rows(m: &Market, s: &PortfolioSummary) -> Vec<Vec<String>> {
    vec![
        vec!["Purchases".into(), s.purchase_count.to_string()],
        vec!["Total weight (g)".into(), fmt_2dp(s.total_weight_grams)],
        vec![
            "Total investment".into(),
            m.show(s.total_investment_usd, Some(s.total_investment_egp)),
        ],
        vec![
            "  of which manufacturing".into(),
            m.show(s.total_manufacturing_usd, Some(s.total_manufacturing_egp)),
        ],
        vec![
            "Average price/g (excl. manufacturing)".into(),
            fmt_money(s.average_price_per_gram_egp, "EGP"),
        ],
        vec!["Current value".into(), m.show(s.current_value_usd, None)],
        vec!["Profit/Loss".into(), m.show(s.profit_loss_usd, None)],
        vec!["Profit/Loss %".into(), fmt_percent(s.profit_loss_percent)],
    ]
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (market, summary) = build_summary(conn, sub)?;
    let report = SummaryReport {
        summary: summary.rounded(),
        market,
    };
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &report)? {
        return Ok(());
    }

    let m = &report.market;
    let rows = summary_rows(m, &summary);
    println!(
        "Gold {} per oz ({}), USD/EGP {} ({}), basis {}",
        fmt_money(m.ounce_price_usd, "USD"),
        m.price_source,
        fmt_2dp(m.usd_to_egp),
        m.rate_source,
        m.basis
    );
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

#[derive(Debug, Serialize)]
struct PerformanceReport {
    market: Market,
    analytics: PortfolioAnalytics,
    purchases: Vec<PurchasePerformance>,
}

fn round_performance(p: &PurchasePerformance) -> PurchasePerformance {
    PurchasePerformance {
        cost_usd: round2(p.cost_usd),
        value_usd: round2(p.value_usd),
        profit_usd: round2(p.profit_usd),
        profit_percent: round2(p.profit_percent),
        purchase_price_usd: round2(p.purchase_price_usd),
        ..p.clone()
    }
}

fn performance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let purchases = scoped_purchases(conn, sub)?;
    let market = resolve_market(conn, sub)?;
    let rows = purchase_performance(
        market.basis,
        &purchases,
        market.ounce_price_usd,
        market.usd_to_egp,
    );
    let analytics = portfolio_analytics(
        market.basis,
        &purchases,
        market.ounce_price_usd,
        market.usd_to_egp,
    );
    let cost_egp: HashMap<i64, Decimal> =
        purchases.iter().map(|p| (p.id, p.total_cost)).collect();
    let report = PerformanceReport {
        analytics: PortfolioAnalytics {
            average_purchase_price_usd: round2(analytics.average_purchase_price_usd),
            current_price_per_gram_usd: round2(analytics.current_price_per_gram_usd),
            price_appreciation_percent: round2(analytics.price_appreciation_percent),
            best: analytics.best.as_ref().map(round_performance),
            worst: analytics.worst.as_ref().map(round_performance),
        },
        purchases: rows.iter().map(round_performance).collect(),
        market,
    };
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &report)? {
        return Ok(());
    }

    let m = &report.market;
    let data = rows
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.date.to_string(),
                format!("{}k", p.karat),
                p.weight.to_string(),
                m.show(p.cost_usd, cost_egp.get(&p.id).copied()),
                m.show(p.value_usd, None),
                m.show(p.profit_usd, None),
                fmt_percent(p.profit_percent),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Karat", "Weight (g)", "Cost", "Value", "P/L", "P/L %"],
            data
        )
    );

    let a = &report.analytics;
    let mut lines = vec![
        vec![
            "Average purchase price/g".into(),
            m.show(analytics.average_purchase_price_usd, None),
        ],
        vec![
            "Current price/g (24k)".into(),
            m.show(analytics.current_price_per_gram_usd, None),
        ],
        vec!["Price appreciation".into(), fmt_percent(a.price_appreciation_percent)],
    ];
    if let Some(b) = &a.best {
        lines.push(vec![
            "Best performer".into(),
            format!("#{} {} ({})", b.id, b.date, fmt_percent(b.profit_percent)),
        ]);
    }
    if let Some(w) = &a.worst {
        lines.push(vec![
            "Worst performer".into(),
            format!("#{} {} ({})", w.id, w.date, fmt_percent(w.profit_percent)),
        ]);
    }
    println!("{}", pretty_table(&["Metric", "Value"], lines));
    Ok(())
}

fn by_date(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let purchases = scoped_purchases(conn, sub)?;
    let days = purchases_by_date(&purchases);
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &days)? {
        return Ok(());
    }
    let rows = days
        .iter()
        .map(|d| {
            vec![
                d.date.to_string(),
                d.count.to_string(),
                d.weight.to_string(),
                fmt_2dp(d.cost),
                fmt_2dp(d.manufacturing),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Date", "Purchases", "Weight (g)", "Cost (EGP)", "Manufacturing (EGP)"],
            rows
        )
    );
    Ok(())
}
