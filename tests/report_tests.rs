// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use goldclip::config::{DisplayCurrency, set_setting};
use goldclip::karat::Karat;
use goldclip::models::{ExchangeRate, PriceQuote, PurchaseInput};
use goldclip::store::{insert_purchase, record_fx_rate, record_gold_price};
use goldclip::valuation::ValuationBasis;
use goldclip::{cli, commands::report, db};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn add(
    conn: &Connection,
    owner: &str,
    date: &str,
    karat: Karat,
    weight: Decimal,
    price: Decimal,
    mfg: Decimal,
) {
    let p = PurchaseInput {
        date: date.parse().unwrap(),
        karat,
        weight,
        quoted_price: price,
        quoted_karat: karat,
        manufacturing: mfg,
        other_expenses: Decimal::ZERO,
        note: None,
    }
    .validate()
    .unwrap();
    insert_purchase(conn, owner, &p).unwrap();
}

fn seeded() -> Connection {
    let conn = base_conn();
    add(&conn, "local", "2025-01-10", Karat::K21, dec!(10), dec!(3500), dec!(500));
    add(&conn, "local", "2025-04-01", Karat::K18, dec!(4), dec!(3000), dec!(0));
    add(&conn, "other", "2025-02-01", Karat::K24, dec!(100), dec!(4000), dec!(0));
    conn
}

fn leaf(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["goldclip", "report"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, report_m) = matches.subcommand().unwrap();
    let (_, leaf_m) = report_m.subcommand().unwrap();
    leaf_m.clone()
}

#[test]
fn summary_with_explicit_market_inputs() {
    let conn = seeded();
    let m = leaf(&["summary", "--price", "2000", "--rate", "50", "--to", "2025-03-31"]);
    let (market, summary) = report::build_summary(&conn, &m).unwrap();
    assert_eq!(market.price_source, "manual");
    assert_eq!(market.rate_source, "manual");

    let s = summary.rounded();
    assert_eq!(s.purchase_count, 1);
    assert_eq!(s.total_weight_grams, dec!(10));
    assert_eq!(s.total_investment_egp, dec!(35500));
    assert_eq!(s.total_investment_usd, dec!(710));
    assert_eq!(s.total_manufacturing_usd, dec!(10));
    assert_eq!(s.average_price_per_gram_egp, dec!(3500));
    assert_eq!(s.current_value_usd, dec!(643.01));
    assert_eq!(s.profit_loss_usd, dec!(-66.99));
    assert_eq!(s.profit_loss_percent, dec!(-9.43));
}

#[test]
fn summary_uses_recorded_price_and_fallback_rate() {
    let conn = seeded();
    record_gold_price(
        &conn,
        &PriceQuote {
            price_per_ounce_usd: dec!(2000),
            source: "goldprice.org".into(),
            as_of: Utc::now(),
        },
    )
    .unwrap();

    let m = leaf(&["summary"]);
    let (market, summary) = report::build_summary(&conn, &m).unwrap();
    assert_eq!(market.price_source, "goldprice.org");
    assert_eq!(market.rate_source, "fallback");
    assert_eq!(market.usd_to_egp, dec!(30));
    assert_eq!(market.currency, DisplayCurrency::Usd);
    assert_eq!(summary.purchase_count, 2);
    assert_eq!(summary.total_weight_grams, dec!(14));
}

#[test]
fn recorded_rate_beats_fallback_and_flags_beat_settings() {
    let conn = seeded();
    record_fx_rate(
        &conn,
        &ExchangeRate {
            usd_to_egp: dec!(48.5),
            source: "open.er-api.com".into(),
            as_of: Utc::now(),
        },
    )
    .unwrap();
    set_setting(&conn, "display_currency", "EGP").unwrap();

    let market = report::resolve_market(&conn, &leaf(&["summary", "--price", "2300"])).unwrap();
    assert_eq!(market.usd_to_egp, dec!(48.5));
    assert_eq!(market.currency, DisplayCurrency::Egp);

    let market = report::resolve_market(
        &conn,
        &leaf(&["summary", "--price", "2300", "--currency", "usd"]),
    )
    .unwrap();
    assert_eq!(market.currency, DisplayCurrency::Usd);
}

#[test]
fn missing_price_is_reported() {
    let conn = seeded();
    let err = report::build_summary(&conn, &leaf(&["summary"])).unwrap_err();
    assert!(err.to_string().contains("price fetch"));
}

#[test]
fn pure_equivalent_basis_is_opt_in() {
    let conn = seeded();
    set_setting(&conn, "valuation_basis", "pure-equivalent").unwrap();
    let m = leaf(&["summary", "--price", "2000", "--rate", "50", "--to", "2025-03-31"]);
    let (market, summary) = report::build_summary(&conn, &m).unwrap();
    assert_eq!(market.basis, ValuationBasis::PureEquivalent);
    // 10 g of 21k counts as 8.75 g of pure gold
    assert_eq!(summary.rounded().current_value_usd, dec!(562.64));
}

#[test]
fn report_handlers_run_for_every_view() {
    let conn = seeded();
    for view in ["summary", "performance"] {
        let matches = cli::build_cli().get_matches_from([
            "goldclip", "report", view, "--price", "2000", "--rate", "50", "--json",
        ]);
        let (_, report_m) = matches.subcommand().unwrap();
        report::handle(&conn, report_m).unwrap();
    }
    let matches = cli::build_cli().get_matches_from(["goldclip", "report", "by-date"]);
    let (_, report_m) = matches.subcommand().unwrap();
    report::handle(&conn, report_m).unwrap();
}

#[test]
fn scoped_purchases_respect_owner_and_range() {
    let conn = seeded();
    let rows = report::scoped_purchases(&conn, &leaf(&["by-date", "--owner", "other"])).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].weight, dec!(100));

    let rows = report::scoped_purchases(&conn, &leaf(&["by-date", "--from", "2025-02-01"])).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].karat, Karat::K18);
}

#[test]
fn egp_display_uses_recorded_totals() {
    let conn = seeded();
    let m = leaf(&[
        "summary", "--price", "2000", "--rate", "48.6", "--currency", "egp", "--to", "2025-03-31",
    ]);
    let (market, summary) = report::build_summary(&conn, &m).unwrap();
    assert_eq!(market.currency, DisplayCurrency::Egp);

    // 35500 / 48.6 rounds to 730.45 USD, which would read back as 35499.87
    let investment =
        market.display_amount(summary.total_investment_usd, Some(summary.total_investment_egp));
    assert_eq!(investment, dec!(35500));

    let rows = report::summary_rows(&market, &summary);
    assert_eq!(rows[2][1], "EGP 35500.00");
    assert_eq!(rows[3][1], "EGP 500.00");
}
