// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use goldclip::karat::{Karat, convert_price};
use goldclip::valuation::{compute_portfolio_summary, compute_purchase_cost, karat_spot_prices};
use goldclip::{cli, commands::calc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn sub_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["goldclip"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, sub) = matches.subcommand().unwrap();
    sub.clone()
}

#[test]
fn convert_and_cost_commands_accept_cli_input() {
    calc::convert(&sub_matches(&["convert", "--price", "1000", "--from", "21", "--to", "24"]))
        .unwrap();
    calc::cost(&sub_matches(&[
        "cost",
        "--weight",
        "10",
        "--price",
        "3500",
        "--karat",
        "21",
        "--manufacturing",
        "500",
        "--json",
    ]))
    .unwrap();
}

#[test]
fn cost_command_rejects_unknown_karat() {
    let m = sub_matches(&["cost", "--weight", "1", "--price", "3500", "--karat", "9"]);
    assert!(calc::cost(&m).is_err());
}

#[test]
fn karat_from_flag_is_validated_by_the_parser() {
    let res = cli::build_cli().try_get_matches_from([
        "goldclip", "convert", "--price", "1000", "--from", "22", "--to", "24",
    ]);
    assert!(res.is_err());
}

#[test]
fn conversion_round_trips_through_every_pair() {
    let price = dec!(3217.45);
    for from in Karat::ALL {
        for to in Karat::ALL {
            let back = convert_price(convert_price(price, from, to), to, from);
            assert!((back - price).abs() <= price * dec!(0.000001), "{} -> {}", from, to);
        }
    }
}

#[test]
fn worked_example_from_the_purchase_form() {
    let c = compute_purchase_cost(
        dec!(10),
        dec!(3500),
        Karat::K21,
        Karat::K21,
        dec!(500),
        Decimal::ZERO,
    );
    assert_eq!(c.adjusted_price_per_gram, dec!(3500));
    assert_eq!(c.gold_cost, dec!(35000));
    assert_eq!(c.total_cost, dec!(35500));
}

#[test]
fn empty_portfolio_is_all_zero_for_any_market() {
    for (price, rate) in [(dec!(2000), dec!(50)), (Decimal::ZERO, Decimal::ZERO)] {
        let s = compute_portfolio_summary(&[], price, rate);
        assert_eq!(s, Default::default());
    }
}

#[test]
fn spot_table_at_two_thousand() {
    let t = karat_spot_prices(dec!(2000));
    assert_eq!(t.karat24, dec!(64.30));
    assert_eq!(t.karat21, dec!(56.26));
    assert!((t.karat18 - dec!(48.22)).abs() <= dec!(0.01));
    assert_eq!(t.karat14, dec!(37.49));
}

#[test]
fn cost_command_rejects_negative_fees() {
    let base = ["cost", "--weight", "1", "--price", "3500", "--karat", "21"];
    let mut m = base.to_vec();
    m.push("--manufacturing=-5");
    let err = calc::cost(&sub_matches(&m)).unwrap_err();
    assert!(err.to_string().contains("manufacturing fee cannot be negative"));

    let mut o = base.to_vec();
    o.push("--other=-0.5");
    assert!(calc::cost(&sub_matches(&o)).is_err());
}

#[test]
fn cost_command_refuses_out_of_range_amounts() {
    let m = sub_matches(&[
        "cost",
        "--weight",
        "100000000000000000000",
        "--price",
        "10000000000",
        "--karat",
        "21",
    ]);
    let err = calc::cost(&m).unwrap_err();
    assert!(err.to_string().contains("out of range"));
}
