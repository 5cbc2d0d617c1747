// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::karat::Karat;
use crate::valuation::round2;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

const UA: &str = concat!(
    "goldclip/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/goldclip)"
);

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_karat(s: &str) -> Result<Karat> {
    Ok(s.parse::<Karat>()?)
}

pub fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow!("Missing required argument --{}", name))
}

pub fn opt_decimal(m: &clap::ArgMatches, name: &str) -> Result<Option<Decimal>> {
    m.get_one::<String>(name).map(|s| parse_decimal(s)).transpose()
}

pub fn opt_date(m: &clap::ArgMatches, name: &str) -> Result<Option<NaiveDate>> {
    m.get_one::<String>(name).map(|s| parse_date(s)).transpose()
}

pub fn opt_karat(m: &clap::ArgMatches, name: &str) -> Result<Option<Karat>> {
    m.get_one::<String>(name).map(|s| parse_karat(s)).transpose()
}

/// Two decimal places, rounded half away from zero.
pub fn fmt_2dp(d: Decimal) -> String {
    format!("{:.2}", round2(d))
}

pub fn fmt_money(d: Decimal, ccy: &str) -> String {
    format!("{} {}", ccy, fmt_2dp(d))
}

pub fn fmt_percent(d: Decimal) -> String {
    let sign = if d > Decimal::ZERO { "+" } else { "" };
    format!("{}{:.2}%", sign, round2(d))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line.
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_and_percent_formatting() {
        assert_eq!(fmt_money(dec!(1234.5), "EGP"), "EGP 1234.50");
        assert_eq!(fmt_2dp(dec!(1142.857142)), "1142.86");
        assert_eq!(fmt_percent(dec!(12.345)), "+12.35%");
        assert_eq!(fmt_percent(dec!(-3)), "-3.00%");
        assert_eq!(fmt_percent(Decimal::ZERO), "0.00%");
    }

    #[test]
    fn parsers_trim_and_report_input() {
        assert_eq!(parse_date(" 2025-02-03 ").unwrap().to_string(), "2025-02-03");
        assert!(parse_date("03/02/2025").unwrap_err().to_string().contains("03/02/2025"));
        assert_eq!(parse_decimal(" 10.50 ").unwrap(), dec!(10.50));
        assert!(parse_karat("22").is_err());
    }
}
