// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::json_flags;
use crate::config::{Settings, set_setting};
use crate::utils::{fmt_2dp, maybe_print_json, pretty_table, required};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, sub),
        Some(("set", sub)) => {
            let key = required(sub, "key")?;
            let stored = set_setting(conn, key, required(sub, "value")?)?;
            println!("{} = {}", key, stored);
            Ok(())
        }
        _ => Ok(()),
    }
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let s = Settings::load(conn)?;
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &s)? {
        return Ok(());
    }
    let rows = vec![
        vec!["display_currency".into(), s.display_currency.to_string()],
        vec!["owner".into(), s.owner.clone()],
        vec!["fallback_usd_egp".into(), fmt_2dp(s.fallback_usd_egp)],
        vec!["valuation_basis".into(), s.valuation_basis.to_string()],
    ];
    println!("{}", pretty_table(&["Key", "Value"], rows));
    Ok(())
}
