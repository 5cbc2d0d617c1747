// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::karat::Karat;
use crate::store;
use crate::utils::pretty_table;
use crate::valuation::compute_purchase_cost;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

impl Issue {
    fn new(kind: &'static str, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = diagnose(conn)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn diagnose(conn: &Connection) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();

    // 1) Stored total_cost must match the cost formula
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, karat, weight, quoted_price, quoted_karat, manufacturing,
                other_expenses, total_cost
         FROM purchases ORDER BY id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let owner: String = r.get(1)?;
        let karat: u32 = r.get(2)?;
        let quoted_karat: u32 = r.get(5)?;
        let mut amounts = Vec::with_capacity(5);
        for col in [3usize, 4, 6, 7, 8] {
            let raw: String = r.get(col)?;
            amounts.push(Decimal::from_str_exact(&raw).ok());
        }
        let (Ok(karat), Ok(quoted_karat)) = (Karat::try_from(karat), Karat::try_from(quoted_karat))
        else {
            issues.push(Issue::new("invalid_karat", format!("purchase {} ({})", id, owner)));
            continue;
        };
        let [
            Some(weight),
            Some(quoted_price),
            Some(manufacturing),
            Some(other),
            Some(stored),
        ] = amounts.as_slice()
        else {
            issues.push(Issue::new("invalid_decimal", format!("purchase {} ({})", id, owner)));
            continue;
        };
        let expected = compute_purchase_cost(
            *weight,
            *quoted_price,
            quoted_karat,
            karat,
            *manufacturing,
            *other,
        )
        .total_cost;
        if expected != *stored {
            issues.push(Issue::new(
                "total_cost_drift",
                format!(
                    "purchase {} ({}): stored {}, expected {}",
                    id, owner, stored, expected
                ),
            ));
        }
    }

    // 2) Valuations need a recorded price and rate
    if store::latest_gold_price(conn)?.is_none() {
        issues.push(Issue::new(
            "missing_gold_price",
            "no spot price recorded; run `goldclip price fetch`",
        ));
    }
    if store::latest_fx_rate(conn)?.is_none() {
        issues.push(Issue::new(
            "missing_fx_rate",
            "no USD/EGP rate recorded; run `goldclip fx fetch`",
        ));
    }

    Ok(issues)
}
