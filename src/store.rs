// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Owner-scoped persistence for purchases, plus the recorded price and
//! exchange-rate history.

use crate::karat::Karat;
use crate::models::{ExchangeRate, PriceQuote, Purchase, PurchasePatch, ValidatedPurchase};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use tracing::info;

const PURCHASE_COLUMNS: &str = "id, owner_id, date, karat, weight, quoted_price, quoted_karat, \
     price_per_gram, manufacturing, other_expenses, total_cost, note";

#[derive(Debug, Clone, Default)]
pub struct PurchaseFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

struct PurchaseRow {
    id: i64,
    owner_id: String,
    date: String,
    karat: u32,
    weight: String,
    quoted_price: String,
    quoted_karat: u32,
    price_per_gram: String,
    manufacturing: String,
    other_expenses: String,
    total_cost: String,
    note: Option<String>,
}

impl PurchaseRow {
    fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            owner_id: r.get(1)?,
            date: r.get(2)?,
            karat: r.get(3)?,
            weight: r.get(4)?,
            quoted_price: r.get(5)?,
            quoted_karat: r.get(6)?,
            price_per_gram: r.get(7)?,
            manufacturing: r.get(8)?,
            other_expenses: r.get(9)?,
            total_cost: r.get(10)?,
            note: r.get(11)?,
        })
    }

    fn into_purchase(self) -> Result<Purchase> {
        let id = self.id;
        let dec = |field: &str, raw: &str| -> Result<Decimal> {
            Decimal::from_str_exact(raw)
                .with_context(|| format!("Invalid stored {} '{}' for purchase {}", field, raw, id))
        };
        Ok(Purchase {
            id,
            date: NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
                .with_context(|| format!("Invalid stored date '{}' for purchase {}", self.date, id))?,
            karat: Karat::try_from(self.karat)
                .with_context(|| format!("Invalid stored karat for purchase {}", id))?,
            weight: dec("weight", &self.weight)?,
            quoted_price: dec("quoted price", &self.quoted_price)?,
            quoted_karat: Karat::try_from(self.quoted_karat)
                .with_context(|| format!("Invalid stored quoted karat for purchase {}", id))?,
            price_per_gram: dec("price per gram", &self.price_per_gram)?,
            manufacturing: dec("manufacturing", &self.manufacturing)?,
            other_expenses: dec("other expenses", &self.other_expenses)?,
            total_cost: dec("total cost", &self.total_cost)?,
            owner_id: self.owner_id,
            note: self.note,
        })
    }
}

pub fn insert_purchase(conn: &Connection, owner: &str, p: &ValidatedPurchase) -> Result<i64> {
    let input = &p.input;
    conn.execute(
        "INSERT INTO purchases(owner_id, date, karat, weight, quoted_price, quoted_karat,
                               price_per_gram, manufacturing, other_expenses, total_cost, note)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
        params![
            owner,
            input.date.to_string(),
            input.karat.value(),
            input.weight.to_string(),
            input.quoted_price.to_string(),
            input.quoted_karat.value(),
            p.cost.adjusted_price_per_gram.to_string(),
            input.manufacturing.to_string(),
            input.other_expenses.to_string(),
            p.cost.total_cost.to_string(),
            input.note.as_deref(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, owner, total_cost = %p.cost.total_cost, "purchase recorded");
    Ok(id)
}

pub fn list_purchases(conn: &Connection, owner: &str, filter: &PurchaseFilter) -> Result<Vec<Purchase>> {
    let mut sql = format!("SELECT {} FROM purchases WHERE owner_id=?", PURCHASE_COLUMNS);
    let mut params_vec: Vec<String> = vec![owner.to_string()];

    if let Some(from) = filter.from {
        sql.push_str(" AND date>=?");
        params_vec.push(from.to_string());
    }
    if let Some(to) = filter.to {
        sql.push_str(" AND date<=?");
        params_vec.push(to.to_string());
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), PurchaseRow::from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.into_purchase()?);
    }
    Ok(out)
}

pub fn get_purchase(conn: &Connection, owner: &str, id: i64) -> Result<Option<Purchase>> {
    let sql = format!(
        "SELECT {} FROM purchases WHERE id=?1 AND owner_id=?2",
        PURCHASE_COLUMNS
    );
    let row = conn
        .query_row(&sql, params![id, owner], PurchaseRow::from_row)
        .optional()?;
    row.map(PurchaseRow::into_purchase).transpose()
}

/// Apply `patch` and rewrite the derived price and total cost.
pub fn update_purchase(
    conn: &Connection,
    owner: &str,
    id: i64,
    patch: &PurchasePatch,
) -> Result<Purchase> {
    let existing = get_purchase(conn, owner, id)?
        .ok_or_else(|| anyhow!("Purchase {} not found", id))?;
    let validated = patch
        .apply(&existing)
        .validate()
        .with_context(|| format!("Cannot update purchase {}", id))?;
    let input = &validated.input;
    conn.execute(
        "UPDATE purchases SET date=?1, karat=?2, weight=?3, quoted_price=?4, quoted_karat=?5,
                price_per_gram=?6, manufacturing=?7, other_expenses=?8, total_cost=?9, note=?10,
                updated_at=datetime('now')
         WHERE id=?11 AND owner_id=?12",
        params![
            input.date.to_string(),
            input.karat.value(),
            input.weight.to_string(),
            input.quoted_price.to_string(),
            input.quoted_karat.value(),
            validated.cost.adjusted_price_per_gram.to_string(),
            input.manufacturing.to_string(),
            input.other_expenses.to_string(),
            validated.cost.total_cost.to_string(),
            input.note.as_deref(),
            id,
            owner,
        ],
    )?;
    info!(id, owner, total_cost = %validated.cost.total_cost, "purchase updated");
    get_purchase(conn, owner, id)?.ok_or_else(|| anyhow!("Purchase {} vanished during update", id))
}

pub fn delete_purchase(conn: &Connection, owner: &str, id: i64) -> Result<bool> {
    let n = conn.execute(
        "DELETE FROM purchases WHERE id=?1 AND owner_id=?2",
        params![id, owner],
    )?;
    Ok(n > 0)
}

pub fn record_gold_price(conn: &Connection, q: &PriceQuote) -> Result<()> {
    conn.execute(
        "INSERT INTO gold_prices(as_of, price, source) VALUES (?1, ?2, ?3)",
        params![q.as_of.to_rfc3339(), q.price_per_ounce_usd.to_string(), q.source],
    )?;
    Ok(())
}

pub fn latest_gold_price(conn: &Connection) -> Result<Option<PriceQuote>> {
    let row: Option<(String, String, String)> = conn
        .query_row(
            "SELECT as_of, price, source FROM gold_prices ORDER BY as_of DESC, id DESC LIMIT 1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    let Some((as_of, price, source)) = row else {
        return Ok(None);
    };
    Ok(Some(PriceQuote {
        price_per_ounce_usd: Decimal::from_str_exact(&price)
            .with_context(|| format!("Invalid stored gold price '{}'", price))?,
        as_of: parse_timestamp(&as_of)?,
        source,
    }))
}

pub fn list_gold_prices(conn: &Connection, limit: usize) -> Result<Vec<PriceQuote>> {
    let mut stmt = conn.prepare(
        "SELECT as_of, price, source FROM gold_prices ORDER BY as_of DESC, id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (as_of, price, source) = row?;
        out.push(PriceQuote {
            price_per_ounce_usd: Decimal::from_str_exact(&price)
                .with_context(|| format!("Invalid stored gold price '{}'", price))?,
            as_of: parse_timestamp(&as_of)?,
            source,
        });
    }
    Ok(out)
}

pub fn record_fx_rate(conn: &Connection, r: &ExchangeRate) -> Result<()> {
    conn.execute(
        "INSERT INTO fx_rates(as_of, base, quote, rate, source) VALUES (?1, 'USD', 'EGP', ?2, ?3)",
        params![r.as_of.to_rfc3339(), r.usd_to_egp.to_string(), r.source],
    )?;
    Ok(())
}

pub fn latest_fx_rate(conn: &Connection) -> Result<Option<ExchangeRate>> {
    Ok(list_fx_rates(conn, 1)?.into_iter().next())
}

pub fn list_fx_rates(conn: &Connection, limit: usize) -> Result<Vec<ExchangeRate>> {
    let mut stmt = conn.prepare(
        "SELECT as_of, rate, source FROM fx_rates WHERE base='USD' AND quote='EGP'
         ORDER BY as_of DESC, id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (as_of, rate, source) = row?;
        out.push(ExchangeRate {
            usd_to_egp: Decimal::from_str_exact(&rate)
                .with_context(|| format!("Invalid stored USD/EGP rate '{}'", rate))?,
            as_of: parse_timestamp(&as_of)?,
            source,
        });
    }
    Ok(out)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid stored timestamp '{}'", s))?
        .with_timezone(&Utc))
}
