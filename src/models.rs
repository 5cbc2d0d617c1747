// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::GoldError;
use crate::karat::Karat;
use crate::valuation::{PurchaseCost, checked_purchase_cost};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub owner_id: String,
    pub date: NaiveDate,
    pub karat: Karat,
    pub weight: Decimal,
    pub quoted_price: Decimal,
    pub quoted_karat: Karat,
    pub price_per_gram: Decimal, // already converted to `karat`
    pub manufacturing: Decimal,
    pub other_expenses: Decimal,
    pub total_cost: Decimal,
    pub note: Option<String>,
}

/// Purchase fields as entered, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseInput {
    pub date: NaiveDate,
    pub karat: Karat,
    pub weight: Decimal,
    pub quoted_price: Decimal,
    pub quoted_karat: Karat,
    pub manufacturing: Decimal,
    pub other_expenses: Decimal,
    pub note: Option<String>,
}

/// A purchase that passed validation, with its cost already derived.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPurchase {
    pub input: PurchaseInput,
    pub cost: PurchaseCost,
}

impl PurchaseInput {
    pub fn validate(self) -> Result<ValidatedPurchase, GoldError> {
        if self.weight <= Decimal::ZERO {
            return Err(GoldError::InvalidInput(format!(
                "weight must be greater than zero, got {}",
                self.weight
            )));
        }
        if self.quoted_price <= Decimal::ZERO {
            return Err(GoldError::InvalidInput(format!(
                "price per gram must be greater than zero, got {}",
                self.quoted_price
            )));
        }
        check_fees(self.manufacturing, self.other_expenses)?;
        let cost = checked_purchase_cost(
            self.weight,
            self.quoted_price,
            self.quoted_karat,
            self.karat,
            self.manufacturing,
            self.other_expenses,
        )
        .ok_or_else(|| {
            GoldError::InvalidInput(format!(
                "purchase cost is out of range for weight {} at price {}",
                self.weight, self.quoted_price
            ))
        })?;
        Ok(ValidatedPurchase { input: self, cost })
    }
}

/// Manufacturing and other expenses may be zero but never negative.
pub fn check_fees(manufacturing: Decimal, other_expenses: Decimal) -> Result<(), GoldError> {
    if manufacturing < Decimal::ZERO {
        return Err(GoldError::InvalidInput(format!(
            "manufacturing fee cannot be negative, got {}",
            manufacturing
        )));
    }
    if other_expenses < Decimal::ZERO {
        return Err(GoldError::InvalidInput(format!(
            "other expenses cannot be negative, got {}",
            other_expenses
        )));
    }
    Ok(())
}

/// Fields to change on an existing purchase. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchasePatch {
    pub date: Option<NaiveDate>,
    pub karat: Option<Karat>,
    pub weight: Option<Decimal>,
    pub quoted_price: Option<Decimal>,
    pub quoted_karat: Option<Karat>,
    pub manufacturing: Option<Decimal>,
    pub other_expenses: Option<Decimal>,
    pub note: Option<String>,
}

impl PurchasePatch {
    pub fn is_empty(&self) -> bool {
        *self == PurchasePatch::default()
    }

    /// Merge over a stored purchase. The quoted price and karat are kept so
    /// a karat change re-converts from what the user originally entered.
    pub fn apply(&self, existing: &Purchase) -> PurchaseInput {
        PurchaseInput {
            date: self.date.unwrap_or(existing.date),
            karat: self.karat.unwrap_or(existing.karat),
            weight: self.weight.unwrap_or(existing.weight),
            quoted_price: self.quoted_price.unwrap_or(existing.quoted_price),
            quoted_karat: self.quoted_karat.unwrap_or(existing.quoted_karat),
            manufacturing: self.manufacturing.unwrap_or(existing.manufacturing),
            other_expenses: self.other_expenses.unwrap_or(existing.other_expenses),
            note: self.note.clone().or_else(|| existing.note.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price_per_ounce_usd: Decimal,
    pub source: String,
    pub as_of: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub usd_to_egp: Decimal,
    pub source: String,
    pub as_of: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub date_time: DateTime<Utc>,
    pub price_usd: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input() -> PurchaseInput {
        PurchaseInput {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            karat: Karat::K18,
            weight: dec!(5),
            quoted_price: dec!(3500),
            quoted_karat: Karat::K21,
            manufacturing: dec!(250),
            other_expenses: dec!(0),
            note: None,
        }
    }

    #[test]
    fn validate_derives_cost_from_converted_price() {
        let v = input().validate().unwrap();
        assert_eq!(v.cost.adjusted_price_per_gram, dec!(3000));
        assert_eq!(v.cost.gold_cost, dec!(15000));
        assert_eq!(v.cost.total_cost, dec!(15250));
    }

    #[test]
    fn validate_rejects_non_positive_weight_and_price() {
        let mut bad = input();
        bad.weight = Decimal::ZERO;
        assert!(matches!(bad.validate(), Err(GoldError::InvalidInput(_))));

        let mut bad = input();
        bad.quoted_price = dec!(-1);
        assert!(matches!(bad.validate(), Err(GoldError::InvalidInput(_))));
    }

    #[test]
    fn validate_rejects_negative_fees() {
        let mut bad = input();
        bad.manufacturing = dec!(-0.01);
        let err = bad.validate().unwrap_err();
        assert!(err.to_string().contains("manufacturing fee"));

        let mut bad = input();
        bad.other_expenses = dec!(-3);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn validate_refuses_cost_beyond_decimal_range() {
        let mut huge = input();
        huge.weight = dec!(100000000000000000000);
        huge.quoted_price = dec!(10000000000);
        let err = huge.validate().unwrap_err();
        assert!(matches!(err, GoldError::InvalidInput(_)));
        assert!(err.to_string().contains("out of range"));

        let mut huge = input();
        huge.quoted_price = Decimal::MAX;
        huge.quoted_karat = Karat::K14;
        huge.karat = Karat::K24;
        assert!(matches!(huge.validate(), Err(GoldError::InvalidInput(_))));

        let mut huge = input();
        huge.manufacturing = Decimal::MAX;
        assert!(huge.validate().is_err());
    }

    #[test]
    fn patch_keeps_untouched_fields() {
        let existing = Purchase {
            id: 7,
            owner_id: "amira".into(),
            date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            karat: Karat::K21,
            weight: dec!(10),
            quoted_price: dec!(3500),
            quoted_karat: Karat::K21,
            price_per_gram: dec!(3500),
            manufacturing: dec!(500),
            other_expenses: dec!(0),
            total_cost: dec!(35500),
            note: Some("ring".into()),
        };
        let patch = PurchasePatch {
            karat: Some(Karat::K18),
            ..PurchasePatch::default()
        };
        let merged = patch.apply(&existing);
        assert_eq!(merged.karat, Karat::K18);
        assert_eq!(merged.quoted_karat, Karat::K21);
        assert_eq!(merged.weight, dec!(10));
        assert_eq!(merged.note.as_deref(), Some("ring"));
        assert!(PurchasePatch::default().is_empty());
        assert!(!patch.is_empty());
    }
}
