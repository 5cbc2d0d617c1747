// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Purchase costing and portfolio valuation.
//!
//! Everything here is a pure function of its arguments. Prices, exchange
//! rates, and the valuation basis are always passed in by the caller.

use crate::error::GoldError;
use crate::karat::{Karat, TROY_OUNCE_GRAMS, checked_convert_price};
use crate::models::{HistoryPoint, Purchase};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurchaseCost {
    pub adjusted_price_per_gram: Decimal,
    pub gold_cost: Decimal,
    pub total_cost: Decimal,
}

/// Cost of a purchase. Amounts too large for a `Decimal` saturate; use
/// [`checked_purchase_cost`] where overflow must be refused.
pub fn compute_purchase_cost(
    weight: Decimal,
    quoted_price: Decimal,
    quoted_karat: Karat,
    karat: Karat,
    manufacturing: Decimal,
    other_expenses: Decimal,
) -> PurchaseCost {
    checked_purchase_cost(weight, quoted_price, quoted_karat, karat, manufacturing, other_expenses)
        .unwrap_or(PurchaseCost {
            adjusted_price_per_gram: Decimal::MAX,
            gold_cost: Decimal::MAX,
            total_cost: Decimal::MAX,
        })
}

/// [`compute_purchase_cost`], or `None` when any amount overflows.
pub fn checked_purchase_cost(
    weight: Decimal,
    quoted_price: Decimal,
    quoted_karat: Karat,
    karat: Karat,
    manufacturing: Decimal,
    other_expenses: Decimal,
) -> Option<PurchaseCost> {
    let adjusted_price_per_gram = checked_convert_price(quoted_price, quoted_karat, karat)?;
    let gold_cost = if weight > Decimal::ZERO {
        weight.checked_mul(adjusted_price_per_gram)?
    } else {
        Decimal::ZERO
    };
    let total_cost = gold_cost
        .checked_add(manufacturing)?
        .checked_add(other_expenses)?;
    Some(PurchaseCost {
        adjusted_price_per_gram,
        gold_cost,
        total_cost,
    })
}

/// How held weight is measured against the pure-gold spot price.
///
/// `RawWeight` values every gram at the 24k price regardless of karat, which
/// is what the dashboard has always shown. `PureEquivalent` scales each
/// purchase by its karat ratio first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValuationBasis {
    #[default]
    RawWeight,
    PureEquivalent,
}

impl ValuationBasis {
    pub fn valued_weight(self, p: &Purchase) -> Decimal {
        match self {
            ValuationBasis::RawWeight => p.weight,
            ValuationBasis::PureEquivalent => p.weight.saturating_mul(p.karat.ratio()),
        }
    }
}

impl FromStr for ValuationBasis {
    type Err = GoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw-weight" | "raw" => Ok(ValuationBasis::RawWeight),
            "pure-equivalent" | "pure" => Ok(ValuationBasis::PureEquivalent),
            _ => Err(GoldError::InvalidSetting {
                key: "valuation_basis".into(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ValuationBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuationBasis::RawWeight => f.write_str("raw-weight"),
            ValuationBasis::PureEquivalent => f.write_str("pure-equivalent"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PortfolioSummary {
    pub purchase_count: usize,
    pub total_weight_grams: Decimal,
    pub total_investment_egp: Decimal,
    pub total_investment_usd: Decimal,
    pub total_manufacturing_egp: Decimal,
    pub total_manufacturing_usd: Decimal,
    pub average_price_per_gram_egp: Decimal,
    pub current_value_usd: Decimal,
    pub profit_loss_usd: Decimal,
    pub profit_loss_percent: Decimal,
}

impl PortfolioSummary {
    pub fn rounded(&self) -> Self {
        Self {
            purchase_count: self.purchase_count,
            total_weight_grams: round2(self.total_weight_grams),
            total_investment_egp: round2(self.total_investment_egp),
            total_investment_usd: round2(self.total_investment_usd),
            total_manufacturing_egp: round2(self.total_manufacturing_egp),
            total_manufacturing_usd: round2(self.total_manufacturing_usd),
            average_price_per_gram_egp: round2(self.average_price_per_gram_egp),
            current_value_usd: round2(self.current_value_usd),
            profit_loss_usd: round2(self.profit_loss_usd),
            profit_loss_percent: round2(self.profit_loss_percent),
        }
    }
}

pub fn compute_portfolio_summary(
    purchases: &[Purchase],
    ounce_price_usd: Decimal,
    usd_to_egp: Decimal,
) -> PortfolioSummary {
    compute_portfolio_summary_with(
        ValuationBasis::RawWeight,
        purchases,
        ounce_price_usd,
        usd_to_egp,
    )
}

pub fn compute_portfolio_summary_with(
    basis: ValuationBasis,
    purchases: &[Purchase],
    ounce_price_usd: Decimal,
    usd_to_egp: Decimal,
) -> PortfolioSummary {
    let total_weight_grams = sat_sum(purchases.iter().map(|p| p.weight));
    let valued_weight = sat_sum(purchases.iter().map(|p| basis.valued_weight(p)));
    let total_investment_egp = sat_sum(purchases.iter().map(|p| p.total_cost));
    let total_manufacturing_egp = sat_sum(purchases.iter().map(|p| p.manufacturing));

    let total_investment_usd = egp_to_usd(total_investment_egp, usd_to_egp);
    let current_value_usd = gram_value_usd(valued_weight, ounce_price_usd);
    let profit_loss_usd = current_value_usd.saturating_sub(total_investment_usd);

    PortfolioSummary {
        purchase_count: purchases.len(),
        total_weight_grams,
        total_investment_egp,
        total_investment_usd,
        total_manufacturing_egp,
        total_manufacturing_usd: egp_to_usd(total_manufacturing_egp, usd_to_egp),
        average_price_per_gram_egp: safe_div(
            total_investment_egp.saturating_sub(total_manufacturing_egp),
            total_weight_grams,
        ),
        current_value_usd,
        profit_loss_usd,
        profit_loss_percent: percent_of(profit_loss_usd, total_investment_usd),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KaratSpotPrices {
    pub karat24: Decimal,
    pub karat21: Decimal,
    pub karat18: Decimal,
    pub karat14: Decimal,
}

impl KaratSpotPrices {
    pub fn get(&self, karat: Karat) -> Decimal {
        match karat {
            Karat::K24 => self.karat24,
            Karat::K21 => self.karat21,
            Karat::K18 => self.karat18,
            Karat::K14 => self.karat14,
        }
    }
}

/// Per-gram USD price of each karat, rounded to cents.
pub fn karat_spot_prices(ounce_price_usd: Decimal) -> KaratSpotPrices {
    let pure_per_gram = per_gram(ounce_price_usd);
    let at = |k: Karat| round2(pure_per_gram.saturating_mul(k.ratio()));
    KaratSpotPrices {
        karat24: at(Karat::K24),
        karat21: at(Karat::K21),
        karat18: at(Karat::K18),
        karat14: at(Karat::K14),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchasePerformance {
    pub id: i64,
    pub date: NaiveDate,
    pub karat: Karat,
    pub weight: Decimal,
    pub cost_usd: Decimal,
    pub value_usd: Decimal,
    pub profit_usd: Decimal,
    pub profit_percent: Decimal,
    pub purchase_price_usd: Decimal,
}

/// Profit and loss of every purchase on its own, oldest first.
pub fn purchase_performance(
    basis: ValuationBasis,
    purchases: &[Purchase],
    ounce_price_usd: Decimal,
    usd_to_egp: Decimal,
) -> Vec<PurchasePerformance> {
    let mut out: Vec<PurchasePerformance> = purchases
        .iter()
        .map(|p| {
            let cost_usd = egp_to_usd(p.total_cost, usd_to_egp);
            let value_usd = gram_value_usd(basis.valued_weight(p), ounce_price_usd);
            let profit_usd = value_usd.saturating_sub(cost_usd);
            PurchasePerformance {
                id: p.id,
                date: p.date,
                karat: p.karat,
                weight: p.weight,
                cost_usd,
                value_usd,
                profit_usd,
                profit_percent: percent_of(profit_usd, cost_usd),
                purchase_price_usd: egp_to_usd(p.price_per_gram, usd_to_egp),
            }
        })
        .collect();
    out.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioAnalytics {
    pub average_purchase_price_usd: Decimal,
    pub current_price_per_gram_usd: Decimal,
    pub price_appreciation_percent: Decimal,
    pub best: Option<PurchasePerformance>,
    pub worst: Option<PurchasePerformance>,
}

pub fn portfolio_analytics(
    basis: ValuationBasis,
    purchases: &[Purchase],
    ounce_price_usd: Decimal,
    usd_to_egp: Decimal,
) -> PortfolioAnalytics {
    let summary = compute_portfolio_summary_with(basis, purchases, ounce_price_usd, usd_to_egp);
    let average_purchase_price_usd = egp_to_usd(summary.average_price_per_gram_egp, usd_to_egp);
    let current_price_per_gram_usd = per_gram(ounce_price_usd);
    let performance = purchase_performance(basis, purchases, ounce_price_usd, usd_to_egp);

    // Ties keep the earliest purchase.
    let mut best: Option<&PurchasePerformance> = None;
    let mut worst: Option<&PurchasePerformance> = None;
    for p in &performance {
        if best.is_none_or(|b| p.profit_percent > b.profit_percent) {
            best = Some(p);
        }
        if worst.is_none_or(|w| p.profit_percent < w.profit_percent) {
            worst = Some(p);
        }
    }

    PortfolioAnalytics {
        average_purchase_price_usd,
        current_price_per_gram_usd,
        price_appreciation_percent: percent_of(
            current_price_per_gram_usd.saturating_sub(average_purchase_price_usd),
            average_purchase_price_usd,
        ),
        best: best.cloned(),
        worst: worst.cloned(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPurchases {
    pub date: NaiveDate,
    pub count: usize,
    pub weight: Decimal,
    pub cost: Decimal,
    pub manufacturing: Decimal,
}

pub fn purchases_by_date(purchases: &[Purchase]) -> Vec<DailyPurchases> {
    let mut by_date: BTreeMap<NaiveDate, DailyPurchases> = BTreeMap::new();
    for p in purchases {
        let day = by_date.entry(p.date).or_insert_with(|| DailyPurchases {
            date: p.date,
            count: 0,
            weight: Decimal::ZERO,
            cost: Decimal::ZERO,
            manufacturing: Decimal::ZERO,
        });
        day.count += 1;
        day.weight = day.weight.saturating_add(p.weight);
        day.cost = day.cost.saturating_add(p.total_cost);
        day.manufacturing = day.manufacturing.saturating_add(p.manufacturing);
    }
    by_date.into_values().collect()
}

/// Purchases dated within the inclusive range. Missing bounds are open.
pub fn filter_by_date(
    purchases: &[Purchase],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<Purchase> {
    purchases
        .iter()
        .filter(|p| from.is_none_or(|f| p.date >= f) && to.is_none_or(|t| p.date <= t))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoldingPoint {
    pub date: NaiveDate,
    pub price_usd: Decimal,
    pub holding_value_usd: Decimal,
}

/// What `weight_grams` of gold was worth at each point of a price history.
pub fn holding_value_series(history: &[HistoryPoint], weight_grams: Decimal) -> Vec<HoldingPoint> {
    history
        .iter()
        .map(|h| HoldingPoint {
            date: h.date,
            price_usd: h.price_usd,
            holding_value_usd: gram_value_usd(weight_grams, h.price_usd),
        })
        .collect()
}

pub fn round2(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn per_gram(ounce_price_usd: Decimal) -> Decimal {
    if ounce_price_usd <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    safe_div(ounce_price_usd, TROY_OUNCE_GRAMS)
}

fn gram_value_usd(grams: Decimal, ounce_price_usd: Decimal) -> Decimal {
    if ounce_price_usd <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match grams.checked_mul(ounce_price_usd) {
        Some(v) => safe_div(v, TROY_OUNCE_GRAMS),
        // divide first when the product alone is out of range
        None => safe_div(grams, TROY_OUNCE_GRAMS).saturating_mul(ounce_price_usd),
    }
}

fn sat_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

fn egp_to_usd(egp: Decimal, usd_to_egp: Decimal) -> Decimal {
    safe_div(egp, usd_to_egp)
}

/// Zero for a non-positive denominator; out-of-range quotients saturate.
fn safe_div(num: Decimal, den: Decimal) -> Decimal {
    if den <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match num.checked_div(den) {
        Some(q) => q,
        None if num.is_sign_negative() => Decimal::MIN,
        None => Decimal::MAX,
    }
}

fn percent_of(part: Decimal, base: Decimal) -> Decimal {
    if base <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    safe_div(part, base).saturating_mul(dec!(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(id: i64, date: &str, karat: Karat, weight: Decimal, total: Decimal) -> Purchase {
        Purchase {
            id,
            owner_id: "local".into(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            karat,
            weight,
            quoted_price: Decimal::ZERO,
            quoted_karat: karat,
            price_per_gram: Decimal::ZERO,
            manufacturing: Decimal::ZERO,
            other_expenses: Decimal::ZERO,
            total_cost: total,
            note: None,
        }
    }

    #[test]
    fn purchase_cost_without_conversion() {
        let c = compute_purchase_cost(
            dec!(10),
            dec!(3500),
            Karat::K21,
            Karat::K21,
            dec!(500),
            dec!(0),
        );
        assert_eq!(c.adjusted_price_per_gram, dec!(3500));
        assert_eq!(c.gold_cost, dec!(35000));
        assert_eq!(c.total_cost, dec!(35500));
    }

    #[test]
    fn purchase_cost_is_deterministic() {
        let args = (dec!(3.3), dec!(4100.25), Karat::K24, Karat::K14, dec!(120), dec!(15.5));
        let a = compute_purchase_cost(args.0, args.1, args.2, args.3, args.4, args.5);
        let b = compute_purchase_cost(args.0, args.1, args.2, args.3, args.4, args.5);
        assert_eq!(a, b);
    }

    #[test]
    fn partial_entry_costs_only_the_fees() {
        let c = compute_purchase_cost(
            Decimal::ZERO,
            dec!(3500),
            Karat::K21,
            Karat::K18,
            dec!(200),
            dec!(10),
        );
        assert_eq!(c.gold_cost, Decimal::ZERO);
        assert_eq!(c.total_cost, dec!(210));

        let c = compute_purchase_cost(dec!(5), Decimal::ZERO, Karat::K21, Karat::K18, dec!(0), dec!(0));
        assert_eq!(c.adjusted_price_per_gram, Decimal::ZERO);
        assert_eq!(c.total_cost, Decimal::ZERO);
    }

    #[test]
    fn oversized_purchase_cost_saturates() {
        let weight = dec!(100000000000000000000);
        let price = dec!(10000000000);
        assert_eq!(
            checked_purchase_cost(weight, price, Karat::K21, Karat::K21, dec!(0), dec!(0)),
            None
        );
        let c = compute_purchase_cost(weight, price, Karat::K21, Karat::K21, dec!(0), dec!(0));
        assert_eq!(c.total_cost, Decimal::MAX);

        assert_eq!(
            checked_purchase_cost(dec!(1), dec!(1), Karat::K24, Karat::K24, Decimal::MAX, dec!(1)),
            None
        );
    }

    #[test]
    fn summary_of_huge_holdings_saturates() {
        let ps = [
            purchase(1, "2025-01-01", Karat::K18, Decimal::MAX, Decimal::MAX),
            purchase(2, "2025-01-02", Karat::K18, Decimal::MAX, Decimal::MAX),
        ];
        for basis in [ValuationBasis::RawWeight, ValuationBasis::PureEquivalent] {
            let s = compute_portfolio_summary_with(basis, &ps, dec!(1000000), dec!(0.5));
            assert_eq!(s.total_weight_grams, Decimal::MAX);
            assert_eq!(s.total_investment_egp, Decimal::MAX);
            assert_eq!(s.total_investment_usd, Decimal::MAX);
            assert_eq!(s.current_value_usd, Decimal::MAX);
            assert_eq!(s.profit_loss_usd, Decimal::ZERO);
        }
        let perf = purchase_performance(ValuationBasis::RawWeight, &ps, dec!(1000000), dec!(0.5));
        assert_eq!(perf.len(), 2);
        let days = purchases_by_date(&ps);
        assert_eq!(days[0].cost, Decimal::MAX);
    }

    #[test]
    fn empty_portfolio_is_all_zero() {
        for rate in [dec!(48.5), Decimal::ZERO, dec!(-1)] {
            let s = compute_portfolio_summary(&[], dec!(2400), rate);
            assert_eq!(s, PortfolioSummary::default());
        }
        let s = compute_portfolio_summary(&[], Decimal::ZERO, Decimal::ZERO);
        assert_eq!(s, PortfolioSummary::default());
    }

    #[test]
    fn summary_values_raw_weight_at_pure_spot() {
        let ps = vec![
            purchase(1, "2025-01-10", Karat::K21, dec!(10), dec!(35500)),
            purchase(2, "2025-02-10", Karat::K18, dec!(5), dec!(15000)),
        ];
        let s = compute_portfolio_summary(&ps, dec!(3110.35), dec!(50));
        assert_eq!(s.purchase_count, 2);
        assert_eq!(s.total_weight_grams, dec!(15));
        assert_eq!(s.total_investment_egp, dec!(50500));
        assert_eq!(s.total_investment_usd, dec!(1010));
        // 15 g * 3110.35 / 31.1035 = 1500
        assert_eq!(s.current_value_usd, dec!(1500));
        assert_eq!(s.profit_loss_usd, dec!(490));
        assert_eq!(round2(s.profit_loss_percent), dec!(48.51));
    }

    #[test]
    fn pure_equivalent_basis_scales_by_karat() {
        let ps = vec![
            purchase(1, "2025-01-10", Karat::K21, dec!(8), dec!(0)),
            purchase(2, "2025-01-11", Karat::K18, dec!(4), dec!(0)),
        ];
        let s = compute_portfolio_summary_with(
            ValuationBasis::PureEquivalent,
            &ps,
            dec!(3110.35),
            dec!(50),
        );
        // (8 * 0.875 + 4 * 0.75) * 100 = 1000
        assert_eq!(s.current_value_usd, dec!(1000));
        assert_eq!(s.total_weight_grams, dec!(12));
        assert_eq!(s.profit_loss_percent, Decimal::ZERO);
    }

    #[test]
    fn missing_rate_zeroes_usd_investment() {
        let ps = vec![purchase(1, "2025-01-10", Karat::K24, dec!(1), dec!(4000))];
        let s = compute_portfolio_summary(&ps, dec!(2000), Decimal::ZERO);
        assert_eq!(s.total_investment_usd, Decimal::ZERO);
        assert_eq!(s.profit_loss_percent, Decimal::ZERO);
        assert!(s.current_value_usd > Decimal::ZERO);
    }

    #[test]
    fn profit_sign_matches_value_versus_cost() {
        let ps = vec![purchase(1, "2025-01-10", Karat::K24, dec!(10), dec!(50000))];
        // cost 1000 USD at rate 50
        let up = compute_portfolio_summary(&ps, dec!(3500), dec!(50));
        assert!(up.current_value_usd > up.total_investment_usd);
        assert!(up.profit_loss_usd > Decimal::ZERO);
        assert!(up.profit_loss_percent > Decimal::ZERO);

        let down = compute_portfolio_summary(&ps, dec!(2500), dec!(50));
        assert!(down.current_value_usd < down.total_investment_usd);
        assert!(down.profit_loss_usd < Decimal::ZERO);
        assert!(down.profit_loss_percent < Decimal::ZERO);
    }

    #[test]
    fn spot_table_at_two_thousand() {
        let t = karat_spot_prices(dec!(2000));
        assert_eq!(t.karat24, dec!(64.30));
        assert_eq!(t.karat21, dec!(56.26));
        assert!((t.karat18 - dec!(48.22)).abs() <= dec!(0.01));
        assert_eq!(t.karat14, dec!(37.49));
        assert_eq!(t.get(Karat::K21), t.karat21);
    }

    #[test]
    fn spot_table_for_missing_price_is_zero() {
        let t = karat_spot_prices(Decimal::ZERO);
        assert_eq!(t.karat24, Decimal::ZERO);
        assert_eq!(t.karat14, Decimal::ZERO);
    }

    #[test]
    fn analytics_pick_best_and_worst() {
        let ps = vec![
            purchase(1, "2025-03-01", Karat::K21, dec!(10), dec!(50000)),
            purchase(2, "2025-01-01", Karat::K21, dec!(10), dec!(40000)),
            purchase(3, "2025-02-01", Karat::K21, dec!(10), dec!(60000)),
        ];
        let perf = purchase_performance(ValuationBasis::RawWeight, &ps, dec!(3110.35), dec!(50));
        assert_eq!(perf.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 3, 1]);
        assert_eq!(perf[0].value_usd, dec!(1000));
        assert_eq!(perf[0].cost_usd, dec!(800));
        assert_eq!(perf[0].profit_percent, dec!(25));

        let a = portfolio_analytics(ValuationBasis::RawWeight, &ps, dec!(3110.35), dec!(50));
        assert_eq!(a.best.as_ref().map(|b| b.id), Some(2));
        assert_eq!(a.worst.as_ref().map(|w| w.id), Some(3));
        assert_eq!(a.current_price_per_gram_usd, dec!(100));
    }

    #[test]
    fn analytics_of_empty_portfolio() {
        let a = portfolio_analytics(ValuationBasis::RawWeight, &[], dec!(2000), dec!(50));
        assert!(a.best.is_none());
        assert!(a.worst.is_none());
        assert_eq!(a.average_purchase_price_usd, Decimal::ZERO);
        assert_eq!(a.price_appreciation_percent, Decimal::ZERO);
    }

    #[test]
    fn groups_purchases_by_day() {
        let mut a = purchase(1, "2025-01-02", Karat::K21, dec!(2), dec!(7000));
        a.manufacturing = dec!(100);
        let b = purchase(2, "2025-01-01", Karat::K18, dec!(1), dec!(3000));
        let c = purchase(3, "2025-01-02", Karat::K24, dec!(3), dec!(12000));
        let days = purchases_by_date(&[a, b, c]);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date.to_string(), "2025-01-01");
        assert_eq!(days[1].count, 2);
        assert_eq!(days[1].weight, dec!(5));
        assert_eq!(days[1].cost, dec!(19000));
        assert_eq!(days[1].manufacturing, dec!(100));
    }

    #[test]
    fn date_filter_is_inclusive() {
        let ps = vec![
            purchase(1, "2025-01-01", Karat::K21, dec!(1), dec!(1)),
            purchase(2, "2025-01-15", Karat::K21, dec!(1), dec!(1)),
            purchase(3, "2025-02-01", Karat::K21, dec!(1), dec!(1)),
        ];
        let from = NaiveDate::from_ymd_opt(2025, 1, 1);
        let to = NaiveDate::from_ymd_opt(2025, 1, 15);
        let kept = filter_by_date(&ps, from, to);
        assert_eq!(kept.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(filter_by_date(&ps, None, None).len(), 3);
        assert_eq!(filter_by_date(&ps, NaiveDate::from_ymd_opt(2025, 1, 2), None).len(), 2);
    }

    #[test]
    fn holding_series_uses_each_price() {
        let h = vec![HistoryPoint {
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            date_time: chrono::Utc::now(),
            price_usd: dec!(3110.35),
        }];
        let s = holding_value_series(&h, dec!(2.5));
        assert_eq!(s[0].holding_value_usd, dec!(250));
    }

    #[test]
    fn basis_parses_and_displays() {
        assert_eq!("pure".parse::<ValuationBasis>().unwrap(), ValuationBasis::PureEquivalent);
        assert_eq!(ValuationBasis::default().to_string(), "raw-weight");
        assert!("karat".parse::<ValuationBasis>().is_err());
    }
}
