// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Spot gold (USD per troy ounce) from several public sources, tried in order.

use super::get_text;
use crate::error::GoldError;
use crate::models::{HistoryPoint, PriceQuote};
use crate::valuation::round2;
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, warn};

const GOLDPRICE_ORG_URL: &str = "https://data-asg.goldprice.org/dbXRates/USD";
const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const METALS_LIVE_URL: &str = "https://api.metals.live/v1/spot/gold";

pub const YAHOO_FUTURES: &str = "GC=F";
pub const YAHOO_SPOT: &str = "XAUUSD=X";

const FALLBACK_HISTORY_MAX_POINTS: usize = 50;

pub trait GoldPriceSource {
    fn name(&self) -> &str;
    fn fetch_spot(&self) -> Result<PriceQuote, GoldError>;
}

pub trait GoldHistorySource {
    fn name(&self) -> &str;
    fn fetch_history(&self, tf: Timeframe) -> Result<Vec<HistoryPoint>, GoldError>;
}

/// Chart window for a price history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    Day,
    Week,
    #[default]
    Month,
    ThreeMonths,
    Year,
}

impl Timeframe {
    pub const NAMES: [&'static str; 5] = ["day", "week", "month", "3mo", "year"];

    /// Unknown names fall back to a month.
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Timeframe::Day,
            "week" => Timeframe::Week,
            "3mo" => Timeframe::ThreeMonths,
            "year" => Timeframe::Year,
            _ => Timeframe::Month,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Timeframe::Day => "day",
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::ThreeMonths => "3mo",
            Timeframe::Year => "year",
        }
    }

    /// Yahoo chart `(range, interval)` parameters.
    pub fn yahoo_params(self) -> (&'static str, &'static str) {
        match self {
            Timeframe::Day => ("1d", "1m"),
            Timeframe::Week => ("5d", "1h"),
            Timeframe::Month => ("1mo", "1d"),
            Timeframe::ThreeMonths => ("3mo", "1d"),
            Timeframe::Year => ("1y", "1wk"),
        }
    }

    pub fn days(self) -> i64 {
        match self {
            Timeframe::Day => 1,
            Timeframe::Week => 7,
            Timeframe::Month => 30,
            Timeframe::ThreeMonths => 90,
            Timeframe::Year => 365,
        }
    }
}

fn to_price(source_name: &str, px: f64) -> Result<Decimal, GoldError> {
    if !px.is_finite() || px <= 0.0 {
        return Err(GoldError::feed(source_name, format!("invalid price {}", px)));
    }
    Decimal::from_f64_retain(px)
        .map(round2)
        .ok_or_else(|| GoldError::feed(source_name, format!("unrepresentable price {}", px)))
}

#[derive(Debug, Deserialize)]
struct GoldPriceOrgResponse {
    #[serde(default)]
    items: Vec<GoldPriceOrgItem>,
}

#[derive(Debug, Deserialize)]
struct GoldPriceOrgItem {
    #[serde(rename = "xauPrice")]
    xau_price: Option<f64>,
}

pub fn parse_goldprice_org(body: &str) -> Result<Decimal, GoldError> {
    let name = "goldprice.org";
    let resp: GoldPriceOrgResponse =
        serde_json::from_str(body).map_err(|e| GoldError::feed(name, e))?;
    let px = resp
        .items
        .first()
        .and_then(|i| i.xau_price)
        .ok_or_else(|| GoldError::feed(name, "response has no xauPrice"))?;
    to_price(name, px)
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooChartResult>>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Closing prices from a Yahoo chart payload. Null or invalid closes are skipped.
pub fn parse_yahoo_chart(symbol: &str, body: &str) -> Result<Vec<HistoryPoint>, GoldError> {
    let resp: YahooChartResponse =
        serde_json::from_str(body).map_err(|e| GoldError::feed(symbol, e))?;
    let result = resp
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| GoldError::feed(symbol, "chart has no result"))?;
    let timestamps = result
        .timestamp
        .ok_or_else(|| GoldError::feed(symbol, "chart has no timestamps"))?;
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut out = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.into_iter().zip(closes) {
        let Some(px) = close else { continue };
        let Ok(price_usd) = to_price(symbol, px) else {
            continue;
        };
        let Some(date_time) = DateTime::from_timestamp(ts, 0) else {
            continue;
        };
        out.push(HistoryPoint {
            date: date_time.date_naive(),
            date_time,
            price_usd,
        });
    }
    Ok(out)
}

/// `[[timestamp_ms, price], ...]` pairs from metals.live.
pub fn parse_metals_live(body: &str) -> Result<Vec<HistoryPoint>, GoldError> {
    let name = "metals.live";
    let pairs: Vec<(i64, f64)> = serde_json::from_str(body).map_err(|e| GoldError::feed(name, e))?;
    Ok(pairs
        .into_iter()
        .filter_map(|(ts_ms, px)| {
            let price_usd = to_price(name, px).ok()?;
            let date_time = DateTime::from_timestamp_millis(ts_ms)?;
            Some(HistoryPoint {
                date: date_time.date_naive(),
                date_time,
                price_usd,
            })
        })
        .collect())
}

fn latest_quote(name: &str, points: Vec<HistoryPoint>) -> Result<PriceQuote, GoldError> {
    let last = points
        .into_iter()
        .max_by_key(|p| p.date_time)
        .ok_or_else(|| GoldError::feed(name, "no price points"))?;
    Ok(PriceQuote {
        price_per_ounce_usd: last.price_usd,
        source: name.to_string(),
        as_of: Utc::now(),
    })
}

pub struct GoldPriceOrg {
    client: Client,
}

impl GoldPriceOrg {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl GoldPriceSource for GoldPriceOrg {
    fn name(&self) -> &str {
        "goldprice.org"
    }

    fn fetch_spot(&self) -> Result<PriceQuote, GoldError> {
        let body = get_text(&self.client, self.name(), GOLDPRICE_ORG_URL)?;
        Ok(PriceQuote {
            price_per_ounce_usd: parse_goldprice_org(&body)?,
            source: self.name().to_string(),
            as_of: Utc::now(),
        })
    }
}

pub struct YahooChartSource {
    client: Client,
    symbol: String,
}

impl YahooChartSource {
    pub fn new(client: Client, symbol: &str) -> Self {
        Self {
            client,
            symbol: symbol.to_string(),
        }
    }

    fn chart(&self, tf: Timeframe) -> Result<Vec<HistoryPoint>, GoldError> {
        let (range, interval) = tf.yahoo_params();
        let url = format!(
            "{}/{}?range={}&interval={}",
            YAHOO_CHART_URL, self.symbol, range, interval
        );
        let body = get_text(&self.client, &self.symbol, &url)?;
        parse_yahoo_chart(&self.symbol, &body)
    }
}

impl GoldPriceSource for YahooChartSource {
    fn name(&self) -> &str {
        &self.symbol
    }

    fn fetch_spot(&self) -> Result<PriceQuote, GoldError> {
        latest_quote(&self.symbol, self.chart(Timeframe::Day)?)
    }
}

impl GoldHistorySource for YahooChartSource {
    fn name(&self) -> &str {
        &self.symbol
    }

    fn fetch_history(&self, tf: Timeframe) -> Result<Vec<HistoryPoint>, GoldError> {
        self.chart(tf)
    }
}

pub struct MetalsLive {
    client: Client,
}

impl MetalsLive {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn series(&self) -> Result<Vec<HistoryPoint>, GoldError> {
        let body = get_text(&self.client, "metals.live", METALS_LIVE_URL)?;
        parse_metals_live(&body)
    }
}

impl GoldPriceSource for MetalsLive {
    fn name(&self) -> &str {
        "metals.live"
    }

    fn fetch_spot(&self) -> Result<PriceQuote, GoldError> {
        latest_quote("metals.live", self.series()?)
    }
}

impl GoldHistorySource for MetalsLive {
    fn name(&self) -> &str {
        "metals.live"
    }

    // The endpoint has no range parameter; callers trim to the timeframe.
    fn fetch_history(&self, _tf: Timeframe) -> Result<Vec<HistoryPoint>, GoldError> {
        self.series()
    }
}

pub fn default_spot_sources(client: &Client) -> Vec<Box<dyn GoldPriceSource>> {
    vec![
        Box::new(GoldPriceOrg::new(client.clone())),
        Box::new(YahooChartSource::new(client.clone(), YAHOO_FUTURES)),
        Box::new(YahooChartSource::new(client.clone(), YAHOO_SPOT)),
        Box::new(MetalsLive::new(client.clone())),
    ]
}

/// First successful quote wins; every failure is logged and collected.
pub fn fetch_spot(sources: &[Box<dyn GoldPriceSource>]) -> Result<PriceQuote, GoldError> {
    let mut failures = Vec::new();
    for source in sources {
        debug!(source = source.name(), "fetching gold spot price");
        match source.fetch_spot() {
            Ok(quote) if quote.price_per_ounce_usd > Decimal::ZERO => {
                info!(source = source.name(), price = %quote.price_per_ounce_usd, "gold spot price");
                return Ok(PriceQuote {
                    price_per_ounce_usd: round2(quote.price_per_ounce_usd),
                    ..quote
                });
            }
            Ok(quote) => {
                warn!(source = source.name(), price = %quote.price_per_ounce_usd, "discarding non-positive price");
                failures.push(format!("{}: non-positive price", source.name()));
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "gold price source failed");
                failures.push(e.to_string());
            }
        }
    }
    Err(GoldError::AllSourcesFailed(failures))
}

/// Price history for `tf`, oldest first.
///
/// `primary` sources are tried in order. If all of them fail or return no
/// points, `fallback` is used and trimmed to the timeframe window. A failing
/// fallback yields an empty history rather than an error.
pub fn fetch_history(
    primary: &[&dyn GoldHistorySource],
    fallback: &dyn GoldHistorySource,
    tf: Timeframe,
    today: NaiveDate,
) -> Vec<HistoryPoint> {
    for source in primary {
        match source.fetch_history(tf) {
            Ok(points) if !points.is_empty() => return finalize_history(points, today),
            Ok(_) => warn!(source = source.name(), "history source returned no data"),
            Err(e) => warn!(source = source.name(), error = %e, "history source failed"),
        }
    }
    let points = match fallback.fetch_history(tf) {
        Ok(points) => points,
        Err(e) => {
            warn!(source = fallback.name(), error = %e, "fallback history source failed");
            Vec::new()
        }
    };
    let cutoff = today - Duration::days(tf.days());
    let mut windowed: Vec<HistoryPoint> = points.into_iter().filter(|p| p.date >= cutoff).collect();
    windowed.sort_by_key(|p| p.date_time);
    let skip = windowed.len().saturating_sub(FALLBACK_HISTORY_MAX_POINTS);
    finalize_history(windowed.split_off(skip), today)
}

/// Drop points more than a year in the future and sort ascending.
fn finalize_history(mut points: Vec<HistoryPoint>, today: NaiveDate) -> Vec<HistoryPoint> {
    if let Some(max_date) = today.checked_add_months(Months::new(12)) {
        points.retain(|p| p.date <= max_date);
    }
    points.sort_by(|a, b| a.date.cmp(&b.date).then(a.date_time.cmp(&b.date_time)));
    points
}

pub fn default_history(client: &Client, tf: Timeframe, today: NaiveDate) -> Vec<HistoryPoint> {
    let futures = YahooChartSource::new(client.clone(), YAHOO_FUTURES);
    let spot = YahooChartSource::new(client.clone(), YAHOO_SPOT);
    let metals = MetalsLive::new(client.clone());
    fetch_history(&[&futures, &spot], &metals, tf, today)
}
