// 🧾 Receipt Model - wire shape + write-once derived values
//
// A receipt arrives as text fields exactly as the client sent them. Numeric and
// temporal views of those fields are parsed on first use and memoized in
// private OnceLock cells; they never appear on the wire.
//
// Identity: `id` is assigned once (ensure_id) and never changes afterwards.

use crate::error::ParseError;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ============================================================================
// RECEIPT ITEM
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    short_description: String,
    price: String,

    #[serde(skip)]
    parsed_price: OnceLock<f64>,
}

impl ReceiptItem {
    pub fn new(short_description: impl Into<String>, price: impl Into<String>) -> Self {
        ReceiptItem {
            short_description: short_description.into(),
            price: price.into(),
            parsed_price: OnceLock::new(),
        }
    }

    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    /// Price as a float, parsed once
    pub fn price_value(&self) -> Result<f64, ParseError> {
        memoize(&self.parsed_price, || parse_amount(&self.price))
    }
}

// ============================================================================
// RECEIPT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    retailer: String,
    purchase_date: String,
    purchase_time: String,
    total: String,
    items: Vec<ReceiptItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    #[serde(skip)]
    parsed_total: OnceLock<f64>,

    #[serde(skip)]
    parsed_datetime: OnceLock<DateTime<FixedOffset>>,
}

impl Receipt {
    /// Create a receipt without an id; one is assigned on first `ensure_id`
    pub fn new(
        retailer: impl Into<String>,
        purchase_date: impl Into<String>,
        purchase_time: impl Into<String>,
        total: impl Into<String>,
        items: Vec<ReceiptItem>,
    ) -> Self {
        Receipt {
            retailer: retailer.into(),
            purchase_date: purchase_date.into(),
            purchase_time: purchase_time.into(),
            total: total.into(),
            items,
            id: None,
            parsed_total: OnceLock::new(),
            parsed_datetime: OnceLock::new(),
        }
    }

    /// Same receipt with a fixed id (sample data, fixtures)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Drop any client-supplied id so the server assigns its own
    pub(crate) fn without_id(mut self) -> Self {
        self.id = None;
        self
    }

    pub fn retailer(&self) -> &str {
        &self.retailer
    }

    pub fn purchase_date(&self) -> &str {
        &self.purchase_date
    }

    pub fn purchase_time(&self) -> &str {
        &self.purchase_time
    }

    pub fn total(&self) -> &str {
        &self.total
    }

    pub fn items(&self) -> &[ReceiptItem] {
        &self.items
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Return the receipt id, generating a random v4 UUID the first time.
    /// Every later call returns the same value.
    pub fn ensure_id(&mut self) -> String {
        self.id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone()
    }

    /// Total as a float, parsed once
    pub fn total_value(&self) -> Result<f64, ParseError> {
        memoize(&self.parsed_total, || parse_amount(&self.total))
    }

    /// Purchase date + time read as `<date>T<time>:00Z` (RFC 3339, UTC, zero seconds).
    ///
    /// Times are assumed to carry no seconds or zone; anything the pattern check
    /// let through that is not a real instant (month 19, Feb 30, hour 25) fails here.
    pub fn purchase_datetime(&self) -> Result<DateTime<FixedOffset>, ParseError> {
        memoize(&self.parsed_datetime, || {
            let input = format!("{}T{}:00Z", self.purchase_date, self.purchase_time);
            DateTime::parse_from_rfc3339(&input).map_err(|e| ParseError::DateTime {
                input: input.clone(),
                reason: e.to_string(),
            })
        })
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Read a cell, or compute and store it. Two racing first readers both
/// compute the same value and the cell keeps whichever lands first.
fn memoize<T, F>(cell: &OnceLock<T>, compute: F) -> Result<T, ParseError>
where
    T: Copy,
    F: FnOnce() -> Result<T, ParseError>,
{
    if let Some(value) = cell.get() {
        return Ok(*value);
    }

    let value = compute()?;
    Ok(*cell.get_or_init(|| value))
}

fn parse_amount(raw: &str) -> Result<f64, ParseError> {
    raw.trim().parse::<f64>().map_err(|e| ParseError::Amount {
        input: raw.to_string(),
        reason: e.to_string(),
    })
}

// ============================================================================
// TESTS
// ============================================================================
