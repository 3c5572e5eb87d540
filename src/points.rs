// 🏆 Points Engine - loyalty score for a stored receipt
//
// Seven independent, additive rules. Every rule is evaluated even when an
// earlier one contributed nothing, and no rule looks at another's outcome.
// Points are u64 and every sum is checked; amounts too large to score are
// reported as errors.

use crate::error::ParseError;
use crate::receipt::{Receipt, ReceiptItem};
use chrono::{Datelike, Timelike};

const ROUND_DOLLAR_POINTS: u64 = 50;
const QUARTER_MULTIPLE_POINTS: u64 = 25;
const POINTS_PER_ITEM_PAIR: u64 = 5;
const ODD_DAY_POINTS: u64 = 6;
const AFTERNOON_POINTS: u64 = 10;

/// Purchase hours (inclusive) that earn the afternoon bonus. 16:59 still counts.
const AFTERNOON_HOURS: std::ops::RangeInclusive<u32> = 14..=16;

/// 2^64; a ceil'd f64 below this converts to u64 exactly
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

// ============================================================================
// BREAKDOWN
// ============================================================================

/// Contribution of each rule to a receipt's score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointsBreakdown {
    /// One point per alphanumeric character in the retailer name
    pub retailer_name: u64,
    /// Total has no cents
    pub round_dollar: u64,
    /// Total is a multiple of 0.25
    pub quarter_multiple: u64,
    /// Five points for every two items
    pub item_pairs: u64,
    /// Items whose trimmed description length is a multiple of 3
    pub item_descriptions: u64,
    /// Day of month is odd
    pub odd_day: u64,
    /// Purchased between 14:00 and 16:59
    pub afternoon: u64,
}

impl PointsBreakdown {
    /// Sum of every rule, or None if it does not fit in a u64
    pub fn total(&self) -> Option<u64> {
        [
            self.round_dollar,
            self.quarter_multiple,
            self.item_pairs,
            self.item_descriptions,
            self.odd_day,
            self.afternoon,
        ]
        .into_iter()
        .try_fold(self.retailer_name, u64::checked_add)
    }
}

// ============================================================================
// SCORING
// ============================================================================

/// Score a validated receipt
pub fn score(receipt: &Receipt) -> Result<u64, ParseError> {
    score_breakdown(receipt)?
        .total()
        .ok_or(ParseError::PointsOverflow)
}

/// Score a validated receipt, keeping each rule's contribution
///
/// Fails when the purchase date/time is not a real instant, when the total
/// or an item price is not a number, or when a price is too large to score.
pub fn score_breakdown(receipt: &Receipt) -> Result<PointsBreakdown, ParseError> {
    let purchased_at = receipt.purchase_datetime()?;
    let total = receipt.total_value()?;

    let mut item_descriptions: u64 = 0;
    for item in receipt.items() {
        let price = item.price_value()?;
        // An all-whitespace description trims to length 0, which counts as a multiple of 3.
        if item.short_description().trim().len() % 3 == 0 {
            item_descriptions = item_descriptions
                .checked_add(price_points(item, price)?)
                .ok_or(ParseError::PointsOverflow)?;
        }
    }

    Ok(PointsBreakdown {
        retailer_name: receipt
            .retailer()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .count() as u64,
        round_dollar: award(total.fract() == 0.0, ROUND_DOLLAR_POINTS),
        quarter_multiple: award(total % 0.25 == 0.0, QUARTER_MULTIPLE_POINTS),
        item_pairs: POINTS_PER_ITEM_PAIR * (receipt.items().len() / 2) as u64,
        item_descriptions,
        odd_day: award(purchased_at.day() % 2 == 1, ODD_DAY_POINTS),
        afternoon: award(AFTERNOON_HOURS.contains(&purchased_at.hour()), AFTERNOON_POINTS),
    })
}

/// `ceil(price * 0.2)`, refusing results a u64 cannot hold
fn price_points(item: &ReceiptItem, price: f64) -> Result<u64, ParseError> {
    let points = (price * 0.2).ceil();
    if !points.is_finite() || points < 0.0 || points >= U64_LIMIT {
        return Err(ParseError::Amount {
            input: item.price().to_string(),
            reason: "price is out of range for scoring".to_string(),
        });
    }
    Ok(points as u64)
}

fn award(condition: bool, points: u64) -> u64 {
    if condition {
        points
    } else {
        0
    }
}

// ============================================================================
// TESTS
// ============================================================================
