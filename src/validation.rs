// 📐 Shape Validation - field formats checked before a receipt is accepted
//
// Every check runs; failures are collected in check order and reported
// together. Checks are syntactic only: "2022-19-39" has the right shape and is
// accepted here, the scoring engine rejects it when it parses the timestamp.

use crate::error::ValidationError;
use crate::receipt::{Receipt, ReceiptItem};

// ============================================================================
// CHECK TABLES
// ============================================================================

/// One receipt-level check: which field, what shape, what to say when it fails
struct FieldCheck {
    field: fn(&Receipt) -> &str,
    accepts: fn(&str) -> bool,
    reason: &'static str,
}

/// One per-item check; the item index is appended to the reason
struct ItemCheck {
    field: fn(&ReceiptItem) -> &str,
    accepts: fn(&str) -> bool,
    reason: &'static str,
}

const RECEIPT_CHECKS: &[FieldCheck] = &[
    FieldCheck {
        field: Receipt::retailer,
        accepts: is_retailer_name,
        reason: "invalid retailer",
    },
    FieldCheck {
        field: Receipt::purchase_date,
        accepts: is_purchase_date,
        reason: "invalid purchaseDate value",
    },
    FieldCheck {
        field: Receipt::purchase_time,
        accepts: is_purchase_time,
        reason: "invalid purchaseTime value",
    },
    FieldCheck {
        field: Receipt::total,
        accepts: is_amount,
        reason: "invalid total value",
    },
];

const ITEM_CHECKS: &[ItemCheck] = &[
    ItemCheck {
        field: ReceiptItem::short_description,
        accepts: is_item_description,
        reason: "invalid shortDescription value",
    },
    ItemCheck {
        field: ReceiptItem::price,
        accepts: is_amount,
        reason: "invalid price value",
    },
];

const NO_ITEMS: &str = "at least one receipt item must be provided";

// ============================================================================
// VALIDATE
// ============================================================================

/// Check every field of a receipt. Either all rules pass or the error lists
/// each broken rule; nothing is partially accepted.
pub fn validate(receipt: &Receipt) -> Result<(), ValidationError> {
    let mut reasons: Vec<String> = RECEIPT_CHECKS
        .iter()
        .filter(|check| !(check.accepts)((check.field)(receipt)))
        .map(|check| check.reason.to_string())
        .collect();

    if receipt.items().is_empty() {
        reasons.push(NO_ITEMS.to_string());
    }

    for (index, item) in receipt.items().iter().enumerate() {
        for check in ITEM_CHECKS {
            if !(check.accepts)((check.field)(item)) {
                reasons.push(format!("{} for receipt item {}", check.reason, index));
            }
        }
    }

    if reasons.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(reasons))
    }
}

// ============================================================================
// SHAPES
// ============================================================================

/// Letters, digits, whitespace, `-` and `&`; at least one character
pub fn is_retailer_name(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| is_description_char(c) || c == '&')
}

/// Like a retailer name but without `&`
pub fn is_item_description(value: &str) -> bool {
    !value.is_empty() && value.chars().all(is_description_char)
}

/// `YYYY-MM-DD` with the month's tens digit in 0-1 and the day's in 0-3
pub fn is_purchase_date(value: &str) -> bool {
    const SHAPE: &[fn(u8) -> bool] = &[
        is_digit, is_digit, is_digit, is_digit, is_dash, is_zero_to_one, is_digit, is_dash,
        is_zero_to_three, is_digit,
    ];
    fits(value, SHAPE)
}

/// `HH:MM` with the hour's tens digit in 0-2 and the minute's in 0-5
pub fn is_purchase_time(value: &str) -> bool {
    const SHAPE: &[fn(u8) -> bool] = &[is_zero_to_two, is_digit, is_colon, is_zero_to_five, is_digit];
    fits(value, SHAPE)
}

/// One or more digits, a dot, exactly two digits
pub fn is_amount(value: &str) -> bool {
    match value.split_once('.') {
        Some((whole, cents)) => {
            !whole.is_empty()
                && whole.bytes().all(is_digit)
                && cents.len() == 2
                && cents.bytes().all(is_digit)
        }
        None => false,
    }
}

/// Canonical 8-4-4-4-12 lowercase hex GUID, optionally wrapped in braces
pub fn is_guid(value: &str) -> bool {
    let value = value.strip_prefix('{').unwrap_or(value);
    let value = value.strip_suffix('}').unwrap_or(value);

    value.len() == 36
        && value.bytes().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => b == b'-',
            _ => matches!(b, b'0'..=b'9' | b'a'..=b'f'),
        })
}

fn is_description_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || c == '-'
}

fn fits(value: &str, shape: &[fn(u8) -> bool]) -> bool {
    value.len() == shape.len() && value.bytes().zip(shape).all(|(b, accepts)| accepts(b))
}

fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

fn is_dash(b: u8) -> bool {
    b == b'-'
}

fn is_colon(b: u8) -> bool {
    b == b':'
}

fn is_zero_to_one(b: u8) -> bool {
    matches!(b, b'0'..=b'1')
}

fn is_zero_to_two(b: u8) -> bool {
    matches!(b, b'0'..=b'2')
}

fn is_zero_to_three(b: u8) -> bool {
    matches!(b, b'0'..=b'3')
}

fn is_zero_to_five(b: u8) -> bool {
    matches!(b, b'0'..=b'5')
}

// ============================================================================
// TESTS
// ============================================================================
