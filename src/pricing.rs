//! Price resolution and display formatting
//!
//! Upstream prices arrive as JSON numbers, as strings with thousands
//! separators, or not at all. Anything that cannot be read as a number is an
//! unknown price, never zero.

use crate::config::PriceSource;
use crate::types::{FIELD_RAP, FIELD_VALUE, ItemFields};
use serde_json::Value;

/// Display string used when the price is unknown
pub const UNKNOWN_PRICE_DISPLAY: &str = "-";

/// Read a JSON value as an integer price, truncating toward zero
///
/// Accepts native numbers and decimal strings such as `"1,234"` or
/// `"1234.9"`. Returns `None` for anything else.
///
/// # Examples
///
/// ```
/// use limiteds_catalog::pricing::coerce_price;
/// use serde_json::json;
///
/// assert_eq!(coerce_price(Some(&json!("1,234"))), Some(1234));
/// assert_eq!(coerce_price(Some(&json!(5))), Some(5));
/// assert_eq!(coerce_price(Some(&json!("abc"))), None);
/// assert_eq!(coerce_price(None), None);
/// ```
#[must_use]
pub fn coerce_price(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

fn parse_decimal(raw: &str) -> Option<i64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().and_then(truncate)
}

fn truncate(n: f64) -> Option<i64> {
    // "inf" and "NaN" parse as f64 but are not prices
    if n.is_finite() {
        Some(n.trunc() as i64)
    } else {
        None
    }
}

/// Pick the item price according to `source`, falling back to the other metric
///
/// # Examples
///
/// ```
/// use limiteds_catalog::config::PriceSource;
/// use limiteds_catalog::pricing::price_from_fields;
/// use limiteds_catalog::types::ItemFields;
/// use serde_json::json;
///
/// let fields = ItemFields(vec![json!("X"), json!("Y"), json!("100"), json!("200")]);
/// assert_eq!(price_from_fields(&fields, PriceSource::Rap), Some(100));
/// assert_eq!(price_from_fields(&fields, PriceSource::Value), Some(200));
/// ```
#[must_use]
pub fn price_from_fields(fields: &ItemFields, source: PriceSource) -> Option<i64> {
    let (primary, fallback) = match source {
        PriceSource::Rap => (FIELD_RAP, FIELD_VALUE),
        PriceSource::Value => (FIELD_VALUE, FIELD_RAP),
    };
    coerce_price(fields.get(primary)).or_else(|| coerce_price(fields.get(fallback)))
}

/// Render an integer with `,` between groups of three digits
#[must_use]
pub fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Display string for a resolved price
///
/// # Examples
///
/// ```
/// use limiteds_catalog::pricing::display_price;
///
/// assert_eq!(display_price(Some(1234), "R$"), "1,234 R$");
/// assert_eq!(display_price(None, "R$"), "-");
/// ```
#[must_use]
pub fn display_price(price: Option<i64>, currency: &str) -> String {
    match price {
        Some(p) => format!("{} {}", format_thousands(p), currency),
        None => UNKNOWN_PRICE_DISPLAY.to_string(),
    }
}
