//! Operator edit buffers
//!
//! Price fields are edited as free-form text (so "29." can exist mid-typing) and only
//! turned into a committed price when the operator saves.

use crate::catalog::{MAX_PRICE, PRICE_SCALE};
use crate::settlement::MAX_ROUND_POINTS;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Uncommitted text for one price field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceEdit {
    raw: String,
}

impl PriceEdit {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Start editing from a committed price
    pub fn from_price(price: Decimal) -> Self {
        Self { raw: price.normalize().to_string() }
    }

    pub fn set(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parse the leading number and clamp it into `0..=MAX_PRICE`, rounded to
    /// [`PRICE_SCALE`] places. Text with no leading number commits as 0.
    pub fn commit(&self) -> Decimal {
        let number = leading_number(self.raw.trim(), true).trim_start_matches('+');
        let price = match Decimal::from_str(number) {
            Ok(price) => price,
            // too many digits for a Decimal
            Err(_) if !number.is_empty() && !number.starts_with('-') => MAX_PRICE,
            Err(_) => Decimal::ZERO,
        };
        price.round_dp(PRICE_SCALE).clamp(Decimal::ZERO, MAX_PRICE)
    }
}

/// Parse a points field: the leading integer clamped to `±MAX_ROUND_POINTS`,
/// or 0 if there is none
pub fn parse_points(raw: &str) -> i64 {
    let number = leading_number(raw.trim(), false);
    let points = match number.parse::<i64>() {
        Ok(points) => points,
        Err(_) if number.is_empty() => 0,
        Err(_) if number.starts_with('-') => -MAX_ROUND_POINTS,
        Err(_) => MAX_ROUND_POINTS,
    };
    points.clamp(-MAX_ROUND_POINTS, MAX_ROUND_POINTS)
}

/// Longest prefix that looks like `[+-]digits[.digits]`, without a dangling dot
fn leading_number(text: &str, allow_fraction: bool) -> &str {
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut last_digit = end;
    if allow_fraction && end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            last_digit = end;
        }
    }
    if last_digit == digits_start {
        return "";
    }
    &text[..last_digit]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogItem;

    #[test]
    fn test_commit_plain_numbers() {
        assert_eq!(PriceEdit::new("29.5").commit(), Decimal::new(295, 1));
        assert_eq!(PriceEdit::new(" 30 ").commit(), Decimal::from(30));
        assert_eq!(PriceEdit::new("+8").commit(), Decimal::from(8));
    }

    #[test]
    fn test_commit_partial_input() {
        assert_eq!(PriceEdit::new("29.").commit(), Decimal::from(29));
        assert_eq!(PriceEdit::new("7.5M").commit(), Decimal::new(75, 1));
    }

    #[test]
    fn test_commit_garbage_and_negative() {
        assert_eq!(PriceEdit::new("").commit(), Decimal::ZERO);
        assert_eq!(PriceEdit::new("abc").commit(), Decimal::ZERO);
        assert_eq!(PriceEdit::new("-4").commit(), Decimal::ZERO);
    }

    #[test]
    fn test_commit_clamps_huge_prices() {
        assert_eq!(PriceEdit::new("79228162514264337593543950335").commit(), MAX_PRICE);
        assert_eq!(PriceEdit::new("999999999999999999999999999999999").commit(), MAX_PRICE);
        assert_eq!(PriceEdit::new("1000.01").commit(), MAX_PRICE);
        assert_eq!(PriceEdit::new("999.99").commit(), Decimal::new(99999, 2));
    }

    #[test]
    fn test_commit_rounds_to_cents() {
        assert_eq!(PriceEdit::new("7.504").commit(), Decimal::new(750, 2));
        assert_eq!(PriceEdit::new("0.0000000000000000000000000001").commit(), Decimal::ZERO);
    }

    #[test]
    fn test_committed_price_survives_float_documents() {
        for raw in ["79228162514264337593543950335", "29.5", "7.504", "0.01"] {
            let item = CatalogItem::new(2, "Sergio Pérez", PriceEdit::new(raw).commit());
            let json = serde_json::to_value(&item).unwrap();
            let back: CatalogItem = serde_json::from_value(json).unwrap();
            assert_eq!(back, item);
        }
    }

    #[test]
    fn test_round_trip_from_price() {
        let edit = PriceEdit::from_price(Decimal::new(750, 2));
        assert_eq!(edit.raw(), "7.5");
        assert_eq!(edit.commit(), Decimal::new(75, 1));
    }

    #[test]
    fn test_parse_points() {
        assert_eq!(parse_points("26"), 26);
        assert_eq!(parse_points("-3"), -3);
        assert_eq!(parse_points("12.7"), 12);
        assert_eq!(parse_points("x"), 0);
        assert_eq!(parse_points(""), 0);
    }

    #[test]
    fn test_parse_points_clamps() {
        assert_eq!(parse_points("9223372036854775807"), MAX_ROUND_POINTS);
        assert_eq!(parse_points("99999999999999999999999"), MAX_ROUND_POINTS);
        assert_eq!(parse_points("-99999999999999999999999"), -MAX_ROUND_POINTS);
        assert_eq!(parse_points(&MAX_ROUND_POINTS.to_string()), MAX_ROUND_POINTS);
    }
}
