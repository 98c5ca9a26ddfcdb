use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::Listing;

/// nanoTON per TON
pub const NANOS_PER_TON: u64 = 1_000_000_000;
const NANOS_PER_CENT: u64 = NANOS_PER_TON / 100;

/// Sale attached to a listing, keyed on the GraphQL `__typename`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleVariant {
    /// `NftSaleFixPrice.fullPrice`
    FixedPrice { full_price: u64 },
    /// `TelemintAuction.telemintMaxBidAmount`
    Auction { max_bid: u64 },
    Unrecognized,
}

impl SaleVariant {
    /// Decode a raw sale object. Never fails: unknown or malformed shapes become
    /// `Unrecognized`, unusable amounts become 0.
    pub fn from_value(value: &Value) -> Self {
        let typename = value.get("__typename").and_then(Value::as_str);

        match typename {
            Some("NftSaleFixPrice") => SaleVariant::FixedPrice {
                full_price: parse_amount(value.get("fullPrice")),
            },
            Some("TelemintAuction") => SaleVariant::Auction {
                max_bid: parse_amount(value.get("telemintMaxBidAmount")),
            },
            _ => SaleVariant::Unrecognized,
        }
    }

    pub fn amount(&self) -> u64 {
        match self {
            SaleVariant::FixedPrice { full_price } => *full_price,
            SaleVariant::Auction { max_bid } => *max_bid,
            SaleVariant::Unrecognized => 0,
        }
    }
}

impl<'de> Deserialize<'de> for SaleVariant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(SaleVariant::from_value(&value))
    }
}

/// Price of a listing in nanoTON; 0 when it has no usable sale.
pub fn extract_price(listing: &Listing) -> u64 {
    listing.sale.as_ref().map(SaleVariant::amount).unwrap_or(0)
}

/// Parse an amount the way the marketplace serializes it: usually a decimal
/// string, occasionally a bare number. Leading digits win (`"12abc"` is 12).
fn parse_amount(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::String(s)) => parse_leading_integer(s),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                v
            } else if let Some(f) = n.as_f64() {
                if f.is_finite() && f >= 1.0 && f < u64::MAX as f64 {
                    f.trunc() as u64
                } else {
                    0
                }
            } else {
                0
            }
        }
        _ => 0,
    }
}

fn parse_leading_integer(raw: &str) -> u64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if negative || end == 0 {
        return 0;
    }

    digits[..end].parse::<u64>().unwrap_or(0)
}

/// Amount rounded half-up to hundredths of a TON.
pub fn to_display_cents(nanos: u64) -> u64 {
    nanos / NANOS_PER_CENT + u64::from(nanos % NANOS_PER_CENT >= NANOS_PER_CENT / 2)
}

/// Render nanoTON as TON with two decimals, e.g. `5_000_000_000` -> `"5.00"`.
pub fn format_ton(nanos: u64) -> String {
    let cents = to_display_cents(nanos);
    format!("{}.{:02}", cents / 100, cents % 100)
}
