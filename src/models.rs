use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

use crate::pricing::SaleVariant;

/// Substring in an NFT name that splits listings into marker buckets.
pub const NAME_MARKER: &str = "4";

/// A marketplace listing as returned in `alphaNftItemSearch.edges[].node`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub address: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(default)]
    pub sale: Option<SaleVariant>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub warning_banner: bool,
}

impl Listing {
    pub fn has_marker(&self) -> bool {
        self.name.contains(NAME_MARKER)
    }
}

// A null or non-string field decodes as empty rather than failing the page.
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(s),
        _ => Ok(String::new()),
    }
}

// Any non-null `warningBanner` marks the listing as restricted.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(!matches!(value, None | Some(Value::Null)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Restriction {
    Unrestricted,
    Restricted,
}

impl Restriction {
    pub fn admits(&self, listing: &Listing) -> bool {
        match self {
            Restriction::Unrestricted => !listing.warning_banner,
            Restriction::Restricted => listing.warning_banner,
        }
    }
}

/// One of the four floor-price categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bucket {
    pub restriction: Restriction,
    pub with_marker: bool,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::new(Restriction::Unrestricted, true),
        Bucket::new(Restriction::Unrestricted, false),
        Bucket::new(Restriction::Restricted, true),
        Bucket::new(Restriction::Restricted, false),
    ];

    pub const fn new(restriction: Restriction, with_marker: bool) -> Self {
        Self {
            restriction,
            with_marker,
        }
    }

    fn index(&self) -> usize {
        let base = match self.restriction {
            Restriction::Unrestricted => 0,
            Restriction::Restricted => 2,
        };
        base + usize::from(!self.with_marker)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let restriction = match self.restriction {
            Restriction::Unrestricted => "unrestricted",
            Restriction::Restricted => "restricted",
        };
        let marker = if self.with_marker { "with" } else { "without" };
        write!(f, "{}_{}_{}", restriction, marker, NAME_MARKER)
    }
}

/// Floor price per bucket in nanoTON. 0 means no eligible listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceSnapshot {
    prices: [u64; 4],
}

impl PriceSnapshot {
    pub fn get(&self, bucket: Bucket) -> u64 {
        self.prices[bucket.index()]
    }

    pub fn set(&mut self, bucket: Bucket, price: u64) {
        self.prices[bucket.index()] = price;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, u64)> + '_ {
        Bucket::ALL.into_iter().map(move |b| (b, self.get(b)))
    }
}

impl fmt::Display for PriceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(bucket, price)| format!("{}={}", bucket, price))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
