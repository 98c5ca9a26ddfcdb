use crate::models::{Bucket, Listing, PriceSnapshot, Restriction};
use crate::pricing::extract_price;

/// A bucket's cheapest listing together with its extracted price.
#[derive(Debug, Clone, Copy)]
pub struct FloorItem<'a> {
    pub listing: &'a Listing,
    pub price: u64,
}

/// Cheapest listings for one restriction state, split by name marker.
#[derive(Debug, Clone, Copy)]
pub struct BucketPair<'a> {
    pub restriction: Restriction,
    pub with_marker: Option<FloorItem<'a>>,
    pub without_marker: Option<FloorItem<'a>>,
}

impl<'a> BucketPair<'a> {
    pub fn get(&self, with_marker: bool) -> Option<FloorItem<'a>> {
        if with_marker {
            self.with_marker
        } else {
            self.without_marker
        }
    }
}

/// Floors for all four buckets from one poll.
#[derive(Debug, Clone, Copy)]
pub struct FloorReport<'a> {
    pub unrestricted: BucketPair<'a>,
    pub restricted: BucketPair<'a>,
}

impl<'a> FloorReport<'a> {
    pub fn from_listings(listings: &'a [Listing]) -> Self {
        Self {
            unrestricted: analyze(listings, Restriction::Unrestricted),
            restricted: analyze(listings, Restriction::Restricted),
        }
    }

    pub fn pair(&self, restriction: Restriction) -> &BucketPair<'a> {
        match restriction {
            Restriction::Unrestricted => &self.unrestricted,
            Restriction::Restricted => &self.restricted,
        }
    }

    pub fn floor(&self, bucket: Bucket) -> Option<FloorItem<'a>> {
        self.pair(bucket.restriction).get(bucket.with_marker)
    }

    pub fn snapshot(&self) -> PriceSnapshot {
        let mut snapshot = PriceSnapshot::default();
        for bucket in Bucket::ALL {
            snapshot.set(bucket, self.floor(bucket).map_or(0, |item| item.price));
        }
        snapshot
    }
}

/// Pick the cheapest priced listing per marker group for one restriction state.
/// On equal prices the earlier listing wins.
pub fn analyze(listings: &[Listing], restriction: Restriction) -> BucketPair<'_> {
    let mut with_marker: Option<FloorItem<'_>> = None;
    let mut without_marker: Option<FloorItem<'_>> = None;

    let eligible = listings
        .iter()
        .filter(|listing| listing.sale.is_some())
        .map(|listing| FloorItem {
            listing,
            price: extract_price(listing),
        })
        .filter(|item| item.price > 0)
        .filter(|item| restriction.admits(item.listing));

    for item in eligible {
        let slot = if item.listing.has_marker() {
            &mut with_marker
        } else {
            &mut without_marker
        };
        if slot.map_or(true, |current| item.price < current.price) {
            *slot = Some(item);
        }
    }

    BucketPair {
        restriction,
        with_marker,
        without_marker,
    }
}
