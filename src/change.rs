use crate::models::{Bucket, PriceSnapshot};
use crate::pricing::to_display_cents;

/// Pin the notification when a floor moves by at least this many TON (in cents).
pub const ESCALATION_THRESHOLD_CENTS: u64 = 50 * 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceChange {
    pub bucket: Bucket,
    pub previous: u64,
    pub current: u64,
}

impl PriceChange {
    /// Movement in display units (hundredths of a TON).
    pub fn display_delta_cents(&self) -> u64 {
        to_display_cents(self.current).abs_diff(to_display_cents(self.previous))
    }

    /// A bucket emptying out (price 0) is not a price drop and never escalates.
    pub fn is_escalation(&self) -> bool {
        self.current > 0
            && self.display_delta_cents() >= ESCALATION_THRESHOLD_CENTS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeReport {
    pub changes: Vec<PriceChange>,
}

impl ChangeReport {
    pub fn should_notify(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn should_escalate(&self) -> bool {
        self.changes.iter().any(PriceChange::is_escalation)
    }
}

/// Last-known floor per bucket; starts at zero for every bucket.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last: PriceSnapshot,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_prices(&self) -> &PriceSnapshot {
        &self.last
    }

    /// Compare `current` with the stored floors and adopt it.
    pub fn observe(&mut self, current: &PriceSnapshot) -> ChangeReport {
        let mut changes = Vec::new();

        for bucket in Bucket::ALL {
            let previous = self.last.get(bucket);
            let price = current.get(bucket);
            if price != previous {
                changes.push(PriceChange {
                    bucket,
                    previous,
                    current: price,
                });
                self.last.set(bucket, price);
            }
        }

        ChangeReport { changes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Restriction;

    fn snapshot(prices: [u64; 4]) -> PriceSnapshot {
        let mut s = PriceSnapshot::default();
        for (bucket, price) in Bucket::ALL.into_iter().zip(prices) {
            s.set(bucket, price);
        }
        s
    }

    #[test]
    fn test_first_positive_price_notifies() {
        for i in 0..4 {
            let mut prices = [0; 4];
            prices[i] = 1;
            let mut detector = ChangeDetector::new();
            let report = detector.observe(&snapshot(prices));
            assert!(report.should_notify());
            assert_eq!(report.changes.len(), 1);
            assert_eq!(report.changes[0].bucket, Bucket::ALL[i]);
        }
    }

    #[test]
    fn test_unchanged_snapshot_is_quiet() {
        let mut detector = ChangeDetector::new();
        let s = snapshot([5_000_000_000, 0, 0, 2_000_000_000]);

        assert!(detector.observe(&s).should_notify());
        assert!(!detector.observe(&s).should_notify());
        assert!(!detector.observe(&s).should_notify());
        assert_eq!(detector.last_prices(), &s);
    }

    #[test]
    fn test_all_zero_snapshot_on_fresh_detector_is_quiet() {
        let mut detector = ChangeDetector::new();
        assert_eq!(detector.observe(&PriceSnapshot::default()), ChangeReport::default());
    }

    #[test]
    fn test_escalation_threshold() {
        let mut detector = ChangeDetector::new();
        detector.observe(&snapshot([100_000_000_000, 0, 0, 0]));

        let report = detector.observe(&snapshot([160_000_000_000, 0, 0, 0]));
        assert!(report.should_notify());
        assert!(report.should_escalate());

        let report = detector.observe(&snapshot([120_000_000_000, 0, 0, 0]));
        assert!(report.should_notify());
        assert!(!report.should_escalate());
    }

    #[test]
    fn test_escalation_uses_display_rounding() {
        let exact = PriceChange {
            bucket: Bucket::new(Restriction::Restricted, true),
            previous: 100_000_000_000,
            current: 150_000_000_000,
        };
        assert!(exact.is_escalation());

        // 149.995 rounds to 150.00 for display
        let rounded_up = PriceChange {
            current: 149_995_000_000,
            ..exact
        };
        assert_eq!(rounded_up.display_delta_cents(), 5000);
        assert!(rounded_up.is_escalation());

        let just_short = PriceChange {
            current: 149_994_999_999,
            ..exact
        };
        assert!(!just_short.is_escalation());

        let drop = PriceChange {
            previous: 160_000_000_000,
            current: 100_000_000_000,
            ..exact
        };
        assert!(drop.is_escalation());
    }

    #[test]
    fn test_bucket_appearing_escalates() {
        let mut detector = ChangeDetector::new();
        let report = detector.observe(&snapshot([0, 0, 200_000_000_000, 0]));
        assert!(report.should_notify());
        assert!(report.should_escalate());

        let mut detector = ChangeDetector::new();
        let report = detector.observe(&snapshot([0, 0, 40_000_000_000, 0]));
        assert!(report.should_notify());
        assert!(!report.should_escalate());
    }

    #[test]
    fn test_bucket_emptying_notifies_without_escalating() {
        let mut detector = ChangeDetector::new();
        let report = detector.observe(&snapshot([70_000_000_000, 0, 0, 0]));
        assert!(report.should_notify());
        assert!(report.should_escalate());

        let report = detector.observe(&PriceSnapshot::default());
        assert!(report.should_notify());
        assert!(!report.should_escalate());
        assert_eq!(detector.last_prices().get(Bucket::ALL[0]), 0);
    }
}
