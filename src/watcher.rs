use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::analysis::FloorReport;
use crate::change::ChangeDetector;
use crate::marketplace::ListingSource;
use crate::message::MessageFormatter;
use crate::notify::Notifier;

/// What a single poll cycle ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Previous cycle still running; nothing fetched.
    Skipped,
    FetchFailed,
    Unchanged,
    Notified { message_id: i64, pinned: bool },
    NotifyFailed,
}

/// Counters reported when the watcher shuts down.
#[derive(Debug)]
pub struct WatcherStats {
    pub started_at: DateTime<Utc>,
    pub cycles: AtomicU64,
    pub skipped_ticks: AtomicU64,
    pub fetch_failures: AtomicU64,
    pub notifications: AtomicU64,
    pub pins: AtomicU64,
    pub notify_failures: AtomicU64,
    pub last_notified_at: Mutex<Option<DateTime<Utc>>>,
}

impl Default for WatcherStats {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            cycles: AtomicU64::new(0),
            skipped_ticks: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            notifications: AtomicU64::new(0),
            pins: AtomicU64::new(0),
            notify_failures: AtomicU64::new(0),
            last_notified_at: Mutex::new(None),
        }
    }
}

impl WatcherStats {
    pub fn summary(&self) -> String {
        let uptime = Utc::now().signed_duration_since(self.started_at);
        let last_notified_at = *self.last_notified_at.lock();
        let last = last_notified_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string());

        format!(
            "Floor Watch Statistics:\n\
             - Uptime: {} minutes\n\
             - Cycles: {}\n\
             - Skipped Ticks: {}\n\
             - Fetch Failures: {}\n\
             - Notifications: {} ({} pinned, {} failed)\n\
             - Last Notification: {}",
            uptime.num_minutes(),
            self.cycles.load(Ordering::Relaxed),
            self.skipped_ticks.load(Ordering::Relaxed),
            self.fetch_failures.load(Ordering::Relaxed),
            self.notifications.load(Ordering::Relaxed),
            self.pins.load(Ordering::Relaxed),
            self.notify_failures.load(Ordering::Relaxed),
            last
        )
    }
}

/// Held for the duration of a cycle; clears the in-flight flag on drop.
pub struct CycleGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Polls the marketplace and posts floor-price changes.
pub struct FloorWatcher {
    source: Arc<dyn ListingSource>,
    notifier: Arc<dyn Notifier>,
    formatter: MessageFormatter,
    detector: Mutex<ChangeDetector>,
    in_flight: AtomicBool,
    poll_interval: Duration,
    stats: WatcherStats,
}

impl FloorWatcher {
    pub fn new(
        source: Arc<dyn ListingSource>,
        notifier: Arc<dyn Notifier>,
        formatter: MessageFormatter,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            notifier,
            formatter,
            detector: Mutex::new(ChangeDetector::new()),
            in_flight: AtomicBool::new(false),
            poll_interval,
            stats: WatcherStats::default(),
        }
    }

    pub fn stats(&self) -> &WatcherStats {
        &self.stats
    }

    /// Claim the right to run a cycle. `None` while another cycle holds it.
    pub fn try_begin_cycle(&self) -> Option<CycleGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard {
                flag: &self.in_flight,
            })
    }

    /// Tick forever. Each cycle runs on its own task so a slow request never
    /// holds up the timer; overlapping ticks are dropped by the cycle guard.
    pub async fn run(self: Arc<Self>) {
        info!(
            "🚀 Starting floor watch, polling every {} seconds",
            self.poll_interval.as_secs()
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let watcher = self.clone();
            tokio::spawn(async move {
                watcher.run_cycle().await;
            });
        }
    }

    /// Fetch, analyze, diff and notify once.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Some(_guard) = self.try_begin_cycle() else {
            self.stats.skipped_ticks.fetch_add(1, Ordering::Relaxed);
            warn!("⏳ Previous cycle still running, skipping this tick");
            return CycleOutcome::Skipped;
        };
        self.stats.cycles.fetch_add(1, Ordering::Relaxed);

        let listings = match self.source.fetch_listings().await {
            Ok(listings) => listings,
            Err(e) => {
                self.stats.fetch_failures.fetch_add(1, Ordering::Relaxed);
                error!("Failed to fetch listings: {}", e);
                return CycleOutcome::FetchFailed;
            }
        };
        debug!("Fetched {} listings", listings.len());

        let floors = FloorReport::from_listings(&listings);
        let snapshot = floors.snapshot();
        let text = self.formatter.render(&floors);

        let report = self.detector.lock().observe(&snapshot);
        if !report.should_notify() {
            debug!("Floors unchanged: {}", snapshot);
            return CycleOutcome::Unchanged;
        }

        for change in &report.changes {
            info!(
                "📉 {} floor {} -> {} nanoTON",
                change.bucket, change.previous, change.current
            );
        }

        let message_id = match self.notifier.send_message(&text).await {
            Ok(id) => id,
            Err(e) => {
                self.stats.notify_failures.fetch_add(1, Ordering::Relaxed);
                error!("Failed to send floor notification: {}", e);
                return CycleOutcome::NotifyFailed;
            }
        };
        self.stats.notifications.fetch_add(1, Ordering::Relaxed);
        *self.stats.last_notified_at.lock() = Some(Utc::now());
        info!("✅ Floor notification sent (message {})", message_id);

        let mut pinned = false;
        if report.should_escalate() {
            match self.notifier.pin_message(message_id).await {
                Ok(()) => {
                    pinned = true;
                    self.stats.pins.fetch_add(1, Ordering::Relaxed);
                    info!("📌 Pinned message {} after a large floor move", message_id);
                }
                Err(e) => {
                    self.stats.notify_failures.fetch_add(1, Ordering::Relaxed);
                    error!("Failed to pin message {}: {}", message_id, e);
                }
            }
        }

        CycleOutcome::Notified { message_id, pinned }
    }
}
