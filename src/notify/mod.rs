pub mod telegram;

use async_trait::async_trait;

pub use telegram::TelegramNotifier;

#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("notification api rejected {method}: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
}

/// Delivery channel for floor-price notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send an HTML message without link previews; returns the message id.
    async fn send_message(&self, text: &str) -> Result<i64, NotifyError>;

    /// Pin a previously sent message, notifying chat members.
    async fn pin_message(&self, message_id: i64) -> Result<(), NotifyError>;
}
