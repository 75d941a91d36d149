//! services/clocker/src/adapters/notifier.rs
//!
//! A notification sink that writes user feedback to the `tracing` log.

use clocker_core::domain::{Notification, NotificationStatus};
use clocker_core::ports::NotificationSink;
use tracing::{error, info, warn};

#[derive(Clone, Debug, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let duration = notification.duration_seconds.unwrap_or_default();
        match notification.status {
            NotificationStatus::Success => info!(duration, "{}", notification.message),
            NotificationStatus::Warning => warn!(duration, "{}", notification.message),
            NotificationStatus::Error => error!(duration, "{}", notification.message),
        }
    }
}
