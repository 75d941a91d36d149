//! services/clocker/src/session/location_task.rs
//!
//! Device position handling for a session: the permission gate, one-shot
//! acquisition, push updates and the background watcher.

use clocker_core::domain::{GeoCoordinate, Notification, PermissionStatus};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ClockSession;

/// Where location access can be turned back on.
pub const LOCATION_SETTINGS_URL: &str = "app-settings:";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationOutcome {
    Acquired(GeoCoordinate),
    PermissionDenied(PermissionStatus),
    /// No fix this time; the previous position, if any, is kept.
    Unavailable,
}

/// The message shown when the platform refuses location access.
pub fn permission_message(status: PermissionStatus) -> String {
    let reason = match status {
        PermissionStatus::Denied => "Location permission was denied.",
        PermissionStatus::Blocked => "Location permission is blocked.",
        PermissionStatus::Unavailable => "Location services are unavailable on this device.",
        PermissionStatus::Granted | PermissionStatus::Limited => "Location permission is required.",
    };
    format!(
        "{} Enable location access for this app in your device settings ({}) to clock in.",
        reason, LOCATION_SETTINGS_URL
    )
}

impl ClockSession {
    /// Checks permission, then reads the device position into the cache.
    ///
    /// A refused permission is reported once per change of status, so a
    /// polling watcher does not repeat it.
    pub async fn acquire_location(&self) -> LocationOutcome {
        let status = match self.app_state.location.check_location_permission().await {
            Ok(status) => status,
            Err(e) => {
                warn!("Failed to check location permission: {}", e);
                return LocationOutcome::Unavailable;
            }
        };
        if !self.is_mounted() {
            return LocationOutcome::Unavailable;
        }

        let previous = {
            let mut state = self.state.lock().await;
            state.permission.replace(status)
        };

        if !status.allows_location() {
            if previous != Some(status) {
                self.notify(Notification::error(permission_message(status)));
            }
            return LocationOutcome::PermissionDenied(status);
        }

        match self.app_state.location.get_current_position().await {
            Ok(position) => {
                self.update_location(position).await;
                LocationOutcome::Acquired(position)
            }
            Err(e) => {
                warn!("Failed to get device position: {}", e);
                LocationOutcome::Unavailable
            }
        }
    }

    /// Records a position delivered by a platform callback. The newest value wins.
    pub async fn update_location(&self, position: GeoCoordinate) {
        if !self.is_mounted() {
            return;
        }
        debug!(
            "Device position updated to ({}, {})",
            position.latitude, position.longitude
        );
        self.state.lock().await.device_coordinates = Some(position);
    }

    /// Polls the device position every `interval` until the session unmounts.
    pub fn spawn_location_watcher(&self, interval: Duration) -> JoinHandle<()> {
        let session = self.clone();
        let token = self.mounted.child_token();

        tokio::spawn(async move {
            info!("Location watcher started.");
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        session.acquire_location().await;
                    }
                }
            }
            info!("Location watcher stopped.");
        })
    }
}
