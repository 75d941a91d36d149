//! services/clocker/src/adapters/location.rs
//!
//! A location adapter for hosts without a positioning service. It implements the
//! `LocationService` port with a configured coordinate.

use async_trait::async_trait;
use clocker_core::domain::{GeoCoordinate, PermissionStatus};
use clocker_core::ports::{LocationService, PortError, PortResult};
use tracing::debug;

/// Reports a fixed position, or no position at all when none is configured.
#[derive(Clone, Debug)]
pub struct FixedLocationAdapter {
    position: Option<GeoCoordinate>,
}

impl FixedLocationAdapter {
    /// Creates a new `FixedLocationAdapter`.
    pub fn new(position: Option<GeoCoordinate>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationService for FixedLocationAdapter {
    async fn check_location_permission(&self) -> PortResult<PermissionStatus> {
        Ok(if self.position.is_some() {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Unavailable
        })
    }

    async fn get_current_position(&self) -> PortResult<GeoCoordinate> {
        let position = self
            .position
            .ok_or_else(|| PortError::Unavailable("no device position configured".to_string()))?;
        debug!(
            "Reporting device position ({}, {})",
            position.latitude, position.longitude
        );
        Ok(position)
    }
}
