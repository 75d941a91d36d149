//! crates/clocker_core/src/ports.rs
//!
//! Defines the service contracts (traits) the clock logic depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the attendance API, the platform location service and the
//! notification UI.

use async_trait::async_trait;
use uuid::Uuid;

use crate::clock::GENERIC_FAILURE_MESSAGE;
use crate::domain::{
    AttendanceQuery, AttendanceRecord, ClockInPayload, GeoCoordinate, Notification,
    PermissionStatus, ServiceWindow,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP, GPS).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The server refused the request; carries its message when it sent one.
    #[error("Request rejected: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    /// The server answered with a payload that does not fit the domain types.
    #[error("Malformed payload: {0}")]
    Malformed(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// The text shown to the user for a failed clock action.
    pub fn user_message(&self) -> String {
        match self {
            PortError::Rejected {
                message: Some(message),
            } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Conditions that should reach a generic error boundary instead of a notification.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, PortError::Malformed(_) | PortError::Unexpected(_))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AttendanceService: Send + Sync {
    /// The currently active service or session for a campus; `None` when there is
    /// no service today.
    async fn get_latest_service(&self, campus_id: Uuid) -> PortResult<Option<ServiceWindow>>;

    /// Existing attendance rows for a worker and a service (zero or one open row expected).
    async fn get_attendance(&self, query: AttendanceQuery) -> PortResult<Vec<AttendanceRecord>>;

    async fn clock_in(&self, payload: ClockInPayload) -> PortResult<AttendanceRecord>;

    /// Sets `clock_out` on an existing record.
    async fn clock_out(&self, attendance_id: Uuid) -> PortResult<AttendanceRecord>;
}

#[async_trait]
pub trait LocationService: Send + Sync {
    async fn check_location_permission(&self) -> PortResult<PermissionStatus>;

    /// May fail or time out; the platform decides how long to wait.
    async fn get_current_position(&self) -> PortResult<GeoCoordinate>;
}

/// Fire-and-forget feedback channel to the user.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}
