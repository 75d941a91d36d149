//! crates/clocker_core/src/domain.rs
//!
//! Defines the pure, core data structures for clock-in eligibility.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A fixed location taken from server configuration (a campus or service venue).
pub type CampusCoordinate = GeoCoordinate;

/// The circle of eligibility around a campus coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeConfig {
    /// Radius in meters.
    pub range_to_clock_in: f64,
}

/// Whether a window is a regular church service or a special congress session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Service,
    Session,
}

impl ServiceKind {
    pub fn label(self) -> &'static str {
        match self {
            ServiceKind::Service => "service",
            ServiceKind::Session => "session",
        }
    }
}

/// The currently active service or session for a campus.
///
/// Carries the campus coordinate and radius it is clocked against, so a loaded
/// service always has a location to evaluate range with.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceWindow {
    pub id: Uuid,
    pub name: String,
    pub clock_in_start_time: DateTime<Utc>,
    /// Set for congress sessions; only changes wording and reporting category.
    pub cgwc_id: Option<String>,
    pub campus_coordinates: CampusCoordinate,
    pub range: RangeConfig,
}

impl ServiceWindow {
    pub fn kind(&self) -> ServiceKind {
        if self.cgwc_id.is_some() {
            ServiceKind::Session
        } else {
            ServiceKind::Service
        }
    }
}

/// One attendance row for a (user, service) pair, owned by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub clock_in: Option<DateTime<Utc>>,
    pub clock_out: Option<DateTime<Utc>>,
    pub coordinates: GeoCoordinate,
}

impl AttendanceRecord {
    /// Clocked in and not yet clocked out.
    pub fn is_open(&self) -> bool {
        self.clock_in.is_some() && self.clock_out.is_none()
    }

    pub fn is_closed(&self) -> bool {
        self.clock_in.is_some() && self.clock_out.is_some()
    }
}

/// Filter used to fetch the attendance rows of one worker for one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceQuery {
    pub user_id: Uuid,
    pub service_id: Uuid,
}

/// The worker on whose behalf the clock actions are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerIdentity {
    pub user_id: Uuid,
    pub campus_id: Uuid,
    pub department_id: Uuid,
    pub role_id: Uuid,
}

/// The body submitted to create an attendance record.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockInPayload {
    pub user_id: Uuid,
    pub clock_in: DateTime<Utc>,
    /// Always `None` on creation.
    pub clock_out: Option<DateTime<Utc>>,
    pub service_id: Uuid,
    pub coordinates: GeoCoordinate,
    pub campus_id: Uuid,
    pub department_id: Uuid,
    pub role_id: Uuid,
}

impl ClockInPayload {
    pub fn new(
        worker: &WorkerIdentity,
        service_id: Uuid,
        coordinates: GeoCoordinate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: worker.user_id,
            clock_in: now,
            clock_out: None,
            service_id,
            coordinates,
            campus_id: worker.campus_id,
            department_id: worker.department_id,
            role_id: worker.role_id,
        }
    }
}

/// The platform's answer to "may this app read the device location".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Blocked,
    Unavailable,
    /// Approximate location only; still yields a usable fix.
    Limited,
}

impl PermissionStatus {
    pub fn allows_location(self) -> bool {
        matches!(self, PermissionStatus::Granted | PermissionStatus::Limited)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    Success,
    Warning,
    Error,
}

/// A dismissable, time-limited message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub status: NotificationStatus,
    pub duration_seconds: Option<u64>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationStatus::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NotificationStatus::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationStatus::Error)
    }

    fn new(message: impl Into<String>, status: NotificationStatus) -> Self {
        Self {
            message: message.into(),
            status,
            duration_seconds: None,
        }
    }

    pub fn with_duration(mut self, seconds: u64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }
}
