//! Fake port implementations shared by the session tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use clocker_core::domain::{
    AttendanceQuery, AttendanceRecord, ClockInPayload, GeoCoordinate, Notification,
    PermissionStatus, RangeConfig, ServiceWindow, WorkerIdentity,
};
use clocker_core::ports::{
    AttendanceService, LocationService, NotificationSink, PortError, PortResult,
};
use clocker_lib::session::{AppState, ClockSession};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use uuid::Uuid;

pub const CAMPUS: GeoCoordinate = GeoCoordinate {
    latitude: 6.4500,
    longitude: 3.4000,
};
/// About 33 m from the campus.
pub const NEAR: GeoCoordinate = GeoCoordinate {
    latitude: 6.4503,
    longitude: 3.4000,
};
/// About 1.1 km from the campus.
pub const FAR: GeoCoordinate = GeoCoordinate {
    latitude: 6.4600,
    longitude: 3.4000,
};

pub fn worker() -> WorkerIdentity {
    WorkerIdentity {
        user_id: Uuid::from_u128(0xA1),
        campus_id: Uuid::from_u128(0xB1),
        department_id: Uuid::from_u128(0xC1),
        role_id: Uuid::from_u128(0xD1),
    }
}

pub fn service_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 3, 7, 0, 0).unwrap()
}

/// Five minutes after clock-in opened.
pub fn during_service() -> DateTime<Utc> {
    service_start() + Duration::minutes(5)
}

pub fn service(id: u128, cgwc_id: Option<&str>) -> ServiceWindow {
    ServiceWindow {
        id: Uuid::from_u128(id),
        name: "Sunday Service".to_string(),
        clock_in_start_time: service_start(),
        cgwc_id: cgwc_id.map(str::to_string),
        campus_coordinates: CAMPUS,
        range: RangeConfig {
            range_to_clock_in: 100.0,
        },
    }
}

pub fn open_record(service_id: Uuid) -> AttendanceRecord {
    AttendanceRecord {
        id: Uuid::from_u128(0xE1),
        user_id: worker().user_id,
        service_id,
        clock_in: Some(service_start()),
        clock_out: None,
        coordinates: NEAR,
    }
}

//=========================================================================================
// Attendance
//=========================================================================================

#[derive(Default)]
pub struct FakeAttendance {
    pub latest: Mutex<Option<ServiceWindow>>,
    pub rows: Mutex<Vec<AttendanceRecord>>,
    /// Errors returned by the next mutation calls, in order.
    pub mutation_errors: Mutex<Vec<PortError>>,
    pub clock_in_calls: Mutex<Vec<ClockInPayload>>,
    pub clock_out_calls: Mutex<Vec<Uuid>>,
    /// When set, mutations wait for `release` before answering.
    pub hold: Mutex<bool>,
    pub entered: Notify,
    pub release: Notify,
}

impl FakeAttendance {
    pub fn with_service(service: ServiceWindow) -> Self {
        let fake = Self::default();
        *fake.latest.lock().unwrap() = Some(service);
        fake
    }

    pub fn fail_next(&self, err: PortError) {
        self.mutation_errors.lock().unwrap().push(err);
    }

    async fn gate(&self) -> PortResult<()> {
        let held = *self.hold.lock().unwrap();
        if held {
            self.entered.notify_one();
            self.release.notified().await;
        }
        let mut errors = self.mutation_errors.lock().unwrap();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.remove(0))
        }
    }
}

#[async_trait]
impl AttendanceService for FakeAttendance {
    async fn get_latest_service(&self, _campus_id: Uuid) -> PortResult<Option<ServiceWindow>> {
        Ok(self.latest.lock().unwrap().clone())
    }

    async fn get_attendance(&self, query: AttendanceQuery) -> PortResult<Vec<AttendanceRecord>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == query.user_id && r.service_id == query.service_id)
            .cloned()
            .collect())
    }

    async fn clock_in(&self, payload: ClockInPayload) -> PortResult<AttendanceRecord> {
        self.clock_in_calls.lock().unwrap().push(payload.clone());
        self.gate().await?;

        let record = AttendanceRecord {
            id: Uuid::from_u128(0xE1),
            user_id: payload.user_id,
            service_id: payload.service_id,
            clock_in: Some(payload.clock_in),
            clock_out: None,
            coordinates: payload.coordinates,
        };
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn clock_out(&self, attendance_id: Uuid) -> PortResult<AttendanceRecord> {
        self.clock_out_calls.lock().unwrap().push(attendance_id);
        self.gate().await?;

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == attendance_id)
            .ok_or_else(|| PortError::NotFound(attendance_id.to_string()))?;
        row.clock_out = Some(row.clock_in.unwrap_or_else(service_start) + Duration::hours(3));
        Ok(row.clone())
    }
}

//=========================================================================================
// Location
//=========================================================================================

pub struct FakeLocation {
    pub permission: Mutex<PermissionStatus>,
    pub position: Mutex<Option<GeoCoordinate>>,
}

impl FakeLocation {
    pub fn at(position: Option<GeoCoordinate>) -> Self {
        Self {
            permission: Mutex::new(PermissionStatus::Granted),
            position: Mutex::new(position),
        }
    }

    pub fn move_to(&self, position: Option<GeoCoordinate>) {
        *self.position.lock().unwrap() = position;
    }
}

#[async_trait]
impl LocationService for FakeLocation {
    async fn check_location_permission(&self) -> PortResult<PermissionStatus> {
        Ok(*self.permission.lock().unwrap())
    }

    async fn get_current_position(&self) -> PortResult<GeoCoordinate> {
        self.position
            .lock()
            .unwrap()
            .ok_or_else(|| PortError::Unavailable("no fix".to_string()))
    }
}

//=========================================================================================
// Notifications
//=========================================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.sent.lock().unwrap().last().cloned()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

//=========================================================================================
// Harness
//=========================================================================================

pub struct Harness {
    pub attendance: Arc<FakeAttendance>,
    pub location: Arc<FakeLocation>,
    pub notifier: Arc<RecordingNotifier>,
    pub session: ClockSession,
}

impl Harness {
    pub fn new(attendance: FakeAttendance, location: FakeLocation) -> Self {
        let attendance = Arc::new(attendance);
        let location = Arc::new(location);
        let notifier = Arc::new(RecordingNotifier::default());

        let app_state = Arc::new(AppState {
            attendance: attendance.clone(),
            location: location.clone(),
            notifier: notifier.clone(),
            worker: worker(),
            notification_duration_secs: 5,
        });

        Self {
            attendance,
            location,
            notifier,
            session: ClockSession::new(app_state),
        }
    }
}
