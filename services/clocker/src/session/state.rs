//! services/clocker/src/session/state.rs
//!
//! Defines the shared application state and the per-screen session state.

use chrono::{DateTime, Utc};
use clocker_core::clock::{self, ClockInputs, ClockState};
use clocker_core::domain::{
    AttendanceRecord, GeoCoordinate, PermissionStatus, ServiceWindow, WorkerIdentity,
};
use clocker_core::ports::{AttendanceService, LocationService, NotificationSink};
use clocker_core::range::{evaluate_range, RangeVerdict};
use std::sync::Arc;

use crate::config::Config;

//=========================================================================================
// AppState (Shared Across All Screens)
//=========================================================================================

/// The shared application state, created once at startup and handed to every session.
#[derive(Clone)]
pub struct AppState {
    pub attendance: Arc<dyn AttendanceService>,
    pub location: Arc<dyn LocationService>,
    pub notifier: Arc<dyn NotificationSink>,
    pub worker: WorkerIdentity,
    pub notification_duration_secs: u64,
}

impl AppState {
    pub fn new(
        config: &Config,
        attendance: Arc<dyn AttendanceService>,
        location: Arc<dyn LocationService>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            attendance,
            location,
            notifier,
            worker: config.worker,
            notification_duration_secs: config.notification_duration_secs,
        }
    }
}

//=========================================================================================
// SessionState (Specific to One Mounted Screen)
//=========================================================================================

/// Transient state for one mounted clock screen. Nothing here outlives the screen.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Read-only snapshot of the campus's latest service.
    pub service: Option<Arc<ServiceWindow>>,
    pub record: Option<AttendanceRecord>,
    /// Set after a successful clock-out until a fetched record says otherwise.
    pub clocked_out: bool,
    /// The most recently acquired device position.
    pub device_coordinates: Option<GeoCoordinate>,
    pub permission: Option<PermissionStatus>,
}

impl SessionState {
    pub fn verdict(&self) -> RangeVerdict {
        match self.service.as_deref() {
            Some(service) => evaluate_range(
                self.device_coordinates.as_ref(),
                Some(&service.campus_coordinates),
                service.range.range_to_clock_in,
            ),
            None => RangeVerdict::unknown(),
        }
    }

    pub fn clock_state(&self, now: DateTime<Utc>) -> ClockState {
        clock::evaluate(&ClockInputs {
            now,
            service: self.service.as_deref(),
            record: self.record.as_ref(),
            verdict: self.verdict(),
            clocked_out: self.clocked_out,
        })
    }

    /// Stores the record for the current service, clearing the `clocked_out`
    /// guard when the record no longer has a clock-in.
    pub fn apply_record(&mut self, record: Option<AttendanceRecord>) {
        if clock::should_reset_clocked_out(record.as_ref()) {
            self.clocked_out = false;
        }
        self.record = record;
    }

    /// The open record, if the worker is currently clocked in.
    pub fn open_record(&self) -> Option<&AttendanceRecord> {
        self.record.as_ref().filter(|r| r.is_open())
    }
}
