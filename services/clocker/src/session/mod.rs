//! services/clocker/src/session/mod.rs
//!
//! The clock session: one mounted clock screen. It keeps the transient screen
//! state, evaluates the clock state machine against it, and runs the remote
//! actions through the ports.

pub mod clock_task;
pub mod location_task;
pub mod state;

pub use clock_task::{ClockOutConfirmation, ClockOutcome};
pub use location_task::LocationOutcome;
pub use state::{AppState, SessionState};

use chrono::{DateTime, Utc};
use clocker_core::clock::{self, ClockState};
use clocker_core::domain::{AttendanceQuery, AttendanceRecord, Notification, ServiceWindow};
use clocker_core::range::RangeVerdict;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::ClockerError;

/// A handle to one mounted clock screen. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ClockSession {
    app_state: Arc<AppState>,
    state: Arc<Mutex<SessionState>>,
    /// Set while a clock mutation is pending; the control is disabled meanwhile.
    in_flight: Arc<AtomicBool>,
    /// Cancelled when the screen unmounts.
    mounted: CancellationToken,
}

impl ClockSession {
    /// Mounts a new session with empty transient state.
    pub fn new(app_state: Arc<AppState>) -> Self {
        Self {
            app_state,
            state: Arc::new(Mutex::new(SessionState::default())),
            in_flight: Arc::new(AtomicBool::new(false)),
            mounted: CancellationToken::new(),
        }
    }

    /// Marks the screen as gone. Pending calls finish but no longer touch state
    /// or notify, and the location watcher stops.
    pub fn unmount(&self) {
        info!("Clock session unmounted.");
        self.mounted.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        !self.mounted.is_cancelled()
    }

    /// Whether a clock-in or clock-out is still pending.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    //=====================================================================================
    // Loading
    //=====================================================================================

    /// Reloads the latest service and the worker's attendance for it, acquiring
    /// the device position alongside.
    ///
    /// A location failure never fails the refresh; it only leaves the range
    /// verdict unknown.
    pub async fn refresh(&self) -> Result<ClockState, ClockerError> {
        let (loaded, _) = futures::join!(self.load_service(), self.acquire_location());
        loaded?;
        Ok(self.state(Utc::now()).await)
    }

    async fn load_service(&self) -> Result<(), ClockerError> {
        let worker = self.app_state.worker;
        let service = self
            .app_state
            .attendance
            .get_latest_service(worker.campus_id)
            .await?;

        let record = match &service {
            Some(service) => {
                let rows = self
                    .app_state
                    .attendance
                    .get_attendance(AttendanceQuery {
                        user_id: worker.user_id,
                        service_id: service.id,
                    })
                    .await?;
                clock::select_record(&rows, service.id).cloned()
            }
            None => None,
        };

        if !self.is_mounted() {
            return Ok(());
        }

        match &service {
            Some(s) => debug!("Loaded {} '{}' ({})", s.kind().label(), s.name, s.id),
            None => debug!("No service today for campus {}", worker.campus_id),
        }

        let mut state = self.state.lock().await;
        state.service = service.map(Arc::new);
        state.apply_record(record);
        Ok(())
    }

    //=====================================================================================
    // Derived State
    //=====================================================================================

    pub async fn state(&self, now: DateTime<Utc>) -> ClockState {
        self.state.lock().await.clock_state(now)
    }

    pub async fn verdict(&self) -> RangeVerdict {
        self.state.lock().await.verdict()
    }

    pub async fn service(&self) -> Option<Arc<ServiceWindow>> {
        self.state.lock().await.service.clone()
    }

    pub async fn record(&self) -> Option<AttendanceRecord> {
        self.state.lock().await.record.clone()
    }

    pub async fn clocked_out(&self) -> bool {
        self.state.lock().await.clocked_out
    }

    //=====================================================================================
    // Helpers
    //=====================================================================================

    /// Sends a notification unless the screen has gone.
    fn notify(&self, notification: Notification) {
        if self.is_mounted() {
            self.app_state
                .notifier
                .notify(notification.with_duration(self.app_state.notification_duration_secs));
        }
    }

    /// Claims the in-flight flag; `None` when another action holds it.
    fn begin_action(&self) -> Option<InFlight> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(self.in_flight.clone()))
    }
}

/// Releases the in-flight flag when the action settles, however it ends.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
