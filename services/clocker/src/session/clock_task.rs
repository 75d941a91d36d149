//! services/clocker/src/session/clock_task.rs
//!
//! The clock-in and clock-out actions of a session.

use chrono::{DateTime, Utc};
use clocker_core::clock::{messages, ClockAction, ClockState, CLOCK_OUT_PROMPT};
use clocker_core::domain::{AttendanceRecord, ClockInPayload, Notification};
use clocker_core::ports::PortError;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::ClockSession;
use crate::error::ClockerError;

/// What became of a clock action.
#[derive(Debug, Clone, PartialEq)]
pub enum ClockOutcome {
    /// Another action is still pending; nothing was sent.
    Busy,
    /// The state machine did not allow the action; the user was told why.
    Blocked { state: ClockState },
    ClockedIn(AttendanceRecord),
    ClockedOut(AttendanceRecord),
    /// The remote call failed. The action can be retried.
    Failed { message: String },
    /// The screen went away before the call settled.
    Unmounted,
}

/// A pending clock-out waiting for the user to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockOutConfirmation {
    pub attendance_id: Uuid,
    pub prompt: &'static str,
}

impl ClockSession {
    /// Clocks the worker in for the latest service.
    ///
    /// Blocked states (too early, out of range, location unknown, already
    /// clocked) produce a warning instead of a remote call.
    pub async fn clock_in(&self, now: DateTime<Utc>) -> Result<ClockOutcome, ClockerError> {
        let Some(_in_flight) = self.begin_action() else {
            return Ok(ClockOutcome::Busy);
        };

        let (clock_state, service, coordinates) = {
            let state = self.state.lock().await;
            (state.clock_state(now), state.service.clone(), state.device_coordinates)
        };

        let (ClockState::EligibleToClockIn, Some(service), Some(coordinates)) =
            (clock_state, service, coordinates)
        else {
            if let Some(message) = clock_state.clock_in_blocked_message() {
                self.notify(Notification::warning(message));
            }
            return Ok(ClockOutcome::Blocked { state: clock_state });
        };

        let payload = ClockInPayload::new(&self.app_state.worker, service.id, coordinates, now);
        info!(
            "Clocking in user {} for {} {}",
            payload.user_id,
            service.kind().label(),
            service.id
        );

        let result = self.app_state.attendance.clock_in(payload).await;
        if !self.is_mounted() {
            return Ok(ClockOutcome::Unmounted);
        }

        match result {
            Ok(record) => {
                let verdict = {
                    let mut state = self.state.lock().await;
                    state.apply_record(Some(record.clone()));
                    state.verdict()
                };

                let message = messages::clocked_in_at(record.clock_in.unwrap_or(now));
                self.notify(if verdict.is_in_range() {
                    Notification::success(message)
                } else {
                    Notification::warning(message)
                });
                Ok(ClockOutcome::ClockedIn(record))
            }
            Err(e) => self.mutation_failed("clock in", e),
        }
    }

    /// Starts a clock-out. Returns the confirmation to show when clock-out is the
    /// available action, `None` otherwise.
    pub async fn request_clock_out(&self, now: DateTime<Utc>) -> Option<ClockOutConfirmation> {
        let state = self.state.lock().await;
        if state.clock_state(now).available_action() != Some(ClockAction::ClockOut) {
            return None;
        }
        state.open_record().map(|record| ClockOutConfirmation {
            attendance_id: record.id,
            prompt: CLOCK_OUT_PROMPT,
        })
    }

    /// Submits a confirmed clock-out after verifying range a second time with
    /// the newest device position.
    pub async fn confirm_clock_out(
        &self,
        confirmation: &ClockOutConfirmation,
        now: DateTime<Utc>,
    ) -> Result<ClockOutcome, ClockerError> {
        let Some(_in_flight) = self.begin_action() else {
            return Ok(ClockOutcome::Busy);
        };

        if !self.verify_range_before_action().await {
            let state = self.state.lock().await;
            let message = if state.verdict().is_known() {
                messages::out_of_range()
            } else {
                messages::location_unknown()
            };
            drop(state);
            self.notify(Notification::warning(message));
            return Ok(ClockOutcome::Blocked {
                state: self.state(now).await,
            });
        }

        {
            let state = self.state.lock().await;
            let still_open = state
                .open_record()
                .is_some_and(|r| r.id == confirmation.attendance_id);
            if state.clocked_out || !still_open {
                return Ok(ClockOutcome::Blocked {
                    state: state.clock_state(now),
                });
            }
        }

        info!("Clocking out attendance {}", confirmation.attendance_id);
        let result = self
            .app_state
            .attendance
            .clock_out(confirmation.attendance_id)
            .await;
        if !self.is_mounted() {
            return Ok(ClockOutcome::Unmounted);
        }

        match result {
            Ok(record) => {
                {
                    let mut state = self.state.lock().await;
                    state.apply_record(Some(record.clone()));
                    state.clocked_out = true;
                }
                self.notify(Notification::success(messages::clocked_out_at(
                    record.clock_out.unwrap_or(now),
                )));
                Ok(ClockOutcome::ClockedOut(record))
            }
            Err(e) => self.mutation_failed("clock out", e),
        }
    }

    /// Re-reads the device position and checks range against it.
    ///
    /// A fresh fix replaces the cache; if none can be had, the most recently
    /// acquired position decides.
    async fn verify_range_before_action(&self) -> bool {
        self.acquire_location().await;
        self.verdict().await.is_in_range()
    }

    fn mutation_failed(&self, action: &str, err: PortError) -> Result<ClockOutcome, ClockerError> {
        if err.is_unexpected() {
            error!("Failed to {}: {:?}", action, err);
            return Err(err.into());
        }

        warn!("Failed to {}: {}", action, err);
        let message = err.user_message();
        self.notify(Notification::error(message.clone()));
        Ok(ClockOutcome::Failed { message })
    }
}
