//! crates/clocker_core/src/clock.rs
//!
//! The clock-in/clock-out state machine.
//!
//! Every state is computed by [`evaluate`] from explicit inputs, so the screen
//! never has to reconcile several booleans that might disagree. Side effects
//! (remote calls, notifications) live with the caller.

use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

use crate::domain::{AttendanceRecord, ServiceKind, ServiceWindow};
use crate::range::RangeVerdict;

/// Shown before a clock-out is submitted.
pub const CLOCK_OUT_PROMPT: &str = "Are you sure you want to clock out now?";

/// Used when a failed mutation carries no message from the server.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Where a worker stands for the active service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockState {
    /// No active service, or it has not been loaded yet.
    NotApplicable,
    /// The service exists but clock-in has not opened.
    TooEarly {
        opens_at: DateTime<Utc>,
        kind: ServiceKind,
    },
    EligibleToClockIn,
    ClockedIn,
    /// The device is outside the radius, or its position is not known yet.
    OutOfRange {
        has_open_record: bool,
        location_known: bool,
    },
    /// Terminal for this service instance.
    ClockedOut,
}

/// The single action a worker may take from a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockAction {
    ClockIn,
    ClockOut,
}

impl ClockState {
    pub fn available_action(&self) -> Option<ClockAction> {
        match self {
            ClockState::EligibleToClockIn => Some(ClockAction::ClockIn),
            ClockState::ClockedIn => Some(ClockAction::ClockOut),
            // Range is verified again when the clock-out is confirmed.
            ClockState::OutOfRange {
                has_open_record: true,
                ..
            } => Some(ClockAction::ClockOut),
            _ => None,
        }
    }

    /// The message explaining why clock-in is not possible, if any.
    pub fn clock_in_blocked_message(&self) -> Option<String> {
        match self {
            ClockState::NotApplicable => Some(messages::no_service()),
            ClockState::TooEarly { opens_at, kind } => Some(messages::too_early(*kind, *opens_at)),
            ClockState::OutOfRange {
                location_known: false,
                ..
            } => Some(messages::location_unknown()),
            ClockState::OutOfRange { .. } => Some(messages::out_of_range()),
            ClockState::ClockedIn => Some(messages::already_clocked_in()),
            ClockState::ClockedOut => Some(messages::already_clocked_out()),
            ClockState::EligibleToClockIn => None,
        }
    }
}

/// Everything the state machine looks at.
#[derive(Debug, Clone, Copy)]
pub struct ClockInputs<'a> {
    pub now: DateTime<Utc>,
    pub service: Option<&'a ServiceWindow>,
    pub record: Option<&'a AttendanceRecord>,
    pub verdict: RangeVerdict,
    /// Set locally after a successful clock-out, before the refetched record arrives.
    pub clocked_out: bool,
}

/// Computes the clock state. The first matching rule wins.
pub fn evaluate(inputs: &ClockInputs<'_>) -> ClockState {
    let Some(service) = inputs.service else {
        return ClockState::NotApplicable;
    };

    if inputs.now < service.clock_in_start_time {
        return ClockState::TooEarly {
            opens_at: service.clock_in_start_time,
            kind: service.kind(),
        };
    }

    // Only a record for this service counts.
    let record = inputs.record.filter(|r| r.service_id == service.id);

    if inputs.clocked_out || record.is_some_and(AttendanceRecord::is_closed) {
        return ClockState::ClockedOut;
    }

    let has_open_record = record.is_some_and(AttendanceRecord::is_open);

    if !inputs.verdict.is_in_range() {
        return ClockState::OutOfRange {
            has_open_record,
            location_known: inputs.verdict.is_known(),
        };
    }

    if has_open_record {
        ClockState::ClockedIn
    } else {
        ClockState::EligibleToClockIn
    }
}

/// Picks the row that drives the state for `service_id`.
///
/// An open record wins; otherwise the most recent clock-in; otherwise any row
/// for the service.
pub fn select_record(records: &[AttendanceRecord], service_id: Uuid) -> Option<&AttendanceRecord> {
    let for_service = || records.iter().filter(move |r| r.service_id == service_id);

    for_service()
        .find(|r| r.is_open())
        .or_else(|| for_service().filter(|r| r.clock_in.is_some()).max_by_key(|r| r.clock_in))
        .or_else(|| for_service().next())
}

/// The local `clocked_out` guard must be cleared once the fetched record for the
/// current service no longer has a clock-in, e.g. when a new service period began.
pub fn should_reset_clocked_out(record: Option<&AttendanceRecord>) -> bool {
    record.map_or(true, |r| r.clock_in.is_none())
}

/// User-facing wording for clock outcomes.
pub mod messages {
    use super::*;

    /// Renders a timestamp the way it appears in notifications, e.g. `7:05 AM`.
    pub fn format_clock_time(time: DateTime<Utc>) -> String {
        time.with_timezone(&Local).format("%-I:%M %p").to_string()
    }

    pub fn too_early(kind: ServiceKind, opens_at: DateTime<Utc>) -> String {
        format!(
            "Clock-in for this {} has not started. You can clock in from {}.",
            kind.label(),
            format_clock_time(opens_at)
        )
    }

    pub fn no_service() -> String {
        "There is no service to clock in to right now.".to_string()
    }

    pub fn out_of_range() -> String {
        "You are not within range of the clock-in location.".to_string()
    }

    pub fn location_unknown() -> String {
        "Your location is not available yet. Please wait a moment and try again.".to_string()
    }

    pub fn already_clocked_in() -> String {
        "You have already clocked in.".to_string()
    }

    pub fn already_clocked_out() -> String {
        "You have already clocked out.".to_string()
    }

    pub fn clocked_in_at(time: DateTime<Utc>) -> String {
        format!("You clocked in at {}.", format_clock_time(time))
    }

    pub fn clocked_out_at(time: DateTime<Utc>) -> String {
        format!("You clocked out at {}.", format_clock_time(time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoCoordinate, RangeConfig};
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 3, 7, 0, 0).unwrap()
    }

    fn service(cgwc_id: Option<&str>) -> ServiceWindow {
        ServiceWindow {
            id: Uuid::from_u128(1),
            name: "Sunday Service".to_string(),
            clock_in_start_time: start(),
            cgwc_id: cgwc_id.map(str::to_string),
            campus_coordinates: GeoCoordinate::new(6.45, 3.40),
            range: RangeConfig {
                range_to_clock_in: 100.0,
            },
        }
    }

    fn record(clock_in: Option<DateTime<Utc>>, clock_out: Option<DateTime<Utc>>) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::from_u128(10),
            user_id: Uuid::from_u128(20),
            service_id: Uuid::from_u128(1),
            clock_in,
            clock_out,
            coordinates: GeoCoordinate::new(6.45, 3.40),
        }
    }

    fn in_range() -> RangeVerdict {
        RangeVerdict {
            is_in_range: Some(true),
            distance: 12.0,
        }
    }

    fn out_of_range() -> RangeVerdict {
        RangeVerdict {
            is_in_range: Some(false),
            distance: 900.0,
        }
    }

    fn inputs<'a>(
        now: DateTime<Utc>,
        service: Option<&'a ServiceWindow>,
        record: Option<&'a AttendanceRecord>,
        verdict: RangeVerdict,
    ) -> ClockInputs<'a> {
        ClockInputs {
            now,
            service,
            record,
            verdict,
            clocked_out: false,
        }
    }

    #[test]
    fn test_no_service_is_not_applicable() {
        let state = evaluate(&inputs(start(), None, None, in_range()));
        assert_eq!(state, ClockState::NotApplicable);
        assert_eq!(state.available_action(), None);
    }

    #[test]
    fn test_too_early_blocks_everything() {
        let svc = service(None);
        let early = start() - Duration::minutes(1);
        let open = record(Some(start()), None);
        let closed = record(Some(start()), Some(start()));

        for rec in [None, Some(&open), Some(&closed)] {
            for verdict in [in_range(), out_of_range(), RangeVerdict::unknown()] {
                let state = evaluate(&inputs(early, Some(&svc), rec, verdict));
                assert!(matches!(state, ClockState::TooEarly { .. }));
                assert_eq!(state.available_action(), None);
            }
        }
    }

    #[test]
    fn test_too_early_names_the_window_kind() {
        let svc = service(Some("cgwc-2024"));
        let state = evaluate(&inputs(start() - Duration::hours(1), Some(&svc), None, in_range()));

        assert_eq!(
            state,
            ClockState::TooEarly {
                opens_at: start(),
                kind: ServiceKind::Session
            }
        );
        let message = state.clock_in_blocked_message().unwrap();
        assert!(message.contains("session"));

        let regular = service(None);
        let state = evaluate(&inputs(start() - Duration::hours(1), Some(&regular), None, in_range()));
        assert!(state.clock_in_blocked_message().unwrap().contains("service"));
    }

    #[test]
    fn test_start_time_itself_is_open() {
        let svc = service(None);
        let state = evaluate(&inputs(start(), Some(&svc), None, in_range()));
        assert_eq!(state, ClockState::EligibleToClockIn);
    }

    #[test]
    fn test_clock_in_then_clock_out_sequence() {
        let svc = service(None);
        let now = start() + Duration::minutes(5);

        let state = evaluate(&inputs(now, Some(&svc), None, in_range()));
        assert_eq!(state.available_action(), Some(ClockAction::ClockIn));

        let open = record(Some(now), None);
        let state = evaluate(&inputs(now, Some(&svc), Some(&open), in_range()));
        assert_eq!(state, ClockState::ClockedIn);
        assert_eq!(state.available_action(), Some(ClockAction::ClockOut));

        let closed = record(Some(now), Some(now + Duration::hours(3)));
        let state = evaluate(&inputs(now, Some(&svc), Some(&closed), in_range()));
        assert_eq!(state, ClockState::ClockedOut);
        assert_eq!(state.available_action(), None);
    }

    #[test]
    fn test_out_of_range_blocks_clock_in() {
        let svc = service(None);
        let state = evaluate(&inputs(start(), Some(&svc), None, out_of_range()));

        assert_eq!(
            state,
            ClockState::OutOfRange {
                has_open_record: false,
                location_known: true
            }
        );
        assert_eq!(state.available_action(), None);
        assert_eq!(state.clock_in_blocked_message(), Some(messages::out_of_range()));
    }

    #[test]
    fn test_out_of_range_still_offers_clock_out() {
        let svc = service(None);
        let open = record(Some(start()), None);
        let state = evaluate(&inputs(start(), Some(&svc), Some(&open), out_of_range()));

        assert_eq!(state.available_action(), Some(ClockAction::ClockOut));
    }

    #[test]
    fn test_unknown_location_is_reported_as_unknown() {
        let svc = service(None);
        let state = evaluate(&inputs(start(), Some(&svc), None, RangeVerdict::unknown()));

        assert_eq!(
            state,
            ClockState::OutOfRange {
                has_open_record: false,
                location_known: false
            }
        );
        assert_eq!(state.clock_in_blocked_message(), Some(messages::location_unknown()));
    }

    #[test]
    fn test_clocked_out_flag_suppresses_clock_in() {
        let svc = service(None);
        let mut input = inputs(start(), Some(&svc), None, in_range());
        input.clocked_out = true;

        assert_eq!(evaluate(&input), ClockState::ClockedOut);
    }

    #[test]
    fn test_record_for_another_service_is_ignored() {
        let svc = service(None);
        let mut other = record(Some(start()), Some(start()));
        other.service_id = Uuid::from_u128(99);

        let state = evaluate(&inputs(start(), Some(&svc), Some(&other), in_range()));
        assert_eq!(state, ClockState::EligibleToClockIn);
    }

    #[test]
    fn test_select_record_prefers_open_row() {
        let closed = record(Some(start()), Some(start() + Duration::hours(1)));
        let mut open = record(Some(start() + Duration::hours(2)), None);
        open.id = Uuid::from_u128(11);

        let rows = vec![closed, open.clone()];
        assert_eq!(select_record(&rows, Uuid::from_u128(1)), Some(&open));
        assert_eq!(select_record(&rows, Uuid::from_u128(2)), None);
    }

    #[test]
    fn test_select_record_falls_back_to_latest_clock_in() {
        let earlier = record(Some(start()), Some(start() + Duration::hours(1)));
        let mut later = record(Some(start() + Duration::hours(2)), Some(start() + Duration::hours(3)));
        later.id = Uuid::from_u128(12);

        let rows = vec![later.clone(), earlier];
        assert_eq!(select_record(&rows, Uuid::from_u128(1)), Some(&later));
    }

    #[test]
    fn test_reset_rule() {
        assert!(should_reset_clocked_out(None));
        assert!(should_reset_clocked_out(Some(&record(None, None))));
        assert!(!should_reset_clocked_out(Some(&record(Some(start()), None))));
        assert!(!should_reset_clocked_out(Some(&record(Some(start()), Some(start())))));
    }
}
