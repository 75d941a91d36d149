//! crates/clocker_core/src/range.rs
//!
//! Turns a device position and a campus radius into an "in range" verdict.

use crate::domain::{CampusCoordinate, GeoCoordinate};
use crate::geo::distance_meters;

/// The outcome of a range evaluation.
///
/// `is_in_range` is `None` while either position is still unknown; callers must
/// not read that as "out of range".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeVerdict {
    pub is_in_range: Option<bool>,
    /// Meters, or `f64::INFINITY` when no distance could be computed.
    pub distance: f64,
}

impl RangeVerdict {
    /// The sentinel returned while a position is missing.
    pub fn unknown() -> Self {
        Self {
            is_in_range: None,
            distance: f64::INFINITY,
        }
    }

    fn out_of_range() -> Self {
        Self {
            is_in_range: Some(false),
            distance: f64::INFINITY,
        }
    }

    pub fn is_in_range(&self) -> bool {
        self.is_in_range == Some(true)
    }

    pub fn is_known(&self) -> bool {
        self.is_in_range.is_some()
    }
}

/// Evaluates whether a device is within `range_to_clock_in` meters of a campus.
///
/// Pure: the verdict depends only on the arguments. The boundary is inclusive.
pub fn evaluate_range(
    device: Option<&GeoCoordinate>,
    campus: Option<&CampusCoordinate>,
    range_to_clock_in: f64,
) -> RangeVerdict {
    let (Some(device), Some(campus)) = (device, campus) else {
        return RangeVerdict::unknown();
    };

    let distance = distance_meters(device, campus);
    if !distance.is_finite() {
        return RangeVerdict::out_of_range();
    }

    // A non-finite or negative radius never admits anyone.
    let radius_usable = range_to_clock_in.is_finite() && range_to_clock_in >= 0.0;
    RangeVerdict {
        is_in_range: Some(radius_usable && distance <= range_to_clock_in),
        distance,
    }
}
