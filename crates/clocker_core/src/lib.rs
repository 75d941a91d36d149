pub mod clock;
pub mod domain;
pub mod geo;
pub mod ports;
pub mod range;

pub use clock::{evaluate, ClockAction, ClockInputs, ClockState};
pub use domain::{
    AttendanceQuery, AttendanceRecord, CampusCoordinate, ClockInPayload, GeoCoordinate,
    Notification, NotificationStatus, PermissionStatus, RangeConfig, ServiceKind, ServiceWindow,
    WorkerIdentity,
};
pub use geo::{distance_meters, EARTH_RADIUS_METERS};
pub use ports::{AttendanceService, LocationService, NotificationSink, PortError, PortResult};
pub use range::{evaluate_range, RangeVerdict};
