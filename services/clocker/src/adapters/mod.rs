pub mod attendance_api;
pub mod location;
pub mod notifier;

pub use attendance_api::HttpAttendanceAdapter;
pub use location::FixedLocationAdapter;
pub use notifier::TracingNotifier;
