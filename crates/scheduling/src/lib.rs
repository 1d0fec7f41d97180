//! `campusops-scheduling` — the Scheduling Engine.
//!
//! Owns the appointment lifecycle and the no-double-booking constraint:
//! among SCHEDULED appointments of one teacher, no two `[start, end)`
//! intervals may intersect. Intervals that merely touch at an endpoint are
//! not a conflict.

pub mod appointment;
pub mod ports;
pub mod service;

pub use appointment::{Appointment, AppointmentStatus};
pub use ports::AppointmentRepository;
pub use service::{
    APPOINTMENT_CANCELLED_TOPIC, APPOINTMENT_SCHEDULED_TOPIC, SchedulingError, SchedulingService,
};
