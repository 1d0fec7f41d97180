//! Repository port consumed by the Scheduling Engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use campusops_core::{AppointmentId, RepositoryError, StudentId, TeacherId};

use crate::appointment::Appointment;

/// Persistence collaborator for appointments.
///
/// The engine assumes at least read-committed isolation from the backing
/// store. Note that `find_overlapping` followed by `save` is a check-then-act
/// sequence that this port does not serialize; see the service docs.
pub trait AppointmentRepository: Send + Sync {
    /// All SCHEDULED appointments of `teacher_id` whose `[start, end)` window
    /// intersects the given one under the half-open test. Cancelled and
    /// completed appointments never match.
    fn find_overlapping(
        &self,
        teacher_id: TeacherId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, RepositoryError>;

    fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError>;

    fn find_by_student(&self, student_id: StudentId) -> Result<Vec<Appointment>, RepositoryError>;

    /// Persist and return the stored row (audit stamps applied).
    fn save(&self, appointment: Appointment) -> Result<Appointment, RepositoryError>;
}

impl<R> AppointmentRepository for Arc<R>
where
    R: AppointmentRepository + ?Sized,
{
    fn find_overlapping(
        &self,
        teacher_id: TeacherId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        (**self).find_overlapping(teacher_id, start, end)
    }

    fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn find_by_student(&self, student_id: StudentId) -> Result<Vec<Appointment>, RepositoryError> {
        (**self).find_by_student(student_id)
    }

    fn save(&self, appointment: Appointment) -> Result<Appointment, RepositoryError> {
        (**self).save(appointment)
    }
}
