//! Scheduling Engine service.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info};

use campusops_core::{AppointmentId, Entity, RepositoryError, StudentId, TeacherId};
use campusops_events::{EventPublisher, PublishError};

use crate::appointment::Appointment;
use crate::ports::AppointmentRepository;

/// Topic for appointments entering `Scheduled`.
pub const APPOINTMENT_SCHEDULED_TOPIC: &str = "appointment.scheduled";
/// Topic for appointments entering `Cancelled`.
pub const APPOINTMENT_CANCELLED_TOPIC: &str = "appointment.cancelled";

/// Failure kinds surfaced by the Scheduling Engine.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// The teacher already has a SCHEDULED appointment intersecting the
    /// requested window.
    #[error("teacher already has an appointment during this time")]
    Conflict,

    #[error("appointment not found: {0}")]
    NotFound(AppointmentId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The appointment row was already committed when emission failed; the
    /// write is not rolled back.
    #[error("appointment notification failed: {0}")]
    Publish(#[from] PublishError),
}

/// Owns the appointment lifecycle and the no-double-booking constraint.
///
/// Constructed with its repository and publisher collaborators; substitute
/// in-memory fakes in tests (ports-and-adapters).
///
/// Known correctness gap, kept deliberately: `schedule` reads the overlap set
/// and inserts in two separate repository calls with no lock or exclusion
/// constraint between them. Two concurrent calls for the same teacher and
/// intersecting windows can both pass the check and double-book. Hardening
/// would need an exclusion constraint on (teacher, interval) or serialized
/// writes in the backing store.
pub struct SchedulingService<R, P> {
    repository: R,
    publisher: P,
}

impl<R, P> SchedulingService<R, P>
where
    R: AppointmentRepository,
    P: EventPublisher,
{
    pub fn new(repository: R, publisher: P) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    /// Book `[start, end)` with `teacher_id` for `student_id`.
    ///
    /// Fails with [`SchedulingError::Conflict`] before any write if the
    /// teacher has an intersecting SCHEDULED appointment; touching endpoints
    /// are not a conflict. On success the row is persisted first and
    /// `appointment.scheduled` is emitted second; a publish failure surfaces
    /// to the caller with the row already committed.
    pub fn schedule(
        &self,
        student_id: StudentId,
        teacher_id: TeacherId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        let overlapping = self.repository.find_overlapping(teacher_id, start, end)?;
        if !overlapping.is_empty() {
            return Err(SchedulingError::Conflict);
        }

        let appointment = Appointment::schedule(student_id, teacher_id, start, end);
        let saved = self.repository.save(appointment)?;

        let body =
            format!("Appointment scheduled for student {student_id} with teacher {teacher_id}");
        if let Err(err) = self.publisher.publish(APPOINTMENT_SCHEDULED_TOPIC, &body) {
            error!(
                appointment_id = %saved.id(),
                error = %err,
                "appointment persisted but notification event failed"
            );
            return Err(err.into());
        }

        info!(appointment_id = %saved.id(), %teacher_id, "appointment scheduled");
        Ok(saved)
    }

    /// Cancel an appointment by id.
    ///
    /// No current-state guard: cancelling an already-cancelled or completed
    /// appointment succeeds, re-persists, and re-emits the cancellation
    /// event (idempotent from the caller's point of view).
    pub fn cancel(&self, id: AppointmentId) -> Result<Appointment, SchedulingError> {
        let mut appointment = self
            .repository
            .find_by_id(id)?
            .ok_or(SchedulingError::NotFound(id))?;

        appointment.cancel();
        let saved = self.repository.save(appointment)?;

        let body = format!("Appointment cancelled: {id}");
        if let Err(err) = self.publisher.publish(APPOINTMENT_CANCELLED_TOPIC, &body) {
            error!(
                appointment_id = %id,
                error = %err,
                "cancellation persisted but notification event failed"
            );
            return Err(err.into());
        }

        info!(appointment_id = %id, "appointment cancelled");
        Ok(saved)
    }

    /// Pure read: every appointment of the student, any status. No event.
    pub fn student_appointments(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(self.repository.find_by_student(student_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;

    use campusops_events::InMemoryEventBus;

    use crate::appointment::AppointmentStatus;

    #[derive(Default)]
    struct FakeAppointments {
        rows: Mutex<HashMap<AppointmentId, Appointment>>,
    }

    impl FakeAppointments {
        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        fn get(&self, id: AppointmentId) -> Option<Appointment> {
            self.rows.lock().unwrap().get(&id).cloned()
        }

        fn insert(&self, appointment: Appointment) {
            let mut rows = self.rows.lock().unwrap();
            rows.insert(*appointment.id(), appointment);
        }
    }

    impl AppointmentRepository for FakeAppointments {
        fn find_overlapping(
            &self,
            teacher_id: TeacherId,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<Appointment>, RepositoryError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .values()
                .filter(|a| {
                    a.teacher_id() == teacher_id
                        && a.status() == AppointmentStatus::Scheduled
                        && a.overlaps(start, end)
                })
                .cloned()
                .collect())
        }

        fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        fn find_by_student(
            &self,
            student_id: StudentId,
        ) -> Result<Vec<Appointment>, RepositoryError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .values()
                .filter(|a| a.student_id() == student_id)
                .cloned()
                .collect())
        }

        fn save(&self, appointment: Appointment) -> Result<Appointment, RepositoryError> {
            self.insert(appointment.clone());
            Ok(appointment)
        }
    }

    struct FailingPublisher;

    impl EventPublisher for FailingPublisher {
        fn publish(&self, _topic: &str, _body: &str) -> Result<(), PublishError> {
            Err(PublishError::Broker("broker down".to_string()))
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 12, hour, minute, 0).unwrap()
    }

    fn service() -> (
        SchedulingService<Arc<FakeAppointments>, Arc<InMemoryEventBus>>,
        Arc<FakeAppointments>,
        Arc<InMemoryEventBus>,
    ) {
        let repo = Arc::new(FakeAppointments::default());
        let bus = Arc::new(InMemoryEventBus::new());
        let svc = SchedulingService::new(repo.clone(), bus.clone());
        (svc, repo, bus)
    }

    #[test]
    fn schedule_persists_and_emits() {
        let (svc, repo, bus) = service();
        let sub = bus.subscribe();
        let student = StudentId::new();
        let teacher = TeacherId::new();

        let appt = svc.schedule(student, teacher, at(10, 0), at(11, 0)).unwrap();
        assert_eq!(appt.status(), AppointmentStatus::Scheduled);
        assert_eq!(repo.len(), 1);

        let msg = sub.try_recv().unwrap();
        assert_eq!(msg.topic, APPOINTMENT_SCHEDULED_TOPIC);
        assert!(msg.body.contains(&student.to_string()));
        assert!(msg.body.contains(&teacher.to_string()));
    }

    #[test]
    fn overlapping_window_conflicts_and_persists_nothing() {
        let (svc, repo, bus) = service();
        let sub = bus.subscribe();
        let teacher = TeacherId::new();

        svc.schedule(StudentId::new(), teacher, at(10, 0), at(11, 0))
            .unwrap();

        let err = svc
            .schedule(StudentId::new(), teacher, at(10, 30), at(11, 30))
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Conflict));

        // Only the first row exists and only its event went out.
        assert_eq!(repo.len(), 1);
        assert_eq!(sub.drain().len(), 1);
    }

    #[test]
    fn back_to_back_windows_are_not_a_conflict() {
        let (svc, repo, _bus) = service();
        let teacher = TeacherId::new();

        svc.schedule(StudentId::new(), teacher, at(10, 0), at(11, 0))
            .unwrap();
        svc.schedule(StudentId::new(), teacher, at(11, 0), at(12, 0))
            .unwrap();

        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn same_window_with_another_teacher_is_fine() {
        let (svc, repo, _bus) = service();

        svc.schedule(StudentId::new(), TeacherId::new(), at(10, 0), at(11, 0))
            .unwrap();
        svc.schedule(StudentId::new(), TeacherId::new(), at(10, 0), at(11, 0))
            .unwrap();

        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn cancelled_appointment_frees_the_window() {
        let (svc, _repo, _bus) = service();
        let teacher = TeacherId::new();

        let appt = svc
            .schedule(StudentId::new(), teacher, at(10, 0), at(11, 0))
            .unwrap();
        svc.cancel(*appt.id()).unwrap();

        // The window is bookable again.
        svc.schedule(StudentId::new(), teacher, at(10, 0), at(11, 0))
            .unwrap();
    }

    #[test]
    fn cancel_unknown_appointment_is_not_found() {
        let (svc, _repo, _bus) = service();
        let id = AppointmentId::new();

        let err = svc.cancel(id).unwrap_err();
        match err {
            SchedulingError::NotFound(missing) => assert_eq!(missing, id),
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn cancel_is_idempotent_and_re_emits() {
        let (svc, _repo, bus) = service();
        let sub = bus.subscribe();

        let appt = svc
            .schedule(StudentId::new(), TeacherId::new(), at(10, 0), at(11, 0))
            .unwrap();
        svc.cancel(*appt.id()).unwrap();
        let again = svc.cancel(*appt.id()).unwrap();
        assert_eq!(again.status(), AppointmentStatus::Cancelled);

        let topics: Vec<String> = sub.drain().into_iter().map(|m| m.topic).collect();
        assert_eq!(
            topics,
            vec![
                APPOINTMENT_SCHEDULED_TOPIC.to_string(),
                APPOINTMENT_CANCELLED_TOPIC.to_string(),
                APPOINTMENT_CANCELLED_TOPIC.to_string(),
            ]
        );
    }

    #[test]
    fn publish_failure_surfaces_but_row_stays_committed() {
        let repo = Arc::new(FakeAppointments::default());
        let svc = SchedulingService::new(repo.clone(), FailingPublisher);

        let err = svc
            .schedule(StudentId::new(), TeacherId::new(), at(10, 0), at(11, 0))
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Publish(_)));

        // The write is not rolled back: domain state is authoritative.
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn publish_failure_on_cancel_keeps_the_cancellation() {
        let repo = Arc::new(FakeAppointments::default());
        let appt = Appointment::schedule(StudentId::new(), TeacherId::new(), at(10, 0), at(11, 0));
        let id = *appt.id();
        repo.insert(appt);

        let svc = SchedulingService::new(repo.clone(), FailingPublisher);
        let err = svc.cancel(id).unwrap_err();
        assert!(matches!(err, SchedulingError::Publish(_)));
        assert_eq!(
            repo.get(id).unwrap().status(),
            AppointmentStatus::Cancelled
        );
    }

    #[test]
    fn student_appointments_reads_without_events() {
        let (svc, _repo, bus) = service();
        let sub = bus.subscribe();
        let student = StudentId::new();

        svc.schedule(student, TeacherId::new(), at(9, 0), at(10, 0))
            .unwrap();
        svc.schedule(student, TeacherId::new(), at(10, 0), at(11, 0))
            .unwrap();
        svc.schedule(StudentId::new(), TeacherId::new(), at(9, 0), at(10, 0))
            .unwrap();
        sub.drain();

        let mine = svc.student_appointments(student).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|a| a.student_id() == student));
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn inverted_window_is_accepted_and_never_blocks() {
        let (svc, repo, _bus) = service();
        let teacher = TeacherId::new();

        // start >= end is not validated; the row is stored as given.
        svc.schedule(StudentId::new(), teacher, at(11, 0), at(10, 0))
            .unwrap();
        assert_eq!(repo.len(), 1);

        // An empty interval conflicts with nothing.
        svc.schedule(StudentId::new(), teacher, at(10, 0), at(11, 0))
            .unwrap();
        assert_eq!(repo.len(), 2);
    }
}
