use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campusops_core::{AppointmentId, AuditStamp, Entity, StudentId, TeacherId};

/// Appointment status lifecycle.
///
/// `Completed` has no producing operation in this engine; it is written by
/// collaborators outside this core and only matters here because the overlap
/// query must ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
}

/// Entity: a student/teacher appointment over a half-open time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    id: AppointmentId,
    student_id: StudentId,
    teacher_id: TeacherId,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: AppointmentStatus,
    audit: AuditStamp,
}

impl Appointment {
    /// Build a new appointment in `Scheduled` state.
    ///
    /// The window is taken as given: `start >= end` is accepted without
    /// validation, matching the public contract. Such an interval is empty
    /// under the half-open overlap test and can never conflict.
    pub fn schedule(
        student_id: StudentId,
        teacher_id: TeacherId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AppointmentId::new(),
            student_id,
            teacher_id,
            start_time,
            end_time,
            status: AppointmentStatus::Scheduled,
            audit: AuditStamp::default(),
        }
    }

    /// Rehydrate from persisted parts. For repository adapters.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: AppointmentId,
        student_id: StudentId,
        teacher_id: TeacherId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        status: AppointmentStatus,
        audit: AuditStamp,
    ) -> Self {
        Self {
            id,
            student_id,
            teacher_id,
            start_time,
            end_time,
            status,
            audit,
        }
    }

    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    pub fn teacher_id(&self) -> TeacherId {
        self.teacher_id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    /// Half-open interval intersection: `[s1, e1)` meets `[s2, e2)` iff
    /// `s1 < e2 && s2 < e1`. Back-to-back windows sharing an endpoint do
    /// not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time
    }

    /// Unconditionally mark cancelled. There is no current-state guard:
    /// cancelling an already-cancelled or completed appointment succeeds.
    pub fn cancel(&mut self) {
        self.status = AppointmentStatus::Cancelled;
    }

    /// Record a save. Called by the persistence adapter, never by the engine.
    pub fn stamp(&mut self, now: DateTime<Utc>) {
        self.audit.touch(now);
    }
}

impl Entity for Appointment {
    type Id = AppointmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
