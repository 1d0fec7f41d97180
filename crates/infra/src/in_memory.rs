//! In-memory repository adapters.
//!
//! Intended for tests/dev. Not optimized for performance. Audit stamps are
//! applied here on save, never by the engines: `created_at` on the first
//! save of a row, `updated_at` on every save.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use campusops_core::{AppointmentId, Entity, InvoiceId, RepositoryError, StudentId, TeacherId};

use campusops_billing::{Invoice, InvoiceRepository};
use campusops_scheduling::{Appointment, AppointmentRepository, AppointmentStatus};

/// In-memory appointment store.
#[derive(Debug, Default)]
pub struct InMemoryAppointmentRepository {
    rows: RwLock<HashMap<AppointmentId, Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AppointmentRepository for InMemoryAppointmentRepository {
    fn find_overlapping(
        &self,
        teacher_id: TeacherId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

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
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(rows.get(&id).cloned())
    }

    fn find_by_student(&self, student_id: StudentId) -> Result<Vec<Appointment>, RepositoryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        Ok(rows
            .values()
            .filter(|a| a.student_id() == student_id)
            .cloned()
            .collect())
    }

    fn save(&self, mut appointment: Appointment) -> Result<Appointment, RepositoryError> {
        appointment.stamp(Utc::now());

        let mut rows = self
            .rows
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        rows.insert(*appointment.id(), appointment.clone());

        Ok(appointment)
    }
}

/// In-memory invoice store.
#[derive(Debug, Default)]
pub struct InMemoryInvoiceRepository {
    rows: RwLock<HashMap<InvoiceId, Invoice>>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InvoiceRepository for InMemoryInvoiceRepository {
    fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(rows.get(&id).cloned())
    }

    fn find_by_student(&self, student_id: StudentId) -> Result<Vec<Invoice>, RepositoryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        Ok(rows
            .values()
            .filter(|i| i.student_id() == student_id)
            .cloned()
            .collect())
    }

    fn find_all(&self) -> Result<Vec<Invoice>, RepositoryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(rows.values().cloned().collect())
    }

    fn save(&self, mut invoice: Invoice) -> Result<Invoice, RepositoryError> {
        invoice.stamp(Utc::now());

        let mut rows = self
            .rows
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        rows.insert(*invoice.id(), invoice.clone());

        Ok(invoice)
    }
}
