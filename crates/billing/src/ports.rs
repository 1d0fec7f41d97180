//! Repository port consumed by the Billing Engine.

use std::sync::Arc;

use campusops_core::{InvoiceId, RepositoryError, StudentId};

use crate::invoice::Invoice;

/// Persistence collaborator for invoices.
pub trait InvoiceRepository: Send + Sync {
    fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError>;

    fn find_by_student(&self, student_id: StudentId) -> Result<Vec<Invoice>, RepositoryError>;

    /// Every invoice, any status. The sweep scans this and filters itself.
    fn find_all(&self) -> Result<Vec<Invoice>, RepositoryError>;

    /// Persist and return the stored row (audit stamps applied).
    fn save(&self, invoice: Invoice) -> Result<Invoice, RepositoryError>;
}

impl<R> InvoiceRepository for Arc<R>
where
    R: InvoiceRepository + ?Sized,
{
    fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn find_by_student(&self, student_id: StudentId) -> Result<Vec<Invoice>, RepositoryError> {
        (**self).find_by_student(student_id)
    }

    fn find_all(&self) -> Result<Vec<Invoice>, RepositoryError> {
        (**self).find_all()
    }

    fn save(&self, invoice: Invoice) -> Result<Invoice, RepositoryError> {
        (**self).save(invoice)
    }
}
