//! Billing Engine service.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{error, info};

use campusops_core::{DomainError, Entity, InvoiceId, RepositoryError, StudentId};
use campusops_events::{EventPublisher, PublishError};

use crate::invoice::{Invoice, InvoiceStatus};
use crate::ports::InvoiceRepository;

/// Topic for invoices entering `Pending`.
pub const INVOICE_CREATED_TOPIC: &str = "invoice.created";
/// Topic for invoices entering `Paid`.
pub const INVOICE_PAID_TOPIC: &str = "invoice.paid";
/// Topic for invoices promoted to `Overdue` by the sweep.
pub const INVOICE_PENALTY_APPLIED_TOPIC: &str = "invoice.penalty_applied";

/// Failure kinds surfaced by the Billing Engine.
#[derive(Debug, Error)]
pub enum BillingError {
    /// The invoice amount was absent or not strictly positive.
    #[error("invoice amount must be present and positive")]
    InvalidAmount,

    #[error("invoice not found: {0}")]
    NotFound(InvoiceId),

    /// Only a PAID invoice rejects payment; PENDING, OVERDUE, and CANCELLED
    /// invoices are all payable.
    #[error("invoice already paid: {0}")]
    AlreadyPaid(InvoiceId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// For single operations the write was already committed when emission
    /// failed. Inside the sweep this additionally rolls back the run's
    /// staged writes.
    #[error("billing notification failed: {0}")]
    Publish(#[from] PublishError),
}

/// Owns the invoice lifecycle, payment, and the late-penalty sweep.
///
/// Constructed with its repository and publisher collaborators; substitute
/// in-memory fakes in tests (ports-and-adapters).
pub struct BillingService<R, P> {
    repository: R,
    publisher: P,
}

impl<R, P> BillingService<R, P>
where
    R: InvoiceRepository,
    P: EventPublisher,
{
    pub fn new(repository: R, publisher: P) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    /// Create a PENDING invoice.
    ///
    /// Fails with [`BillingError::InvalidAmount`] before any write if the
    /// amount is absent or zero. On success the row is persisted first and
    /// `invoice.created` is emitted second; a publish failure surfaces with
    /// the row already committed.
    pub fn create_invoice(
        &self,
        student_id: StudentId,
        amount_cents: Option<u64>,
        due_date: NaiveDate,
    ) -> Result<Invoice, BillingError> {
        let amount = match amount_cents {
            Some(amount) if amount > 0 => amount,
            _ => return Err(BillingError::InvalidAmount),
        };

        let invoice = Invoice::create(student_id, amount, due_date);
        let saved = self.repository.save(invoice)?;

        let body = format!("Invoice created for student {student_id}, amount {amount} cents");
        if let Err(err) = self.publisher.publish(INVOICE_CREATED_TOPIC, &body) {
            error!(
                invoice_id = %saved.id(),
                error = %err,
                "invoice persisted but notification event failed"
            );
            return Err(err.into());
        }

        info!(invoice_id = %saved.id(), %student_id, "invoice created");
        Ok(saved)
    }

    /// Pay an invoice by id.
    ///
    /// Rejects only PAID → PAID with [`BillingError::AlreadyPaid`]; any
    /// other status transitions to PAID, leaving an existing penalty on the
    /// record untouched.
    pub fn pay_invoice(&self, id: InvoiceId) -> Result<Invoice, BillingError> {
        let mut invoice = self
            .repository
            .find_by_id(id)?
            .ok_or(BillingError::NotFound(id))?;

        if invoice.status() == InvoiceStatus::Paid {
            return Err(BillingError::AlreadyPaid(id));
        }

        invoice.mark_paid();
        let saved = self.repository.save(invoice)?;

        let body = format!("Invoice paid: {id}");
        if let Err(err) = self.publisher.publish(INVOICE_PAID_TOPIC, &body) {
            error!(
                invoice_id = %id,
                error = %err,
                "payment persisted but notification event failed"
            );
            return Err(err.into());
        }

        info!(invoice_id = %id, "invoice paid");
        Ok(saved)
    }

    /// Pure read: every invoice of the student, any status. No event.
    pub fn student_invoices(&self, student_id: StudentId) -> Result<Vec<Invoice>, BillingError> {
        Ok(self.repository.find_by_student(student_id)?)
    }

    /// The daily sweep: promote past-due PENDING invoices to OVERDUE and
    /// apply the one-time late penalty. Returns how many were promoted.
    ///
    /// `today` comes from the external timer driving the sweep; the batch
    /// assumes nothing about its invocation cadence beyond "at most once
    /// concurrently".
    ///
    /// The whole run is one transaction. Updated rows are staged while
    /// iterating (the stage is the in-transaction `save`) and committed only
    /// after every iteration succeeded. If publishing fails at invoice N the
    /// run aborts: invoice N and every staged predecessor are discarded and
    /// stay PENDING for the next run. Events already emitted for
    /// predecessors stay emitted - broker sends are not transactional.
    ///
    /// Because the guard is PENDING-only, an invoice that crossed into
    /// OVERDUE with zero penalty (1-6 days late) is never revisited by later
    /// runs; its penalty remains permanently unset. That is the documented
    /// behavior, not an oversight to fix here.
    pub fn apply_late_penalties(&self, today: NaiveDate) -> Result<u32, BillingError> {
        let invoices = self.repository.find_all()?;

        let mut staged: Vec<Invoice> = Vec::new();
        for mut invoice in invoices {
            if invoice.status() != InvoiceStatus::Pending || invoice.due_date() >= today {
                continue;
            }

            invoice.mark_overdue(today)?;
            let body = format!("Penalty applied to invoice: {}", invoice.id());
            staged.push(invoice);

            if let Err(err) = self.publisher.publish(INVOICE_PENALTY_APPLIED_TOPIC, &body) {
                error!(
                    error = %err,
                    discarded = staged.len(),
                    "late-penalty sweep aborted; staged updates discarded"
                );
                return Err(err.into());
            }
        }

        let promoted = staged.len() as u32;
        for invoice in staged {
            self.repository.save(invoice)?;
        }

        if promoted > 0 {
            info!(promoted, "late-penalty sweep promoted overdue invoices");
        }
        Ok(promoted)
    }
}
