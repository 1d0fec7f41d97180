use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use campusops_core::{AuditStamp, DomainError, Entity, InvoiceId, StudentId};

/// Weekly late surcharge, percent of principal.
const WEEKLY_PENALTY_PERCENT: u64 = 10;

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

/// Entity: a student invoice.
///
/// `amount_cents` is validated strictly positive at creation and never
/// re-validated afterward. `penalty_cents` is absent until the sweep first
/// computes it and is never cleared or recomputed by this engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    student_id: StudentId,
    /// Principal in smallest currency unit (cents).
    amount_cents: u64,
    due_date: NaiveDate,
    penalty_cents: Option<u64>,
    status: InvoiceStatus,
    audit: AuditStamp,
}

impl Invoice {
    /// Build a new invoice in `Pending` state. The amount must already have
    /// passed the service-boundary validation.
    pub fn create(student_id: StudentId, amount_cents: u64, due_date: NaiveDate) -> Self {
        Self {
            id: InvoiceId::new(),
            student_id,
            amount_cents,
            due_date,
            penalty_cents: None,
            status: InvoiceStatus::Pending,
            audit: AuditStamp::default(),
        }
    }

    /// Rehydrate from persisted parts. For repository adapters.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: InvoiceId,
        student_id: StudentId,
        amount_cents: u64,
        due_date: NaiveDate,
        penalty_cents: Option<u64>,
        status: InvoiceStatus,
        audit: AuditStamp,
    ) -> Self {
        Self {
            id,
            student_id,
            amount_cents,
            due_date,
            penalty_cents,
            status,
            audit,
        }
    }

    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    pub fn amount_cents(&self) -> u64 {
        self.amount_cents
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn penalty_cents(&self) -> Option<u64> {
        self.penalty_cents
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    /// Mark paid. Any penalty already on the record stays untouched.
    pub fn mark_paid(&mut self) {
        self.status = InvoiceStatus::Paid;
    }

    /// Promote a past-due invoice to `Overdue`, computing the one-time late
    /// penalty from `today`.
    ///
    /// `weeks_late` truncates to whole weeks. Overdue by 1-6 days means zero
    /// whole weeks: the invoice still becomes `Overdue` but the penalty is
    /// left unset - and because the sweep only ever looks at PENDING
    /// invoices, it will stay unset permanently.
    pub fn mark_overdue(&mut self, today: NaiveDate) -> Result<(), DomainError> {
        self.status = InvoiceStatus::Overdue;

        let weeks_late = (today - self.due_date).num_days() / 7;
        if weeks_late > 0 {
            self.penalty_cents = Some(late_penalty(self.amount_cents, weeks_late as u64)?);
        }

        Ok(())
    }

    /// Record a save. Called by the persistence adapter, never by the engine.
    pub fn stamp(&mut self, now: chrono::DateTime<chrono::Utc>) {
        self.audit.touch(now);
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Simple (non-compound) late penalty: `principal x 10% x weeks_late`,
/// truncated to whole cents.
fn late_penalty(amount_cents: u64, weeks_late: u64) -> Result<u64, DomainError> {
    amount_cents
        .checked_mul(WEEKLY_PENALTY_PERCENT)
        .and_then(|v| v.checked_mul(weeks_late))
        .map(|v| v / 100)
        .ok_or_else(|| DomainError::invariant("late penalty overflow"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pending(amount_cents: u64, due: NaiveDate) -> Invoice {
        Invoice::create(StudentId::new(), amount_cents, due)
    }

    #[test]
    fn create_starts_pending_without_penalty() {
        let invoice = pending(10_000, date(2025, 4, 1));
        assert_eq!(invoice.status(), InvoiceStatus::Pending);
        assert_eq!(invoice.penalty_cents(), None);
        assert_eq!(invoice.audit().created_at, None);
    }

    #[test]
    fn twenty_days_late_is_two_whole_weeks() {
        let mut invoice = pending(10_000, date(2025, 4, 1));
        invoice.mark_overdue(date(2025, 4, 21)).unwrap();

        assert_eq!(invoice.status(), InvoiceStatus::Overdue);
        // 100.00 x 0.10 x 2 = 20.00
        assert_eq!(invoice.penalty_cents(), Some(2_000));
    }

    #[test]
    fn under_a_week_late_becomes_overdue_with_no_penalty() {
        let mut invoice = pending(10_000, date(2025, 4, 1));
        invoice.mark_overdue(date(2025, 4, 4)).unwrap();

        assert_eq!(invoice.status(), InvoiceStatus::Overdue);
        assert_eq!(invoice.penalty_cents(), None);
    }

    #[test]
    fn exactly_seven_days_late_is_one_week() {
        let mut invoice = pending(5_000, date(2025, 4, 1));
        invoice.mark_overdue(date(2025, 4, 8)).unwrap();
        assert_eq!(invoice.penalty_cents(), Some(500));
    }

    #[test]
    fn penalty_truncates_sub_cent_fractions() {
        // 10.05 one week late: 1005 x 10 / 100 = 100.5 -> 100 cents.
        let mut invoice = pending(1_005, date(2025, 4, 1));
        invoice.mark_overdue(date(2025, 4, 8)).unwrap();
        assert_eq!(invoice.penalty_cents(), Some(100));
    }

    #[test]
    fn penalty_overflow_is_an_invariant_violation() {
        let mut invoice = pending(u64::MAX, date(2025, 4, 1));
        let err = invoice.mark_overdue(date(2025, 4, 8)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn mark_paid_leaves_penalty_untouched() {
        let mut invoice = pending(10_000, date(2025, 4, 1));
        invoice.mark_overdue(date(2025, 4, 21)).unwrap();
        invoice.mark_paid();

        assert_eq!(invoice.status(), InvoiceStatus::Paid);
        assert_eq!(invoice.penalty_cents(), Some(2_000));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&InvoiceStatus::Overdue).unwrap();
        assert_eq!(json, "\"overdue\"");
    }

    proptest! {
        #[test]
        fn penalty_is_simple_not_compound(
            amount in 1u64..100_000_000,
            weeks in 1u64..1_000,
        ) {
            let penalty = late_penalty(amount, weeks).unwrap();
            prop_assert_eq!(penalty, amount * 10 * weeks / 100);
        }

        #[test]
        fn penalty_grows_monotonically_with_weeks(
            amount in 100u64..100_000_000,
            weeks in 1u64..999,
        ) {
            let earlier = late_penalty(amount, weeks).unwrap();
            let later = late_penalty(amount, weeks + 1).unwrap();
            prop_assert!(later >= earlier);
        }

        #[test]
        fn days_late_under_seven_never_yield_a_penalty(
            amount in 1u64..100_000_000,
            days in 1i64..7,
        ) {
            let due = date(2025, 4, 1);
            let mut invoice = pending(amount, due);
            invoice.mark_overdue(due + chrono::Duration::days(days)).unwrap();
            prop_assert_eq!(invoice.penalty_cents(), None);
        }
    }
}
