//! `campusops-billing` — the Billing Lifecycle Engine.
//!
//! Owns the invoice lifecycle (PENDING → PAID/OVERDUE/CANCELLED), payment,
//! and the daily late-penalty sweep. Amounts are in the smallest currency
//! unit (cents); the penalty is a simple, non-compound 10% of principal per
//! whole week late, computed once at the moment an invoice first becomes
//! overdue.

pub mod invoice;
pub mod ports;
pub mod service;

pub use invoice::{Invoice, InvoiceStatus};
pub use ports::InvoiceRepository;
pub use service::{
    BillingError, BillingService, INVOICE_CREATED_TOPIC, INVOICE_PAID_TOPIC,
    INVOICE_PENALTY_APPLIED_TOPIC,
};
