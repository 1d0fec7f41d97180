//! `campusops-infra` — infrastructure adapters for the domain ports.
//!
//! Currently in-memory only: enough to run the engines in tests and dev
//! setups. Durable adapters plug in behind the same repository traits.

pub mod in_memory;


pub use in_memory::{InMemoryAppointmentRepository, InMemoryInvoiceRepository};
