//! `campusops-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::{AuditStamp, Entity};
pub use error::{DomainError, RepositoryError};
pub use id::{AppointmentId, InvoiceId, StudentId, TeacherId};
pub use value_object::ValueObject;
