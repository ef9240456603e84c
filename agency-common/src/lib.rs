//! # Agency Common Library
//!
//! Shared code for the agency management backend:
//! - Database schema and initialization
//! - Document type, reference formatting and status state machine
//! - Role / capability tables
//! - Reporting period helpers
//! - Configuration loading

pub mod config;
pub mod db;
pub mod documents;
pub mod error;
pub mod period;
pub mod roles;
pub mod time;

pub use documents::{DocumentStatus, DocumentType};
pub use error::{Error, Result};
pub use period::Period;
pub use roles::{Capability, Role};
