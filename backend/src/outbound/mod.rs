//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed credential store using Diesel ORM
//! - **capability**: HTTP client for downstream capabilities and the audit
//!   sink that rides on it
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod capability;
pub mod persistence;
