//! Request middleware.
//!
//! `Trace` puts a request-scoped [`crate::domain::TraceId`] in task-local
//! storage for every handler and outbound call.

pub mod trace;

pub use trace::Trace;
