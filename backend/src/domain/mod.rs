//! Domain primitives, services, and ports.
//!
//! Purpose: define strongly typed entities and use-cases that the inbound and
//! outbound adapters translate to and from. Nothing in this module knows about
//! HTTP status codes or SQL.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, NewUser, PublicUser: credential records and their outward form.
//! - LoginCredentials: validated email/password pair.
//! - Action, ActionEnvelope, ResponseEnvelope: broker envelopes.
//! - CredentialService, ActionRouter: the two use-case implementations.

pub mod action;
pub mod audit;
pub mod auth;
pub mod broker;
pub mod credential_service;
pub mod error;
pub mod password;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::action::{
    Action, ActionDecodeError, ActionEnvelope, AuthPayload, LogPayload, ResponseEnvelope,
};
pub use self::audit::{AuditDispatcher, DEFAULT_AUDIT_TIMEOUT, LogEntry};
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::broker::ActionRouter;
pub use self::credential_service::CredentialService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::password::{PasswordHash, PasswordHashError, hash_password, verify_password};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{EmailAddress, NewUser, PublicUser, User, UserId, UserValidationError};
