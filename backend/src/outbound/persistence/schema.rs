//! Diesel table definitions for the PostgreSQL schema.
//!
//! The table is owned and migrated outside this service. Keep these
//! definitions aligned with it; `diesel print-schema` regenerates them from a
//! live database.

diesel::table! {
    /// Registered accounts. Soft-deleted rows stay in place with
    /// `deleted_at` set and `active` cleared.
    users (id) {
        /// Surrogate identity (serial).
        id -> Int4,
        /// Unique, case-sensitive login email.
        email -> Varchar,
        /// PHC-encoded Argon2id hash.
        password_hash -> Varchar,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}
