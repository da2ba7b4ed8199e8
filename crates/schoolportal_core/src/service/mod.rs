//! Portal use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into login, session and notice use-cases.
//! - Enforce role permissions for mutating actions.
//!
//! # Invariants
//! - Services never touch storage keys directly; they go through the stores.
//! - Credentials and passwords never appear in logs or returned values.

pub mod auth_service;
pub mod notice_feed;
pub mod notice_service;
