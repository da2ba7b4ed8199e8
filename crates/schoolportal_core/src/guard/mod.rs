//! Route-entry and feature-page access decisions.
//!
//! Both guards read their backing store on every call. Nothing is cached
//! between navigations, since the session or lock map can change in between.

pub mod access_guard;
pub mod feature_gate;
