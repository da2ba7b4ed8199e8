//! Domain model for portal identities, sessions, notices and feature gates.
//!
//! # Responsibility
//! - Define canonical records persisted in the named collections.
//! - Keep credential material out of every session-shaped value.
//!
//! # Invariants
//! - Identity ids never contain `_` (the feature-lock key separator).
//! - The grade concept is stored only as `grade_level`.

pub mod collection;
pub mod credential;
pub mod feature;
pub mod identity;
pub mod notice;
pub mod role;
pub mod validation;
