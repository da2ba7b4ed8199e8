//! Repository layer over key-value storage areas.
//!
//! # Responsibility
//! - Own every storage key the portal uses.
//! - Turn JSON blobs into typed records and back.
//!
//! # Invariants
//! - Writes validate records before touching storage.
//! - Failed writes leave the stored blob unchanged.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateId`) in
//!   addition to storage transport errors.

pub mod feature_lock_repo;
pub mod record_store;
pub mod session_store;
