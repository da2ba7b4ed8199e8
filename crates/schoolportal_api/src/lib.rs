//! Thin use-case facade over `schoolportal_core` for UI callers.

pub mod api;

pub use api::{ApiResponse, FeatureStatus, PortalApi, RouteCheck};
