//! Response models for the badge server API
//!
//! DTOs serialized into the JSON bodies of the non-badge endpoints.

pub mod responses;

// Re-export commonly used types
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
