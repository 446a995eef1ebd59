//! API Module
//!
//! HTTP handlers and routing for the badge server.
//!
//! # Endpoints
//! - `GET /:user/:repo.svg` - Word-count progress badge
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
