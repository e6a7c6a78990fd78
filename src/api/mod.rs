//! API Module
//!
//! HTTP handlers and routing for the speech service REST API.
//!
//! # Endpoints
//! - `POST /speak` - Get (or synthesize) audio for a text
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
