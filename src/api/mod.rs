//! API Module
//!
//! HTTP handlers and routing for inspecting and manipulating the shared store.
//!
//! # Endpoints
//! - `PUT /set` - Store a JSON value with optional TTL
//! - `GET /get/:key` - Retrieve a fresh value by key
//! - `DELETE /del/:key` - Delete a key
//! - `DELETE /clear` - Remove every entry
//! - `POST /purge` - Run one expiry sweep now
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
