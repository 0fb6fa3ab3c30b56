//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with the form page, download and health endpoints
//! - Form decoding into planner requests
//! - Request logging and CORS middleware

pub mod form;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
