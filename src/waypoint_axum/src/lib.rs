//! Axum boundary for the Waypoint account core.
//!
//! The core exposes exactly two operations, register and authenticate,
//! as framework-agnostic use cases in `waypoint_application`. This crate
//! owns the HTTP shape only: request parsing into domain values, and the
//! mapping from use case errors onto stable status codes and bodies.

pub mod error;
pub mod routes;

pub use error::{ApiError, ErrorResponse};
pub use routes::{login, register};
