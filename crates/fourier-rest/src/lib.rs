//! # Fourier REST
//!
//! Axum HTTP surface: the `/auth` routes, health probes and the OpenAPI
//! document. The access token travels in the `users_access_token` cookie.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
