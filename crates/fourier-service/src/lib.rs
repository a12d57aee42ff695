//! # Fourier Service
//!
//! Registration, login and current-user resolution on top of the
//! repository and security crates.

pub mod auth_service;
pub mod dto;

pub use auth_service::*;
pub use dto::*;
