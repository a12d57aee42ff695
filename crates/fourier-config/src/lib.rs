//! # Fourier Config
//!
//! Configuration management for the Fourier auth backend.
//! Supports layered configuration from files, `.env`, and environment
//! variables, with runtime refresh.

mod app_config;
mod loader;

pub use app_config::*;
pub use loader::*;
