//! # Fourier Server Library
//!
//! Wiring for the Fourier server binary: building the application from a
//! loaded configuration, logging setup, and startup output.

pub mod app;
pub mod startup;

pub use app::{build_app, App};
