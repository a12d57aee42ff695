//! # Fourier Core
//!
//! Core types, domain entities, and error definitions shared by every layer
//! of the Fourier auth backend.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod result;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use pagination::*;
pub use result::*;
pub use validation::*;
