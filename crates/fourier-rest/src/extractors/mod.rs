//! Custom Axum extractors.

mod cookie;
mod validated;

pub use cookie::*;
pub use validated::*;
