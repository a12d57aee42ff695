//! Role checks.

mod guard;

pub use guard::*;
