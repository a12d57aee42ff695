//! Domain entities persisted by the repository layer.

mod role;
mod user;

pub use role::*;
pub use user::*;
