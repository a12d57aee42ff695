//! Data Transfer Objects (DTOs).

mod auth_dto;

pub use auth_dto::*;
