//! Customer registry and credit rating

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
