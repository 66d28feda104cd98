//! Battery inventory: CRUD and status management

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
