//! Battery aggregate
//!
//! Contains the Battery entity, its status, and repository interface.

pub mod model;
pub mod repository;

pub use model::{Battery, BatteryStatus, BatteryUpdate};
pub use repository::BatteryRepository;
