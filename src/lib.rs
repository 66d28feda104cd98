//! # Battery rental
//!
//! Back office for a shop that rents out batteries: inventory, customers,
//! rentals, payments, customer credit ratings and a dashboard.
//!
//! ## Architecture
//!
//! - **domain**: entities, repository contracts and credit scoring
//! - **application**: use cases (rental lifecycle, payment ledger, ...)
//! - **infrastructure**: SeaORM persistence, in-memory storage, JWT
//! - **interfaces**: REST API with Swagger documentation
//! - **config** / **server**: TOML configuration and runtime

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use application::AppServices;
pub use config::{default_config_path, AppConfig};
pub use infrastructure::database::repositories::SeaOrmRepositoryProvider;
pub use infrastructure::{init_database, DatabaseConfig, InMemoryRepositoryProvider, JwtConfig};
pub use interfaces::create_api_router;
