//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod battery_repository;
pub mod customer_repository;
pub mod payment_repository;
pub mod rental_repository;
pub mod repository_provider;

pub use battery_repository::SeaOrmBatteryRepository;
pub use customer_repository::SeaOrmCustomerRepository;
pub use payment_repository::SeaOrmPaymentRepository;
pub use rental_repository::SeaOrmRentalRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
