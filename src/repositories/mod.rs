//! Injected stores. One trait per aggregate, so the lifecycle logic never
//! depends on a concrete backend; the in-memory implementations here are
//! process-lifetime maps keyed by id.

pub mod service_orders;
pub mod suppliers;
pub mod users;
pub mod vehicles;

pub use service_orders::{InMemoryServiceOrderRepository, ServiceOrderRepository};
pub use suppliers::{InMemorySupplierRepository, SupplierRepository};
pub use users::{InMemoryUserRepository, UserRepository};
pub use vehicles::{InMemoryVehicleRepository, VehicleRepository};
