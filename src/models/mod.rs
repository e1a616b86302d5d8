// Core domain models
pub mod service_order;
pub mod supplier;
pub mod user;
pub mod vehicle;

pub use service_order::{
    Budget, Payment, PaymentStatus, ServiceOrder, ServiceOrderStatus,
};
pub use supplier::{Supplier, SupplierStatus};
pub use user::{User, UserProfile};
pub use vehicle::{FuelingHistoryItem, MaintenanceHistoryItem, Vehicle, VehicleStatus};
