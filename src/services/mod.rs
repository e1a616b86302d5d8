pub mod reports;
pub mod service_orders;
pub mod suppliers;
pub mod users;
pub mod vehicles;

use std::sync::Arc;

use crate::events::EventSender;
use crate::repositories::{
    InMemoryServiceOrderRepository, InMemorySupplierRepository, InMemoryUserRepository,
    InMemoryVehicleRepository, ServiceOrderRepository, SupplierRepository, UserRepository,
    VehicleRepository,
};

/// All application services, wired over shared stores.
#[derive(Clone)]
pub struct AppServices {
    pub service_orders: Arc<service_orders::ServiceOrderService>,
    pub vehicles: Arc<vehicles::VehicleService>,
    pub suppliers: Arc<suppliers::SupplierService>,
    pub users: Arc<users::UserService>,
    pub reports: Arc<reports::ReportService>,
}

impl AppServices {
    /// Builds the full service graph over fresh in-memory stores.
    pub fn new(event_sender: EventSender) -> Self {
        let order_repo: Arc<dyn ServiceOrderRepository> =
            Arc::new(InMemoryServiceOrderRepository::new());
        let vehicle_repo: Arc<dyn VehicleRepository> = Arc::new(InMemoryVehicleRepository::new());
        let supplier_repo: Arc<dyn SupplierRepository> =
            Arc::new(InMemorySupplierRepository::new());
        let user_repo: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());

        Self::with_repositories(order_repo, vehicle_repo, supplier_repo, user_repo, event_sender)
    }

    /// Wires the services over caller-provided stores; the seam a
    /// persistence-backed deployment would use.
    pub fn with_repositories(
        order_repo: Arc<dyn ServiceOrderRepository>,
        vehicle_repo: Arc<dyn VehicleRepository>,
        supplier_repo: Arc<dyn SupplierRepository>,
        user_repo: Arc<dyn UserRepository>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            service_orders: Arc::new(service_orders::ServiceOrderService::new(
                order_repo.clone(),
                vehicle_repo.clone(),
                supplier_repo.clone(),
                event_sender.clone(),
            )),
            vehicles: Arc::new(vehicles::VehicleService::new(
                vehicle_repo.clone(),
                event_sender.clone(),
            )),
            suppliers: Arc::new(suppliers::SupplierService::new(
                supplier_repo.clone(),
                event_sender.clone(),
            )),
            users: Arc::new(users::UserService::new(user_repo, event_sender)),
            reports: Arc::new(reports::ReportService::new(
                order_repo,
                vehicle_repo,
                supplier_repo,
            )),
        }
    }
}
