use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::service_order::{ServiceOrder, ServiceOrderStatus};

#[async_trait]
pub trait ServiceOrderRepository: Send + Sync {
    async fn insert(&self, order: ServiceOrder) -> Result<ServiceOrder, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceOrder>, ServiceError>;
    /// Replaces the stored order. Errors with `NotFound` when absent.
    async fn save(&self, order: ServiceOrder) -> Result<ServiceOrder, ServiceError>;
    /// All orders, sorted by request date.
    async fn list(&self) -> Result<Vec<ServiceOrder>, ServiceError>;
    async fn list_by_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<ServiceOrder>, ServiceError>;
    async fn list_by_status(
        &self,
        status: ServiceOrderStatus,
    ) -> Result<Vec<ServiceOrder>, ServiceError>;
}

#[derive(Debug, Default)]
pub struct InMemoryServiceOrderRepository {
    orders: DashMap<Uuid, ServiceOrder>,
}

impl InMemoryServiceOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(&self, mut orders: Vec<ServiceOrder>) -> Vec<ServiceOrder> {
        orders.sort_by_key(|o| o.request_date);
        orders
    }
}

#[async_trait]
impl ServiceOrderRepository for InMemoryServiceOrderRepository {
    async fn insert(&self, order: ServiceOrder) -> Result<ServiceOrder, ServiceError> {
        if self.orders.contains_key(&order.id) {
            return Err(ServiceError::InvalidOperation(format!(
                "Service order {} already exists",
                order.id
            )));
        }
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceOrder>, ServiceError> {
        Ok(self.orders.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, order: ServiceOrder) -> Result<ServiceOrder, ServiceError> {
        if !self.orders.contains_key(&order.id) {
            return Err(ServiceError::order_not_found(order.id));
        }
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn list(&self) -> Result<Vec<ServiceOrder>, ServiceError> {
        let orders = self.orders.iter().map(|e| e.value().clone()).collect();
        Ok(self.sorted(orders))
    }

    async fn list_by_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<ServiceOrder>, ServiceError> {
        let orders = self
            .orders
            .iter()
            .filter(|e| e.value().vehicle_id == vehicle_id)
            .map(|e| e.value().clone())
            .collect();
        Ok(self.sorted(orders))
    }

    async fn list_by_status(
        &self,
        status: ServiceOrderStatus,
    ) -> Result<Vec<ServiceOrder>, ServiceError> {
        let orders = self
            .orders
            .iter()
            .filter(|e| e.value().status == status)
            .map(|e| e.value().clone())
            .collect();
        Ok(self.sorted(orders))
    }
}
