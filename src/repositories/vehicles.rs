use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::vehicle::Vehicle;

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn insert(&self, vehicle: Vehicle) -> Result<Vehicle, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, ServiceError>;
    async fn save(&self, vehicle: Vehicle) -> Result<Vehicle, ServiceError>;
    /// All vehicles, sorted by license plate.
    async fn list(&self) -> Result<Vec<Vehicle>, ServiceError>;
}

#[derive(Debug, Default)]
pub struct InMemoryVehicleRepository {
    vehicles: DashMap<Uuid, Vehicle>,
}

impl InMemoryVehicleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VehicleRepository for InMemoryVehicleRepository {
    async fn insert(&self, vehicle: Vehicle) -> Result<Vehicle, ServiceError> {
        if self.vehicles.contains_key(&vehicle.id) {
            return Err(ServiceError::InvalidOperation(format!(
                "Vehicle {} already exists",
                vehicle.id
            )));
        }
        self.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, ServiceError> {
        Ok(self.vehicles.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, vehicle: Vehicle) -> Result<Vehicle, ServiceError> {
        if !self.vehicles.contains_key(&vehicle.id) {
            return Err(ServiceError::vehicle_not_found(vehicle.id));
        }
        self.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn list(&self) -> Result<Vec<Vehicle>, ServiceError> {
        let mut vehicles: Vec<Vehicle> =
            self.vehicles.iter().map(|e| e.value().clone()).collect();
        vehicles.sort_by(|a, b| a.license_plate.cmp(&b.license_plate));
        Ok(vehicles)
    }
}
