use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::vehicle::{FuelingHistoryItem, Vehicle, VehicleStatus};
use crate::repositories::VehicleRepository;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewVehicle {
    #[validate(length(min = 1, max = 100, message = "Make is required"))]
    pub make: String,
    #[validate(length(min = 1, max = 100, message = "Model is required"))]
    pub model: String,
    #[validate(range(min = 1950, max = 2100, message = "Year out of range"))]
    pub year: i32,
    pub color: String,
    #[validate(length(min = 1, max = 20, message = "License plate is required"))]
    pub license_plate: String,
    pub renavam: String,
    pub chassis_number: String,
    pub mileage: i64,
    #[serde(default)]
    pub initial_mileage: i64,
}

/// One fueling stop as captured at the pump. When `total_cost` is absent it
/// is computed as liters × price per liter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFuelingRecord {
    pub date: NaiveDate,
    pub fuel_type: String,
    pub liters: Decimal,
    pub price_per_liter: Decimal,
    pub total_cost: Option<Decimal>,
    pub mileage: i64,
    pub station_name: String,
}

/// Service for the vehicle registry. Maintenance history is written only by
/// the service-order lifecycle; this service owns everything else.
#[derive(Clone)]
pub struct VehicleService {
    vehicles: Arc<dyn VehicleRepository>,
    event_sender: EventSender,
}

impl VehicleService {
    pub fn new(vehicles: Arc<dyn VehicleRepository>, event_sender: EventSender) -> Self {
        Self {
            vehicles,
            event_sender,
        }
    }

    /// Registers a new vehicle, starting in the `Active` status with empty
    /// histories.
    #[instrument(skip(self, input), fields(license_plate = %input.license_plate))]
    pub async fn create_vehicle(&self, input: NewVehicle) -> Result<Vehicle, ServiceError> {
        input.validate()?;
        if input.mileage < 0 || input.initial_mileage < 0 {
            return Err(ServiceError::ValidationError(
                "Mileage cannot be negative".to_string(),
            ));
        }

        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            make: input.make,
            model: input.model,
            year: input.year,
            color: input.color,
            license_plate: input.license_plate,
            renavam: input.renavam,
            chassis_number: input.chassis_number,
            status: VehicleStatus::Active,
            mileage: input.mileage,
            initial_mileage: input.initial_mileage,
            maintenance_history: Vec::new(),
            fueling_history: Vec::new(),
        };
        let vehicle = self.vehicles.insert(vehicle).await?;

        info!(vehicle_id = %vehicle.id, "vehicle registered");
        self.publish(Event::VehicleRegistered(vehicle.id)).await?;
        Ok(vehicle)
    }

    pub async fn get_vehicle(&self, vehicle_id: Uuid) -> Result<Option<Vehicle>, ServiceError> {
        self.vehicles.find_by_id(vehicle_id).await
    }

    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, ServiceError> {
        self.vehicles.list().await
    }

    /// Replaces the registry fields of an existing vehicle. Histories are
    /// carried over unchanged.
    #[instrument(skip(self, vehicle), fields(vehicle_id = %vehicle.id))]
    pub async fn update_vehicle(&self, vehicle: Vehicle) -> Result<Vehicle, ServiceError> {
        vehicle.validate()?;

        let current = self
            .vehicles
            .find_by_id(vehicle.id)
            .await?
            .ok_or_else(|| ServiceError::vehicle_not_found(vehicle.id))?;

        let updated = Vehicle {
            maintenance_history: current.maintenance_history,
            fueling_history: current.fueling_history,
            ..vehicle
        };
        let updated = self.vehicles.save(updated).await?;

        self.publish(Event::VehicleUpdated(updated.id)).await?;
        Ok(updated)
    }

    #[instrument(skip(self), fields(vehicle_id = %vehicle_id))]
    pub async fn set_vehicle_status(
        &self,
        vehicle_id: Uuid,
        status: VehicleStatus,
    ) -> Result<Vehicle, ServiceError> {
        let mut vehicle = self
            .vehicles
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| ServiceError::vehicle_not_found(vehicle_id))?;

        let old_status = vehicle.status;
        vehicle.status = status;
        let vehicle = self.vehicles.save(vehicle).await?;

        self.publish(Event::VehicleStatusChanged {
            vehicle_id,
            old_status,
            new_status: status,
        })
        .await?;
        Ok(vehicle)
    }

    /// Appends a fueling record. The odometer advances when the pump reading
    /// is ahead of it.
    #[instrument(skip(self, input), fields(vehicle_id = %vehicle_id))]
    pub async fn record_fueling(
        &self,
        vehicle_id: Uuid,
        input: NewFuelingRecord,
    ) -> Result<Vehicle, ServiceError> {
        if input.liters <= Decimal::ZERO || input.price_per_liter <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Liters and price per liter must be positive".to_string(),
            ));
        }
        if input.mileage < 0 {
            return Err(ServiceError::ValidationError(
                "Mileage cannot be negative".to_string(),
            ));
        }
        let total_cost = input
            .total_cost
            .unwrap_or_else(|| (input.liters * input.price_per_liter).round_dp(2));
        if total_cost <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Total cost must be positive".to_string(),
            ));
        }

        let mut vehicle = self
            .vehicles
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| ServiceError::vehicle_not_found(vehicle_id))?;

        let record = FuelingHistoryItem {
            id: Uuid::new_v4(),
            date: input.date,
            fuel_type: input.fuel_type,
            liters: input.liters,
            price_per_liter: input.price_per_liter,
            total_cost,
            mileage: input.mileage,
            station_name: input.station_name,
        };
        let record_id = record.id;

        if record.mileage > vehicle.mileage {
            vehicle.mileage = record.mileage;
        }
        vehicle.fueling_history.push(record);
        let vehicle = self.vehicles.save(vehicle).await?;

        self.publish(Event::FuelingRecorded {
            vehicle_id,
            record_id,
            total_cost,
        })
        .await?;
        Ok(vehicle)
    }

    async fn publish(&self, event: Event) -> Result<(), ServiceError> {
        self.event_sender
            .send(event)
            .await
            .map_err(ServiceError::EventError)
    }
}
