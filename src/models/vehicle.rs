use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;
use uuid::Uuid;
use validator::Validate;

/// Vehicle status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Active,
    InMaintenance,
    Inactive,
    Sold,
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleStatus::Active => write!(f, "Active"),
            VehicleStatus::InMaintenance => write!(f, "In Maintenance"),
            VehicleStatus::Inactive => write!(f, "Inactive"),
            VehicleStatus::Sold => write!(f, "Sold"),
        }
    }
}

/// One completed service order, denormalized into the vehicle's history.
/// Written only by the service-order lifecycle on completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceHistoryItem {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub service_type: String,
    pub description: String,
    pub cost: Decimal,
    /// Display name resolved at append time; the order keeps the reference.
    pub supplier: String,
    pub service_order_id: Uuid,
}

/// One fueling stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelingHistoryItem {
    pub id: Uuid,
    pub date: NaiveDate,
    pub fuel_type: String,
    pub liters: Decimal,
    pub price_per_liter: Decimal,
    pub total_cost: Decimal,
    /// Odometer reading at the pump, in km.
    pub mileage: i64,
    pub station_name: String,
}

/// Vehicle registry entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Vehicle {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Make must be between 1 and 100 characters"))]
    pub make: String,

    #[validate(length(min = 1, max = 100, message = "Model must be between 1 and 100 characters"))]
    pub model: String,

    pub year: i32,

    pub color: String,

    #[validate(length(min = 1, max = 20, message = "License plate is required"))]
    pub license_plate: String,

    /// National vehicle registry number.
    pub renavam: String,

    pub chassis_number: String,

    pub status: VehicleStatus,

    /// Current odometer reading, in km.
    pub mileage: i64,

    /// Odometer reading when the vehicle entered the fleet; cost-per-km is
    /// computed over the distance driven since.
    pub initial_mileage: i64,

    pub maintenance_history: Vec<MaintenanceHistoryItem>,

    pub fueling_history: Vec<FuelingHistoryItem>,
}

impl Vehicle {
    /// Distance driven since the vehicle entered the fleet, in km.
    pub fn distance_driven(&self) -> i64 {
        self.mileage - self.initial_mileage
    }

    /// Total maintenance plus fueling spend.
    pub fn total_operating_cost(&self) -> Decimal {
        let maintenance: Decimal = self.maintenance_history.iter().map(|m| m.cost).sum();
        let fueling: Decimal = self.fueling_history.iter().map(|f| f.total_cost).sum();
        maintenance + fueling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn vehicle() -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            make: "Volkswagen".to_string(),
            model: "Gol".to_string(),
            year: 2022,
            color: "White".to_string(),
            license_plate: "RKT-1A23".to_string(),
            renavam: "12345678901".to_string(),
            chassis_number: "9BWZZZ377VT123456".to_string(),
            status: VehicleStatus::Active,
            mileage: 15000,
            initial_mileage: 100,
            maintenance_history: Vec::new(),
            fueling_history: Vec::new(),
        }
    }

    #[test]
    fn operating_cost_sums_both_histories() {
        let mut v = vehicle();
        v.maintenance_history.push(MaintenanceHistoryItem {
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            service_type: "Inspection".to_string(),
            description: "40,000 km service".to_string(),
            cost: dec!(750.00),
            supplier: "AutoFast".to_string(),
            service_order_id: Uuid::new_v4(),
        });
        v.fueling_history.push(FuelingHistoryItem {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            fuel_type: "Gasoline".to_string(),
            liters: dec!(40),
            price_per_liter: dec!(5.90),
            total_cost: dec!(236.00),
            mileage: 14900,
            station_name: "Prime Station".to_string(),
        });

        assert_eq!(v.total_operating_cost(), dec!(986.00));
        assert_eq!(v.distance_driven(), 14900);
    }
}
