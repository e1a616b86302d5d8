#![allow(dead_code)]

use fleet_api::config::AppConfig;
use fleet_api::events::Event;
use fleet_api::models::{Supplier, Vehicle};
use fleet_api::services::suppliers::NewSupplier;
use fleet_api::services::vehicles::NewVehicle;
use fleet_api::AppState;
use tokio::sync::mpsc;

/// Test harness owning the application state and the live end of the event
/// channel (events are dropped unless a test drains them).
pub struct TestApp {
    pub state: AppState,
    pub event_rx: mpsc::Receiver<Event>,
}

impl TestApp {
    pub fn new() -> Self {
        let (state, event_rx) = AppState::new(AppConfig::default());
        Self { state, event_rx }
    }

    pub async fn seed_vehicle(&self, license_plate: &str) -> Vehicle {
        self.state
            .vehicle_service()
            .create_vehicle(NewVehicle {
                make: "Volkswagen".to_string(),
                model: "Gol".to_string(),
                year: 2022,
                color: "White".to_string(),
                license_plate: license_plate.to_string(),
                renavam: "12345678901".to_string(),
                chassis_number: "9BWZZZ377VT123456".to_string(),
                mileage: 15000,
                initial_mileage: 100,
            })
            .await
            .expect("seed vehicle")
    }

    pub async fn seed_supplier(&self, trade_name: &str) -> Supplier {
        self.state
            .supplier_service()
            .create_supplier(NewSupplier {
                legal_name: format!("{trade_name} Ltd."),
                trade_name: Some(trade_name.to_string()),
                tax_id: "12.345.678/0001-99".to_string(),
                categories: vec!["workshop".to_string()],
                address: "123 Palm St".to_string(),
                city: "São Paulo".to_string(),
                state: "SP".to_string(),
                postal_code: "01000-000".to_string(),
                phone: "(11) 98765-4321".to_string(),
                email: "contact@example.com".to_string(),
                contact_name: "Carlos Alberto".to_string(),
                notes: None,
            })
            .await
            .expect("seed supplier")
    }
}
