//! Fleet API Library
//!
//! Backend core for a fleet-management application: vehicle registry,
//! supplier registry, the service-order lifecycle, and financial reporting.
//! State lives in in-memory stores behind repository traits; the crate is
//! consumed through in-process calls on [`AppState`]'s services.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod repositories;
pub mod services;

use std::sync::Arc;

use tokio::sync::mpsc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: services::AppServices,
}

impl AppState {
    /// Builds the application over fresh in-memory stores. The returned
    /// receiver feeds [`events::process_events`]; spawn it (or drain it in
    /// tests) to consume domain events.
    pub fn new(config: config::AppConfig) -> (Self, mpsc::Receiver<events::Event>) {
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer_size.max(1));
        let event_sender = events::EventSender::new(event_tx);
        let services = services::AppServices::new(event_sender.clone());

        (
            Self {
                config,
                event_sender,
                services,
            },
            event_rx,
        )
    }

    pub fn service_order_service(&self) -> Arc<services::service_orders::ServiceOrderService> {
        self.services.service_orders.clone()
    }

    pub fn vehicle_service(&self) -> Arc<services::vehicles::VehicleService> {
        self.services.vehicles.clone()
    }

    pub fn supplier_service(&self) -> Arc<services::suppliers::SupplierService> {
        self.services.suppliers.clone()
    }

    pub fn user_service(&self) -> Arc<services::users::UserService> {
        self.services.users.clone()
    }

    pub fn report_service(&self) -> Arc<services::reports::ReportService> {
        self.services.reports.clone()
    }
}
