use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::service_order::PaymentStatus;
use crate::models::supplier::SupplierStatus;
use crate::models::vehicle::VehicleStatus;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Service order lifecycle events
    ServiceOrderCreated(Uuid),
    BudgetSubmitted {
        order_id: Uuid,
        budget_id: Uuid,
        supplier_id: Uuid,
    },
    BudgetApproved {
        order_id: Uuid,
        budget_id: Uuid,
        supplier_id: Uuid,
        cost: Decimal,
    },
    ExecutionStarted(Uuid),
    ServiceOrderCompleted {
        order_id: Uuid,
        vehicle_id: Uuid,
        completion_date: NaiveDate,
    },
    ServiceOrderInvoiced {
        order_id: Uuid,
        invoice_number: String,
        final_value: Decimal,
    },
    ServiceOrderCancelled(Uuid),

    // Payment events
    PaymentRecorded {
        order_id: Uuid,
        payment_id: Uuid,
        amount: Decimal,
    },
    PaymentStatusChanged {
        order_id: Uuid,
        old_status: Option<PaymentStatus>,
        new_status: PaymentStatus,
    },

    // Vehicle events
    VehicleRegistered(Uuid),
    VehicleUpdated(Uuid),
    VehicleStatusChanged {
        vehicle_id: Uuid,
        old_status: VehicleStatus,
        new_status: VehicleStatus,
    },
    FuelingRecorded {
        vehicle_id: Uuid,
        record_id: Uuid,
        total_cost: Decimal,
    },
    MaintenanceRecorded {
        vehicle_id: Uuid,
        order_id: Uuid,
    },

    // Supplier events
    SupplierCreated(Uuid),
    SupplierUpdated(Uuid),
    SupplierStatusChanged {
        supplier_id: Uuid,
        old_status: SupplierStatus,
        new_status: SupplierStatus,
    },

    // User events
    UserCreated(Uuid),

    /// Generic event data
    Generic {
        message: String,
        metadata: serde_json::Value,
    },
}

/// Consumes the event channel and logs every event. Spawn this once per
/// application alongside `AppState::new`.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::BudgetApproved {
                order_id,
                supplier_id,
                cost,
                ..
            } => {
                info!(%order_id, %supplier_id, %cost, "budget approved");
            }
            Event::ServiceOrderCompleted {
                order_id,
                vehicle_id,
                ..
            } => {
                info!(%order_id, %vehicle_id, "service order completed");
            }
            Event::ServiceOrderInvoiced {
                order_id,
                invoice_number,
                final_value,
            } => {
                info!(%order_id, %invoice_number, %final_value, "service order invoiced");
            }
            Event::PaymentStatusChanged {
                order_id,
                new_status,
                ..
            } => {
                info!(%order_id, status = %new_status, "payment status changed");
            }
            Event::Generic { message, metadata } => {
                info!(%message, %metadata, "generic event");
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    warn!("Event channel closed; event processing loop terminated");
}
