use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::service_order::{
    derive_payment_status, Budget, Payment, ServiceOrder, ServiceOrderStatus, PAYMENT_TOLERANCE,
};
use crate::models::vehicle::MaintenanceHistoryItem;
use crate::repositories::{ServiceOrderRepository, SupplierRepository, VehicleRepository};

/// Fallback display name for maintenance history when an order was completed
/// without an approved supplier.
pub const UNSPECIFIED_SUPPLIER: &str = "Supplier not specified";

/// Request to open a new service order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewServiceOrder {
    pub vehicle_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Service type is required"))]
    pub service_type: String,
    #[validate(length(min = 1, max = 2000, message = "Problem description is required"))]
    pub problem_description: String,
    pub requester_id: Option<Uuid>,
}

/// A supplier quote submitted against an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudget {
    pub supplier_id: Uuid,
    pub budget_value: Decimal,
    pub estimated_deadline: NaiveDate,
    pub budget_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvoiceDetails {
    #[validate(length(min = 1, max = 60, message = "Invoice number is required"))]
    pub invoice_number: String,
    pub invoice_due_date: NaiveDate,
    pub final_value: Decimal,
    pub value_justification: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPayment {
    pub payment_date: NaiveDate,
    pub paid_amount: Decimal,
    #[validate(length(min = 1, max = 60, message = "Payment method is required"))]
    pub payment_method: String,
    pub bank_account_info: Option<String>,
    pub notes: Option<String>,
}

/// Service owning the service-order lifecycle: request, budgeting, approval,
/// execution, completion, invoicing, and payment recording.
///
/// Completion has one cross-entity side effect: it appends a
/// [`MaintenanceHistoryItem`] to the referenced vehicle. Everything else
/// mutates the order alone.
#[derive(Clone)]
pub struct ServiceOrderService {
    orders: Arc<dyn ServiceOrderRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    suppliers: Arc<dyn SupplierRepository>,
    event_sender: EventSender,
}

impl ServiceOrderService {
    pub fn new(
        orders: Arc<dyn ServiceOrderRepository>,
        vehicles: Arc<dyn VehicleRepository>,
        suppliers: Arc<dyn SupplierRepository>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            orders,
            vehicles,
            suppliers,
            event_sender,
        }
    }

    /// Opens a new order in the `PendingBudget` state.
    #[instrument(skip(self, input), fields(vehicle_id = %input.vehicle_id))]
    pub async fn create_order(&self, input: NewServiceOrder) -> Result<ServiceOrder, ServiceError> {
        input.validate()?;

        if self.vehicles.find_by_id(input.vehicle_id).await?.is_none() {
            return Err(ServiceError::vehicle_not_found(input.vehicle_id));
        }

        let order = ServiceOrder::open(
            input.vehicle_id,
            input.service_type,
            input.problem_description,
            input.requester_id,
        );
        let order = self.orders.insert(order).await?;

        info!(order_id = %order.id, "service order opened");
        self.publish(Event::ServiceOrderCreated(order.id)).await?;
        Ok(order)
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<ServiceOrder>, ServiceError> {
        self.orders.find_by_id(order_id).await
    }

    pub async fn list_orders(&self) -> Result<Vec<ServiceOrder>, ServiceError> {
        self.orders.list().await
    }

    pub async fn list_orders_by_vehicle(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Vec<ServiceOrder>, ServiceError> {
        self.orders.list_by_vehicle(vehicle_id).await
    }

    pub async fn list_orders_by_status(
        &self,
        status: ServiceOrderStatus,
    ) -> Result<Vec<ServiceOrder>, ServiceError> {
        self.orders.list_by_status(status).await
    }

    /// Appends a supplier quote to the order. The lifecycle status is not
    /// affected; approval is a separate, explicit operation.
    #[instrument(skip(self, input), fields(order_id = %order_id, supplier_id = %input.supplier_id))]
    pub async fn submit_budget(
        &self,
        order_id: Uuid,
        input: NewBudget,
    ) -> Result<ServiceOrder, ServiceError> {
        if input.budget_value <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Budget value must be positive".to_string(),
            ));
        }
        if self.suppliers.find_by_id(input.supplier_id).await?.is_none() {
            return Err(ServiceError::supplier_not_found(input.supplier_id));
        }

        let mut order = self.fetch_order(order_id).await?;
        let budget = Budget {
            id: Uuid::new_v4(),
            supplier_id: input.supplier_id,
            budget_value: input.budget_value,
            estimated_deadline: input.estimated_deadline,
            budget_notes: input.budget_notes,
            is_approved: false,
        };
        let budget_id = budget.id;
        let supplier_id = budget.supplier_id;
        order.budgets.push(budget);
        order.updated_at = Utc::now();
        let order = self.orders.save(order).await?;

        self.publish(Event::BudgetSubmitted {
            order_id,
            budget_id,
            supplier_id,
        })
        .await?;
        Ok(order)
    }

    /// Approves one budget, demoting every sibling, and copies the approved
    /// supplier and value onto the order. Always an explicit operator
    /// decision; there is no automatic lowest-price selection.
    #[instrument(skip(self), fields(order_id = %order_id, budget_id = %budget_id))]
    pub async fn approve_budget(
        &self,
        order_id: Uuid,
        budget_id: Uuid,
    ) -> Result<ServiceOrder, ServiceError> {
        let mut order = self.fetch_order(order_id).await?;

        if !matches!(
            order.status,
            ServiceOrderStatus::PendingBudget | ServiceOrderStatus::AwaitingApproval
        ) {
            return Err(ServiceError::invalid_transition(
                "approve budget",
                "pending_budget or awaiting_approval",
                order.status,
            ));
        }
        let (supplier_id, cost) = order
            .find_budget(budget_id)
            .map(|b| (b.supplier_id, b.budget_value))
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Budget {budget_id} not found on service order {order_id}"
                ))
            })?;

        for budget in &mut order.budgets {
            budget.is_approved = budget.id == budget_id;
        }
        order.supplier_id = Some(supplier_id);
        order.cost = Some(cost);
        order.status = ServiceOrderStatus::ApprovedAwaitingExecution;
        order.updated_at = Utc::now();
        let order = self.orders.save(order).await?;

        info!(order_id = %order_id, budget_id = %budget_id, "budget approved");
        self.publish(Event::BudgetApproved {
            order_id,
            budget_id,
            supplier_id,
            cost,
        })
        .await?;
        Ok(order)
    }

    /// Moves an approved order into execution.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn start_execution(&self, order_id: Uuid) -> Result<ServiceOrder, ServiceError> {
        let mut order = self.fetch_order(order_id).await?;

        if order.status != ServiceOrderStatus::ApprovedAwaitingExecution {
            return Err(ServiceError::invalid_transition(
                "start execution",
                "approved_awaiting_execution",
                order.status,
            ));
        }

        order.status = ServiceOrderStatus::InProgress;
        order.start_date = Some(Utc::now());
        order.updated_at = Utc::now();
        let order = self.orders.save(order).await?;

        self.publish(Event::ExecutionStarted(order_id)).await?;
        Ok(order)
    }

    /// Marks the work done and appends one maintenance-history item to the
    /// vehicle. Rejecting repeat calls keeps the history free of duplicates.
    #[instrument(skip(self, completion_notes), fields(order_id = %order_id))]
    pub async fn complete_order(
        &self,
        order_id: Uuid,
        completion_date: NaiveDate,
        completion_notes: Option<String>,
    ) -> Result<ServiceOrder, ServiceError> {
        let mut order = self.fetch_order(order_id).await?;

        if order.status != ServiceOrderStatus::InProgress {
            return Err(ServiceError::invalid_transition(
                "complete order",
                "in_progress",
                order.status,
            ));
        }

        let mut vehicle = self
            .vehicles
            .find_by_id(order.vehicle_id)
            .await?
            .ok_or_else(|| ServiceError::vehicle_not_found(order.vehicle_id))?;

        let supplier_name = match order.supplier_id {
            Some(supplier_id) => self
                .suppliers
                .find_by_id(supplier_id)
                .await?
                .map(|s| s.display_name().to_string())
                .unwrap_or_else(|| UNSPECIFIED_SUPPLIER.to_string()),
            None => UNSPECIFIED_SUPPLIER.to_string(),
        };

        let description = match &completion_notes {
            Some(notes) if !notes.is_empty() => format!(
                "Order completed: {} - Completion notes: {}",
                order.problem_description, notes
            ),
            _ => format!("Order completed: {}", order.problem_description),
        };

        order.status = ServiceOrderStatus::Completed;
        order.completion_date = Some(completion_date);
        if completion_notes.is_some() {
            order.completion_notes = completion_notes;
        }
        order.updated_at = Utc::now();
        let order = self.orders.save(order).await?;

        vehicle.maintenance_history.push(MaintenanceHistoryItem {
            date: completion_date,
            service_type: order.service_type.clone(),
            description,
            cost: order.cost.unwrap_or(Decimal::ZERO),
            supplier: supplier_name,
            service_order_id: order.id,
        });
        let vehicle = self.vehicles.save(vehicle).await?;

        info!(order_id = %order_id, vehicle_id = %vehicle.id, "service order completed");
        self.publish(Event::ServiceOrderCompleted {
            order_id,
            vehicle_id: vehicle.id,
            completion_date,
        })
        .await?;
        self.publish(Event::MaintenanceRecorded {
            vehicle_id: vehicle.id,
            order_id,
        })
        .await?;
        Ok(order)
    }

    /// Invoices a completed order. A final value diverging from the approved
    /// cost demands a justification.
    #[instrument(skip(self, details), fields(order_id = %order_id))]
    pub async fn invoice_order(
        &self,
        order_id: Uuid,
        details: InvoiceDetails,
    ) -> Result<ServiceOrder, ServiceError> {
        details.validate()?;

        let mut order = self.fetch_order(order_id).await?;

        if order.status != ServiceOrderStatus::Completed {
            return Err(ServiceError::invalid_transition(
                "invoice order",
                "completed",
                order.status,
            ));
        }
        if details.final_value <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Final value must be positive".to_string(),
            ));
        }
        if let Some(cost) = order.cost {
            let justified = details
                .value_justification
                .as_deref()
                .is_some_and(|j| !j.trim().is_empty());
            if details.final_value != cost && !justified {
                return Err(ServiceError::ValidationError(
                    "A justification is required when the final value differs from the approved cost"
                        .to_string(),
                ));
            }
        }

        order.status = ServiceOrderStatus::Invoiced;
        order.invoice_number = Some(details.invoice_number.clone());
        order.invoice_due_date = Some(details.invoice_due_date);
        order.final_value = Some(details.final_value);
        if details.value_justification.is_some() {
            order.value_justification = details.value_justification;
        }
        order.payment_status = Some(derive_payment_status(
            order.total_paid(),
            order.final_value,
        ));
        order.updated_at = Utc::now();
        let order = self.orders.save(order).await?;

        self.publish(Event::ServiceOrderInvoiced {
            order_id,
            invoice_number: details.invoice_number,
            final_value: details.final_value,
        })
        .await?;
        Ok(order)
    }

    /// Records a payment against an invoiced order and re-derives the
    /// payment status. Overpayment is allowed but logged.
    #[instrument(skip(self, input), fields(order_id = %order_id))]
    pub async fn record_payment(
        &self,
        order_id: Uuid,
        input: NewPayment,
    ) -> Result<ServiceOrder, ServiceError> {
        input.validate()?;

        let mut order = self.fetch_order(order_id).await?;

        let Some(final_value) = order.final_value else {
            return Err(ServiceError::invalid_transition(
                "record payment",
                "invoiced",
                order.status,
            ));
        };
        if input.paid_amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Paid amount must be positive".to_string(),
            ));
        }

        let outstanding = final_value - order.total_paid();
        if input.paid_amount > outstanding + PAYMENT_TOLERANCE {
            warn!(
                order_id = %order_id,
                paid = %input.paid_amount,
                outstanding = %outstanding,
                "payment exceeds outstanding balance"
            );
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            payment_date: input.payment_date,
            paid_amount: input.paid_amount,
            payment_method: input.payment_method,
            bank_account_info: input.bank_account_info,
            notes: input.notes,
        };
        let payment_id = payment.id;
        let amount = payment.paid_amount;

        let old_status = order.payment_status;
        order.payments.push(payment);
        let new_status = derive_payment_status(order.total_paid(), order.final_value);
        order.payment_status = Some(new_status);
        order.updated_at = Utc::now();
        let order = self.orders.save(order).await?;

        self.publish(Event::PaymentRecorded {
            order_id,
            payment_id,
            amount,
        })
        .await?;
        if old_status != Some(new_status) {
            self.publish(Event::PaymentStatusChanged {
                order_id,
                old_status,
                new_status,
            })
            .await?;
        }
        Ok(order)
    }

    /// Cancels an order that has not reached completion. Terminal.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel_order(&self, order_id: Uuid) -> Result<ServiceOrder, ServiceError> {
        let mut order = self.fetch_order(order_id).await?;

        if matches!(
            order.status,
            ServiceOrderStatus::Completed
                | ServiceOrderStatus::Invoiced
                | ServiceOrderStatus::Cancelled
        ) {
            return Err(ServiceError::invalid_transition(
                "cancel order",
                "an open pre-completion status",
                order.status,
            ));
        }

        order.status = ServiceOrderStatus::Cancelled;
        order.updated_at = Utc::now();
        let order = self.orders.save(order).await?;

        self.publish(Event::ServiceOrderCancelled(order_id)).await?;
        Ok(order)
    }

    async fn fetch_order(&self, order_id: Uuid) -> Result<ServiceOrder, ServiceError> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::order_not_found(order_id))
    }

    async fn publish(&self, event: Event) -> Result<(), ServiceError> {
        self.event_sender
            .send(event)
            .await
            .map_err(ServiceError::EventError)
    }
}
