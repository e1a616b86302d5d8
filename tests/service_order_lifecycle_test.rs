//! End-to-end tests for the complete service-order lifecycle.
//!
//! Covered flows:
//! - Happy path: open → budget → approval → execution → completion →
//!   invoicing → payments
//! - Budget approval side effects (supplier/cost copied, siblings demoted)
//! - Completion side effect on the vehicle's maintenance history
//! - Invoicing justification rules
//! - Payment accumulation and the derived payment status
//! - Invalid transitions and cancellation

mod common;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use common::TestApp;
use fleet_api::errors::ServiceError;
use fleet_api::models::{PaymentStatus, ServiceOrderStatus};
use fleet_api::services::service_orders::{
    InvoiceDetails, NewBudget, NewPayment, NewServiceOrder,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn new_order(vehicle_id: Uuid) -> NewServiceOrder {
    NewServiceOrder {
        vehicle_id,
        service_type: "Electrical fault".to_string(),
        problem_description: "Intermittent starter failure".to_string(),
        requester_id: None,
    }
}

fn budget(supplier_id: Uuid, value: Decimal) -> NewBudget {
    NewBudget {
        supplier_id,
        budget_value: value,
        estimated_deadline: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        budget_notes: None,
    }
}

fn invoice(value: Decimal, justification: Option<&str>) -> InvoiceDetails {
    InvoiceDetails {
        invoice_number: "NF-2024-0042".to_string(),
        invoice_due_date: NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
        final_value: value,
        value_justification: justification.map(str::to_string),
    }
}

fn payment(amount: Decimal) -> NewPayment {
    NewPayment {
        payment_date: NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
        paid_amount: amount,
        payment_method: "Bank transfer".to_string(),
        bank_account_info: None,
        notes: None,
    }
}

#[tokio::test]
async fn full_lifecycle_happy_path() {
    let app = TestApp::new();
    let vehicle = app.seed_vehicle("RKT-1A23").await;
    let s1 = app.seed_supplier("AutoFast").await;
    let s2 = app.seed_supplier("Veloz Tires").await;
    let orders = app.state.service_order_service();

    // Step 1: open the request
    let order = orders.create_order(new_order(vehicle.id)).await.unwrap();
    assert_eq!(order.status, ServiceOrderStatus::PendingBudget);
    assert!(order.payment_status.is_none());

    // Step 2: two suppliers quote; status is unaffected
    let order = orders
        .submit_budget(order.id, budget(s1.id, dec!(450.00)))
        .await
        .unwrap();
    let order = orders
        .submit_budget(order.id, budget(s2.id, dec!(500.00)))
        .await
        .unwrap();
    assert_eq!(order.status, ServiceOrderStatus::PendingBudget);
    assert_eq!(order.budgets.len(), 2);

    // Step 3: approve the first quote
    let b1 = order.budgets[0].id;
    let order = orders.approve_budget(order.id, b1).await.unwrap();
    assert_eq!(order.status, ServiceOrderStatus::ApprovedAwaitingExecution);
    assert_eq!(order.supplier_id, Some(s1.id));
    assert_eq!(order.cost, Some(dec!(450.00)));
    assert!(order.budgets[0].is_approved);
    assert!(!order.budgets[1].is_approved);

    // Step 4: start execution
    let order = orders.start_execution(order.id).await.unwrap();
    assert_eq!(order.status, ServiceOrderStatus::InProgress);
    assert!(order.start_date.is_some());

    // Step 5: complete; the vehicle gains one history entry
    let completion_date = NaiveDate::from_ymd_opt(2024, 1, 25).unwrap();
    let order = orders
        .complete_order(order.id, completion_date, Some("Starter replaced".to_string()))
        .await
        .unwrap();
    assert_eq!(order.status, ServiceOrderStatus::Completed);

    let vehicle = app
        .state
        .vehicle_service()
        .get_vehicle(vehicle.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(vehicle.maintenance_history.len(), 1);
    let item = &vehicle.maintenance_history[0];
    assert_eq!(item.service_order_id, order.id);
    assert_eq!(item.cost, dec!(450.00));
    assert_eq!(item.supplier, "AutoFast");
    assert_eq!(item.date, completion_date);

    // Step 6: invoice at the approved cost
    let order = orders
        .invoice_order(order.id, invoice(dec!(450.00), None))
        .await
        .unwrap();
    assert_eq!(order.status, ServiceOrderStatus::Invoiced);
    assert_eq!(order.payment_status, Some(PaymentStatus::Pending));

    // Step 7: settle in two installments
    let order = orders
        .record_payment(order.id, payment(dec!(200.00)))
        .await
        .unwrap();
    assert_eq!(order.payment_status, Some(PaymentStatus::PartiallyPaid));

    let order = orders
        .record_payment(order.id, payment(dec!(250.00)))
        .await
        .unwrap();
    assert_eq!(order.payment_status, Some(PaymentStatus::Paid));
    assert_eq!(order.total_paid(), dec!(450.00));
}

#[tokio::test]
async fn no_operation_skips_a_predecessor_state() {
    let app = TestApp::new();
    let vehicle = app.seed_vehicle("BRZ-2B34").await;
    let orders = app.state.service_order_service();

    let order = orders.create_order(new_order(vehicle.id)).await.unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 25).unwrap();

    assert_matches!(
        orders.start_execution(order.id).await,
        Err(ServiceError::InvalidStatus(_))
    );
    assert_matches!(
        orders.complete_order(order.id, date, None).await,
        Err(ServiceError::InvalidStatus(_))
    );
    assert_matches!(
        orders.invoice_order(order.id, invoice(dec!(100.00), None)).await,
        Err(ServiceError::InvalidStatus(_))
    );
    assert_matches!(
        orders.record_payment(order.id, payment(dec!(100.00))).await,
        Err(ServiceError::InvalidStatus(_))
    );

    // The failed calls must not have moved the order.
    let order = orders.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(order.status, ServiceOrderStatus::PendingBudget);
}

#[tokio::test]
async fn unknown_order_is_reported_as_not_found() {
    let app = TestApp::new();
    let orders = app.state.service_order_service();

    let ghost = Uuid::new_v4();
    assert_matches!(
        orders.start_execution(ghost).await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        orders.approve_budget(ghost, Uuid::new_v4()).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn diverging_invoice_value_requires_justification() {
    let app = TestApp::new();
    let vehicle = app.seed_vehicle("PBR-3C45").await;
    let supplier = app.seed_supplier("AutoFast").await;
    let orders = app.state.service_order_service();

    let order = orders.create_order(new_order(vehicle.id)).await.unwrap();
    let order = orders
        .submit_budget(order.id, budget(supplier.id, dec!(1000.00)))
        .await
        .unwrap();
    let b = order.budgets[0].id;
    orders.approve_budget(order.id, b).await.unwrap();
    orders.start_execution(order.id).await.unwrap();
    orders
        .complete_order(order.id, NaiveDate::from_ymd_opt(2024, 1, 25).unwrap(), None)
        .await
        .unwrap();

    assert_matches!(
        orders
            .invoice_order(order.id, invoice(dec!(1350.00), None))
            .await,
        Err(ServiceError::ValidationError(_))
    );
    // A blank justification does not count.
    assert_matches!(
        orders
            .invoice_order(order.id, invoice(dec!(1350.00), Some("   ")))
            .await,
        Err(ServiceError::ValidationError(_))
    );

    let order = orders
        .invoice_order(order.id, invoice(dec!(1350.00), Some("Extra parts required")))
        .await
        .unwrap();
    assert_eq!(order.final_value, Some(dec!(1350.00)));
    assert_eq!(
        order.value_justification.as_deref(),
        Some("Extra parts required")
    );
}

#[tokio::test]
async fn overpayment_is_allowed_and_settles_the_order() {
    let app = TestApp::new();
    let vehicle = app.seed_vehicle("XYZ-1D23").await;
    let supplier = app.seed_supplier("AutoFast").await;
    let orders = app.state.service_order_service();

    let order = orders.create_order(new_order(vehicle.id)).await.unwrap();
    let order = orders
        .submit_budget(order.id, budget(supplier.id, dec!(300.00)))
        .await
        .unwrap();
    let b = order.budgets[0].id;
    orders.approve_budget(order.id, b).await.unwrap();
    orders.start_execution(order.id).await.unwrap();
    orders
        .complete_order(order.id, NaiveDate::from_ymd_opt(2024, 1, 25).unwrap(), None)
        .await
        .unwrap();
    orders
        .invoice_order(order.id, invoice(dec!(300.00), None))
        .await
        .unwrap();

    let order = orders
        .record_payment(order.id, payment(dec!(350.00)))
        .await
        .unwrap();
    assert_eq!(order.payment_status, Some(PaymentStatus::Paid));
    assert_eq!(order.total_paid(), dec!(350.00));
}

#[tokio::test]
async fn submitting_budgets_leaves_status_untouched() {
    let app = TestApp::new();
    let vehicle = app.seed_vehicle("QWE-2E34").await;
    let supplier = app.seed_supplier("Brasil Parts").await;
    let orders = app.state.service_order_service();

    let order = orders.create_order(new_order(vehicle.id)).await.unwrap();
    let order = orders
        .submit_budget(order.id, budget(supplier.id, dec!(220.00)))
        .await
        .unwrap();
    assert_eq!(order.status, ServiceOrderStatus::PendingBudget);
    assert_eq!(order.budgets.len(), 1);
}

#[tokio::test]
async fn cancellation_is_rejected_after_completion() {
    let app = TestApp::new();
    let vehicle = app.seed_vehicle("RTY-3F45").await;
    let supplier = app.seed_supplier("AutoFast").await;
    let orders = app.state.service_order_service();

    let order = orders.create_order(new_order(vehicle.id)).await.unwrap();
    let order = orders
        .submit_budget(order.id, budget(supplier.id, dec!(150.00)))
        .await
        .unwrap();
    let b = order.budgets[0].id;
    orders.approve_budget(order.id, b).await.unwrap();
    orders.start_execution(order.id).await.unwrap();
    orders
        .complete_order(order.id, NaiveDate::from_ymd_opt(2024, 1, 25).unwrap(), None)
        .await
        .unwrap();

    assert_matches!(
        orders.cancel_order(order.id).await,
        Err(ServiceError::InvalidStatus(_))
    );
}

#[rstest::rstest]
#[case::pending_budget(Stage::Opened)]
#[case::approved(Stage::Approved)]
#[case::in_progress(Stage::InProgress)]
#[tokio::test]
async fn cancellation_is_allowed_before_completion(#[case] stage: Stage) {
    let app = TestApp::new();
    let vehicle = app.seed_vehicle("UIO-4G56").await;
    let supplier = app.seed_supplier("AutoFast").await;
    let orders = app.state.service_order_service();

    let order = orders.create_order(new_order(vehicle.id)).await.unwrap();
    if stage >= Stage::Approved {
        let order = orders
            .submit_budget(order.id, budget(supplier.id, dec!(150.00)))
            .await
            .unwrap();
        let b = order.budgets[0].id;
        orders.approve_budget(order.id, b).await.unwrap();
    }
    if stage >= Stage::InProgress {
        orders.start_execution(order.id).await.unwrap();
    }

    let order = orders.cancel_order(order.id).await.unwrap();
    assert_eq!(order.status, ServiceOrderStatus::Cancelled);

    // Terminal: nothing else applies, and no history entry was written.
    assert_matches!(
        orders
            .complete_order(order.id, NaiveDate::from_ymd_opt(2024, 1, 25).unwrap(), None)
            .await,
        Err(ServiceError::InvalidStatus(_))
    );
    let vehicle = app
        .state
        .vehicle_service()
        .get_vehicle(vehicle.id)
        .await
        .unwrap()
        .unwrap();
    assert!(vehicle.maintenance_history.is_empty());
}

/// How far to drive an order before exercising the operation under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Opened,
    Approved,
    InProgress,
}
