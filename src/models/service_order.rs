use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use uuid::Uuid;

/// Tolerance absorbing floating-point rounding on currency comparisons.
/// Every paid-in-full check in the system goes through [`is_paid_in_full`].
pub const PAYMENT_TOLERANCE: Decimal = dec!(0.001);

/// Lifecycle state of a service order.
///
/// `AwaitingApproval` is a legal pre-approval state (seeded or imported
/// orders may carry it) but no operation produces it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceOrderStatus {
    PendingBudget,
    AwaitingApproval,
    ApprovedAwaitingExecution,
    InProgress,
    Completed,
    Invoiced,
    Cancelled,
}

impl ServiceOrderStatus {
    /// States counted as "active" on the dashboard.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ServiceOrderStatus::PendingBudget
                | ServiceOrderStatus::AwaitingApproval
                | ServiceOrderStatus::ApprovedAwaitingExecution
                | ServiceOrderStatus::InProgress
        )
    }

    /// Terminal states admit no further transition (payments may still be
    /// recorded against an invoiced order).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ServiceOrderStatus::Invoiced | ServiceOrderStatus::Cancelled
        )
    }
}

/// Derived payment state of an invoiced order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    PartiallyPaid,
    Paid,
}

/// A supplier's quoted price and terms for a given order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub budget_value: Decimal,
    pub estimated_deadline: NaiveDate,
    pub budget_notes: Option<String>,
    pub is_approved: bool,
}

/// One recorded payment against an invoiced order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub payment_date: NaiveDate,
    pub paid_amount: Decimal,
    pub payment_method: String,
    pub bank_account_info: Option<String>,
    pub notes: Option<String>,
}

/// One maintenance/repair request for one vehicle.
///
/// Orders are never deleted; they only move through
/// [`ServiceOrderStatus`]. Budgets and payments are appended, never removed
/// (budgets get mutated only to flip `is_approved`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOrder {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub service_type: String,
    pub problem_description: String,
    pub request_date: DateTime<Utc>,
    pub requester_id: Option<Uuid>,
    pub status: ServiceOrderStatus,
    /// Insertion order = submission order.
    pub budgets: Vec<Budget>,
    /// Populated once a budget is approved.
    pub supplier_id: Option<Uuid>,
    /// The approved budget's value.
    pub cost: Option<Decimal>,
    pub start_date: Option<DateTime<Utc>>,
    pub completion_date: Option<NaiveDate>,
    pub completion_notes: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_due_date: Option<NaiveDate>,
    /// May differ from `cost`; a justification is then mandatory.
    pub final_value: Option<Decimal>,
    pub value_justification: Option<String>,
    pub payments: Vec<Payment>,
    /// Derived from `payments` vs `final_value`; never set independently.
    pub payment_status: Option<PaymentStatus>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceOrder {
    /// Builds a fresh order in the initial `PendingBudget` state.
    pub fn open(
        vehicle_id: Uuid,
        service_type: String,
        problem_description: String,
        requester_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            service_type,
            problem_description,
            request_date: now,
            requester_id,
            status: ServiceOrderStatus::PendingBudget,
            budgets: Vec::new(),
            supplier_id: None,
            cost: None,
            start_date: None,
            completion_date: None,
            completion_notes: None,
            invoice_number: None,
            invoice_due_date: None,
            final_value: None,
            value_justification: None,
            payments: Vec::new(),
            payment_status: None,
            updated_at: now,
        }
    }

    /// Sum of all recorded payments.
    pub fn total_paid(&self) -> Decimal {
        self.payments.iter().map(|p| p.paid_amount).sum()
    }

    pub fn approved_budget(&self) -> Option<&Budget> {
        self.budgets.iter().find(|b| b.is_approved)
    }

    pub fn find_budget(&self, budget_id: Uuid) -> Option<&Budget> {
        self.budgets.iter().find(|b| b.id == budget_id)
    }
}

/// Whether `total_paid` settles `target`, within [`PAYMENT_TOLERANCE`].
pub fn is_paid_in_full(total_paid: Decimal, target: Decimal) -> bool {
    total_paid >= target - PAYMENT_TOLERANCE
}

/// Derives the payment status from accumulated payments against the invoiced
/// value. Applied after every recorded payment and at invoicing time.
pub fn derive_payment_status(total_paid: Decimal, final_value: Option<Decimal>) -> PaymentStatus {
    let target = final_value.unwrap_or(Decimal::ZERO);
    if is_paid_in_full(total_paid, target) {
        PaymentStatus::Paid
    } else if total_paid.is_zero() {
        PaymentStatus::Pending
    } else {
        PaymentStatus::PartiallyPaid
    }
}
