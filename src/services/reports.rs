use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::service_order::{PaymentStatus, ServiceOrder, ServiceOrderStatus};
use crate::models::supplier::SupplierStatus;
use crate::models::vehicle::VehicleStatus;
use crate::repositories::{ServiceOrderRepository, SupplierRepository, VehicleRepository};

/// Filter for the financial report. Empty fields mean "no restriction".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialReportFilter {
    pub completion_date_start: Option<NaiveDate>,
    pub completion_date_end: Option<NaiveDate>,
    pub payment_statuses: Vec<PaymentStatus>,
}

/// One financially relevant order. Ids are kept as references; display names
/// are resolved by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialReportRow {
    pub order_id: Uuid,
    pub vehicle_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub completion_date: Option<NaiveDate>,
    pub status: ServiceOrderStatus,
    pub payment_status: Option<PaymentStatus>,
    /// Invoiced value when present, approved cost otherwise.
    pub billed_value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialReport {
    pub rows: Vec<FinancialReportRow>,
    pub total_value: Decimal,
}

/// Aggregate counts backing the dashboard. Every status is present in the
/// maps, zero-filled.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_vehicles: usize,
    pub vehicles_by_status: HashMap<VehicleStatus, usize>,
    pub active_service_orders: usize,
    pub service_orders_by_status: HashMap<ServiceOrderStatus, usize>,
    pub active_suppliers: usize,
    pub inactive_suppliers: usize,
}

/// Read-only reporting over the shared stores.
#[derive(Clone)]
pub struct ReportService {
    orders: Arc<dyn ServiceOrderRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    suppliers: Arc<dyn SupplierRepository>,
}

impl ReportService {
    pub fn new(
        orders: Arc<dyn ServiceOrderRepository>,
        vehicles: Arc<dyn VehicleRepository>,
        suppliers: Arc<dyn SupplierRepository>,
    ) -> Self {
        Self {
            orders,
            vehicles,
            suppliers,
        }
    }

    /// Financially relevant orders within the filter, plus their total.
    #[instrument(skip(self, filter))]
    pub async fn financial_report(
        &self,
        filter: &FinancialReportFilter,
    ) -> Result<FinancialReport, ServiceError> {
        let orders = self.orders.list().await?;

        let rows: Vec<FinancialReportRow> = orders
            .iter()
            .filter(|order| Self::matches(order, filter))
            .map(|order| FinancialReportRow {
                order_id: order.id,
                vehicle_id: order.vehicle_id,
                supplier_id: order.supplier_id,
                completion_date: order.completion_date,
                status: order.status,
                payment_status: order.payment_status,
                billed_value: order.final_value.or(order.cost).unwrap_or(Decimal::ZERO),
            })
            .collect();

        let total_value = rows.iter().map(|r| r.billed_value).sum();
        Ok(FinancialReport { rows, total_value })
    }

    fn matches(order: &ServiceOrder, filter: &FinancialReportFilter) -> bool {
        if let Some(start) = filter.completion_date_start {
            match order.completion_date {
                Some(date) if date >= start => {}
                _ => return false,
            }
        }
        if let Some(end) = filter.completion_date_end {
            match order.completion_date {
                Some(date) if date <= end => {}
                _ => return false,
            }
        }
        if !filter.payment_statuses.is_empty() {
            match order.payment_status {
                Some(status) if filter.payment_statuses.contains(&status) => {}
                _ => return false,
            }
        }
        // Only orders carrying a financial value belong in the report.
        if order.final_value.is_none() && order.cost.is_none() {
            return false;
        }
        match order.status {
            ServiceOrderStatus::Completed
            | ServiceOrderStatus::Invoiced
            | ServiceOrderStatus::Cancelled => true,
            _ => order.payment_status.is_some(),
        }
    }

    /// Status counts for the dashboard.
    #[instrument(skip(self))]
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, ServiceError> {
        let vehicles = self.vehicles.list().await?;
        let orders = self.orders.list().await?;
        let suppliers = self.suppliers.list().await?;

        let mut vehicles_by_status: HashMap<VehicleStatus, usize> =
            VehicleStatus::iter().map(|s| (s, 0)).collect();
        for vehicle in &vehicles {
            *vehicles_by_status.entry(vehicle.status).or_default() += 1;
        }

        let mut service_orders_by_status: HashMap<ServiceOrderStatus, usize> =
            ServiceOrderStatus::iter().map(|s| (s, 0)).collect();
        for order in &orders {
            *service_orders_by_status.entry(order.status).or_default() += 1;
        }

        Ok(DashboardSummary {
            total_vehicles: vehicles.len(),
            vehicles_by_status,
            active_service_orders: orders.iter().filter(|o| o.status.is_active()).count(),
            service_orders_by_status,
            active_suppliers: suppliers
                .iter()
                .filter(|s| s.status == SupplierStatus::Active)
                .count(),
            inactive_suppliers: suppliers
                .iter()
                .filter(|s| s.status == SupplierStatus::Inactive)
                .count(),
        })
    }

    /// Operating cost per km driven since the vehicle entered the fleet.
    /// `None` until the vehicle has accumulated distance.
    #[instrument(skip(self), fields(vehicle_id = %vehicle_id))]
    pub async fn cost_per_km(&self, vehicle_id: Uuid) -> Result<Option<Decimal>, ServiceError> {
        let vehicle = self
            .vehicles
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| ServiceError::vehicle_not_found(vehicle_id))?;

        let distance = vehicle.distance_driven();
        if distance <= 0 {
            return Ok(None);
        }
        Ok(Some(
            (vehicle.total_operating_cost() / Decimal::from(distance)).round_dp(4),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::{MaintenanceHistoryItem, Vehicle};
    use crate::repositories::{
        InMemoryServiceOrderRepository, InMemorySupplierRepository, InMemoryVehicleRepository,
    };
    use rust_decimal_macros::dec;

    fn service() -> (
        ReportService,
        Arc<InMemoryServiceOrderRepository>,
        Arc<InMemoryVehicleRepository>,
    ) {
        let orders = Arc::new(InMemoryServiceOrderRepository::new());
        let vehicles = Arc::new(InMemoryVehicleRepository::new());
        let suppliers = Arc::new(InMemorySupplierRepository::new());
        (
            ReportService::new(orders.clone(), vehicles.clone(), suppliers),
            orders,
            vehicles,
        )
    }

    fn vehicle(mileage: i64, initial_mileage: i64) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            make: "Honda".to_string(),
            model: "Civic".to_string(),
            year: 2020,
            color: "Gray".to_string(),
            license_plate: "XYZ-1D23".to_string(),
            renavam: "23456789012".to_string(),
            chassis_number: "8AHFB2F57L312345".to_string(),
            status: VehicleStatus::Active,
            mileage,
            initial_mileage,
            maintenance_history: Vec::new(),
            fueling_history: Vec::new(),
        }
    }

    fn completed_order(vehicle_id: Uuid, cost: Decimal, date: NaiveDate) -> ServiceOrder {
        let mut order = ServiceOrder::open(
            vehicle_id,
            "Inspection".to_string(),
            "Scheduled service".to_string(),
            None,
        );
        order.status = ServiceOrderStatus::Completed;
        order.cost = Some(cost);
        order.completion_date = Some(date);
        order
    }

    #[tokio::test]
    async fn report_excludes_orders_without_financial_value() {
        let (service, orders, _) = service();
        let vehicle_id = Uuid::new_v4();

        orders
            .insert(ServiceOrder::open(
                vehicle_id,
                "Tires".to_string(),
                "Flat tire".to_string(),
                None,
            ))
            .await
            .unwrap();
        orders
            .insert(completed_order(
                vehicle_id,
                dec!(750.00),
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            ))
            .await
            .unwrap();

        let report = service
            .financial_report(&FinancialReportFilter::default())
            .await
            .unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.total_value, dec!(750.00));
    }

    #[tokio::test]
    async fn report_filters_by_completion_window() {
        let (service, orders, _) = service();
        let vehicle_id = Uuid::new_v4();

        for (cost, day) in [(dec!(100.00), 10), (dec!(200.00), 20)] {
            orders
                .insert(completed_order(
                    vehicle_id,
                    cost,
                    NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                ))
                .await
                .unwrap();
        }

        let filter = FinancialReportFilter {
            completion_date_start: Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
            ..Default::default()
        };
        let report = service.financial_report(&filter).await.unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.total_value, dec!(200.00));
    }

    #[tokio::test]
    async fn summary_zero_fills_every_status() {
        let (service, _, _) = service();
        let summary = service.dashboard_summary().await.unwrap();

        assert_eq!(summary.total_vehicles, 0);
        assert_eq!(
            summary.service_orders_by_status.len(),
            ServiceOrderStatus::iter().count()
        );
        assert!(summary
            .service_orders_by_status
            .values()
            .all(|&count| count == 0));
    }

    #[tokio::test]
    async fn cost_per_km_spreads_spend_over_distance() {
        let (service, _, vehicles) = service();
        let mut v = vehicle(45_000, 500);
        v.maintenance_history.push(MaintenanceHistoryItem {
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            service_type: "Inspection".to_string(),
            description: "40,000 km service".to_string(),
            cost: dec!(890.00),
            supplier: "AutoFast".to_string(),
            service_order_id: Uuid::new_v4(),
        });
        let id = vehicles.insert(v).await.unwrap().id;

        let per_km = service.cost_per_km(id).await.unwrap().unwrap();
        assert_eq!(per_km, dec!(0.02)); // 890 / 44_500
    }

    #[tokio::test]
    async fn cost_per_km_is_undefined_without_distance() {
        let (service, _, vehicles) = service();
        let id = vehicles.insert(vehicle(100, 100)).await.unwrap().id;
        assert_eq!(service.cost_per_km(id).await.unwrap(), None);
    }
}
