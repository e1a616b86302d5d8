use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::supplier::{Supplier, SupplierStatus};
use crate::repositories::SupplierRepository;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewSupplier {
    #[validate(length(min = 1, max = 200, message = "Legal name is required"))]
    pub legal_name: String,
    pub trade_name: Option<String>,
    pub tax_id: String,
    pub categories: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub contact_name: String,
    pub notes: Option<String>,
}

/// Service for the supplier registry.
#[derive(Clone)]
pub struct SupplierService {
    suppliers: Arc<dyn SupplierRepository>,
    event_sender: EventSender,
}

impl SupplierService {
    pub fn new(suppliers: Arc<dyn SupplierRepository>, event_sender: EventSender) -> Self {
        Self {
            suppliers,
            event_sender,
        }
    }

    /// Registers a new supplier. New suppliers always start `Active`.
    #[instrument(skip(self, input), fields(legal_name = %input.legal_name))]
    pub async fn create_supplier(&self, input: NewSupplier) -> Result<Supplier, ServiceError> {
        input.validate()?;

        let supplier = Supplier {
            id: Uuid::new_v4(),
            legal_name: input.legal_name,
            trade_name: input.trade_name,
            tax_id: input.tax_id,
            categories: input.categories,
            address: input.address,
            city: input.city,
            state: input.state,
            postal_code: input.postal_code,
            phone: input.phone,
            email: input.email,
            contact_name: input.contact_name,
            notes: input.notes,
            status: SupplierStatus::Active,
        };
        let supplier = self.suppliers.insert(supplier).await?;

        info!(supplier_id = %supplier.id, "supplier registered");
        self.publish(Event::SupplierCreated(supplier.id)).await?;
        Ok(supplier)
    }

    pub async fn get_supplier(&self, supplier_id: Uuid) -> Result<Option<Supplier>, ServiceError> {
        self.suppliers.find_by_id(supplier_id).await
    }

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, ServiceError> {
        self.suppliers.list().await
    }

    #[instrument(skip(self, supplier), fields(supplier_id = %supplier.id))]
    pub async fn update_supplier(&self, supplier: Supplier) -> Result<Supplier, ServiceError> {
        supplier.validate()?;
        let supplier = self.suppliers.save(supplier).await?;
        self.publish(Event::SupplierUpdated(supplier.id)).await?;
        Ok(supplier)
    }

    #[instrument(skip(self), fields(supplier_id = %supplier_id))]
    pub async fn set_supplier_status(
        &self,
        supplier_id: Uuid,
        status: SupplierStatus,
    ) -> Result<Supplier, ServiceError> {
        let mut supplier = self
            .suppliers
            .find_by_id(supplier_id)
            .await?
            .ok_or_else(|| ServiceError::supplier_not_found(supplier_id))?;

        let old_status = supplier.status;
        supplier.status = status;
        let supplier = self.suppliers.save(supplier).await?;

        self.publish(Event::SupplierStatusChanged {
            supplier_id,
            old_status,
            new_status: status,
        })
        .await?;
        Ok(supplier)
    }

    async fn publish(&self, event: Event) -> Result<(), ServiceError> {
        self.event_sender
            .send(event)
            .await
            .map_err(ServiceError::EventError)
    }
}
