use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::supplier::Supplier;

#[async_trait]
pub trait SupplierRepository: Send + Sync {
    async fn insert(&self, supplier: Supplier) -> Result<Supplier, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Supplier>, ServiceError>;
    async fn save(&self, supplier: Supplier) -> Result<Supplier, ServiceError>;
    /// All suppliers, sorted by legal name.
    async fn list(&self) -> Result<Vec<Supplier>, ServiceError>;
}

#[derive(Debug, Default)]
pub struct InMemorySupplierRepository {
    suppliers: DashMap<Uuid, Supplier>,
}

impl InMemorySupplierRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SupplierRepository for InMemorySupplierRepository {
    async fn insert(&self, supplier: Supplier) -> Result<Supplier, ServiceError> {
        if self.suppliers.contains_key(&supplier.id) {
            return Err(ServiceError::InvalidOperation(format!(
                "Supplier {} already exists",
                supplier.id
            )));
        }
        self.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Supplier>, ServiceError> {
        Ok(self.suppliers.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, supplier: Supplier) -> Result<Supplier, ServiceError> {
        if !self.suppliers.contains_key(&supplier.id) {
            return Err(ServiceError::supplier_not_found(supplier.id));
        }
        self.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }

    async fn list(&self) -> Result<Vec<Supplier>, ServiceError> {
        let mut suppliers: Vec<Supplier> =
            self.suppliers.iter().map(|e| e.value().clone()).collect();
        suppliers.sort_by(|a, b| a.legal_name.cmp(&b.legal_name));
        Ok(suppliers)
    }
}
