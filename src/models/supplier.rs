use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;
use uuid::Uuid;
use validator::Validate;

/// Supplier status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum SupplierStatus {
    Active,
    Inactive,
}

impl fmt::Display for SupplierStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupplierStatus::Active => write!(f, "Active"),
            SupplierStatus::Inactive => write!(f, "Inactive"),
        }
    }
}

/// Supplier registry entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Supplier {
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Legal name must be between 1 and 200 characters"
    ))]
    pub legal_name: String,

    pub trade_name: Option<String>,

    /// CNPJ/CPF tax identifier.
    pub tax_id: String,

    /// Service categories offered (workshop, parts, tires, fuel, ...).
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
    pub status: SupplierStatus,
}

impl Supplier {
    /// Trade name when present, legal name otherwise. The only place a
    /// supplier is turned into a display string.
    pub fn display_name(&self) -> &str {
        self.trade_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.legal_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_trade_name() {
        let mut s = Supplier {
            id: Uuid::new_v4(),
            legal_name: "AutoFast Workshop Ltd.".to_string(),
            trade_name: Some("AutoFast".to_string()),
            tax_id: "12.345.678/0001-99".to_string(),
            categories: vec!["workshop".to_string()],
            address: "123 Palm St".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            postal_code: "01000-000".to_string(),
            phone: "(11) 98765-4321".to_string(),
            email: "contact@autofast.com".to_string(),
            contact_name: "Carlos Alberto".to_string(),
            notes: None,
            status: SupplierStatus::Active,
        };
        assert_eq!(s.display_name(), "AutoFast");

        s.trade_name = None;
        assert_eq!(s.display_name(), "AutoFast Workshop Ltd.");

        s.trade_name = Some(String::new());
        assert_eq!(s.display_name(), "AutoFast Workshop Ltd.");
    }
}
