//! Customer and administrator records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{AdminId, CustomerId};

/// A storefront customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    pub email: Email,
    #[serde(rename = "ativo", alias = "active", default = "default_true")]
    pub active: bool,
    #[serde(rename = "data_cadastro", alias = "registered_at", default)]
    pub registered_at: Option<NaiveDateTime>,
}

/// A back-office administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: AdminId,
    #[serde(rename = "usuario", alias = "username")]
    pub username: String,
    #[serde(rename = "ativo", alias = "active", default = "default_true")]
    pub active: bool,
    #[serde(rename = "data_criacao", alias = "created_at", default)]
    pub created_at: Option<NaiveDateTime>,
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_from_store_payload() {
        let json = r#"{
            "id": 9,
            "nome": "Ana",
            "email": "ana@example.com",
            "ativo": false,
            "data_cadastro": "2024-02-03T04:05:06"
        }"#;
        let customer: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.id, CustomerId::new(9));
        assert_eq!(customer.email.as_str(), "ana@example.com");
        assert!(!customer.active);
    }

    #[test]
    fn test_admin_without_timestamp() {
        let admin: AdminUser = serde_json::from_str(r#"{"id": 1, "usuario": "root"}"#).unwrap();
        assert_eq!(admin.username, "root");
        assert!(admin.active);
        assert!(admin.created_at.is_none());
    }
}
