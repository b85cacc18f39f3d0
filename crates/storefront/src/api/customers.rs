//! Customer account endpoints.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::instrument;

use folio_core::{Customer, CustomerId};

use super::wire::{CustomerEnvelope, IdentityEnvelope};
use super::{ApiClient, ApiError};

/// Fields a customer may change on their profile. `None` leaves a field as
/// it is.
#[derive(Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

impl std::fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ProfileUpdate {
    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    nome: &'a str,
    email: &'a str,
    senha: &'a str,
}

#[derive(Serialize)]
struct ProfileBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    nome: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    senha: Option<&'a str>,
}

#[derive(Serialize)]
struct ActiveBody {
    ativo: bool,
}

impl ApiClient {
    /// Create a customer account. The API signs the new customer in.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the registration or the request
    /// fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register_customer(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentityEnvelope<Customer>, ApiError> {
        let body = RegisterBody {
            nome: name,
            email,
            senha: password.expose_secret(),
        };
        self.post("clientes/cadastro", &body).await
    }

    /// The signed-in customer's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if no customer is signed in or the request fails.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<Customer, ApiError> {
        self.get("clientes/perfil").await
    }

    /// Update the signed-in customer's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the update or the request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<IdentityEnvelope<Customer>, ApiError> {
        let body = ProfileBody {
            nome: update.name.as_deref(),
            email: update.email.as_deref(),
            senha: update.password.as_ref().map(ExposeSecret::expose_secret),
        };
        self.put("clientes/perfil", &body).await
    }

    // =========================================================================
    // Back-office
    // =========================================================================

    /// Every customer account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        self.get("admin/clientes").await
    }

    /// Activate or deactivate a customer account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn set_customer_active(
        &self,
        id: CustomerId,
        active: bool,
    ) -> Result<CustomerEnvelope, ApiError> {
        self.put(&format!("admin/clientes/{id}"), &ActiveBody { ativo: active })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_body_omits_unchanged_fields() {
        let body = ProfileBody {
            nome: Some("Ana"),
            email: None,
            senha: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"nome": "Ana"})
        );
    }

    #[test]
    fn test_profile_update_debug_redacts_password() {
        let update = ProfileUpdate {
            password: Some(SecretString::from("hunter22")),
            ..ProfileUpdate::default()
        };
        let debug = format!("{update:?}");
        assert!(!debug.contains("hunter22"));
        assert!(!update.is_empty());
    }
}
