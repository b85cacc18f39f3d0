//! Back-office endpoints: first-admin bootstrap, dashboard and settings.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::instrument;

use folio_core::{AdminUser, DashboardStats, StoreSettings};

use super::wire::{IdentityEnvelope, MessageBody, SettingsEnvelope};
use super::{ApiClient, ApiError};

#[derive(Serialize)]
struct AdminBody<'a> {
    usuario: &'a str,
    senha: &'a str,
}

#[derive(Serialize)]
struct TestEmailBody<'a> {
    email_teste: &'a str,
}

impl ApiClient {
    /// Create the first administrator. Only succeeds while none exists, and
    /// is sent without the session cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if an administrator already exists, the API rejects
    /// the password, or the request fails.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn create_first_admin(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<IdentityEnvelope<AdminUser>, ApiError> {
        let body = AdminBody {
            usuario: username,
            senha: password.expose_secret(),
        };
        self.post_anonymous("admin/criar-admin", &body).await
    }

    /// Headline numbers for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardStats, ApiError> {
        self.get("admin/dashboard").await
    }

    /// Full store settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_settings(&self) -> Result<StoreSettings, ApiError> {
        self.get("admin/configuracao").await
    }

    /// Save store settings and drop the cached branding.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the settings or the request fails.
    #[instrument(skip(self, settings))]
    pub async fn save_settings(
        &self,
        settings: &StoreSettings,
    ) -> Result<SettingsEnvelope, ApiError> {
        let envelope = self.put("admin/configuracao", settings).await?;
        self.invalidate_branding().await;
        Ok(envelope)
    }

    /// Send a test email with the saved SMTP settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API could not send the email or the request
    /// fails.
    #[instrument(skip(self), fields(to = %to))]
    pub async fn send_test_email(&self, to: &str) -> Result<Option<String>, ApiError> {
        let body: MessageBody = self
            .post("admin/testar-email", &TestEmailBody { email_teste: to })
            .await?;
        Ok(body.message)
    }
}
