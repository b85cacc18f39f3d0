//! Store configuration records.

use serde::{Deserialize, Serialize};

/// Public branding shown in the storefront header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreBranding {
    #[serde(rename = "nome_loja", alias = "store_name")]
    pub store_name: String,
    #[serde(rename = "cor_primaria", alias = "primary_color", default = "default_primary")]
    pub primary_color: String,
    #[serde(rename = "cor_secundaria", alias = "secondary_color", default = "default_secondary")]
    pub secondary_color: String,
    #[serde(alias = "logo", default)]
    pub logo_path: Option<String>,
}

impl Default for StoreBranding {
    fn default() -> Self {
        Self {
            store_name: "Folio".to_string(),
            primary_color: default_primary(),
            secondary_color: default_secondary(),
            logo_path: None,
        }
    }
}

/// Full store settings edited from the back-office.
///
/// The SMTP password is write-only: the API never returns it, and it is only
/// sent when the administrator typed a new one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(rename = "nome_loja", alias = "store_name", default)]
    pub store_name: String,
    #[serde(rename = "cor_primaria", alias = "primary_color", default = "default_primary")]
    pub primary_color: String,
    #[serde(rename = "cor_secundaria", alias = "secondary_color", default = "default_secondary")]
    pub secondary_color: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(rename = "email_smtp_host", alias = "smtp_host", default)]
    pub smtp_host: Option<String>,
    #[serde(rename = "email_smtp_port", alias = "smtp_port", default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(rename = "email_usuario", alias = "smtp_user", default)]
    pub smtp_user: Option<String>,
    #[serde(
        rename = "email_senha",
        alias = "smtp_password",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub smtp_password: Option<String>,
    #[serde(rename = "email_remetente", alias = "sender_email", default)]
    pub sender_email: Option<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_name: String::new(),
            primary_color: default_primary(),
            secondary_color: default_secondary(),
            logo_path: None,
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_user: None,
            smtp_password: None,
            sender_email: None,
        }
    }
}

impl std::fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSettings")
            .field("store_name", &self.store_name)
            .field("primary_color", &self.primary_color)
            .field("secondary_color", &self.secondary_color)
            .field("logo_path", &self.logo_path)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "[REDACTED]"))
            .field("sender_email", &self.sender_email)
            .finish()
    }
}

fn default_primary() -> String {
    "#007bff".to_string()
}

fn default_secondary() -> String {
    "#6c757d".to_string()
}

const fn default_smtp_port() -> u16 {
    587
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_omit_empty_password() {
        let settings = StoreSettings {
            store_name: "Folio".to_string(),
            ..StoreSettings::default()
        };
        let value = serde_json::to_value(&settings).unwrap();
        assert!(value.get("email_senha").is_none());
        assert_eq!(value["email_smtp_port"], 587);
    }

    #[test]
    fn test_settings_debug_redacts_password() {
        let settings = StoreSettings {
            smtp_password: Some("hunter2-smtp".to_string()),
            ..StoreSettings::default()
        };
        let debug = format!("{settings:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2-smtp"));
    }

    #[test]
    fn test_branding_defaults_colors() {
        let branding: StoreBranding =
            serde_json::from_str(r#"{"nome_loja": "Loja", "logo_path": null}"#).unwrap();
        assert_eq!(branding.primary_color, "#007bff");
        assert!(branding.logo_path.is_none());
    }
}
