//! Back-office store settings and test email.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use folio_core::StoreSettings;

use super::{Loaded, load};
use crate::guards::RequireAdmin;
use crate::notices::{Screen, StatusMessage};
use crate::routes::{Layout, non_blank, notify, report_failure};
use crate::state::AppState;

const SETTINGS: &str = "/admin/settings";

/// Settings page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/settings.html")]
pub struct SettingsTemplate {
    pub layout: Layout,
    pub settings: StoreSettings,
}

/// Settings form data.
///
/// The SMTP password field is always empty on render; leaving it blank keeps
/// the saved password.
#[derive(Deserialize)]
pub struct SettingsForm {
    pub store_name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub logo_path: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub sender_email: Option<String>,
}

impl SettingsForm {
    fn into_settings(self) -> Result<StoreSettings, String> {
        let smtp_port = self
            .smtp_port
            .trim()
            .parse::<u16>()
            .map_err(|_| format!("Invalid SMTP port: {}", self.smtp_port))?;

        Ok(StoreSettings {
            store_name: self.store_name.trim().to_string(),
            primary_color: self.primary_color.trim().to_string(),
            secondary_color: self.secondary_color.trim().to_string(),
            logo_path: non_blank(self.logo_path),
            smtp_host: non_blank(self.smtp_host),
            smtp_port,
            smtp_user: non_blank(self.smtp_user),
            smtp_password: non_blank(self.smtp_password),
            sender_email: non_blank(self.sender_email),
        })
    }
}

/// Test email form data.
#[derive(Debug, Deserialize)]
pub struct TestEmailForm {
    pub email: String,
}

/// Display the settings form.
#[instrument(skip(state, _admin))]
pub async fn show(State(state): State<AppState>, RequireAdmin(_admin): RequireAdmin) -> Response {
    let layout = Layout::load(&state, Screen::AdminSettings).await;
    let (settings, layout) = match load(&state, SETTINGS, state.api().get_settings().await).await {
        Loaded::Ready(settings) => (settings, layout),
        Loaded::Failed(message) => (StoreSettings::default(), layout.or_notice(Some(message))),
        Loaded::Expired(response) => return response,
    };

    SettingsTemplate { layout, settings }.into_response()
}

/// Save settings.
#[instrument(skip(state, _admin, form))]
pub async fn save(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Form(form): Form<SettingsForm>,
) -> Redirect {
    let settings = match form.into_settings() {
        Ok(settings) => settings,
        Err(message) => {
            return notify(&state, Screen::AdminSettings, StatusMessage::error(message), SETTINGS);
        }
    };

    match state.api().save_settings(&settings).await {
        Ok(envelope) => notify(
            &state,
            Screen::AdminSettings,
            StatusMessage::success(
                envelope
                    .message
                    .unwrap_or_else(|| "Settings saved".to_string()),
            ),
            SETTINGS,
        ),
        Err(e) => report_failure(&state, state.admin(), Screen::AdminSettings, &e, SETTINGS).await,
    }
}

/// Send a test email. A blank address is rejected without calling the API.
#[instrument(skip(state, _admin))]
pub async fn test_email(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Form(form): Form<TestEmailForm>,
) -> Redirect {
    let to = form.email.trim();
    if to.is_empty() {
        return notify(
            &state,
            Screen::AdminSettings,
            StatusMessage::error("Enter an email address for the test"),
            SETTINGS,
        );
    }

    match state.api().send_test_email(to).await {
        Ok(message) => notify(
            &state,
            Screen::AdminSettings,
            StatusMessage::success(message.unwrap_or_else(|| "Test email sent".to_string())),
            SETTINGS,
        ),
        Err(e) => report_failure(&state, state.admin(), Screen::AdminSettings, &e, SETTINGS).await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(port: &str, password: &str) -> SettingsForm {
        SettingsForm {
            store_name: " Folio ".to_string(),
            primary_color: "#112233".to_string(),
            secondary_color: "#445566".to_string(),
            logo_path: Some(String::new()),
            smtp_host: Some("smtp.example.com".to_string()),
            smtp_port: port.to_string(),
            smtp_user: None,
            smtp_password: Some(password.to_string()),
            sender_email: None,
        }
    }

    #[test]
    fn test_blank_password_keeps_saved_one() {
        let settings = form("587", "").into_settings().unwrap();
        assert!(settings.smtp_password.is_none());
        assert_eq!(settings.store_name, "Folio");
        assert!(settings.logo_path.is_none());
    }

    #[test]
    fn test_invalid_port() {
        assert!(form("70000", "x").into_settings().is_err());
    }
}
