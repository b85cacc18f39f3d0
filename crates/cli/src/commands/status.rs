//! Store API and session status.

use folio_storefront::api::ApiClient;
use folio_storefront::config::StorefrontConfig;
use folio_storefront::session::{AdminSession, CustomerSession, Principal, SessionState};

use super::CommandError;

/// Check that the store API answers, then probe both sessions.
///
/// A fresh process carries no session cookie, so both probes normally
/// report anonymous; the probe still proves the status endpoints work.
pub async fn run(config: &StorefrontConfig) -> Result<(), CommandError> {
    let api = ApiClient::new(config)?;

    let branding = api.branding().await?;
    tracing::info!(
        "Store API at {} is up (store: {})",
        config.api_base_url,
        branding.store_name
    );

    let customer = CustomerSession::new(api.clone());
    let admin = AdminSession::new(api);
    let (customer, admin) = tokio::join!(customer.probe(), admin.probe());

    tracing::info!("customer session: {}", describe(&customer));
    tracing::info!("admin session: {}", describe(&admin));
    Ok(())
}

fn describe<P: Principal>(state: &SessionState<P>) -> String {
    match state {
        SessionState::Loading => "pending".to_string(),
        SessionState::Anonymous => "anonymous".to_string(),
        SessionState::Authenticated(identity) => {
            format!("signed in as {}", identity.display_name())
        }
    }
}
