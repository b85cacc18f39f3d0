//! Administrator bootstrap.
//!
//! # Environment Variables
//!
//! - `FOLIO_ADMIN_PASSWORD` - Password for the new administrator; read from
//!   stdin when unset

use std::io::BufRead;

use folio_storefront::api::ApiClient;
use folio_storefront::config::StorefrontConfig;
use folio_storefront::session::{AdminSession, AuthResult, Credentials};
use secrecy::{ExposeSecret, SecretString};

use super::CommandError;

const PASSWORD_VAR: &str = "FOLIO_ADMIN_PASSWORD";

/// Read the new administrator's password from the environment or stdin.
pub fn read_password() -> Result<SecretString, CommandError> {
    if let Ok(password) = std::env::var(PASSWORD_VAR)
        && !password.is_empty()
    {
        return Ok(SecretString::from(password));
    }

    tracing::info!("Password for the new administrator (one line on stdin):");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    password_from_line(&line)
}

fn password_from_line(line: &str) -> Result<SecretString, CommandError> {
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(CommandError::MissingPassword);
    }
    Ok(SecretString::from(password.to_owned()))
}

/// Create the first administrator through the store API.
///
/// The store only accepts this while it has no administrator.
pub async fn bootstrap(
    config: &StorefrontConfig,
    username: &str,
    password: SecretString,
) -> Result<(), CommandError> {
    let api = ApiClient::new(config)?;
    let session = AdminSession::new(api);
    let credentials = Credentials::new(username, password.expose_secret());

    tracing::info!("Creating administrator {username} at {}", config.api_base_url);

    match session.create_first_admin(&credentials).await {
        AuthResult::Success { message } => {
            tracing::info!("{message}");
            Ok(())
        }
        AuthResult::Failure { message } => Err(CommandError::Rejected(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_from_line_strips_newline() {
        let password = password_from_line("s3cret\n").ok();
        assert_eq!(password.as_ref().map(|p| p.expose_secret()), Some("s3cret"));
    }

    #[test]
    fn test_blank_password_rejected() {
        assert!(matches!(
            password_from_line("\n"),
            Err(CommandError::MissingPassword)
        ));
    }
}
