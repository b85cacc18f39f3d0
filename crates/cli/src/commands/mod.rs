//! CLI command implementations.

pub mod admin;
pub mod cart;
pub mod status;

use folio_storefront::api::ApiError;
use folio_storefront::config::{ConfigError, StorefrontConfig};
use folio_storefront::storage::StorageError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The store API call failed.
    #[error("Store API error: {}", .0.user_message())]
    Api(#[from] ApiError),

    /// The store API refused the request.
    #[error("{0}")]
    Rejected(String),

    /// No password was supplied.
    #[error("No password given: set FOLIO_ADMIN_PASSWORD or type it on stdin")]
    MissingPassword,

    /// The local cart slot could not be read or removed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Reading stdin failed.
    #[error("Failed to read stdin: {0}")]
    Io(#[from] std::io::Error),
}

/// Load the same configuration the storefront uses.
pub fn load_config() -> Result<StorefrontConfig, CommandError> {
    Ok(StorefrontConfig::from_env()?)
}
