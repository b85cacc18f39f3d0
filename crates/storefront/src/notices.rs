//! Transient per-screen status messages.
//!
//! A mutating view posts a [`StatusMessage`] for its screen and redirects;
//! the screen shows the message on every render until it expires 5 seconds
//! later. Posting again replaces the message and its deadline, so an older
//! message can never outlive or clear a newer one.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// How long a message stays visible.
pub const MESSAGE_TTL: Duration = Duration::from_secs(5);

/// Screens that show status banners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Catalog,
    Cart,
    Login,
    Register,
    Profile,
    AdminLogin,
    AdminDashboard,
    AdminProducts,
    AdminCustomers,
    AdminSales,
    AdminSettings,
}

impl Screen {
    /// The screen rendered at a local `path`, ignoring any query string.
    /// Unknown paths fall back to the catalog.
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        match path {
            "/cart" => Self::Cart,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/profile" => Self::Profile,
            "/admin" | "/admin/login" => Self::AdminLogin,
            "/admin/dashboard" => Self::AdminDashboard,
            "/admin/products" => Self::AdminProducts,
            "/admin/customers" => Self::AdminCustomers,
            "/admin/sales" => Self::AdminSales,
            "/admin/settings" => Self::AdminSettings,
            _ => Self::Catalog,
        }
    }
}

/// Banner flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

impl StatusKind {
    /// CSS class suffix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A banner: a headline and an optional detail line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    pub details: Option<String>,
}

impl StatusMessage {
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, StatusKind::Error)
    }
}

#[derive(Debug)]
struct Posted {
    message: StatusMessage,
    expires_at: Instant,
}

/// Latest message per screen.
#[derive(Debug, Default)]
pub struct Notices {
    slots: Mutex<HashMap<Screen, Posted>>,
}

impl Notices {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `message` on `screen` for [`MESSAGE_TTL`], replacing whatever was
    /// there.
    pub fn post(&self, screen: Screen, message: StatusMessage) {
        tracing::debug!(?screen, kind = message.kind.as_str(), text = %message.text, "Status message");
        let posted = Posted {
            message,
            expires_at: Instant::now() + MESSAGE_TTL,
        };
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(screen, posted);
    }

    /// The live message for `screen`, dropping it once expired.
    #[must_use]
    pub fn current(&self, screen: Screen) -> Option<StatusMessage> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match slots.get(&screen) {
            Some(posted) if Instant::now() < posted.expires_at => Some(posted.message.clone()),
            Some(_) => {
                slots.remove(&screen);
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_message_expires_after_ttl() {
        let notices = Notices::new();
        notices.post(Screen::Cart, StatusMessage::success("Saved"));

        tokio::time::advance(Duration::from_millis(4_900)).await;
        assert_eq!(
            notices.current(Screen::Cart),
            Some(StatusMessage::success("Saved"))
        );

        tokio::time::advance(Duration::from_millis(200)).await;
        assert_eq!(notices.current(Screen::Cart), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_deadline_never_clears_newer_message() {
        let notices = Notices::new();
        notices.post(Screen::Profile, StatusMessage::error("first"));

        tokio::time::advance(Duration::from_secs(3)).await;
        notices.post(Screen::Profile, StatusMessage::success("second"));

        // The first message's deadline passes here.
        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(
            notices.current(Screen::Profile).map(|m| m.text),
            Some("second".to_string())
        );

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(notices.current(Screen::Profile), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_screens_are_independent() {
        let notices = Notices::new();
        notices.post(Screen::AdminSales, StatusMessage::success("Updated"));
        assert!(notices.current(Screen::AdminProducts).is_none());
        assert!(notices.current(Screen::AdminSales).is_some());
    }

    #[test]
    fn test_screen_for_path() {
        assert_eq!(Screen::for_path("/cart"), Screen::Cart);
        assert_eq!(Screen::for_path("/profile"), Screen::Profile);
        assert_eq!(Screen::for_path("/admin/products?edit=3"), Screen::AdminProducts);
        assert_eq!(Screen::for_path("/admin/sales/"), Screen::AdminSales);
        assert_eq!(Screen::for_path("/products/2"), Screen::Catalog);
        assert_eq!(Screen::for_path("/"), Screen::Catalog);
    }

    #[test]
    fn test_details() {
        let message = StatusMessage::success("Purchase completed").with_details("PDF sent");
        assert_eq!(message.details.as_deref(), Some("PDF sent"));
        assert!(!message.is_error());
    }
}
