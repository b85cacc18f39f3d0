//! Response envelopes of the store API.
//!
//! The API speaks Portuguese (`logado`, `erro`, `mensagem`, ...). Every
//! envelope also accepts the English field names so a differently localised
//! deployment, or a test stub, can use either.

use serde::Deserialize;

use folio_core::{Customer, Sale, StoreSettings};

/// Body of a non-success response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "erro", alias = "error", default)]
    pub error: Option<String>,
    #[serde(rename = "mensagem", alias = "message", default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// The most specific message the server gave, if any.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|message| !message.trim().is_empty())
    }
}

/// Answer of a session status probe.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStatus<P> {
    #[serde(rename = "logado", alias = "authenticated", default)]
    pub authenticated: bool,
    #[serde(rename = "identity", alias = "cliente", alias = "admin")]
    pub identity: Option<P>,
}

impl<P> SessionStatus<P> {
    /// The identity, only when the server also says the session is live.
    pub fn into_identity(self) -> Option<P> {
        if self.authenticated {
            self.identity
        } else {
            None
        }
    }
}

/// A message plus the identity it concerns (login, register, profile update,
/// first-admin creation).
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityEnvelope<P> {
    #[serde(rename = "mensagem", alias = "message", default)]
    pub message: Option<String>,
    #[serde(rename = "identity", alias = "cliente", alias = "admin")]
    pub identity: Option<P>,
}

/// A bare `{ "mensagem": ... }` answer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageBody {
    #[serde(rename = "mensagem", alias = "message", default)]
    pub message: Option<String>,
}

/// Answer to a purchase.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseReceipt {
    #[serde(rename = "mensagem", alias = "message", default)]
    pub message: Option<String>,
    #[serde(rename = "venda", alias = "sale", default)]
    pub sale: Option<Sale>,
    #[serde(rename = "email_enviado", alias = "email_sent", default)]
    pub email_sent: bool,
    #[serde(rename = "mensagem_email", alias = "email_message", default)]
    pub email_message: Option<String>,
}

/// Answer to a request to resend a purchase email.
#[derive(Debug, Clone, Deserialize)]
pub struct ResendReceipt {
    #[serde(rename = "mensagem", alias = "message", default)]
    pub message: Option<String>,
    #[serde(rename = "email_enviado", alias = "email_sent", default)]
    pub email_sent: bool,
    #[serde(rename = "mensagem_email", alias = "email_message", default)]
    pub email_message: Option<String>,
}

/// Answer to a sale status change.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleEnvelope {
    #[serde(rename = "mensagem", alias = "message", default)]
    pub message: Option<String>,
    #[serde(rename = "venda", alias = "sale", default)]
    pub sale: Option<Sale>,
}

/// Answer to a customer activation change.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerEnvelope {
    #[serde(rename = "mensagem", alias = "message", default)]
    pub message: Option<String>,
    #[serde(rename = "cliente", alias = "customer", default)]
    pub customer: Option<Customer>,
}

/// Answer to saving the store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsEnvelope {
    #[serde(rename = "mensagem", alias = "message", default)]
    pub message: Option<String>,
    #[serde(rename = "configuracao", alias = "settings", default)]
    pub settings: Option<StoreSettings>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use folio_core::AdminUser;

    #[test]
    fn test_status_accepts_both_vocabularies() {
        let pt: SessionStatus<Customer> = serde_json::from_str(
            r#"{"logado": true, "cliente": {"id": 1, "nome": "Ana", "email": "ana@example.com"}}"#,
        )
        .unwrap();
        assert_eq!(pt.into_identity().unwrap().name, "Ana");

        let en: SessionStatus<AdminUser> = serde_json::from_str(
            r#"{"authenticated": true, "identity": {"id": 2, "username": "root"}}"#,
        )
        .unwrap();
        assert_eq!(en.into_identity().unwrap().username, "root");
    }

    #[test]
    fn test_status_not_logged_in() {
        let status: SessionStatus<Customer> = serde_json::from_str(r#"{"logado": false}"#).unwrap();
        assert!(status.into_identity().is_none());
    }

    #[test]
    fn test_error_body_prefers_error_field() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error": "bad credentials", "message": "x"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("bad credentials"));

        let blank: ErrorBody = serde_json::from_str(r#"{"erro": "  "}"#).unwrap();
        assert!(blank.into_message().is_none());
    }

    #[test]
    fn test_purchase_receipt() {
        let receipt: PurchaseReceipt = serde_json::from_str(
            r#"{
                "mensagem": "Compra realizada com sucesso",
                "venda": {"id": 1, "id_cliente": 2, "id_produto": 3,
                          "preco_total": 10.0, "status": "concluida"},
                "email_enviado": false,
                "mensagem_email": "Configurações de email não encontradas"
            }"#,
        )
        .unwrap();
        assert!(!receipt.email_sent);
        assert!(receipt.sale.is_some());
    }
}
