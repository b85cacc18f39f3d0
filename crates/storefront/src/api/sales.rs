//! Purchase and sales endpoints.

use serde::Serialize;
use tracing::instrument;

use folio_core::{ProductId, Sale, SaleId, SaleStatus, SalesStatistics};

use super::wire::{PurchaseReceipt, ResendReceipt, SaleEnvelope};
use super::{ApiClient, ApiError};

#[derive(Serialize)]
struct PurchaseBody {
    produto_id: ProductId,
}

#[derive(Serialize)]
struct StatusBody {
    status: SaleStatus,
}

impl ApiClient {
    /// Buy one product for the signed-in customer. The API emails the PDF.
    ///
    /// # Errors
    ///
    /// Returns an error if the API refuses the purchase or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn purchase(&self, product_id: ProductId) -> Result<PurchaseReceipt, ApiError> {
        self.post(
            "vendas/comprar",
            &PurchaseBody {
                produto_id: product_id,
            },
        )
        .await
    }

    /// The signed-in customer's purchases, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_purchases(&self) -> Result<Vec<Sale>, ApiError> {
        self.get("vendas/minhas-compras").await
    }

    /// Ask the API to email a purchased PDF again.
    ///
    /// # Errors
    ///
    /// Returns an error if the sale does not belong to the customer or the
    /// request fails.
    #[instrument(skip(self), fields(sale_id = %sale_id))]
    pub async fn resend_email(&self, sale_id: SaleId) -> Result<ResendReceipt, ApiError> {
        self.post(
            &format!("vendas/{sale_id}/reenviar-email"),
            &serde_json::json!({}),
        )
        .await
    }

    // =========================================================================
    // Back-office
    // =========================================================================

    /// Every sale.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_sales(&self) -> Result<Vec<Sale>, ApiError> {
        self.get("admin/vendas").await
    }

    /// Aggregated sales figures.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn sales_statistics(&self) -> Result<SalesStatistics, ApiError> {
        self.get("admin/vendas/estatisticas").await
    }

    /// Move a sale to another status.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(sale_id = %sale_id, status = %status))]
    pub async fn update_sale_status(
        &self,
        sale_id: SaleId,
        status: SaleStatus,
    ) -> Result<SaleEnvelope, ApiError> {
        self.put(
            &format!("admin/vendas/{sale_id}/status"),
            &StatusBody { status },
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_bodies_use_api_vocabulary() {
        assert_eq!(
            serde_json::to_value(PurchaseBody {
                produto_id: ProductId::new(4)
            })
            .unwrap(),
            serde_json::json!({"produto_id": 4})
        );
        assert_eq!(
            serde_json::to_value(StatusBody {
                status: SaleStatus::Cancelled
            })
            .unwrap(),
            serde_json::json!({"status": "cancelada"})
        );
    }
}
