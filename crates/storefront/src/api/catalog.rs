//! Catalog endpoints and public branding.

use tracing::{debug, instrument};

use folio_core::{Product, ProductId, ProductInput, StoreBranding};

use super::{ApiClient, ApiError, BRANDING_CACHE_KEY, wire::MessageBody};

impl ApiClient {
    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List the products the API exposes (active ones for shoppers).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("produtos").await
    }

    /// Get one product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get(&format!("produtos/{id}")).await
    }

    /// Create a product (administrator session required).
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the product or the request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        self.post("produtos", input).await
    }

    /// Replace a product's editable fields (administrator session required).
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the update or the request fails.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        self.put(&format!("produtos/{id}"), input).await
    }

    /// Deactivate a product. The API keeps the record for past sales.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn deactivate_product(&self, id: ProductId) -> Result<Option<String>, ApiError> {
        let body: MessageBody = self.delete(&format!("produtos/{id}")).await?;
        Ok(body.message)
    }

    // =========================================================================
    // Branding
    // =========================================================================

    /// Public store branding, cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the branding is not cached and the API request
    /// fails.
    #[instrument(skip(self))]
    pub async fn branding(&self) -> Result<StoreBranding, ApiError> {
        if let Some(branding) = self.inner.branding.get(BRANDING_CACHE_KEY).await {
            debug!("Cache hit for branding");
            return Ok(branding);
        }

        let branding: StoreBranding = self.get("configuracao-publica").await?;
        self.inner
            .branding
            .insert(BRANDING_CACHE_KEY, branding.clone())
            .await;
        Ok(branding)
    }

    /// Branding, falling back to the defaults when the API is unavailable.
    pub async fn branding_or_default(&self) -> StoreBranding {
        self.branding().await.unwrap_or_default()
    }

    /// Drop the cached branding so the next page shows saved settings.
    pub async fn invalidate_branding(&self) {
        self.inner.branding.invalidate(BRANDING_CACHE_KEY).await;
    }
}
