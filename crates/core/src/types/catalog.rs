//! Catalog records.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A PDF product as listed by the store API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    #[serde(rename = "descricao", alias = "description", default)]
    pub description: Option<String>,
    #[serde(rename = "preco", alias = "price")]
    pub price: Decimal,
    /// Server-side path of the PDF; only populated for administrators.
    #[serde(rename = "caminho_pdf", alias = "pdf_path", default)]
    pub pdf_path: Option<String>,
    #[serde(rename = "imagem_capa", alias = "cover_image", default)]
    pub cover_image: Option<String>,
    #[serde(rename = "ativo", alias = "active", default = "default_true")]
    pub active: bool,
    #[serde(rename = "data_criacao", alias = "created_at", default)]
    pub created_at: Option<NaiveDateTime>,
}

const fn default_true() -> bool {
    true
}

/// Body for creating or updating a product from the back-office.
///
/// Blank optional fields are sent as `null` so the API clears them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "preco", with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "caminho_pdf")]
    pub pdf_path: Option<String>,
    #[serde(rename = "imagem_capa")]
    pub cover_image: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_store_payload() {
        let json = r#"{
            "id": 3,
            "nome": "Guia de Rust",
            "descricao": null,
            "preco": 29.9,
            "caminho_pdf": null,
            "imagem_capa": "/covers/rust.png",
            "ativo": true,
            "data_criacao": "2024-05-01T10:20:30.123456"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.name, "Guia de Rust");
        assert_eq!(product.price, Decimal::new(299, 1));
        assert_eq!(product.cover_image.as_deref(), Some("/covers/rust.png"));
        assert!(product.created_at.is_some());
    }

    #[test]
    fn test_product_accepts_english_names() {
        let json = r#"{"id": 1, "name": "Book", "price": 10}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.name, "Book");
        assert!(product.active);
        assert!(product.description.is_none());
    }

    #[test]
    fn test_product_input_sends_price_as_number() {
        let input = ProductInput {
            name: "Book".to_string(),
            description: None,
            price: Decimal::new(1050, 2),
            pdf_path: None,
            cover_image: None,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["nome"], "Book");
        assert!(value["preco"].is_number());
        assert!(value["descricao"].is_null());
    }
}
