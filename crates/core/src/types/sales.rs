//! Sales records and back-office statistics.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CustomerId, ProductId, SaleId};

/// Lifecycle state of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SaleStatus {
    #[serde(rename = "pendente", alias = "pending")]
    Pending,
    #[serde(rename = "concluida", alias = "completed")]
    Completed,
    #[serde(rename = "cancelada", alias = "cancelled")]
    Cancelled,
}

impl SaleStatus {
    /// All statuses, in the order the back-office offers them.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Completed, Self::Cancelled];

    /// Wire value understood by the store API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendente",
            Self::Completed => "concluida",
            Self::Cancelled => "cancelada",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for SaleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pendente" | "pending" => Ok(Self::Pending),
            "concluida" | "completed" => Ok(Self::Completed),
            "cancelada" | "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown sale status: {other}")),
        }
    }
}

/// A single purchase of one product by one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    #[serde(rename = "id_cliente", alias = "customer_id")]
    pub customer_id: CustomerId,
    #[serde(rename = "id_produto", alias = "product_id")]
    pub product_id: ProductId,
    #[serde(rename = "data_venda", alias = "sold_at", default)]
    pub sold_at: Option<NaiveDateTime>,
    #[serde(rename = "preco_total", alias = "total_price")]
    pub total_price: Decimal,
    pub status: SaleStatus,
    #[serde(rename = "email_enviado", alias = "email_sent", default)]
    pub email_sent: bool,
    #[serde(rename = "cliente_nome", alias = "customer_name", default)]
    pub customer_name: Option<String>,
    #[serde(rename = "produto_nome", alias = "product_name", default)]
    pub product_name: Option<String>,
}

/// Number of sales for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSalesCount {
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    #[serde(rename = "total_vendas", alias = "total_sales")]
    pub total_sales: u64,
}

/// Aggregated figures for the sales screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesStatistics {
    #[serde(rename = "total_vendas", alias = "total_sales")]
    pub total_sales: u64,
    #[serde(rename = "total_receita", alias = "total_revenue")]
    pub total_revenue: Decimal,
    /// Sale count keyed by the API's status value.
    #[serde(rename = "vendas_por_status", alias = "sales_by_status", default)]
    pub sales_by_status: BTreeMap<String, u64>,
    #[serde(rename = "produtos_mais_vendidos", alias = "top_products", default)]
    pub top_products: Vec<ProductSalesCount>,
}

impl SalesStatistics {
    /// Sale count for one status, zero when the API omitted it.
    #[must_use]
    pub fn count_for(&self, status: SaleStatus) -> u64 {
        self.sales_by_status
            .get(status.as_str())
            .copied()
            .unwrap_or(0)
    }
}

/// Headline numbers for the back-office dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(rename = "total_produtos", alias = "total_products")]
    pub total_products: u64,
    #[serde(rename = "total_clientes", alias = "total_customers")]
    pub total_customers: u64,
    #[serde(rename = "total_vendas", alias = "total_sales")]
    pub total_sales: u64,
    #[serde(rename = "receita_total", alias = "total_revenue")]
    pub total_revenue: Decimal,
    /// Sales in the last 30 days.
    #[serde(rename = "vendas_recentes", alias = "recent_sales")]
    pub recent_sales: u64,
    #[serde(rename = "produtos_mais_vendidos", alias = "top_products", default)]
    pub top_products: Vec<ProductSalesCount>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&SaleStatus::Completed).unwrap(),
            "\"concluida\""
        );
        let status: SaleStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, SaleStatus::Cancelled);
        assert_eq!("pendente".parse::<SaleStatus>().unwrap(), SaleStatus::Pending);
    }

    #[test]
    fn test_sale_from_store_payload() {
        let json = r#"{
            "id": 5, "id_cliente": 2, "id_produto": 3,
            "data_venda": "2024-06-01T08:00:00",
            "preco_total": 19.9, "status": "concluida",
            "email_enviado": true, "cliente_nome": "Ana", "produto_nome": "Guia"
        }"#;
        let sale: Sale = serde_json::from_str(json).unwrap();
        assert_eq!(sale.status, SaleStatus::Completed);
        assert_eq!(sale.total_price, Decimal::new(199, 1));
        assert!(sale.email_sent);
    }

    #[test]
    fn test_statistics_count_for_missing_status() {
        let json = r#"{
            "total_vendas": 4, "total_receita": 80.0,
            "vendas_por_status": {"concluida": 3, "pendente": 1},
            "produtos_mais_vendidos": [{"nome": "Guia", "total_vendas": 3}]
        }"#;
        let stats: SalesStatistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats.count_for(SaleStatus::Completed), 3);
        assert_eq!(stats.count_for(SaleStatus::Cancelled), 0);
        assert_eq!(stats.top_products.len(), 1);
    }
}
