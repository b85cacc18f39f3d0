//! Core types for Folio.
//!
//! This module provides type-safe wrappers and the records exchanged with
//! the remote store API.

pub mod account;
pub mod catalog;
pub mod email;
pub mod id;
pub mod price;
pub mod sales;
pub mod settings;

pub use account::{AdminUser, Customer};
pub use catalog::{Product, ProductInput};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::CurrencyCode;
pub use sales::{DashboardStats, ProductSalesCount, Sale, SaleStatus, SalesStatistics};
pub use settings::{StoreBranding, StoreSettings};
