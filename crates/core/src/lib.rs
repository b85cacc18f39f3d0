//! Folio Core - Shared types library.
//!
//! This crate provides the types shared by the Folio components:
//! - `storefront` - Locally served storefront and back-office client
//! - `cli` - Command-line tools for bootstrap and local state inspection
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Records
//! mirror the JSON documents returned by the remote store API, which uses
//! Portuguese field names; every record accepts the English names as aliases.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, emails, and store records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
