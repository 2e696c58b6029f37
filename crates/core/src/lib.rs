//! Vitrina Core - Shared transfer types.
//!
//! This crate provides the records exchanged with the store's REST backend and
//! the small amount of client-side validation the storefront performs. It is
//! used by:
//! - `storefront` - View controller, REST client and HTTP shell
//! - `integration-tests` - End-to-end scenarios through the shell
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Wire names
//! follow the backend (`nombre`, `precio`, `cantidad`, ...) while the Rust
//! names are English.
//!
//! # Modules
//!
//! - [`types`] - Ids, prices, emails, catalog and cart records, orders, views

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
