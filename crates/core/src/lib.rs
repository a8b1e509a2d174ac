//! TAFE Shop Core - Shared types library.
//!
//! This crate provides common types used across all TAFE Shop components:
//! - `storefront` - Catalog, auth, cart and order state management
//! - `cli` - Command-line front end that drives the storefront
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for catalog and order IDs, prices, usernames,
//!   stored credentials and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
