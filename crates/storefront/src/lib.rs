//! TAFE Shop storefront library.
//!
//! Catalog loading, accounts and session, the shopping cart, checkout and
//! order history, and the HTML fragments that present them. All state lives
//! in two injected [`storage::KeyValueStore`]s; [`state::AppState`] wires the
//! managers together for one session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod views;
