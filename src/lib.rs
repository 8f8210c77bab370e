//! Kazka back-office
//!
//! Order management and fulfillment service for a children's-book store
//! chain. Keeps product stock consistent with the set of active order
//! lines, hands parcels to Nova Poshta / Ukrposhta, collects online
//! payments through a merchant invoice API and reports revenue per store.

pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod fulfillment;
pub mod http;
pub mod state;
pub mod store;
