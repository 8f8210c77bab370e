//! Domain types and the inventory reconciliation rules.

pub mod order;
pub mod product;
pub mod reconcile;
