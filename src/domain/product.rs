//! Product stock and archival rules

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Archival is one-way: a product depleted by orders is archived, but a
/// restore that brings stock back above zero does not un-archive it.
pub fn archived_after(new_quantity: i64, was_archived: bool) -> bool {
    was_archived || new_quantity <= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depleted_product_is_archived() {
        assert!(archived_after(0, false));
        assert!(archived_after(-3, false));
        assert!(!archived_after(1, false));
    }

    #[test]
    fn restore_does_not_unarchive() {
        assert!(archived_after(5, true));
    }
}
