//! Order aggregate

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment method category chosen at checkout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    CashOnDelivery,
    BankTransfer,
    Online,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cash_on_delivery",
            Self::BankTransfer => "bank_transfer",
            Self::Online => "online",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash_on_delivery" => Some(Self::CashOnDelivery),
            "bank_transfer" => Some(Self::BankTransfer),
            "online" => Some(Self::Online),
            _ => None,
        }
    }
}

/// Fulfillment stage of an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Received,
    Paid,
    Sent,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Paid => "paid",
            Self::Sent => "sent",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "received" => Some(Self::Received),
            "paid" => Some(Self::Paid),
            "sent" => Some(Self::Sent),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Parcel delivery service an order ships with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Carrier {
    NovaPoshta,
    Ukrposhta,
}

impl Carrier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NovaPoshta => "nova_poshta",
            Self::Ukrposhta => "ukrposhta",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "nova_poshta" => Some(Self::NovaPoshta),
            "ukrposhta" => Some(Self::Ukrposhta),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub store_id: Uuid,
    pub order_number: String,
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub carrier: String,
    pub city: String,
    pub address: String,
    pub tracking_number: Option<String>,
    pub is_paid: bool,
    pub order_state: String,
    pub order_status: String,
    pub invoice_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn state(&self) -> Option<OrderState> {
        OrderState::parse(&self.order_state)
    }

    pub fn status(&self) -> Option<OrderStatus> {
        OrderStatus::parse(&self.order_status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    /// Null once the referenced product row is deleted.
    pub product_id: Option<Uuid>,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// An order counts as paid when the caller says so, or when a
/// pay-on-delivery order is already marked as sent.
pub fn paid_on_submit(requested: bool, state: OrderState, status: OrderStatus) -> bool {
    requested || (state == OrderState::CashOnDelivery && status == OrderStatus::Sent)
}

pub fn order_total(items: &[OrderItem]) -> Decimal {
    items
        .iter()
        .map(|item| item.unit_price * Decimal::from(item.quantity))
        .sum()
}

/// Order total in minor currency units (kopecks), as the payment
/// provider expects. `None` when the total does not fit an `i64`.
pub fn total_in_minor_units(total: Decimal) -> Option<i64> {
    (total * Decimal::from(100)).trunc().to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: Decimal, quantity: i32) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            product_id: Some(Uuid::new_v4()),
            name: "Книга".into(),
            unit_price: price,
            quantity,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn paid_when_requested() {
        assert!(paid_on_submit(true, OrderState::Online, OrderStatus::Received));
    }

    #[test]
    fn cod_sent_counts_as_paid() {
        assert!(paid_on_submit(false, OrderState::CashOnDelivery, OrderStatus::Sent));
        assert!(!paid_on_submit(false, OrderState::CashOnDelivery, OrderStatus::Received));
        assert!(!paid_on_submit(false, OrderState::BankTransfer, OrderStatus::Sent));
    }

    #[test]
    fn total_sums_lines() {
        let items = vec![item(Decimal::new(24950, 2), 2), item(Decimal::new(9900, 2), 1)];
        assert_eq!(order_total(&items), Decimal::new(59800, 2));
    }

    #[test]
    fn total_converts_to_kopecks() {
        assert_eq!(total_in_minor_units(Decimal::new(59800, 2)), Some(59800));
        assert_eq!(total_in_minor_units(Decimal::new(1, 0)), Some(100));
    }
}
