//! Order lifecycle and fulfillment orchestration.
//!
//! Keeps product stock consistent with the set of currently-active order
//! lines and hands parcels to the configured carrier. Every step is a
//! sequential, non-retried database or network call: there is no
//! transaction spanning the stock adjustments and the external calls, so
//! an external failure after the order row is persisted leaves the
//! decremented stock in place.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::clients::monobank::InvoiceStatus;
use crate::clients::{
    CargoType, CarrierRegistry, Dimensions, InvoiceRequest, Notifier, ParcelSpec, PaymentProvider,
    Recipient, ShipmentRequest,
};
use crate::domain::order::{
    order_total, paid_on_submit, total_in_minor_units, Carrier, Order, OrderItem, OrderState,
    OrderStatus,
};
use crate::domain::product::Product;
use crate::domain::reconcile::{self, LineQty};
use crate::error::ApiError;
use crate::store;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LineRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewOrder {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub surname: String,
    #[validate(length(min = 5))]
    pub phone: String,
    pub carrier: Carrier,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub address: String,
    pub order_state: OrderState,
    #[serde(default)]
    pub order_status: Option<OrderStatus>,
    #[serde(default)]
    pub is_paid: bool,
    #[validate(length(min = 1))]
    pub items: Vec<LineRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OrderUpdate {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub surname: String,
    #[validate(length(min = 5))]
    pub phone: String,
    pub carrier: Carrier,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub address: String,
    pub order_state: OrderState,
    pub order_status: OrderStatus,
    #[serde(default)]
    pub is_paid: bool,
    #[validate(length(min = 1))]
    pub items: Vec<LineRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ShipmentOptions {
    #[validate(range(min = 0.01))]
    pub weight_kg: f64,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    pub cargo_type: CargoType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub seats: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize)]
pub struct CreatedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// Payment page to redirect the customer to, for online orders.
    pub payment_url: Option<String>,
}

/// Builds item rows from the submitted lines, snapshotting product name
/// and price. Duplicate lines for one product are merged. Every line
/// must reference a product of this store.
fn resolve_items(
    order_id: Uuid,
    lines: &[LineRequest],
    products: &[Product],
) -> Result<Vec<OrderItem>, ApiError> {
    let requested: Vec<LineQty> = lines
        .iter()
        .map(|line| LineQty::new(line.product_id, i64::from(line.quantity)))
        .collect();
    let merged = reconcile::quantity_by_product(&requested);

    let now = Utc::now();
    let mut items = Vec::with_capacity(merged.len());
    for (product_id, quantity) in merged {
        let product = products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown product {product_id}")))?;
        items.push(OrderItem {
            id: Uuid::new_v4(),
            order_id,
            product_id: Some(product_id),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: quantity.clamp(1, i64::from(i32::MAX)) as i32,
            created_at: now,
        });
    }
    Ok(items)
}

fn line_qtys(items: &[OrderItem]) -> Vec<LineQty> {
    items
        .iter()
        .filter_map(|item| {
            item.product_id
                .map(|id| LineQty::new(id, i64::from(item.quantity)))
        })
        .collect()
}

async fn apply_deltas(
    db: &PgPool,
    store_id: Uuid,
    old: &[LineQty],
    new: &[LineQty],
) -> Result<(), ApiError> {
    for delta in reconcile::stock_deltas(old, new) {
        // A deleted product yields None; its line keeps the snapshot.
        if let Some(level) =
            store::products::adjust_stock(db, store_id, delta.product_id, delta.change).await?
        {
            if level.is_archived && level.quantity <= 0 {
                tracing::info!(product_id = %delta.product_id, "product depleted, archived");
            }
        }
    }
    Ok(())
}

async fn load_products_for(
    db: &PgPool,
    store_id: Uuid,
    lines: &[LineRequest],
) -> Result<Vec<Product>, ApiError> {
    let ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
    Ok(store::products::find_for_order(db, store_id, &ids).await?)
}

/// Staff-facing summary sent to the store chat.
pub fn order_message(order: &Order, items: &[OrderItem], total: Decimal) -> String {
    let mut text = format!(
        "Нове замовлення {}\n{} {}, тел. {}\n",
        order.order_number, order.name, order.surname, order.phone
    );
    for item in items {
        text.push_str(&format!("• {} × {}\n", item.name, item.quantity));
    }
    text.push_str(&format!("Разом: {total} грн"));
    text
}

pub async fn create_order(
    db: &PgPool,
    notifier: &dyn Notifier,
    payments: &dyn PaymentProvider,
    store_id: Uuid,
    input: NewOrder,
) -> Result<CreatedOrder, ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if !store::store_exists(db, store_id).await? {
        return Err(ApiError::NotFound("store"));
    }

    let status = input.order_status.unwrap_or(OrderStatus::Received);
    let is_paid = paid_on_submit(input.is_paid, input.order_state, status);

    let now = Utc::now();
    let order = Order {
        id: Uuid::new_v4(),
        store_id,
        order_number: format!("ORD-{:08}", rand::random::<u32>()),
        name: input.name,
        surname: input.surname,
        phone: input.phone,
        carrier: input.carrier.as_str().to_string(),
        city: input.city,
        address: input.address,
        tracking_number: None,
        is_paid,
        order_state: input.order_state.as_str().to_string(),
        order_status: status.as_str().to_string(),
        invoice_id: None,
        created_at: now,
        updated_at: now,
    };

    let products = load_products_for(db, store_id, &input.items).await?;
    let items = resolve_items(order.id, &input.items, &products)?;

    store::orders::insert(db, &order).await?;
    store::orders::insert_items(db, &items).await?;
    apply_deltas(db, store_id, &[], &line_qtys(&items)).await?;

    let total = order_total(&items);
    notifier.order_created(&order_message(&order, &items, total)).await?;

    let mut order = order;
    let payment_url = if input.order_state == OrderState::Online {
        let amount_minor = total_in_minor_units(total)
            .ok_or_else(|| ApiError::BadRequest("order total out of range".into()))?;
        let invoice = payments
            .create_invoice(&InvoiceRequest {
                amount_minor,
                reference: order.id,
                destination: format!("Замовлення {}", order.order_number),
            })
            .await?;
        store::orders::set_invoice(db, order.id, &invoice.invoice_id).await?;
        order.invoice_id = Some(invoice.invoice_id);
        Some(invoice.page_url)
    } else {
        None
    };

    tracing::info!(order_id = %order.id, order_number = %order.order_number, "order created");
    Ok(CreatedOrder {
        order,
        items,
        payment_url,
    })
}

pub async fn update_order(
    db: &PgPool,
    store_id: Uuid,
    order_id: Uuid,
    input: OrderUpdate,
) -> Result<OrderWithItems, ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let mut order = store::orders::find(db, store_id, order_id)
        .await?
        .ok_or(ApiError::NotFound("order"))?;

    let old_items = store::orders::items_of(db, order_id).await?;
    let products = load_products_for(db, store_id, &input.items).await?;
    let new_items = resolve_items(order_id, &input.items, &products)?;

    apply_deltas(db, store_id, &line_qtys(&old_items), &line_qtys(&new_items)).await?;

    // Wholesale replacement of the line set.
    store::orders::delete_items(db, order_id).await?;
    store::orders::insert_items(db, &new_items).await?;

    order.name = input.name;
    order.surname = input.surname;
    order.phone = input.phone;
    order.carrier = input.carrier.as_str().to_string();
    order.city = input.city;
    order.address = input.address;
    order.is_paid = paid_on_submit(input.is_paid, input.order_state, input.order_status);
    order.order_state = input.order_state.as_str().to_string();
    order.order_status = input.order_status.as_str().to_string();
    store::orders::update_header(db, &order).await?;

    tracing::info!(order_id = %order.id, "order updated");
    Ok(OrderWithItems {
        order,
        items: new_items,
    })
}

pub async fn delete_order(db: &PgPool, store_id: Uuid, order_id: Uuid) -> Result<(), ApiError> {
    let order = store::orders::find(db, store_id, order_id)
        .await?
        .ok_or(ApiError::NotFound("order"))?;

    let items = store::orders::items_of(db, order_id).await?;
    apply_deltas(db, store_id, &line_qtys(&items), &[]).await?;

    store::orders::delete_items(db, order_id).await?;
    store::orders::delete(db, order_id).await?;

    tracing::info!(order_id = %order.id, "order deleted, stock restored");
    Ok(())
}

pub async fn create_shipment(
    db: &PgPool,
    carriers: &CarrierRegistry,
    store_id: Uuid,
    order_id: Uuid,
    options: ShipmentOptions,
) -> Result<Order, ApiError> {
    options
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let mut order = store::orders::find(db, store_id, order_id)
        .await?
        .ok_or(ApiError::NotFound("order"))?;
    if order.city.is_empty() || order.address.is_empty() {
        return Err(ApiError::BadRequest(
            "order has no delivery city/address".into(),
        ));
    }
    let carrier = Carrier::parse(&order.carrier)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown carrier {}", order.carrier)))?;

    let items = store::orders::items_of(db, order_id).await?;
    let total = order_total(&items);

    let recipient = Recipient {
        first_name: order.name.clone(),
        last_name: order.surname.clone(),
        phone: order.phone.clone(),
        city: order.city.clone(),
        address: order.address.clone(),
    };

    let api = carriers.get(carrier);
    let recipient_ref = api.ensure_recipient(&recipient).await?;

    let cash_on_delivery =
        (order.state() == Some(OrderState::CashOnDelivery)).then_some(total);
    let request = ShipmentRequest {
        recipient,
        recipient_ref,
        parcel: ParcelSpec {
            weight_kg: options.weight_kg,
            dimensions: options.dimensions,
            cargo_type: options.cargo_type,
            description: options
                .description
                .unwrap_or_else(|| format!("Книги, замовлення {}", order.order_number)),
            declared_value: total,
            seats: options.seats.unwrap_or(1),
        },
        cash_on_delivery,
    };

    let shipment = api.create_shipment(&request).await?;
    store::orders::set_tracking(db, order_id, &shipment.tracking_number).await?;
    order.tracking_number = Some(shipment.tracking_number);

    tracing::info!(
        order_id = %order.id,
        carrier = %order.carrier,
        tracking = order.tracking_number.as_deref().unwrap_or(""),
        "shipment created"
    );
    Ok(order)
}

/// Applies a verified payment webhook. Unknown invoices are logged and
/// acknowledged so the provider stops retrying.
pub async fn apply_invoice_status(db: &PgPool, status: &InvoiceStatus) -> Result<(), ApiError> {
    if !status.is_settled() {
        tracing::info!(invoice_id = %status.invoice_id, status = %status.status, "invoice not settled");
        return Ok(());
    }
    match store::orders::mark_paid_by_invoice(db, &status.invoice_id).await? {
        Some(order_id) => {
            tracing::info!(order_id = %order_id, invoice_id = %status.invoice_id, "order paid");
        }
        None => {
            tracing::warn!(invoice_id = %status.invoice_id, "settled invoice matches no order");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: Uuid, name: &str, price: Decimal) -> Product {
        let now = Utc::now();
        Product {
            id,
            store_id: Uuid::new_v4(),
            name: name.into(),
            price,
            quantity: 10,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn resolve_items_snapshots_name_and_price() {
        let product_id = Uuid::new_v4();
        let products = vec![product(product_id, "Фарбований лис", Decimal::new(18500, 2))];
        let lines = vec![LineRequest {
            product_id,
            quantity: 2,
        }];
        let items = resolve_items(Uuid::new_v4(), &lines, &products).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Фарбований лис");
        assert_eq!(items[0].unit_price, Decimal::new(18500, 2));
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn resolve_items_merges_duplicate_lines() {
        let product_id = Uuid::new_v4();
        let products = vec![product(product_id, "Абетка", Decimal::new(9900, 2))];
        let lines = vec![
            LineRequest {
                product_id,
                quantity: 1,
            },
            LineRequest {
                product_id,
                quantity: 2,
            },
        ];
        let items = resolve_items(Uuid::new_v4(), &lines, &products).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
    }

    #[test]
    fn resolve_items_rejects_unknown_product() {
        let lines = vec![LineRequest {
            product_id: Uuid::new_v4(),
            quantity: 1,
        }];
        let err = resolve_items(Uuid::new_v4(), &lines, &[]).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn deleted_products_are_skipped_in_line_qtys() {
        let now = Utc::now();
        let items = vec![
            OrderItem {
                id: Uuid::new_v4(),
                order_id: Uuid::new_v4(),
                product_id: None,
                name: "Зникла книга".into(),
                unit_price: Decimal::new(100, 0),
                quantity: 1,
                created_at: now,
            },
            OrderItem {
                id: Uuid::new_v4(),
                order_id: Uuid::new_v4(),
                product_id: Some(Uuid::new_v4()),
                name: "Казки".into(),
                unit_price: Decimal::new(100, 0),
                quantity: 2,
                created_at: now,
            },
        ];
        assert_eq!(line_qtys(&items).len(), 1);
    }

    #[test]
    fn order_message_lists_items_and_total() {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            order_number: "ORD-00001234".into(),
            name: "Олена".into(),
            surname: "Шевченко".into(),
            phone: "+380671234567".into(),
            carrier: "nova_poshta".into(),
            city: "city-ref".into(),
            address: "warehouse-ref".into(),
            tracking_number: None,
            is_paid: false,
            order_state: "cash_on_delivery".into(),
            order_status: "received".into(),
            invoice_id: None,
            created_at: now,
            updated_at: now,
        };
        let items = vec![OrderItem {
            id: Uuid::new_v4(),
            order_id: order.id,
            product_id: Some(Uuid::new_v4()),
            name: "Фарбований лис".into(),
            unit_price: Decimal::new(18500, 2),
            quantity: 2,
            created_at: now,
        }];
        let text = order_message(&order, &items, Decimal::new(37000, 2));
        assert!(text.contains("ORD-00001234"));
        assert!(text.contains("Фарбований лис × 2"));
        assert!(text.contains("370.00 грн"));
    }
}
