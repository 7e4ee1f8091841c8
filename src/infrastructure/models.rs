use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::cart::{CartLineView, ProductSummary};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, NewOrderItem, OrderHeader, OrderItemView};
use crate::schema::{carts, order_items, orders, products};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductSummaryRow {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<ProductSummaryRow> for ProductSummary {
    fn from(p: ProductSummaryRow) -> Self {
        ProductSummary {
            name: p.name,
            description: p.description,
            image_url: p.image_url,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartRow {
    pub id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCartRow {
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
}

impl From<(CartRow, ProductSummaryRow)> for CartLineView {
    fn from((line, product): (CartRow, ProductSummaryRow)) -> Self {
        CartLineView {
            id: line.id,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.price,
            product: product.into(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: String,
    pub user_id: i32,
    pub order_number: String,
    pub total_amount: BigDecimal,
    pub status: String,
    pub shipping_address: String,
    pub phone: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for OrderHeader {
    type Error = DomainError;

    fn try_from(o: OrderRow) -> Result<Self, Self::Error> {
        let status = o.status.parse().map_err(|_| {
            DomainError::Internal(format!("order {} has unknown status '{}'", o.id, o.status))
        })?;
        Ok(OrderHeader {
            id: o.id,
            order_number: o.order_number,
            user_id: o.user_id,
            total_amount: o.total_amount,
            status,
            shipping_address: o.shipping_address,
            phone: o.phone,
            notes: o.notes,
            created_at: o.created_at,
            updated_at: o.updated_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: String,
    pub user_id: i32,
    pub order_number: String,
    pub total_amount: BigDecimal,
    pub status: String,
    pub shipping_address: String,
    pub phone: String,
    pub notes: Option<String>,
}

impl From<&NewOrder> for NewOrderRow {
    fn from(o: &NewOrder) -> Self {
        NewOrderRow {
            id: o.id.clone(),
            user_id: o.user_id,
            order_number: o.order_number.clone(),
            total_amount: o.total_amount.clone(),
            status: o.status.as_str().to_string(),
            shipping_address: o.shipping_address.clone(),
            phone: o.phone.clone(),
            notes: o.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: i32,
    pub order_id: String,
    pub product_id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
    pub subtotal: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl From<(OrderItemRow, ProductSummaryRow)> for OrderItemView {
    fn from((item, product): (OrderItemRow, ProductSummaryRow)) -> Self {
        OrderItemView {
            id: item.id,
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            subtotal: item.subtotal,
            product: product.into(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub order_id: String,
    pub product_id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
    pub subtotal: BigDecimal,
}

impl From<&NewOrderItem> for NewOrderItemRow {
    fn from(i: &NewOrderItem) -> Self {
        NewOrderItemRow {
            order_id: i.order_id.clone(),
            product_id: i.product_id,
            quantity: i.quantity,
            price: i.price.clone(),
            subtotal: i.subtotal.clone(),
        }
    }
}
