use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use validator::Validate;

use super::cart::{CartLineView, ProductSummary};
use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                DomainError::InvalidInput(format!(
                    "status must be one of: pending, confirmed, processing, shipped, delivered, cancelled (got '{s}')"
                ))
            })
    }
}

#[derive(Debug, Clone)]
pub struct OrderHeader {
    pub id: String,
    pub order_number: String,
    pub user_id: i32,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub phone: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSummary {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: i32,
    pub order_id: String,
    pub product_id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
    pub subtotal: BigDecimal,
    pub product: ProductSummary,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub header: OrderHeader,
    /// Attached by listings; single-order reads leave it empty.
    pub customer: Option<CustomerSummary>,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    /// Sum of `total_amount` over every order that is not cancelled.
    pub total_revenue: BigDecimal,
}

/// Shipping details supplied by the customer at checkout.
#[derive(Debug, Clone, Validate)]
pub struct CheckoutDetails {
    #[validate(length(min = 1, max = 500, message = "shipping_address is required (max 500 characters)"))]
    pub shipping_address: String,
    #[validate(length(min = 1, max = 20, message = "phone is required (max 20 characters)"))]
    pub phone: String,
    #[validate(length(max = 500, message = "notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
}

impl CheckoutDetails {
    pub fn new(shipping_address: String, phone: String, notes: Option<String>) -> Self {
        Self {
            shipping_address,
            phone,
            notes,
        }
    }

    /// Trim every field, drop blank notes and apply the length rules.
    pub fn normalized(self) -> Result<Self, DomainError> {
        let details = Self {
            shipping_address: self.shipping_address.trim().to_string(),
            phone: self.phone.trim().to_string(),
            notes: self
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        };
        details
            .validate()
            .map_err(|e| DomainError::InvalidInput(e.to_string()))?;
        Ok(details)
    }
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: String,
    pub order_number: String,
    pub user_id: i32,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub phone: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub order_id: String,
    pub product_id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
    pub subtotal: BigDecimal,
}

/// Largest amount the `NUMERIC(12,2)` money columns can store.
pub fn max_order_amount() -> BigDecimal {
    BigDecimal::new(999_999_999_999i64.into(), 2)
}

/// An order header plus its items, ready to be written in one unit.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub order: NewOrder,
    pub items: Vec<NewOrderItem>,
}

impl OrderDraft {
    pub fn assemble(
        user_id: i32,
        order_id: String,
        order_number: String,
        details: &CheckoutDetails,
        lines: &[CartLineView],
    ) -> Result<Self, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::CartEmpty);
        }

        let items: Vec<NewOrderItem> = lines
            .iter()
            .map(|line| NewOrderItem {
                order_id: order_id.clone(),
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.unit_price.clone(),
                subtotal: line.subtotal(),
            })
            .collect();
        let total_amount: BigDecimal = items.iter().map(|item| &item.subtotal).sum();

        let limit = max_order_amount();
        if total_amount > limit || items.iter().any(|item| item.subtotal > limit) {
            return Err(DomainError::InvalidInput(format!(
                "order total cannot exceed {limit}"
            )));
        }

        Ok(Self {
            order: NewOrder {
                id: order_id,
                order_number,
                user_id,
                total_amount,
                status: OrderStatus::Pending,
                shipping_address: details.shipping_address.clone(),
                phone: details.phone.clone(),
                notes: details.notes.clone(),
            },
            items,
        })
    }
}
