use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;
use crate::domain::order::{OrderHeader, OrderItemView, OrderStats, OrderView};
use crate::errors::AppError;
use crate::handlers::blocking;
use crate::AppStorefront;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    pub order_id: String,
    pub product_id: i32,
    pub product_name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub quantity: i32,
    /// Unit price captured when the product went into the cart, e.g. "100000.00"
    pub price: String,
    pub subtotal: String,
}

impl From<OrderItemView> for OrderItemResponse {
    fn from(item: OrderItemView) -> Self {
        Self {
            id: item.id,
            order_id: item.order_id,
            product_id: item.product_id,
            product_name: item.product.name,
            description: item.product.description,
            image_url: item.product.image_url,
            quantity: item.quantity,
            price: item.price.to_string(),
            subtotal: item.subtotal.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummaryResponse {
    pub id: String,
    pub order_number: String,
    pub user_id: i32,
    pub total_amount: String,
    pub status: String,
    pub shipping_address: String,
    pub phone: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderHeader> for OrderSummaryResponse {
    fn from(header: OrderHeader) -> Self {
        Self {
            id: header.id,
            order_number: header.order_number,
            user_id: header.user_id,
            total_amount: header.total_amount.to_string(),
            status: header.status.to_string(),
            shipping_address: header.shipping_address,
            phone: header.phone,
            notes: header.notes,
            created_at: header.created_at.to_rfc3339(),
            updated_at: header.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: OrderSummaryResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(view: OrderView) -> Self {
        let (username, email) = match view.customer {
            Some(customer) => (Some(customer.username), Some(customer.email)),
            None => (None, None),
        };
        Self {
            order: view.header.into(),
            username,
            email,
            items: view.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStatsResponse {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    /// Revenue over every order that is not cancelled
    pub total_revenue: String,
}

impl From<OrderStats> for OrderStatsResponse {
    fn from(stats: OrderStats) -> Self {
        Self {
            total_orders: stats.total_orders,
            pending_orders: stats.pending_orders,
            completed_orders: stats.completed_orders,
            cancelled_orders: stats.cancelled_orders,
            total_revenue: stats.total_revenue.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of pending, confirmed, processing, shipped, delivered, cancelled
    pub status: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders
///
/// Admins see every order, newest first, with the customer's username and
/// email. Everyone else sees only their own orders.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Orders visible to the caller", body = [OrderResponse]),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    storefront: web::Data<AppStorefront>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let caller = *user.caller();
    let orders = blocking(storefront, move |s| s.orders.list_orders(&caller)).await?;

    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = String, Path, description = "12-character order identifier"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order(
    storefront: web::Data<AppStorefront>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let caller = *user.caller();
    let id = path.into_inner();
    let order = blocking(storefront, move |s| s.orders.get_order(&caller, &id)).await?;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PATCH /orders/{id}
///
/// Admin only. Moves the order to any status in the fixed set.
#[utoipa::path(
    patch,
    path = "/orders/{id}",
    params(
        ("id" = String, Path, description = "12-character order identifier"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn update_order_status(
    storefront: web::Data<AppStorefront>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = *user.caller();
    let id = path.into_inner();
    let status = body.into_inner().status;
    let order = blocking(storefront, move |s| {
        s.orders.update_status(&caller, &id, &status)
    })
    .await?;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders/stats
#[utoipa::path(
    get,
    path = "/orders/stats",
    responses(
        (status = 200, description = "Order counts and revenue", body = OrderStatsResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn order_stats(
    storefront: web::Data<AppStorefront>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let caller = *user.caller();
    let stats = blocking(storefront, move |s| s.orders.stats(&caller)).await?;

    Ok(HttpResponse::Ok().json(OrderStatsResponse::from(stats)))
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::cart::ProductSummary;
    use crate::domain::order::{CustomerSummary, OrderStatus};

    fn view(customer: Option<CustomerSummary>) -> OrderView {
        let at = Utc.with_ymd_and_hms(2026, 1, 31, 10, 0, 0).unwrap();
        OrderView {
            header: OrderHeader {
                id: "ABCDEF012345".to_string(),
                order_number: "ORD-20260131-0123456789ABCDEF0123".to_string(),
                user_id: 3,
                total_amount: "250000.00".parse::<BigDecimal>().unwrap(),
                status: OrderStatus::Pending,
                shipping_address: "Jl. Merdeka 1".to_string(),
                phone: "0812345".to_string(),
                notes: None,
                created_at: at,
                updated_at: at,
            },
            customer,
            items: vec![OrderItemView {
                id: 1,
                order_id: "ABCDEF012345".to_string(),
                product_id: 10,
                quantity: 2,
                price: "100000.00".parse::<BigDecimal>().unwrap(),
                subtotal: "200000.00".parse::<BigDecimal>().unwrap(),
                product: ProductSummary {
                    name: "Product A".to_string(),
                    description: None,
                    image_url: None,
                },
            }],
        }
    }

    #[test]
    fn order_response_is_flat_with_string_money() {
        let json = serde_json::to_value(OrderResponse::from(view(None))).unwrap();

        assert_eq!(json["id"], "ABCDEF012345");
        let number = json["order_number"].as_str().unwrap();
        let suffix = number.strip_prefix("ORD-20260131-").unwrap();
        assert_eq!(suffix.len(), 20);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["total_amount"], "250000.00");
        assert_eq!(json["created_at"], "2026-01-31T10:00:00+00:00");
        assert_eq!(json["items"][0]["product_name"], "Product A");
        assert_eq!(json["items"][0]["subtotal"], "200000.00");
        assert!(json.get("username").is_none());
    }

    #[test]
    fn customer_fields_appear_when_known() {
        let customer = CustomerSummary {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        let json = serde_json::to_value(OrderResponse::from(view(Some(customer)))).unwrap();

        assert_eq!(json["username"], "alice");
        assert_eq!(json["email"], "alice@example.com");
    }
}
