use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;
use crate::domain::order::CheckoutDetails;
use crate::errors::AppError;
use crate::handlers::blocking;
use crate::handlers::orders::{OrderItemResponse, OrderSummaryResponse};
use crate::AppStorefront;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub phone: String,
    pub notes: Option<String>,
}

impl From<CheckoutRequest> for CheckoutDetails {
    fn from(req: CheckoutRequest) -> Self {
        CheckoutDetails::new(req.shipping_address, req.phone, req.notes)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order: OrderSummaryResponse,
    pub items: Vec<OrderItemResponse>,
}

/// POST /checkout
///
/// Turns the caller's cart into a pending order. The cart lines are locked,
/// the order and its items are written and the cart is cleared in a single
/// transaction; on any failure the cart is left as it was.
#[utoipa::path(
    post,
    path = "/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = CheckoutResponse),
        (status = 400, description = "Cart is empty, shipping details are invalid or the total is too large"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "checkout"
)]
pub async fn checkout(
    storefront: web::Data<AppStorefront>,
    user: AuthenticatedUser,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = *user.caller();
    let details = CheckoutDetails::from(body.into_inner());
    let order = blocking(storefront, move |s| s.checkout.checkout(&caller, details)).await?;

    Ok(HttpResponse::Created().json(CheckoutResponse {
        order: order.header.into(),
        items: order.items.into_iter().map(Into::into).collect(),
    }))
}
