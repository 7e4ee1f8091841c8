use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;
use crate::domain::cart::{CartLineView, CartView};
use crate::errors::AppError;
use crate::handlers::blocking;
use crate::AppStorefront;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub price: String,
    pub subtotal: String,
}

impl From<CartLineView> for CartItemResponse {
    fn from(line: CartLineView) -> Self {
        let subtotal = line.subtotal().to_string();
        Self {
            id: line.id,
            product_id: line.product_id,
            product_name: line.product.name,
            description: line.product.description,
            image_url: line.product.image_url,
            quantity: line.quantity,
            price: line.unit_price.to_string(),
            subtotal,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub total: String,
    pub item_count: usize,
}

impl From<CartView> for CartResponse {
    fn from(cart: CartView) -> Self {
        let item_count = cart.item_count();
        Self {
            total: cart.total.to_string(),
            items: cart.lines.into_iter().map(Into::into).collect(),
            item_count,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "The caller's cart", body = CartResponse),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn view_cart(
    storefront: web::Data<AppStorefront>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let caller = *user.caller();
    let cart = blocking(storefront, move |s| s.cart.view(&caller)).await?;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// POST /cart
///
/// Adding a product already in the cart increases its quantity; the price
/// captured on the first add is kept.
#[utoipa::path(
    post,
    path = "/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Quantity must be between 1 and 10000"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn add_to_cart(
    storefront: web::Data<AppStorefront>,
    user: AuthenticatedUser,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = *user.caller();
    let AddToCartRequest {
        product_id,
        quantity,
    } = body.into_inner();
    let cart = blocking(storefront, move |s| {
        s.cart.add_item(&caller, product_id, quantity)
    })
    .await?;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// PUT /cart/{id}
#[utoipa::path(
    put,
    path = "/cart/{id}",
    params(("id" = i32, Path, description = "Cart line id")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Quantity must be between 1 and 10000"),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn update_cart_item(
    storefront: web::Data<AppStorefront>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = *user.caller();
    let line_id = path.into_inner();
    let quantity = body.quantity;
    let cart = blocking(storefront, move |s| {
        s.cart.update_item(&caller, line_id, quantity)
    })
    .await?;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// DELETE /cart/{id}
#[utoipa::path(
    delete,
    path = "/cart/{id}",
    params(("id" = i32, Path, description = "Cart line id")),
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn remove_cart_item(
    storefront: web::Data<AppStorefront>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let caller = *user.caller();
    let line_id = path.into_inner();
    let cart = blocking(storefront, move |s| s.cart.remove_item(&caller, line_id)).await?;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// DELETE /cart/clear
#[utoipa::path(
    delete,
    path = "/cart/clear",
    responses(
        (status = 200, description = "Empty cart", body = CartResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn clear_cart(
    storefront: web::Data<AppStorefront>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let caller = *user.caller();
    let cart = blocking(storefront, move |s| s.cart.clear(&caller)).await?;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}
