pub mod cart;
pub mod checkout;
pub mod orders;

use actix_web::web;

use crate::domain::errors::DomainError;
use crate::errors::AppError;
use crate::AppStorefront;

/// Run a storefront use case on the blocking thread pool.
///
/// Diesel connections are synchronous, so every handler funnels its work
/// through here instead of touching the pool on the async executor.
pub(crate) async fn blocking<T, F>(
    storefront: web::Data<AppStorefront>,
    work: F,
) -> Result<T, AppError>
where
    F: FnOnce(&AppStorefront) -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    Ok(web::block(move || work(&storefront)).await??)
}
