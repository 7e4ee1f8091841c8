pub mod cart_service;
pub mod checkout_service;
pub mod order_service;

#[cfg(test)]
pub(crate) mod memory;

use crate::domain::ids::{OrderIdGenerator, RandomOrderIds};
use crate::domain::ports::{CartRepository, CheckoutRepository, OrderRepository};

use cart_service::CartService;
use checkout_service::CheckoutService;
use order_service::OrderService;

/// All storefront use cases sharing one repository.
pub struct Storefront<R, G = RandomOrderIds> {
    pub cart: CartService<R>,
    pub checkout: CheckoutService<R, G>,
    pub orders: OrderService<R>,
}

impl<R> Storefront<R>
where
    R: CartRepository + CheckoutRepository + OrderRepository + Clone,
{
    pub fn new(repo: R) -> Self {
        Self::with_id_generator(repo, RandomOrderIds)
    }
}

impl<R, G> Storefront<R, G>
where
    R: CartRepository + CheckoutRepository + OrderRepository + Clone,
    G: OrderIdGenerator,
{
    pub fn with_id_generator(repo: R, ids: G) -> Self {
        Self {
            cart: CartService::new(repo.clone()),
            checkout: CheckoutService::new(repo.clone(), ids),
            orders: OrderService::new(repo),
        }
    }
}
