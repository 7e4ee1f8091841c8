use super::cart::CartLineView;
use super::errors::DomainError;
use super::order::{NewOrder, NewOrderItem, OrderStats, OrderStatus, OrderView};

pub trait CartRepository: Send + Sync + 'static {
    /// Lines ordered by line id, joined with product display fields.
    fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLineView>, DomainError>;
    /// Add `quantity` of a product, merging with an existing line for it.
    fn add_line(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<(), DomainError>;
    /// Returns `false` if the line does not exist for this user.
    fn set_quantity(&self, user_id: i32, line_id: i32, quantity: i32) -> Result<bool, DomainError>;
    /// Returns `false` if the line does not exist for this user.
    fn remove_line(&self, user_id: i32, line_id: i32) -> Result<bool, DomainError>;
    fn clear(&self, user_id: i32) -> Result<usize, DomainError>;
}

/// Operations available inside a single checkout transaction.
pub trait CheckoutUnit {
    /// Lock the user's cart lines and return them.
    fn lock_cart(&mut self, user_id: i32) -> Result<Vec<CartLineView>, DomainError>;
    fn insert_order(&mut self, order: &NewOrder) -> Result<(), DomainError>;
    fn insert_items(&mut self, items: &[NewOrderItem]) -> Result<(), DomainError>;
    /// Delete exactly the lines `lock_cart` returned; lines added since stay.
    fn clear_cart(&mut self, line_ids: &[i32]) -> Result<usize, DomainError>;
}

pub trait CheckoutRepository: Send + Sync + 'static {
    /// Run `work` in one transaction: committed if it returns `Ok`, rolled back otherwise.
    fn checkout_unit<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn CheckoutUnit) -> Result<T, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    fn find_by_id(&self, id: &str) -> Result<Option<OrderView>, DomainError>;
    /// Newest first. `None` lists every order together with its customer.
    fn list(&self, owner_id: Option<i32>) -> Result<Vec<OrderView>, DomainError>;
    fn update_status(&self, id: &str, status: OrderStatus)
        -> Result<Option<OrderView>, DomainError>;
    fn stats(&self) -> Result<OrderStats, DomainError>;
}
