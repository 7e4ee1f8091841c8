use crate::domain::cart::{validate_quantity, CartView};
use crate::domain::errors::DomainError;
use crate::domain::policy::Caller;
use crate::domain::ports::CartRepository;

pub struct CartService<R> {
    repo: R,
}

impl<R: CartRepository> CartService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn view(&self, caller: &Caller) -> Result<CartView, DomainError> {
        Ok(CartView::from_lines(self.repo.cart_lines(caller.user_id)?))
    }

    pub fn add_item(
        &self,
        caller: &Caller,
        product_id: i32,
        quantity: i32,
    ) -> Result<CartView, DomainError> {
        validate_quantity(quantity)?;
        // Adding merges into an existing line, so the merged quantity is bounded too.
        let existing = self
            .repo
            .cart_lines(caller.user_id)?
            .into_iter()
            .find(|line| line.product_id == product_id)
            .map_or(0, |line| line.quantity);
        validate_quantity(existing + quantity)?;
        self.repo.add_line(caller.user_id, product_id, quantity)?;
        self.view(caller)
    }

    pub fn update_item(
        &self,
        caller: &Caller,
        line_id: i32,
        quantity: i32,
    ) -> Result<CartView, DomainError> {
        validate_quantity(quantity)?;
        if !self.repo.set_quantity(caller.user_id, line_id, quantity)? {
            return Err(DomainError::NotFound("Cart item"));
        }
        self.view(caller)
    }

    pub fn remove_item(&self, caller: &Caller, line_id: i32) -> Result<CartView, DomainError> {
        if !self.repo.remove_line(caller.user_id, line_id)? {
            return Err(DomainError::NotFound("Cart item"));
        }
        self.view(caller)
    }

    pub fn clear(&self, caller: &Caller) -> Result<CartView, DomainError> {
        let removed = self.repo.clear(caller.user_id)?;
        log::debug!("Cleared {} cart lines for user {}", removed, caller.user_id);
        Ok(CartView::from_lines(Vec::new()))
    }
}
