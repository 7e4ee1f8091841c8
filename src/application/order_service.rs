use crate::domain::errors::DomainError;
use crate::domain::order::{OrderStats, OrderStatus, OrderView};
use crate::domain::policy::{authorize, can_view_order, Caller, Capability};
use crate::domain::ports::OrderRepository;

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Admins get every order; everybody else gets their own.
    pub fn list_orders(&self, caller: &Caller) -> Result<Vec<OrderView>, DomainError> {
        let owner = match authorize(caller, Capability::ViewAllOrders) {
            Ok(()) => None,
            Err(_) => Some(caller.user_id),
        };
        self.repo.list(owner)
    }

    pub fn get_order(&self, caller: &Caller, id: &str) -> Result<OrderView, DomainError> {
        let order = self
            .repo
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Order"))?;

        if !can_view_order(caller, order.header.user_id) {
            return Err(DomainError::Forbidden);
        }
        Ok(order)
    }

    /// Any status in the fixed set may follow any other.
    pub fn update_status(
        &self,
        caller: &Caller,
        id: &str,
        status: &str,
    ) -> Result<OrderView, DomainError> {
        authorize(caller, Capability::ManageOrders)?;
        let status: OrderStatus = status.parse()?;

        let order = self
            .repo
            .update_status(id, status)?
            .ok_or(DomainError::NotFound("Order"))?;

        log::info!(
            "Order {} moved to {} by user {}",
            order.header.id,
            status,
            caller.user_id
        );
        Ok(order)
    }

    pub fn stats(&self, caller: &Caller) -> Result<OrderStats, DomainError> {
        authorize(caller, Capability::ViewOrderStats)?;
        self.repo.stats()
    }
}
