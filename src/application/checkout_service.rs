use chrono::Utc;

use crate::domain::errors::DomainError;
use crate::domain::ids::{OrderIdGenerator, RandomOrderIds};
use crate::domain::order::{CheckoutDetails, OrderDraft, OrderView};
use crate::domain::policy::Caller;
use crate::domain::ports::{CheckoutRepository, OrderRepository};

/// Attempts with fresh identifiers before a checkout gives up on collisions.
pub const MAX_ID_ATTEMPTS: usize = 5;

pub struct CheckoutService<R, G = RandomOrderIds> {
    repo: R,
    ids: G,
}

impl<R, G> CheckoutService<R, G>
where
    R: CheckoutRepository + OrderRepository,
    G: OrderIdGenerator,
{
    pub fn new(repo: R, ids: G) -> Self {
        Self { repo, ids }
    }

    /// Turn the caller's cart into a pending order.
    ///
    /// Locking the cart, writing the header and items, and clearing the cart
    /// happen in one unit of work. A unique-key collision on the generated
    /// identifiers restarts the unit with new ones, at most
    /// [`MAX_ID_ATTEMPTS`] times.
    pub fn checkout(
        &self,
        caller: &Caller,
        details: CheckoutDetails,
    ) -> Result<OrderView, DomainError> {
        let details = details.normalized()?;
        let order_id = self.place_order(caller.user_id, &details)?;

        let order = self.repo.find_by_id(&order_id)?.ok_or_else(|| {
            DomainError::Internal(format!("order {order_id} missing after commit"))
        })?;

        log::info!(
            "Checkout completed: order {} ({}) for user {}, {} items, total {}",
            order.header.id,
            order.header.order_number,
            caller.user_id,
            order.items.len(),
            order.header.total_amount
        );
        Ok(order)
    }

    fn place_order(&self, user_id: i32, details: &CheckoutDetails) -> Result<String, DomainError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let order_id = self.ids.order_id();
            let order_number = self.ids.order_number(Utc::now());

            let result = self.repo.checkout_unit(|unit| {
                let lines = unit.lock_cart(user_id)?;
                let draft = OrderDraft::assemble(
                    user_id,
                    order_id.clone(),
                    order_number.clone(),
                    details,
                    &lines,
                )?;
                unit.insert_order(&draft.order)?;
                unit.insert_items(&draft.items)?;
                let line_ids: Vec<i32> = lines.iter().map(|line| line.id).collect();
                unit.clear_cart(&line_ids)?;
                Ok(draft.order.id)
            });

            match result {
                Err(DomainError::DuplicateKey) => log::warn!(
                    "Order identifier collision ({} / {}) on attempt {}/{}",
                    order_id,
                    order_number,
                    attempt,
                    MAX_ID_ATTEMPTS
                ),
                other => return other,
            }
        }

        Err(DomainError::Internal(format!(
            "no unique order identifier after {MAX_ID_ATTEMPTS} attempts"
        )))
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use super::*;
    use crate::application::memory::{MemoryStore, ScriptedIds};
    use crate::domain::order::OrderStatus;
    use crate::domain::policy::Role;
    use crate::domain::ports::CartRepository;

    const ALICE: i32 = 1;
    const BOB: i32 = 2;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_user(ALICE, "alice")
            .with_user(BOB, "bob")
            .with_product(10, "Product A", 100_000)
            .with_product(20, "Product B", 50_000)
    }

    fn details() -> CheckoutDetails {
        CheckoutDetails::new("Jl. Gatot Subroto 12".into(), "0812345678".into(), None)
    }

    fn alice() -> Caller {
        Caller::new(ALICE, Role::User)
    }

    #[test]
    fn checkout_turns_cart_into_pending_order() {
        let store = store();
        store.add_line(ALICE, 10, 2).unwrap();
        store.add_line(ALICE, 20, 1).unwrap();
        let service = CheckoutService::new(store.clone(), RandomOrderIds);

        let order = service.checkout(&alice(), details()).unwrap();

        assert_eq!(order.header.total_amount, BigDecimal::from(250_000));
        assert_eq!(order.header.status, OrderStatus::Pending);
        assert_eq!(order.header.user_id, ALICE);
        assert_eq!(order.header.id.len(), 12);
        assert!(order.header.order_number.starts_with("ORD-"));
        let subtotals: Vec<BigDecimal> = order.items.iter().map(|i| i.subtotal.clone()).collect();
        assert_eq!(
            subtotals,
            vec![BigDecimal::from(200_000), BigDecimal::from(50_000)]
        );
        assert_eq!(order.items[0].product.name, "Product A");
        assert!(store.cart_lines(ALICE).unwrap().is_empty());
    }

    #[test]
    fn checkout_leaves_other_carts_alone() {
        let store = store();
        store.add_line(ALICE, 10, 1).unwrap();
        store.add_line(BOB, 20, 3).unwrap();
        let service = CheckoutService::new(store.clone(), RandomOrderIds);

        service.checkout(&alice(), details()).unwrap();

        assert_eq!(store.cart_lines(BOB).unwrap().len(), 1);
    }

    #[test]
    fn empty_cart_creates_nothing() {
        let store = store();
        let service = CheckoutService::new(store.clone(), RandomOrderIds);

        let result = service.checkout(&alice(), details());

        assert!(matches!(result, Err(DomainError::CartEmpty)));
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.item_count(), 0);
    }

    #[test]
    fn invalid_details_are_rejected_before_touching_the_cart() {
        let store = store();
        store.add_line(ALICE, 10, 1).unwrap();
        let service = CheckoutService::new(store.clone(), RandomOrderIds);

        let no_phone = CheckoutDetails::new("Street 1".into(), "".into(), None);
        let result = service.checkout(&alice(), no_phone);

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.cart_lines(ALICE).unwrap().len(), 1);
    }

    #[test]
    fn oversized_total_is_rejected_and_cart_kept() {
        let store = store().with_product(30, "Product C", 1_000_000);
        store.add_line(ALICE, 30, 10_000).unwrap();
        let service = CheckoutService::new(store.clone(), RandomOrderIds);

        let result = service.checkout(&alice(), details());

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.cart_lines(ALICE).unwrap().len(), 1);
    }

    #[test]
    fn failing_item_insert_aborts_the_whole_checkout() {
        let store = store();
        store.add_line(ALICE, 10, 1).unwrap();
        store.fail_item_inserts(true);
        let service = CheckoutService::new(store.clone(), RandomOrderIds);

        let result = service.checkout(&alice(), details());

        assert!(matches!(result, Err(DomainError::Internal(_))));
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.item_count(), 0);
        assert_eq!(store.cart_lines(ALICE).unwrap().len(), 1);
    }

    #[test]
    fn colliding_order_id_is_regenerated() {
        let store = store();
        let service = CheckoutService::new(
            store.clone(),
            ScriptedIds::new(["TAKEN0000001", "TAKEN0000001", "FRESH0000002"]),
        );

        store.add_line(ALICE, 10, 1).unwrap();
        let first = service.checkout(&alice(), details()).unwrap();
        store.add_line(BOB, 20, 1).unwrap();
        let second = service
            .checkout(&Caller::new(BOB, Role::User), details())
            .unwrap();

        assert_eq!(first.header.id, "TAKEN0000001");
        assert_eq!(second.header.id, "FRESH0000002");
        assert_eq!(store.order_count(), 2);
        assert!(store.cart_lines(BOB).unwrap().is_empty());
    }

    #[test]
    fn persistent_collisions_give_up_without_writing() {
        let store = store();
        let taken = ["TAKEN0000001"; MAX_ID_ATTEMPTS + 1];
        let service = CheckoutService::new(store.clone(), ScriptedIds::new(taken));

        store.add_line(ALICE, 10, 1).unwrap();
        service.checkout(&alice(), details()).unwrap();
        store.add_line(BOB, 20, 1).unwrap();
        let result = service.checkout(&Caller::new(BOB, Role::User), details());

        assert!(matches!(result, Err(DomainError::Internal(_))));
        assert_eq!(store.order_count(), 1);
        assert_eq!(store.cart_lines(BOB).unwrap().len(), 1);
    }
}
