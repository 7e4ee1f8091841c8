//! In-memory port implementations backing the application-layer tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use crate::domain::cart::{CartLineView, ProductSummary};
use crate::domain::errors::DomainError;
use crate::domain::ids::{generate_order_id, generate_order_number, OrderIdGenerator};
use crate::domain::order::{
    CustomerSummary, NewOrder, NewOrderItem, OrderHeader, OrderItemView, OrderStats, OrderStatus,
    OrderView,
};
use crate::domain::ports::{CartRepository, CheckoutRepository, CheckoutUnit, OrderRepository};

#[derive(Debug, Clone)]
struct CartLine {
    id: i32,
    user_id: i32,
    product_id: i32,
    quantity: i32,
    price: BigDecimal,
}

#[derive(Debug, Clone, Default)]
struct State {
    products: HashMap<i32, (ProductSummary, BigDecimal)>,
    users: HashMap<i32, CustomerSummary>,
    carts: Vec<CartLine>,
    orders: Vec<OrderHeader>,
    items: Vec<OrderItemView>,
    next_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn cart_lines(&self, user_id: i32) -> Vec<CartLineView> {
        self.carts
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| CartLineView {
                id: l.id,
                product_id: l.product_id,
                quantity: l.quantity,
                unit_price: l.price.clone(),
                product: self.products[&l.product_id].0.clone(),
            })
            .collect()
    }

    fn view(&self, header: &OrderHeader, with_customer: bool) -> OrderView {
        OrderView {
            header: header.clone(),
            customer: with_customer
                .then(|| self.users.get(&header.user_id).cloned())
                .flatten(),
            items: self
                .items
                .iter()
                .filter(|i| i.order_id == header.id)
                .cloned()
                .collect(),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    fail_item_inserts: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, id: i32, username: &str) -> Self {
        self.state.lock().unwrap().users.insert(
            id,
            CustomerSummary {
                username: username.to_string(),
                email: format!("{username}@example.com"),
            },
        );
        self
    }

    pub fn with_product(self, id: i32, name: &str, price: i64) -> Self {
        self.state.lock().unwrap().products.insert(
            id,
            (
                ProductSummary {
                    name: name.to_string(),
                    description: None,
                    image_url: None,
                },
                BigDecimal::from(price),
            ),
        );
        self
    }

    pub fn fail_item_inserts(&self, fail: bool) {
        self.fail_item_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn order_count(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }

    pub fn item_count(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn order_status(&self, id: &str) -> Option<OrderStatus> {
        let state = self.state.lock().unwrap();
        state.orders.iter().find(|o| o.id == id).map(|o| o.status)
    }
}

impl CartRepository for MemoryStore {
    fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLineView>, DomainError> {
        Ok(self.state.lock().unwrap().cart_lines(user_id))
    }

    fn add_line(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        let price = state
            .products
            .get(&product_id)
            .map(|(_, price)| price.clone())
            .ok_or(DomainError::NotFound("Product"))?;

        if let Some(line) = state
            .carts
            .iter_mut()
            .find(|l| l.user_id == user_id && l.product_id == product_id)
        {
            line.quantity += quantity;
            return Ok(());
        }
        let id = state.next_id();
        state.carts.push(CartLine {
            id,
            user_id,
            product_id,
            quantity,
            price,
        });
        Ok(())
    }

    fn set_quantity(&self, user_id: i32, line_id: i32, quantity: i32) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        match state
            .carts
            .iter_mut()
            .find(|l| l.id == line_id && l.user_id == user_id)
        {
            Some(line) => {
                line.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove_line(&self, user_id: i32, line_id: i32) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        let before = state.carts.len();
        state
            .carts
            .retain(|l| !(l.id == line_id && l.user_id == user_id));
        Ok(state.carts.len() < before)
    }

    fn clear(&self, user_id: i32) -> Result<usize, DomainError> {
        let mut state = self.state.lock().unwrap();
        let before = state.carts.len();
        state.carts.retain(|l| l.user_id != user_id);
        Ok(before - state.carts.len())
    }
}

struct MemoryUnit<'s> {
    state: &'s mut State,
    fail_items: bool,
}

impl CheckoutUnit for MemoryUnit<'_> {
    fn lock_cart(&mut self, user_id: i32) -> Result<Vec<CartLineView>, DomainError> {
        Ok(self.state.cart_lines(user_id))
    }

    fn insert_order(&mut self, order: &NewOrder) -> Result<(), DomainError> {
        if self
            .state
            .orders
            .iter()
            .any(|o| o.id == order.id || o.order_number == order.order_number)
        {
            return Err(DomainError::DuplicateKey);
        }
        let now = Utc::now();
        self.state.orders.push(OrderHeader {
            id: order.id.clone(),
            order_number: order.order_number.clone(),
            user_id: order.user_id,
            total_amount: order.total_amount.clone(),
            status: order.status,
            shipping_address: order.shipping_address.clone(),
            phone: order.phone.clone(),
            notes: order.notes.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }

    fn insert_items(&mut self, items: &[NewOrderItem]) -> Result<(), DomainError> {
        if self.fail_items {
            return Err(DomainError::Internal("order item insert failed".into()));
        }
        for item in items {
            let id = self.state.next_id();
            let product = self.state.products[&item.product_id].0.clone();
            self.state.items.push(OrderItemView {
                id,
                order_id: item.order_id.clone(),
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price.clone(),
                subtotal: item.subtotal.clone(),
                product,
            });
        }
        Ok(())
    }

    fn clear_cart(&mut self, line_ids: &[i32]) -> Result<usize, DomainError> {
        let before = self.state.carts.len();
        self.state.carts.retain(|l| !line_ids.contains(&l.id));
        Ok(before - self.state.carts.len())
    }
}

impl CheckoutRepository for MemoryStore {
    fn checkout_unit<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn CheckoutUnit) -> Result<T, DomainError>,
    {
        let mut state = self.state.lock().unwrap();
        // Work on a copy and publish it only on success.
        let mut scratch = state.clone();
        let mut unit = MemoryUnit {
            state: &mut scratch,
            fail_items: self.fail_item_inserts.load(Ordering::SeqCst),
        };
        let result = work(&mut unit)?;
        *state = scratch;
        Ok(result)
    }
}

impl OrderRepository for MemoryStore {
    fn find_by_id(&self, id: &str) -> Result<Option<OrderView>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| state.view(o, false)))
    }

    fn list(&self, owner_id: Option<i32>) -> Result<Vec<OrderView>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .rev()
            .filter(|o| owner_id.map_or(true, |owner| o.user_id == owner))
            .map(|o| state.view(o, true))
            .collect())
    }

    fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<OrderView>, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(index) = state.orders.iter().position(|o| o.id == id) else {
            return Ok(None);
        };
        state.orders[index].status = status;
        state.orders[index].updated_at = Utc::now();
        let header = state.orders[index].clone();
        Ok(Some(state.view(&header, false)))
    }

    fn stats(&self) -> Result<OrderStats, DomainError> {
        let state = self.state.lock().unwrap();
        let count = |status: OrderStatus| {
            state.orders.iter().filter(|o| o.status == status).count() as i64
        };
        Ok(OrderStats {
            total_orders: state.orders.len() as i64,
            pending_orders: count(OrderStatus::Pending),
            completed_orders: count(OrderStatus::Delivered),
            cancelled_orders: count(OrderStatus::Cancelled),
            total_revenue: state
                .orders
                .iter()
                .filter(|o| o.status != OrderStatus::Cancelled)
                .map(|o| o.total_amount.clone())
                .sum(),
        })
    }
}

/// Hands out queued identifiers first, then falls back to random ones.
#[derive(Default)]
pub struct ScriptedIds {
    ids: Mutex<VecDeque<String>>,
}

impl ScriptedIds {
    pub fn new<I: IntoIterator<Item = &'static str>>(ids: I) -> Self {
        Self {
            ids: Mutex::new(ids.into_iter().map(str::to_string).collect()),
        }
    }
}

impl OrderIdGenerator for ScriptedIds {
    fn order_id(&self) -> String {
        self.ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| generate_order_id(Utc::now()))
    }

    fn order_number(&self, now: DateTime<Utc>) -> String {
        generate_order_number(now)
    }
}
