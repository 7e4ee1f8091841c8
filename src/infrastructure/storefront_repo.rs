use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::dsl::sum;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::upsert::excluded;

use crate::db::DbPool;
use crate::domain::cart::CartLineView;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    CustomerSummary, NewOrder, NewOrderItem, OrderItemView, OrderStats, OrderStatus, OrderView,
};
use crate::domain::ports::{CartRepository, CheckoutRepository, CheckoutUnit, OrderRepository};
use crate::schema::{carts, order_items, orders, products, users};

use super::models::{
    CartRow, NewCartRow, NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow, ProductSummaryRow,
};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DomainError::DuplicateKey
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Shared queries ───────────────────────────────────────────────────────────

fn load_cart_lines(conn: &mut PgConnection, user_id: i32) -> QueryResult<Vec<CartLineView>> {
    let rows = carts::table
        .inner_join(products::table)
        .filter(carts::user_id.eq(user_id))
        .order(carts::id.asc())
        .select((CartRow::as_select(), ProductSummaryRow::as_select()))
        .load::<(CartRow, ProductSummaryRow)>(conn)?;

    Ok(rows.into_iter().map(CartLineView::from).collect())
}

fn load_items(
    conn: &mut PgConnection,
    order_ids: &[String],
) -> QueryResult<HashMap<String, Vec<OrderItemView>>> {
    let rows = order_items::table
        .inner_join(products::table)
        .filter(order_items::order_id.eq_any(order_ids))
        .order(order_items::id.asc())
        .select((OrderItemRow::as_select(), ProductSummaryRow::as_select()))
        .load::<(OrderItemRow, ProductSummaryRow)>(conn)?;

    let mut grouped: HashMap<String, Vec<OrderItemView>> = HashMap::new();
    for row in rows {
        let item = OrderItemView::from(row);
        grouped.entry(item.order_id.clone()).or_default().push(item);
    }
    Ok(grouped)
}

fn order_with_items(
    conn: &mut PgConnection,
    row: OrderRow,
    customer: Option<CustomerSummary>,
) -> Result<OrderView, DomainError> {
    let items = load_items(conn, std::slice::from_ref(&row.id))?
        .remove(&row.id)
        .unwrap_or_default();
    Ok(OrderView {
        header: row.try_into()?,
        customer,
        items,
    })
}

fn count_with_status(conn: &mut PgConnection, status: OrderStatus) -> QueryResult<i64> {
    orders::table
        .filter(orders::status.eq(status.as_str()))
        .count()
        .get_result(conn)
}

// ── Repository ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DieselStorefrontRepository {
    pool: DbPool,
}

impl DieselStorefrontRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CartRepository for DieselStorefrontRepository {
    fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLineView>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(load_cart_lines(&mut conn, user_id)?)
    }

    fn add_line(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let price: BigDecimal = products::table
            .find(product_id)
            .select(products::price)
            .first(&mut conn)
            .optional()?
            .ok_or(DomainError::NotFound("Product"))?;

        // The price is captured on first add only; merging keeps the old one.
        diesel::insert_into(carts::table)
            .values(&NewCartRow {
                user_id,
                product_id,
                quantity,
                price,
            })
            .on_conflict((carts::user_id, carts::product_id))
            .do_update()
            .set((
                carts::quantity.eq(carts::quantity + excluded(carts::quantity)),
                carts::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    fn set_quantity(&self, user_id: i32, line_id: i32, quantity: i32) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(
            carts::table
                .filter(carts::id.eq(line_id))
                .filter(carts::user_id.eq(user_id)),
        )
        .set((
            carts::quantity.eq(quantity),
            carts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(updated > 0)
    }

    fn remove_line(&self, user_id: i32, line_id: i32) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(
            carts::table
                .filter(carts::id.eq(line_id))
                .filter(carts::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;

        Ok(deleted > 0)
    }

    fn clear(&self, user_id: i32) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(diesel::delete(carts::table.filter(carts::user_id.eq(user_id))).execute(&mut conn)?)
    }
}

// ── Checkout unit of work ────────────────────────────────────────────────────

struct PgCheckoutUnit<'c> {
    conn: &'c mut PgConnection,
}

fn lock_cart_rows(conn: &mut PgConnection, user_id: i32) -> QueryResult<Vec<i32>> {
    carts::table
        .filter(carts::user_id.eq(user_id))
        .select(carts::id)
        .for_update()
        .load(conn)
}

impl CheckoutUnit for PgCheckoutUnit<'_> {
    fn lock_cart(&mut self, user_id: i32) -> Result<Vec<CartLineView>, DomainError> {
        // Concurrent checkouts of the same cart queue up here; the loser
        // re-reads after the winner's commit and sees an empty cart.
        let locked = lock_cart_rows(self.conn, user_id)?;
        let mut lines = load_cart_lines(self.conn, user_id)?;
        lines.retain(|line| locked.contains(&line.id));
        Ok(lines)
    }

    fn insert_order(&mut self, order: &NewOrder) -> Result<(), DomainError> {
        diesel::insert_into(orders::table)
            .values(&NewOrderRow::from(order))
            .execute(self.conn)?;
        Ok(())
    }

    fn insert_items(&mut self, items: &[NewOrderItem]) -> Result<(), DomainError> {
        let rows: Vec<NewOrderItemRow> = items.iter().map(NewOrderItemRow::from).collect();
        let inserted = diesel::insert_into(order_items::table)
            .values(&rows)
            .execute(self.conn)?;

        if inserted != rows.len() {
            return Err(DomainError::Internal(format!(
                "expected {} order items, inserted {}",
                rows.len(),
                inserted
            )));
        }
        Ok(())
    }

    fn clear_cart(&mut self, line_ids: &[i32]) -> Result<usize, DomainError> {
        Ok(diesel::delete(carts::table.filter(carts::id.eq_any(line_ids))).execute(self.conn)?)
    }
}

impl CheckoutRepository for DieselStorefrontRepository {
    fn checkout_unit<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn CheckoutUnit) -> Result<T, DomainError>,
    {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut unit = PgCheckoutUnit { conn };
            work(&mut unit)
        })
    }
}

// ── Order queries ────────────────────────────────────────────────────────────

impl OrderRepository for DieselStorefrontRepository {
    fn find_by_id(&self, id: &str) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        order_with_items(&mut conn, order, None).map(Some)
    }

    fn list(&self, owner_id: Option<i32>) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, DomainError, _>(|conn| {
                let mut query = orders::table
                    .inner_join(users::table)
                    .select((OrderRow::as_select(), users::username, users::email))
                    .order((orders::created_at.desc(), orders::id.desc()))
                    .into_boxed();
                if let Some(owner_id) = owner_id {
                    query = query.filter(orders::user_id.eq(owner_id));
                }
                let rows = query.load::<(OrderRow, String, String)>(conn)?;

                let ids: Vec<String> = rows.iter().map(|(o, _, _)| o.id.clone()).collect();
                let mut items = load_items(conn, &ids)?;

                rows.into_iter()
                    .map(|(order, username, email)| -> Result<OrderView, DomainError> {
                        let lines = items.remove(&order.id).unwrap_or_default();
                        Ok(OrderView {
                            header: order.try_into()?,
                            customer: Some(CustomerSummary { username, email }),
                            items: lines,
                        })
                    })
                    .collect()
            })
    }

    fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let updated = diesel::update(orders::table.find(id))
                .set((
                    orders::status.eq(status.as_str()),
                    orders::updated_at.eq(Utc::now()),
                ))
                .returning(OrderRow::as_returning())
                .get_result(conn)
                .optional()?;

            match updated {
                Some(order) => order_with_items(conn, order, None).map(Some),
                None => Ok(None),
            }
        })
    }

    fn stats(&self) -> Result<OrderStats, DomainError> {
        let mut conn = self.pool.get()?;

        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, DomainError, _>(|conn| {
                let total_orders: i64 = orders::table.count().get_result(conn)?;
                let revenue: Option<BigDecimal> = orders::table
                    .filter(orders::status.ne(OrderStatus::Cancelled.as_str()))
                    .select(sum(orders::total_amount))
                    .get_result(conn)?;

                Ok(OrderStats {
                    total_orders,
                    pending_orders: count_with_status(conn, OrderStatus::Pending)?,
                    completed_orders: count_with_status(conn, OrderStatus::Delivered)?,
                    cancelled_orders: count_with_status(conn, OrderStatus::Cancelled)?,
                    total_revenue: revenue.unwrap_or_else(|| BigDecimal::from(0)),
                })
            })
    }
}
