use log::*;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db::{
        sqlite::errors::user_not_found_or_other,
        traits::{InsertOrderResult, LedgerError},
    },
    db_types::{NewOrder, Order, OrderNumber, OrderStatusType, OrderUpdate},
};

const ORDER_COLUMNS: &str = "order_number, user_id, status, accrual, uploaded_at, updated_at";

/// Inserts the order if its number is new, otherwise returns the existing record.
///
/// The insert is attempted first, so when this is embedded in a transaction the writer lock is taken up front. Pass
/// `&mut *tx` as the connection argument to do that.
pub async fn idempotent_insert(order: NewOrder, conn: &mut SqliteConnection) -> Result<InsertOrderResult, LedgerError> {
    let inserted = sqlx::query_as::<_, Order>(&format!(
        "INSERT INTO orders (order_number, user_id) VALUES ($1, $2) ON CONFLICT (order_number) DO NOTHING RETURNING \
         {ORDER_COLUMNS}"
    ))
    .bind(&order.order_number)
    .bind(order.user_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| user_not_found_or_other(e, order.user_id))?;
    if let Some(order) = inserted {
        debug!("🗃️ Order {} has been saved for user {}", order.order_number, order.user_id);
        return Ok(InsertOrderResult::Inserted(order));
    }
    let existing = fetch_order_by_number(&order.order_number, conn).await?.ok_or_else(|| {
        LedgerError::DatabaseError(format!("Order {} conflicted on insert but cannot be found", order.order_number))
    })?;
    trace!("🗃️ Order {} already exists. It belongs to user {}", existing.order_number, existing.user_id);
    Ok(InsertOrderResult::AlreadyExists(existing))
}

pub async fn fetch_order_by_number(
    order_number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1"))
        .bind(order_number)
        .fetch_optional(conn)
        .await
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

#[derive(Debug, Clone, Default)]
pub struct OrderQueryFilter {
    user_id: Option<i64>,
    statuses: Vec<OrderStatusType>,
    sort: SortOrder,
}

impl OrderQueryFilter {
    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_statuses<I: IntoIterator<Item = OrderStatusType>>(mut self, statuses: I) -> Self {
        self.statuses.extend(statuses);
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.sort = SortOrder::NewestFirst;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.statuses.is_empty()
    }
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`.
///
/// Results are sorted by upload time, with insertion order breaking ties.
pub async fn fetch_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders "));
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(id) = query.user_id {
        where_clause.push("user_id = ");
        where_clause.push_bind_unseparated(id);
    }
    if !query.statuses.is_empty() {
        where_clause.push("status IN (");
        for (i, status) in query.statuses.into_iter().enumerate() {
            if i > 0 {
                where_clause.push_unseparated(", ");
            }
            where_clause.push_bind_unseparated(status);
        }
        where_clause.push_unseparated(")");
    }
    match query.sort {
        SortOrder::OldestFirst => builder.push(" ORDER BY uploaded_at ASC, rowid ASC"),
        SortOrder::NewestFirst => builder.push(" ORDER BY uploaded_at DESC, rowid DESC"),
    };
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("🗃️ Result of fetch_orders: {}", orders.len());
    Ok(orders)
}

/// Writes the update to the order, unless it has already reached a terminal status. Returns true if a row changed.
pub async fn update_order_status(
    order_number: &OrderNumber,
    update: OrderUpdate,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE orders SET status = $1, accrual = $2, updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now') WHERE \
         order_number = $3 AND status NOT IN ('PROCESSED', 'INVALID')",
    )
    .bind(update.status)
    .bind(update.accrual)
    .bind(order_number)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}
