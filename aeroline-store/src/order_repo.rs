use std::collections::HashMap;

use aeroline_core::models::{NewTicket, Order, Ticket};
use aeroline_core::repository::OrderRepository;
use aeroline_core::{CoreError, CoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{db_error, PgStore};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: i64,
    seat_row: i32,
    seat: i32,
    flight_id: i64,
    order_id: i64,
}

impl PgStore {
    /// Loads tickets (with their flights) for the given order rows.
    async fn assemble_orders(&self, rows: Vec<OrderRow>) -> CoreResult<Vec<Order>> {
        let order_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let ticket_rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, seat_row, seat, flight_id, order_id
            FROM tickets
            WHERE order_id = ANY($1)
            ORDER BY seat_row, seat
            "#,
        )
        .bind(&order_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut flight_ids: Vec<i64> = ticket_rows.iter().map(|t| t.flight_id).collect();
        flight_ids.sort_unstable();
        flight_ids.dedup();
        let flights = self.flights_by_id(&flight_ids).await?;

        let mut tickets_by_order: HashMap<i64, Vec<Ticket>> = HashMap::new();
        for row in ticket_rows {
            let flight = flights
                .get(&row.flight_id)
                .cloned()
                .ok_or_else(|| CoreError::Internal(format!("ticket {} has no flight", row.id)))?;
            tickets_by_order.entry(row.order_id).or_default().push(Ticket {
                id: row.id,
                row: row.seat_row,
                seat: row.seat,
                flight,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| Order {
                id: row.id,
                user_id: row.user_id,
                created_at: row.created_at,
                tickets: tickets_by_order.remove(&row.id).unwrap_or_default(),
            })
            .collect())
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn create_order(
        &self,
        user_id: i64,
        created_at: DateTime<Utc>,
        tickets: &[NewTicket],
    ) -> CoreResult<Order> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let (order_id,): (i64,) = sqlx::query_as(
            "INSERT INTO orders (user_id, created_at) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        // A taken seat aborts here and the dropped transaction rolls back.
        for ticket in tickets {
            sqlx::query(
                r#"
                INSERT INTO tickets (seat_row, seat, flight_id, order_id)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(ticket.row)
            .bind(ticket.seat)
            .bind(ticket.flight)
            .bind(order_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        debug!("Order {} committed with {} ticket(s)", order_id, tickets.len());

        self.get_order(user_id, order_id)
            .await?
            .ok_or_else(|| CoreError::Internal(format!("order {} vanished after insert", order_id)))
    }

    async fn get_order(&self, user_id: i64, id: i64) -> CoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, created_at FROM orders WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => Ok(self.assemble_orders(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn list_orders(&self, user_id: i64) -> CoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, user_id, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        self.assemble_orders(rows).await
    }
}
