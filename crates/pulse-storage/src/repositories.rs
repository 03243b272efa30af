// Postgres repository for event collections and flow records
//
// Each event category lives in its own table. Table names come from the closed
// EventCategory set, never from request input, so they are interpolated directly.

use std::time::Duration;

use pulse_core::{DateRange, EventCategory, EventRecord, RawFlowRecord};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use crate::error::StoreError;
use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection pool from URL
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))
    }

    /// Liveness probe
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ============================================
    // Events
    // ============================================

    #[instrument(skip(self), fields(collection = query.category.collection()))]
    pub async fn find_events(&self, query: &EventQuery) -> Result<Vec<EventRecord>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id, document FROM ");
        builder.push(query.category.collection());
        builder.push(" WHERE TRUE");
        push_filters(&mut builder, query.range.as_ref(), query.page_path.as_deref());
        builder.push(" ORDER BY event_timestamp DESC LIMIT ");
        builder.push_bind(query.sql_limit());

        let rows: Vec<EventRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        let events = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match row.into_record(query.category) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!(id, error = %e, "Skipping undecodable event document");
                        None
                    }
                }
            })
            .collect();

        Ok(events)
    }

    pub async fn insert_event(&self, record: &EventRecord) -> Result<(), StoreError> {
        let document = serde_json::to_value(record)?;
        let sql = format!(
            "INSERT INTO {} (event_id, event_timestamp, session_id, page_path, document) \
             VALUES ($1, $2, $3, $4, $5)",
            record.event_type.collection()
        );

        sqlx::query(&sql)
            .bind(&record.event_id)
            .bind(&record.timestamp)
            .bind(&record.session_id)
            .bind(&record.page_path)
            .bind(sqlx::types::Json(document))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Distinct non-null session ids matching the window and page
    #[instrument(skip(self))]
    pub async fn count_distinct_sessions(
        &self,
        category: EventCategory,
        range: &DateRange,
        page_path: Option<&str>,
    ) -> Result<u64, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(DISTINCT session_id) FROM ");
        builder.push(category.collection());
        builder.push(" WHERE session_id IS NOT NULL");
        push_filters(&mut builder, Some(range), page_path);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    /// Distinct non-null page paths observed in the window, ascending
    #[instrument(skip(self))]
    pub async fn distinct_page_paths(
        &self,
        category: EventCategory,
        range: &DateRange,
    ) -> Result<Vec<String>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT DISTINCT page_path FROM ");
        builder.push(category.collection());
        builder.push(" WHERE page_path IS NOT NULL");
        push_filters(&mut builder, Some(range), None);
        builder.push(" ORDER BY page_path");

        let paths: Vec<String> = builder.build_query_scalar().fetch_all(&self.pool).await?;
        Ok(paths)
    }

    // ============================================
    // Flow records
    // ============================================

    /// Raw flow records with `flow_date` inside the range, both ends inclusive
    #[instrument(skip(self))]
    pub async fn find_flows(&self, range: &DateRange) -> Result<Vec<RawFlowRecord>, StoreError> {
        let rows = sqlx::query_as::<_, FlowRow>(
            r#"
            SELECT flow_date, flow_key, count
            FROM flow_records
            WHERE flow_date >= $1 AND flow_date <= $2
            ORDER BY flow_date, flow_key
            "#,
        )
        .bind(range.start_date_string())
        .bind(range.end_date_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RawFlowRecord::from).collect())
    }

    /// Insert or replace the record keyed by `(flow_date, flow_key)`
    pub async fn upsert_flow(&self, record: &RawFlowRecord) -> Result<(), StoreError> {
        let count = record
            .count
            .as_ref()
            .map(|c| c.parse())
            .transpose()
            .map_err(|e| StoreError::Serialization(e.to_string()))?
            .map(|c| {
                i64::try_from(c).map_err(|_| {
                    StoreError::Serialization(format!("flow count {c} exceeds BIGINT"))
                })
            })
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO flow_records (flow_date, flow_key, count)
            VALUES ($1, $2, $3)
            ON CONFLICT (flow_date, flow_key) DO UPDATE SET count = EXCLUDED.count
            "#,
        )
        .bind(&record.flow_date)
        .bind(&record.flow_key)
        .bind(count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn push_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    range: Option<&DateRange>,
    page_path: Option<&str>,
) {
    if let Some(range) = range {
        builder.push(" AND event_timestamp >= ");
        builder.push_bind(range.start_bound());
        builder.push(" AND event_timestamp < ");
        builder.push_bind(range.end_bound_exclusive());
    }
    if let Some(path) = page_path {
        builder.push(" AND page_path = ");
        builder.push_bind(path.to_string());
    }
}
