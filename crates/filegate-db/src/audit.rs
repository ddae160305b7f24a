use chrono::{DateTime, Utc};
use filegate_core::models::{AuditAction, AuditLog, AuditLogFilter, AuditOutcome};
use filegate_core::AppError;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

/// Append-only repository for audit trail entries.
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

/// Database image of an audit entry. `details` rides in a JSONB column,
/// so the row keeps it as raw JSON and conversion happens at the edge.
#[derive(sqlx::FromRow)]
struct AuditLogRow {
    id: Uuid,
    upload_id: Uuid,
    action: AuditAction,
    actor: String,
    timestamp: DateTime<Utc>,
    outcome: AuditOutcome,
    details: serde_json::Value,
    error_message: Option<String>,
}

impl From<AuditLogRow> for AuditLog {
    fn from(row: AuditLogRow) -> Self {
        let details: HashMap<String, String> =
            serde_json::from_value(row.details).unwrap_or_default();

        AuditLog {
            id: row.id,
            upload_id: row.upload_id,
            action: row.action,
            actor: row.actor,
            timestamp: row.timestamp,
            outcome: row.outcome,
            details,
            error_message: row.error_message,
        }
    }
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, entry), fields(db.table = "audit_logs", db.operation = "insert"))]
    pub async fn append(&self, entry: &AuditLog) -> Result<(), AppError> {
        let details = serde_json::to_value(&entry.details)?;

        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, upload_id, action, actor, timestamp, outcome, details, error_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(entry.upload_id)
        .bind(entry.action)
        .bind(&entry.actor)
        .bind(entry.timestamp)
        .bind(entry.outcome)
        .bind(details)
        .bind(&entry.error_message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List audit entries, newest first, with optional filters and
    /// pagination. Returns the page plus the total matching count.
    #[tracing::instrument(skip(self), fields(db.table = "audit_logs", db.operation = "select"))]
    pub async fn list(&self, filter: &AuditLogFilter) -> Result<(Vec<AuditLog>, i64), AppError> {
        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM audit_logs");
        push_filters(&mut count_query, filter);

        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM audit_logs");
        push_filters(&mut query, filter);
        query.push(" ORDER BY timestamp DESC");
        query.push(" LIMIT ");
        query.push_bind(filter.page_size);
        query.push(" OFFSET ");
        query.push_bind((filter.page - 1) * filter.page_size);

        let rows: Vec<AuditLogRow> = query.build_query_as().fetch_all(&self.pool).await?;
        let logs = rows.into_iter().map(AuditLog::from).collect();

        Ok((logs, total))
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &AuditLogFilter) {
    let mut separated = false;
    let mut prefix = |query: &mut QueryBuilder<'_, Postgres>| {
        if separated {
            query.push(" AND ");
        } else {
            query.push(" WHERE ");
            separated = true;
        }
    };

    if let Some(upload_id) = filter.upload_id {
        prefix(query);
        query.push("upload_id = ");
        query.push_bind(upload_id);
    }
    if let Some(action) = filter.action {
        prefix(query);
        query.push("action = ");
        query.push_bind(action);
    }
    if let Some(actor) = &filter.actor {
        prefix(query);
        query.push("actor = ");
        query.push_bind(actor.clone());
    }
}
