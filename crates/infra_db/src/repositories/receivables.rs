//! Receivables repository implementation
//!
//! Read-only access to the `customers`, `transactions` and `payments`
//! tables. Filters are assembled with `QueryBuilder` so every optional
//! criterion binds a parameter instead of being spliced into the SQL.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DatabaseError;

const TRANSACTION_COLUMNS: &str = "SELECT id, customer_id, COALESCE(amount, 0) AS amount, \
     COALESCE(description, '') AS description, due_date, \
     COALESCE(status, 'unpaid') AS status, created_at FROM transactions WHERE TRUE";

const CUSTOMER_COLUMNS: &str = "SELECT id, name, customer_type, customer_type_multi, \
     mobile, phone, created_at FROM customers WHERE TRUE";

/// Database row for a transaction
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: i64,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Database row for a payment
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub transaction_id: Uuid,
    /// NULL amounts are kept as `None`
    pub amount: Option<i64>,
    pub paid_at: DateTime<Utc>,
}

/// Database row for a customer
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CustomerRow {
    pub id: Uuid,
    pub name: String,
    pub customer_type: Option<String>,
    pub customer_type_multi: Option<Vec<String>>,
    pub mobile: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Criteria for transaction reads, in storage terms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub customer_id: Option<Uuid>,
    pub status: Option<String>,
    pub status_not: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub due_from: Option<NaiveDate>,
    pub due_before: Option<NaiveDate>,
    pub newest_first: bool,
}

impl TransactionQuery {
    fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let Some(customer_id) = self.customer_id {
            builder.push(" AND customer_id = ").push_bind(customer_id);
        }
        if let Some(ref status) = self.status {
            builder
                .push(" AND COALESCE(status, 'unpaid') = ")
                .push_bind(status.clone());
        }
        if let Some(ref status) = self.status_not {
            builder
                .push(" AND COALESCE(status, 'unpaid') <> ")
                .push_bind(status.clone());
        }
        if let Some(from) = self.created_from {
            builder.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(from) = self.due_from {
            builder.push(" AND due_date >= ").push_bind(from);
        }
        if let Some(before) = self.due_before {
            builder.push(" AND due_date < ").push_bind(before);
        }
    }

    /// Builds the detail query
    pub fn select(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(TRANSACTION_COLUMNS);
        self.push_conditions(&mut builder);
        builder.push(if self.newest_first {
            " ORDER BY created_at DESC, id ASC"
        } else {
            " ORDER BY created_at ASC, id ASC"
        });
        builder
    }

    /// Builds the count query; it never joins payments
    pub fn count(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM transactions WHERE TRUE");
        self.push_conditions(&mut builder);
        builder
    }
}

/// Criteria for customer reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerQuery {
    pub ids: Option<Vec<Uuid>>,
    pub name_contains: Option<String>,
}

impl CustomerQuery {
    pub fn select(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(CUSTOMER_COLUMNS);
        if let Some(ref ids) = self.ids {
            builder.push(" AND id = ANY(").push_bind(ids.clone()).push(")");
        }
        if let Some(ref fragment) = self.name_contains {
            builder
                .push(" AND strpos(name, ")
                .push_bind(fragment.clone())
                .push(") > 0");
        }
        builder.push(" ORDER BY name ASC, id ASC");
        builder
    }
}

/// Repository for receivables reads
#[derive(Debug, Clone)]
pub struct ReceivablesRepository {
    pool: PgPool,
}

impl ReceivablesRepository {
    /// Creates a new ReceivablesRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches transactions matching the query
    pub async fn find_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionRow>, DatabaseError> {
        query
            .select()
            .build_query_as::<TransactionRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)
    }

    /// Counts transactions matching the query
    pub async fn count_transactions(&self, query: &TransactionQuery) -> Result<i64, DatabaseError> {
        query
            .count()
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)
    }

    /// Fetches every payment for the given transactions, oldest first
    pub async fn find_payments(
        &self,
        transaction_ids: &[Uuid],
    ) -> Result<Vec<PaymentRow>, DatabaseError> {
        if transaction_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, transaction_id, amount, paid_at
            FROM payments
            WHERE transaction_id = ANY($1)
            ORDER BY paid_at ASC, id ASC
            "#,
        )
        .bind(transaction_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)
    }

    /// Retrieves a customer by id
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such customer exists
    pub async fn get_customer(&self, id: Uuid) -> Result<CustomerRow, DatabaseError> {
        let mut builder = QueryBuilder::<Postgres>::new(CUSTOMER_COLUMNS);
        builder.push(" AND id = ").push_bind(id);

        builder
            .build_query_as::<CustomerRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::not_found("Customer", id))
    }

    /// Checks if a customer exists
    pub async fn customer_exists(&self, id: Uuid) -> Result<bool, DatabaseError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)
    }

    /// Fetches customers matching the query, ordered by name
    pub async fn find_customers(
        &self,
        query: &CustomerQuery,
    ) -> Result<Vec<CustomerRow>, DatabaseError> {
        query
            .select()
            .build_query_as::<CustomerRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)
    }
}
