use crate::sql::{order_bindings, procedure_statement, rewrite_named, with_paging};
use crate::transaction;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use core_types::{
    CompiledProcedure, DataAccessError, DataAccessSession, PreparedQuery, ProcedureDeclaration,
    QueryText, Row, SqlType, TemporalKind, Value,
};
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Executor, PgPool, Postgres, Row as _, TypeInfo};
use std::collections::{BTreeMap, HashMap};

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// A data-access session over a PostgreSQL pool.
///
/// Statements run on the transaction of the enclosing [`crate::PgBoundary`]
/// when there is one, and on a pooled connection otherwise.
#[derive(Debug, Clone)]
pub struct PgSession {
    pool: PgPool,
    named: HashMap<String, String>,
}

impl PgSession {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            named: HashMap::new(),
        }
    }

    /// Registers the SQL of named queries.
    pub fn with_named_queries(mut self, queries: BTreeMap<String, String>) -> Self {
        self.named.extend(queries);
        self
    }

    fn sql_for<'a>(&'a self, text: &'a QueryText) -> Result<&'a str, DataAccessError> {
        match text {
            QueryText::Literal(sql) => Ok(sql.as_str()),
            QueryText::Named(name) => self
                .named
                .get(name)
                .map(String::as_str)
                .ok_or_else(|| DataAccessError::UnknownNamedQuery(name.clone())),
        }
    }

    /// Rewrites, pages and binds a prepared query.
    fn statement(
        &self,
        query: &PreparedQuery,
    ) -> Result<(String, Vec<(Value, Option<TemporalKind>)>), DataAccessError> {
        let (sql, names) = rewrite_named(self.sql_for(&query.text)?);
        let values = order_bindings(&names, &query.bindings)?
            .into_iter()
            .map(|b| (b.value.clone(), b.temporal))
            .collect();
        Ok((with_paging(&sql, query.first_result, query.max_results), values))
    }

    async fn fetch_all(&self, query: PgQuery<'_>) -> Result<Vec<PgRow>, sqlx::Error> {
        if let Some(slot) = transaction::current() {
            let mut guard = slot.lock().await;
            if let Some(tx) = guard.as_mut() {
                return query.fetch_all(&mut **tx).await;
            }
        }
        query.fetch_all(&self.pool).await
    }

    async fn execute(&self, query: PgQuery<'_>) -> Result<u64, sqlx::Error> {
        if let Some(slot) = transaction::current() {
            let mut guard = slot.lock().await;
            if let Some(tx) = guard.as_mut() {
                return Ok(query.execute(&mut **tx).await?.rows_affected());
            }
        }
        Ok(query.execute(&self.pool).await?.rows_affected())
    }
}

#[async_trait]
impl DataAccessSession for PgSession {
    async fn fetch(&self, query: &PreparedQuery) -> Result<Vec<Row>, DataAccessError> {
        let (sql, values) = self.statement(query)?;
        tracing::debug!(method = %query.method, sql = %sql, "Fetching");
        let mut bound = sqlx::query(&sql);
        for (value, temporal) in values {
            bound = bind_value(bound, value, temporal, None)?;
        }
        let rows = self.fetch_all(bound).await?;
        let decoded = rows.iter().map(decode_row).collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(decoded)
    }

    async fn execute_update(&self, query: &PreparedQuery) -> Result<u64, DataAccessError> {
        let (sql, values) = self.statement(query)?;
        tracing::debug!(method = %query.method, sql = %sql, "Executing");
        let mut bound = sqlx::query(&sql);
        for (value, temporal) in values {
            bound = bind_value(bound, value, temporal, None)?;
        }
        Ok(self.execute(bound).await?)
    }

    async fn prepare(
        &self,
        declaration: ProcedureDeclaration,
    ) -> Result<CompiledProcedure, DataAccessError> {
        let statement = procedure_statement(&declaration);
        // The server rejects unknown procedures and mismatched signatures here.
        (&self.pool).prepare(statement.as_str()).await?;
        tracing::debug!(statement = %statement, "Procedure prepared");
        Ok(CompiledProcedure::new(declaration, statement))
    }

    async fn call(
        &self,
        procedure: &CompiledProcedure,
        inputs: &[(String, Value)],
    ) -> Result<Row, DataAccessError> {
        let mut bound = sqlx::query(procedure.statement());
        for param in procedure.declaration().inputs() {
            let value = inputs
                .iter()
                .find(|(name, _)| *name == param.name)
                .map(|(_, value)| value.clone())
                .unwrap_or(Value::Null);
            bound = bind_value(bound, value, None, Some(param.sql_type))?;
        }
        let rows = self.fetch_all(bound).await?;
        match rows.first() {
            Some(row) => Ok(decode_row(row)?),
            None => Ok(Row::new()),
        }
    }
}

/// Binds one value. A null is typed after `sql_type` when it is known.
fn bind_value<'q>(
    query: PgQuery<'q>,
    value: Value,
    temporal: Option<TemporalKind>,
    sql_type: Option<SqlType>,
) -> Result<PgQuery<'q>, DataAccessError> {
    let bound = match value {
        Value::Null => bind_null(query, sql_type),
        Value::Bool(v) => query.bind(v),
        Value::Int(v) => query.bind(v),
        Value::Long(v) => query.bind(v),
        Value::Double(v) => query.bind(v),
        Value::Decimal(v) => query.bind(v),
        Value::Text(v) => query.bind(v),
        Value::Timestamp(v) => match temporal {
            Some(TemporalKind::Date) => query.bind(v.date_naive()),
            Some(TemporalKind::Time) => query.bind(v.time()),
            Some(TemporalKind::Timestamp) | None => query.bind(v),
        },
        Value::Uuid(v) => query.bind(v),
        Value::Json(v) => query.bind(v),
        other @ (Value::Row(_) | Value::List(_)) => {
            return Err(DataAccessError::Backend(format!(
                "a {} cannot be bound as a parameter",
                other.type_name()
            )));
        }
    };
    Ok(bound)
}

fn bind_null(query: PgQuery<'_>, sql_type: Option<SqlType>) -> PgQuery<'_> {
    match sql_type {
        Some(SqlType::Boolean) => query.bind(None::<bool>),
        Some(SqlType::Integer) => query.bind(None::<i32>),
        Some(SqlType::BigInt) => query.bind(None::<i64>),
        Some(SqlType::Double) => query.bind(None::<f64>),
        Some(SqlType::Numeric) => query.bind(None::<Decimal>),
        Some(SqlType::Timestamp) => query.bind(None::<chrono::DateTime<chrono::Utc>>),
        Some(SqlType::Date) => query.bind(None::<NaiveDate>),
        Some(SqlType::Time) => query.bind(None::<chrono::NaiveTime>),
        Some(SqlType::Uuid) => query.bind(None::<uuid::Uuid>),
        Some(SqlType::Json) => query.bind(None::<serde_json::Value>),
        Some(SqlType::Varchar) | None => query.bind(None::<String>),
    }
}

/// Decodes a row by each column's PostgreSQL type.
fn decode_row(row: &PgRow) -> Result<Row, sqlx::Error> {
    let mut decoded = Row::new();
    for column in row.columns() {
        let i = column.ordinal();
        let value = match column.type_info().name() {
            "BOOL" => row.try_get::<Option<bool>, _>(i)?.map(Value::Bool),
            "INT2" => row.try_get::<Option<i16>, _>(i)?.map(|v| Value::Int(v.into())),
            "INT4" => row.try_get::<Option<i32>, _>(i)?.map(Value::Int),
            "INT8" => row.try_get::<Option<i64>, _>(i)?.map(Value::Long),
            "FLOAT4" => row.try_get::<Option<f32>, _>(i)?.map(|v| Value::Double(v.into())),
            "FLOAT8" => row.try_get::<Option<f64>, _>(i)?.map(Value::Double),
            "NUMERIC" => row.try_get::<Option<Decimal>, _>(i)?.map(Value::Decimal),
            "TIMESTAMPTZ" => row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(i)?.map(Value::Timestamp),
            "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(i)?
                .map(|v| Value::Timestamp(v.and_utc())),
            "DATE" => row
                .try_get::<Option<NaiveDate>, _>(i)?
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|v| Value::Timestamp(v.and_utc())),
            "UUID" => row.try_get::<Option<uuid::Uuid>, _>(i)?.map(Value::Uuid),
            "JSON" | "JSONB" => row.try_get::<Option<serde_json::Value>, _>(i)?.map(Value::Json),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => row.try_get::<Option<String>, _>(i)?.map(Value::Text),
            other => {
                tracing::trace!(column = column.name(), pg_type = other, "Reading column as text");
                row.try_get::<Option<String>, _>(i).ok().flatten().map(Value::Text)
            }
        };
        decoded.push(column.name(), value.unwrap_or(Value::Null));
    }
    Ok(decoded)
}
