//! PostgreSQL session implementation.
//!
//! Provides the `PostgresConnector` that implements the `Connector` trait
//! using a single, unpooled sqlx connection per target.

use crate::config::ConnectionTarget;
use crate::db::{BatchResult, Connector, Row, Session, SessionError, Value};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow, Postgres};
use sqlx::{Column as SqlxColumn, Connection, Either, Row as SqlxRow, TypeInfo};
use tracing::debug;

/// Opens plain PostgreSQL connections from connection strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresConnector;

impl PostgresConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    async fn open(&self, target: &ConnectionTarget) -> Result<Box<dyn Session>, SessionError> {
        let options: PgConnectOptions = target
            .as_str()
            .parse()
            .map_err(|e| SessionError::transport(format!("Invalid connection string: {e}")))?;

        let conn = PgConnection::connect_with(&options)
            .await
            .map_err(map_connect_error)?;

        debug!("Connected to {}", target);
        Ok(Box::new(PostgresSession { conn: Some(conn) }))
    }
}

/// A single PostgreSQL connection.
///
/// No transaction is opened around the batch, so each statement commits on
/// its own unless the script itself issues `BEGIN`/`COMMIT`.
#[derive(Debug)]
pub struct PostgresSession {
    conn: Option<PgConnection>,
}

#[async_trait]
impl Session for PostgresSession {
    async fn execute_batch(&mut self, sql: &str) -> Result<BatchResult, SessionError> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| SessionError::transport("Session is closed"))?;
        let mut result = BatchResult::default();

        // The simple-query protocol accepts several `;`-separated statements.
        let mut stream = sqlx::raw_sql(sql).fetch_many(conn);

        while let Some(item) = stream.try_next().await.map_err(map_session_error)? {
            match item {
                Either::Left(done) => result.rows_affected += done.rows_affected(),
                Either::Right(row) => result.rows.push(convert_row(&row)),
            }
        }

        Ok(result)
    }

    async fn close(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        if let Err(e) = conn.close().await {
            debug!("Error while closing connection: {}", e);
        }
    }
}

/// Maps errors raised while opening a session. No statement has run yet, so
/// server-reported errors (bad password, unknown database, too many clients)
/// are transport errors too.
fn map_connect_error(error: sqlx::Error) -> SessionError {
    match error {
        sqlx::Error::Database(_) => SessionError::Transport(format_database_error(&error)),
        other => map_session_error(other),
    }
}

/// Splits sqlx errors into statement-level and transport-level failures.
fn map_session_error(error: sqlx::Error) -> SessionError {
    match error {
        sqlx::Error::Database(_) => SessionError::Driver(format_database_error(&error)),
        sqlx::Error::Configuration(e) => {
            SessionError::transport(format!("Invalid connection string: {e}"))
        }
        other => SessionError::Transport(other.to_string()),
    }
}

/// Formats a database error with the Postgres-specific detail and hint.
fn format_database_error(error: &sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
    }

    result
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    let mut converted = Row::new();
    for (i, col) in row.columns().iter().enumerate() {
        converted.push(col.name(), convert_value(row, i, col.type_info().name()));
    }
    converted
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => decode::<bool>(row, index, Value::Bool),
        "INT2" | "SMALLINT" => decode::<i16>(row, index, |v| Value::Int(v as i64)),
        "INT4" | "INT" | "INTEGER" => decode::<i32>(row, index, |v| Value::Int(v as i64)),
        "INT8" | "BIGINT" => decode::<i64>(row, index, Value::Int),
        "FLOAT4" | "REAL" => decode::<f32>(row, index, |v| Value::Float(v as f64)),
        "FLOAT8" | "DOUBLE PRECISION" => decode::<f64>(row, index, Value::Float),
        "BYTEA" => decode::<Vec<u8>>(row, index, Value::Bytes),

        // Simple-query results arrive in text format, so anything else
        // (numeric, timestamps, json, enums...) is taken verbatim as text.
        _ => decode_text(row, index),
    }
}

/// Decodes a typed column, falling back to its raw text when decoding fails.
fn decode<'r, T>(row: &'r PgRow, index: usize, wrap: impl FnOnce(T) -> Value) -> Value
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    match row.try_get::<Option<T>, _>(index) {
        Ok(value) => value.map(wrap).unwrap_or(Value::Null),
        Err(e) => {
            debug!("Column {} did not decode ({}), using its text", index, e);
            decode_text(row, index)
        }
    }
}

fn decode_text(row: &PgRow, index: usize) -> Value {
    match row.try_get_unchecked::<Option<String>, _>(index) {
        Ok(value) => value.map(Value::String).unwrap_or(Value::Null),
        Err(e) => {
            debug!("Column {} is not readable as text: {}", index, e);
            Value::Null
        }
    }
}
