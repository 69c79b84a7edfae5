//! PostgreSQL connection with TLS and retries, and the catalog executor over it.

use async_trait::async_trait;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Row};

use crate::config::SslMode;
use crate::error::{format_db_error, Result, ScourError};
use crate::executor::{CatalogQueryExecutor, CatalogRow};

/// Validate that a SQL identifier contains only safe characters.
///
/// Returns an error for names with characters outside `[a-zA-Z0-9_]`.
/// Quoting is still applied to every identifier; this only rejects
/// suspicious names early.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ScourError::ConfigError(
            "Identifier cannot be empty".to_string(),
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ScourError::ConfigError(format!(
            "Identifier '{}' contains invalid characters. Only [a-zA-Z0-9_] are allowed.",
            name
        )));
    }
    Ok(())
}

/// Build a rustls ClientConfig using the Mozilla CA bundle.
fn make_rustls_config() -> rustls::ClientConfig {
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}

/// Check if a postgres error is a permanent authentication failure that should not be retried.
fn is_permanent_error(e: &tokio_postgres::Error) -> bool {
    if let Some(db_err) = e.as_db_error() {
        let code = db_err.code().code();
        // 28P01 = invalid_password, 28000 = invalid_authorization_specification
        return code == "28P01" || code == "28000";
    }
    false
}

/// Connect once, spawning the connection task on the tokio runtime.
async fn connect_once(
    conn_string: &str,
    ssl_mode: &SslMode,
    connect_timeout_secs: u32,
) -> std::result::Result<Client, tokio_postgres::Error> {
    let connect_fut = async {
        match ssl_mode {
            SslMode::Disable => {
                let (client, connection) =
                    tokio_postgres::connect(conn_string, tokio_postgres::NoTls).await?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::error!(error = %e, "Database connection error");
                    }
                });
                Ok(client)
            }
            SslMode::Require => {
                let tls = tokio_postgres_rustls::MakeRustlsConnect::new(make_rustls_config());
                let (client, connection) = tokio_postgres::connect(conn_string, tls).await?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::error!(error = %e, "Database connection error");
                    }
                });
                Ok(client)
            }
            SslMode::Prefer => {
                let tls = tokio_postgres_rustls::MakeRustlsConnect::new(make_rustls_config());
                match tokio_postgres::connect(conn_string, tls).await {
                    Ok((client, connection)) => {
                        tokio::spawn(async move {
                            if let Err(e) = connection.await {
                                tracing::error!(error = %e, "Database connection error");
                            }
                        });
                        Ok(client)
                    }
                    Err(_) => {
                        tracing::debug!("TLS connection failed, falling back to plaintext");
                        let (client, connection) =
                            tokio_postgres::connect(conn_string, tokio_postgres::NoTls).await?;
                        tokio::spawn(async move {
                            if let Err(e) = connection.await {
                                tracing::error!(error = %e, "Database connection error");
                            }
                        });
                        Ok(client)
                    }
                }
            }
        }
    };

    if connect_timeout_secs > 0 {
        match tokio::time::timeout(
            std::time::Duration::from_secs(connect_timeout_secs as u64),
            connect_fut,
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(tokio_postgres::Error::__private_api_timeout()),
        }
    } else {
        connect_fut.await
    }
}

/// Connect with TLS preferred, no retries and a 30 second timeout.
pub async fn connect(conn_string: &str) -> Result<Client> {
    connect_with_config(conn_string, &SslMode::Prefer, 0, 30, 0).await
}

/// Connect to the database, retrying up to `retries` times with exponential backoff + jitter.
///
/// Each retry waits `min(2^attempt, 30) + rand(0..1000ms)` before the next attempt.
/// Permanent errors (authentication failures) are not retried.
pub async fn connect_with_config(
    conn_string: &str,
    ssl_mode: &SslMode,
    retries: u32,
    connect_timeout_secs: u32,
    statement_timeout_secs: u32,
) -> Result<Client> {
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let base_delay = std::cmp::min(1u64 << attempt, 30);
            let delay = std::time::Duration::from_secs(base_delay)
                + std::time::Duration::from_millis(fastrand::u64(0..1000));
            tracing::info!(
                attempt = attempt + 1,
                max_attempts = retries + 1,
                delay_ms = delay.as_millis() as u64,
                "Connection attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }

        match connect_once(conn_string, ssl_mode, connect_timeout_secs).await {
            Ok(client) => {
                if attempt > 0 {
                    tracing::info!(
                        attempt = attempt + 1,
                        max_attempts = retries + 1,
                        "Connected successfully after retry"
                    );
                }

                if statement_timeout_secs > 0 {
                    let timeout_sql =
                        format!("SET statement_timeout = '{}s'", statement_timeout_secs);
                    client.batch_execute(&timeout_sql).await?;
                }

                return Ok(client);
            }
            Err(e) => {
                if is_permanent_error(&e) {
                    tracing::error!(error = %e, "Permanent connection error, not retrying");
                    return Err(ScourError::DatabaseError(e));
                }
                if attempt >= retries {
                    return Err(ScourError::DatabaseError(e));
                }
            }
        }

        attempt += 1;
    }
}

fn query_error(sql: &str, e: tokio_postgres::Error) -> ScourError {
    ScourError::CatalogQuery {
        sql: sql.to_string(),
        reason: format_db_error(&e),
        source: Box::new(e),
    }
}

fn bind<'a>(params: &'a [&str]) -> Vec<&'a (dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

/// Read an integer column whatever its width (COUNT(*) is BIGINT in PostgreSQL).
fn read_int(row: &Row, idx: usize) -> std::result::Result<i64, tokio_postgres::Error> {
    match row.try_get::<_, i64>(idx) {
        Ok(v) => Ok(v),
        Err(_) => match row.try_get::<_, i32>(idx) {
            Ok(v) => Ok(v as i64),
            Err(_) => row.try_get::<_, i16>(idx).map(i64::from),
        },
    }
}

async fn query_first(client: &Client, sql: &str, params: &[&str]) -> Result<Row> {
    client
        .query_one(sql, &bind(params))
        .await
        .map_err(|e| query_error(sql, e))
}

#[async_trait]
impl CatalogQueryExecutor for Client {
    async fn query_scalar_int(&self, sql: &str, params: &[&str]) -> Result<i64> {
        let row = query_first(self, sql, params).await?;
        read_int(&row, 0).map_err(|e| query_error(sql, e))
    }

    async fn query_scalar_string(&self, sql: &str, params: &[&str]) -> Result<String> {
        let row = query_first(self, sql, params).await?;
        let value: Option<String> = row.try_get(0).map_err(|e| query_error(sql, e))?;
        Ok(value.unwrap_or_default())
    }

    async fn query_string_list(&self, sql: &str, params: &[&str]) -> Result<Vec<String>> {
        let rows = self
            .query(sql, &bind(params))
            .await
            .map_err(|e| query_error(sql, e))?;
        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            let value: Option<String> = row.try_get(0).map_err(|e| query_error(sql, e))?;
            values.push(value.unwrap_or_default());
        }
        Ok(values)
    }

    async fn query_rows(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        let rows = self
            .query(sql, &bind(params))
            .await
            .map_err(|e| query_error(sql, e))?;
        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let mut values = CatalogRow::new();
            for (idx, column) in row.columns().iter().enumerate() {
                let value: Option<String> = row.try_get(idx).map_err(|e| query_error(sql, e))?;
                values.insert(column.name().to_uppercase(), value.unwrap_or_default());
            }
            result.push(values);
        }
        Ok(result)
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        self.batch_execute(sql)
            .await
            .map_err(|e| query_error(sql, e))
    }

    async fn execute_update(&self, sql: &str) -> Result<u64> {
        Client::execute(self, sql, &[])
            .await
            .map_err(|e| query_error(sql, e))
    }
}
