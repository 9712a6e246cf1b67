//! Live database handles for the DB-client setup variant.
//!
//! `setup_template_with_db_client` hands the populate step a connected
//! handle instead of a bare connection string. The traits here exist so the
//! close-on-every-path guarantee can be checked with a fake handle; the
//! real implementation is [`PgConnector`] over `tokio-postgres`, behind the
//! default `postgres` feature.

use async_trait::async_trait;

use crate::error::ClientError;

/// A live connection to one managed database.
#[async_trait]
pub trait DatabaseHandle: Send {
    /// Verify the connection is usable.
    async fn ping(&mut self) -> Result<(), ClientError>;

    /// Release the connection. Called exactly once on every exit path of
    /// the setup sequence, whatever the outcome.
    async fn close(&mut self) -> Result<(), ClientError>;
}

/// Opens a [`DatabaseHandle`] from a rendered connection string.
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    /// Handle type produced by this connector.
    type Handle: DatabaseHandle;

    /// Open a connection to the given database.
    async fn connect(&self, connection_string: &str) -> Result<Self::Handle, ClientError>;
}

/// Connector for Postgres-backed pools.
#[cfg(feature = "postgres")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

/// A `tokio-postgres` connection handle.
///
/// The connection driver runs on a spawned task; dropping or closing the
/// client shuts it down.
#[cfg(feature = "postgres")]
pub struct PgHandle {
    client: Option<tokio_postgres::Client>,
    driver: tokio::task::JoinHandle<()>,
}

#[cfg(feature = "postgres")]
impl PgHandle {
    /// Access the underlying `tokio-postgres` client.
    ///
    /// Returns an error after [`DatabaseHandle::close`] has been called.
    pub fn client(&self) -> Result<&tokio_postgres::Client, ClientError> {
        self.client.as_ref().ok_or_else(|| ClientError::Database {
            reason: "connection already closed".to_string(),
        })
    }
}

#[cfg(feature = "postgres")]
#[async_trait]
impl DatabaseConnector for PgConnector {
    type Handle = PgHandle;

    async fn connect(&self, connection_string: &str) -> Result<PgHandle, ClientError> {
        let (client, connection) =
            tokio_postgres::connect(connection_string, tokio_postgres::NoTls)
                .await
                .map_err(|e| ClientError::Database {
                    reason: e.to_string(),
                })?;

        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!("postgres connection driver ended with error: {}", e);
            }
        });

        Ok(PgHandle {
            client: Some(client),
            driver,
        })
    }
}

#[cfg(feature = "postgres")]
#[async_trait]
impl DatabaseHandle for PgHandle {
    async fn ping(&mut self) -> Result<(), ClientError> {
        self.client()?
            .simple_query("SELECT 1")
            .await
            .map(|_| ())
            .map_err(|e| ClientError::Database {
                reason: e.to_string(),
            })
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        // Dropping the client lets the driver task wind the socket down.
        self.client.take();
        let _ = (&mut self.driver).await;
        Ok(())
    }
}
