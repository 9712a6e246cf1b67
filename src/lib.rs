//! Client for a template-based test database pool manager.
//!
//! A central manager service owns a pool of disposable test databases
//! cloned from shared templates. This crate is the client half of that
//! protocol: initialize a template under a caller-chosen hash, populate
//! and finalize it exactly once even when many test runners race on the
//! same hash, then check out and return per-test clones.
//!
//! # Setup-once pattern
//!
//! ```rust,no_run
//! use testpool_client::{Client, ClientConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::default())?;
//! let cancel = CancellationToken::new();
//!
//! // Any number of runners may race on this; populate runs exactly once.
//! client
//!     .setup_template(&cancel, "schema-hash-abc123", |conn| async move {
//!         // run migrations / load fixtures against `conn`
//!         let _ = conn;
//!         Ok(())
//!     })
//!     .await?;
//!
//! let test_db = client.get_test_database(&cancel, "schema-hash-abc123").await?;
//! // ... run the test against test_db.connection_string() ...
//! client
//!     .return_test_database(&cancel, "schema-hash-abc123", test_db.id)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! Races are resolved by the manager's server-side locking; this client
//! never retries and never caches template state — every call round-trips.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub(crate) mod protocol;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use db::{DatabaseConnector, DatabaseHandle};
#[cfg(feature = "postgres")]
pub use db::{PgConnector, PgHandle};
pub use error::{ClientError, ConfigError, PopulateError, Result, TransportError};
pub use models::{ConnectionConfig, DatabaseInfo, TemplateDatabase, TestDatabase};
pub use transport::{HttpTransport, RawResponse, Transport};
