//! The pool manager client: template lifecycle and test-database checkout.
//!
//! Every operation performs exactly one exchange through the [`Transport`]
//! and maps the response status through the protocol table. Nothing is
//! retried; races between concurrent callers are resolved by the manager's
//! server-side locking and surfaced here as
//! [`ClientError::TemplateAlreadyInitialized`].

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::ClientConfig;
use crate::db::{DatabaseConnector, DatabaseHandle};
use crate::error::{ClientError, ConfigError, PopulateError, Result};
use crate::models::{TemplateDatabase, TestDatabase};
use crate::protocol::{Operation, classify};
use crate::transport::{HttpTransport, RawResponse, Transport};

/// Request payload for template initialization.
#[derive(Debug, Serialize)]
struct InitializeTemplateRequest<'a> {
    hash: &'a str,
}

/// A decoded response body, or the explicit absence of one.
///
/// `Empty` is produced for the two body-less success codes (202 and 204);
/// everything else decodes into the expected payload shape.
enum ResponseBody<T> {
    Json(T),
    Empty,
}

/// Client for a template-based test database pool manager.
///
/// Construction resolves configuration once into an immutable value; the
/// caller-supplied base URL is never mutated, only extended with the API
/// version and per-operation path segments.
pub struct Client {
    api_base: Url,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client over the default HTTP transport.
    pub fn new(config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        let transport = Arc::new(HttpTransport::new(config.request_timeout)?);
        Self::with_transport(config, transport)
    }

    /// Create a client with configuration resolved from the environment.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> std::result::Result<Self, ConfigError> {
        let mut api_base =
            Url::parse(&config.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: e.to_string(),
            })?;

        {
            let mut segments =
                api_base
                    .path_segments_mut()
                    .map_err(|_| ConfigError::InvalidBaseUrl {
                        url: config.base_url.clone(),
                        reason: "URL cannot be a base".to_string(),
                    })?;
            segments.pop_if_empty().push(&config.api_version);
        }

        Ok(Self {
            api_base,
            transport,
        })
    }

    /// Clear all templates and their pooled clones. Fully destructive; for
    /// use between test suite runs.
    pub async fn reset_all_tracking(&self, cancel: &CancellationToken) -> Result<()> {
        let response = self
            .send(
                cancel,
                Method::DELETE,
                &["admin", "templates"],
                None::<&()>,
            )
            .await?;

        if response.status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(ClientError::ResetFailed {
                message: String::from_utf8_lossy(&response.body).into_owned(),
            })
        }
    }

    /// Request creation of a template under the given hash.
    ///
    /// On success this caller owns the populate-then-finalize sequence for
    /// the returned template database.
    pub async fn initialize_template(
        &self,
        cancel: &CancellationToken,
        hash: &str,
    ) -> Result<TemplateDatabase> {
        let payload = InitializeTemplateRequest { hash };

        match self
            .execute(
                cancel,
                Operation::InitializeTemplate,
                &["templates"],
                Some(&payload),
            )
            .await?
        {
            ResponseBody::Json(template) => Ok(template),
            ResponseBody::Empty => Err(ClientError::Codec {
                reason: "expected a template payload, got an empty body".to_string(),
            }),
        }
    }

    /// Mark the template as populated and ready for cloning.
    pub async fn finalize_template(&self, cancel: &CancellationToken, hash: &str) -> Result<()> {
        self.execute::<_, ()>(
            cancel,
            Operation::FinalizeTemplate,
            &["templates", hash],
            None::<&()>,
        )
        .await
        .map(|_| ())
    }

    /// Tear down a template, e.g. because population failed.
    pub async fn discard_template(&self, cancel: &CancellationToken, hash: &str) -> Result<()> {
        self.execute::<_, ()>(
            cancel,
            Operation::DiscardTemplate,
            &["templates", hash],
            None::<&()>,
        )
        .await
        .map(|_| ())
    }

    /// Initialize, populate, and finalize a template exactly once across
    /// any number of concurrent callers sharing the hash.
    ///
    /// The winner of the initialize race runs `populate` against the
    /// template's connection string and then finalizes; every other caller
    /// observes [`ClientError::TemplateAlreadyInitialized`] and returns
    /// success without running `populate`. If `populate` fails, its error
    /// is returned and the template is left unfinalized — discard it or
    /// rely on manager-side cleanup.
    pub async fn setup_template<F, Fut>(
        &self,
        cancel: &CancellationToken,
        hash: &str,
        populate: F,
    ) -> Result<()>
    where
        F: FnOnce(String) -> Fut + Send,
        Fut: Future<Output = std::result::Result<(), PopulateError>> + Send,
    {
        match self.initialize_template(cancel, hash).await {
            Ok(template) => {
                populate(template.connection_string())
                    .await
                    .map_err(ClientError::Populate)?;

                self.finalize_template(cancel, hash).await
            }
            Err(ClientError::TemplateAlreadyInitialized) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// [`setup_template`](Self::setup_template) over a live database
    /// handle instead of a bare connection string.
    ///
    /// Opens a handle via the connector, probes it with a ping before
    /// running `populate`, and closes it exactly once on every exit path:
    /// probe failure, populate failure, finalize failure, or success.
    pub async fn setup_template_with_db_client<C, F>(
        &self,
        cancel: &CancellationToken,
        hash: &str,
        connector: &C,
        populate: F,
    ) -> Result<()>
    where
        C: DatabaseConnector,
        F: for<'a> FnOnce(
                &'a mut C::Handle,
            ) -> BoxFuture<'a, std::result::Result<(), PopulateError>>
            + Send,
    {
        let template = match self.initialize_template(cancel, hash).await {
            Ok(template) => template,
            Err(ClientError::TemplateAlreadyInitialized) => return Ok(()),
            Err(e) => return Err(e),
        };

        let mut handle = connector.connect(&template.connection_string()).await?;

        let outcome = async {
            handle.ping().await?;

            populate(&mut handle).await.map_err(ClientError::Populate)?;

            self.finalize_template(cancel, hash).await
        }
        .await;

        let closed = handle.close().await;
        outcome?;
        closed
    }

    /// Check out a disposable clone of a finalized template.
    pub async fn get_test_database(
        &self,
        cancel: &CancellationToken,
        hash: &str,
    ) -> Result<TestDatabase> {
        match self
            .execute(
                cancel,
                Operation::GetTestDatabase,
                &["templates", hash, "tests"],
                None::<&()>,
            )
            .await?
        {
            ResponseBody::Json(test) => Ok(test),
            ResponseBody::Empty => Err(ClientError::Codec {
                reason: "expected a test database payload, got an empty body".to_string(),
            }),
        }
    }

    /// Release a previously checked-out clone back to the pool.
    pub async fn return_test_database(
        &self,
        cancel: &CancellationToken,
        hash: &str,
        id: u64,
    ) -> Result<()> {
        self.execute::<_, ()>(
            cancel,
            Operation::ReturnTestDatabase,
            &["templates", hash, "tests", &id.to_string()],
            None::<&()>,
        )
        .await
        .map(|_| ())
    }

    /// One exchange: classify the status for the operation, then decode the
    /// body unless the status is a body-less success code.
    async fn execute<B: Serialize, T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        op: Operation,
        segments: &[&str],
        payload: Option<&B>,
    ) -> Result<ResponseBody<T>> {
        let response = self.send(cancel, op.method(), segments, payload).await?;

        classify(op, response.status)?;

        if response.status == StatusCode::ACCEPTED || response.status == StatusCode::NO_CONTENT {
            return Ok(ResponseBody::Empty);
        }

        Ok(ResponseBody::Json(serde_json::from_slice(&response.body)?))
    }

    /// Serialize the payload (if any) and perform the raw exchange.
    async fn send<B: Serialize>(
        &self,
        cancel: &CancellationToken,
        method: Method,
        segments: &[&str],
        payload: Option<&B>,
    ) -> Result<RawResponse> {
        let url = self.endpoint_url(segments);

        let body = match payload {
            Some(payload) => Some(Bytes::from(serde_json::to_vec(payload)?)),
            None => None,
        };

        tracing::debug!("{} {} -> pool manager", method, url);

        let response = self.transport.execute(cancel, method, url, body).await?;

        tracing::debug!("pool manager responded with {}", response.status);

        Ok(response)
    }

    /// Join operation path segments onto the versioned API base.
    fn endpoint_url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        // The base was validated at construction; extending segments on a
        // base URL cannot fail.
        url.path_segments_mut()
            .expect("API base URL validated at construction")
            .extend(segments);
        url
    }
}
