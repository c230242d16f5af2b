//! The HTTP seam between the archive client and the network.
//!
//! [`RetryingClient`](crate::RetryingClient) only needs a status code and a body back from
//! a GET request; everything else (retry classification, JSON decoding) happens above
//! this layer. Production code uses [`ReqwestTransport`]; tests script their own.

use crate::archive::error::BoxError;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;

/// Query parameters for one archive request, in the order they are sent.
pub type QueryParams = Vec<(&'static str, String)>;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues a single GET request.
///
/// An `Err` means no HTTP response was obtained at all (timeout, DNS failure, refused
/// connection). Error statuses are returned as `Ok` so the caller can classify them.
pub trait Transport {
    fn get(
        &self,
        url: &str,
        query: &[(&'static str, String)],
        timeout: Duration,
    ) -> impl Future<Output = Result<RawResponse, BoxError>> + Send;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(&'static str, String)],
        timeout: Duration,
    ) -> Result<RawResponse, BoxError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}
