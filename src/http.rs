//! Shared HTTP client construction

use crate::config::EndpointConfig;
use crate::error::{Error, Result};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

/// Accept header sent to both upstream APIs
const ACCEPT_VALUE: &str = "application/json, text/plain, */*";

/// Build the client used for every request of a run
///
/// The configured timeout applies uniformly to the market fetch, every
/// thumbnail batch and every image download.
pub fn build_client(endpoints: &EndpointConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));

    reqwest::Client::builder()
        .timeout(endpoints.request_timeout)
        .user_agent(endpoints.user_agent.as_str())
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Config {
            message: format!("failed to create HTTP client: {}", e),
            key: None,
        })
}

/// Send a prepared request and require a success status
///
/// `operation` names the call site in the resulting error.
pub(crate) async fn send_checked(
    request: reqwest::RequestBuilder,
    operation: &str,
) -> Result<reqwest::Response> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::request(operation, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::status(operation, status));
    }
    Ok(response)
}

/// Read a successful response body as JSON
///
/// Body read failures are transport errors; undecodable bodies are protocol
/// errors attributed to `api`.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    api: &'static str,
    operation: &str,
) -> Result<T> {
    let body = response
        .bytes()
        .await
        .map_err(|e| Error::request(operation, e))?;

    serde_json::from_slice(&body).map_err(|e| Error::UpstreamProtocol {
        api,
        message: format!("{operation}: invalid JSON body: {e}"),
    })
}
