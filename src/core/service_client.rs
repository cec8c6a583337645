// src/core/service_client.rs
//! Unified HTTP client for the recruiting API - every request goes through the authenticator

use anyhow::{Context, Result};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, trace};

use crate::authenticator::RequestAuthenticator;
use crate::error::ClientError;

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    authenticator: Arc<RequestAuthenticator>,
}

impl ServiceClient {
    /// Create new service client with configuration
    pub fn new(
        base_url: &str,
        timeout_seconds: u64,
        authenticator: Arc<RequestAuthenticator>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            // The verification endpoint answers with a redirect we inspect ourselves
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            authenticator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.client.request(method, self.url(endpoint))
    }

    /// Send a request after the authenticator has seen it
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let request = self.authenticator.authenticate(builder.build()?);
        let method = request.method().clone();
        let url = request.url().to_string();

        trace!("{} {}", method, url);
        let response = self.client.execute(request).await.map_err(|e| {
            error!("{} {} failed: {}", method, url, e);
            ClientError::Transport(e)
        })?;

        debug!("{} {} -> {}", method, url, response.status());
        Ok(response)
    }

    /// Send a request and decode a JSON body, mapping error statuses
    pub async fn send_json<R>(&self, builder: RequestBuilder) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let response = self.execute(builder).await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(serde_json::from_str::<R>(&body)?)
        } else {
            error!("Service returned error status {}: {}", status, body);
            Err(ClientError::from_status(status, &body))
        }
    }

    /// Generic GET request
    pub async fn get<R>(&self, endpoint: &str) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        self.send_json(self.request(Method::GET, endpoint)).await
    }

    /// GET request with query parameters
    pub async fn get_with_query<Q, R>(&self, endpoint: &str, query: &Q) -> Result<R, ClientError>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(self.request(Method::GET, endpoint).query(query))
            .await
    }

    /// Generic POST request with JSON
    pub async fn post_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R, ClientError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(self.request(Method::POST, endpoint).json(payload))
            .await
    }

    /// Generic PUT request with JSON
    pub async fn put_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R, ClientError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(self.request(Method::PUT, endpoint).json(payload))
            .await
    }

    /// Multipart POST to an absolute URL (used for the media host)
    pub async fn post_multipart<R>(&self, url: &str, form: Form) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let builder = self
            .client
            .post(url)
            .header("X-Requested-With", "XMLHttpRequest")
            .multipart(form);
        self.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalStorage, MemoryStorage, TOKEN_KEY};
    use reqwest::header::AUTHORIZATION;

    fn client() -> ServiceClient {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "tok");
        let authenticator = Arc::new(RequestAuthenticator::new(storage, "api.cloudinary.com"));
        ServiceClient::new("http://localhost:8000/api/", 5, authenticator).unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = client();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/me/"), "http://localhost:8000/api/me/");
    }

    #[test]
    fn test_request_builder_targets_endpoint() {
        let client = client();
        let request = client
            .request(Method::GET, "/engineers/")
            .query(&[("page", "2")])
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8000/api/engineers/?page=2"
        );
        // Credentials are only attached at execution time
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let storage = Arc::new(MemoryStorage::new());
        let authenticator = Arc::new(RequestAuthenticator::new(storage, "media.invalid"));
        let client = ServiceClient::new("http://127.0.0.1:9", 2, authenticator).unwrap();

        let result: Result<serde_json::Value, ClientError> = client.get("/me/").await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }
}
