use std::time::Duration;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Status and body of a completed HTTP exchange. Non-2xx statuses are not
/// errors at this level; each caller maps them to its own domain errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, DomainError> {
        serde_json::from_str(&self.body)
            .map_err(|e| DomainError::serialization(format!("Failed to parse response: {}", e)))
    }
}

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn get(&self, url: &str, headers: Vec<(&str, &str)>) -> Result<HttpResponse, DomainError>;

    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, DomainError>;

    async fn delete(&self, url: &str, headers: Vec<(&str, &str)>)
        -> Result<HttpResponse, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// `None` leaves requests without a client-side deadline
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, DomainError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        mut request: reqwest::RequestBuilder,
        headers: Vec<(&str, &str)>,
    ) -> Result<HttpResponse, DomainError> {
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        Ok(HttpResponse { status, body })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn transport_error(err: reqwest::Error) -> DomainError {
    if err.is_timeout() {
        DomainError::transport(format!("Request timed out: {}", err))
    } else if err.is_connect() {
        DomainError::transport(format!("Cannot connect: {}", err))
    } else {
        DomainError::transport(format!("Request failed: {}", err))
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn get(&self, url: &str, headers: Vec<(&str, &str)>) -> Result<HttpResponse, DomainError> {
        self.send(self.client.get(url), headers).await
    }

    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, DomainError> {
        self.send(self.client.post(url).json(body), headers).await
    }

    async fn delete(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<HttpResponse, DomainError> {
        self.send(self.client.delete(url), headers).await
    }
}
