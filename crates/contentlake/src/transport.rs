use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{Error, Result};

/// HTTP method for an encoded request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A fully prepared request, ready for dispatch.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Raw bytes pulled from a remote source during asset ingestion.
#[derive(Clone, Debug)]
pub struct FetchedBytes {
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Call boundary to the HTTP stack.
///
/// Implementations map network-level failures to [`Error::Transport`] and
/// never panic; timeout and cancellation policy lives here, not in the core.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;

    async fn fetch(&self, url: &str) -> Result<FetchedBytes>;
}

/// Default transport backed by reqwest.
#[derive(Clone, Default)]
pub struct HttpTransport {
    inner: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    pub fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let mut builder = self.inner.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|err| Error::transport(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| Error::transport(err.to_string()))?;
        Ok(TransportResponse { status, body })
    }

    async fn fetch(&self, url: &str) -> Result<FetchedBytes> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|err| Error::transport(err.to_string()))?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|err| Error::transport(err.to_string()))?;
        Ok(FetchedBytes {
            status,
            content_type,
            bytes,
        })
    }
}
