use std::sync::Arc;

use bytes::Bytes;

use crate::asset::{self, AssetUpload};
use crate::config::{ClientConfig, EndpointKind};
use crate::error::{Error, Result};
use crate::mutate::{self, MutationBatch};
use crate::observe::{NullObserver, Observer, Operation, RequestEvent, ResponseEvent};
use crate::query::{self, QueryRequest, DEFAULT_URL_THRESHOLD};
use crate::response::{self, ApiError, ApiResult};
use crate::transport::{HttpTransport, Method, Transport, TransportRequest};

/// Stateless Content Lake API client.
///
/// Holds only the immutable config plus the injected transport and observer;
/// nothing is cached or shared across calls, so a shared client may serve
/// concurrent callers without coordination.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn Observer>,
    url_threshold: usize,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            observer: Arc::new(NullObserver),
            url_threshold: DEFAULT_URL_THRESHOLD,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Override the AUTO GET/POST switchover length.
    pub fn with_url_threshold(mut self, threshold: usize) -> Self {
        self.url_threshold = threshold;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run a GROQ query.
    ///
    /// AUTO requests go out as GET until the encoded URL would exceed the
    /// threshold, then re-encode as POST with the query and params in the
    /// body.
    pub async fn query(&self, request: &QueryRequest) -> Result<ApiResult> {
        let base = self.config.endpoint(EndpointKind::Query)?;
        let encoded = query::encode(request, &base, self.url_threshold);

        let mut headers = self.base_headers();
        let body = encoded.body.as_ref().map(|value| {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
            Bytes::from(value.to_string())
        });
        let request = TransportRequest {
            method: encoded.method,
            url: encoded.url,
            headers,
            body,
        };
        self.dispatch(Operation::Query, request, response::normalize)
            .await
    }

    /// Submit a mutation batch.
    ///
    /// Validation failures surface as [`Error::InvalidTransaction`] before
    /// anything is dispatched; mutations always target the live API host and
    /// require a token.
    pub async fn mutate(&self, batch: &MutationBatch) -> Result<ApiResult> {
        if self.config.token.is_none() {
            return Err(Error::config("mutations require an api token"));
        }
        let call = mutate::build(batch)?;
        let base = self.config.endpoint(EndpointKind::Mutate)?;
        let url = format!("{base}?{}", query::encode_pairs(&call.query_pairs));

        let mut headers = self.base_headers();
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
        let request = TransportRequest {
            method: Method::Post,
            url,
            headers,
            body: Some(Bytes::from(call.body.to_string())),
        };
        self.dispatch(Operation::Mutate, request, response::normalize)
            .await
    }

    /// Upload an asset from a local path or remote URL.
    ///
    /// Returns the asset document descriptor the API creates for the bytes.
    pub async fn upload_asset(&self, upload: &AssetUpload) -> Result<ApiResult> {
        let url = self.config.endpoint(EndpointKind::Asset)?;
        let prepared = asset::prepare(upload, self.transport.as_ref()).await?;

        let mut headers = self.base_headers();
        headers.push(("Content-Type".to_string(), prepared.mime_type));
        let request = TransportRequest {
            method: Method::Post,
            url,
            headers,
            body: Some(prepared.bytes),
        };
        self.dispatch(Operation::Asset, request, response::normalize)
            .await
    }

    /// Fetch a single document by id.
    pub async fn get_document(&self, id: &str) -> Result<ApiResult> {
        if id.is_empty() {
            return Err(Error::config("document id must not be empty"));
        }
        let base = self.config.endpoint(EndpointKind::Doc)?;
        let request = TransportRequest {
            method: Method::Get,
            url: format!("{base}/{id}"),
            headers: self.base_headers(),
            body: None,
        };
        self.dispatch(Operation::Doc, request, response::normalize)
            .await
    }

    pub(crate) fn base_headers(&self) -> Vec<(String, String)> {
        match &self.config.token {
            Some(token) => vec![("Authorization".to_string(), format!("Bearer {token}"))],
            None => Vec::new(),
        }
    }

    pub(crate) async fn dispatch(
        &self,
        operation: Operation,
        request: TransportRequest,
        normalizer: fn(u16, &[u8]) -> ApiResult,
    ) -> Result<ApiResult> {
        self.observer.request_built(&RequestEvent {
            operation,
            method: request.method,
            url: request.url.clone(),
            body_len: request.body.as_ref().map_or(0, Bytes::len),
        });

        let result = match self.transport.send(request).await {
            Ok(response) => normalizer(response.status, &response.body),
            Err(Error::Transport(message)) => ApiResult::Err(ApiError::transport(message)),
            Err(err) => return Err(err),
        };

        self.observer.response_classified(&ResponseEvent {
            operation,
            status: result.status(),
            ok: result.is_ok(),
        });
        Ok(result)
    }
}
