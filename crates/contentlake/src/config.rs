use crate::error::{Error, Result};

/// API version used when none is supplied (format YYYY-MM-DD).
pub const DEFAULT_API_VERSION: &str = "2023-05-03";

/// Immutable connection settings for one [`crate::Client`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub project_id: String,
    pub dataset: String,
    pub token: Option<String>,
    pub use_cdn: bool,
    pub api_version: String,
    /// Overrides the derived host entirely; CDN selection is skipped.
    pub api_host: Option<String>,
}

/// Endpoint families exposed by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointKind {
    Query,
    Doc,
    Mutate,
    Asset,
    History,
}

impl EndpointKind {
    fn path(&self, dataset: &str) -> String {
        match self {
            EndpointKind::Query => format!("/data/query/{dataset}"),
            EndpointKind::Doc => format!("/data/doc/{dataset}"),
            EndpointKind::Mutate => format!("/data/mutate/{dataset}"),
            EndpointKind::Asset => format!("/assets/images/{dataset}"),
            EndpointKind::History => format!("/data/history/{dataset}"),
        }
    }
}

impl ClientConfig {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
            token: None,
            use_cdn: true,
            api_version: DEFAULT_API_VERSION.to_string(),
            api_host: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_use_cdn(mut self, use_cdn: bool) -> Self {
        self.use_cdn = use_cdn;
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = Some(api_host.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_id.is_empty() {
            return Err(Error::config("project_id must not be empty"));
        }
        if self.dataset.is_empty() {
            return Err(Error::config("dataset must not be empty"));
        }
        Ok(())
    }

    /// Resolve the base URL for one endpoint family.
    ///
    /// The CDN host is read-only and stale-tolerant, so it is only ever used
    /// for queries; every other kind targets the live API host.
    pub fn endpoint(&self, kind: EndpointKind) -> Result<String> {
        self.validate()?;
        let host = match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => {
                let subdomain = if self.use_cdn && kind == EndpointKind::Query {
                    "apicdn"
                } else {
                    "api"
                };
                format!(
                    "https://{}.{subdomain}.contentlake.dev/v{}",
                    self.project_id, self.api_version
                )
            }
        };
        Ok(format!("{host}{}", kind.path(&self.dataset)))
    }
}
