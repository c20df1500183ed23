//! Document history: single-revision lookup and the transaction log.
//!
//! The transaction log endpoint answers in NDJSON, one transaction per line.

use crate::client::Client;
use crate::config::EndpointKind;
use crate::error::{Error, Result};
use crate::observe::Operation;
use crate::query::encode_pairs;
use crate::response::{self, ApiResult};
use crate::transport::{Method, TransportRequest};

/// Options for fetching one historical revision of a document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RevisionOptions {
    pub revision: Option<String>,
    /// RFC 3339 instant, e.g. `2019-05-28T17:18:39Z`.
    pub time: Option<String>,
}

impl RevisionOptions {
    pub fn at_revision(revision: impl Into<String>) -> Self {
        Self {
            revision: Some(revision.into()),
            ..Self::default()
        }
    }

    pub fn at_time(time: impl Into<String>) -> Self {
        Self {
            time: Some(time.into()),
            ..Self::default()
        }
    }
}

/// Options for listing the transaction log of one or more documents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionLogOptions {
    pub exclude_content: bool,
    pub from_time: Option<String>,
    pub to_time: Option<String>,
    pub from_transaction: Option<String>,
    pub to_transaction: Option<String>,
    pub authors: Vec<String>,
    pub reverse: bool,
    pub limit: u32,
}

impl Default for TransactionLogOptions {
    fn default() -> Self {
        Self {
            exclude_content: true,
            from_time: None,
            to_time: None,
            from_transaction: None,
            to_transaction: None,
            authors: Vec::new(),
            reverse: false,
            limit: 100,
        }
    }
}

impl TransactionLogOptions {
    // Unset options are dropped from the URL rather than sent empty.
    fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if self.exclude_content {
            pairs.push(("excludeContent".to_string(), "true".to_string()));
        }
        if let Some(from_time) = &self.from_time {
            pairs.push(("fromTime".to_string(), from_time.clone()));
        }
        if let Some(to_time) = &self.to_time {
            pairs.push(("toTime".to_string(), to_time.clone()));
        }
        if let Some(from_transaction) = &self.from_transaction {
            pairs.push(("fromTransaction".to_string(), from_transaction.clone()));
        }
        if let Some(to_transaction) = &self.to_transaction {
            pairs.push(("toTransaction".to_string(), to_transaction.clone()));
        }
        if !self.authors.is_empty() {
            pairs.push(("authors".to_string(), self.authors.join(",")));
        }
        if self.reverse {
            pairs.push(("reverse".to_string(), "true".to_string()));
        }
        pairs.push(("limit".to_string(), self.limit.to_string()));
        pairs
    }
}

impl Client {
    /// Fetch a document as of a revision or instant.
    pub async fn document_revision(
        &self,
        id: &str,
        options: &RevisionOptions,
    ) -> Result<ApiResult> {
        if id.is_empty() {
            return Err(Error::config("document id must not be empty"));
        }
        let base = self.config().endpoint(EndpointKind::History)?;
        let mut pairs = Vec::new();
        if let Some(revision) = &options.revision {
            pairs.push(("revision".to_string(), revision.clone()));
        }
        if let Some(time) = &options.time {
            pairs.push(("time".to_string(), time.clone()));
        }
        let mut url = format!("{base}/documents/{id}");
        if !pairs.is_empty() {
            url = format!("{url}?{}", encode_pairs(&pairs));
        }

        let request = TransportRequest {
            method: Method::Get,
            url,
            headers: self.base_headers(),
            body: None,
        };
        self.dispatch(Operation::History, request, response::normalize)
            .await
    }

    /// List the transaction log for a set of documents. The response is
    /// NDJSON, one transaction per line, normalized into a JSON array.
    pub async fn document_transactions(
        &self,
        ids: &[String],
        options: &TransactionLogOptions,
    ) -> Result<ApiResult> {
        if ids.is_empty() {
            return Err(Error::config("at least one document id is required"));
        }
        let base = self.config().endpoint(EndpointKind::History)?;
        let url = format!(
            "{base}/transactions/{}?{}",
            ids.join(","),
            encode_pairs(&options.query_pairs())
        );

        let request = TransportRequest {
            method: Method::Get,
            url,
            headers: self.base_headers(),
            body: None,
        };
        self.dispatch(Operation::History, request, response::normalize_ndjson)
            .await
    }
}
