use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{json, Value};

use crate::transport::Method;

/// Safe upper bound for an encoded GET URL before AUTO falls back to POST.
/// Kept well under common proxy limits.
pub const DEFAULT_URL_THRESHOLD: usize = 2000;

// Form-style encode set; keeps the characters the query endpoint accepts raw.
const QUERY_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'(')
    .remove(b')')
    .remove(b'*');

/// Transport method selection for a query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueryMethod {
    /// GET unless the encoded URL exceeds the length threshold.
    #[default]
    Auto,
    Get,
    Post,
}

/// A GROQ query plus bound variables, explain flag, and method choice.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryRequest {
    pub query: String,
    pub params: BTreeMap<String, Value>,
    pub explain: bool,
    pub method: QueryMethod,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_explain(mut self) -> Self {
        self.explain = true;
        self
    }

    pub fn with_method(mut self, method: QueryMethod) -> Self {
        self.method = method;
        self
    }
}

/// A query encoded for dispatch. GET carries everything in the URL; POST
/// moves the query and params into a JSON body.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedQuery {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

/// Decide the transport method for an AUTO query from the encoded GET length.
pub fn select_method(encoded_len: usize, threshold: usize) -> Method {
    if encoded_len <= threshold {
        Method::Get
    } else {
        Method::Post
    }
}

/// Encode a query against a resolved endpoint URL. Pure; dispatch is the
/// transport collaborator's job.
pub fn encode(request: &QueryRequest, base_url: &str, threshold: usize) -> EncodedQuery {
    let get_url = encode_get_url(request, base_url);
    let method = match request.method {
        QueryMethod::Get => Method::Get,
        QueryMethod::Post => Method::Post,
        QueryMethod::Auto => select_method(get_url.len(), threshold),
    };
    match method {
        Method::Get => EncodedQuery {
            method,
            url: get_url,
            body: None,
        },
        Method::Post => EncodedQuery {
            method,
            url: post_url(request, base_url),
            body: Some(json!({
                "query": request.query,
                "params": Value::Object(request.params.clone().into_iter().collect()),
            })),
        },
    }
}

fn encode_get_url(request: &QueryRequest, base_url: &str) -> String {
    let mut pairs = vec![("query".to_string(), request.query.clone())];
    for (name, value) in &request.params {
        // Variables travel as $name=<JSON-encoded value>.
        pairs.push((format!("${name}"), value.to_string()));
    }
    if request.explain {
        pairs.push(("explain".to_string(), "true".to_string()));
    }
    format!("{base_url}?{}", encode_pairs(&pairs))
}

// The explain flag stays in the URL for both methods.
fn post_url(request: &QueryRequest, base_url: &str) -> String {
    if request.explain {
        format!("{base_url}?explain=true")
    } else {
        base_url.to_string()
    }
}

pub(crate) fn encode_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(name, QUERY_ENCODE),
                utf8_percent_encode(value, QUERY_ENCODE)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
