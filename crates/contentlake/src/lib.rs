//! Rust client SDK for the Content Lake document API.
//!
//! Builds correctly shaped GROQ query, mutation, and asset-upload requests,
//! normalizes responses into a uniform result shape, and leaves transport,
//! retries, and timeouts to an injected [`Transport`] collaborator.
//!
//! The client is stateless beyond its immutable [`ClientConfig`]; calls on a
//! shared client may run concurrently without coordination.

pub mod asset;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod mutate;
pub mod observe;
pub mod query;
pub mod response;
pub mod transport;

pub use crate::asset::{AssetSource, AssetUpload, PreparedAsset};
pub use crate::client::Client;
pub use crate::config::{ClientConfig, EndpointKind, DEFAULT_API_VERSION};
pub use crate::error::{Error, Result};
pub use crate::history::{RevisionOptions, TransactionLogOptions};
pub use crate::mutate::{MutationBatch, MutationCall, Transaction, Visibility};
pub use crate::observe::{NullObserver, Observer, Operation, RequestEvent, ResponseEvent};
pub use crate::query::{EncodedQuery, QueryMethod, QueryRequest, DEFAULT_URL_THRESHOLD};
pub use crate::response::{ApiError, ApiErrorKind, ApiResult};
pub use crate::transport::{
    FetchedBytes, HttpTransport, Method, Transport, TransportRequest, TransportResponse,
};
