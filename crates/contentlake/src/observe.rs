use crate::transport::Method;

/// Operation families the client reports events for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Query,
    Mutate,
    Asset,
    Doc,
    History,
}

/// A request the client finished building, about to be dispatched.
#[derive(Clone, Debug)]
pub struct RequestEvent {
    pub operation: Operation,
    pub method: Method,
    pub url: String,
    pub body_len: usize,
}

/// A classified response, or a transport failure (no status).
#[derive(Clone, Debug)]
pub struct ResponseEvent {
    pub operation: Operation,
    pub status: Option<u16>,
    pub ok: bool,
}

/// Structured event sink injected into the client.
///
/// Called inline on the request path, so implementations must not block.
/// There is no process-wide default; each client carries its own observer.
pub trait Observer: Send + Sync {
    fn request_built(&self, event: &RequestEvent) {
        let _ = event;
    }

    fn response_classified(&self, event: &ResponseEvent) {
        let _ = event;
    }
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {}
