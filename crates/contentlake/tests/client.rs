use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use contentlake::{
    ApiErrorKind, AssetUpload, Client, ClientConfig, Error, FetchedBytes, Method, MutationBatch,
    Observer, Operation, QueryRequest, RequestEvent, ResponseEvent, Result, Transaction,
    Transport, TransportRequest, TransportResponse, Visibility,
};
use serde_json::{json, Value};

#[derive(Default)]
struct FakeTransport {
    requests: Mutex<Vec<TransportRequest>>,
    responses: Mutex<VecDeque<Result<TransportResponse>>>,
    fetched: Mutex<Option<FetchedBytes>>,
}

impl FakeTransport {
    fn respond_json(value: Value) -> Self {
        Self::respond_with(200, &value.to_string())
    }

    fn respond_with(status: u16, body: &str) -> Self {
        let transport = Self::default();
        transport
            .responses
            .lock()
            .unwrap()
            .push_back(Ok(TransportResponse {
                status,
                body: Bytes::from(body.to_string()),
            }));
        transport
    }

    fn fail_with(error: Error) -> Self {
        let transport = Self::default();
        transport.responses.lock().unwrap().push_back(Err(error));
        transport
    }

    fn with_fetched(self, fetched: FetchedBytes) -> Self {
        *self.fetched.lock().unwrap() = Some(fetched);
        self
    }

    fn take_requests(&self) -> Vec<TransportRequest> {
        std::mem::take(&mut self.requests.lock().unwrap())
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport("no queued response")))
    }

    async fn fetch(&self, _url: &str) -> Result<FetchedBytes> {
        self.fetched
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::transport("no queued fetch"))
    }
}

fn client_with(transport: Arc<FakeTransport>) -> Client {
    let config = ClientConfig::new("zp7mbokg", "production").with_token("t0ps3cret");
    Client::with_transport(config, transport).unwrap()
}

#[tokio::test]
async fn query_get_hits_the_cdn_with_encoded_variables() {
    let transport = Arc::new(FakeTransport::respond_json(json!({"result": 3})));
    let client = client_with(transport.clone());

    let request = QueryRequest::new("count(*[_type=='post'])")
        .with_param("language", "es")
        .with_param("t", 4);
    let result = client.query(&request).await.unwrap();

    assert!(result.is_ok());
    assert_eq!(result.data(), Some(&json!({"result": 3})));

    let sent = transport.take_requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::Get);
    assert_eq!(
        sent[0].url,
        "https://zp7mbokg.apicdn.contentlake.dev/v2023-05-03/data/query/production\
         ?query=count(*%5B_type%3D%3D%27post%27%5D)&%24language=%22es%22&%24t=4"
    );
    assert!(sent[0]
        .headers
        .contains(&("Authorization".to_string(), "Bearer t0ps3cret".to_string())));
    assert!(sent[0].body.is_none());
}

#[tokio::test]
async fn long_queries_fall_back_to_post() {
    let transport = Arc::new(FakeTransport::respond_json(json!({"result": []})));
    let client = client_with(transport.clone()).with_url_threshold(80);

    let request = QueryRequest::new("*[_type=='post' && title match $needle]")
        .with_param("needle", "abc");
    client.query(&request).await.unwrap();

    let sent = transport.take_requests();
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(
        sent[0].url,
        "https://zp7mbokg.apicdn.contentlake.dev/v2023-05-03/data/query/production"
    );
    let body: Value = serde_json::from_slice(sent[0].body.as_ref().unwrap()).unwrap();
    assert_eq!(body["query"], "*[_type=='post' && title match $needle]");
    assert_eq!(body["params"], json!({"needle": "abc"}));
    assert!(sent[0]
        .headers
        .contains(&("Content-Type".to_string(), "application/json".to_string())));
}

#[tokio::test]
async fn mutate_posts_the_envelope_with_call_options() {
    let transport = Arc::new(FakeTransport::respond_json(json!({"transactionId": "tx1"})));
    let client = client_with(transport.clone());

    let batch = MutationBatch::new()
        .with_transactions(vec![
            Transaction::Create(json!({"_type": "post", "title": "first"})),
            Transaction::Delete {
                id: "post-old".to_string(),
            },
        ])
        .with_return_ids(true)
        .with_visibility(Visibility::Deferred);
    let result = client.mutate(&batch).await.unwrap();
    assert!(result.is_ok());

    let sent = transport.take_requests();
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(
        sent[0].url,
        "https://zp7mbokg.api.contentlake.dev/v2023-05-03/data/mutate/production\
         ?returnIds=true&returnDocuments=false&visibility=deferred&dryRun=false"
    );
    let body: Value = serde_json::from_slice(sent[0].body.as_ref().unwrap()).unwrap();
    assert_eq!(
        body,
        json!({"mutations": [
            {"create": {"_type": "post", "title": "first"}},
            {"delete": {"id": "post-old"}},
        ]})
    );
}

#[tokio::test]
async fn mutate_without_a_token_fails_before_dispatch() {
    let transport = Arc::new(FakeTransport::default());
    let config = ClientConfig::new("zp7mbokg", "production");
    let client = Client::with_transport(config, transport.clone()).unwrap();

    let err = client.mutate(&MutationBatch::new()).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(transport.take_requests().is_empty());
}

#[tokio::test]
async fn invalid_transactions_never_reach_the_network() {
    let transport = Arc::new(FakeTransport::default());
    let client = client_with(transport.clone());

    let batch = MutationBatch::new().with_transactions(vec![
        Transaction::Create(json!({"_type": "post"})),
        Transaction::Patch {
            id: "post-1".to_string(),
            ops: json!({}),
        },
    ]);
    let err = client.mutate(&batch).await.unwrap_err();
    assert!(matches!(err, Error::InvalidTransaction { index: 1, .. }));
    assert!(transport.take_requests().is_empty());
}

#[tokio::test]
async fn asset_upload_from_a_local_file_posts_raw_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logo.png");
    tokio::fs::write(&path, b"png bytes").await.unwrap();

    let transport = Arc::new(FakeTransport::respond_json(
        json!({"_id": "image-abc", "url": "https://cdn/image-abc.png"}),
    ));
    let client = client_with(transport.clone());

    let result = client.upload_asset(&AssetUpload::from_path(&path)).await.unwrap();
    assert_eq!(result.data().unwrap()["_id"], "image-abc");

    let sent = transport.take_requests();
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(
        sent[0].url,
        "https://zp7mbokg.api.contentlake.dev/v2023-05-03/assets/images/production"
    );
    assert!(sent[0]
        .headers
        .contains(&("Content-Type".to_string(), "image/png".to_string())));
    assert_eq!(sent[0].body.as_ref().unwrap().as_ref(), b"png bytes");
}

#[tokio::test]
async fn asset_upload_from_a_url_fetches_through_the_transport() {
    let transport = Arc::new(
        FakeTransport::respond_json(json!({"_id": "image-remote"})).with_fetched(FetchedBytes {
            status: 200,
            content_type: Some("image/jpeg".to_string()),
            bytes: Bytes::from_static(b"jpeg bytes"),
        }),
    );
    let client = client_with(transport.clone());

    let upload = AssetUpload::from_url("https://elsewhere.example.com/photo.jpg");
    let result = client.upload_asset(&upload).await.unwrap();
    assert!(result.is_ok());

    let sent = transport.take_requests();
    assert!(sent[0]
        .headers
        .contains(&("Content-Type".to_string(), "image/jpeg".to_string())));
    assert_eq!(sent[0].body.as_ref().unwrap().as_ref(), b"jpeg bytes");
}

#[tokio::test]
async fn unknown_extension_fails_without_dispatch() {
    let transport = Arc::new(FakeTransport::default());
    let client = client_with(transport.clone());

    let err = client
        .upload_asset(&AssetUpload::from_path("/tmp/mystery.qqq"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MimeTypeUnknown(_)));
    assert!(transport.take_requests().is_empty());
}

#[tokio::test]
async fn transport_failures_are_classified_not_raised() {
    let transport = Arc::new(FakeTransport::fail_with(Error::transport(
        "connection refused",
    )));
    let client = client_with(transport);

    let result = client.query(&QueryRequest::new("*")).await.unwrap();
    assert!(!result.is_ok());
    let err = result.error().unwrap();
    assert_eq!(err.kind, ApiErrorKind::Transport);
    assert_eq!(err.status, None);
    assert!(err.message.contains("connection refused"));
}

#[tokio::test]
async fn error_statuses_land_in_the_result() {
    let transport = Arc::new(FakeTransport::respond_with(
        401,
        r#"{"error": "Unauthorized"}"#,
    ));
    let client = client_with(transport);

    let result = client.query(&QueryRequest::new("*")).await.unwrap();
    let err = result.error().unwrap();
    assert_eq!(err.kind, ApiErrorKind::ClientRequest);
    assert_eq!(err.status, Some(401));
    assert_eq!(err.message, "Unauthorized");
}

#[tokio::test]
async fn get_document_targets_the_doc_endpoint() {
    let transport = Arc::new(FakeTransport::respond_json(
        json!({"documents": [{"_id": "post-1"}]}),
    ));
    let client = client_with(transport.clone());

    client.get_document("post-1").await.unwrap();
    let sent = transport.take_requests();
    assert_eq!(sent[0].method, Method::Get);
    assert_eq!(
        sent[0].url,
        "https://zp7mbokg.api.contentlake.dev/v2023-05-03/data/doc/production/post-1"
    );
}

#[tokio::test]
async fn document_transactions_parse_ndjson_in_order() {
    let body = "{\"id\": \"tx1\"}\n{\"id\": \"tx2\"}\n";
    let transport = Arc::new(FakeTransport::respond_with(200, body));
    let client = client_with(transport.clone());

    let ids = vec!["post-1".to_string(), "post-2".to_string()];
    let result = client
        .document_transactions(&ids, &Default::default())
        .await
        .unwrap();
    assert_eq!(result.data(), Some(&json!([{"id": "tx1"}, {"id": "tx2"}])));

    let sent = transport.take_requests();
    assert_eq!(
        sent[0].url,
        "https://zp7mbokg.api.contentlake.dev/v2023-05-03/data/history/production\
         /transactions/post-1,post-2?excludeContent=true&limit=100"
    );
}

#[derive(Default)]
struct RecordingObserver {
    requests: Mutex<Vec<(Operation, Method, usize)>>,
    responses: Mutex<Vec<(Operation, Option<u16>, bool)>>,
}

impl Observer for RecordingObserver {
    fn request_built(&self, event: &RequestEvent) {
        self.requests
            .lock()
            .unwrap()
            .push((event.operation, event.method, event.body_len));
    }

    fn response_classified(&self, event: &ResponseEvent) {
        self.responses
            .lock()
            .unwrap()
            .push((event.operation, event.status, event.ok));
    }
}

#[tokio::test]
async fn observer_sees_both_sides_of_a_call() {
    let transport = Arc::new(FakeTransport::respond_json(json!({"result": 1})));
    let observer = Arc::new(RecordingObserver::default());
    let client = client_with(transport).with_observer(observer.clone());

    client.query(&QueryRequest::new("count(*)")).await.unwrap();

    let requests = observer.requests.lock().unwrap().clone();
    assert_eq!(requests, vec![(Operation::Query, Method::Get, 0)]);
    let responses = observer.responses.lock().unwrap().clone();
    assert_eq!(responses, vec![(Operation::Query, Some(200), true)]);
}
