//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: source → HTTP streams → RECORD/STATE messages

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use pretty_assertions::assert_eq;
use serde_json::json;
use siphon_cdk::auth::AuthConfig;
use siphon_cdk::catalog::{ConfiguredCatalog, ConfiguredStream};
use siphon_cdk::decode::{JsonDecoder, RecordDecoder};
use siphon_cdk::http::{HttpClient, HttpClientConfig, HttpResponse};
use siphon_cdk::pagination::{CursorPaginator, PageToken, Paginator};
use siphon_cdk::protocol::{ConnectionStatus, ConnectorSpec, Message, Status};
use siphon_cdk::slicing::{DatetimeFormat, DatetimeSlicer, Slicer, StreamSlice};
use siphon_cdk::source::{Source, StreamRegistry};
use siphon_cdk::state::ConnectorState;
use siphon_cdk::stream::{
    parent_slices, HttpStream, IncrementalStream, ReadRequest, RecordStream, RequestContext,
    SliceRequest, SliceStream, Stream,
};
use siphon_cdk::types::{BackoffType, JsonObject, JsonValue, SyncMode};
use siphon_cdk::{engine, Error, Result, SyncLogger};
use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// A chat-workspace source: channels, per-channel messages, dated events
// ============================================================================

fn client(token: &str) -> HttpClient {
    HttpClient::with_auth(
        HttpClientConfig::builder()
            .backoff(
                BackoffType::Constant,
                Duration::from_millis(5),
                Duration::from_millis(5),
            )
            .no_rate_limit()
            .build(),
        AuthConfig::token(token),
    )
}

struct Channels {
    client: HttpClient,
    base: String,
    paginator: CursorPaginator,
}

impl Channels {
    fn new(client: HttpClient, base: &str) -> Self {
        Self {
            client,
            base: base.to_string(),
            paginator: CursorPaginator::new("cursor", "response_metadata.next_cursor"),
        }
    }
}

impl Stream for Channels {
    fn name(&self) -> &str {
        "channels"
    }

    fn primary_key(&self) -> Vec<Vec<String>> {
        vec![vec!["id".to_string()]]
    }

    fn read_records(&self, request: ReadRequest) -> RecordStream<'_> {
        self.read_pages(request.stream_state, request.slice)
    }
}

impl HttpStream for Channels {
    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn url_base(&self) -> &str {
        &self.base
    }

    fn path(&self, _ctx: RequestContext<'_>) -> String {
        "conversations.list".to_string()
    }

    fn parse_response(
        &self,
        response: &HttpResponse,
        _ctx: RequestContext<'_>,
    ) -> Result<Vec<JsonObject>> {
        JsonDecoder::with_path("channels").decode(response.body())
    }

    fn next_page_token(&self, response: &HttpResponse) -> Result<Option<PageToken>> {
        self.paginator.next_page(response)
    }
}

struct Messages {
    client: HttpClient,
    base: String,
    channels: Channels,
    cursor: String,
}

impl Messages {
    fn new(client: HttpClient, base: &str, cursor: &str) -> Self {
        Self {
            channels: Channels::new(client.clone(), base),
            client,
            base: base.to_string(),
            cursor: cursor.to_string(),
        }
    }
}

impl Stream for Messages {
    fn name(&self) -> &str {
        "messages"
    }

    fn stream_slices(&self, request: SliceRequest) -> SliceStream<'_> {
        parent_slices(&self.channels, "id", "channel", request.logger)
    }

    fn read_records(&self, request: ReadRequest) -> RecordStream<'_> {
        self.read_pages(request.stream_state, request.slice)
    }

    fn as_incremental(&self) -> Option<&dyn IncrementalStream> {
        Some(self)
    }
}

impl IncrementalStream for Messages {
    fn cursor_field(&self) -> &str {
        &self.cursor
    }

    fn state_checkpoint_interval(&self) -> Option<u64> {
        Some(2)
    }
}

impl HttpStream for Messages {
    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn url_base(&self) -> &str {
        &self.base
    }

    fn path(&self, _ctx: RequestContext<'_>) -> String {
        "conversations.history".to_string()
    }

    fn request_params(&self, ctx: RequestContext<'_>) -> HashMap<String, String> {
        let mut params = HashMap::new();
        if let Some(channel) = ctx.slice.get_str("channel") {
            params.insert("channel".to_string(), channel.to_string());
        }
        if let Some(oldest) = ctx.stream_state.get("ts") {
            params.insert("oldest".to_string(), oldest.to_string());
        }
        params
    }

    fn parse_response(
        &self,
        response: &HttpResponse,
        ctx: RequestContext<'_>,
    ) -> Result<Vec<JsonObject>> {
        let mut records = JsonDecoder::with_path("messages").decode(response.body())?;
        for record in &mut records {
            if let Some(channel) = ctx.slice.get("channel") {
                record.insert("channel".to_string(), channel.clone());
            }
        }
        Ok(records)
    }

    fn next_page_token(&self, _response: &HttpResponse) -> Result<Option<PageToken>> {
        Ok(None)
    }
}

struct Events {
    client: HttpClient,
    base: String,
    slicer: DatetimeSlicer,
}

impl Stream for Events {
    fn name(&self) -> &str {
        "events"
    }

    fn stream_slices(&self, request: SliceRequest) -> SliceStream<'_> {
        match self.slicer.slices(&request.stream_state) {
            Ok(slices) => stream::iter(slices.map(Ok)).boxed(),
            Err(e) => stream::once(async move { Err(e) }).boxed(),
        }
    }

    fn read_records(&self, request: ReadRequest) -> RecordStream<'_> {
        self.read_pages(request.stream_state, request.slice)
    }

    fn as_incremental(&self) -> Option<&dyn IncrementalStream> {
        Some(self)
    }
}

impl IncrementalStream for Events {
    fn cursor_field(&self) -> &str {
        "created"
    }
}

impl HttpStream for Events {
    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn url_base(&self) -> &str {
        &self.base
    }

    fn path(&self, _ctx: RequestContext<'_>) -> String {
        "events".to_string()
    }

    fn request_params(&self, ctx: RequestContext<'_>) -> HashMap<String, String> {
        ["start", "end"]
            .into_iter()
            .filter_map(|key| Some((key.to_string(), ctx.slice.get(key)?.to_string())))
            .collect()
    }

    fn parse_response(
        &self,
        response: &HttpResponse,
        _ctx: RequestContext<'_>,
    ) -> Result<Vec<JsonObject>> {
        JsonDecoder::with_path("events").decode(response.body())
    }

    fn next_page_token(&self, _response: &HttpResponse) -> Result<Option<PageToken>> {
        Ok(None)
    }
}

struct Workspace {
    base: String,
}

impl Workspace {
    fn token(config: &JsonValue) -> Result<&str> {
        config
            .get("token")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::missing_field("token"))
    }
}

#[async_trait]
impl Source for Workspace {
    fn name(&self) -> &str {
        "workspace"
    }

    fn spec(&self) -> ConnectorSpec {
        ConnectorSpec {
            documentation_url: None,
            connection_specification: json!({
                "type": "object",
                "required": ["token", "start_date"],
                "properties": {
                    "token": {"type": "string"},
                    "start_date": {"type": "string", "format": "date-time"}
                }
            }),
            supports_incremental: true,
        }
    }

    async fn check_connection(
        &self,
        _logger: &SyncLogger,
        config: &JsonValue,
    ) -> Result<ConnectionStatus> {
        let response = client(Self::token(config)?)
            .get(&format!("{}/auth.test", self.base))
            .await?;
        let body: JsonValue = response.json()?;
        if body["ok"].as_bool() == Some(true) {
            Ok(ConnectionStatus::succeeded())
        } else {
            Ok(ConnectionStatus::failed(
                body["error"].as_str().unwrap_or("unknown error"),
            ))
        }
    }

    fn streams(&self, config: &JsonValue) -> Result<StreamRegistry> {
        let client = client(Self::token(config)?);
        let start = config
            .get("start_date")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::missing_field("start_date"))?;
        let slicer = DatetimeSlicer::from_strings(start, "1d")?
            .with_end(siphon_cdk::slicing::parse_datetime("2024-01-04T00:00:00Z")?)
            .with_cursor_field("created")
            .with_format(DatetimeFormat::EpochSeconds);

        StreamRegistry::new()
            .with_stream(Channels::new(client.clone(), &self.base))?
            .with_stream(Messages::new(client.clone(), &self.base, "ts"))?
            .with_stream(Events {
                client,
                base: self.base.clone(),
                slicer,
            })
    }
}

fn config() -> JsonValue {
    json!({"token": "xoxb-test", "start_date": "2024-01-01T00:00:00Z"})
}

fn select(catalog: &siphon_cdk::Catalog, name: &str, mode: SyncMode) -> ConfiguredStream {
    ConfiguredStream::new(catalog.get(name).unwrap().clone(), mode)
}

async fn read_all(
    registry: &StreamRegistry,
    catalog: &ConfiguredCatalog,
    seed: &ConnectorState,
) -> Vec<Message> {
    engine::read(registry, SyncLogger::new("workspace"), catalog, seed)
        .unwrap()
        .try_collect()
        .await
        .unwrap()
}

/// `R:<stream>:<id>` for records, `S:<messages ts>` for checkpoints
fn describe(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .map(|message| match message {
            Message::Record { record } => format!("R:{}:{}", record.stream, record.data["id"]),
            Message::State { state } => format!("S:{}", state.data.stream_state("messages")["ts"]),
            other => panic!("unexpected message {other:?}"),
        })
        .collect()
}

async fn mount_channels(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/conversations.list"))
        .and(header("Authorization", "Bearer xoxb-test"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "channels": [{"id": "C1", "name": "general"}],
            "response_metadata": {"next_cursor": "page2"}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/conversations.list"))
        .and(query_param("cursor", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "channels": [{"id": "C2", "name": "random"}],
            "response_metadata": {"next_cursor": ""}
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Check / discover
// ============================================================================

#[tokio::test]
async fn test_check_connection_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth.test"))
        .and(header("Authorization", "Bearer xoxb-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let source = Workspace { base: server.uri() };
    let status = source.check(&SyncLogger::new("workspace"), &config()).await;

    assert_eq!(status, ConnectionStatus::succeeded());
}

#[tokio::test]
async fn test_check_connection_reports_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth.test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ok": false, "error": "invalid_auth"})),
        )
        .mount(&server)
        .await;

    let source = Workspace { base: server.uri() };
    let status = source.check(&SyncLogger::new("workspace"), &config()).await;

    assert_eq!(status, ConnectionStatus::failed("invalid_auth"));
}

#[tokio::test]
async fn test_check_connection_reports_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth.test"))
        .respond_with(ResponseTemplate::new(401).set_body_string("not_authed"))
        .expect(1)
        .mount(&server)
        .await;

    let source = Workspace { base: server.uri() };
    let status = source.check(&SyncLogger::new("workspace"), &config()).await;

    assert_eq!(status.status, Status::Failed);
    assert_eq!(status.message.as_deref(), Some("HTTP 401: not_authed"));
}

#[test]
fn test_discover_catalog() {
    let source = Workspace {
        base: "http://localhost:1".to_string(),
    };

    let catalog = source.discover(&config()).unwrap();

    let names: Vec<&str> = catalog.streams.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["channels", "messages", "events"]);
    assert!(!catalog.get("channels").unwrap().supports(SyncMode::Incremental));
    assert_eq!(
        catalog.get("messages").unwrap().default_cursor_field,
        vec!["ts".to_string()]
    );

    let configured = ConfiguredCatalog::from_catalog(&catalog, SyncMode::Incremental);
    assert_eq!(configured.stream_names(), vec!["channels", "messages", "events"]);
    assert_eq!(configured.streams[0].sync_mode, SyncMode::FullRefresh);
    assert_eq!(
        configured.incremental_only().stream_names(),
        vec!["messages", "events"]
    );
}

// ============================================================================
// Read
// ============================================================================

#[tokio::test]
async fn test_sync_and_resume() {
    let server = MockServer::start().await;
    mount_channels(&server).await;
    Mock::given(method("GET"))
        .and(path("/conversations.history"))
        .and(query_param("channel", "C1"))
        .and(query_param_is_missing("oldest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{"id": "m1", "ts": 1}, {"id": "m2", "ts": 2}, {"id": "m3", "ts": 3}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/conversations.history"))
        .and(query_param("channel", "C2"))
        .and(query_param("oldest", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{"id": "m4", "ts": 4}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/conversations.history"))
        .and(query_param("oldest", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": []})))
        .expect(2)
        .mount(&server)
        .await;

    let source = Workspace { base: server.uri() };
    let registry = source.streams(&config()).unwrap();
    let catalog = source.discover(&config()).unwrap();
    let configured = ConfiguredCatalog {
        streams: vec![
            select(&catalog, "channels", SyncMode::FullRefresh),
            select(&catalog, "messages", SyncMode::Incremental),
        ],
    };

    // each slice is read with the state checkpointed so far
    let first = read_all(&registry, &configured, &ConnectorState::new()).await;
    assert_eq!(
        describe(&first),
        vec![
            "R:channels:\"C1\"",
            "R:channels:\"C2\"",
            "R:messages:\"m1\"",
            "R:messages:\"m2\"",
            "S:2",
            "R:messages:\"m3\"",
            "S:3",
            "R:messages:\"m4\"",
            "S:4",
        ]
    );
    let record = first[2].as_record().unwrap();
    assert_eq!(record.data["channel"], "C1");

    let checkpoint = first.last().and_then(Message::as_state).unwrap().clone();
    let second = read_all(&registry, &configured, &checkpoint).await;
    assert_eq!(
        describe(&second),
        vec!["R:channels:\"C1\"", "R:channels:\"C2\"", "S:4", "S:4"]
    );
}

#[tokio::test]
async fn test_date_windows_resume_from_state() {
    let server = MockServer::start().await;
    let windows = [
        (1_704_067_200, 1_704_153_600, "e1", 1_704_100_000),
        (1_704_153_600, 1_704_240_000, "e2", 1_704_200_000),
        (1_704_240_000, 1_704_326_400, "e3", 1_704_300_000),
    ];
    for (start, end, id, created) in windows {
        Mock::given(method("GET"))
            .and(path("/events"))
            .and(query_param("start", start.to_string()))
            .and(query_param("end", end.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "events": [{"id": id, "created": created}]
            })))
            .mount(&server)
            .await;
    }

    let source = Workspace { base: server.uri() };
    let registry = source.streams(&config()).unwrap();
    let catalog = source.discover(&config()).unwrap();
    let configured = ConfiguredCatalog {
        streams: vec![select(&catalog, "events", SyncMode::Incremental)],
    };

    let first = read_all(&registry, &configured, &ConnectorState::new()).await;
    let kinds: Vec<bool> = first.iter().map(Message::is_record).collect();
    assert_eq!(kinds, vec![true, false, true, false, true, false]);
    let last = first.last().and_then(Message::as_state).unwrap();
    assert_eq!(last.stream_state("events"), json!({"created": 1_704_300_000}));

    let mut seed = ConnectorState::new();
    seed.set("events", json!({"created": 1_704_153_600}));
    let second = read_all(&registry, &configured, &seed).await;
    let ids: Vec<&JsonValue> = second
        .iter()
        .filter_map(Message::as_record)
        .map(|r| &r.data["id"])
        .collect();
    assert_eq!(ids, vec![&json!("e2"), &json!("e3")]);
}

#[tokio::test]
async fn test_rate_limited_page_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations.list"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_channels(&server).await;

    let source = Workspace { base: server.uri() };
    let registry = source.streams(&config()).unwrap();
    let catalog = source.discover(&config()).unwrap();
    let configured = ConfiguredCatalog {
        streams: vec![select(&catalog, "channels", SyncMode::FullRefresh)],
    };

    let messages = read_all(&registry, &configured, &ConnectorState::new()).await;

    assert_eq!(
        describe(&messages),
        vec!["R:channels:\"C1\"", "R:channels:\"C2\""]
    );
}

#[tokio::test]
async fn test_fatal_error_aborts_sync() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations.list"))
        .respond_with(ResponseTemplate::new(403).set_body_string("missing_scope"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"events": []})))
        .expect(0)
        .mount(&server)
        .await;

    let source = Workspace { base: server.uri() };
    let registry = source.streams(&config()).unwrap();
    let catalog = source.discover(&config()).unwrap();
    let configured = ConfiguredCatalog {
        streams: vec![
            select(&catalog, "channels", SyncMode::FullRefresh),
            select(&catalog, "events", SyncMode::Incremental),
        ],
    };

    let results: Vec<Result<Message>> =
        engine::read(&registry, SyncLogger::new("workspace"), &configured, &ConnectorState::new())
            .unwrap()
            .collect()
            .await;

    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(Error::HttpStatus { status: 403, .. })));
}

#[tokio::test]
async fn test_missing_cursor_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"channels": []})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client("xoxb-test");
    let registry = StreamRegistry::new()
        .with_stream(Messages::new(client, &server.uri(), ""))
        .unwrap();
    let catalog = registry.get("messages").unwrap().as_catalog_stream().unwrap();
    let configured = ConfiguredCatalog {
        streams: vec![ConfiguredStream::new(catalog, SyncMode::Incremental).with_cursor_field(vec![])],
    };

    let err = engine::read(
        &registry,
        SyncLogger::new("workspace"),
        &configured,
        &ConnectorState::new(),
    )
    .err()
    .unwrap();

    assert!(matches!(err, Error::MissingCursorField { .. }));
}

#[tokio::test]
async fn test_nested_cursor_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let source = Workspace { base: server.uri() };
    let registry = source.streams(&config()).unwrap();
    let catalog = source.discover(&config()).unwrap();
    let configured = ConfiguredCatalog {
        streams: vec![select(&catalog, "messages", SyncMode::Incremental)
            .with_cursor_field(vec!["meta".to_string(), "ts".to_string()])],
    };

    let err = engine::read(
        &registry,
        SyncLogger::new("workspace"),
        &configured,
        &ConnectorState::new(),
    )
    .err()
    .unwrap();

    assert!(matches!(err, Error::NestedFieldPath { .. }));
}

#[tokio::test]
async fn test_messages_serialize_as_json_lines() {
    let server = MockServer::start().await;
    mount_channels(&server).await;

    let source = Workspace { base: server.uri() };
    let registry = source.streams(&config()).unwrap();
    let catalog = source.discover(&config()).unwrap();
    let configured = ConfiguredCatalog {
        streams: vec![select(&catalog, "channels", SyncMode::FullRefresh)],
    };

    let messages = read_all(&registry, &configured, &ConnectorState::new()).await;
    let line = messages[0].to_json_line().unwrap();
    let value: JsonValue = serde_json::from_str(&line).unwrap();

    assert_eq!(value["type"], "RECORD");
    assert_eq!(value["record"]["stream"], "channels");
    assert_eq!(value["record"]["data"], json!({"id": "C1", "name": "general"}));
    assert!(!line.contains('\n'));

    let state = Message::state(ConnectorState::from_json(r#"{"messages": {"ts": 4}}"#).unwrap());
    assert_eq!(
        serde_json::to_value(&state).unwrap(),
        json!({"type": "STATE", "state": {"data": {"messages": {"ts": 4}}}})
    );
}

#[test]
fn test_slice_serializes_as_plain_object() {
    let slice = StreamSlice::new().with_value("channel", "C1");
    assert_eq!(serde_json::to_value(&slice).unwrap(), json!({"channel": "C1"}));
}
