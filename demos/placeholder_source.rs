//! Example connector for the JSONPlaceholder API
//!
//! ```text
//! cargo run --example placeholder-source -- spec
//! cargo run --example placeholder-source -- check --config config.json
//! cargo run --example placeholder-source -- discover --config config.json
//! cargo run --example placeholder-source -- read --config config.json --catalog catalog.json
//! ```
//!
//! `config.json` may be empty (`{}`); `base_url` overrides the API host.

use async_trait::async_trait;
use serde_json::json;
use siphon_cdk::auth::AuthConfig;
use siphon_cdk::decode::{JsonDecoder, RecordDecoder};
use siphon_cdk::http::{HttpClient, HttpClientConfig, HttpResponse, RateLimiterConfig};
use siphon_cdk::pagination::{NoPaginator, PageNumberPaginator, PageToken, Paginator};
use siphon_cdk::schema::{SchemaLoader, StaticSchemaLoader};
use siphon_cdk::source::{Source, StreamRegistry};
use siphon_cdk::stream::{
    parent_slices, HttpStream, IncrementalStream, ReadRequest, RecordStream, RequestContext,
    SliceRequest, SliceStream, Stream,
};
use siphon_cdk::types::{JsonObject, JsonValue};
use siphon_cdk::{cli, ConnectionStatus, ConnectorSpec, Result, SyncLogger};
use std::collections::HashMap;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Shared pieces of every stream
#[derive(Clone)]
struct Api {
    client: HttpClient,
    base_url: String,
    schemas: Arc<StaticSchemaLoader>,
}

impl Api {
    fn from_config(config: &JsonValue) -> Self {
        let base_url = config
            .get("base_url")
            .and_then(JsonValue::as_str)
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string();
        let auth = config
            .get("token")
            .and_then(JsonValue::as_str)
            .map_or(AuthConfig::None, AuthConfig::token);
        let client = HttpClient::with_auth(
            HttpClientConfig::builder()
                .rate_limit(RateLimiterConfig::new(5, 5))
                .build(),
            auth,
        );

        let schemas = StaticSchemaLoader::new()
            .with_schema(
                "posts",
                json!({
                    "type": "object",
                    "properties": {
                        "id": {"type": "integer"},
                        "userId": {"type": "integer"},
                        "title": {"type": "string"},
                        "body": {"type": "string"}
                    }
                }),
            )
            .with_schema(
                "users",
                json!({
                    "type": "object",
                    "properties": {
                        "id": {"type": "integer"},
                        "name": {"type": "string"},
                        "email": {"type": "string"}
                    }
                }),
            );

        Self {
            client,
            base_url,
            schemas: Arc::new(schemas),
        }
    }
}

/// Posts, paged 20 at a time, resumable on `id`
struct Posts {
    api: Api,
    paginator: PageNumberPaginator,
}

impl Posts {
    fn new(api: Api) -> Self {
        Self {
            api,
            paginator: PageNumberPaginator::new("_page", 1).with_page_size("_limit", 20),
        }
    }
}

impl Stream for Posts {
    fn name(&self) -> &str {
        "posts"
    }

    fn json_schema(&self) -> Result<JsonValue> {
        self.api.schemas.load(self.name())
    }

    fn primary_key(&self) -> Vec<Vec<String>> {
        vec![vec!["id".to_string()]]
    }

    fn read_records(&self, request: ReadRequest) -> RecordStream<'_> {
        self.read_pages(request.stream_state, request.slice)
    }

    fn as_incremental(&self) -> Option<&dyn IncrementalStream> {
        Some(self)
    }
}

impl IncrementalStream for Posts {
    fn cursor_field(&self) -> &str {
        "id"
    }

    fn state_checkpoint_interval(&self) -> Option<u64> {
        Some(20)
    }
}

impl HttpStream for Posts {
    fn client(&self) -> &HttpClient {
        &self.api.client
    }

    fn url_base(&self) -> &str {
        &self.api.base_url
    }

    fn path(&self, _ctx: RequestContext<'_>) -> String {
        "posts".to_string()
    }

    fn request_params(&self, ctx: RequestContext<'_>) -> HashMap<String, String> {
        let mut params = ctx
            .page_token
            .map_or_else(|| self.paginator.initial_params(), |t| t.query_params.clone());
        if let Some(last_id) = ctx.stream_state.get("id").and_then(JsonValue::as_u64) {
            params.insert("id_gte".to_string(), (last_id + 1).to_string());
        }
        params
    }

    fn parse_response(
        &self,
        response: &HttpResponse,
        _ctx: RequestContext<'_>,
    ) -> Result<Vec<JsonObject>> {
        JsonDecoder::new().decode(response.body())
    }

    fn next_page_token(&self, response: &HttpResponse) -> Result<Option<PageToken>> {
        self.paginator.next_page(response)
    }
}

/// Comments, one request per post
struct Comments {
    api: Api,
    posts: Posts,
}

impl Stream for Comments {
    fn name(&self) -> &str {
        "comments"
    }

    fn primary_key(&self) -> Vec<Vec<String>> {
        vec![vec!["id".to_string()]]
    }

    fn stream_slices(&self, request: SliceRequest) -> SliceStream<'_> {
        parent_slices(&self.posts, "id", "post_id", request.logger)
    }

    fn read_records(&self, request: ReadRequest) -> RecordStream<'_> {
        self.read_pages(request.stream_state, request.slice)
    }
}

impl HttpStream for Comments {
    fn client(&self) -> &HttpClient {
        &self.api.client
    }

    fn url_base(&self) -> &str {
        &self.api.base_url
    }

    fn path(&self, ctx: RequestContext<'_>) -> String {
        let post_id = ctx.slice.get("post_id").map(JsonValue::to_string).unwrap_or_default();
        format!("posts/{post_id}/comments")
    }

    fn parse_response(
        &self,
        response: &HttpResponse,
        _ctx: RequestContext<'_>,
    ) -> Result<Vec<JsonObject>> {
        JsonDecoder::new().decode(response.body())
    }

    fn next_page_token(&self, response: &HttpResponse) -> Result<Option<PageToken>> {
        NoPaginator.next_page(response)
    }
}

/// Users, a single unpaged request
struct Users {
    api: Api,
}

impl Stream for Users {
    fn name(&self) -> &str {
        "users"
    }

    fn json_schema(&self) -> Result<JsonValue> {
        self.api.schemas.load(self.name())
    }

    fn primary_key(&self) -> Vec<Vec<String>> {
        vec![vec!["id".to_string()]]
    }

    fn read_records(&self, request: ReadRequest) -> RecordStream<'_> {
        self.read_pages(request.stream_state, request.slice)
    }
}

impl HttpStream for Users {
    fn client(&self) -> &HttpClient {
        &self.api.client
    }

    fn url_base(&self) -> &str {
        &self.api.base_url
    }

    fn path(&self, _ctx: RequestContext<'_>) -> String {
        "users".to_string()
    }

    fn parse_response(
        &self,
        response: &HttpResponse,
        _ctx: RequestContext<'_>,
    ) -> Result<Vec<JsonObject>> {
        JsonDecoder::new().decode(response.body())
    }

    fn next_page_token(&self, _response: &HttpResponse) -> Result<Option<PageToken>> {
        Ok(None)
    }
}

struct PlaceholderSource;

#[async_trait]
impl Source for PlaceholderSource {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn spec(&self) -> ConnectorSpec {
        ConnectorSpec {
            documentation_url: Some("https://jsonplaceholder.typicode.com/guide/".to_string()),
            connection_specification: json!({
                "type": "object",
                "properties": {
                    "base_url": {"type": "string", "default": DEFAULT_BASE_URL},
                    "token": {"type": "string"}
                }
            }),
            supports_incremental: true,
        }
    }

    async fn check_connection(
        &self,
        logger: &SyncLogger,
        config: &JsonValue,
    ) -> Result<ConnectionStatus> {
        let api = Api::from_config(config);
        let response = api
            .client
            .get(&format!("{}/users?_limit=1", api.base_url.trim_end_matches('/')))
            .await?;
        logger.debug(format!("Connection check returned {}", response.status()));
        Ok(ConnectionStatus::succeeded())
    }

    fn streams(&self, config: &JsonValue) -> Result<StreamRegistry> {
        let api = Api::from_config(config);
        StreamRegistry::new()
            .with_stream(Posts::new(api.clone()))?
            .with_stream(Comments {
                api: api.clone(),
                posts: Posts::new(api.clone()),
            })?
            .with_stream(Users { api })
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = cli::launch(PlaceholderSource).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
