//! Shared fixtures for the integration tests: RSA signing keys, a mocked
//! JWKS endpoint and an in-memory todo store.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use todo_backend::config::Config;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use todo_backend::repos::{RepoResult, TodoRow, TodoStore, TodoUpdate};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SIGNING_KID: &str = "test-key-1";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

const SIGNING_PRIVATE_PEM: &str = include_str!("../fixtures/signing_rsa_private.pem");
const SIGNING_PUBLIC_JWK: &str = include_str!("../fixtures/signing_rsa_public.json");
const OTHER_PRIVATE_PEM: &str = include_str!("../fixtures/other_rsa_private.pem");
const OTHER_PUBLIC_JWK: &str = include_str!("../fixtures/other_rsa_public.json");

/// One RSA key pair from `tests/fixtures`, published under `kid`.
pub struct TestKeypair {
    pub kid: String,
    private_pem: &'static str,
    public_components: Value,
}

impl TestKeypair {
    pub fn signing(kid: &str) -> Self {
        Self::from_fixture(kid, SIGNING_PRIVATE_PEM, SIGNING_PUBLIC_JWK)
    }

    pub fn other(kid: &str) -> Self {
        Self::from_fixture(kid, OTHER_PRIVATE_PEM, OTHER_PUBLIC_JWK)
    }

    fn from_fixture(kid: &str, private_pem: &'static str, public_jwk: &str) -> Self {
        Self {
            kid: kid.to_string(),
            private_pem,
            public_components: serde_json::from_str(public_jwk).expect("fixture JWK is JSON"),
        }
    }

    /// RS256 token with this pair's kid in the header.
    pub fn sign(&self, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some("JWT".to_string());
        header.kid = Some(self.kid.clone());
        self.sign_with_header(&header, claims)
    }

    pub fn sign_with_header(&self, header: &Header, claims: &Value) -> String {
        let key = EncodingKey::from_rsa_pem(self.private_pem.as_bytes())
            .expect("fixture PEM is a valid RSA key");
        encode(header, claims, &key).expect("failed to sign token")
    }

    pub fn jwk_json(&self) -> Value {
        json!({
            "kty": "RSA",
            "kid": self.kid,
            "use": "sig",
            "alg": "RS256",
            "n": self.public_components["n"],
            "e": self.public_components["e"],
        })
    }
}

pub fn jwks_body(keys: &[&TestKeypair]) -> Value {
    json!({ "keys": keys.iter().map(|k| k.jwk_json()).collect::<Vec<_>>() })
}

/// Mount a JWKS document on `server`, answering any number of requests.
pub async fn mount_jwks(server: &MockServer, keys: &[&TestKeypair]) {
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body(keys)))
        .mount(server)
        .await;
}

pub fn jwks_url(server: &MockServer) -> url::Url {
    url::Url::parse(&format!("{}{}", server.uri(), JWKS_PATH)).expect("mock server uri")
}

pub fn now() -> i64 {
    Utc::now().timestamp()
}

pub fn valid_claims(sub: &str) -> Value {
    json!({ "sub": sub, "iat": now(), "exp": now() + 3600 })
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Config pointing the authorizer at `jwks_url`, everything else fixed.
pub fn test_config(jwks_url: &url::Url) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("DATABASE_URL", "postgres://unused/todos".to_string()),
        ("JWKS_URL", jwks_url.to_string()),
        ("JWKS_TIMEOUT_SECONDS", "2".to_string()),
        ("ATTACHMENTS_BUCKET", "todo-attachments".to_string()),
        ("AWS_REGION", "eu-west-1".to_string()),
        ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE".to_string()),
        ("AWS_SECRET_ACCESS_KEY", "secret".to_string()),
    ]);

    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config is complete")
}

/// `TodoStore` backed by a map keyed on (user id, todo id).
#[derive(Default)]
pub struct InMemoryTodoStore {
    rows: Mutex<HashMap<(String, Uuid), TodoRow>>,
}

impl InMemoryTodoStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn clear_attachment(&self, user_id: &str, todo_id: Uuid) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.get_mut(&(user_id.to_string(), todo_id)) {
            row.attachment_url = None;
        }
    }

    pub fn attachment_url(&self, user_id: &str, todo_id: Uuid) -> Option<String> {
        let rows = self.rows.lock().unwrap();
        rows.get(&(user_id.to_string(), todo_id))
            .and_then(|r| r.attachment_url.clone())
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn list_by_user(&self, user_id: &str) -> RepoResult<Vec<TodoRow>> {
        let rows = self.rows.lock().unwrap();
        let mut items: Vec<TodoRow> = rows
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn get(&self, user_id: &str, todo_id: Uuid) -> RepoResult<Option<TodoRow>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&(user_id.to_string(), todo_id)).cloned())
    }

    async fn create(&self, row: &TodoRow) -> RepoResult<TodoRow> {
        let mut rows = self.rows.lock().unwrap();
        rows.insert((row.user_id.clone(), row.todo_id), row.clone());
        Ok(row.clone())
    }

    async fn update(
        &self,
        user_id: &str,
        todo_id: Uuid,
        update: &TodoUpdate,
    ) -> RepoResult<Option<TodoRow>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.get_mut(&(user_id.to_string(), todo_id)) else {
            return Ok(None);
        };
        if let Some(name) = &update.name {
            row.name = name.clone();
        }
        if let Some(due_date) = &update.due_date {
            row.due_date = due_date.clone();
        }
        if let Some(done) = update.done {
            row.done = done;
        }
        Ok(Some(row.clone()))
    }

    async fn set_attachment_url(
        &self,
        user_id: &str,
        todo_id: Uuid,
        attachment_url: &str,
    ) -> RepoResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&(user_id.to_string(), todo_id)) {
            Some(row) => {
                row.attachment_url = Some(attachment_url.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, user_id: &str, todo_id: Uuid) -> RepoResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.remove(&(user_id.to_string(), todo_id)).is_some())
    }
}

/// One captured log event: level plus every field rendered as the formatter would.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: Vec<(String, String)>,
}

/// `tracing` layer that records events, for asserting on what gets logged.
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    /// Events at WARN or above.
    pub fn warnings(&self) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level <= Level::WARN)
            .cloned()
            .collect()
    }
}

struct FieldRecorder<'a>(&'a mut Vec<(String, String)>);

impl Visit for FieldRecorder<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Vec::new();
        event.record(&mut FieldRecorder(&mut fields));
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields,
        });
    }
}
