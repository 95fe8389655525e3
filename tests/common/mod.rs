//! In-process Jenkins stand-in for integration tests.
//!
//! Serves the subset of the Jenkins REST API the bridge uses on an ephemeral
//! local port. Requests are logged so tests can assert on the wire traffic.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use jenkins_bridge::JenkinsConfig;

pub const USERNAME: &str = "bot";
pub const TOKEN: &str = "secret";
/// `Basic base64("bot:secret")`
const EXPECTED_AUTH: &str = "Basic Ym90OnNlY3JldA==";
const CRUMB_FIELD: &str = "Jenkins-Crumb";
const CRUMB: &str = "crumb-123";
const SESSION_COOKIE: &str = "JSESSIONID=session-42";
pub const VERSION: &str = "2.440.3";

#[derive(Debug, Clone, Default)]
pub struct FakeJob {
    pub config: String,
    pub last_build: u64,
    pub enabled: bool,
    pub console: String,
    pub last_parameters: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub jobs: BTreeMap<String, FakeJob>,
    /// `"METHOD /path?query"` for every request received
    pub requests: Vec<String>,
    /// Answer 500 to any request carrying a `tree` projection
    pub reject_tree: bool,
    /// Serve a CSRF crumb and require it on POST
    pub require_crumb: bool,
    /// Bind the crumb to the session cookie set by the crumb issuer
    pub require_session: bool,
    next_queue_id: u64,
}

impl FakeState {
    pub fn add_job(&mut self, name: &str, last_build: u64) {
        self.jobs.insert(
            name.to_string(),
            FakeJob {
                config: format!("<project><description>{}</description></project>", name),
                last_build,
                enabled: true,
                console: (1..=30)
                    .map(|i| format!("step {i}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
                ..Default::default()
            },
        );
    }

    pub fn count(&self, needle: &str) -> usize {
        self.requests.iter().filter(|r| r.contains(needle)).count()
    }
}

pub type Shared = Arc<Mutex<FakeState>>;

pub struct FakeJenkinsServer {
    pub url: String,
    pub state: Shared,
    handle: JoinHandle<()>,
}

impl FakeJenkinsServer {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState {
            next_queue_id: 7,
            ..Default::default()
        }));
        {
            let mut guard = state.lock().unwrap();
            guard.add_job("demo", 41);
            guard.add_job("web-app", 3);
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    /// Connection settings pointing at this server.
    pub fn config(&self) -> JenkinsConfig {
        JenkinsConfig {
            url: Some(self.url.clone()),
            username: Some(USERNAME.to_string()),
            token: Some(TOKEN.to_string()),
            timeout: 5,
            connect_timeout: 2,
            read_timeout: 5,
            ..Default::default()
        }
    }

    pub fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }
}

impl Drop for FakeJenkinsServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn query_pairs(uri: &Uri) -> Vec<(String, String)> {
    uri.query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut state = state.lock().unwrap();
    state.requests.push(format!(
        "{} {}{}",
        method,
        uri.path(),
        uri.query().map(|q| format!("?{q}")).unwrap_or_default()
    ));

    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == EXPECTED_AUTH);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    let query = query_pairs(&uri);
    if state.reject_tree && query.iter().any(|(k, _)| k == "tree") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "tree not supported").into_response();
    }
    if method == Method::POST && state.require_crumb {
        let crumb = headers.get(CRUMB_FIELD).and_then(|v| v.to_str().ok());
        if crumb != Some(CRUMB) {
            return (StatusCode::FORBIDDEN, "No valid crumb").into_response();
        }
        let in_session = headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.split(';').any(|c| c.trim() == SESSION_COOKIE));
        if state.require_session && !in_session {
            return (StatusCode::FORBIDDEN, "Crumb does not match session").into_response();
        }
    }

    // /job/a/job/b/rest... -> ("a/b", rest)
    let segments: Vec<&str> = uri.path().split('/').filter(|s| !s.is_empty()).collect();
    let mut names = Vec::new();
    let mut i = 0;
    while i + 1 < segments.len() && segments[i] == "job" {
        names.push(segments[i + 1]);
        i += 2;
    }
    let job = names.join("/");
    let rest = &segments[i..];
    let param = |key: &str| {
        query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    if job.is_empty() {
        return match (method.as_str(), rest) {
            ("GET", ["api", "json"]) => {
                let jobs: Vec<Value> = state
                    .jobs
                    .iter()
                    .filter(|(name, _)| !name.contains('/'))
                    .map(|(name, j)| {
                        json!({
                            "name": name,
                            "url": format!("http://fake/job/{}/", name),
                            "color": if j.enabled { "blue" } else { "disabled" },
                        })
                    })
                    .collect();
                ([("X-Jenkins", VERSION)], Json(json!({ "jobs": jobs }))).into_response()
            }
            ("GET", ["crumbIssuer", "api", "json"]) if state.require_crumb => (
                [("Set-Cookie", format!("{}; Path=/", SESSION_COOKIE))],
                Json(json!({
                    "crumb": CRUMB,
                    "crumbRequestField": CRUMB_FIELD,
                })),
            )
                .into_response(),
            ("GET", ["computer", "api", "json"]) => Json(json!({
                "computer": [
                    {"displayName": "built-in", "offline": false, "numExecutors": 2},
                    {"displayName": "agent-1", "offline": true, "numExecutors": 4,
                     "offlineCauseReason": "maintenance"}
                ]
            }))
            .into_response(),
            ("GET", ["computer", name, "api", "json"]) => Json(json!({
                "displayName": name,
                "offline": false,
                "numExecutors": 2,
            }))
            .into_response(),
            ("GET", ["queue", "api", "json"]) => Json(json!({
                "items": [
                    {"id": 3, "task": {"name": "demo"}, "why": "Waiting for executor",
                     "inQueueSince": 1_700_000_000_000i64, "blocked": false}
                ]
            }))
            .into_response(),
            ("GET", ["me", "api", "json"]) => {
                Json(json!({ "id": USERNAME, "fullName": "Build Bot" })).into_response()
            }
            ("POST", ["createItem"]) => create_item(&mut state, None, param("name"), body),
            _ => not_found(),
        };
    }

    if rest == ["createItem"] && method == Method::POST {
        return create_item(&mut state, Some(&job), param("name"), body);
    }

    let next_queue_id = state.next_queue_id;
    let Some(entry) = state.jobs.get_mut(&job) else {
        return not_found();
    };

    match (method.as_str(), rest) {
        ("GET", ["api", "json"]) => {
            let builds: Vec<Value> = (1..=entry.last_build)
                .rev()
                .map(|n| json!({ "number": n }))
                .collect();
            let last = (entry.last_build > 0).then(|| json!({ "number": entry.last_build }));
            Json(json!({
                "name": job.rsplit('/').next().unwrap_or_default(),
                "fullName": job,
                "buildable": entry.enabled,
                "lastBuild": last,
                "lastCompletedBuild": last,
                "builds": builds,
            }))
            .into_response()
        }
        ("GET", [number, "api", "json"]) => match number.parse::<u64>() {
            Ok(n) if n >= 1 && n <= entry.last_build => Json(json!({
                "number": n,
                "result": "SUCCESS",
                "building": false,
                "duration": 1500,
                "timestamp": 1_700_000_000_000i64 + n as i64,
                "changeSet": {"items": [{"author": {"fullName": "Dev"}, "comment": "fix"}]},
            }))
            .into_response(),
            _ => not_found(),
        },
        ("GET", [_, "consoleText"]) => entry.console.clone().into_response(),
        ("POST", [action @ ("build" | "buildWithParameters")]) => {
            if *action == "buildWithParameters" {
                entry.last_parameters = query.clone();
            }
            entry.last_build += 1;
            state.next_queue_id += 1;
            (
                StatusCode::CREATED,
                [("Location", format!("http://fake/queue/item/{}/", next_queue_id))],
            )
                .into_response()
        }
        ("POST", [_, "stop"]) => StatusCode::OK.into_response(),
        ("GET", ["config.xml"]) => entry.config.clone().into_response(),
        ("POST", ["config.xml"]) => {
            entry.config = body;
            StatusCode::OK.into_response()
        }
        ("POST", ["enable"]) => {
            entry.enabled = true;
            StatusCode::OK.into_response()
        }
        ("POST", ["disable"]) => {
            entry.enabled = false;
            StatusCode::OK.into_response()
        }
        ("POST", ["doDelete"]) => {
            state.jobs.remove(&job);
            StatusCode::OK.into_response()
        }
        ("POST", ["doRename"]) => match param("newName") {
            Some(new_name) => {
                let moved = state.jobs.remove(&job).unwrap_or_default();
                let target = match job.rsplit_once('/') {
                    Some((parent, _)) => format!("{}/{}", parent, new_name),
                    None => new_name,
                };
                state.jobs.insert(target, moved);
                StatusCode::OK.into_response()
            }
            None => (StatusCode::BAD_REQUEST, "newName missing").into_response(),
        },
        _ => not_found(),
    }
}

fn create_item(
    state: &mut FakeState,
    parent: Option<&str>,
    name: Option<String>,
    config: String,
) -> Response {
    let Some(name) = name else {
        return (StatusCode::BAD_REQUEST, "name missing").into_response();
    };
    let full = match parent {
        Some(parent) => format!("{}/{}", parent, name),
        None => name,
    };
    if state.jobs.contains_key(&full) {
        return (StatusCode::BAD_REQUEST, "A job already exists with the name").into_response();
    }
    state.jobs.insert(
        full,
        FakeJob {
            config,
            enabled: true,
            ..Default::default()
        },
    );
    StatusCode::OK.into_response()
}
