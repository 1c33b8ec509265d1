// path: crates/reviewer/tests/helpers.rs
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use megascan_view::Fragment;
use reviewer::{ApiError, FetchQuery, FragmentPage, FragmentSource};
use serde::Deserialize;
use serde_json::{json, Value};

/// Фрагмент вида "line N: password=hunterN" с подсветкой "password".
pub fn mk_fragment(id: i64) -> Fragment {
    let text = format!("line {id}: password=hunter{id}");
    let start = text.find("password").unwrap() as i64;
    Fragment::new(id, text, vec![start, start + "password".len() as i64])
}

pub fn mk_page(ids: std::ops::Range<i64>, total_count: u64) -> FragmentPage {
    FragmentPage {
        fragments: ids.map(mk_fragment).collect(),
        total_count,
    }
}

pub fn ids(fragments: &[Fragment]) -> Vec<String> {
    fragments.iter().map(|f| f.id.to_string()).collect()
}

// --- источник с заранее заданными ответами ---

pub struct ScriptedSource {
    replies: Mutex<VecDeque<Result<FragmentPage, ApiError>>>,
    pub queries: Mutex<Vec<FetchQuery>>,
}

impl ScriptedSource {
    pub fn new(replies: Vec<Result<FragmentPage, ApiError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<FetchQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl FragmentSource for ScriptedSource {
    async fn fetch(&self, query: &FetchQuery) -> Result<FragmentPage, ApiError> {
        self.queries.lock().unwrap().push(*query);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Unavailable("script exhausted".into())))
    }
}

// --- мок HTTP API сканера на axum ---

#[derive(Clone, Default)]
pub struct MockApi {
    pub fragments: Arc<Vec<Value>>,
    pub requests: Arc<Mutex<Vec<String>>>,
    pub marks: Arc<Mutex<Vec<(String, String, String)>>>,
    pub fail_get: Arc<AtomicBool>,
}

#[derive(Deserialize)]
struct PageParams {
    #[serde(default)]
    limit: usize,
    #[serde(default)]
    offset: usize,
}

impl MockApi {
    pub fn with_fragments(n: i64) -> Self {
        let fragments = (0..n)
            .map(|i| serde_json::to_value(mk_fragment(i)).unwrap())
            .collect();
        Self {
            fragments: Arc::new(fragments),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/get/:pagetype/:status", get(get_fragments))
            .route("/api/mark/:pagetype/:id/:status", get(mark))
            .route("/api/info", get(info))
            .with_state(self.clone())
    }

    /// Поднять сервер на свободном порту; возвращает базовый URL.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        format!("http://{addr}")
    }
}

async fn get_fragments(
    State(api): State<MockApi>,
    Path((pagetype, status)): Path<(String, String)>,
    Query(p): Query<PageParams>,
) -> Result<Json<Value>, (StatusCode, String)> {
    api.requests.lock().unwrap().push(format!(
        "{pagetype}/{status}?limit={}&offset={}",
        p.limit, p.offset
    ));
    if api.fail_get.load(Ordering::SeqCst) {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "db is down".into()));
    }
    if pagetype != "github" && pagetype != "gist" {
        return Err((StatusCode::NOT_FOUND, "Not Found".into()));
    }
    // закрытых в моке нет
    let all: &[Value] = if status == "new" { api.fragments.as_slice() } else { &[] };
    let page: Vec<Value> = all.iter().skip(p.offset).take(p.limit).cloned().collect();
    Ok(Json(json!({ "fragments": page, "total_count": all.len() })))
}

async fn mark(
    State(api): State<MockApi>,
    Path((pagetype, id, status)): Path<(String, String, String)>,
) -> (StatusCode, &'static str) {
    if status != "false" && status != "valid" {
        return (StatusCode::NOT_FOUND, "Invalid status");
    }
    api.marks.lock().unwrap().push((pagetype, id, status));
    (StatusCode::OK, "OK")
}

async fn info() -> Json<Value> {
    Json(json!({
        "db_credentials": { "database": "megascan", "name": "scanner", "password": "hunter2" },
        "github": { "tokens": ["ghp_aaaaaaaaaaaa1234"], "langs": ["go", "python"] },
        "globals": { "keywords": ["password", "api_key"] }
    }))
}
