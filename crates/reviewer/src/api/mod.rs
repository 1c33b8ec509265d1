use async_trait::async_trait;
use megascan_view::{FilterState, Fragment, FragmentId, PageType, Verdict};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod http;
pub mod settings;

pub use settings::Settings;

/// Параметры одного запроса за страницей фрагментов.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchQuery {
    pub page_type: PageType,
    pub filter: FilterState,
    pub offset: u64,
}

impl FetchQuery {
    pub fn limit(&self) -> u32 {
        self.filter.limit.get()
    }
}

/// Ответ `/api/get/...`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentPage {
    #[serde(default)]
    pub fragments: Vec<Fragment>,
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid api url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api base url cannot carry a path: {0}")]
    BaseUrl(String),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}: {body}")]
    Status { url: String, status: u16, body: String },
    #[error("bad response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    /// Для нестандартных источников (моки, локальные реплеи).
    #[error("source unavailable: {0}")]
    Unavailable(String),
    /// Задача загрузки упала (паника в источнике) или была отменена.
    #[error("fetch task died: {0}")]
    Task(#[source] tokio::task::JoinError),
}

/// Поставщик страниц фрагментов (в проде это HTTP API).
#[async_trait]
pub trait FragmentSource: Send + Sync {
    async fn fetch(&self, query: &FetchQuery) -> Result<FragmentPage, ApiError>;
}

/// Удалённая фиксация вердикта.
///
/// `Ok(false)` значит, что у вердикта нет удалённого представления и
/// ничего не отправлялось.
#[async_trait]
pub trait VerdictSink: Send + Sync {
    async fn mark(
        &self,
        page_type: PageType,
        id: &FragmentId,
        verdict: Verdict,
    ) -> Result<bool, ApiError>;
}

#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn settings(&self) -> Result<Settings, ApiError>;
}

/// Статус в маршруте `/api/mark/...`; Info бэкенд не принимает.
pub fn remote_status(verdict: Verdict) -> Option<&'static str> {
    match verdict {
        Verdict::Info => None,
        Verdict::Close => Some("false"),
        Verdict::Verify => Some("valid"),
    }
}
