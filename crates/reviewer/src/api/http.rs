use std::time::Duration;

use async_trait::async_trait;
use megascan_view::{FragmentId, PageType, Verdict};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::*;
use crate::config::ReviewerConfig;

// сколько тела ошибки тащить в сообщение
const ERROR_BODY_CHARS: usize = 200;

/// Клиент API сканера поверх reqwest.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(base)?;
        if base.cannot_be_a_base() {
            return Err(ApiError::BaseUrl(base.to_string()));
        }
        let client = Client::builder()
            .user_agent(concat!("megascan/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                url: base.to_string(),
                source,
            })?;
        Ok(Self { client, base })
    }

    pub fn from_config(cfg: &ReviewerConfig) -> Result<Self, ApiError> {
        Self::new(&cfg.api_base, cfg.timeout())
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// base + сегменты пути (каждый экранируется отдельно).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::BaseUrl(self.base.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    pub fn fragments_url(&self, query: &FetchQuery) -> Result<Url, ApiError> {
        let mut url = self.endpoint(&[
            "api",
            "get",
            query.page_type.as_str(),
            query.filter.status.as_str(),
        ])?;
        url.query_pairs_mut()
            .append_pair("limit", &query.limit().to_string())
            .append_pair("offset", &query.offset.to_string());
        Ok(url)
    }

    async fn send(&self, url: &Url) -> Result<Vec<u8>, ApiError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body)
                    .chars()
                    .take(ERROR_BODY_CHARS)
                    .collect(),
            });
        }
        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let body = self.send(&url).await?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl FragmentSource for HttpApi {
    async fn fetch(&self, query: &FetchQuery) -> Result<FragmentPage, ApiError> {
        let url = self.fragments_url(query)?;
        debug!(url = %url, "fetch fragments");
        self.get_json(url).await
    }
}

#[async_trait]
impl VerdictSink for HttpApi {
    async fn mark(
        &self,
        page_type: PageType,
        id: &FragmentId,
        verdict: Verdict,
    ) -> Result<bool, ApiError> {
        let Some(status) = remote_status(verdict) else {
            debug!(%id, %verdict, "verdict has no remote route, skipped");
            return Ok(false);
        };
        let id = id.to_string();
        let url = self.endpoint(&["api", "mark", page_type.as_str(), &id, status])?;
        debug!(url = %url, "mark fragment");
        self.send(&url).await?;
        Ok(true)
    }
}

#[async_trait]
impl SettingsSource for HttpApi {
    async fn settings(&self) -> Result<Settings, ApiError> {
        let url = self.endpoint(&["api", "info"])?;
        self.get_json(url).await
    }
}
