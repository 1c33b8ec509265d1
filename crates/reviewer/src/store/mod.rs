use std::sync::Arc;

use megascan_view::window::{self, Pagination, DEFAULT_SKIP_STEP};
use megascan_view::{FilterState, Fragment, FragmentId, PageLimit, PageType, Status, Verdict};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiError, FetchQuery, FragmentPage, FragmentSource};
use crate::config::ReviewerConfig;

pub mod driver;

/// Загрузка не удалась; состояние стора осталось прежним.
#[derive(Debug, Error)]
#[error("fetch {page_type} ({filter}) offset={offset} failed: {source}")]
pub struct FetchFailed {
    pub page_type: PageType,
    pub filter: FilterState,
    pub offset: u64,
    #[source]
    pub source: ApiError,
}

/// Выданный запрос на перезагрузку. Применяется только самый свежий.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadTicket {
    seq: u64,
    query: FetchQuery,
}

impl ReloadTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &FetchQuery {
        &self.query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Applied { fragments: usize, total_count: u64 },
    /// Ответ устарел: после него был выдан более новый запрос.
    Stale { seq: u64, latest: u64 },
}

/// Состояние экрана ревью: фильтр, текущая страница фрагментов и пагинация.
///
/// Все мутации идут через именованные операции; загрузка двухфазная
/// (`begin_reload` / `complete_reload`), чтобы цикл событий мог держать
/// несколько запросов в полёте и применять только последний.
pub struct FragmentStore {
    source: Arc<dyn FragmentSource>,
    page_type: PageType,
    filter: FilterState,
    fragments: Vec<Fragment>,
    pagination: Pagination,
    skip_step: usize,
    issued: u64,
    // фильтр и страница, которым соответствует текущий `fragments`
    shown_filter: FilterState,
    shown_page: usize,
}

impl FragmentStore {
    pub fn new(source: Arc<dyn FragmentSource>, page_type: PageType) -> Self {
        Self {
            source,
            page_type,
            filter: FilterState::default(),
            fragments: Vec::new(),
            pagination: Pagination::default(),
            skip_step: DEFAULT_SKIP_STEP,
            issued: 0,
            shown_filter: FilterState::default(),
            shown_page: 0,
        }
    }

    pub fn from_config(source: Arc<dyn FragmentSource>, cfg: &ReviewerConfig) -> Self {
        Self::new(source, cfg.page_type)
            .with_filter(cfg.filter())
            .with_window_radius(cfg.window_radius)
            .with_skip_step(cfg.skip_step)
    }

    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.filter = filter;
        self.shown_filter = filter;
        self
    }

    pub fn with_window_radius(mut self, radius: usize) -> Self {
        self.pagination.set_radius(radius);
        self
    }

    pub fn with_skip_step(mut self, step: usize) -> Self {
        self.skip_step = step;
        self
    }

    pub fn source(&self) -> Arc<dyn FragmentSource> {
        self.source.clone()
    }

    pub fn page_type(&self) -> PageType {
        self.page_type
    }

    pub fn filter(&self) -> FilterState {
        self.filter
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Номер последнего выданного запроса (0, если ещё ничего не грузили).
    pub fn latest_seq(&self) -> u64 {
        self.issued
    }

    // --- синхронные переходы (без загрузки) ---

    /// Сменить фильтр и встать на страницу 0. Список заменится следующей загрузкой.
    pub fn select_filter(&mut self, status: Status, limit: PageLimit) {
        self.filter = FilterState::new(status, limit);
        self.pagination.reset();
    }

    pub fn select_page(&mut self, target: i64) -> usize {
        self.pagination.go_to(target)
    }

    pub fn select_skip_left(&mut self) -> usize {
        let p = &self.pagination;
        let target = window::skip_left(p.current_page, p.max_page, self.skip_step);
        self.pagination.go_to(target as i64)
    }

    pub fn select_skip_right(&mut self) -> usize {
        let p = &self.pagination;
        let target = window::skip_right(p.current_page, p.max_page, self.skip_step);
        self.pagination.go_to(target as i64)
    }

    // --- загрузка ---

    pub fn begin_reload(&mut self) -> ReloadTicket {
        self.issued += 1;
        let offset = self.pagination.current_page as u64 * u64::from(self.filter.limit.get());
        let query = FetchQuery {
            page_type: self.page_type,
            filter: self.filter,
            offset,
        };
        debug!(seq = self.issued, offset, filter = %self.filter, "reload issued");
        ReloadTicket {
            seq: self.issued,
            query,
        }
    }

    /// Применить ответ на запрос `ticket`. Устаревшие ответы (в том числе
    /// ошибки) отбрасываются. Ошибка свежего запроса возвращает фильтр и
    /// страницу к тем, что соответствуют показанному списку.
    pub fn complete_reload(
        &mut self,
        ticket: ReloadTicket,
        result: Result<FragmentPage, ApiError>,
    ) -> Result<ReloadOutcome, FetchFailed> {
        if ticket.seq != self.issued {
            debug!(seq = ticket.seq, latest = self.issued, "stale reload discarded");
            return Ok(ReloadOutcome::Stale {
                seq: ticket.seq,
                latest: self.issued,
            });
        }

        let page = match result {
            Ok(page) => page,
            Err(source) => {
                warn!(seq = ticket.seq, offset = ticket.query.offset, error = %source, "reload failed");
                self.filter = self.shown_filter;
                self.pagination.go_to(self.shown_page as i64);
                return Err(FetchFailed {
                    page_type: ticket.query.page_type,
                    filter: ticket.query.filter,
                    offset: ticket.query.offset,
                    source,
                });
            }
        };

        let n = page.fragments.len();
        self.fragments = page.fragments;
        self.pagination
            .update(page.total_count, ticket.query.limit());
        self.shown_filter = ticket.query.filter;
        self.shown_page = self.pagination.current_page;
        debug!(
            seq = ticket.seq,
            fragments = n,
            total = page.total_count,
            max_page = self.pagination.max_page,
            "reload applied"
        );
        Ok(ReloadOutcome::Applied {
            fragments: n,
            total_count: page.total_count,
        })
    }

    pub async fn reload(&mut self) -> Result<ReloadOutcome, FetchFailed> {
        let ticket = self.begin_reload();
        let result = self.source.fetch(ticket.query()).await;
        self.complete_reload(ticket, result)
    }

    pub async fn set_filter(
        &mut self,
        status: Status,
        limit: PageLimit,
    ) -> Result<ReloadOutcome, FetchFailed> {
        self.select_filter(status, limit);
        self.reload().await
    }

    pub async fn go_to(&mut self, target: i64) -> Result<ReloadOutcome, FetchFailed> {
        self.select_page(target);
        self.reload().await
    }

    pub async fn skip_left(&mut self) -> Result<ReloadOutcome, FetchFailed> {
        self.select_skip_left();
        self.reload().await
    }

    pub async fn skip_right(&mut self) -> Result<ReloadOutcome, FetchFailed> {
        self.select_skip_right();
        self.reload().await
    }

    // --- вердикты ---

    /// Локальный эффект вердикта. Close убирает первый фрагмент с таким id
    /// (порядок остальных сохраняется) и возвращает его; Info/Verify список не меняют.
    pub fn apply_verdict(&mut self, id: &FragmentId, verdict: Verdict) -> Option<Fragment> {
        match verdict {
            Verdict::Close => {
                let pos = self.fragments.iter().position(|f| &f.id == id)?;
                Some(self.fragments.remove(pos))
            }
            Verdict::Info | Verdict::Verify => None,
        }
    }

    pub fn contains(&self, id: &FragmentId) -> bool {
        self.fragments.iter().any(|f| &f.id == id)
    }
}
