// path: crates/reviewer/src/store/driver.rs
use std::sync::Arc;

use megascan_view::{Fragment, FragmentId, PageLimit, Status, Verdict};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{FetchFailed, FragmentStore, ReloadOutcome, ReloadTicket};
use crate::api::{ApiError, FragmentPage, VerdictSink};

/// Завершение одной загрузки, пришедшее из фоновой задачи.
#[derive(Debug)]
pub struct Completion {
    pub ticket: ReloadTicket,
    pub result: Result<FragmentPage, ApiError>,
}

/// Итог вердикта: что убрано локально и ушло ли что-то на сервер.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictReport {
    pub removed: Option<Fragment>,
    pub persisted: bool,
}

/// Цикл событий поверх стора: загрузки уходят в tokio-задачи, ответы
/// возвращаются через канал и применяются в одном месте, в порядке прихода.
/// Порядок прихода не важен: стор сам отбрасывает устаревшие ответы.
pub struct StoreDriver {
    store: FragmentStore,
    sink: Option<Arc<dyn VerdictSink>>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl StoreDriver {
    pub fn new(store: FragmentStore) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store,
            sink: None,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn VerdictSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn store(&self) -> &FragmentStore {
        &self.store
    }

    pub fn into_store(self) -> FragmentStore {
        self.store
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Выдать новую загрузку в фоне. Возвращает её номер.
    pub fn request_reload(&mut self) -> u64 {
        let ticket = self.store.begin_reload();
        let seq = ticket.seq();
        let source = self.store.source();
        let tx = self.tx.clone();
        self.in_flight += 1;

        let query = *ticket.query();
        tokio::spawn(async move {
            // сам fetch в отдельной задаче: паника в источнике должна
            // превратиться в ошибку этого тикета, а не потерять ответ
            let fetch = tokio::spawn(async move { source.fetch(&query).await });
            let result = match fetch.await {
                Ok(result) => result,
                Err(e) => {
                    warn!(seq = ticket.seq(), error = %e, "fetch task died");
                    Err(ApiError::Task(e))
                }
            };
            // получатель живёт, пока жив драйвер
            let _ = tx.send(Completion { ticket, result });
        });
        seq
    }

    pub fn request_page(&mut self, target: i64) -> u64 {
        self.store.select_page(target);
        self.request_reload()
    }

    pub fn request_skip_left(&mut self) -> u64 {
        self.store.select_skip_left();
        self.request_reload()
    }

    pub fn request_skip_right(&mut self) -> u64 {
        self.store.select_skip_right();
        self.request_reload()
    }

    pub fn request_filter(&mut self, status: Status, limit: PageLimit) -> u64 {
        self.store.select_filter(status, limit);
        self.request_reload()
    }

    /// Дождаться следующего ответа и применить его. `None`, если в полёте ничего нет.
    pub async fn next_completion(&mut self) -> Option<Result<ReloadOutcome, FetchFailed>> {
        if self.in_flight == 0 {
            return None;
        }
        let done = self.rx.recv().await?;
        self.in_flight -= 1;
        Some(self.store.complete_reload(done.ticket, done.result))
    }

    /// Дождаться всех загрузок. Возвращает итог самой свежей (остальные устарели).
    pub async fn settle(&mut self) -> Option<Result<ReloadOutcome, FetchFailed>> {
        let mut latest = None;
        while let Some(res) = self.next_completion().await {
            match res {
                Ok(ReloadOutcome::Stale { .. }) => {}
                other => latest = Some(other),
            }
        }
        latest
    }

    /// Вердикт: сначала на сервер (если есть sink и у вердикта есть маршрут),
    /// потом локально. При ошибке сервера локальный список не трогаем.
    pub async fn verdict(
        &mut self,
        id: &FragmentId,
        verdict: Verdict,
    ) -> Result<VerdictReport, ApiError> {
        let persisted = match &self.sink {
            Some(sink) => sink.mark(self.store.page_type(), id, verdict).await?,
            None => false,
        };
        let removed = self.store.apply_verdict(id, verdict);
        debug!(%id, %verdict, persisted, removed = removed.is_some(), "verdict applied");
        if verdict == Verdict::Close && removed.is_none() {
            info!(%id, "closed fragment is not on the current page");
        }
        Ok(VerdictReport { removed, persisted })
    }
}
