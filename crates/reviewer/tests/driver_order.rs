// path: crates/reviewer/tests/driver_order.rs
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use megascan_view::{FragmentId, PageLimit, PageType, Status, Verdict};
use reviewer::{
    ApiError, FetchQuery, FragmentPage, FragmentSource, FragmentStore, ReloadOutcome, StoreDriver,
    VerdictSink,
};
use tokio::sync::{mpsc, oneshot};

mod helpers;
use helpers::{ids, mk_page, ScriptedSource};

type Reply = oneshot::Sender<Result<FragmentPage, ApiError>>;

/// Источник, ответы которого тест отпускает вручную и в любом порядке.
struct GatedSource {
    gates: mpsc::UnboundedSender<(FetchQuery, Reply)>,
}

#[async_trait]
impl FragmentSource for GatedSource {
    async fn fetch(&self, query: &FetchQuery) -> Result<FragmentPage, ApiError> {
        let (tx, rx) = oneshot::channel();
        self.gates.send((*query, tx)).expect("test gone");
        rx.await
            .unwrap_or_else(|_| Err(ApiError::Unavailable("gate dropped".into())))
    }
}

async fn take_gates(
    rx: &mut mpsc::UnboundedReceiver<(FetchQuery, Reply)>,
    n: usize,
) -> Vec<(FetchQuery, Reply)> {
    let mut out = Vec::new();
    for _ in 0..n {
        out.push(rx.recv().await.expect("gate"));
    }
    out
}

#[tokio::test]
async fn first_reload_resolving_last_is_discarded() {
    let (gtx, mut grx) = mpsc::unbounded_channel();
    let store = FragmentStore::new(Arc::new(GatedSource { gates: gtx }), PageType::Github);
    let mut driver = StoreDriver::new(store);

    let s1 = driver.request_reload();
    let s2 = driver.request_filter(Status::Closed, PageLimit::try_from(20).unwrap());
    assert!(s2 > s1);
    assert_eq!(driver.in_flight(), 2);

    // задачи могут стартовать в любом порядке, различаем по фильтру
    let mut gates = take_gates(&mut grx, 2).await;
    gates.sort_by_key(|(q, _)| q.filter.status == Status::Closed);
    let (older, newer) = {
        let newer = gates.pop().unwrap();
        let older = gates.pop().unwrap();
        (older, newer)
    };
    assert_eq!(newer.0.limit(), 20);

    // сначала отвечает второй запрос...
    newer.1.send(Ok(mk_page(500..503, 3))).unwrap();
    let res = driver.next_completion().await.unwrap().unwrap();
    assert!(matches!(res, ReloadOutcome::Applied { fragments: 3, .. }));

    // ...потом первый, и его ответ отбрасывается
    older.1.send(Ok(mk_page(0..10, 1_000))).unwrap();
    let res = driver.next_completion().await.unwrap().unwrap();
    assert!(matches!(res, ReloadOutcome::Stale { .. }));

    assert!(driver.next_completion().await.is_none());
    assert_eq!(ids(driver.store().fragments()), vec!["500", "501", "502"]);
    assert_eq!(driver.store().pagination().max_page, 1);
    assert_eq!(driver.store().filter().status, Status::Closed);
}

#[tokio::test]
async fn settle_reports_latest_outcome_only() {
    let (gtx, mut grx) = mpsc::unbounded_channel();
    let store = FragmentStore::new(Arc::new(GatedSource { gates: gtx }), PageType::Gist);
    let mut driver = StoreDriver::new(store);

    driver.request_reload();
    driver.request_filter(Status::Closed, PageLimit::default());
    let gates = take_gates(&mut grx, 2).await;
    for (q, reply) in gates {
        if q.filter.status == Status::Closed {
            reply.send(Ok(mk_page(7..9, 2))).unwrap();
        } else {
            reply
                .send(Err(ApiError::Unavailable("old request failed".into())))
                .unwrap();
        }
    }

    let latest = driver.settle().await.expect("something was in flight");
    assert_eq!(
        latest.unwrap(),
        ReloadOutcome::Applied {
            fragments: 2,
            total_count: 2
        }
    );
    assert_eq!(driver.in_flight(), 0);
}

#[tokio::test]
async fn driver_navigation_feeds_store() {
    let src = ScriptedSource::new(vec![Ok(mk_page(0..10, 300)), Ok(mk_page(100..110, 300))]);
    let mut driver = StoreDriver::new(FragmentStore::new(src.clone(), PageType::Github));

    driver.request_reload();
    driver.settle().await.unwrap().unwrap();
    driver.request_skip_right();
    driver.settle().await.unwrap().unwrap();

    assert_eq!(driver.store().pagination().current_page, 10);
    assert_eq!(src.queries()[1].offset, 100);
}

#[derive(Default)]
struct RecordingSink {
    marks: Mutex<Vec<(FragmentId, Verdict)>>,
    fail: bool,
}

#[async_trait]
impl VerdictSink for RecordingSink {
    async fn mark(
        &self,
        _page_type: PageType,
        id: &FragmentId,
        verdict: Verdict,
    ) -> Result<bool, ApiError> {
        if self.fail {
            return Err(ApiError::Unavailable("mark failed".into()));
        }
        if verdict == Verdict::Info {
            return Ok(false);
        }
        self.marks.lock().unwrap().push((id.clone(), verdict));
        Ok(true)
    }
}

#[tokio::test]
async fn verdicts_go_through_sink_then_store() {
    let src = ScriptedSource::new(vec![Ok(mk_page(1..6, 5))]);
    let sink = Arc::new(RecordingSink::default());
    let mut driver =
        StoreDriver::new(FragmentStore::new(src, PageType::Github)).with_sink(sink.clone());
    driver.request_reload();
    driver.settle().await.unwrap().unwrap();

    let report = driver.verdict(&FragmentId::Num(3), Verdict::Close).await.unwrap();
    assert!(report.persisted);
    assert_eq!(report.removed.map(|f| f.id), Some(FragmentId::Num(3)));

    let report = driver.verdict(&FragmentId::Num(2), Verdict::Info).await.unwrap();
    assert!(!report.persisted);
    assert!(report.removed.is_none());

    let report = driver.verdict(&FragmentId::Num(4), Verdict::Verify).await.unwrap();
    assert!(report.persisted);
    assert!(report.removed.is_none());

    assert_eq!(ids(driver.store().fragments()), vec!["1", "2", "4", "5"]);
    assert_eq!(
        *sink.marks.lock().unwrap(),
        vec![
            (FragmentId::Num(3), Verdict::Close),
            (FragmentId::Num(4), Verdict::Verify)
        ]
    );
}

#[tokio::test]
async fn failed_mark_keeps_fragment() {
    let src = ScriptedSource::new(vec![Ok(mk_page(1..4, 3))]);
    let sink = Arc::new(RecordingSink {
        fail: true,
        ..RecordingSink::default()
    });
    let mut driver = StoreDriver::new(FragmentStore::new(src, PageType::Github)).with_sink(sink);
    driver.request_reload();
    driver.settle().await.unwrap().unwrap();

    assert!(driver.verdict(&FragmentId::Num(2), Verdict::Close).await.is_err());
    assert!(driver.store().contains(&FragmentId::Num(2)));
}

/// Источник, который падает на запросах к указанному смещению.
struct PanicsAtOffset {
    offset: u64,
    inner: Arc<ScriptedSource>,
}

#[async_trait]
impl FragmentSource for PanicsAtOffset {
    async fn fetch(&self, query: &FetchQuery) -> Result<FragmentPage, ApiError> {
        if query.offset == self.offset {
            panic!("source blew up at offset {}", query.offset);
        }
        self.inner.fetch(query).await
    }
}

#[tokio::test]
async fn panicking_source_fails_the_reload_instead_of_hanging() {
    let src = Arc::new(PanicsAtOffset {
        offset: 30,
        inner: ScriptedSource::new(vec![Ok(mk_page(0..10, 100))]),
    });
    let mut driver = StoreDriver::new(FragmentStore::new(src, PageType::Github));
    driver.request_reload();
    driver.settle().await.unwrap().unwrap();
    let before = ids(driver.store().fragments());

    driver.request_page(3);
    let res = tokio::time::timeout(std::time::Duration::from_secs(2), driver.settle())
        .await
        .expect("settle must not hang");
    let err = res.expect("one reload was in flight").unwrap_err();
    assert!(matches!(err.source, ApiError::Task(_)), "{err}");
    assert_eq!(err.offset, 30);

    assert_eq!(driver.in_flight(), 0);
    assert_eq!(ids(driver.store().fragments()), before);
    assert_eq!(driver.store().pagination().current_page, 0);
}
