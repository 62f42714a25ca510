use super::query::{DriverHandle, LiveQueryOptions, QueryCore};
use super::state::QuerySnapshot;
use crate::application::ports::QuerySource;
use crate::shared::timer::Timer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// 入力が `delay` の間落ち着いたら最後の値だけを流す
pub struct Debouncer<A> {
    timer: Timer,
    settled: mpsc::UnboundedSender<A>,
}

impl<A> Debouncer<A>
where
    A: Send + 'static,
{
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<A>) {
        let (settled, rx) = mpsc::unbounded_channel();
        (
            Self {
                timer: Timer::new(delay),
                settled,
            },
            rx,
        )
    }

    pub fn push(&mut self, value: A) {
        let settled = self.settled.clone();
        self.timer.schedule(async move {
            let _ = settled.send(value);
        });
    }
}

/// 引数の変更をデバウンスしてから再購読するライブクエリ
///
/// 初回の購読は即座に行う。以降の `set_args` は `delay` 以内に連続した変更を
/// まとめ、最後の引数でのみ購読し直す。再購読中は直前の値を表示し続ける。
pub struct DebouncedQuery<A, T>
where
    T: Clone + Send + Sync + 'static,
{
    core: Arc<QueryCore<T>>,
    snapshots: watch::Receiver<QuerySnapshot<T>>,
    debouncer: Debouncer<A>,
    _coordinator: DriverHandle,
}

impl<A, T> DebouncedQuery<A, T>
where
    A: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        source: Arc<dyn QuerySource<A, T>>,
        initial_args: A,
        delay: Duration,
        options: LiveQueryOptions<T>,
    ) -> Self {
        let core = QueryCore::new(options);
        let snapshots = core.watch();
        let (debouncer, mut settled) = Debouncer::new(delay);

        let first = core.spawn_driver(source.subscribe(&initial_args));
        let coordinator = {
            let core = Arc::clone(&core);
            DriverHandle::spawn(async move {
                let mut current = first;
                while let Some(args) = settled.recv().await {
                    debug!("Query args settled, resubscribing");
                    current.abort();
                    current = core.spawn_driver(source.subscribe(&args));
                }
            })
        };

        Self {
            core,
            snapshots,
            debouncer,
            _coordinator: coordinator,
        }
    }

    pub fn set_args(&mut self, args: A) {
        self.debouncer.push(args);
    }

    pub fn snapshot(&self) -> QuerySnapshot<T> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QuerySnapshot<T>> {
        self.core.watch()
    }
}

impl<A, T> Drop for DebouncedQuery<A, T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.core.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::QueryUpdate;
    use std::sync::Mutex;

    const DELAY: Duration = Duration::from_millis(300);
    const STALE_AFTER: Duration = Duration::from_secs(300);

    #[derive(Default)]
    struct RecordingSource {
        issued: Mutex<Vec<String>>,
        senders: Mutex<Vec<watch::Sender<QueryUpdate<String>>>>,
    }

    impl RecordingSource {
        fn issued(&self) -> Vec<String> {
            self.issued.lock().unwrap().clone()
        }
    }

    impl QuerySource<String, String> for RecordingSource {
        fn subscribe(&self, args: &String) -> watch::Receiver<QueryUpdate<String>> {
            self.issued.lock().unwrap().push(args.clone());
            let (tx, rx) = watch::channel(QueryUpdate::Ready(format!("results for {args}")));
            self.senders.lock().unwrap().push(tx);
            rx
        }
    }

    #[tokio::test(start_paused = true)]
    async fn debouncer_emits_only_last_value() {
        let (mut debouncer, mut settled) = Debouncer::new(DELAY);
        debouncer.push(1);
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push(2);
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push(3);

        assert_eq!(settled.recv().await, Some(3));
        assert!(settled.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_arg_changes_issue_single_query() {
        let source = Arc::new(RecordingSource::default());
        let mut query = DebouncedQuery::new(
            source.clone() as Arc<dyn QuerySource<String, String>>,
            "o".to_string(),
            DELAY,
            LiveQueryOptions::new(STALE_AFTER),
        );
        let mut snapshots = query.subscribe();
        snapshots
            .wait_for(|s| s.value.as_deref() == Some("results for o"))
            .await
            .unwrap();

        query.set_args("os".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;
        query.set_args("osa".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;
        query.set_args("osaka".to_string());

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(source.issued(), vec!["o".to_string()]);
        // 再購読前は直前の結果を表示し続ける
        assert_eq!(query.snapshot().value.as_deref(), Some("results for o"));

        tokio::time::sleep(Duration::from_millis(2)).await;
        snapshots
            .wait_for(|s| s.value.as_deref() == Some("results for osaka"))
            .await
            .unwrap();
        assert_eq!(source.issued(), vec!["o".to_string(), "osaka".to_string()]);
    }
}
