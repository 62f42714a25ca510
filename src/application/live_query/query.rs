use super::state::{QueryState, QuerySnapshot};
use crate::application::ports::QueryUpdate;
use crate::shared::timer::Timer;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub(crate) type ValueSink<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// ライブクエリの生成オプション
pub struct LiveQueryOptions<T> {
    pub stale_after: Duration,
    pub(crate) fallback: Option<T>,
    pub(crate) sink: Option<ValueSink<T>>,
}

impl<T> LiveQueryOptions<T> {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            stale_after,
            fallback: None,
            sink: None,
        }
    }

    /// 初回表示に使うフォールバック値
    pub fn with_fallback(mut self, fallback: Option<T>) -> Self {
        self.fallback = fallback;
        self
    }

    /// 確定値を受け取るたびに呼ばれるコールバック
    pub fn on_value<F>(mut self, sink: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }
}

/// drop 時にタスクを abort するハンドル
pub(crate) struct DriverHandle(JoinHandle<()>);

impl DriverHandle {
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        Self(tokio::spawn(future))
    }

    pub(crate) fn abort(&self) {
        self.0.abort();
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// 状態・スナップショット配信・staleness タイマーをまとめた共有部
pub(crate) struct QueryCore<T> {
    state: Mutex<QueryState<T>>,
    snapshots: watch::Sender<QuerySnapshot<T>>,
    stale_timer: StdMutex<Timer>,
    sink: Option<ValueSink<T>>,
}

impl<T> QueryCore<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(options: LiveQueryOptions<T>) -> Arc<Self> {
        let state = QueryState::new(options.fallback);
        let (snapshots, _) = watch::channel(state.snapshot());
        Arc::new(Self {
            state: Mutex::new(state),
            snapshots,
            stale_timer: StdMutex::new(Timer::new(options.stale_after)),
            sink: options.sink,
        })
    }

    pub(crate) fn watch(&self) -> watch::Receiver<QuerySnapshot<T>> {
        self.snapshots.subscribe()
    }

    /// 購読元の receiver を読み続けるタスクを起動する
    pub(crate) fn spawn_driver(
        self: &Arc<Self>,
        mut source: watch::Receiver<QueryUpdate<T>>,
    ) -> DriverHandle {
        let core = Arc::clone(self);
        DriverHandle::spawn(async move {
            loop {
                let update = source.borrow_and_update().clone();
                core.apply(update).await;
                if source.changed().await.is_err() {
                    debug!("Live query source closed");
                    break;
                }
            }
        })
    }

    pub(crate) async fn apply(self: &Arc<Self>, update: QueryUpdate<T>) {
        if let QueryUpdate::Failed(message) = &update {
            warn!(error = %message, "Live query source reported an error");
        }
        if let (Some(sink), QueryUpdate::Ready(value)) = (&self.sink, &update) {
            sink(value);
        }

        let received_epoch = {
            let mut state = self.state.lock().await;
            let received = state.apply(update);
            self.snapshots.send_replace(state.snapshot());
            received.then(|| state.epoch())
        };

        if let Some(epoch) = received_epoch {
            self.schedule_stale(epoch);
        }
    }

    fn schedule_stale(self: &Arc<Self>, epoch: u64) {
        let weak = Arc::downgrade(self);
        let mut timer = self
            .stale_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        timer.schedule(async move {
            if let Some(core) = weak.upgrade() {
                core.mark_stale(epoch).await;
            }
        });
    }

    async fn mark_stale(&self, epoch: u64) {
        let mut state = self.state.lock().await;
        if state.mark_stale(epoch) {
            debug!(epoch, "Live query value became stale");
            self.snapshots.send_replace(state.snapshot());
        }
    }

    pub(crate) async fn set_optimistic(&self, value: T) {
        let mut state = self.state.lock().await;
        state.set_optimistic(value);
        self.snapshots.send_replace(state.snapshot());
    }

    pub(crate) fn shutdown(&self) {
        self.stale_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}

/// プッシュ型ライブクエリのフック相当
///
/// 購読が pending に戻っても直前の値を保持し（refetching）、一定時間新しい値が
/// 来なければ stale フラグを立てる。drop すると購読タスクとタイマーを止める。
pub struct LiveQuery<T>
where
    T: Clone + Send + Sync + 'static,
{
    core: Arc<QueryCore<T>>,
    snapshots: watch::Receiver<QuerySnapshot<T>>,
    _driver: DriverHandle,
}

impl<T> LiveQuery<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(source: watch::Receiver<QueryUpdate<T>>, options: LiveQueryOptions<T>) -> Self {
        let core = QueryCore::new(options);
        let snapshots = core.watch();
        let driver = core.spawn_driver(source);
        Self {
            core,
            snapshots,
            _driver: driver,
        }
    }

    pub fn snapshot(&self) -> QuerySnapshot<T> {
        self.snapshots.borrow().clone()
    }

    /// スナップショットの変更を購読する
    pub fn subscribe(&self) -> watch::Receiver<QuerySnapshot<T>> {
        self.core.watch()
    }

    pub async fn set_optimistic(&self, value: T) {
        self.core.set_optimistic(value).await;
    }
}

impl<T> Drop for LiveQuery<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.core.shutdown();
    }
}
