use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// 一度だけ発火するキャンセル可能なタイマー
///
/// `schedule` を呼ぶたびに前回の予約は取り消される（reset-on-event）。
/// ハンドルを drop すると未発火の予約も破棄されるため、所有者のライフサイクルと
/// タイマーの寿命が一致する。
pub struct Timer {
    delay: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            handle: None,
        }
    }

    /// 遅延後に `task` を実行する。既存の予約は破棄される。
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut timer = Timer::new(Duration::from_millis(100));
        timer.schedule(counting_task(&counter));

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_supersedes_previous() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut timer = Timer::new(Duration::from_millis(100));

        timer.schedule(counting_task(&counter));
        tokio::time::sleep(Duration::from_millis(60)).await;
        timer.schedule(counting_task(&counter));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_and_drop_prevent_firing() {
        let counter = Arc::new(AtomicUsize::new(0));

        let mut cancelled = Timer::new(Duration::from_millis(10));
        cancelled.schedule(counting_task(&counter));
        cancelled.cancel();

        {
            let mut dropped = Timer::new(Duration::from_millis(10));
            dropped.schedule(counting_task(&counter));
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
