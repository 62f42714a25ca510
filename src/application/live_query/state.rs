use crate::application::ports::QueryUpdate;
use serde::Serialize;

/// UI へ渡すクエリ結果のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySnapshot<T> {
    /// live → 直前の値 → 永続キャッシュ の順で最も新しい値
    pub value: Option<T>,
    /// どの種類の値もまだ無い
    pub is_loading: bool,
    pub is_refetching: bool,
    /// 最後の確定値から一定時間が経過した（表示は継続する）
    pub is_stale: bool,
    /// 前回セッションの永続キャッシュを表示中
    pub is_cached: bool,
    pub is_optimistic: bool,
    pub error: Option<String>,
}

impl<T> QuerySnapshot<T> {
    pub fn loading() -> Self {
        Self {
            value: None,
            is_loading: true,
            is_refetching: false,
            is_stale: false,
            is_cached: false,
            is_optimistic: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    /// 値もフォールバックも無い（= Loading）
    Empty,
    Live,
    Refetching,
    Cached,
}

/// フックインスタンスごとのクエリ状態
///
/// 購読が pending に戻っても最後の確定値を保持し、`epoch` で確定値の世代を数える。
/// staleness タイマーは予約時の世代を持ち回り、世代が変わっていれば無視される。
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    live: Option<T>,
    retained: Option<T>,
    cached: Option<T>,
    optimistic: Option<T>,
    stale: bool,
    epoch: u64,
    last_error: Option<String>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            live: None,
            retained: None,
            cached: None,
            optimistic: None,
            stale: false,
            epoch: 0,
            last_error: None,
        }
    }
}

impl<T: Clone> QueryState<T> {
    pub fn new(cached: Option<T>) -> Self {
        Self {
            cached,
            ..Self::default()
        }
    }

    /// 購読からの更新を反映する。確定値を受け取ったら true
    pub fn apply(&mut self, update: QueryUpdate<T>) -> bool {
        match update {
            QueryUpdate::Ready(value) => {
                self.live = Some(value.clone());
                self.retained = Some(value);
                self.optimistic = None;
                self.stale = false;
                self.last_error = None;
                self.epoch += 1;
                true
            }
            QueryUpdate::Pending => {
                self.live = None;
                false
            }
            QueryUpdate::Failed(message) => {
                self.live = None;
                self.last_error = Some(message);
                false
            }
        }
    }

    /// `epoch` の確定値以降に新しい値が来ていなければ stale にする
    pub fn mark_stale(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || self.retained.is_none() || self.stale {
            return false;
        }
        self.stale = true;
        true
    }

    /// 楽観的更新。次の確定値で置き換えられる
    pub fn set_optimistic(&mut self, value: T) {
        self.optimistic = Some(value);
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn phase(&self) -> QueryPhase {
        if self.live.is_some() {
            QueryPhase::Live
        } else if self.retained.is_some() {
            QueryPhase::Refetching
        } else if self.cached.is_some() {
            QueryPhase::Cached
        } else {
            QueryPhase::Empty
        }
    }

    pub fn current_value(&self) -> Option<&T> {
        self.optimistic
            .as_ref()
            .or(self.live.as_ref())
            .or(self.retained.as_ref())
            .or(self.cached.as_ref())
    }

    pub fn snapshot(&self) -> QuerySnapshot<T> {
        let phase = self.phase();
        let value = self.current_value().cloned();
        QuerySnapshot {
            is_loading: value.is_none(),
            value,
            is_refetching: phase == QueryPhase::Refetching,
            is_stale: self.stale && self.retained.is_some(),
            is_cached: phase == QueryPhase::Cached,
            is_optimistic: self.optimistic.is_some(),
            error: self.last_error.clone(),
        }
    }
}
