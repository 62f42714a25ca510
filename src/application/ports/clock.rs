use chrono::{DateTime, Utc};

/// 壁時計（ミリ秒精度）
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}
