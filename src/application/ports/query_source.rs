use tokio::sync::watch;

/// ライブクエリ購読から届く状態
#[derive(Debug, Clone, PartialEq)]
pub enum QueryUpdate<T> {
    Pending,
    Ready(T),
    /// 購読元のエラーチャネル。再試行は購読元に任せる。
    Failed(String),
}

/// プッシュ型のクエリ購読ポート
pub trait QuerySource<A, T>: Send + Sync {
    fn subscribe(&self, args: &A) -> watch::Receiver<QueryUpdate<T>>;
}
