//! プッシュ型クエリの購読を UI 向けの状態に変換する層
//!
//! refetch 中の値保持、staleness、永続キャッシュ、引数のデバウンス、
//! 一覧の段階表示をここで扱う。

mod debounce;
mod incremental;
mod persisted;
mod query;
pub mod state;

pub use debounce::{DebouncedQuery, Debouncer};
pub use incremental::IncrementalLoader;
pub use persisted::PersistedQueryCache;
pub use query::{LiveQuery, LiveQueryOptions};
pub use state::{QueryPhase, QuerySnapshot, QueryState};
