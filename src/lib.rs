pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod shared;
pub mod state;

pub use state::AppState;

/// `RUST_LOG` が無ければ `rentora=debug,info` でログを初期化する
///
/// 既に subscriber が設定されている場合は何もしない。
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rentora=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
