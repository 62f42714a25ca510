pub mod config;
pub mod error;
pub mod timer;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use timer::Timer;
