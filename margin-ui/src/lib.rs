pub mod app;
pub mod commands;
pub mod config;
pub mod logging;
pub mod session;
pub mod view;

pub use app::{App, Flow};
pub use config::AppConfig;
pub use session::FormSession;
