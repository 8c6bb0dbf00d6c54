pub mod category_fetch;
pub mod config;
pub mod fallback_pool;
pub mod http_client;
pub mod logging;
pub mod provider;
pub mod session;
pub mod state;
