//! Application context shared across request handlers.

use std::sync::Arc;

use ps_core::config::Config;
use ps_db::pool::DbPool;

use crate::middleware::rate_limit::SharedLimiter;

/// Application context shared by all request handlers (via Axum state).
///
/// This is cheaply cloneable: the pool is an `Arc` internally and every
/// other field is behind one explicitly.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// Placeholder image bytes served for missing or removed uploads.
    pub placeholder: Arc<Vec<u8>>,
    /// Shared limiter applied to mutating routes.
    pub limiter: SharedLimiter,
}
