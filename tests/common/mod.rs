//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, default config,
//! and full [`AppContext`]. The [`with_server`] constructor starts Axum on
//! a random port for HTTP-level testing. Account helpers go through the
//! public API; image and comment seeding writes to the database directly.

use std::net::SocketAddr;
use std::sync::Arc;

use ps_core::config::Config;
use ps_core::ImageId;
use ps_db::pool::{init_memory_pool, DbPool};
use ps_server::context::AppContext;
use ps_server::middleware::rate_limit::create_limiter;
use ps_server::router::build_router;

/// A complete, tiny, valid PNG (1x1 transparent pixel). Doubles as the
/// placeholder image and as an upload payload.
pub const TEST_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // signature
    0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R', 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
    0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89, // IHDR
    0x00, 0x00, 0x00, 0x0A, b'I', b'D', b'A', b'T', 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, // IDAT
    0x00, 0x00, 0x00, 0x00, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82, // IEND
];

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
}

impl TestHarness {
    /// Create a new harness with default configuration and in-memory DB.
    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let limiter = create_limiter(config.rate_limit.mutations_per_minute);

        let ctx = AppContext {
            db: db.clone(),
            config: Arc::new(config),
            placeholder: Arc::new(TEST_PNG.to_vec()),
            limiter,
        };

        Self { ctx, db }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = build_router(harness.ctx.clone(), None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> ps_db::pool::PooledConnection {
        ps_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    /// Insert an image directly, returning its generated ID.
    pub fn seed_image(&self, mimetype: &str, username: &str) -> ImageId {
        let conn = self.conn();
        ps_db::queries::images::create_image(&conn, TEST_PNG, mimetype, username)
            .expect("failed to seed image")
            .id
    }

    /// Insert a comment directly.
    pub fn seed_comment(&self, image_id: &ImageId, username: &str, text: &str) {
        let conn = self.conn();
        ps_db::queries::comments::create_comment(&conn, image_id, username, text)
            .expect("failed to seed comment");
    }
}

/// Register an account through the API.
pub async fn register(addr: SocketAddr, username: &str, password: &str) {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/auth/register"))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), 201, "registration should succeed");
}

/// Log in through the API and return a bearer token.
pub async fn login(addr: SocketAddr, username: &str, password: &str) -> String {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/auth/login"))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), 200, "login should succeed");

    let json: serde_json::Value = resp.json().await.expect("login response not JSON");
    json["token"]
        .as_str()
        .expect("login response missing token")
        .to_string()
}

/// Register an account and log in, returning a bearer token.
pub async fn register_and_login(addr: SocketAddr, username: &str, password: &str) -> String {
    register(addr, username, password).await;
    login(addr, username, password).await
}
