// Test helpers are intentionally partially used
#![allow(dead_code)]

use reqwest::Client;
use reveal_party::create_router;
use std::sync::Once;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

macro_rules! set_env_if_unset {
    // ---
    ($key:expr, $val:expr) => {
        if std::env::var($key).is_err() {
            std::env::set_var($key, $val);
        }
    };
}

static INIT: Once = Once::new();

/// Guest cookie name, as the browser sends it back.
pub const GUEST_COOKIE: &str = "gender_reveal_user_email";

// ============================================================================
// Test Setup
// ============================================================================

/// Initialize test environment variables once.
///
/// Returns `false` when no database is configured; callers skip in that case.
/// Redis is optional: without `REVEAL_REDIS_URL` the view cache is disabled.
pub fn setup_test_env() -> bool {
    // ---
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping");
        return false;
    }

    INIT.call_once(|| {
        // ---
        if std::env::var("REVEAL_REDIS_URL").is_err() {
            set_env_if_unset!("REVEAL_CACHE", "none");
        }
        set_env_if_unset!("REVEAL_METRICS_TYPE", "noop");
        set_env_if_unset!("REVEAL_DB_RETRY_COUNT", "3");
    });

    true
}

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        // --

        // Enable debug logging only when requested
        if std::env::var("TEST_DEBUG").is_ok() {
            std::env::set_var("RUST_LOG", "debug");
            std::env::set_var("NO_COLOR", "1");
        }

        let app = create_router()
            .await
            .expect("Should be able to create router");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }
}

/// Unique email per call so runs never collide on the unique constraint.
pub fn unique_email(tag: &str) -> String {
    format!("{tag}-{:016x}@example.com", rand::random::<u64>())
}

/// `name=value` of the first `Set-Cookie` on a response.
pub fn cookie_pair(response: &reqwest::Response) -> Option<String> {
    // ---
    response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}
