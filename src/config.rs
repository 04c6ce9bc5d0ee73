//! Configuration options for the storefront client

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the API base URL
pub const API_URL_ENV: &str = "API_URL";

/// Base URL used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Configuration options for the storefront client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The base URL of the REST API
    pub base_url: String,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// How long read-mostly list responses stay cached
    pub cache_ttl: Duration,

    /// Number of products per page window
    pub page_size: usize,

    /// Artificial delay before a "load more" completes
    pub load_more_delay: Duration,

    /// Distance from the bottom, in pixels, that triggers loading more
    pub scroll_threshold: f64,

    /// Where the session and theme preference are persisted
    pub state_path: Option<PathBuf>,

    /// Value sent in the X-Client-Info header
    pub client_info: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Some(Duration::from_secs(30)),
            cache_ttl: Duration::from_secs(5 * 60),
            page_size: 12,
            load_more_delay: Duration::from_millis(300),
            scroll_threshold: 200.0,
            state_path: None,
            client_info: format!("storefront-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Build options from the environment.
    ///
    /// Reads a `.env` file when present, then `API_URL`. Falls back to
    /// `http://localhost:3000`.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let options = Self::default();
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => options.with_base_url(url.trim()),
            _ => options,
        }
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, value: &str) -> Self {
        self.base_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the cache time-to-live
    pub fn with_cache_ttl(mut self, value: Duration) -> Self {
        self.cache_ttl = value;
        self
    }

    /// Set the page size, at least one
    pub fn with_page_size(mut self, value: usize) -> Self {
        self.page_size = value.max(1);
        self
    }

    /// Set the artificial load-more delay
    pub fn with_load_more_delay(mut self, value: Duration) -> Self {
        self.load_more_delay = value;
        self
    }

    /// Set the near-bottom scroll threshold
    pub fn with_scroll_threshold(mut self, value: f64) -> Self {
        self.scroll_threshold = value.max(0.0);
        self
    }

    /// Set the file the application state is persisted to
    pub fn with_state_path(mut self, value: impl Into<PathBuf>) -> Self {
        self.state_path = Some(value.into());
        self
    }
}
