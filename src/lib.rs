//! Storefront Rust Client Library
//!
//! A Rust client for an e-commerce / B2B marketplace REST API. It covers the
//! catalog (products, categories), site content (banners, partners, navbar
//! links, services, special offers, blog posts), admin CRUD, image uploads
//! and login, plus the client-side filter/sort/paginate pipeline used by
//! product listing pages.

pub mod admin;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod csv_io;
pub mod error;
pub mod fetch;
pub mod models;
pub mod resource;
pub mod state;
pub mod storage;

use reqwest::Client;
use std::sync::Arc;

use crate::admin::AdminPanel;
use crate::auth::AuthClient;
use crate::catalog::{InfiniteScroll, Listing};
use crate::config::ClientOptions;
use crate::error::Error;
use crate::models::{Banner, BlogPost, Category, NavbarLink, Partner, Product, Service, SpecialOffer};
use crate::resource::{Resource, ResourceClient};
use crate::state::AppState;
use crate::storage::StorageClient;

/// The main entry point for the storefront client
pub struct Storefront {
    /// The base URL of the API, without a trailing slash
    pub url: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Client options
    pub options: ClientOptions,
    state: Arc<AppState>,
}

impl Storefront {
    /// Create a new client for the API at `base_url`
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_client::Storefront;
    ///
    /// let shop = Storefront::new("http://localhost:3000").unwrap();
    /// let products = shop.products();
    /// ```
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Self::new_with_options(ClientOptions::default().with_base_url(base_url))
    }

    /// Create a new client with custom options
    ///
    /// Loads the persisted session and theme when `options.state_path` is set.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use storefront_client::{Storefront, config::ClientOptions};
    ///
    /// let options = ClientOptions::default()
    ///     .with_base_url("http://localhost:3000")
    ///     .with_cache_ttl(Duration::from_secs(60));
    /// let shop = Storefront::new_with_options(options).unwrap();
    /// ```
    pub fn new_with_options(options: ClientOptions) -> Result<Self, Error> {
        let state = Arc::new(AppState::init(&options)?);
        Self::with_state(options, state)
    }

    /// Create a client configured from `API_URL` (and `.env`)
    pub fn from_env() -> Result<Self, Error> {
        Self::new_with_options(ClientOptions::from_env())
    }

    /// Create a client sharing an existing [`AppState`]
    pub fn with_state(options: ClientOptions, state: Arc<AppState>) -> Result<Self, Error> {
        url::Url::parse(&options.base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            url: options.base_url.clone(),
            http_client,
            options,
            state,
        })
    }

    /// Session, theme and cache shared by every sub-client
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// A client for any collection endpoint
    pub fn resource<T: Resource>(&self) -> ResourceClient<T> {
        ResourceClient::new(
            &self.url,
            self.http_client.clone(),
            self.state.clone(),
            &self.options.client_info,
        )
    }

    pub fn products(&self) -> ResourceClient<Product> {
        self.resource()
    }

    pub fn categories(&self) -> ResourceClient<Category> {
        self.resource()
    }

    pub fn banners(&self) -> ResourceClient<Banner> {
        self.resource()
    }

    pub fn partners(&self) -> ResourceClient<Partner> {
        self.resource()
    }

    pub fn navbar_links(&self) -> ResourceClient<NavbarLink> {
        self.resource()
    }

    pub fn services(&self) -> ResourceClient<Service> {
        self.resource()
    }

    pub fn special_offers(&self) -> ResourceClient<SpecialOffer> {
        self.resource()
    }

    pub fn blog_posts(&self) -> ResourceClient<BlogPost> {
        self.resource()
    }

    /// Get the auth client for login and logout
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(
            &self.url,
            self.http_client.clone(),
            self.state.clone(),
            &self.options.client_info,
        )
    }

    /// Get the storage client for image uploads
    pub fn storage(&self) -> StorageClient {
        StorageClient::new(
            &self.url,
            self.http_client.clone(),
            self.state.clone(),
            &self.options.client_info,
        )
    }

    /// An admin page for one entity type
    pub fn admin_panel<T: Resource + Default>(&self) -> AdminPanel<T> {
        AdminPanel::new(self.resource())
    }

    /// A listing over `products` using the configured page size
    pub fn listing(&self, products: Vec<Product>) -> Listing {
        Listing::new(products, self.options.page_size)
    }

    /// A scroll-driven loader for listings, using the configured delay and threshold
    pub fn infinite_scroll(&self) -> InfiniteScroll {
        InfiniteScroll::new(self.options.load_more_delay, self.options.scroll_threshold)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::admin::{AdminPanel, Notice, NoticeKind};
    pub use crate::catalog::{Comparison, FilterState, InfiniteScroll, Listing, SortKey};
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::models::*;
    pub use crate::resource::{DataSource, Fetched, FormMode, Resource, ResourceClient, Toggleable};
    pub use crate::state::{AppState, Theme};
    pub use crate::Storefront;
}
