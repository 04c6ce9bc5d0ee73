//! Typed CRUD access to the API's collection endpoints

use log::{debug, warn};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use url::Url;
use validator::Validate;

use crate::error::Error;
use crate::fetch::{Fetch, FetchBuilder};
use crate::models::{
    Banner, BlogPost, Category, ItemResponse, ListResponse, NavbarLink, Partner, Product, Service,
    SpecialOffer,
};
use crate::state::AppState;

/// A record type served from a collection endpoint
pub trait Resource: Serialize + DeserializeOwned + Validate + Clone + Send + Sync {
    /// Collection path, e.g. `/api/products`
    const PATH: &'static str;

    /// Whether list responses may be served from the TTL cache
    const CACHEABLE: bool = false;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);
}

/// How an entity's active flag is flipped on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleRoute {
    /// `PATCH {path}/:id/toggle` with no body
    Endpoint,

    /// `PATCH {path}/:id` with `{ field: !current }`
    Field(&'static str),
}

/// A record with an on/off status
pub trait Toggleable: Resource {
    const TOGGLE_ROUTE: ToggleRoute;

    fn is_active(&self) -> bool;

    fn set_active(&mut self, active: bool);

    /// A copy with the status flipped
    fn toggled(&self) -> Self {
        let mut copy = self.clone();
        copy.set_active(!self.is_active());
        copy
    }
}

macro_rules! resource {
    ($ty:ty, $path:expr, cacheable = $cacheable:expr) => {
        impl Resource for $ty {
            const PATH: &'static str = $path;
            const CACHEABLE: bool = $cacheable;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

macro_rules! toggleable {
    ($ty:ty, $route:expr) => {
        impl Toggleable for $ty {
            const TOGGLE_ROUTE: ToggleRoute = $route;

            fn is_active(&self) -> bool {
                self.is_active
            }

            fn set_active(&mut self, active: bool) {
                self.is_active = active;
            }
        }
    };
}

resource!(Product, "/api/products", cacheable = false);
resource!(Category, "/api/categories", cacheable = true);
resource!(Banner, "/api/banners", cacheable = true);
resource!(Partner, "/api/partners", cacheable = true);
resource!(NavbarLink, "/api/navbar-links", cacheable = true);
resource!(Service, "/api/services", cacheable = true);
resource!(SpecialOffer, "/api/special-offers", cacheable = false);
resource!(BlogPost, "/api/news-blog-posts", cacheable = false);

toggleable!(Banner, ToggleRoute::Field("isActive"));
toggleable!(Partner, ToggleRoute::Field("isActive"));
toggleable!(NavbarLink, ToggleRoute::Endpoint);
toggleable!(Service, ToggleRoute::Field("isActive"));
toggleable!(SpecialOffer, ToggleRoute::Field("isActive"));

/// Where a list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Remote,
    Cache,
    /// The API failed and caller-supplied defaults were used
    Fallback,
}

/// A list together with its origin
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    pub source: DataSource,
}

impl<T> Fetched<T> {
    /// Whether the items are placeholders standing in for a failed request
    pub fn is_degraded(&self) -> bool {
        self.source == DataSource::Fallback
    }
}

/// A form's target: a record to create, or an existing one being edited
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode<T> {
    New(T),
    Editing { id: String, value: T },
}

impl<T: Resource> FormMode<T> {
    /// Start editing an existing record
    pub fn edit(record: &T) -> Self {
        FormMode::Editing {
            id: record.id().to_string(),
            value: record.clone(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            FormMode::New(value) | FormMode::Editing { value, .. } => value,
        }
    }

    pub fn value_mut(&mut self) -> &mut T {
        match self {
            FormMode::New(value) | FormMode::Editing { value, .. } => value,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, FormMode::Editing { .. })
    }
}

/// Client for one collection endpoint
pub struct ResourceClient<T> {
    /// The base URL of the API
    url: String,

    client: Client,

    state: Arc<AppState>,

    client_info: String,

    _marker: PhantomData<T>,
}

impl<T: Resource> ResourceClient<T> {
    pub(crate) fn new(url: &str, client: Client, state: Arc<AppState>, client_info: &str) -> Self {
        Self {
            url: url.to_string(),
            client,
            state,
            client_info: client_info.to_string(),
            _marker: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.url, T::PATH)
    }

    /// `{collection}/{id}[/{suffix}]` with the id percent-encoded as one
    /// path segment
    fn item_url(&self, id: &str, suffix: Option<&str>) -> Result<String, Error> {
        let mut url = Url::parse(&self.collection_url())?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::general(format!("{} cannot take a record id", self.url)))?;
            segments.pop_if_empty().push(id);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url.into())
    }

    fn with_headers<'a>(&self, fetch: FetchBuilder<'a>) -> FetchBuilder<'a> {
        fetch
            .header("X-Client-Info", &self.client_info)
            .bearer_auth(self.state.token().as_deref())
    }

    fn require_id(id: &str) -> Result<(), Error> {
        if id.trim().is_empty() {
            return Err(Error::general(format!("A record id is required for {}", T::PATH)));
        }
        Ok(())
    }

    /// Fetch the whole collection
    pub async fn list(&self) -> Result<Vec<T>, Error> {
        Ok(self.fetch_list().await?.items)
    }

    /// Fetch the collection, marking whether the cache answered
    pub async fn fetch_list(&self) -> Result<Fetched<T>, Error> {
        if T::CACHEABLE {
            if let Some(value) = self.state.cache().get(T::PATH) {
                debug!("cache hit for {}", T::PATH);
                let items = serde_json::from_value::<ListResponse<T>>(value)?.into_vec();
                return Ok(Fetched {
                    items,
                    source: DataSource::Cache,
                });
            }
        }

        let value = self
            .with_headers(Fetch::get(&self.client, &self.collection_url()))
            .execute::<Value>()
            .await?;
        let items = serde_json::from_value::<ListResponse<T>>(value.clone())?.into_vec();

        if T::CACHEABLE {
            self.state.cache().insert(T::PATH, value);
        }
        Ok(Fetched {
            items,
            source: DataSource::Remote,
        })
    }

    /// Fetch the collection, substituting `fallback` when the request fails.
    ///
    /// The result is marked [`DataSource::Fallback`] so an outage is never
    /// mistaken for real data.
    pub async fn list_with_fallback(&self, fallback: Vec<T>) -> Fetched<T> {
        match self.fetch_list().await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("{} unavailable, using {} fallback records: {}", T::PATH, fallback.len(), e);
                Fetched {
                    items: fallback,
                    source: DataSource::Fallback,
                }
            }
        }
    }

    /// Fetch a single record
    pub async fn get(&self, id: &str) -> Result<T, Error> {
        Self::require_id(id)?;
        let item = self
            .with_headers(Fetch::get(&self.client, &self.item_url(id, None)?))
            .execute::<ItemResponse<T>>()
            .await?;
        Ok(item.into_inner())
    }

    /// Validate and POST a new record. The stored record must come back
    /// with an id.
    pub async fn create(&self, record: &T) -> Result<T, Error> {
        record.validate()?;
        let created = self
            .with_headers(Fetch::post(&self.client, &self.collection_url()))
            .json(record)?
            .execute::<ItemResponse<T>>()
            .await?
            .into_inner();
        self.invalidate();
        if created.id().trim().is_empty() {
            warn!("{} accepted a new record but returned no id", T::PATH);
            return Err(Error::general(
                "The record was saved but the server did not return its id. Reload to see it.",
            ));
        }
        Ok(created)
    }

    /// Validate and PUT the full record
    pub async fn update(&self, id: &str, record: &T) -> Result<T, Error> {
        Self::require_id(id)?;
        record.validate()?;
        let mut updated = self
            .with_headers(Fetch::put(&self.client, &self.item_url(id, None)?))
            .json(record)?
            .execute::<ItemResponse<T>>()
            .await?
            .into_inner();
        if updated.id().is_empty() {
            updated.set_id(id.to_string());
        }
        self.invalidate();
        Ok(updated)
    }

    /// Create or update depending on the form mode
    pub async fn save(&self, form: &FormMode<T>) -> Result<T, Error> {
        match form {
            FormMode::New(value) => self.create(value).await,
            FormMode::Editing { id, value } => self.update(id, value).await,
        }
    }

    /// DELETE a record
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        Self::require_id(id)?;
        self.with_headers(Fetch::delete(&self.client, &self.item_url(id, None)?))
            .execute_empty()
            .await?;
        self.invalidate();
        Ok(())
    }

    fn invalidate(&self) {
        if T::CACHEABLE {
            self.state.cache().invalidate_prefix(T::PATH);
        }
    }
}

impl<T: Toggleable> ResourceClient<T> {
    /// Flip the record's active flag on the server and return the stored record
    pub async fn toggle(&self, record: &T) -> Result<T, Error> {
        let id = record.id();
        Self::require_id(id)?;

        let fetch = match T::TOGGLE_ROUTE {
            ToggleRoute::Endpoint => {
                let url = self.item_url(id, Some("toggle"))?;
                self.with_headers(Fetch::patch(&self.client, &url))
            }
            ToggleRoute::Field(field) => {
                let mut body = serde_json::Map::new();
                body.insert(field.to_string(), json!(!record.is_active()));
                self.with_headers(Fetch::patch(&self.client, &self.item_url(id, None)?))
                    .json(&body)?
            }
        };

        let mut toggled = fetch.execute::<ItemResponse<T>>().await?.into_inner();
        if toggled.id().is_empty() {
            toggled.set_id(id.to_string());
        }
        self.invalidate();
        Ok(toggled)
    }
}
