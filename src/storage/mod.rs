//! Image uploads to the API's hosted storage

mod types;

use log::debug;
use reqwest::{multipart, Client};
use std::path::Path;
use std::sync::Arc;

use crate::error::Error;
use crate::fetch::ensure_success;
use crate::state::AppState;

pub use types::*;

/// Client for the upload endpoints
pub struct StorageClient {
    /// The base URL of the API
    url: String,

    /// HTTP client used for requests
    client: Client,

    state: Arc<AppState>,

    client_info: String,
}

impl StorageClient {
    pub(crate) fn new(url: &str, client: Client, state: Arc<AppState>, client_info: &str) -> Self {
        Self {
            url: url.to_string(),
            client,
            state,
            client_info: client_info.to_string(),
        }
    }

    /// Upload a site image (banner, logo, blog cover) and return its URL
    pub async fn upload_image(&self, file_name: &str, data: Vec<u8>) -> Result<String, Error> {
        self.upload(UploadTarget::General, file_name, data).await
    }

    /// Upload a product gallery image and return its URL
    pub async fn upload_product_image(&self, file_name: &str, data: Vec<u8>) -> Result<String, Error> {
        self.upload(UploadTarget::ProductImage, file_name, data).await
    }

    /// Read a local file and upload it
    pub async fn upload_file(&self, target: UploadTarget, path: &Path) -> Result<String, Error> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        self.upload(target, &file_name, data).await
    }

    /// Send `data` as multipart field `image` to the target endpoint
    pub async fn upload(&self, target: UploadTarget, file_name: &str, data: Vec<u8>) -> Result<String, Error> {
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(Error::upload(format!("{} is not an image", file_name)));
        }
        if data.is_empty() {
            return Err(Error::upload(format!("{} is empty", file_name)));
        }
        if data.len() > MAX_IMAGE_BYTES {
            return Err(Error::upload(format!(
                "{} is larger than {} MB",
                file_name,
                MAX_IMAGE_BYTES / (1024 * 1024)
            )));
        }

        let url = format!("{}{}", self.url, target.path());
        let size = data.len();
        let part = multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime.essence_str())?;
        let form = multipart::Form::new().part("image", part);

        let mut request = self
            .client
            .post(&url)
            .header("X-Client-Info", &self.client_info)
            .multipart(form);
        if let Some(token) = self.state.token() {
            request = request.bearer_auth(token);
        }

        debug!("POST {} ({} bytes)", url, size);
        let response = ensure_success(request.send().await?).await?;
        let body = response.json::<UploadResponse>().await?;
        let message = body.message.clone();

        body.hosted_url().ok_or_else(|| {
            Error::upload(message.unwrap_or_else(|| "Upload response did not include a URL".to_string()))
        })
    }
}
