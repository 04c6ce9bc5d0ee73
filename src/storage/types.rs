//! Types for image uploads

use serde::Deserialize;

/// Where an upload is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    /// Generic site imagery: banners, partner logos, blog covers
    General,

    /// Product gallery images
    ProductImage,
}

impl UploadTarget {
    pub fn path(&self) -> &'static str {
        match self {
            UploadTarget::General => "/api/upload",
            UploadTarget::ProductImage => "/api/upload/product-image",
        }
    }
}

/// Response of an upload endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadResponse {
    #[serde(default, alias = "imageUrl", alias = "fileUrl")]
    pub url: Option<String>,

    #[serde(default)]
    pub data: Option<Box<UploadResponse>>,

    #[serde(default)]
    pub message: Option<String>,
}

impl UploadResponse {
    /// The hosted URL, looking inside a `data` envelope if needed
    pub(crate) fn hosted_url(self) -> Option<String> {
        match self.url.filter(|u| !u.is_empty()) {
            Some(url) => Some(url),
            None => self.data.and_then(|inner| inner.hosted_url()),
        }
    }
}

/// Largest image accepted for upload
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
