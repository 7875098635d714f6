//! Portfolio projects and their media galleries.
//!
//! A project owns an ordered gallery. Its `url`, `coverUrl` and `isVideo`
//! fields mirror `gallery[0]` and are kept in sync on every mutation.
//! Projects written before galleries existed have no `gallery` field and
//! are treated as a one-entry gallery built from the mirrored fields.

use serde::{Deserialize, Serialize};

use super::{require, Record};
use crate::error::ValidationError;
use crate::registry::Collection;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub is_video: bool,
}

impl Media {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cover_url: None,
            is_video: false,
        }
    }

    pub fn video(url: impl Into<String>, cover_url: Option<String>) -> Self {
        Self {
            url: url.into(),
            cover_url,
            is_video: true,
        }
    }

    /// Trim the url and default a missing cover to the url itself.
    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        self.url = self.url.trim().to_string();
        if self.url.is_empty() {
            return Err(ValidationError::InvalidMedia("url is required".to_string()));
        }
        let cover = self
            .cover_url
            .take()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self.cover_url = Some(cover.unwrap_or_else(|| self.url.clone()));
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: i64,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub is_video: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<Media>,
}

impl PortfolioItem {
    pub fn new(title: impl Into<String>, category: impl Into<String>, media: Media) -> Self {
        let mut item = Self {
            id: 0,
            title: title.into(),
            category: category.into(),
            url: String::new(),
            cover_url: None,
            is_video: false,
            gallery: vec![media],
        };
        item.sync_mirrors();
        item
    }

    /// Same project: case-insensitive title and exact category.
    pub fn matches(&self, title: &str, category: &str) -> bool {
        self.title.to_lowercase() == title.to_lowercase() && self.category == category
    }

    /// Number of media entries, counting a legacy project as one.
    pub fn gallery_len(&self) -> usize {
        self.gallery.len().max(1)
    }

    /// Materialize the gallery of a project stored before galleries existed.
    pub fn ensure_gallery(&mut self) {
        if self.gallery.is_empty() {
            self.gallery.push(Media {
                url: self.url.clone(),
                cover_url: Some(self.cover_url.clone().unwrap_or_else(|| self.url.clone())),
                is_video: self.is_video,
            });
        }
    }

    pub fn push_media(&mut self, media: Media) {
        self.ensure_gallery();
        self.gallery.push(media);
    }

    /// Replace the first gallery entry, which the mirrored fields follow.
    pub fn replace_lead_media(&mut self, media: Media) {
        self.ensure_gallery();
        self.gallery[0] = media;
        self.sync_mirrors();
    }

    /// Remove one gallery entry. The last remaining entry cannot be removed.
    pub fn remove_media(&mut self, index: usize) -> Result<Media, ValidationError> {
        self.ensure_gallery();
        let len = self.gallery.len();
        if len <= 1 {
            return Err(ValidationError::LastGalleryItem);
        }
        if index >= len {
            return Err(ValidationError::GalleryIndex { index, len });
        }
        let removed = self.gallery.remove(index);
        self.sync_mirrors();
        Ok(removed)
    }

    fn sync_mirrors(&mut self) {
        if let Some(lead) = self.gallery.first() {
            self.url = lead.url.clone();
            self.cover_url = lead.cover_url.clone();
            self.is_video = lead.is_video;
        }
    }
}

impl Record for PortfolioItem {
    const COLLECTION: Collection = Collection::Portfolio;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.sync_mirrors();
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")?;
        require(&self.url, "url")
    }
}
