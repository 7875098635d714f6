use serde::{Deserialize, Serialize};

use super::{require, Record};
use crate::error::ValidationError;
use crate::registry::Collection;

/// Icon used when a service is saved without one
pub const DEFAULT_SERVICE_ICON: &str = "fas fa-star";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub title: String,
    // Seed data written before the rename used `desc`
    #[serde(default, alias = "desc")]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_class: Option<String>,
}

impl Service {
    pub fn new(title: impl Into<String>, description: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: description.into(),
            icon: icon.into(),
            image_url: None,
            color_class: None,
            bg_class: None,
        }
    }
}

impl Record for Service {
    const COLLECTION: Collection = Collection::Services;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        if self.icon.trim().is_empty() {
            self.icon = DEFAULT_SERVICE_ICON.to_string();
        }
        if self.image_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            self.image_url = None;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")
    }
}
