use serde::{Deserialize, Serialize};

use super::{require, Record};
use crate::error::ValidationError;
use crate::registry::Collection;

/// One step of the process timeline. Steps are shown ordered by `step`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ProcessStep {
    pub id: i64,
    pub step: i64,
    #[serde(default)]
    pub phase: String,
    pub title: String,
    #[serde(default, rename = "desc", alias = "description")]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

impl ProcessStep {
    pub fn new(step: i64, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            step,
            phase: String::new(),
            title: title.into(),
            description: description.into(),
            image_url: String::new(),
        }
    }
}

impl Record for ProcessStep {
    const COLLECTION: Collection = Collection::Process;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.phase = self.phase.trim().to_string();
        self.image_url = self.image_url.trim().to_string();
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "title")
    }

    /// Keep the existing image when the edit supplies none.
    fn preserve_from(&mut self, old: &Self) {
        if self.image_url.is_empty() {
            self.image_url = old.image_url.clone();
        }
    }
}
