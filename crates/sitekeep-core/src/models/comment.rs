use serde::{Deserialize, Serialize};

use super::{require, Record};
use crate::error::ValidationError;
use crate::registry::Collection;

/// Rating given when a submission leaves it out
pub const DEFAULT_RATING: u8 = 5;

/// Moderation state. Rejecting a comment deletes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    #[default]
    Pending,
    Approved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Comment {
    pub id: i64,
    pub user: String,
    pub text: String,
    #[serde(default = "default_rating")]
    pub rating: u8,
    #[serde(default)]
    pub status: CommentStatus,
}

fn default_rating() -> u8 {
    DEFAULT_RATING
}

impl Comment {
    pub fn is_approved(&self) -> bool {
        self.status == CommentStatus::Approved
    }
}

/// A testimonial submitted from the public site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub user: String,
    pub text: String,
    pub rating: Option<u8>,
}

impl NewComment {
    pub fn new(user: impl Into<String>, text: impl Into<String>, rating: Option<u8>) -> Self {
        Self {
            user: user.into(),
            text: text.into(),
            rating,
        }
    }

    /// Build the stored comment. Submissions always start out pending.
    pub fn into_pending(self) -> Comment {
        Comment {
            id: 0,
            user: self.user,
            text: self.text,
            rating: self.rating.unwrap_or(DEFAULT_RATING),
            status: CommentStatus::Pending,
        }
    }
}

impl Record for Comment {
    const COLLECTION: Collection = Collection::Comments;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn normalize(&mut self) {
        self.user = self.user.trim().to_string();
        self.text = self.text.trim().to_string();
        self.rating = self.rating.clamp(1, 5);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.user, "user")?;
        require(&self.text, "text")
    }
}
