//! Data models for site content.
//!
//! This module contains the record types stored in each collection:
//!
//! - `Service`: offered services
//! - `PortfolioItem`, `Media`: portfolio projects and their galleries
//! - `Comment`, `CommentStatus`, `NewComment`: testimonials and moderation
//! - `PricingPlan`: pricing cards
//! - `ProcessStep`: the process timeline
//! - `SiteContent`: the singleton object holding site text
//! - `Category`: portfolio categories keyed by slug
//!
//! Field names on the wire are camelCase, matching documents already stored
//! by the site.

pub mod category;
pub mod comment;
pub mod content;
pub mod portfolio;
pub mod pricing;
pub mod process;
pub mod service;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::ValidationError;
use crate::registry::Collection;

pub use category::{slugify, Category};
pub use comment::{Comment, CommentStatus, NewComment};
pub use content::SiteContent;
pub use portfolio::{Media, PortfolioItem};
pub use pricing::PricingPlan;
pub use process::ProcessStep;
pub use service::Service;

/// An entry of a list collection, identified by a unique integer `id`.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the record type is stored in.
    const COLLECTION: Collection;

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    /// Trim and default fields before validation.
    fn normalize(&mut self) {}

    /// Reject the record before anything is written.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Carry over fields from the record being replaced by an update.
    fn preserve_from(&mut self, _old: &Self) {}
}

pub(crate) fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}
