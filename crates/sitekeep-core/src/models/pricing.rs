use serde::{Deserialize, Serialize};

use super::{require, Record};
use crate::error::ValidationError;
use crate::registry::Collection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PricingPlan {
    pub id: i64,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub is_popular: bool,
}

impl PricingPlan {
    pub fn new(name: impl Into<String>, price: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            price: price.into(),
            unit: unit.into(),
            features: Vec::new(),
            is_popular: false,
        }
    }

    /// Features from free text, one per line.
    pub fn with_features_text(mut self, text: &str) -> Self {
        self.features = text.lines().map(str::to_string).collect();
        self
    }
}

impl Record for PricingPlan {
    const COLLECTION: Collection = Collection::Pricing;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.features = self
            .features
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")
    }

    /// The popular flag is not part of the edit form; it survives edits.
    fn preserve_from(&mut self, old: &Self) {
        self.is_popular = old.is_popular;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_text_drops_blank_lines() {
        let mut plan = PricingPlan::new("Starter", "$499", "/ project")
            .with_features_text("Up to 30 Seconds\n\n  2 Revisions  \n");
        plan.normalize();
        assert_eq!(plan.features, vec!["Up to 30 Seconds", "2 Revisions"]);
    }

    #[test]
    fn test_preserve_popular_flag() {
        let mut old = PricingPlan::new("Pro", "$999", "/ project");
        old.is_popular = true;
        let mut edited = PricingPlan::new("Pro+", "$1099", "/ project");
        edited.preserve_from(&old);
        assert!(edited.is_popular);
        assert_eq!(edited.name, "Pro+");
    }
}
