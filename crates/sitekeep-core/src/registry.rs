//! The fixed set of collections the site stores.
//!
//! Every collection is persisted under one key, `dewabars_<name>`. The key
//! set below is the whole persisted layout.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::defaults;
use crate::error::ValidationError;
use crate::remote::document::is_truthy;

/// Prefix shared by every storage key
pub const KEY_PREFIX: &str = "dewabars_";

/// Whether a collection holds a list of records or a single object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    List,
    Singleton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Services,
    Portfolio,
    Comments,
    Pricing,
    Process,
    Content,
    PortfolioCategories,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Services,
        Collection::Portfolio,
        Collection::Comments,
        Collection::Pricing,
        Collection::Process,
        Collection::Content,
        Collection::PortfolioCategories,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Services => "services",
            Collection::Portfolio => "portfolio",
            Collection::Comments => "comments",
            Collection::Pricing => "pricing",
            Collection::Process => "process",
            Collection::Content => "content",
            Collection::PortfolioCategories => "portfolio_categories",
        }
    }

    /// Storage key, identical in the local cache and the remote store.
    pub fn key(self) -> &'static str {
        match self {
            Collection::Services => "dewabars_services",
            Collection::Portfolio => "dewabars_portfolio",
            Collection::Comments => "dewabars_comments",
            Collection::Pricing => "dewabars_pricing",
            Collection::Process => "dewabars_process",
            Collection::Content => "dewabars_content",
            Collection::PortfolioCategories => "dewabars_portfolio_categories",
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            Collection::Content => Shape::Singleton,
            _ => Shape::List,
        }
    }

    pub fn all_keys() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.key()).collect()
    }

    /// Default value written when the collection is found empty.
    pub fn default_payload(self) -> Result<Value, serde_json::Error> {
        match self {
            Collection::Services => serde_json::to_value(defaults::services()),
            Collection::Portfolio => serde_json::to_value(defaults::portfolio()),
            Collection::Comments => serde_json::to_value(defaults::comments()),
            Collection::Pricing => serde_json::to_value(defaults::pricing()),
            Collection::Process => serde_json::to_value(defaults::process()),
            Collection::Content => serde_json::to_value(defaults::content()),
            Collection::PortfolioCategories => serde_json::to_value(defaults::categories()),
        }
    }

    /// Absent, falsy, or an empty list. An object counts as populated.
    pub fn needs_seed(value: &Value) -> bool {
        match value {
            Value::Array(items) => items.is_empty(),
            other => !is_truthy(other),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = ValidationError;

    /// Accepts the bare name, the full storage key, or `categories`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        let name = name.strip_prefix(KEY_PREFIX).unwrap_or(&name);
        let name = name.replace('-', "_");
        match name.as_str() {
            "categories" => Ok(Collection::PortfolioCategories),
            other => Self::ALL
                .iter()
                .copied()
                .find(|c| c.name() == other)
                .ok_or_else(|| ValidationError::UnknownCollection(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keys_are_prefixed_names() {
        for collection in Collection::ALL {
            assert_eq!(collection.key(), format!("{}{}", KEY_PREFIX, collection.name()));
        }
    }

    #[test]
    fn test_only_content_is_singleton() {
        let singletons: Vec<_> = Collection::ALL
            .iter()
            .filter(|c| c.shape() == Shape::Singleton)
            .collect();
        assert_eq!(singletons, vec![&Collection::Content]);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("services".parse::<Collection>().unwrap(), Collection::Services);
        assert_eq!(
            "dewabars_portfolio_categories".parse::<Collection>().unwrap(),
            Collection::PortfolioCategories
        );
        assert_eq!("categories".parse::<Collection>().unwrap(), Collection::PortfolioCategories);
        assert_eq!("Pricing".parse::<Collection>().unwrap(), Collection::Pricing);
        assert!(matches!(
            "blog".parse::<Collection>(),
            Err(ValidationError::UnknownCollection(_))
        ));
    }

    #[test]
    fn test_needs_seed() {
        assert!(Collection::needs_seed(&json!(null)));
        assert!(Collection::needs_seed(&json!([])));
        assert!(Collection::needs_seed(&json!(false)));
        assert!(!Collection::needs_seed(&json!([{ "id": 1 }])));
        assert!(!Collection::needs_seed(&json!({ "aboutTitle": "x" })));
    }

    #[test]
    fn test_default_payload_shapes_match() {
        for collection in Collection::ALL {
            let payload = collection.default_payload().unwrap();
            match collection.shape() {
                Shape::List => assert!(payload.as_array().is_some_and(|a| !a.is_empty())),
                Shape::Singleton => assert!(payload.is_object()),
            }
        }
    }
}
