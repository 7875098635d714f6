use serde::{Deserialize, Serialize};

/// Portfolio category. `value` is the slug derived from `label` and is
/// unique within the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Category {
    pub value: String,
    pub label: String,
}

impl Category {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self {
            value: slugify(label),
            label: label.to_string(),
        }
    }
}

/// Lower-case the label and replace every character outside `[a-z0-9]`
/// with `-`.
pub fn slugify(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect()
}
