use serde::{Deserialize, Serialize};

/// Site text stored as a single object rather than a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase", default)]
pub struct SiteContent {
    pub home_hero_title: String,
    pub home_hero_subtitle: String,
    pub home_hero_image: String,
    pub home_stats_count: String,
    pub about_title: String,
    pub about_text: String,
    pub stat1_num: String,
    pub stat1_label: String,
    pub stat2_num: String,
    pub stat2_label: String,
    pub stat3_num: String,
    pub stat3_label: String,
    pub stat4_num: String,
    pub stat4_label: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub contact_address: String,
}
