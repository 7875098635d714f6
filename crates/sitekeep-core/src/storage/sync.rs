use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// When the local cache last agreed with the remote store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub last_synced: Option<DateTime<Utc>>,
}

impl SyncStatus {
    pub fn synced_at(at: DateTime<Utc>) -> Self {
        Self {
            last_synced: Some(at),
        }
    }

    pub fn age_minutes(&self) -> Option<i64> {
        self.last_synced.map(|at| (Utc::now() - at).num_minutes())
    }

    pub fn age_display(&self) -> String {
        let minutes = match self.age_minutes() {
            Some(m) => m,
            None => return "never".to_string(),
        };

        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1410 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else if minutes < 1440 {
            // 23.5h and up rounds to a full day
            "1d ago".to_string()
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}
