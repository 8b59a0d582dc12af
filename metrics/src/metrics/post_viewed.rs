use serde::{Deserialize, Serialize};

use super::sealed_metric::SealedMetric;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PostViewed {
    pub post_id: i64,
    pub movie_name: String,
    pub user_id: Option<String>,
    pub is_logged_in: bool,
    /// view count shown to the user after the increment
    pub view_count: u64,
}

impl SealedMetric for PostViewed {
    fn tag(&self) -> String {
        "post_viewed".to_string()
    }

    fn user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}
