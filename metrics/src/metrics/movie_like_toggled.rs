use serde::{Deserialize, Serialize};

use super::sealed_metric::SealedMetric;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MovieLikeToggled {
    pub movie_id: String,
    pub user_id: String,
    pub liked: bool,
}

impl SealedMetric for MovieLikeToggled {
    fn tag(&self) -> String {
        "movie_like_toggled".to_string()
    }

    fn user_id(&self) -> Option<String> {
        Some(self.user_id.clone())
    }
}
