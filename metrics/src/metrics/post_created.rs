use serde::{Deserialize, Serialize};

use super::sealed_metric::SealedMetric;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PostCreated {
    pub post_id: i64,
    pub movie_name: String,
    pub user_id: String,
}

impl SealedMetric for PostCreated {
    fn tag(&self) -> String {
        "post_created".to_string()
    }

    fn user_id(&self) -> Option<String> {
        Some(self.user_id.clone())
    }
}
