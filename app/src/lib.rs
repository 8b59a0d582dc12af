pub mod config;
pub mod like;
pub mod page;
pub mod pagination;
pub mod state;
pub mod view;

mod error;

pub use error::*;

use config::{AppConfig, PageConfig};
use data_client::{DataService, RestDataService};
use metrics::{
    metric_sender::{http::HttpMetricTx, mock::MaybeMockMetricEventTx, MetricEventTx, MetricTx},
    metrics::EventSource,
};
use query_cache::QueryClient;
use types::{Identity, MovieId};

use like::LikeButton;
use page::PostsPage;

/// Shared handles of one running client: the data service, the request
/// cache every like button reads through, and the metric sender.
#[derive(Clone)]
pub struct Cinelog<S, Tx> {
    service: S,
    cache: QueryClient,
    metrics: Tx,
    page_config: PageConfig,
}

impl Cinelog<RestDataService, MaybeMockMetricEventTx<HttpMetricTx>> {
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.data_service(),
            config.metric_sender(),
            config.page.clone(),
        )
    }
}

impl<S: DataService + Clone, Tx: MetricEventTx + Clone> Cinelog<S, Tx> {
    pub fn new(service: S, metrics: Tx, page_config: PageConfig) -> Self {
        Self {
            service,
            cache: QueryClient::new(),
            metrics,
            page_config,
        }
    }

    pub fn query_client(&self) -> &QueryClient {
        &self.cache
    }

    pub fn posts_page(&self) -> PostsPage<S, Tx> {
        PostsPage::new(
            self.service.clone(),
            &self.page_config,
            MetricTx::new(EventSource::PostsPage, self.metrics.clone()),
        )
    }

    pub fn like_button(
        &self,
        movie_id: impl Into<MovieId>,
        identity: Option<Identity>,
    ) -> LikeButton<S, Tx> {
        LikeButton::new(
            self.service.clone(),
            self.cache.clone(),
            movie_id.into(),
            identity,
            MetricTx::new(EventSource::LikeButton, self.metrics.clone()),
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, TimeZone, Utc};
    use types::{Post, PostId};

    /// Post created `id` hours into 2024-03-01
    pub fn post(id: i64, views: u64) -> Post {
        Post {
            id: PostId(id),
            movie_name: format!("movie {id}"),
            content: String::new(),
            views,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::hours(id),
        }
    }
}
