use config_env::EnvConfig;
use config_keys::{
    AccessToken, AnonKey, MetricsUrl, NewPostRoute, PostsPerPage, ServiceUrl, TopViewedLimit,
};
use data_client::RestDataService;
use metrics::metric_sender::{http::HttpMetricTx, mock::MaybeMockMetricEventTx};
use url::Url;

use crate::{Error, Result};

/// Tunables of the posts page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageConfig {
    pub posts_per_page: usize,
    pub top_viewed_limit: usize,
    pub new_post_route: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            posts_per_page: 5,
            top_viewed_limit: 10,
            new_post_route: "/posts/new".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub service_url: Url,
    pub anon_key: String,
    pub access_token: Option<String>,
    pub metrics_url: Option<Url>,
    pub page: PageConfig,
}

impl AppConfig {
    pub fn load(config: &EnvConfig) -> Result<Self> {
        let service_url = Url::parse(&config.get(ServiceUrl)?)?;
        let metrics_url = config
            .get(MetricsUrl)?
            .map(|url| Url::parse(&url))
            .transpose()?;

        let page = PageConfig {
            posts_per_page: config.get(PostsPerPage)?,
            top_viewed_limit: config.get(TopViewedLimit)?,
            new_post_route: config.get(NewPostRoute)?,
        };
        if page.posts_per_page == 0 {
            return Err(Error::InvalidConfig(format!(
                "{} must be at least 1",
                PostsPerPage
            )));
        }

        Ok(Self {
            service_url,
            anon_key: config.get(AnonKey)?,
            access_token: config.get(AccessToken)?,
            metrics_url,
            page,
        })
    }

    pub fn data_service(&self) -> RestDataService {
        RestDataService::new(self.service_url.clone(), self.anon_key.clone())
            .with_access_token(self.access_token.clone())
    }

    /// Metrics go to the configured ingest endpoint, or only to the log without one
    pub fn metric_sender(&self) -> MaybeMockMetricEventTx<HttpMetricTx> {
        match &self.metrics_url {
            Some(url) => MaybeMockMetricEventTx::Real(HttpMetricTx::new(url.clone())),
            None => MaybeMockMetricEventTx::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_with_fallbacks() {
        let env = EnvConfig::from_vars([
            ("CINELOG_SERVICE_URL", "https://demo.example.co"),
            ("CINELOG_ANON_KEY", "anon"),
        ]);
        let config = AppConfig::load(&env).unwrap();
        assert_eq!(config.service_url.as_str(), "https://demo.example.co/");
        assert_eq!(config.access_token, None);
        assert_eq!(config.metrics_url, None);
        assert_eq!(config.page, PageConfig::default());
    }

    #[test]
    fn rejects_zero_page_size() {
        let env = EnvConfig::from_vars([
            ("CINELOG_SERVICE_URL", "https://demo.example.co"),
            ("CINELOG_ANON_KEY", "anon"),
            ("CINELOG_POSTS_PER_PAGE", "0"),
        ]);
        assert!(matches!(
            AppConfig::load(&env),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn missing_service_url() {
        let env = EnvConfig::from_vars([("CINELOG_ANON_KEY", "anon")]);
        assert!(matches!(AppConfig::load(&env), Err(Error::Config(_))));
    }
}
