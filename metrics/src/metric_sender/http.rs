use url::Url;

use crate::metrics::{Metric, MetricEvent};

/// Posts each event as JSON to an ingest endpoint
#[derive(Clone)]
pub struct HttpMetricTx {
    client: reqwest::Client,
    ingest_url: Url,
}

impl HttpMetricTx {
    pub fn new(ingest_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            ingest_url,
        }
    }
}

impl super::MetricEventTx for HttpMetricTx {
    type Error = reqwest::Error;

    async fn push<M: Metric + Send + 'static>(
        &self,
        ev: MetricEvent<M>,
    ) -> Result<(), Self::Error> {
        self.client
            .post(self.ingest_url.clone())
            .json(&ev)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::{
        metric_sender::{MetricEventTx, MetricTx},
        metrics::{EventSource, MovieLikeToggled},
    };

    #[tokio::test]
    async fn posts_event_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ingest"))
            .and(body_partial_json(json!({
                "source": "LikeButton",
                "tag": "movie_like_toggled",
                "user_id": "u-1",
                "metric": {"movie_id": "m1", "liked": true}
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let tx = HttpMetricTx::new(format!("{}/ingest", server.uri()).parse().unwrap());
        MetricTx::new(EventSource::LikeButton, tx)
            .push(MovieLikeToggled {
                movie_id: "m1".into(),
                user_id: "u-1".into(),
                liked: true,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_event_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let tx = HttpMetricTx::new(server.uri().parse().unwrap());
        let ev = crate::metrics::MetricEvent::new(
            EventSource::LikeButton,
            MovieLikeToggled {
                movie_id: "m1".into(),
                user_id: "u-1".into(),
                liked: false,
            },
        );
        assert!(tx.push(ev).await.is_err());
    }
}
