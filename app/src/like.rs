use data_client::DataService;
use metrics::{
    metric_sender::{mock::MockMetricEventTx, MetricEventTx, MetricTx},
    metrics::MovieLikeToggled,
};
use query_cache::{QueryClient, QueryKey};
use serde_json::json;
use types::{Identity, MovieId};

use crate::Result;

pub const IS_LIKED_MOVIE_SCOPE: &str = "isLikedMovie";

/// `["isLikedMovie", {"movieId": <id>}]`
///
/// The id is always serialized as a string, so a numeric movie id `42` keys
/// as `{"movieId":"42"}` and never matches a key built from a raw number.
pub fn is_liked_movie_key(movie_id: &MovieId) -> QueryKey {
    QueryKey::new(IS_LIKED_MOVIE_SCOPE).with(json!({ "movieId": movie_id }))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// the relation was written, `liked` is the state that was requested
    Toggled { liked: bool },
    LoginRequired,
}

/// Liked state of one movie for the current session.
///
/// Reads go through the shared [`QueryClient`]; a toggle writes the relation
/// and then invalidates exactly this movie's key, so the next read asks the
/// server again. Nothing is updated optimistically.
pub struct LikeButton<S, Tx = MockMetricEventTx> {
    service: S,
    cache: QueryClient,
    movie_id: MovieId,
    identity: Option<Identity>,
    metrics: MetricTx<Tx>,
}

impl<S: DataService, Tx: MetricEventTx> LikeButton<S, Tx> {
    pub fn new(
        service: S,
        cache: QueryClient,
        movie_id: MovieId,
        identity: Option<Identity>,
        metrics: MetricTx<Tx>,
    ) -> Self {
        Self {
            service,
            cache,
            movie_id,
            identity,
            metrics,
        }
    }

    pub fn movie_id(&self) -> &MovieId {
        &self.movie_id
    }

    pub fn query_key(&self) -> QueryKey {
        is_liked_movie_key(&self.movie_id)
    }

    /// Anonymous sessions never like anything and skip the request
    pub async fn is_liked(&self) -> Result<bool> {
        let Some(identity) = &self.identity else {
            return Ok(false);
        };

        let liked = self
            .cache
            .fetch_query(&self.query_key(), || {
                self.service.is_movie_liked(&identity.id, &self.movie_id)
            })
            .await?;
        Ok(liked)
    }

    pub async fn toggle(&self) -> Result<ToggleOutcome> {
        let Some(identity) = &self.identity else {
            return Ok(ToggleOutcome::LoginRequired);
        };

        let liked = self.is_liked().await?;
        let key = self.query_key();
        if liked {
            self.cache
                .mutate(
                    self.service.unlike_movie(&identity.id, &self.movie_id),
                    &[key],
                )
                .await?;
        } else {
            self.cache
                .mutate(
                    self.service.like_movie(&identity.id, &self.movie_id),
                    &[key],
                )
                .await?;
        }

        self.metrics
            .push_or_warn(MovieLikeToggled {
                movie_id: self.movie_id.to_string(),
                user_id: identity.id.to_string(),
                liked: !liked,
            })
            .await;

        Ok(ToggleOutcome::Toggled { liked: !liked })
    }
}
