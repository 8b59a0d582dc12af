use std::collections::VecDeque;

use data_client::{DataService, PostOrder};
use metrics::{
    metric_sender::{mock::MockMetricEventTx, MetricEventTx, MetricTx},
    metrics::{PostCreated, PostViewed},
};
use types::{NewPost, Post, PostId};

use crate::{
    config::PageConfig,
    state::{Action, AppState, Effect, FailureKind},
    view::{render, PageView},
    Error, Result,
};

/// What the "new post" control leads to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NewPostAction {
    Navigate(String),
    ShowLoginModal,
}

/// Drives [`AppState`] for the posts page: runs the remote calls, feeds their
/// results through the reducer and carries out the effects it asks for.
pub struct PostsPage<S, Tx = MockMetricEventTx> {
    service: S,
    state: AppState,
    metrics: MetricTx<Tx>,
}

impl<S: DataService, Tx: MetricEventTx> PostsPage<S, Tx> {
    pub fn new(service: S, config: &PageConfig, metrics: MetricTx<Tx>) -> Self {
        Self {
            service,
            state: AppState::new(config),
            metrics,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> PageView {
        render(&self.state)
    }

    /// Applies `action` and everything that follows from it. Returns the
    /// navigation the reducer requested, if any.
    pub async fn dispatch(&mut self, action: Action) -> Option<String> {
        let mut queue = VecDeque::from([action]);
        let mut navigation = None;
        while let Some(action) = queue.pop_front() {
            for effect in self.state.reduce(action) {
                match effect {
                    Effect::RefreshTopPosts => queue.push_back(self.fetch_top_posts().await),
                    Effect::Navigate(route) => navigation = Some(route),
                }
            }
        }
        navigation
    }

    async fn fetch_posts(&self) -> Action {
        match self.service.list_posts(PostOrder::CreatedAtDesc, None).await {
            Ok(posts) => Action::PostsLoaded(posts),
            Err(e) => fetch_failed(&e),
        }
    }

    async fn fetch_top_posts(&self) -> Action {
        let limit = self.state.top_viewed_limit();
        match self
            .service
            .list_posts(PostOrder::ViewsDesc, Some(limit))
            .await
        {
            Ok(posts) => Action::TopPostsLoaded(posts),
            Err(e) => fetch_failed(&e),
        }
    }

    /// Loads session, listing and sidebar concurrently
    pub async fn mount(&mut self) {
        let (identity, posts, top_posts) = futures_util::join!(
            self.service.current_identity(),
            self.fetch_posts(),
            self.fetch_top_posts(),
        );

        let identity = identity.unwrap_or_else(|e| {
            log::warn!("failed to load session, continuing anonymously: {e}");
            None
        });
        self.dispatch(Action::IdentityLoaded(identity)).await;
        self.dispatch(top_posts).await;
        self.dispatch(posts).await;
    }

    pub async fn refresh_posts(&mut self) {
        let action = self.fetch_posts().await;
        self.dispatch(action).await;
    }

    pub async fn select_page(&mut self, page: usize) {
        self.dispatch(Action::PageSelected(page)).await;
    }

    /// Counts a view of `post_id`: increments remotely, bumps the sidebar
    /// right away, then reloads the listing (and through it the sidebar).
    pub async fn open_post(&mut self, post_id: PostId) -> Result<()> {
        self.dispatch(Action::IncrementStarted(post_id)).await;

        if let Err(e) = self.service.increment_views(post_id).await {
            let message = e.to_string();
            self.dispatch(Action::Failed {
                kind: FailureKind::Mutation,
                message,
            })
            .await;
            return Err(e.into());
        }
        self.dispatch(Action::ViewsIncremented(post_id)).await;

        let refreshed = self.service.list_posts(PostOrder::CreatedAtDesc, None).await;
        let posts = match refreshed {
            Ok(posts) => posts,
            Err(e) => {
                self.dispatch(fetch_failed(&e)).await;
                return Err(e.into());
            }
        };
        self.dispatch(Action::PostsLoaded(posts)).await;

        if let Some(post) = self.state.posts().iter().find(|p| p.id == post_id) {
            let metric = PostViewed {
                post_id: post.id.0,
                movie_name: post.movie_name.clone(),
                user_id: self.state.identity().map(|i| i.id.to_string()),
                is_logged_in: self.state.identity().is_some(),
                view_count: post.views,
            };
            self.metrics.push_or_warn(metric).await;
        }

        Ok(())
    }

    pub async fn new_post_click(&mut self) -> NewPostAction {
        match self.dispatch(Action::NewPostClicked).await {
            Some(route) => NewPostAction::Navigate(route),
            None => NewPostAction::ShowLoginModal,
        }
    }

    pub async fn toggle_login_modal(&mut self) {
        self.dispatch(Action::LoginModalToggled).await;
    }

    /// Inserts a post and puts it at the top of the listing.
    ///
    /// Failures are returned to the caller and logged, the page itself keeps
    /// showing the current listing.
    pub async fn create_post(&mut self, post: NewPost) -> Result<Post> {
        let Some(user_id) = self.state.identity().map(|i| i.id.to_string()) else {
            return Err(Error::LoginRequired);
        };

        let created = match self.service.insert_post(post).await {
            Ok(created) => created,
            Err(e) => {
                log::warn!("failed to create post: {e}");
                return Err(e.into());
            }
        };
        self.dispatch(Action::PostCreated(created.clone())).await;

        self.metrics
            .push_or_warn(PostCreated {
                post_id: created.id.0,
                movie_name: created.movie_name.clone(),
                user_id,
            })
            .await;

        Ok(created)
    }
}

fn fetch_failed(e: &data_client::Error) -> Action {
    Action::Failed {
        kind: FailureKind::Fetch,
        message: e.to_string(),
    }
}
