use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;
use types::{Identity, LikeRecord, MovieId, NewPost, Post, PostId, UserId};

use crate::{DataService, Error, PostOrder, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    ListPosts,
    InsertPost,
    IncrementViews,
    CurrentIdentity,
    IsMovieLiked,
    LikeMovie,
    UnlikeMovie,
}

#[derive(Default)]
struct MockState {
    posts: Vec<Post>,
    identity: Option<Identity>,
    likes: HashSet<LikeRecord>,
    failures: HashMap<Operation, String>,
    drop_increments: bool,
    calls: Vec<Operation>,
}

impl MockState {
    fn record(&mut self, op: Operation) -> Result<()> {
        self.calls.push(op);
        match self.failures.remove(&op) {
            Some(message) => Err(Error::Service {
                status: 500,
                message,
            }),
            None => Ok(()),
        }
    }
}

/// In memory stand-in for the hosted backend.
///
/// Clones share the same tables so a test can keep a handle while the
/// client under test owns another.
#[derive(Clone, Default)]
pub struct MockDataService {
    state: Arc<Mutex<MockState>>,
}

impl MockDataService {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        let svc = Self::default();
        svc.state().posts = posts;
        svc
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn sign_in(&self, identity: Identity) {
        self.state().identity = Some(identity);
    }

    /// The next call of `op` fails with `message`
    pub fn fail_next(&self, op: Operation, message: impl Into<String>) {
        self.state().failures.insert(op, message.into());
    }

    /// Accept increment calls without applying them, as if a concurrent
    /// writer clobbered the counter
    pub fn drop_increments(&self, drop: bool) {
        self.state().drop_increments = drop;
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state().posts.clone()
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, op: Operation) -> usize {
        self.state().calls.iter().filter(|c| **c == op).count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }
}

impl DataService for MockDataService {
    async fn list_posts(&self, order: PostOrder, limit: Option<usize>) -> Result<Vec<Post>> {
        let mut state = self.state();
        state.record(Operation::ListPosts)?;

        let mut posts = state.posts.clone();
        match order {
            PostOrder::CreatedAtDesc => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            PostOrder::ViewsDesc => posts.sort_by(|a, b| b.views.cmp(&a.views)),
        }
        if let Some(limit) = limit {
            posts.truncate(limit);
        }
        Ok(posts)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let mut state = self.state();
        state.record(Operation::InsertPost)?;

        let id = state.posts.iter().map(|p| p.id.0).max().unwrap_or(0) + 1;
        let post = Post {
            id: PostId(id),
            movie_name: post.movie_name().to_string(),
            content: post.content().to_string(),
            views: 0,
            created_at: Utc::now(),
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn increment_views(&self, post_id: PostId) -> Result<()> {
        let mut state = self.state();
        state.record(Operation::IncrementViews)?;

        if state.drop_increments {
            return Ok(());
        }
        match state.posts.iter_mut().find(|p| p.id == post_id) {
            Some(post) => {
                post.views += 1;
                Ok(())
            }
            None => Err(Error::Service {
                status: 404,
                message: format!("post {post_id} not found"),
            }),
        }
    }

    async fn current_identity(&self) -> Result<Option<Identity>> {
        let mut state = self.state();
        state.record(Operation::CurrentIdentity)?;
        Ok(state.identity.clone())
    }

    async fn is_movie_liked(&self, user: &UserId, movie_id: &MovieId) -> Result<bool> {
        let mut state = self.state();
        state.record(Operation::IsMovieLiked)?;
        Ok(state.likes.contains(&LikeRecord {
            user_id: user.clone(),
            movie_id: movie_id.clone(),
        }))
    }

    async fn like_movie(&self, user: &UserId, movie_id: &MovieId) -> Result<()> {
        let mut state = self.state();
        state.record(Operation::LikeMovie)?;
        state.likes.insert(LikeRecord {
            user_id: user.clone(),
            movie_id: movie_id.clone(),
        });
        Ok(())
    }

    async fn unlike_movie(&self, user: &UserId, movie_id: &MovieId) -> Result<()> {
        let mut state = self.state();
        state.record(Operation::UnlikeMovie)?;
        state.likes.remove(&LikeRecord {
            user_id: user.clone(),
            movie_id: movie_id.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn post(id: i64, views: u64, day: u32) -> Post {
        Post {
            id: PostId(id),
            movie_name: format!("movie {id}"),
            content: String::new(),
            views,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn orders_and_limits() {
        let svc = MockDataService::with_posts(vec![post(1, 5, 1), post(2, 9, 2), post(3, 5, 3)]);

        let newest = svc.list_posts(PostOrder::CreatedAtDesc, None).await.unwrap();
        assert_eq!(
            newest.iter().map(|p| p.id.0).collect::<Vec<_>>(),
            vec![3, 2, 1]
        );

        let top = svc.list_posts(PostOrder::ViewsDesc, Some(2)).await.unwrap();
        assert_eq!(top.iter().map(|p| p.id.0).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[tokio::test]
    async fn injected_failure_is_one_shot() {
        let svc = MockDataService::with_posts(vec![post(1, 0, 1)]);
        svc.fail_next(Operation::IncrementViews, "rpc down");

        let err = svc.increment_views(PostId(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "rpc down");
        svc.increment_views(PostId(1)).await.unwrap();
        assert_eq!(svc.posts()[0].views, 1);
        assert_eq!(svc.call_count(Operation::IncrementViews), 2);
    }

    #[tokio::test]
    async fn dropped_increments_leave_counter() {
        let svc = MockDataService::with_posts(vec![post(1, 4, 1)]);
        svc.drop_increments(true);
        svc.increment_views(PostId(1)).await.unwrap();
        assert_eq!(svc.posts()[0].views, 4);
    }
}
