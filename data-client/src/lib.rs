pub mod mock;
pub mod rest;

mod error;

use std::future::Future;

pub use error::*;
pub use mock::{MockDataService, Operation};
pub use rest::RestDataService;
use types::{Identity, MovieId, NewPost, Post, PostId, UserId};

/// Server side ordering of the posts table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostOrder {
    /// newest first
    CreatedAtDesc,
    /// most viewed first
    ViewsDesc,
}

impl PostOrder {
    pub fn column(&self) -> &'static str {
        match self {
            PostOrder::CreatedAtDesc => "created_at",
            PostOrder::ViewsDesc => "views",
        }
    }
}

/// Remote store, auth and RPC backend the client runs against.
///
/// Every method is a single request; nothing is retried or cached here.
pub trait DataService: Send + Sync {
    fn list_posts(
        &self,
        order: PostOrder,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<Post>>> + Send;

    fn insert_post(&self, post: NewPost) -> impl Future<Output = Result<Post>> + Send;

    /// Atomically bumps the view counter of a post by one
    fn increment_views(&self, post_id: PostId) -> impl Future<Output = Result<()>> + Send;

    /// Signed in user, `None` for anonymous sessions
    fn current_identity(&self) -> impl Future<Output = Result<Option<Identity>>> + Send;

    fn is_movie_liked(
        &self,
        user: &UserId,
        movie_id: &MovieId,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn like_movie(
        &self,
        user: &UserId,
        movie_id: &MovieId,
    ) -> impl Future<Output = Result<()>> + Send;

    fn unlike_movie(
        &self,
        user: &UserId,
        movie_id: &MovieId,
    ) -> impl Future<Output = Result<()>> + Send;
}
