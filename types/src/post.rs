use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server assigned post identifier
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for PostId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A movie review as stored by the remote service.
///
/// Every field is required, a row missing any of them fails to deserialize.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub movie_name: String,
    /// Body of the review, not shown in listings
    pub content: String,
    pub views: u64,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn link(&self) -> String {
        format!("/posts/{}", self.id)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NewPostError {
    #[error("movie name must not be empty")]
    EmptyMovieName,
    #[error("review content must not be empty")]
    EmptyContent,
}

/// Insert payload for a post, the remaining columns are filled in by the service
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "RawNewPost")]
pub struct NewPost {
    movie_name: String,
    content: String,
}

#[derive(Deserialize)]
struct RawNewPost {
    movie_name: String,
    content: String,
}

impl TryFrom<RawNewPost> for NewPost {
    type Error = NewPostError;

    fn try_from(raw: RawNewPost) -> Result<Self, Self::Error> {
        Self::new(raw.movie_name, raw.content)
    }
}

impl NewPost {
    pub fn new(
        movie_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, NewPostError> {
        let movie_name = movie_name.into();
        let content = content.into();
        if movie_name.trim().is_empty() {
            return Err(NewPostError::EmptyMovieName);
        }
        if content.trim().is_empty() {
            return Err(NewPostError::EmptyContent);
        }
        Ok(Self {
            movie_name,
            content,
        })
    }

    pub fn movie_name(&self) -> &str {
        &self.movie_name
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
