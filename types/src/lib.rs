pub mod identity;
pub mod movie;
pub mod post;

pub use identity::{Identity, UserId};
pub use movie::{LikeRecord, MovieId};
pub use post::{NewPost, NewPostError, Post, PostId};
