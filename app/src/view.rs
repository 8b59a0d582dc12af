use serde::Serialize;
use types::{Post, PostId};

use crate::state::AppState;

pub const LOADING_MESSAGE: &str = "Loading...";
pub const NO_POSTS_MESSAGE: &str = "No posts yet.";

/// Everything a renderer needs to draw the posts page
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub enum PageView {
    Loading,
    /// the whole page is replaced by the message
    Failed(String),
    Ready(PostsView),
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PostsView {
    pub listing: Section<PostCard>,
    pub most_viewed: Section<TopPostEntry>,
    pub pages: Vec<PageButton>,
    pub login_modal_open: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub enum Section<T> {
    Empty { message: String },
    Items(Vec<T>),
}

impl<T> Section<T> {
    fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Section::Empty {
                message: NO_POSTS_MESSAGE.to_string(),
            }
        } else {
            Section::Items(items)
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Section::Empty { .. } => &[],
            Section::Items(items) => items,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PostCard {
    pub id: PostId,
    pub title: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub link: String,
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.movie_name.clone(),
            date: post.created_at.format("%Y-%m-%d").to_string(),
            link: post.link(),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TopPostEntry {
    pub id: PostId,
    pub title: String,
    pub views: u64,
    pub link: String,
}

impl From<&Post> for TopPostEntry {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.movie_name.clone(),
            views: post.views,
            link: post.link(),
        }
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageButton {
    pub number: usize,
    pub active: bool,
}

pub fn render(state: &AppState) -> PageView {
    if state.loading() {
        return PageView::Loading;
    }
    if let Some(error) = state.error() {
        return PageView::Failed(error.to_string());
    }

    let listing = state.current_page_posts().iter().map(PostCard::from).collect();
    let most_viewed = state.top_posts().iter().map(TopPostEntry::from).collect();
    let pages = (1..=state.total_pages())
        .map(|number| PageButton {
            number,
            active: number == state.current_page(),
        })
        .collect();

    PageView::Ready(PostsView {
        listing: Section::from_items(listing),
        most_viewed: Section::from_items(most_viewed),
        pages,
        login_modal_open: state.show_login_modal(),
    })
}
