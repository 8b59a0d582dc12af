//! Application state of the posts page and the reducer that owns every
//! transition of it.
//!
//! Remote calls happen outside; their results come back in as [`Action`]s and
//! follow-up work the reducer asks for goes out as [`Effect`]s.

use std::collections::HashMap;

use types::{Identity, Post, PostId};

use crate::{
    config::PageConfig,
    pagination::{KeyedData, Pagination},
};

/// Progress of the view-increment workflow
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Incrementing(PostId),
    Refreshing(PostId),
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Fetch,
    Mutation,
}

#[derive(Clone, Debug)]
pub enum Action {
    IdentityLoaded(Option<Identity>),
    PostsLoaded(Vec<Post>),
    TopPostsLoaded(Vec<Post>),
    Failed { kind: FailureKind, message: String },
    PageSelected(usize),
    IncrementStarted(PostId),
    ViewsIncremented(PostId),
    PostCreated(Post),
    NewPostClicked,
    LoginModalToggled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    RefreshTopPosts,
    Navigate(String),
}

#[derive(Clone, Debug)]
pub struct AppState {
    posts: Vec<Post>,
    top_posts: Vec<Post>,
    loading: bool,
    error: Option<String>,
    current_page: usize,
    identity: Option<Identity>,
    show_login_modal: bool,
    view_state: ViewState,
    /// Lowest view count each post may show, raised by local increments until
    /// the server reports at least as much
    view_floors: HashMap<PostId, u64>,
    pagination: Pagination,
    top_viewed_limit: usize,
    new_post_route: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&PageConfig::default())
    }
}

impl AppState {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            posts: vec![],
            top_posts: vec![],
            loading: true,
            error: None,
            current_page: 1,
            identity: None,
            show_login_modal: false,
            view_state: ViewState::Idle,
            view_floors: HashMap::new(),
            pagination: Pagination::new(config.posts_per_page),
            top_viewed_limit: config.top_viewed_limit,
            new_post_route: config.new_post_route.clone(),
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn top_posts(&self) -> &[Post] {
        &self.top_posts
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.posts.len())
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn show_login_modal(&self) -> bool {
        self.show_login_modal
    }

    pub fn view_state(&self) -> ViewState {
        self.view_state
    }

    pub fn top_viewed_limit(&self) -> usize {
        self.top_viewed_limit
    }

    /// Posts of the current page
    pub fn current_page_posts(&self) -> Vec<Post> {
        self.pagination.page(&self.posts, self.current_page)
    }

    pub fn reduce(&mut self, action: Action) -> Vec<Effect> {
        log::debug!("reducing {action:?}");
        match action {
            Action::IdentityLoaded(identity) => {
                self.identity = identity;
                vec![]
            }
            Action::PostsLoaded(posts) => self.set_posts(posts),
            Action::TopPostsLoaded(posts) => {
                self.set_top_posts(posts);
                if let ViewState::Refreshing(_) = self.view_state {
                    self.view_state = ViewState::Idle;
                }
                vec![]
            }
            Action::Failed { kind, message } => {
                log::debug!("{kind:?} failure: {message}");
                self.error = Some(message);
                self.loading = false;
                if self.view_state != ViewState::Idle {
                    self.view_state = ViewState::Error;
                }
                vec![]
            }
            Action::PageSelected(page) => {
                if self.pagination.contains_page(page, self.posts.len()) {
                    self.current_page = page;
                }
                vec![]
            }
            Action::IncrementStarted(id) => {
                self.view_state = ViewState::Incrementing(id);
                vec![]
            }
            Action::ViewsIncremented(id) => {
                self.bump_views(id);
                self.view_state = ViewState::Refreshing(id);
                vec![]
            }
            Action::PostCreated(post) => {
                let mut posts = self.posts.clone();
                posts.retain(|p| p.key() != post.key());
                posts.insert(0, post);
                self.set_posts(posts)
            }
            Action::NewPostClicked => {
                if self.identity.is_some() {
                    vec![Effect::Navigate(self.new_post_route.clone())]
                } else {
                    self.show_login_modal = true;
                    vec![]
                }
            }
            Action::LoginModalToggled => {
                self.show_login_modal = !self.show_login_modal;
                vec![]
            }
        }
    }

    fn set_posts(&mut self, mut posts: Vec<Post>) -> Vec<Effect> {
        // floors the server has caught up with are no longer needed
        let settled: Vec<PostId> = posts
            .iter()
            .filter(|p| {
                self.view_floors
                    .get(&p.key())
                    .is_some_and(|floor| p.views >= *floor)
            })
            .map(|p| p.key())
            .collect();
        self.apply_floors(&mut posts);
        for id in settled {
            self.view_floors.remove(&id);
        }

        let first_load = self.loading;
        let changed = self.posts != posts;
        self.posts = posts;
        self.loading = false;
        self.current_page = self
            .pagination
            .clamp_page(self.current_page, self.posts.len());

        if changed || first_load {
            // the increment settles once the sidebar is back
            vec![Effect::RefreshTopPosts]
        } else {
            if let ViewState::Refreshing(_) = self.view_state {
                self.view_state = ViewState::Idle;
            }
            vec![]
        }
    }

    fn set_top_posts(&mut self, mut posts: Vec<Post>) {
        self.apply_floors(&mut posts);
        // stable, so server order holds for ties and untouched rows
        posts.sort_by(|a, b| b.views.cmp(&a.views));
        posts.truncate(self.top_viewed_limit);
        self.top_posts = posts;
    }

    fn apply_floors(&self, posts: &mut [Post]) {
        for post in posts.iter_mut() {
            if let Some(floor) = self.view_floors.get(&post.key()) {
                post.views = post.views.max(*floor);
            }
        }
    }

    fn bump_views(&mut self, id: PostId) {
        let mut floor = self
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.views.saturating_add(1))
            .unwrap_or(0);
        if let Some(post) = self.top_posts.iter_mut().find(|p| p.id == id) {
            post.views = post.views.saturating_add(1);
            floor = floor.max(post.views);
        }
        let entry = self.view_floors.entry(id).or_insert(0);
        *entry = (*entry).max(floor);

        self.top_posts.sort_by(|a, b| b.views.cmp(&a.views));
    }
}
