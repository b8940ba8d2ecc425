use crate::config::ForumConfig;
use crate::domain::IdGenerator;
use crate::repository::ForumStore;
use crate::services::{CommentService, PostService, TreeExpander, VoteProcessor};
use std::sync::Arc;

/// App state shared across gRPC handlers and the HTTP side server
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ForumStore>,
    pub posts: PostService,
    pub comments: CommentService,
    pub votes: VoteProcessor,
    pub expander: TreeExpander,
    pub limits: ForumConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn ForumStore>, ids: Arc<dyn IdGenerator>, limits: ForumConfig) -> Self {
        Self {
            posts: PostService::new(store.clone(), ids.clone()),
            comments: CommentService::new(store.clone(), ids),
            votes: VoteProcessor::new(store.clone()),
            expander: TreeExpander::new(
                store.clone(),
                limits.max_expand_depth,
                limits.max_tree_nodes,
            ),
            store,
            limits,
        }
    }
}
