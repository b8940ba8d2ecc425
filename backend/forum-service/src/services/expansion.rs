//! Bounded, ranked expansion of comment trees.
//!
//! Expansion walks the tree one level at a time: every frontier node's
//! children are fetched from the index, ranked, and cut to `count`. Nodes are
//! collected in an arena and assembled into [`CommentTree`]s at the end.

use super::ranking::RankingEngine;
use crate::domain::{Comment, CommentTree, NodeRef};
use crate::error::ServiceResult;
use crate::repository::ForumStore;
use std::sync::Arc;
use tracing::debug;

struct ArenaNode {
    comment: Comment,
    children: Vec<usize>,
}

#[derive(Clone)]
pub struct TreeExpander {
    store: Arc<dyn ForumStore>,
    ranking: RankingEngine,
    max_depth: usize,
    max_nodes: usize,
}

impl TreeExpander {
    pub fn new(store: Arc<dyn ForumStore>, max_depth: usize, max_nodes: usize) -> Self {
        Self {
            ranking: RankingEngine::new(store.clone()),
            store,
            max_depth: max_depth.max(1),
            max_nodes,
        }
    }

    /// Top `count` direct children of `root`.
    ///
    /// `NotFound` if `root` does not exist; an empty list if it has no children.
    pub async fn top_children(&self, root: &NodeRef, count: usize) -> ServiceResult<Vec<Comment>> {
        self.ensure_exists(root).await?;
        let child_ids = self.store.children_of(root).await?;
        self.ranking.rank(&child_ids, count).await
    }

    /// Top `count` children of `root`, each carrying its own top `count`
    /// children and nothing deeper.
    pub async fn expand_branch(&self, root: &NodeRef, count: usize) -> ServiceResult<Vec<CommentTree>> {
        let budget = count.saturating_add(count.saturating_mul(count));
        self.expand_levels(root, count, 2, budget).await
    }

    /// Expand `depth` levels below `root`.
    ///
    /// `depth` is clamped to `[1, max_depth]`. Level `k` holds at most
    /// `count^k` nodes and the whole result at most `max_nodes`.
    pub async fn expand_tree(
        &self,
        root: &NodeRef,
        count: usize,
        depth: usize,
    ) -> ServiceResult<Vec<CommentTree>> {
        let depth = depth.clamp(1, self.max_depth);
        let budget = level_sum(count, depth).min(self.max_nodes);
        self.expand_levels(root, count, depth, budget).await
    }

    async fn expand_levels(
        &self,
        root: &NodeRef,
        count: usize,
        depth: usize,
        budget: usize,
    ) -> ServiceResult<Vec<CommentTree>> {
        let mut remaining = budget;
        let top = self.top_children(root, count.min(remaining)).await?;
        remaining -= top.len();

        let mut arena: Vec<ArenaNode> = Vec::with_capacity(top.len());
        let mut roots = Vec::with_capacity(top.len());
        for comment in top {
            roots.push(arena.len());
            arena.push(ArenaNode {
                comment,
                children: Vec::new(),
            });
        }

        let mut frontier = roots.clone();
        for _ in 1..depth {
            let mut next = Vec::new();
            for &parent in &frontier {
                if remaining == 0 {
                    break;
                }
                let parent_ref = NodeRef::Comment(arena[parent].comment.id.clone());
                let child_ids = self.store.children_of(&parent_ref).await?;
                let ranked = self.ranking.rank(&child_ids, count.min(remaining)).await?;
                remaining -= ranked.len();

                for comment in ranked {
                    let index = arena.len();
                    arena.push(ArenaNode {
                        comment,
                        children: Vec::new(),
                    });
                    arena[parent].children.push(index);
                    next.push(index);
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        debug!(%root, count, depth, nodes = arena.len(), "Expanded comment tree");
        Ok(assemble(arena, &roots))
    }

    async fn ensure_exists(&self, node: &NodeRef) -> ServiceResult<()> {
        match node {
            NodeRef::Post(id) => self.store.get_post(id).await.map(|_| ()),
            NodeRef::Comment(id) => self.store.get_comment(id).await.map(|_| ()),
        }
    }
}

/// `count + count^2 + ... + count^depth`, saturating.
fn level_sum(count: usize, depth: usize) -> usize {
    let mut total = 0usize;
    let mut level = 1usize;
    for _ in 0..depth {
        level = level.saturating_mul(count);
        total = total.saturating_add(level);
    }
    total
}

/// Children always sit after their parent in the arena, so a reverse pass
/// builds every subtree before its parent needs it.
fn assemble(arena: Vec<ArenaNode>, roots: &[usize]) -> Vec<CommentTree> {
    let mut built: Vec<Option<CommentTree>> = Vec::with_capacity(arena.len());
    built.resize_with(arena.len(), || None);

    for (index, node) in arena.into_iter().enumerate().rev() {
        let replies = node
            .children
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[index] = Some(CommentTree {
            comment: node.comment,
            replies,
        });
    }

    roots.iter().filter_map(|&root| built[root].take()).collect()
}
