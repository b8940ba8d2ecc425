//! Forum engines: creation, voting, ranking and tree expansion.

pub mod comments;
pub mod expansion;
pub mod posts;
pub mod ranking;
pub mod votes;

pub use comments::CommentService;
pub use expansion::TreeExpander;
pub use posts::PostService;
pub use ranking::RankingEngine;
pub use votes::VoteProcessor;

use chrono::{DateTime, SubsecRound, Utc};

/// Creation timestamp at microsecond precision, the resolution PostgreSQL keeps.
pub(crate) fn creation_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
