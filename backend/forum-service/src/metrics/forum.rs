use crate::domain::NodeRef;
use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    /// Applied votes segmented by target kind and direction.
    pub static ref FORUM_VOTES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "forum_votes_total",
        "Applied votes segmented by target kind and direction",
        &["target", "direction"]
    )
    .expect("failed to register forum_votes_total");

    /// Replies whose parent could not be flagged as having replies.
    pub static ref FORUM_HAS_REPLIES_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "forum_has_replies_failures_total",
        "Failed has_replies updates after a successful reply insert"
    )
    .expect("failed to register forum_has_replies_failures_total");
}

pub fn record_vote(target: &NodeRef, upvote: bool) {
    let kind = match target {
        NodeRef::Post(_) => "post",
        NodeRef::Comment(_) => "comment",
    };
    let direction = if upvote { "up" } else { "down" };
    FORUM_VOTES_TOTAL.with_label_values(&[kind, direction]).inc();
}

pub fn record_has_replies_failure() {
    FORUM_HAS_REPLIES_FAILURES_TOTAL.inc();
}
