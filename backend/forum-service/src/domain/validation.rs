//! Request validation shared by post and comment creation.
//!
//! Everything here runs before any store access, so a rejected request
//! never leaves a partial write behind.

use crate::error::{ServiceError, ServiceResult};

/// Outcome of [`exactly_one`]: which of the two mutually exclusive fields
/// was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneOf<A, B> {
    First(A),
    Second(B),
}

/// Accept exactly one of two mutually exclusive fields.
///
/// Used for the media choice on posts and the parent choice on comments.
pub fn exactly_one<A, B>(
    first: (&str, Option<A>),
    second: (&str, Option<B>),
) -> ServiceResult<OneOf<A, B>> {
    match (first.1, second.1) {
        (Some(a), None) => Ok(OneOf::First(a)),
        (None, Some(b)) => Ok(OneOf::Second(b)),
        (Some(_), Some(_)) => Err(ServiceError::InvalidArgument(format!(
            "only one of {} or {} may be set",
            first.0, second.0
        ))),
        (None, None) => Err(ServiceError::InvalidArgument(format!(
            "one of {} or {} is required",
            first.0, second.0
        ))),
    }
}

/// Treat blank strings as absent.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Reject an empty identifier before it reaches the store.
pub fn require_id<'a>(field: &str, value: &'a str) -> ServiceResult<&'a str> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidArgument(format!("{} is required", field)));
    }
    Ok(value)
}

/// Validate a requested result count. Negative is an error, larger than
/// `max` is clamped.
pub fn sanitize_count(count: i64, max: usize) -> ServiceResult<usize> {
    if count < 0 {
        return Err(ServiceError::InvalidArgument(format!(
            "count must be non-negative, got {}",
            count
        )));
    }
    Ok(usize::try_from(count).unwrap_or(usize::MAX).min(max))
}
