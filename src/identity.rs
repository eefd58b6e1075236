//! Record identity.
//!
//! A record is identified by its `idx` field when that is present and
//! non-zero, and by its `id` field otherwise. Every place that needs a row key
//! goes through [`resolve_key`].

use crate::user::{UserKey, UserRecord};

/// Resolved key of a record: `idx` if truthy, else `id`
pub fn resolve_key(record: &UserRecord) -> Option<UserKey> {
    match record.idx {
        Some(idx) if idx.get() != 0 => Some(idx),
        _ => record.id,
    }
}

/// Key to allocate for a new record: one past the largest resolved key,
/// or 1 when no record has a key.
pub fn next_key<'a, I>(records: I) -> UserKey
where
    I: IntoIterator<Item = &'a UserRecord>,
{
    records
        .into_iter()
        .filter_map(resolve_key)
        .max()
        .map(|max| UserKey(max.get().saturating_add(1)))
        .unwrap_or(UserKey(1))
}
