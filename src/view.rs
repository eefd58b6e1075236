//! Local view of the remote collection.
//!
//! A [`UserList`] is an immutable snapshot. Every change produces a new
//! snapshot; holders of an older one keep seeing the old contents.

use crate::identity::{next_key, resolve_key};
use crate::user::{UserKey, UserRecord};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct UserList {
    records: Rc<[UserRecord]>,
}

impl UserList {
    pub fn new(records: Vec<UserRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UserRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[UserRecord] {
        &self.records
    }

    /// First record whose resolved key is `key`
    pub fn find(&self, key: UserKey) -> Option<&UserRecord> {
        self.records.iter().find(|r| resolve_key(r) == Some(key))
    }

    pub fn contains(&self, key: UserKey) -> bool {
        self.find(key).is_some()
    }

    /// Key a newly created record should be given
    pub fn next_key(&self) -> UserKey {
        next_key(self.as_slice())
    }

    /// New snapshot with `record` at the end
    pub fn appended(&self, record: UserRecord) -> Self {
        let mut records = self.records.to_vec();
        records.push(record);
        Self::new(records)
    }

    /// New snapshot where every record resolving to `key` is replaced by
    /// `record`. Returns the snapshot and how many rows were replaced.
    pub fn replaced(&self, key: UserKey, record: &UserRecord) -> (Self, usize) {
        let mut hits = 0;
        let records: Vec<UserRecord> = self
            .records
            .iter()
            .map(|r| {
                if resolve_key(r) == Some(key) {
                    hits += 1;
                    record.clone()
                } else {
                    r.clone()
                }
            })
            .collect();
        (Self::new(records), hits)
    }

    /// New snapshot without the records resolving to `key`
    pub fn without(&self, key: UserKey) -> Self {
        Self::new(
            self.records
                .iter()
                .filter(|r| resolve_key(r) != Some(key))
                .cloned()
                .collect(),
        )
    }
}

impl Default for UserList {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<'a> IntoIterator for &'a UserList {
    type Item = &'a UserRecord;
    type IntoIter = std::slice::Iter<'a, UserRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
