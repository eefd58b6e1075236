//! In-memory [`UserStore`] for session tests.
//!
//! Behaves like a mock REST service: created records get a server id of
//! `max(id) + 1` and echo the request body; updates echo the body with the
//! path id; deletes always succeed for known and unknown ids alike.
//!
//! With [`MemoryStore::server_ids`] the store drops the client `idx` from its
//! responses and answers updates with the stored record's own `id`.

use super::{StoreError, UserStore};
use crate::identity::resolve_key;
use crate::user::{UserKey, UserPayload, UserRecord};
use std::cell::{Cell, RefCell};

#[derive(Default)]
pub struct MemoryStore {
    records: RefCell<Vec<UserRecord>>,
    fail_next: RefCell<Option<StoreError>>,
    requests: RefCell<Vec<String>>,
    server_ids: Cell<bool>,
}

impl MemoryStore {
    pub fn with_records(records: Vec<UserRecord>) -> Self {
        Self {
            records: RefCell::new(records),
            ..Self::default()
        }
    }

    /// Ignore the client `idx` and answer with server ids only
    pub fn server_ids(self) -> Self {
        self.server_ids.set(true);
        self
    }

    /// Make the next call fail with `err`
    pub fn fail_next(&self, err: StoreError) {
        *self.fail_next.borrow_mut() = Some(err);
    }

    /// Requests seen so far, as "METHOD path"
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn begin(&self, request: String) -> Result<(), StoreError> {
        self.requests.borrow_mut().push(request);
        match self.fail_next.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn echo(&self, payload: &UserPayload, id: UserKey) -> UserRecord {
        UserRecord {
            id: Some(id),
            idx: (!self.server_ids.get()).then_some(payload.idx),
            name: payload.name.clone(),
            username: payload.username.clone(),
            ..UserRecord::default()
        }
    }
}

impl UserStore for MemoryStore {
    fn fetch_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        self.begin("GET /users".to_string())?;
        Ok(self.records.borrow().clone())
    }

    fn create(&self, payload: &UserPayload) -> Result<UserRecord, StoreError> {
        self.begin("POST /users".to_string())?;
        let mut records = self.records.borrow_mut();
        let id = records
            .iter()
            .filter_map(|r| r.id)
            .max()
            .map_or(UserKey(1), |max| UserKey(max.get() + 1));
        let record = self.echo(payload, id);
        records.push(record.clone());
        Ok(record)
    }

    fn update(&self, key: UserKey, payload: &UserPayload) -> Result<UserRecord, StoreError> {
        self.begin(format!("PUT /users/{}", key))?;
        let mut records = self.records.borrow_mut();
        let id = if self.server_ids.get() {
            records
                .iter()
                .find(|r| resolve_key(r) == Some(key))
                .and_then(|r| r.id)
                .unwrap_or(key)
        } else {
            key
        };
        let record = self.echo(payload, id);
        for existing in records.iter_mut() {
            if resolve_key(existing) == Some(key) {
                *existing = record.clone();
            }
        }
        Ok(record)
    }

    fn delete(&self, key: UserKey) -> Result<(), StoreError> {
        self.begin(format!("DELETE /users/{}", key))?;
        self.records
            .borrow_mut()
            .retain(|r| resolve_key(r) != Some(key));
        Ok(())
    }
}
