//! Session: drives the store from form actions and keeps the local view in
//! step with what the store answered.
//!
//! State only changes after a store call succeeds. A failed submit leaves the
//! form open with its draft and an inline error.

use crate::form::{Draft, Field, FormState};
use crate::identity::resolve_key;
use crate::store::{StoreError, UserStore};
use crate::user::{UserKey, UserRecord};
use crate::view::UserList;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Submit or field edit with no form open
    FormClosed,
    /// `add` while a form is already open
    FormAlreadyOpen(FormState),
    MissingField(Field),
    UnknownKey(UserKey),
    Store(StoreError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FormClosed => write!(f, "no form is open (use 'add' or 'edit <key>')"),
            Self::FormAlreadyOpen(FormState::OpenForEdit(key)) => {
                write!(f, "already editing user {}", key)
            }
            Self::FormAlreadyOpen(_) => write!(f, "a form is already open"),
            Self::MissingField(field) => write!(f, "{} is required", field.label()),
            Self::UnknownKey(key) => write!(f, "no user with key {}", key),
            Self::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// What a successful submit did
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    Created {
        /// Key the client allocated and sent as `idx`
        requested: UserKey,
        record: UserRecord,
    },
    Updated {
        key: UserKey,
        record: UserRecord,
        /// Rows replaced in the local view; zero if the row vanished meanwhile
        replaced: usize,
    },
}

impl Submitted {
    pub fn record(&self) -> &UserRecord {
        match self {
            Self::Created { record, .. } | Self::Updated { record, .. } => record,
        }
    }

    /// Key the record is listed under after reconciliation
    pub fn resolved_key(&self) -> Option<UserKey> {
        resolve_key(self.record())
    }
}

pub struct Session<S: UserStore> {
    store: S,
    users: UserList,
    form: FormState,
    draft: Draft,
    last_error: Option<String>,
}

impl<S: UserStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            users: UserList::default(),
            form: FormState::Closed,
            draft: Draft::default(),
            last_error: None,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current snapshot of the collection
    pub fn users(&self) -> &UserList {
        &self.users
    }

    pub fn form(&self) -> FormState {
        self.form
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Error from the last failed submit, shown under the form
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the view with the full remote collection. On failure the
    /// previous snapshot is kept.
    pub fn load(&mut self) -> Result<usize, SessionError> {
        let records = self.store.fetch_all()?;
        self.users = UserList::new(records);
        Ok(self.users.len())
    }

    pub fn open_create(&mut self) -> Result<(), SessionError> {
        if self.form.is_open() {
            return Err(SessionError::FormAlreadyOpen(self.form));
        }
        self.form = FormState::OpenForCreate;
        self.draft = Draft::default();
        self.last_error = None;
        Ok(())
    }

    /// Open the form on an existing row, abandoning any current draft
    pub fn open_edit(&mut self, key: UserKey) -> Result<&Draft, SessionError> {
        let record = self.users.find(key).ok_or(SessionError::UnknownKey(key))?;
        self.draft = Draft::from_record(record);
        self.form = FormState::OpenForEdit(key);
        self.last_error = None;
        Ok(&self.draft)
    }

    pub fn set_field(&mut self, field: Field, value: &str) -> Result<(), SessionError> {
        if !self.form.is_open() {
            return Err(SessionError::FormClosed);
        }
        self.draft.set(field, value);
        Ok(())
    }

    /// Send the draft to the store. The form closes only once the store has
    /// accepted the write.
    pub fn submit(&mut self) -> Result<Submitted, SessionError> {
        if !self.form.is_open() {
            return Err(SessionError::FormClosed);
        }
        if let Some(field) = self.draft.missing_field() {
            let err = SessionError::MissingField(field);
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        let outcome = match self.form {
            FormState::OpenForEdit(key) => self.submit_update(key),
            _ => self.submit_create(),
        };

        match outcome {
            Ok(submitted) => {
                self.form = FormState::Closed;
                self.draft = Draft::default();
                self.last_error = None;
                Ok(submitted)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn submit_create(&mut self) -> Result<Submitted, SessionError> {
        let requested = self.users.next_key();
        let response = self.store.create(&self.draft.payload(requested))?;
        let record = reconcile(response, requested);
        self.users = self.users.appended(record.clone());
        Ok(Submitted::Created { requested, record })
    }

    fn submit_update(&mut self, key: UserKey) -> Result<Submitted, SessionError> {
        let response = self.store.update(key, &self.draft.payload(key))?;
        let record = reconcile(response, key);
        let (users, replaced) = self.users.replaced(key, &record);
        self.users = users;
        Ok(Submitted::Updated {
            key,
            record,
            replaced,
        })
    }

    /// Delete the row resolving to `key`. The view is only filtered once the
    /// store confirms.
    pub fn delete(&mut self, key: UserKey) -> Result<(), SessionError> {
        if !self.users.contains(key) {
            return Err(SessionError::UnknownKey(key));
        }
        self.store.delete(key)?;
        self.users = self.users.without(key);
        Ok(())
    }
}

/// Trust the server's identity when its response resolves to a key;
/// otherwise keep the key the client used.
fn reconcile(mut response: UserRecord, client_key: UserKey) -> UserRecord {
    if resolve_key(&response).is_none() {
        response.idx = Some(client_key);
    }
    response
}
