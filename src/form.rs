//! The add/edit form: its open/closed state and the uncommitted draft.

use crate::user::{split_name, UserKey, UserPayload, UserRecord};

/// Which form, if any, is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Closed,
    OpenForCreate,
    OpenForEdit(UserKey),
}

impl FormState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Key of the record being edited, if any
    pub fn editing_key(&self) -> Option<UserKey> {
        match self {
            Self::OpenForEdit(key) => Some(*key),
            _ => None,
        }
    }
}

/// A draft input field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    First,
    Last,
    Username,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::First, Field::Last, Field::Username];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "first" | "first_name" | "firstname" => Some(Self::First),
            "last" | "last_name" | "lastname" => Some(Self::Last),
            "username" | "user" => Some(Self::Username),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Username => "username",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::First => "First Name",
            Self::Last => "Last Name",
            Self::Username => "Username",
        }
    }
}

/// Uncommitted form input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub first: String,
    pub last: String,
    pub username: String,
}

impl Draft {
    pub fn new(first: &str, last: &str, username: &str) -> Self {
        Self {
            first: first.to_string(),
            last: last.to_string(),
            username: username.to_string(),
        }
    }

    /// Draft prefilled from an existing record
    pub fn from_record(record: &UserRecord) -> Self {
        let (first, last) = split_name(&record.name);
        Self::new(first, last, &record.username)
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::First => &self.first,
            Field::Last => &self.last,
            Field::Username => &self.username,
        }
    }

    pub fn set(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::First => &mut self.first,
            Field::Last => &mut self.last,
            Field::Username => &mut self.username,
        };
        *slot = value.to_string();
    }

    /// First required field that is blank
    pub fn missing_field(&self) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| self.get(*f).trim().is_empty())
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }

    /// Whether the joined name splits back into the same first and last name
    pub fn name_round_trips(&self) -> bool {
        let name = self.display_name();
        split_name(&name) == (self.first.as_str(), self.last.as_str())
    }

    /// Wire body for create/update carrying `idx`
    pub fn payload(&self, idx: UserKey) -> UserPayload {
        UserPayload {
            idx,
            name: self.display_name(),
            username: self.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_state() {
        assert!(!FormState::Closed.is_open());
        assert!(FormState::OpenForCreate.is_open());
        assert_eq!(FormState::OpenForCreate.editing_key(), None);
        assert_eq!(
            FormState::OpenForEdit(UserKey(4)).editing_key(),
            Some(UserKey(4))
        );
        assert_eq!(FormState::default(), FormState::Closed);
    }

    #[test]
    fn test_field_parsing() {
        assert_eq!(Field::from_str("First"), Some(Field::First));
        assert_eq!(Field::from_str("last_name"), Some(Field::Last));
        assert_eq!(Field::from_str("username"), Some(Field::Username));
        assert_eq!(Field::from_str("email"), None);
    }

    #[test]
    fn test_draft_from_record() {
        let draft = Draft::from_record(&UserRecord::new(1, "Ann Lee", "alee"));
        assert_eq!(draft, Draft::new("Ann", "Lee", "alee"));
    }

    #[test]
    fn test_missing_field_order() {
        let mut draft = Draft::default();
        assert_eq!(draft.missing_field(), Some(Field::First));
        draft.set(Field::First, "Bo");
        draft.set(Field::Username, "bong");
        assert_eq!(draft.missing_field(), Some(Field::Last));
        draft.set(Field::Last, "   ");
        assert_eq!(draft.missing_field(), Some(Field::Last));
        draft.set(Field::Last, "Ng");
        assert_eq!(draft.missing_field(), None);
    }

    #[test]
    fn test_payload_joins_name() {
        let draft = Draft::new("Bo", "Ng", "bong");
        let payload = draft.payload(UserKey(2));
        assert_eq!(payload.idx, UserKey(2));
        assert_eq!(payload.name, "Bo Ng");
        assert_eq!(payload.username, "bong");
    }

    #[test]
    fn test_name_round_trips() {
        assert!(Draft::new("Ann", "Lee", "alee").name_round_trips());
        assert!(Draft::new("Ann", "van Dyke", "avd").name_round_trips());
        assert!(Draft::new("Ann", "", "a").name_round_trips());

        let draft = Draft::new("Mary Ann", "Lee", "mal");
        assert!(!draft.name_round_trips());
        assert_eq!(split_name(&draft.display_name()), ("Mary", "Ann Lee"));
    }
}
