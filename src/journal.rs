//! Append-only JSONL journal of what a session did against the remote store.

use crate::store::StoreError;
use crate::user::{UserKey, UserRecord};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct Journal {
    pub path: PathBuf,
    session_id: String,
    base_url: String,
    file: File,
}

#[derive(Serialize)]
struct Event<'a> {
    ts: DateTime<Utc>,
    session_id: &'a str,
    base_url: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    #[serde(flatten)]
    data: serde_json::Value,
}

impl Journal {
    /// Open `{dir}/{session_id}.jsonl`, creating the directory if needed
    pub fn create(dir: &Path, session_id: &str, base_url: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating journal dir {}", dir.display()))?;
        let path = dir.join(format!("{}.jsonl", session_id));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening journal {}", path.display()))?;

        Ok(Self {
            path,
            session_id: session_id.to_string(),
            base_url: base_url.to_string(),
            file,
        })
    }

    pub fn log(&mut self, event_type: &str, data: serde_json::Value) -> Result<()> {
        let event = Event {
            ts: Utc::now(),
            session_id: &self.session_id,
            base_url: &self.base_url,
            event_type,
            data,
        };
        let line = serde_json::to_string(&event)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn session_start(&mut self, resource: &str) -> Result<()> {
        self.log(
            "session_start",
            serde_json::json!({ "resource": resource }),
        )
    }

    pub fn fetch_ok(&mut self, count: usize) -> Result<()> {
        self.log("fetch_ok", serde_json::json!({ "count": count }))
    }

    /// Log a created record with the key the client asked for
    pub fn user_created(&mut self, requested: UserKey, record: &UserRecord) -> Result<()> {
        self.log(
            "user_created",
            serde_json::json!({ "requested_key": requested, "record": record }),
        )
    }

    pub fn user_updated(
        &mut self,
        key: UserKey,
        record: &UserRecord,
        replaced: usize,
    ) -> Result<()> {
        self.log(
            "user_updated",
            serde_json::json!({ "key": key, "record": record, "replaced": replaced }),
        )
    }

    pub fn user_deleted(&mut self, key: UserKey) -> Result<()> {
        self.log("user_deleted", serde_json::json!({ "key": key }))
    }

    /// Log a store call that failed
    pub fn request_failed(
        &mut self,
        op: &str,
        key: Option<UserKey>,
        error: &StoreError,
    ) -> Result<()> {
        self.log(
            "request_failed",
            serde_json::json!({
                "op": op,
                "key": key,
                "kind": error.kind(),
                "error": error.to_string(),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_events(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_events_are_appended_as_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal =
            Journal::create(&dir.path().join("sessions"), "abc", "http://x.test").unwrap();

        journal.session_start("users").unwrap();
        journal.fetch_ok(10).unwrap();
        journal
            .user_created(UserKey(11), &UserRecord::new(11, "Bo Ng", "bong"))
            .unwrap();
        journal.user_deleted(UserKey(3)).unwrap();

        let events = read_events(&journal.path);
        assert_eq!(events.len(), 4);
        assert_eq!(events[0]["type"], "session_start");
        assert_eq!(events[0]["session_id"], "abc");
        assert_eq!(events[0]["base_url"], "http://x.test");
        assert_eq!(events[1]["count"], 10);
        assert_eq!(events[2]["requested_key"], 11);
        assert_eq!(events[2]["record"]["username"], "bong");
        assert_eq!(events[3]["key"], 3);
        assert!(events[3]["ts"].is_string());
    }

    #[test]
    fn test_request_failed_event() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = Journal::create(dir.path(), "s1", "http://x.test").unwrap();

        journal
            .request_failed(
                "update",
                Some(UserKey(2)),
                &StoreError::Server {
                    status: 500,
                    body: String::new(),
                },
            )
            .unwrap();
        journal
            .request_failed("fetch_all", None, &StoreError::Network("refused".into()))
            .unwrap();

        let events = read_events(&journal.path);
        assert_eq!(events[0]["op"], "update");
        assert_eq!(events[0]["kind"], "server");
        assert_eq!(events[0]["key"], 2);
        assert!(events[1]["key"].is_null());
        assert_eq!(events[1]["error"], "request failed: refused");
    }
}
