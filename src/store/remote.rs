//! HTTP implementation of [`UserStore`] over a REST collection resource.

use super::{StoreError, UserStore};
use crate::config::RemoteConfig;
use crate::user::{UserKey, UserPayload, UserRecord};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub struct RemoteStore {
    base_url: String,
    resource: String,
    agent: ureq::Agent,
}

impl RemoteStore {
    pub fn new(base_url: &str, resource: &str, timeout: Option<Duration>) -> Self {
        let agent = match timeout {
            Some(t) => ureq::AgentBuilder::new().timeout(t).build(),
            None => ureq::Agent::new(),
        };
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            resource: resource.trim_matches('/').to_string(),
            agent,
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Self {
        Self::new(
            &config.base_url,
            &config.resource,
            config.timeout_ms.map(Duration::from_millis),
        )
    }

    /// URL of the whole collection
    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.resource)
    }

    /// URL of a single member of the collection
    pub fn member_url(&self, key: UserKey) -> String {
        format!("{}/{}/{}", self.base_url, self.resource, key)
    }
}

/// Read a response, mapping transport failures and non-success statuses
fn read_body(resp: Result<ureq::Response, ureq::Error>) -> Result<String, StoreError> {
    match resp {
        Ok(r) => r
            .into_string()
            .map_err(|e| StoreError::Network(format!("reading response body: {}", e))),
        Err(ureq::Error::Status(status, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            Err(StoreError::Server { status, body })
        }
        Err(e) => Err(StoreError::Network(e.to_string())),
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, StoreError> {
    serde_json::from_str(body).map_err(|e| StoreError::Parse(e.to_string()))
}

impl UserStore for RemoteStore {
    fn fetch_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        let resp = self.agent.get(&self.collection_url()).call();
        parse_body(&read_body(resp)?)
    }

    fn create(&self, payload: &UserPayload) -> Result<UserRecord, StoreError> {
        let resp = self
            .agent
            .post(&self.collection_url())
            .set("Content-Type", "application/json")
            .send_json(payload);
        parse_body(&read_body(resp)?)
    }

    fn update(&self, key: UserKey, payload: &UserPayload) -> Result<UserRecord, StoreError> {
        let resp = self
            .agent
            .put(&self.member_url(key))
            .set("Content-Type", "application/json")
            .send_json(payload);
        parse_body(&read_body(resp)?)
    }

    fn delete(&self, key: UserKey) -> Result<(), StoreError> {
        let resp = self.agent.delete(&self.member_url(key)).call();
        read_body(resp).map(|_| ())
    }
}
