//! Scripted identity service for resolver tests.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::ManualClock;
use crate::clock::Clock;
use crate::contributor::{IdentityService, LookupResponse};

/// Which lookup was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Email(String),
    Username(String),
}

/// A request as seen by the service, with the clock time it arrived at.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub call: ServiceCall,
    pub at: DateTime<Utc>,
}

#[derive(Default)]
struct Script {
    responses: VecDeque<std::result::Result<LookupResponse, String>>,
    calls: Vec<RecordedCall>,
}

/// Identity service answering from a queue of canned responses.
///
/// Clones share the queue and the call log, so a test can keep one handle
/// while the resolver owns another. An exhausted queue answers `NotFound`.
#[derive(Clone)]
pub struct ScriptedIdentityService {
    script: Arc<Mutex<Script>>,
    clock: Arc<ManualClock>,
}

impl ScriptedIdentityService {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            clock,
        }
    }

    /// Queue the next response. `Err` simulates a transport failure.
    pub fn push(&self, response: std::result::Result<LookupResponse, String>) {
        self.script.lock().unwrap().responses.push_back(response);
    }

    /// Every request received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script.lock().unwrap().calls.clone()
    }

    fn answer(&self, call: ServiceCall) -> Result<LookupResponse> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(RecordedCall {
            call,
            at: self.clock.now(),
        });
        match script.responses.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(LookupResponse::NotFound),
        }
    }
}

#[async_trait]
impl IdentityService for ScriptedIdentityService {
    async fn search_by_email(&self, email: &str) -> Result<LookupResponse> {
        self.answer(ServiceCall::Email(email.to_string()))
    }

    async fn fetch_by_username(&self, username: &str) -> Result<LookupResponse> {
        self.answer(ServiceCall::Username(username.to_string()))
    }
}
