//! In-memory stand-ins for the model and helpdesk services.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::{AppConfig, BackendCredentials};
use crate::context::AppContext;
use crate::domain::conversation::Transcript;
use crate::domain::ticket::Ticket;
use crate::error::{AppError, AppResult};
use crate::services::{HelpdeskRecord, IssueTrackerService, LanguageModelService, SessionUid};

pub const BACKEND_ENV: &[(&str, &str)] = &[
    ("ODOO_URL", "https://odoo.example.com"),
    ("ODOO_DB", "prod"),
    ("ODOO_USERNAME", "bot@example.com"),
    ("ODOO_PASSWORD", "secret"),
];

pub fn context_with(
    env: &[(&str, &str)],
    model: ScriptedModel,
    tracker: FakeIssueTracker,
) -> AppContext {
    let vars: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
    AppContext::new(config, Arc::new(tracker), Arc::new(model))
}

/// Replays canned replies in order and records what each turn was sent.
#[derive(Clone, Default)]
pub struct ScriptedModel {
    replies: Arc<Mutex<VecDeque<String>>>,
    seen: Arc<Mutex<Vec<(Ticket, Transcript)>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().map(String::from).collect())),
            seen: Arc::default(),
        }
    }

    pub fn seen(&self) -> Vec<(Ticket, Transcript)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModelService for ScriptedModel {
    async fn complete_turn(
        &self,
        _instructions: &str,
        snapshot: &Ticket,
        transcript: &Transcript,
    ) -> AppResult<String> {
        self.seen
            .lock()
            .unwrap()
            .push((snapshot.clone(), transcript.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::LanguageModel("connection refused".to_string()))
    }
}

#[derive(Clone, Copy)]
enum TrackerMode {
    Succeed { uid: u64, id: u64 },
    FailLogin,
    FailCreate { uid: u64 },
}

#[derive(Clone)]
pub struct FakeIssueTracker {
    mode: TrackerMode,
    calls: Arc<Mutex<usize>>,
    created: Arc<Mutex<Vec<(u64, HelpdeskRecord)>>>,
}

impl FakeIssueTracker {
    fn with_mode(mode: TrackerMode) -> Self {
        Self {
            mode,
            calls: Arc::default(),
            created: Arc::default(),
        }
    }

    pub fn succeeding(uid: u64, id: u64) -> Self {
        Self::with_mode(TrackerMode::Succeed { uid, id })
    }

    pub fn failing_login() -> Self {
        Self::with_mode(TrackerMode::FailLogin)
    }

    pub fn failing_create(uid: u64) -> Self {
        Self::with_mode(TrackerMode::FailCreate { uid })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn created(&self) -> Vec<(u64, HelpdeskRecord)> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueTrackerService for FakeIssueTracker {
    async fn authenticate(&self, _credentials: &BackendCredentials) -> AppResult<SessionUid> {
        *self.calls.lock().unwrap() += 1;
        match self.mode {
            TrackerMode::Succeed { uid, .. } | TrackerMode::FailCreate { uid } => {
                Ok(SessionUid(uid))
            }
            TrackerMode::FailLogin => Err(AppError::IssueTracker(
                "authentication failed, uid is empty".to_string(),
            )),
        }
    }

    async fn create_ticket(
        &self,
        _credentials: &BackendCredentials,
        uid: SessionUid,
        record: &HelpdeskRecord,
    ) -> AppResult<u64> {
        *self.calls.lock().unwrap() += 1;
        match self.mode {
            TrackerMode::Succeed { id, .. } => {
                self.created.lock().unwrap().push((uid.0, record.clone()));
                Ok(id)
            }
            _ => Err(AppError::IssueTracker(
                "no ticket id returned; raw response: {\"result\":false}".to_string(),
            )),
        }
    }
}
