// src/poller/status.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Human-readable state of the poller, one transition per cycle phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum Status {
    Idle,
    Checking,
    Sent(usize),
    NoResults,
    Error(String),
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Ok,
    Warn,
    Error,
}

impl Status {
    pub fn level(&self) -> StatusLevel {
        match self {
            Status::Idle | Status::Checking | Status::Sent(_) | Status::Stopped => StatusLevel::Ok,
            Status::NoResults => StatusLevel::Warn,
            Status::Error(_) => StatusLevel::Error,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => f.write_str("idle"),
            Status::Checking => f.write_str("checking"),
            Status::Sent(n) => write!(f, "sent {n} new assets"),
            Status::NoResults => f.write_str("no results"),
            Status::Error(reason) => write!(f, "error: {reason}"),
            Status::Stopped => f.write_str("stopped"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub status: Status,
    pub text: String,
    pub level: StatusLevel,
    pub cycles: u64,
    pub seen_assets: usize,
    pub last_new: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            status: Status::Idle,
            text: Status::Idle.to_string(),
            level: StatusLevel::Ok,
            cycles: 0,
            seen_assets: 0,
            last_new: 0,
            updated_at: None,
        }
    }
}

/// Cheap-to-clone handle shared between the driver and the HTTP surface.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<RwLock<StatusSnapshot>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, status: Status) {
        tracing::debug!(target: "poller", status = %status, "status");
        if let Ok(mut s) = self.inner.write() {
            s.text = status.to_string();
            s.level = status.level();
            s.status = status;
            s.updated_at = Some(Utc::now());
        }
    }

    pub fn cycle_started(&self) {
        if let Ok(mut s) = self.inner.write() {
            s.cycles += 1;
        }
        self.set(Status::Checking);
    }

    pub fn record_snapshot(&self, seen_assets: usize, last_new: usize) {
        if let Ok(mut s) = self.inner.write() {
            s.seen_assets = seen_assets;
            s.last_new = last_new;
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn status(&self) -> Status {
        self.snapshot().status
    }
}
