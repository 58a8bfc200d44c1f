//! Blink Session Log
//!
//! Consumer-side record of a blink session. Watches engine snapshots,
//! appends one timestamp per counted blink, and serializes the session as
//! `{ id, events, startedAt, endedAt }` for upload by the host application.

use std::io::Write;

use blink_detector::EngineSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Session log error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Timestamp out of range: {0} ms")]
    InvalidTimestamp(u64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Upload payload for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlinkSession {
    pub id: String,
    /// Blink completion times, oldest first
    pub events: Vec<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl BlinkSession {
    /// Session length in seconds
    pub fn duration_secs(&self) -> f64 {
        (self.ended_at - self.started_at).num_milliseconds().max(0) as f64 / 1000.0
    }

    /// Average blink rate over the session
    pub fn blinks_per_minute(&self) -> f64 {
        let minutes = self.duration_secs() / 60.0;
        if minutes <= 0.0 {
            return 0.0;
        }
        self.events.len() as f64 / minutes
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string(self).map_err(|e| SessionError::Serialization(e.to_string()))
    }

    /// Write pretty JSON to any sink
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), SessionError> {
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Convert engine milliseconds into a UTC timestamp
pub fn to_datetime(timestamp_ms: u64) -> Result<DateTime<Utc>, SessionError> {
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or(SessionError::InvalidTimestamp(timestamp_ms))
}

/// Running session log fed from engine snapshots
#[derive(Debug, Clone)]
pub struct SessionLog {
    id: String,
    started_at: DateTime<Utc>,
    events: Vec<DateTime<Utc>>,
    /// Engine blink count already recorded
    seen_blinks: u64,
}

impl SessionLog {
    /// Start a session for a user id
    pub fn start(id: impl Into<String>, started_at_ms: u64) -> Result<Self, SessionError> {
        let id = id.into();
        let started_at = to_datetime(started_at_ms)?;
        info!("Blink session {} started at {}", id, started_at);
        Ok(Self {
            id,
            started_at,
            events: Vec::new(),
            seen_blinks: 0,
        })
    }

    /// Start a session with a random v4 id
    pub fn with_random_id(started_at_ms: u64) -> Result<Self, SessionError> {
        Self::start(Uuid::new_v4().to_string(), started_at_ms)
    }

    /// Record the blink carried by a snapshot.
    ///
    /// Call once per engine `update`. A snapshot only carries the time of its
    /// latest blink, so if the counter advanced by more than one since the
    /// previous call, only that latest blink is recorded and the gap is
    /// logged. Returns the timestamp appended, if any. A counter that went
    /// down (engine reset) re-bases without recording.
    pub fn observe(&mut self, snapshot: &EngineSnapshot) -> Result<Option<DateTime<Utc>>, SessionError> {
        if snapshot.blinks < self.seen_blinks {
            debug!(
                seen = self.seen_blinks,
                now = snapshot.blinks,
                "Blink counter went backwards, re-basing"
            );
            self.seen_blinks = snapshot.blinks;
            return Ok(None);
        }

        if snapshot.blinks == self.seen_blinks {
            return Ok(None);
        }

        let Some(at_ms) = snapshot.last_blink_at else {
            self.seen_blinks = snapshot.blinks;
            return Ok(None);
        };

        let skipped = snapshot.blinks - self.seen_blinks - 1;
        if skipped > 0 {
            warn!(
                skipped,
                blinks = snapshot.blinks,
                "Snapshots were skipped, blink times lost"
            );
        }

        let at = to_datetime(at_ms)?;
        self.seen_blinks = snapshot.blinks;
        self.events.push(at);
        Ok(Some(at))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn events(&self) -> &[DateTime<Utc>] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Close the session
    pub fn finish(self, ended_at_ms: u64) -> Result<BlinkSession, SessionError> {
        let ended_at = to_datetime(ended_at_ms)?.max(self.started_at);
        info!(
            "Blink session {} finished with {} blinks",
            self.id,
            self.events.len()
        );
        Ok(BlinkSession {
            id: self.id,
            events: self.events,
            started_at: self.started_at,
            ended_at,
        })
    }
}
