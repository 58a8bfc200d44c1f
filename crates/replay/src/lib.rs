//! Blink Session Replay
//!
//! Feeds newline-delimited JSON frames through a [`BlinkEngine`] the way the
//! camera loop would, one `update` per frame, and collects the session log.

use std::io::BufRead;

use anyhow::{Context, Result};
use blink_detector::{BlinkEngine, EngineSnapshot, Sample};
use serde::Deserialize;
use session_log::{BlinkSession, SessionLog};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// One recorded frame. `null` ratios mark frames where the face was lost.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameRecord {
    pub ratio_l: Option<f64>,
    pub ratio_r: Option<f64>,
    pub timestamp_ms: u64,
}

impl From<FrameRecord> for Sample {
    fn from(frame: FrameRecord) -> Self {
        Sample::new(
            frame.ratio_l.unwrap_or(f64::NAN),
            frame.ratio_r.unwrap_or(f64::NAN),
            frame.timestamp_ms,
        )
    }
}

/// Result of a replay run
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// Frames read from the input
    pub frames: usize,
    /// State changes observed
    pub transitions: usize,
    /// Engine state after the last frame
    pub snapshot: EngineSnapshot,
    /// Session log, absent if the input had no frames
    pub session: Option<BlinkSession>,
}

/// Parse one input line, `None` for blank lines
pub fn parse_frame(line: &str, line_no: usize) -> Result<Option<Sample>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let frame: FrameRecord = serde_json::from_str(line)
        .with_context(|| format!("malformed frame on line {line_no}"))?;
    Ok(Some(frame.into()))
}

/// Run every frame from `reader` through `engine`
pub fn replay<R: BufRead>(reader: R, engine: &mut BlinkEngine, user_id: Option<&str>) -> Result<ReplayOutcome> {
    let mut frames = 0usize;
    let mut transitions = 0usize;
    let mut session: Option<SessionLog> = None;
    let mut last_ts = 0u64;
    let mut snapshot = engine.snapshot();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("failed to read line {line_no}"))?;
        let Some(sample) = parse_frame(&line, line_no)? else {
            continue;
        };

        if session.is_none() {
            let log = match user_id {
                Some(id) => SessionLog::start(id, sample.timestamp_ms)?,
                None => SessionLog::with_random_id(sample.timestamp_ms)?,
            };
            session = Some(log);
        }

        let previous = snapshot.state;
        snapshot = engine.update(sample);
        frames += 1;
        last_ts = last_ts.max(sample.timestamp_ms);

        if snapshot.state != previous {
            transitions += 1;
        }

        if let Some(log) = session.as_mut() {
            if let Some(at) = log.observe(&snapshot)? {
                debug!(blink = snapshot.blinks, %at, "Blink recorded");
            }
        }
    }

    let session = session.map(|log| log.finish(last_ts)).transpose()?;
    info!(frames, transitions, "Replay finished: {}", snapshot);

    Ok(ReplayOutcome {
        frames,
        transitions,
        snapshot,
        session,
    })
}

/// Initialize logging
pub fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("failed to set tracing subscriber")
}
