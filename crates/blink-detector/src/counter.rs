//! Blink cycle counting

use serde::{Deserialize, Serialize};

use crate::state::EyeState;

/// One completed open -> closed -> open cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlinkEvent {
    /// Timestamp of the sample that re-opened the eyes (ms)
    pub at_ms: u64,
    /// 1-based count of this blink within the session
    pub blink_number: u64,
}

/// Counts blinks from state transitions.
///
/// A blink is counted when the state re-enters `Open` after having been
/// `Closed` at least once since the previous `Open`. `Open -> Closing -> Open`
/// (a squint) is not a blink, and `Closed -> Opening -> Closed -> Open` is one.
#[derive(Debug, Clone, Default)]
pub struct BlinkCounter {
    blinks: u64,
    last_blink_at: Option<u64>,
    closed_since_open: bool,
}

impl BlinkCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one `previous -> next` step; returns an event when a blink completes
    pub fn observe(&mut self, previous: EyeState, next: EyeState, at_ms: u64) -> Option<BlinkEvent> {
        if previous == next {
            return None;
        }

        match next {
            EyeState::Closed => {
                self.closed_since_open = true;
                None
            }
            EyeState::Open => {
                let completed = self.closed_since_open
                    && !matches!(previous, EyeState::Open | EyeState::Unknown);
                self.closed_since_open = false;

                if !completed {
                    return None;
                }

                self.blinks += 1;
                self.last_blink_at = Some(at_ms);
                Some(BlinkEvent {
                    at_ms,
                    blink_number: self.blinks,
                })
            }
            _ => None,
        }
    }

    pub fn blinks(&self) -> u64 {
        self.blinks
    }

    pub fn last_blink_at(&self) -> Option<u64> {
        self.last_blink_at
    }

    /// Clear count and timestamp (new session)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
