//! Eye state and the hysteresis classifier

use std::fmt;

use calibration::Thresholds;
use serde::{Deserialize, Serialize};

/// Discrete eye state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EyeState {
    /// Before the first calibration; never re-entered until reset
    #[default]
    Unknown,
    Open,
    Closing,
    Closed,
    Opening,
}

impl EyeState {
    /// Whether `next` is a legal successor of `self`
    pub fn can_transition_to(self, next: EyeState) -> bool {
        use EyeState::*;
        matches!(
            (self, next),
            (Unknown, Open)
                | (Open, Closing)
                | (Open, Closed)
                | (Closing, Closed)
                | (Closing, Open)
                | (Closed, Opening)
                | (Closed, Open)
                | (Opening, Open)
                | (Opening, Closed)
        )
    }

    /// Eyes at least partly shut (HUD "blinking" indicator)
    pub fn is_blinking(self) -> bool {
        matches!(self, EyeState::Closing | EyeState::Closed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EyeState::Unknown => "UNKNOWN",
            EyeState::Open => "OPEN",
            EyeState::Closing => "CLOSING",
            EyeState::Closed => "CLOSED",
            EyeState::Opening => "OPENING",
        }
    }
}

impl fmt::Display for EyeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: EyeState,
    pub to: EyeState,
    /// Timestamp of the sample that caused it (ms)
    pub at_ms: u64,
}

/// Next state for one averaged ratio.
///
/// `seen_fully_open` is whether the signal has reached `open` since the
/// current `Open` period began; `Open -> Closing` needs that downward
/// crossing of the open threshold, so in-band jitter after entering `Open`
/// does not move the state. A degenerate band always yields `Open`.
pub fn classify(
    avg_ratio: f64,
    thresholds: Thresholds,
    current: EyeState,
    seen_fully_open: bool,
) -> EyeState {
    if thresholds.is_degenerate() {
        return EyeState::Open;
    }

    let Thresholds { close, open } = thresholds;

    match current {
        EyeState::Unknown => EyeState::Open,
        EyeState::Open => {
            if avg_ratio < close {
                EyeState::Closed
            } else if avg_ratio < open && seen_fully_open {
                EyeState::Closing
            } else {
                EyeState::Open
            }
        }
        EyeState::Closing => {
            if avg_ratio < close {
                EyeState::Closed
            } else if avg_ratio >= open {
                EyeState::Open
            } else {
                EyeState::Closing
            }
        }
        EyeState::Closed => {
            if avg_ratio >= open {
                EyeState::Open
            } else if avg_ratio > close {
                EyeState::Opening
            } else {
                EyeState::Closed
            }
        }
        EyeState::Opening => {
            if avg_ratio >= open {
                EyeState::Open
            } else if avg_ratio < close {
                EyeState::Closed
            } else {
                EyeState::Opening
            }
        }
    }
}

/// Stateful wrapper around [`classify`]
#[derive(Debug, Clone, Default)]
pub struct HysteresisMachine {
    state: EyeState,
    seen_fully_open: bool,
}

impl HysteresisMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EyeState {
        self.state
    }

    /// Advance on one sample, returning the transition if the state changed
    pub fn step(&mut self, avg_ratio: f64, thresholds: Thresholds, at_ms: u64) -> Option<Transition> {
        let previous = self.state;
        let next = classify(avg_ratio, thresholds, previous, self.seen_fully_open);

        let reached_open = !thresholds.is_degenerate() && avg_ratio >= thresholds.open;
        self.seen_fully_open = next == EyeState::Open
            && ((previous == EyeState::Open && self.seen_fully_open) || reached_open);

        if next == previous {
            return None;
        }

        debug_assert!(previous.can_transition_to(next), "{previous} -> {next}");
        self.state = next;
        Some(Transition {
            from: previous,
            to: next,
            at_ms,
        })
    }

    /// Back to `Unknown`
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn band() -> Thresholds {
        Thresholds::new(0.3, 0.6)
    }

    /// Machine already in Open with a fully-open baseline
    fn open_machine() -> HysteresisMachine {
        let mut machine = HysteresisMachine::new();
        machine.step(0.9, band(), 0);
        assert_eq!(machine.state(), EyeState::Open);
        machine
    }

    fn run(machine: &mut HysteresisMachine, ratios: &[f64]) -> Vec<EyeState> {
        ratios
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                machine.step(r, band(), i as u64 + 1);
                machine.state()
            })
            .collect()
    }

    #[test]
    fn test_unknown_leaves_to_open() {
        let mut machine = HysteresisMachine::new();
        assert_eq!(machine.state(), EyeState::Unknown);
        let t = machine.step(0.1, band(), 5).unwrap();
        assert_eq!(t, Transition { from: EyeState::Unknown, to: EyeState::Open, at_ms: 5 });
    }

    #[test]
    fn test_full_slow_cycle() {
        let mut machine = open_machine();
        let states = run(&mut machine, &[0.5, 0.2, 0.4, 0.7]);
        assert_eq!(
            states,
            vec![EyeState::Closing, EyeState::Closed, EyeState::Opening, EyeState::Open]
        );
    }

    #[test]
    fn test_fast_transitions_skip_intermediates() {
        let mut machine = open_machine();
        assert_eq!(run(&mut machine, &[0.1, 0.9]), vec![EyeState::Closed, EyeState::Open]);
    }

    #[test]
    fn test_bounces() {
        let mut machine = open_machine();
        // Aborted closing
        assert_eq!(run(&mut machine, &[0.5, 0.6]), vec![EyeState::Closing, EyeState::Open]);
        // Aborted opening
        assert_eq!(
            run(&mut machine, &[0.1, 0.5, 0.1]),
            vec![EyeState::Closed, EyeState::Opening, EyeState::Closed]
        );
    }

    #[test]
    fn test_threshold_boundaries() {
        let t = band();
        // Exactly at close is not below it
        assert_eq!(classify(0.3, t, EyeState::Closing, false), EyeState::Closing);
        assert_eq!(classify(0.3, t, EyeState::Closed, false), EyeState::Closed);
        // Exactly at open counts as open
        assert_eq!(classify(0.6, t, EyeState::Opening, false), EyeState::Open);
        assert_eq!(classify(0.6, t, EyeState::Closed, false), EyeState::Open);
    }

    #[test]
    fn test_degenerate_forces_open() {
        let flat = Thresholds::new(0.25, 0.25);
        for state in [EyeState::Closed, EyeState::Closing, EyeState::Opening, EyeState::Unknown] {
            assert_eq!(classify(0.0, flat, state, true), EyeState::Open);
        }
    }

    #[test]
    fn test_in_band_after_entering_open_holds() {
        let mut machine = HysteresisMachine::new();
        // Calibrated while the signal sits inside the band
        machine.step(0.45, band(), 0);
        assert_eq!(run(&mut machine, &[0.5, 0.35, 0.55]), vec![EyeState::Open; 3]);
        // Once fully open, dropping into the band is a closing
        assert_eq!(run(&mut machine, &[0.8, 0.5]), vec![EyeState::Open, EyeState::Closing]);
    }

    #[test]
    fn test_reset() {
        let mut machine = open_machine();
        machine.step(0.1, band(), 1);
        machine.reset();
        assert_eq!(machine.state(), EyeState::Unknown);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(EyeState::Closing.to_string(), "CLOSING");
        assert_eq!(serde_json::to_string(&EyeState::Opening).unwrap(), "\"OPENING\"");
        assert!(EyeState::Closed.is_blinking());
        assert!(!EyeState::Opening.is_blinking());
    }

    proptest! {
        #[test]
        fn in_band_noise_never_leaves_open(
            ratios in proptest::collection::vec(0.3001f64..0.5999, 1..200),
        ) {
            let mut machine = HysteresisMachine::new();
            machine.step(ratios[0], band(), 0);
            for (i, r) in ratios.iter().enumerate() {
                prop_assert_eq!(machine.step(*r, band(), i as u64), None);
                prop_assert_eq!(machine.state(), EyeState::Open);
            }
        }

        #[test]
        fn only_legal_edges(ratios in proptest::collection::vec(0.0f64..1.0, 1..300)) {
            let mut machine = HysteresisMachine::new();
            for (i, r) in ratios.iter().enumerate() {
                if let Some(t) = machine.step(*r, band(), i as u64) {
                    prop_assert!(t.from.can_transition_to(t.to));
                    prop_assert_ne!(t.to, EyeState::Unknown);
                }
            }
        }
    }
}
