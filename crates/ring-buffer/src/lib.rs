//! Fixed-Capacity Ring Buffer
//!
//! Bounded FIFO history used by the calibration window. Pushing into a full
//! buffer evicts the oldest entry, so the buffer always holds the most recent
//! `capacity` values.

mod buffer;

pub use buffer::{Iter, RingBuffer};
