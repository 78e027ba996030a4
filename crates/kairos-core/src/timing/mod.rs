// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Frame-timing contracts between the host's graphics stack and the
//! resolution controller.
//!
//! The controller never talks to a GPU directly. Instead, the host implements
//! [`FrameTimingSource`] on top of whatever timestamp-query machinery its
//! backend provides and hands it to the controller once per frame. Sample
//! acquisition latency, smoothing, and backend quirks all live behind this
//! trait.

use serde::{Deserialize, Serialize};

/// Timing measurements for a single rendered frame.
///
/// All durations are in milliseconds. The two `cpu_*_ms` fields are
/// timestamps on the source's own clock, only ever compared to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameTiming {
    /// Total GPU time spent rendering the frame.
    pub gpu_frame_time_ms: f64,
    /// Total CPU time spent preparing and submitting the frame.
    pub cpu_frame_time_ms: f64,
    /// Timestamp at which the CPU observed the frame as complete.
    pub cpu_frame_complete_ms: f64,
    /// Timestamp at which the CPU called present for the frame.
    pub cpu_present_called_ms: f64,
}

impl FrameTiming {
    /// Returns `true` if the sample's internal timestamps are coherent.
    ///
    /// A frame that completes before present was called signals a corrupt or
    /// unreliable measurement; such samples must be discarded rather than fed
    /// into delta tracking.
    pub fn is_consistent(&self) -> bool {
        self.cpu_frame_complete_ms >= self.cpu_present_called_ms
    }
}

/// The external provider of per-frame GPU/CPU timing data.
///
/// Implementations typically wrap timestamp queries with a few frames of
/// readback latency, so `latest_timings` may legitimately have nothing to
/// report early on. The controller treats a short read as "no sample this
/// tick" and carries on.
pub trait FrameTimingSource: Send {
    /// Triggers collection of the most recent frame timings.
    ///
    /// Called once per tick before reading. Implementations that collect
    /// passively may leave this as a no-op.
    fn capture_frame_timings(&mut self) {}

    /// Fills `out` with up to `out.len()` of the most recent samples, newest
    /// first, and returns how many were written.
    ///
    /// Returning fewer samples than requested means the source does not yet
    /// have enough history; the caller must skip the tick rather than act on
    /// a partial read.
    fn latest_timings(&mut self, out: &mut [FrameTiming]) -> usize;

    /// Frequency of the source's CPU timer, in Hz. Zero means the platform
    /// cannot measure CPU frame time.
    fn cpu_timer_frequency(&self) -> u64;

    /// Frequency of the source's GPU timer, in Hz. Zero means the platform
    /// cannot measure GPU frame time.
    fn gpu_timer_frequency(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistent_sample() {
        let sample = FrameTiming {
            gpu_frame_time_ms: 8.0,
            cpu_frame_time_ms: 4.0,
            cpu_present_called_ms: 100.0,
            cpu_frame_complete_ms: 104.0,
        };
        assert!(sample.is_consistent());
    }

    #[test]
    fn test_complete_before_present_is_inconsistent() {
        let sample = FrameTiming {
            cpu_present_called_ms: 104.0,
            cpu_frame_complete_ms: 100.0,
            ..Default::default()
        };
        assert!(!sample.is_consistent());
    }

    #[test]
    fn test_equal_timestamps_are_consistent() {
        let sample = FrameTiming {
            cpu_present_called_ms: 100.0,
            cpu_frame_complete_ms: 100.0,
            ..Default::default()
        };
        assert!(sample.is_consistent());
    }

    #[test]
    fn test_sample_serde_round_trip() {
        let sample = FrameTiming {
            gpu_frame_time_ms: 16.6,
            cpu_frame_time_ms: 5.2,
            cpu_frame_complete_ms: 1001.0,
            cpu_present_called_ms: 1000.0,
        };
        let json = serde_json::to_string(&sample).unwrap();
        let back: FrameTiming = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }
}
