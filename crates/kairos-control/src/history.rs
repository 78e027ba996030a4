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

//! Rolling history of recent GPU frame times.
//!
//! The history is observational: it feeds the smoothed/trend accessors and
//! log output, never the decision algorithm, which works strictly off the
//! latest sample and its delta.

/// Number of samples retained (2 seconds at 60 Hz).
const HISTORY_LEN: usize = 120;

/// A fixed-size rolling window of GPU frame times, in milliseconds.
#[derive(Debug, Clone)]
pub struct FrameTimeHistory {
    samples: [f32; HISTORY_LEN],
    index: usize,
    count: usize,
}

impl Default for FrameTimeHistory {
    fn default() -> Self {
        Self {
            samples: [0.0; HISTORY_LEN],
            index: 0,
            count: 0,
        }
    }
}

impl FrameTimeHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a frame time, overwriting the oldest sample once full.
    pub fn push(&mut self, frame_time_ms: f32) {
        self.samples[self.index] = frame_time_ms;
        self.index = (self.index + 1) % HISTORY_LEN;
        if self.count < HISTORY_LEN {
            self.count += 1;
        }
    }

    /// Number of samples currently held.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Arithmetic mean over the window, or 0.0 when empty.
    pub fn average(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        self.iter().sum::<f32>() / self.count as f32
    }

    /// Difference between the averages of the newer and older halves of the
    /// window. Positive means frame time is rising.
    pub fn trend(&self) -> f32 {
        if self.count < 2 {
            return 0.0;
        }
        let half = self.count / 2;
        let older: f32 = self.iter().take(half).sum::<f32>() / half as f32;
        let newer: f32 = self.iter().skip(self.count - half).sum::<f32>() / half as f32;
        newer - older
    }

    /// Iterates the window in chronological order (oldest to newest).
    fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let start = if self.count < HISTORY_LEN {
            0
        } else {
            self.index
        };
        (0..self.count).map(move |i| self.samples[(start + i) % HISTORY_LEN])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_history() {
        let history = FrameTimeHistory::new();
        assert_eq!(history.count(), 0);
        assert_eq!(history.average(), 0.0);
        assert_eq!(history.trend(), 0.0);
    }

    #[test]
    fn test_average_over_partial_window() {
        let mut history = FrameTimeHistory::new();
        history.push(10.0);
        history.push(20.0);
        assert_relative_eq!(history.average(), 15.0);
        assert_eq!(history.count(), 2);
    }

    #[test]
    fn test_oldest_samples_are_overwritten() {
        let mut history = FrameTimeHistory::new();
        for _ in 0..HISTORY_LEN {
            history.push(30.0);
        }
        for _ in 0..HISTORY_LEN {
            history.push(10.0);
        }
        assert_eq!(history.count(), HISTORY_LEN);
        assert_relative_eq!(history.average(), 10.0);
    }

    #[test]
    fn test_rising_frame_times_give_positive_trend() {
        let mut history = FrameTimeHistory::new();
        history.push(8.0);
        history.push(8.2);
        history.push(12.0);
        history.push(12.2);
        // older half avg 8.1, newer half avg 12.1
        assert_relative_eq!(history.trend(), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_steady_frame_times_give_flat_trend() {
        let mut history = FrameTimeHistory::new();
        for _ in 0..40 {
            history.push(16.6);
        }
        assert_relative_eq!(history.trend(), 0.0, epsilon = 1e-4);
    }
}
