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

//! Tuning knobs for the resolution controller.

/// Configuration for the dynamic resolution controller.
///
/// The defaults are conservative: scale-down reacts within a single frame,
/// while a scale-up needs roughly 36-120 ticks of accumulated evidence
/// (depending on how often the big increment applies) before it fires.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Target frame rate the controller steers toward, in frames per second.
    /// Must be positive; the frame-time budget is `1000 / target_frame_rate`.
    pub target_frame_rate: f64,
    /// Accumulated evidence required before a scale-up fires.
    pub raise_counter_limit: u32,
    /// Raise-counter increment applied when headroom is comfortable but frame
    /// time is not actively improving.
    pub raise_counter_small_increment: u32,
    /// Raise-counter increment applied when frame time is improving.
    pub raise_counter_big_increment: u32,
    /// Fraction of the frame budget that must be free before the slow
    /// raise-counter path accumulates at all.
    pub headroom_threshold: f64,
    /// Fraction of the frame budget the frame-time delta must stay under for
    /// the slow raise-counter path to accumulate.
    pub delta_threshold: f64,
    /// Scale-up interpolation endpoint used when headroom is barely above the
    /// clamp band's floor.
    pub scale_increase_small_factor: f32,
    /// Scale-up interpolation endpoint used when headroom fills the clamp
    /// band.
    pub scale_increase_big_factor: f32,
    /// Lower bound of the headroom band remapped into scale-up magnitude.
    pub scale_headroom_clamp_min: f32,
    /// Upper bound of the headroom band remapped into scale-up magnitude.
    pub scale_headroom_clamp_max: f32,
    /// Number of timing samples requested per tick, and the number of warm-up
    /// ticks discarded after arming or re-enabling.
    pub num_frame_timings: usize,
    /// Capacity of the control-event channel. If the buffer is full, new
    /// events are dropped.
    pub event_buffer_size: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            target_frame_rate: 60.0,
            raise_counter_limit: 360,
            raise_counter_small_increment: 3,
            raise_counter_big_increment: 10,
            headroom_threshold: 0.06,
            delta_threshold: 0.035,
            scale_increase_small_factor: 0.25,
            scale_increase_big_factor: 1.0,
            scale_headroom_clamp_min: 0.1,
            scale_headroom_clamp_max: 0.5,
            num_frame_timings: 1,
            event_buffer_size: 64,
        }
    }
}

impl ControlConfig {
    /// The frame-time budget in milliseconds, derived from the target rate.
    pub fn target_frame_time_ms(&self) -> f64 {
        1000.0 / self.target_frame_rate
    }

    /// Basis of the scale-up increase factor.
    ///
    /// Inherited tuning: the basis is the smaller of the two accumulation
    /// thresholds, which couples scale-up magnitude to whichever threshold is
    /// tighter. See DESIGN.md before relying on that relationship.
    pub fn scale_increase_basis(&self) -> f32 {
        self.headroom_threshold.min(self.delta_threshold) as f32
    }
}
