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

//! The closed-loop resolution controller.
//!
//! Once per rendered frame the controller consumes the latest GPU timing
//! sample, compares it against the frame budget, and adjusts a normalized
//! render scale in `[0, 1]`. The response is deliberately asymmetric:
//!
//! - **Scale-down** is immediate and proportional to the overshoot (or to a
//!   frame-time rise that is about to overshoot), so a heavy frame is
//!   answered within one tick.
//! - **Scale-up** is gated behind the raise counter, which has to accumulate
//!   hundreds of ticks of sustained-headroom evidence before a single,
//!   headroom-proportional increase fires. Any scale-down forfeits the
//!   accumulated evidence.
//!
//! Anomalous input (short reads, incoherent samples, a not-yet-armed or
//! disabled controller) degrades to "skip this tick, keep the last known
//! scale". Nothing in the control path returns an error or panics; a frame
//! loop must never lose a frame to its own tuning machinery.

use crate::config::ControlConfig;
use crate::event::{ControlEvent, ScaleDropCause};
use crate::history::FrameTimeHistory;
use crossbeam_channel::{Receiver, Sender};
use kairos_core::math;
use kairos_core::scale::{RenderScaleSink, ScaleRange};
use kairos_core::timing::{FrameTiming, FrameTimingSource};

/// Lifecycle status of the controller.
///
/// The capability probe is a one-time determination: `Unsupported` is
/// terminal for the process lifetime. Enable/disable toggles processing
/// without moving between these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerStatus {
    /// Created, capability not probed or controller not yet armed.
    #[default]
    Uninitialized,
    /// The platform cannot supply usable frame timings. Terminal.
    Unsupported,
    /// Armed, discarding initial ticks to absorb timing-source startup noise.
    WarmingUp,
    /// Processing samples and steering the scale.
    Active,
}

/// How the controller communicates scale changes to the host.
///
/// Fixed per deployment at construction time.
pub enum ScaleEmission {
    /// The host owns the resize and queries [`current_scale`] (or the `tick`
    /// return value) every frame. The controller pushes nothing.
    ///
    /// [`current_scale`]: DynamicResolutionController::current_scale
    Pull,
    /// The controller remaps the normalized scale onto `range` and invokes
    /// the sink itself whenever the scale changes.
    Push {
        /// Receiver of buffer resizes.
        sink: Box<dyn RenderScaleSink>,
        /// Buffer-scale band the normalized scale is remapped onto.
        range: ScaleRange,
    },
}

/// Closed-loop controller that trades render resolution for frame-rate
/// stability.
///
/// Single-threaded by design: `tick` is called once per rendered frame from
/// the render/update thread, and the administrative entry points are expected
/// on the same thread. The type is `Send`, so a host that must configure it
/// from elsewhere can put it behind its own lock.
pub struct DynamicResolutionController {
    config: ControlConfig,
    status: ControllerStatus,
    platform_supported: bool,
    enabled: bool,

    /// Normalized render scale, always in `[0, 1]`.
    scale: f32,
    raise_counter: u32,

    gpu_frame_time_ms: f64,
    cpu_frame_time_ms: f64,
    gpu_time_delta_ms: f64,

    warmup_remaining: usize,
    /// Reused read buffer, sized once at construction.
    timings: Vec<FrameTiming>,
    history: FrameTimeHistory,

    emission: ScaleEmission,
    event_tx: Sender<ControlEvent>,
}

impl DynamicResolutionController {
    /// Creates a controller and the receiving end of its event channel.
    ///
    /// Invalid configuration values are absorbed with a logged warning rather
    /// than returned as errors: a non-positive target frame rate falls back
    /// to the default, and a zero sample count is bumped to one.
    pub fn new(mut config: ControlConfig, emission: ScaleEmission) -> (Self, Receiver<ControlEvent>) {
        if config.target_frame_rate <= 0.0 {
            let fallback = ControlConfig::default().target_frame_rate;
            log::warn!(
                "Kairos: non-positive target frame rate {} in config, falling back to {}",
                config.target_frame_rate,
                fallback
            );
            config.target_frame_rate = fallback;
        }
        if config.num_frame_timings == 0 {
            log::warn!("Kairos: num_frame_timings must be at least 1, bumping to 1");
            config.num_frame_timings = 1;
        }

        let (event_tx, event_rx) = crossbeam_channel::bounded(config.event_buffer_size);
        let timings = vec![FrameTiming::default(); config.num_frame_timings];
        let controller = Self {
            config,
            status: ControllerStatus::Uninitialized,
            platform_supported: true,
            enabled: true,
            scale: 1.0,
            raise_counter: 0,
            gpu_frame_time_ms: 0.0,
            cpu_frame_time_ms: 0.0,
            gpu_time_delta_ms: 0.0,
            warmup_remaining: 0,
            timings,
            history: FrameTimeHistory::new(),
            emission,
            event_tx,
        };
        (controller, event_rx)
    }

    /// First phase of startup: asks the timing source whether the platform
    /// can measure frame times at all.
    ///
    /// A zero CPU or GPU timer frequency marks the controller `Unsupported`
    /// for the rest of the process lifetime. Capability is a one-time
    /// determination; calls after the first are ignored.
    pub fn probe_capability(&mut self, source: &dyn FrameTimingSource) {
        if self.status != ControllerStatus::Uninitialized {
            return;
        }
        let cpu_hz = source.cpu_timer_frequency();
        let gpu_hz = source.gpu_timer_frequency();
        if cpu_hz == 0 || gpu_hz == 0 {
            self.platform_supported = false;
            self.enabled = false;
            self.status = ControllerStatus::Unsupported;
            log::warn!(
                "Kairos: timing source reports no timer support (cpu {} Hz, gpu {} Hz), \
                 dynamic resolution stays off",
                cpu_hz,
                gpu_hz
            );
        }
    }

    /// Second phase of startup: starts processing at a point where the host
    /// guarantees the renderer and timing source are fully initialized.
    ///
    /// No-op on unsupported platforms or if already armed.
    pub fn arm(&mut self) {
        if !self.platform_supported || self.status != ControllerStatus::Uninitialized {
            return;
        }
        self.status = ControllerStatus::WarmingUp;
        self.warmup_remaining = self.config.num_frame_timings;
        log::info!(
            "Kairos: controller armed, discarding {} warm-up tick(s)",
            self.warmup_remaining
        );
    }

    /// Advances the control loop by one rendered frame and returns the
    /// current normalized scale (the pull-mode contract).
    ///
    /// Skips the frame entirely while disabled, unarmed, or warming up, when
    /// the source has too little history, and when the sample fails its
    /// consistency check.
    pub fn tick(&mut self, source: &mut dyn FrameTimingSource) -> f32 {
        if !self.enabled {
            return self.scale;
        }
        match self.status {
            ControllerStatus::Uninitialized | ControllerStatus::Unsupported => return self.scale,
            ControllerStatus::WarmingUp => {
                self.warmup_remaining = self.warmup_remaining.saturating_sub(1);
                if self.warmup_remaining == 0 {
                    self.status = ControllerStatus::Active;
                }
                return self.scale;
            }
            ControllerStatus::Active => {}
        }

        source.capture_frame_timings();
        let wanted = self.timings.len();
        if source.latest_timings(&mut self.timings) < wanted {
            return self.scale;
        }

        let sample = self.timings[0];
        if !sample.is_consistent() {
            // The frame's timings can't be trusted. Throw the sample away
            // without touching the delta or the last frame time.
            return self.scale;
        }

        // A zero last frame time means no data has been collected yet, which
        // would make the delta calculation invalid.
        if self.gpu_frame_time_ms != 0.0 {
            self.gpu_time_delta_ms = sample.gpu_frame_time_ms - self.gpu_frame_time_ms;
        }
        self.gpu_frame_time_ms = sample.gpu_frame_time_ms;
        self.cpu_frame_time_ms = sample.cpu_frame_time_ms;
        self.history.push(sample.gpu_frame_time_ms as f32);

        self.apply_sample();
        self.scale
    }

    /// Runs the decision algorithm against the freshly stored sample.
    fn apply_sample(&mut self) {
        let target = self.config.target_frame_time_ms();
        let headroom = target - self.gpu_frame_time_ms;

        // Already over budget: scale down in proportion to the overshoot.
        if headroom < 0.0 {
            self.raise_counter = 0;
            // Headroom is guaranteed negative here, so adding it lowers the
            // scale.
            let next = math::saturate(self.scale + (headroom / target) as f32);
            log::debug!(
                "Kairos: over budget by {:.2} ms, scale {:.3} -> {:.3}",
                -headroom,
                self.scale,
                next
            );
            self.apply_scale_change(
                next,
                ControlEvent::ScaleLowered {
                    scale: next,
                    cause: ScaleDropCause::OverBudget,
                },
            );
            return;
        }

        // Under budget, but the rise since last frame exceeds what's left:
        // expect to blow the budget next frame and scale down now.
        if self.gpu_time_delta_ms > headroom {
            self.raise_counter = 0;
            let next = math::saturate(self.scale - (self.gpu_time_delta_ms / target) as f32);
            log::debug!(
                "Kairos: frame time rising {:.2} ms against {:.2} ms headroom, scale {:.3} -> {:.3}",
                self.gpu_time_delta_ms,
                headroom,
                self.scale,
                next
            );
            self.apply_scale_change(
                next,
                ControlEvent::ScaleLowered {
                    scale: next,
                    cause: ScaleDropCause::RisingTrend,
                },
            );
            return;
        }

        if self.gpu_time_delta_ms < 0.0 {
            // Frame time is improving, accumulate toward a raise faster.
            self.raise_counter += self.config.raise_counter_big_increment;
        } else {
            let headroom_threshold = target * self.config.headroom_threshold;
            let delta_threshold = target * self.config.delta_threshold;
            // Too close to the budget, or worsening too quickly: leave the
            // counter alone rather than creep toward a raise we'd regret.
            if headroom > headroom_threshold && self.gpu_time_delta_ms < delta_threshold {
                self.raise_counter += self.config.raise_counter_small_increment;
            }
        }

        if self.raise_counter >= self.config.raise_counter_limit {
            self.raise_counter = 0;

            // Headroom as a fraction of the budget rarely spans the full 0-1
            // range, so clamp onto the configured band and remap before
            // interpolating the increase factor.
            let headroom_percent = (headroom / target) as f32;
            let clamped = math::clamp(
                headroom_percent,
                self.config.scale_headroom_clamp_min,
                self.config.scale_headroom_clamp_max,
            );
            let remapped = math::inverse_lerp(
                self.config.scale_headroom_clamp_min,
                self.config.scale_headroom_clamp_max,
                clamped,
            );
            let increase = self.config.scale_increase_basis()
                * math::lerp(
                    self.config.scale_increase_small_factor,
                    self.config.scale_increase_big_factor,
                    remapped,
                );
            let next = math::saturate(self.scale + increase);
            log::debug!(
                "Kairos: sustained headroom ({:.0}% of budget), scale {:.3} -> {:.3}",
                headroom_percent * 100.0,
                self.scale,
                next
            );
            self.apply_scale_change(next, ControlEvent::ScaleRaised { scale: next });
        }
    }

    /// Commits a changed scale, pushing it to the sink and publishing the
    /// event. Unchanged values (clamped at either end of the range) commit
    /// nothing, so a saturated controller does not spam resizes.
    fn apply_scale_change(&mut self, next: f32, event: ControlEvent) {
        if next == self.scale {
            return;
        }
        self.scale = next;
        if let ScaleEmission::Push { sink, range } = &mut self.emission {
            let buffer_scale = range.lerp(next);
            sink.resize_buffers(buffer_scale, buffer_scale);
        }
        self.publish(event);
    }

    /// Restores full resolution.
    ///
    /// In push mode this resizes to exactly the range maximum: full
    /// resolution for the host is the top of the configured band, not the
    /// internal normalized 1.0.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        if let ScaleEmission::Push { sink, range } = &mut self.emission {
            sink.resize_buffers(range.max, range.max);
        }
        self.publish(ControlEvent::ScaleReset { scale: 1.0 });
    }

    /// Resumes processing. Does not reset: the controller continues from the
    /// last scale, but re-arms warm-up so the first ticks after the pause are
    /// discarded again.
    ///
    /// Silent no-op on unsupported platforms.
    pub fn enable(&mut self) {
        if !self.platform_supported || self.enabled {
            return;
        }
        self.enabled = true;
        if self.status == ControllerStatus::Active {
            self.status = ControllerStatus::WarmingUp;
        }
        if self.status == ControllerStatus::WarmingUp {
            self.warmup_remaining = self.config.num_frame_timings;
        }
        log::info!("Kairos: dynamic resolution enabled");
    }

    /// Stops processing and resets the scale to full resolution.
    ///
    /// Silent no-op on unsupported platforms. Calling it repeatedly leaves
    /// the same state behind.
    pub fn disable(&mut self) {
        if !self.platform_supported {
            return;
        }
        self.enabled = false;
        self.reset();
        log::info!("Kairos: dynamic resolution disabled, scale reset");
    }

    /// Updates the target frame rate and resets the scale, since accumulated
    /// headroom history is meaningless against a new budget.
    ///
    /// Non-positive rates are absorbed with a warning to keep the frame-time
    /// budget strictly positive.
    pub fn set_target_frame_rate(&mut self, rate: f64) {
        if rate <= 0.0 {
            log::warn!("Kairos: ignoring non-positive target frame rate {}", rate);
            return;
        }
        self.config.target_frame_rate = rate;
        self.reset();
        log::info!(
            "Kairos: target set to {:.1} fps ({:.2} ms budget)",
            rate,
            self.config.target_frame_time_ms()
        );
    }

    /// The current normalized scale in `[0, 1]` (the pull-mode contract).
    pub fn current_scale(&self) -> f32 {
        self.scale
    }

    /// Current lifecycle status.
    pub fn status(&self) -> ControllerStatus {
        self.status
    }

    /// Whether the controller is currently processing ticks.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the capability probe found usable timers. `false` is final
    /// for the process lifetime.
    pub fn is_platform_supported(&self) -> bool {
        self.platform_supported
    }

    /// The configured target frame rate in frames per second.
    pub fn target_frame_rate(&self) -> f64 {
        self.config.target_frame_rate
    }

    /// GPU time of the most recent valid sample, in milliseconds. Zero until
    /// the first valid sample arrives.
    pub fn last_gpu_frame_time_ms(&self) -> f64 {
        self.gpu_frame_time_ms
    }

    /// CPU time of the most recent valid sample, in milliseconds.
    pub fn last_cpu_frame_time_ms(&self) -> f64 {
        self.cpu_frame_time_ms
    }

    /// Change in GPU frame time between the two most recent valid samples,
    /// in milliseconds. Zero until two valid samples have been collected.
    pub fn gpu_time_delta_ms(&self) -> f64 {
        self.gpu_time_delta_ms
    }

    /// Rolling average of recent GPU frame times, in milliseconds.
    pub fn smoothed_gpu_frame_time_ms(&self) -> f32 {
        self.history.average()
    }

    /// Rolling frame-time trend in milliseconds; positive means rising.
    pub fn gpu_frame_time_trend_ms(&self) -> f32 {
        self.history.trend()
    }

    /// Current raise-counter value, for diagnostics.
    pub fn raise_counter(&self) -> u32 {
        self.raise_counter
    }

    /// Publishes an event without ever blocking the control loop. A full or
    /// disconnected buffer drops the event.
    fn publish(&self, event: ControlEvent) {
        let _ = self.event_tx.try_send(event);
    }
}

impl Drop for DynamicResolutionController {
    fn drop(&mut self) {
        // The last frame rendered before teardown must not stay at a reduced
        // resolution.
        if self.enabled {
            self.reset();
        }
    }
}
