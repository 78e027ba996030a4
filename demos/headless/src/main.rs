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

// Kairos headless demo
//
// Drives the resolution controller against a synthetic GPU whose frame cost
// follows a scripted workload (calm, overload, light). The simulated cost
// responds to the scale the controller picks, closing the loop without any
// real graphics stack. Run with RUST_LOG=debug to watch every decision.

use anyhow::Result;
use kairos_control::{ControlConfig, ControlEvent, DynamicResolutionController, ScaleEmission};
use kairos_core::timing::{FrameTiming, FrameTimingSource};

/// Frames simulated per workload phase.
const CALM_FRAMES: u64 = 600;
const OVERLOAD_FRAMES: u64 = 600;
const LIGHT_FRAMES: u64 = 2400;

/// Fraction of the frame cost that does not shrink with resolution
/// (geometry, fixed passes).
const SCALE_INDEPENDENT_COST: f64 = 0.35;

/// A fake GPU with a scripted per-frame base cost.
///
/// The reported GPU time scales with the resolution the host applied, so the
/// controller's decisions feed back into the next sample, just like a real
/// renderer resizing its targets.
struct SimulatedGpu {
    frame: u64,
    applied_scale: f64,
    clock_ms: f64,
    last: Option<FrameTiming>,
}

impl SimulatedGpu {
    fn new() -> Self {
        Self {
            frame: 0,
            applied_scale: 1.0,
            clock_ms: 0.0,
            last: None,
        }
    }

    /// Host-side resize: pull mode leaves applying the scale to us.
    fn apply_scale(&mut self, scale: f32) {
        self.applied_scale = scale as f64;
    }

    /// Milliseconds of GPU work a full-resolution frame would take right now.
    fn base_cost_ms(&self) -> f64 {
        match self.frame {
            f if f < CALM_FRAMES => 14.0,
            f if f < CALM_FRAMES + OVERLOAD_FRAMES => 24.0,
            _ => 9.0,
        }
    }
}

impl FrameTimingSource for SimulatedGpu {
    fn capture_frame_timings(&mut self) {
        self.frame += 1;
        // Timestamp queries need a couple of frames in flight before
        // anything can be read back.
        if self.frame < 3 {
            return;
        }
        let resolution_factor =
            SCALE_INDEPENDENT_COST + (1.0 - SCALE_INDEPENDENT_COST) * self.applied_scale;
        let gpu_ms = self.base_cost_ms() * resolution_factor;
        let present_ms = self.clock_ms;
        self.clock_ms += gpu_ms.max(1.0);
        self.last = Some(FrameTiming {
            gpu_frame_time_ms: gpu_ms,
            cpu_frame_time_ms: gpu_ms * 0.6,
            cpu_present_called_ms: present_ms,
            cpu_frame_complete_ms: self.clock_ms,
        });
    }

    fn latest_timings(&mut self, out: &mut [FrameTiming]) -> usize {
        match (self.last, out.is_empty()) {
            (Some(timing), false) => {
                out[0] = timing;
                1
            }
            _ => 0,
        }
    }

    fn cpu_timer_frequency(&self) -> u64 {
        10_000_000
    }

    fn gpu_timer_frequency(&self) -> u64 {
        1_000_000_000
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let total_frames = CALM_FRAMES + OVERLOAD_FRAMES + LIGHT_FRAMES;
    let mut gpu = SimulatedGpu::new();
    let (mut controller, events) =
        DynamicResolutionController::new(ControlConfig::default(), ScaleEmission::Pull);

    controller.probe_capability(&gpu);
    anyhow::ensure!(
        controller.is_platform_supported(),
        "simulated GPU should always report usable timers"
    );
    controller.arm();

    let mut drops = 0u32;
    let mut raises = 0u32;
    for frame in 0..total_frames {
        let scale = controller.tick(&mut gpu);
        gpu.apply_scale(scale);

        for event in events.try_iter() {
            match event {
                ControlEvent::ScaleLowered { scale, cause } => {
                    drops += 1;
                    log::info!(
                        "frame {:>4}: lowered to {:.3} ({:?})",
                        frame,
                        scale,
                        cause
                    );
                }
                ControlEvent::ScaleRaised { scale } => {
                    raises += 1;
                    log::info!("frame {:>4}: raised to {:.3}", frame, scale);
                }
                ControlEvent::ScaleReset { .. } => {}
            }
        }

        if frame % 300 == 0 {
            log::info!(
                "frame {:>4}: scale {:.3}, gpu {:.2} ms (avg {:.2} ms, trend {:+.2} ms), \
                 raise counter {}",
                frame,
                controller.current_scale(),
                controller.last_gpu_frame_time_ms(),
                controller.smoothed_gpu_frame_time_ms(),
                controller.gpu_frame_time_trend_ms(),
                controller.raise_counter()
            );
        }
    }

    log::info!(
        "done: {} frames, {} scale-downs, {} scale-ups, final scale {:.3} \
         (gpu {:.2} ms against a {:.2} ms budget)",
        total_frames,
        drops,
        raises,
        controller.current_scale(),
        controller.last_gpu_frame_time_ms(),
        1000.0 / controller.target_frame_rate()
    );
    Ok(())
}
