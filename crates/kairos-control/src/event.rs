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

//! Scale-change notifications published by the controller.
//!
//! Events are delivered over a bounded channel so a host can surface them in
//! telemetry without coupling to the control loop. Publishing never blocks:
//! if the buffer is full, new events are dropped.

/// Why the controller lowered the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDropCause {
    /// GPU frame time already exceeded the budget.
    OverBudget,
    /// Frame time was still under budget, but its rise outpaced the
    /// remaining headroom.
    RisingTrend,
}

/// A scale change made by the controller.
///
/// The reported `scale` is the normalized value in `[0, 1]`, before any
/// push-mode remapping onto the configured buffer-scale range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// The scale was lowered to protect the frame rate.
    ScaleLowered {
        /// Normalized scale after the change.
        scale: f32,
        /// What triggered the drop.
        cause: ScaleDropCause,
    },
    /// Accumulated headroom evidence triggered a cautious scale-up.
    ScaleRaised {
        /// Normalized scale after the change.
        scale: f32,
    },
    /// The scale was reset to full resolution.
    ScaleReset {
        /// Normalized scale after the reset (always 1.0).
        scale: f32,
    },
}
