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

//! Render-scale contracts between the resolution controller and the host.
//!
//! The controller's internal scale is normalized to `[0, 1]`. Hosts with a
//! native dynamic-resolution scaler consume that value directly (pull mode);
//! hosts without one give the controller a [`RenderScaleSink`] and a
//! [`ScaleRange`], and the controller remaps and pushes the final buffer
//! scale itself.

use crate::math;
use serde::{Deserialize, Serialize};

/// The buffer-scale band applied when the controller drives resizes itself.
///
/// A normalized scale of `0.0` maps to `min`, `1.0` maps to `max`. Full
/// resolution in push mode is therefore `max`, not the normalized value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    /// Lowest buffer scale the controller may request.
    pub min: f32,
    /// Highest buffer scale the controller may request.
    pub max: f32,
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self { min: 0.5, max: 1.0 }
    }
}

impl ScaleRange {
    /// Remaps a normalized scale in `[0, 1]` onto this range.
    pub fn lerp(&self, t: f32) -> f32 {
        math::lerp(self.min, self.max, t)
    }
}

/// The external consumer of buffer-scale changes (push mode).
///
/// Width and height are always resized by the same factor.
pub trait RenderScaleSink: Send {
    /// Resizes the host's scalable render targets.
    fn resize_buffers(&mut self, width_scale: f32, height_scale: f32);
}
