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

//! # Kairos Core
//!
//! Foundational crate containing traits, core types, and interface contracts
//! for the dynamic resolution scaling system.
//!
//! Kairos keeps GPU frame time near a target frame time by trading render
//! resolution for frame-rate stability. This crate defines the "common
//! language" between the control loop (`kairos-control`) and the host
//! renderer: how frame timings are reported, and how a new render scale is
//! communicated back.

#![warn(missing_docs)]

pub mod math;
pub mod scale;
pub mod timing;

pub use scale::{RenderScaleSink, ScaleRange};
pub use timing::{FrameTiming, FrameTimingSource};
