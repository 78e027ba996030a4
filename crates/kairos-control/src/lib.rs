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

//! # Kairos Control
//!
//! The dynamic resolution controller: a closed feedback loop that nudges the
//! render scale down fast when GPU frame time overshoots the budget and back
//! up slowly once sustained headroom has been observed.
//!
//! The controller owns all of its state explicitly and is driven by the
//! host's render loop: one [`tick`](controller::DynamicResolutionController::tick)
//! per rendered frame, on the render thread. Timing acquisition and buffer
//! resizing stay behind the `kairos-core` contracts.

pub mod config;
pub mod controller;
pub mod event;
pub mod history;

pub use config::ControlConfig;
pub use controller::{ControllerStatus, DynamicResolutionController, ScaleEmission};
pub use event::{ControlEvent, ScaleDropCause};
