//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Driftmind dual-rate entity control
//!
//! This crate splits entity decision-making across two rates:
//! - A synchronous per-tick fast path ([`FastProxy`]) that always answers
//!   inside a sub-millisecond budget
//! - An asynchronous cognitive layer ([`CognitiveScheduler`]) that runs
//!   strategy analysis on a bounded worker pool, seconds at a time
//!
//! The two halves communicate only through expiring [`Directive`]s, so a
//! stalled or absent cognitive layer degrades behavior quality but never
//! tick latency.

pub mod action;
pub mod backend;
pub mod config;
pub mod directive;
pub mod proxy;
pub mod registry;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod world;

pub use action::{Action, ActionKind};
pub use backend::{AnalysisBackend, AnalysisError, RuleBasedAnalysis};
pub use config::{ProxyConfig, RuleThresholds, SchedulerConfig};
pub use directive::{Directive, Strategy};
pub use proxy::{DirectiveRejected, FastProxy};
pub use registry::ProxyRegistry;
pub use scheduler::{CognitiveScheduler, SchedulerError};
pub use snapshot::{EntitySnapshot, PersonalityWeights, SnapshotSource};
pub use state::{EntityState, StateFlags};
pub use stats::{AggregateStats, ProxyStats};
pub use world::{RawWorldView, WorldEntity, WorldView};
