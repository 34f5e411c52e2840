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

//! Configuration for the fast path, the cognitive scheduler, and the
//! rule-based analysis fallback.
//!
//! Every tunable that was a hard-coded constant in earlier iterations is
//! exposed here with the same default, so existing behavior is preserved
//! unless a caller opts into different values.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a single entity's fast proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Wall-clock budget for one `update` call. Exceeding it is degraded
    /// performance, not a failure.
    ///
    /// Default: 500µs
    pub tick_budget: Duration,

    /// Maximum directives accepted per entity per second; excess directives
    /// are rejected, not queued.
    ///
    /// Default: 10
    pub directive_rate_limit: u32,

    /// Capacity of the inbound directive queue. The newest directive always
    /// wins, so a full queue drops its oldest entry.
    ///
    /// Default: 10
    pub directive_queue_capacity: usize,

    /// Entries kept in the adopted-directive history ring.
    ///
    /// Default: 10
    pub directive_history_capacity: usize,

    /// Entries kept in the produced-action history ring.
    ///
    /// Default: 50
    pub action_history_capacity: usize,

    /// Tick-duration samples kept for performance statistics.
    ///
    /// Default: 1000
    pub timing_sample_capacity: usize,

    /// Obstacles at or inside this distance trigger a dodge.
    ///
    /// Default: 2.0
    pub dodge_range: f64,

    /// Enemies at or inside this distance trigger the strategy-specific
    /// combat response (attack/defend).
    ///
    /// Default: 5.0
    pub engage_range: f64,

    /// Enemies at or inside this distance are noticed at all (approach,
    /// flee).
    ///
    /// Default: 10.0
    pub awareness_range: f64,

    /// Interactables at or inside this distance can be interacted with.
    ///
    /// Default: 3.0
    pub interact_range: f64,

    /// Social areas at or inside this distance can be joined.
    ///
    /// Default: 5.0
    pub social_range: f64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            tick_budget: Duration::from_micros(500),
            directive_rate_limit: 10,
            directive_queue_capacity: 10,
            directive_history_capacity: 10,
            action_history_capacity: 50,
            timing_sample_capacity: 1000,
            dodge_range: 2.0,
            engage_range: 5.0,
            awareness_range: 10.0,
            interact_range: 3.0,
            social_range: 5.0,
        }
    }
}

/// Configuration for the cognitive scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// How many driver cycles run per second. The cycle period is
    /// `1 / update_rate_hz`.
    ///
    /// Default: 0.5 (one cycle every 2 seconds)
    pub update_rate_hz: f64,

    /// Maximum pending requests consumed per driver cycle.
    ///
    /// Default: 10
    pub batch_size: usize,

    /// Maximum analyses running in parallel.
    ///
    /// Default: `min(available_parallelism, 4)`
    pub worker_count: usize,

    /// Capacity of the pending-request queue; `request_analysis` returns
    /// `false` once it is full.
    ///
    /// Default: 1000
    pub queue_capacity: usize,

    /// How long a cached analysis result stays fresh. Bursty duplicate
    /// requests inside this window reuse the last computation.
    ///
    /// Default: 5 seconds
    pub cache_ttl: Duration,

    /// Validity window stamped onto outgoing directives
    /// (`expires_at = now + validity_window`).
    ///
    /// Default: 10 seconds
    pub validity_window: Duration,
}

impl SchedulerConfig {
    /// Driver cycle period derived from `update_rate_hz`. A non-positive or
    /// non-finite rate falls back to the default 2 second period.
    pub fn cycle_period(&self) -> Duration {
        if self.update_rate_hz.is_finite() && self.update_rate_hz > 0.0 {
            Duration::from_secs_f64(1.0 / self.update_rate_hz)
        } else {
            Duration::from_secs(2)
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            update_rate_hz: 0.5,
            batch_size: 10,
            worker_count: default_worker_count(),
            queue_capacity: 1000,
            cache_ttl: Duration::from_secs(5),
            validity_window: Duration::from_secs(10),
        }
    }
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(4)
}

/// Thresholds for the deterministic rule-based analysis fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleThresholds {
    /// Health ratio below which a threatened entity retreats.
    ///
    /// Default: 0.3
    pub retreat_health_ratio: f64,

    /// Enemies at or inside this distance count as threats.
    ///
    /// Default: 10.0
    pub threat_range: f64,

    /// Aggression weight at or above which a threatened entity turns
    /// aggressive rather than defensive.
    ///
    /// Default: 0.6
    pub aggression_threshold: f64,

    /// Social weight at or above which an unthreatened entity socializes.
    ///
    /// Default: 0.7
    pub social_threshold: f64,

    /// Curiosity weight at or above which an unthreatened entity explores.
    ///
    /// Default: 0.7
    pub curiosity_threshold: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            retreat_health_ratio: 0.3,
            threat_range: 10.0,
            aggression_threshold: 0.6,
            social_threshold: 0.7,
            curiosity_threshold: 0.7,
        }
    }
}
