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

//! Fast-path timing statistics
//!
//! Each proxy records tick durations into a fixed-capacity ring; snapshots
//! of the ring are exposed per entity and aggregated registry-wide.

use crate::directive::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Fixed-capacity ring of tick-duration samples plus cumulative counters.
#[derive(Debug)]
pub(crate) struct TimingRing {
    samples: VecDeque<Duration>,
    capacity: usize,
    total_ticks: u64,
    max: Duration,
    budget_exceeded: bool,
    last_sample_at: Option<Instant>,
}

impl TimingRing {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            total_ticks: 0,
            max: Duration::ZERO,
            budget_exceeded: false,
            last_sample_at: None,
        }
    }

    /// Record one tick duration, evicting the oldest sample when full.
    pub(crate) fn record(&mut self, elapsed: Duration, over_budget: bool) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed);
        self.total_ticks += 1;
        self.max = self.max.max(elapsed);
        self.budget_exceeded |= over_budget;
        self.last_sample_at = Some(Instant::now());
    }

    /// Average over the samples currently in the ring.
    pub(crate) fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    pub(crate) fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub(crate) fn max(&self) -> Duration {
        self.max
    }

    pub(crate) fn budget_exceeded(&self) -> bool {
        self.budget_exceeded
    }

    pub(crate) fn last_sample_at(&self) -> Option<Instant> {
        self.last_sample_at
    }
}

/// Per-entity performance snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyStats {
    /// Total ticks recorded over the proxy's lifetime.
    pub sample_count: u64,

    /// Average tick time over the retained sample window.
    pub average: Duration,

    /// Maximum tick time ever observed.
    pub max: Duration,

    /// Whether any tick exceeded the configured budget.
    pub budget_exceeded: bool,

    /// Strategy the entity is currently following.
    pub strategy: Strategy,
}

/// Registry-wide performance snapshot.
///
/// `average` is the mean of the per-entity averages for entities that have
/// recorded at least one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Entities currently registered.
    pub entity_count: usize,

    /// Total ticks recorded across all entities.
    pub sample_count: u64,

    /// Mean of per-entity average tick times.
    pub average: Duration,

    /// Maximum tick time observed by any entity.
    pub max: Duration,

    /// Entities that exceeded their budget at least once.
    pub budget_exceeded_entities: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_bounded() {
        let mut ring = TimingRing::new(3);
        for i in 1..=10u64 {
            ring.record(Duration::from_micros(i), false);
        }
        assert_eq!(ring.samples.len(), 3);
        assert_eq!(ring.total_ticks(), 10);
        // Average over the window (8, 9, 10µs), not the lifetime.
        assert_eq!(ring.average(), Duration::from_micros(9));
        assert_eq!(ring.max(), Duration::from_micros(10));
    }

    #[test]
    fn test_budget_flag_is_sticky() {
        let mut ring = TimingRing::new(10);
        ring.record(Duration::from_micros(100), false);
        assert!(!ring.budget_exceeded());
        ring.record(Duration::from_micros(900), true);
        ring.record(Duration::from_micros(100), false);
        assert!(ring.budget_exceeded());
    }

    #[test]
    fn test_empty_ring() {
        let ring = TimingRing::new(10);
        assert_eq!(ring.average(), Duration::ZERO);
        assert_eq!(ring.total_ticks(), 0);
        assert!(ring.last_sample_at().is_none());
    }
}
