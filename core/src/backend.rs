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

//! Pluggable strategy analysis
//!
//! The scheduler only needs one capability: "given entity state and
//! surroundings, produce a strategy recommendation". Model-backed
//! implementations plug in through [`AnalysisBackend`]; the deterministic
//! [`RuleBasedAnalysis`] is the default, so the system is always functional
//! without an external model dependency.

use crate::config::RuleThresholds;
use crate::directive::Strategy;
use crate::snapshot::EntitySnapshot;
use thiserror::Error;

/// Errors raised by an analysis backend.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The backend ran but could not produce a recommendation.
    #[error("analysis failed: {0}")]
    Failed(String),

    /// The backend is not able to serve requests right now.
    #[error("analysis backend unavailable: {0}")]
    Unavailable(String),
}

/// Strategy analysis capability consumed by the cognitive scheduler.
///
/// `analyze` is a synchronous, pure-function contract: it must be safe to
/// call concurrently from multiple worker threads with different entities.
pub trait AnalysisBackend: Send + Sync {
    fn analyze(&self, snapshot: &EntitySnapshot) -> Result<Strategy, AnalysisError>;
}

/// Deterministic rule-based strategy evaluation.
///
/// Decides from health ratio, nearby-enemy count, and personality weights,
/// in a fixed priority cascade: survival first, combat posture second,
/// ambient behavior last.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedAnalysis {
    thresholds: RuleThresholds,
}

impl RuleBasedAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }
}

impl AnalysisBackend for RuleBasedAnalysis {
    fn analyze(&self, snapshot: &EntitySnapshot) -> Result<Strategy, AnalysisError> {
        let t = &self.thresholds;
        let health_ratio = snapshot.health_ratio();
        let threats = snapshot
            .enemies
            .iter()
            .filter(|e| e.distance <= t.threat_range)
            .count();

        let strategy = if threats > 0 && health_ratio < t.retreat_health_ratio {
            Strategy::Retreat
        } else if threats > 0 {
            if snapshot.personality.aggression >= t.aggression_threshold {
                Strategy::Aggressive
            } else {
                Strategy::Defensive
            }
        } else if snapshot.personality.social >= t.social_threshold {
            Strategy::Social
        } else if snapshot.personality.curiosity >= t.curiosity_threshold {
            Strategy::Curious
        } else {
            Strategy::Neutral
        };

        tracing::trace!(
            entity = %snapshot.entity,
            health_ratio,
            threats,
            ?strategy,
            "rule-based analysis"
        );
        Ok(strategy)
    }
}
