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

//! Strategy recommendations flowing from the cognitive path to the fast path

use crate::state::StateFlags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// High-level behavioral modes an entity can be directed into.
///
/// This is a closed set: any strategy may follow any other, there is no
/// illegal-transition concept. The boolean flag projection for each strategy
/// is fixed (see [`Strategy::flag_overrides`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    Aggressive,
    Defensive,
    Retreat,
    Neutral,
    Curious,
    Social,
}

impl Strategy {
    /// Fixed strategy → flags table applied when a directive is adopted.
    pub fn flag_overrides(&self) -> StateFlags {
        match self {
            Strategy::Aggressive => StateFlags {
                in_combat: true,
                fleeing: false,
                interacting: false,
                moving: true,
            },
            Strategy::Defensive => StateFlags {
                in_combat: true,
                fleeing: false,
                interacting: false,
                moving: false,
            },
            Strategy::Retreat => StateFlags {
                in_combat: false,
                fleeing: true,
                interacting: false,
                moving: true,
            },
            Strategy::Neutral => StateFlags {
                in_combat: false,
                fleeing: false,
                interacting: false,
                moving: false,
            },
            Strategy::Curious => StateFlags {
                in_combat: false,
                fleeing: false,
                interacting: true,
                moving: true,
            },
            Strategy::Social => StateFlags {
                in_combat: false,
                fleeing: false,
                interacting: true,
                moving: false,
            },
        }
    }

    /// Default directive priority for this strategy.
    ///
    /// Survival-critical strategies carry more urgency than ambient ones.
    pub fn urgency(&self) -> f64 {
        match self {
            Strategy::Retreat => 0.9,
            Strategy::Aggressive => 0.75,
            Strategy::Defensive => 0.7,
            Strategy::Curious => 0.45,
            Strategy::Social => 0.4,
            Strategy::Neutral => 0.3,
        }
    }
}

/// A strategy recommendation produced by the cognitive path.
///
/// Directives are created exclusively by the scheduler and handed by value
/// into the target proxy's queue, which owns them until consumed or expired.
/// A directive whose `expires_at` has passed is discarded on next access and
/// never acted upon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    /// Recommended strategy.
    pub strategy: Strategy,

    /// Priority in `[0.0, 1.0]`; clamped at construction.
    pub priority: f64,

    /// Optional target entity the strategy is oriented around.
    pub target: Option<Uuid>,

    /// Free-form context captured at analysis time (health ratio, threat
    /// count, and similar diagnostics).
    pub context: BTreeMap<String, serde_json::Value>,

    /// When the directive was created.
    pub created_at: DateTime<Utc>,

    /// When the directive stops being valid; `None` means no expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Directive {
    /// Create a directive with the strategy's default urgency and no expiry.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            priority: strategy.urgency(),
            target: None,
            context: BTreeMap::new(),
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    /// Override the priority. Clamped to `[0, 1]`.
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority.clamp(0.0, 1.0);
        self
    }

    /// Set the target entity.
    pub fn with_target(mut self, target: Uuid) -> Self {
        self.target = Some(target);
        self
    }

    /// Attach a context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Set the validity window relative to the creation timestamp.
    ///
    /// A window too large to represent leaves the directive without expiry.
    pub fn with_validity(mut self, window: Duration) -> Self {
        self.expires_at = chrono::Duration::from_std(window)
            .ok()
            .and_then(|d| self.created_at.checked_add_signed(d));
        self
    }

    /// Whether the directive has expired as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_priority_follows_urgency() {
        for strategy in [
            Strategy::Aggressive,
            Strategy::Defensive,
            Strategy::Retreat,
            Strategy::Neutral,
            Strategy::Curious,
            Strategy::Social,
        ] {
            let directive = Directive::new(strategy);
            assert_eq!(directive.priority, strategy.urgency());
            assert!((0.0..=1.0).contains(&directive.priority));
        }
    }

    #[test]
    fn test_priority_is_clamped() {
        let directive = Directive::new(Strategy::Neutral).with_priority(2.0);
        assert_eq!(directive.priority, 1.0);
        let directive = Directive::new(Strategy::Neutral).with_priority(-1.0);
        assert_eq!(directive.priority, 0.0);
    }

    #[test]
    fn test_expiry() {
        let directive = Directive::new(Strategy::Aggressive);
        assert!(!directive.is_expired(Utc::now()), "no expiry never expires");

        let directive = Directive::new(Strategy::Aggressive).with_validity(Duration::from_secs(10));
        assert!(!directive.is_expired(Utc::now()));
        assert!(directive.is_expired(Utc::now() + chrono::Duration::seconds(11)));
    }

    #[test]
    fn test_zero_validity_expires_immediately() {
        let directive = Directive::new(Strategy::Retreat).with_validity(Duration::ZERO);
        assert!(directive.is_expired(Utc::now()));
    }

    #[test]
    fn test_retreat_flags() {
        let flags = Strategy::Retreat.flag_overrides();
        assert!(flags.fleeing);
        assert!(!flags.in_combat);
    }

    #[test]
    fn test_aggressive_flags() {
        let flags = Strategy::Aggressive.flag_overrides();
        assert!(flags.in_combat);
        assert!(!flags.fleeing);
    }
}
