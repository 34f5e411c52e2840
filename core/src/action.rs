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

//! Per-tick action value type produced by the fast path

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Priority assigned to the default idle action.
pub const IDLE_PRIORITY: f64 = 0.1;

/// What an entity should do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Idle,
    Move,
    Dodge,
    Attack,
    Defend,
    Interact,
    Flee,
}

/// A single-tick action produced by the fast path.
///
/// Actions are produced fresh every tick and handed to the caller; this core
/// never persists them past their return (beyond the bounded per-entity
/// action history kept for diagnostics).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// What to do.
    pub kind: ActionKind,

    /// Optional target entity the action is directed at.
    pub target: Option<Uuid>,

    /// Free-form parameters interpreted by the action consumer.
    pub params: BTreeMap<String, serde_json::Value>,

    /// Priority in `[0.0, 1.0]`; clamped at construction.
    pub priority: f64,

    /// When the action was produced.
    pub timestamp: DateTime<Utc>,
}

impl Action {
    /// Create a new action of the given kind. Priority is clamped to `[0, 1]`.
    pub fn new(kind: ActionKind, priority: f64) -> Self {
        Self {
            kind,
            target: None,
            params: BTreeMap::new(),
            priority: priority.clamp(0.0, 1.0),
            timestamp: Utc::now(),
        }
    }

    /// The default action when no candidate qualifies.
    pub fn idle() -> Self {
        Self::new(ActionKind::Idle, IDLE_PRIORITY)
    }

    /// Set the target entity.
    pub fn with_target(mut self, target: Uuid) -> Self {
        self.target = Some(target);
        self
    }

    /// Attach a free-form parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_is_clamped() {
        assert_eq!(Action::new(ActionKind::Attack, 1.7).priority, 1.0);
        assert_eq!(Action::new(ActionKind::Attack, -0.3).priority, 0.0);
        assert_eq!(Action::new(ActionKind::Attack, 0.8).priority, 0.8);
    }

    #[test]
    fn test_idle_default() {
        let action = Action::idle();
        assert_eq!(action.kind, ActionKind::Idle);
        assert_eq!(action.priority, IDLE_PRIORITY);
        assert!(action.target.is_none());
        assert!(action.params.is_empty());
    }

    #[test]
    fn test_builder_helpers() {
        let target = Uuid::new_v4();
        let action = Action::new(ActionKind::Flee, 0.85)
            .with_target(target)
            .with_param("away_from", serde_json::json!(target.to_string()));
        assert_eq!(action.target, Some(target));
        assert!(action.params.contains_key("away_from"));
    }
}
