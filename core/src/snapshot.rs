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

//! Entity snapshots consumed by the cognitive path

use crate::world::WorldEntity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Personality weights steering the rule-based analysis. All weights are
/// clamped to `[0, 1]` at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalityWeights {
    pub aggression: f64,
    pub curiosity: f64,
    pub social: f64,
}

impl PersonalityWeights {
    pub fn new(aggression: f64, curiosity: f64, social: f64) -> Self {
        Self {
            aggression: aggression.clamp(0.0, 1.0),
            curiosity: curiosity.clamp(0.0, 1.0),
            social: social.clamp(0.0, 1.0),
        }
    }
}

impl Default for PersonalityWeights {
    fn default() -> Self {
        Self {
            aggression: 0.5,
            curiosity: 0.5,
            social: 0.5,
        }
    }
}

/// Point-in-time view of one entity handed to an analysis backend.
///
/// Built by the [`SnapshotSource`] collaborator; the scheduler never reads
/// entity state directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// The entity under analysis.
    pub entity: Uuid,

    /// Current health.
    pub health: f64,

    /// Maximum health.
    pub max_health: f64,

    /// Nearby enemies with distances.
    pub enemies: Vec<WorldEntity>,

    /// Personality weights for this entity.
    pub personality: PersonalityWeights,
}

impl EntitySnapshot {
    pub fn new(entity: Uuid, health: f64, max_health: f64) -> Self {
        Self {
            entity,
            health,
            max_health,
            enemies: Vec::new(),
            personality: PersonalityWeights::default(),
        }
    }

    pub fn with_enemies(mut self, enemies: Vec<WorldEntity>) -> Self {
        self.enemies = enemies;
        self
    }

    pub fn with_personality(mut self, personality: PersonalityWeights) -> Self {
        self.personality = personality;
        self
    }

    /// Health as a ratio in `[0, 1]`. A non-positive maximum reads as zero.
    pub fn health_ratio(&self) -> f64 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Closest enemy in the snapshot, if any.
    pub fn nearest_enemy(&self) -> Option<&WorldEntity> {
        self.enemies
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Provider of entity snapshots for the cognitive path.
///
/// Implementations must be safe to call concurrently for different entities.
/// Returning `None` skips the entity's analysis cycle.
pub trait SnapshotSource: Send + Sync {
    fn snapshot(&self, entity: Uuid) -> Option<EntitySnapshot>;
}
