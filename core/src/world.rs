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

//! World-view boundary types supplied by the surrounding simulation
//!
//! The world-view provider hands the fast path flat lists of nearby entities
//! per tick. Validation happens once at this boundary: malformed entries are
//! filtered out rather than failing the tick.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A nearby entity as seen by the fast path: an id and a distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldEntity {
    pub id: Uuid,
    pub distance: f64,
}

impl WorldEntity {
    pub fn new(id: Uuid, distance: f64) -> Self {
        Self { id, distance }
    }
}

/// Validated per-tick view of an entity's surroundings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldView {
    pub obstacles: Vec<WorldEntity>,
    pub enemies: Vec<WorldEntity>,
    pub interactables: Vec<WorldEntity>,
    pub social_areas: Vec<WorldEntity>,
}

impl WorldView {
    /// An empty view; the fast path idles against it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate a raw provider payload, dropping malformed entries.
    pub fn from_raw(raw: RawWorldView) -> Self {
        Self {
            obstacles: validate(raw.obstacles),
            enemies: validate(raw.enemies),
            interactables: validate(raw.interactables),
            social_areas: validate(raw.social_areas),
        }
    }

    pub fn nearest_obstacle(&self) -> Option<&WorldEntity> {
        nearest(&self.obstacles)
    }

    pub fn nearest_enemy(&self) -> Option<&WorldEntity> {
        nearest(&self.enemies)
    }

    pub fn nearest_interactable(&self) -> Option<&WorldEntity> {
        nearest(&self.interactables)
    }

    pub fn nearest_social_area(&self) -> Option<&WorldEntity> {
        nearest(&self.social_areas)
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
            && self.enemies.is_empty()
            && self.interactables.is_empty()
            && self.social_areas.is_empty()
    }
}

/// Single linear scan for the closest entry of one kind.
fn nearest(entries: &[WorldEntity]) -> Option<&WorldEntity> {
    entries.iter().min_by(|a, b| a.distance.total_cmp(&b.distance))
}

fn validate(entries: Vec<RawWorldEntity>) -> Vec<WorldEntity> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let (id, distance) = (entry.id?, entry.distance?);
            if distance.is_finite() && distance >= 0.0 {
                Some(WorldEntity { id, distance })
            } else {
                None
            }
        })
        .collect()
}

/// Unvalidated world-view entry as received from a provider. Missing or
/// non-numeric fields deserialize to `None` and are filtered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawWorldEntity {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub distance: Option<f64>,
}

/// Unvalidated world-view payload as received from a provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawWorldView {
    #[serde(default)]
    pub obstacles: Vec<RawWorldEntity>,
    #[serde(default)]
    pub enemies: Vec<RawWorldEntity>,
    #[serde(default)]
    pub interactables: Vec<RawWorldEntity>,
    #[serde(default)]
    pub social_areas: Vec<RawWorldEntity>,
}
