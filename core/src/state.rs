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

//! Per-entity mutable state owned exclusively by the entity's fast proxy

use crate::action::Action;
use crate::config::ProxyConfig;
use crate::directive::{Directive, Strategy};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Boolean behavior flags projected from the adopted strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFlags {
    pub in_combat: bool,
    pub fleeing: bool,
    pub interacting: bool,
    pub moving: bool,
}

/// Fixed-capacity history ring. Pushing onto a full ring evicts the oldest
/// entry, so memory stays bounded no matter how long an entity lives.
#[derive(Debug, Clone)]
pub struct History<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// Create an empty history with the given capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest if the ring is full.
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Most recently pushed entry, if any.
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// Mutable per-entity record owned by a single [`FastProxy`](crate::proxy::FastProxy).
///
/// Never shared across entities; the owning proxy is the only mutator.
#[derive(Debug)]
pub struct EntityState {
    /// Currently adopted strategy.
    pub strategy: Strategy,

    /// Last known target entity.
    pub target: Option<Uuid>,

    /// Flag projection of the current strategy.
    pub flags: StateFlags,

    /// Recently adopted directives (bounded).
    pub directive_history: History<Directive>,

    /// Recently produced actions (bounded).
    pub action_history: History<Action>,
}

impl EntityState {
    /// Create a fresh state: neutral strategy, no target, all flags clear.
    pub fn new(config: &ProxyConfig) -> Self {
        Self {
            strategy: Strategy::Neutral,
            target: None,
            flags: StateFlags::default(),
            directive_history: History::new(config.directive_history_capacity),
            action_history: History::new(config.action_history_capacity),
        }
    }

    /// Adopt a directive: take its strategy and target, project the flag
    /// table, and record it in the directive history.
    pub fn adopt(&mut self, directive: Directive) {
        self.strategy = directive.strategy;
        if directive.target.is_some() {
            self.target = directive.target;
        }
        self.flags = directive.strategy.flag_overrides();
        self.directive_history.push(directive);
    }
}
