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

//! Synchronous per-tick fast path
//!
//! One [`FastProxy`] per entity answers "what should this entity do right
//! now" inside a strict sub-millisecond budget. It never suspends and never
//! takes a lock shared with other entities; directives from the cognitive
//! path arrive through a per-entity queue and are adopted newest-valid-first
//! on the next tick.

use crate::action::{Action, ActionKind};
use crate::config::ProxyConfig;
use crate::directive::{Directive, Strategy};
use crate::state::{EntityState, StateFlags};
use crate::stats::{ProxyStats, TimingRing};
use crate::world::WorldView;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

/// Sliding window over which the directive rate limit applies.
const RATE_WINDOW: Duration = Duration::from_secs(1);

// Fixed candidate priorities, highest first. Obstacle avoidance always wins.
const PRIORITY_DODGE: f64 = 0.9;
const PRIORITY_FLEE: f64 = 0.85;
const PRIORITY_ATTACK: f64 = 0.8;
const PRIORITY_DEFEND: f64 = 0.7;
const PRIORITY_APPROACH: f64 = 0.6;
const PRIORITY_INTERACT: f64 = 0.5;
const PRIORITY_EXPLORE: f64 = 0.45;
const PRIORITY_SOCIAL: f64 = 0.4;

/// Why a directive was not accepted. Rejections are signalled, never
/// silently dropped, so a misbehaving caller is observable.
#[derive(Debug, Error)]
pub enum DirectiveRejected {
    /// The per-entity rate limit was hit; retry later.
    #[error("directive rate limit exceeded ({limit}/s) for entity {entity}")]
    RateLimited { entity: Uuid, limit: u32 },

    /// The directive was already expired on arrival.
    #[error("directive for entity {entity} expired before delivery")]
    Expired { entity: Uuid },
}

/// Inbound directive queue plus the rate-limit window, guarded together by
/// one per-entity lock.
#[derive(Debug, Default)]
struct DirectiveInbox {
    queue: VecDeque<Directive>,
    window: VecDeque<Instant>,
}

/// Synchronous per-tick decision function for one entity.
///
/// All locks are scoped to this entity and held only to copy or move small
/// fixed-size data, so contention does not grow with entity count and the
/// calling thread never waits longer than O(µs).
pub struct FastProxy {
    id: Uuid,
    config: ProxyConfig,
    state: Mutex<EntityState>,
    inbox: Mutex<DirectiveInbox>,
    timings: Mutex<TimingRing>,
}

impl FastProxy {
    /// Create a proxy for the given entity.
    pub fn new(id: Uuid, config: ProxyConfig) -> Self {
        let state = EntityState::new(&config);
        let timings = TimingRing::new(config.timing_sample_capacity);
        Self {
            id,
            config,
            state: Mutex::new(state),
            inbox: Mutex::new(DirectiveInbox::default()),
            timings: Mutex::new(timings),
        }
    }

    /// The entity this proxy controls.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Produce this tick's action.
    ///
    /// Adopts the newest valid pending directive, classifies the world view,
    /// evaluates the fixed candidate set, and records the elapsed time.
    /// Exceeding `budget` is recorded and logged but never aborts the tick.
    pub fn update(&self, budget: Duration, view: &WorldView) -> Action {
        let started = Instant::now();
        let now = Utc::now();

        let adopted = self.drain_newest_valid(now);
        let action = {
            let mut state = self.state.lock().unwrap();
            if let Some(directive) = adopted {
                tracing::debug!(
                    entity = %self.id,
                    strategy = ?directive.strategy,
                    "adopting directive"
                );
                state.adopt(directive);
            }
            let action = self.decide(&state, view);
            state.action_history.push(action.clone());
            action
        };

        let elapsed = started.elapsed();
        let over_budget = elapsed > budget;
        self.timings.lock().unwrap().record(elapsed, over_budget);

        histogram!("proxy.tick.duration").record(elapsed.as_secs_f64());
        if over_budget {
            counter!("proxy.budget.overruns").increment(1);
            tracing::warn!(
                entity = %self.id,
                elapsed_us = elapsed.as_micros() as u64,
                budget_us = budget.as_micros() as u64,
                "tick budget exceeded"
            );
        }

        action
    }

    /// Queue a directive from the cognitive path.
    ///
    /// Enforces the per-entity rate limit over a sliding one-second window
    /// and rejects directives that are already expired. A full queue keeps
    /// the newest entries: the oldest queued directive is dropped, since the
    /// fast path only ever adopts the newest valid one.
    pub fn receive_directive(&self, directive: Directive) -> Result<(), DirectiveRejected> {
        if directive.is_expired(Utc::now()) {
            counter!("proxy.directives.rejected", "reason" => "expired").increment(1);
            return Err(DirectiveRejected::Expired { entity: self.id });
        }

        let mut inbox = self.inbox.lock().unwrap();
        let now = Instant::now();
        while inbox
            .window
            .front()
            .is_some_and(|t| now.duration_since(*t) >= RATE_WINDOW)
        {
            inbox.window.pop_front();
        }
        if inbox.window.len() as u32 >= self.config.directive_rate_limit {
            counter!("proxy.directives.rejected", "reason" => "rate_limited").increment(1);
            return Err(DirectiveRejected::RateLimited {
                entity: self.id,
                limit: self.config.directive_rate_limit,
            });
        }
        inbox.window.push_back(now);

        if inbox.queue.len() == self.config.directive_queue_capacity {
            inbox.queue.pop_front();
        }
        inbox.queue.push_back(directive);
        counter!("proxy.directives.accepted").increment(1);
        Ok(())
    }

    /// Performance snapshot for this entity.
    pub fn performance_stats(&self) -> ProxyStats {
        let strategy = self.state.lock().unwrap().strategy;
        let timings = self.timings.lock().unwrap();
        ProxyStats {
            sample_count: timings.total_ticks(),
            average: timings.average(),
            max: timings.max(),
            budget_exceeded: timings.budget_exceeded(),
            strategy,
        }
    }

    /// Strategy the entity is currently following.
    pub fn current_strategy(&self) -> Strategy {
        self.state.lock().unwrap().strategy
    }

    /// Flag projection of the current strategy.
    pub fn current_flags(&self) -> StateFlags {
        self.state.lock().unwrap().flags
    }

    /// Directives queued but not yet consumed.
    pub fn queued_directives(&self) -> usize {
        self.inbox.lock().unwrap().queue.len()
    }

    /// When this proxy last recorded a tick sample; `None` if never ticked.
    pub(crate) fn last_activity(&self) -> Option<Instant> {
        self.timings.lock().unwrap().last_sample_at()
    }

    /// Pop directives newest-first until a non-expired one is found, then
    /// discard the rest. Expired directives are never adopted.
    fn drain_newest_valid(&self, now: DateTime<Utc>) -> Option<Directive> {
        let mut inbox = self.inbox.lock().unwrap();
        let mut newest = None;
        while let Some(directive) = inbox.queue.pop_back() {
            if !directive.is_expired(now) {
                newest = Some(directive);
                break;
            }
        }
        inbox.queue.clear();
        newest
    }

    /// Evaluate the fixed candidate set against the current strategy and the
    /// nearest entity of each kind; the highest priority wins, ties go to the
    /// earlier candidate in the fixed order.
    fn decide(&self, state: &EntityState, view: &WorldView) -> Action {
        let config = &self.config;
        let mut best = Action::idle();

        if let Some(obstacle) = view.nearest_obstacle() {
            if obstacle.distance <= config.dodge_range {
                consider(
                    &mut best,
                    Action::new(ActionKind::Dodge, PRIORITY_DODGE)
                        .with_target(obstacle.id)
                        .with_param("distance", serde_json::json!(obstacle.distance)),
                );
            }
        }

        let enemy = view.nearest_enemy();
        match state.strategy {
            Strategy::Aggressive => {
                if let Some(enemy) = enemy {
                    if enemy.distance <= config.engage_range {
                        consider(
                            &mut best,
                            Action::new(ActionKind::Attack, PRIORITY_ATTACK).with_target(enemy.id),
                        );
                    } else if enemy.distance <= config.awareness_range {
                        consider(
                            &mut best,
                            Action::new(ActionKind::Move, PRIORITY_APPROACH)
                                .with_target(enemy.id)
                                .with_param("toward", serde_json::json!(enemy.id)),
                        );
                    }
                }
            }
            Strategy::Defensive => {
                if let Some(enemy) = enemy {
                    if enemy.distance <= config.engage_range {
                        consider(
                            &mut best,
                            Action::new(ActionKind::Defend, PRIORITY_DEFEND).with_target(enemy.id),
                        );
                    }
                }
            }
            Strategy::Retreat => {
                if let Some(enemy) = enemy {
                    if enemy.distance <= config.awareness_range {
                        consider(
                            &mut best,
                            Action::new(ActionKind::Flee, PRIORITY_FLEE)
                                .with_target(enemy.id)
                                .with_param("away_from", serde_json::json!(enemy.id)),
                        );
                    }
                }
            }
            Strategy::Curious => {
                if let Some(interactable) = view.nearest_interactable() {
                    if interactable.distance > config.interact_range
                        && interactable.distance <= config.awareness_range
                    {
                        consider(
                            &mut best,
                            Action::new(ActionKind::Move, PRIORITY_EXPLORE)
                                .with_target(interactable.id)
                                .with_param("toward", serde_json::json!(interactable.id)),
                        );
                    }
                }
            }
            Strategy::Social => {
                if let Some(area) = view.nearest_social_area() {
                    if area.distance > config.social_range
                        && area.distance <= config.awareness_range
                    {
                        consider(
                            &mut best,
                            Action::new(ActionKind::Move, PRIORITY_EXPLORE)
                                .with_target(area.id)
                                .with_param("toward", serde_json::json!(area.id)),
                        );
                    }
                }
            }
            Strategy::Neutral => {}
        }

        if let Some(interactable) = view.nearest_interactable() {
            if interactable.distance <= config.interact_range {
                consider(
                    &mut best,
                    Action::new(ActionKind::Interact, PRIORITY_INTERACT)
                        .with_target(interactable.id),
                );
            }
        }
        if let Some(area) = view.nearest_social_area() {
            if area.distance <= config.social_range {
                consider(
                    &mut best,
                    Action::new(ActionKind::Move, PRIORITY_SOCIAL)
                        .with_target(area.id)
                        .with_param("toward", serde_json::json!(area.id)),
                );
            }
        }

        best
    }
}

fn consider(best: &mut Action, candidate: Action) {
    if candidate.priority > best.priority {
        *best = candidate;
    }
}
