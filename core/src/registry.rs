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

//! Registry of per-entity fast proxies
//!
//! Proxies are created lazily on first reference and removed by explicit
//! removal or an idle-eviction sweep. The existing-entity lookup path takes
//! only a shard read lock; an exclusive lock is taken only when a proxy is
//! created, so contention stays flat as entity count grows.

use crate::action::Action;
use crate::config::ProxyConfig;
use crate::directive::Directive;
use crate::proxy::{DirectiveRejected, FastProxy};
use crate::stats::{AggregateStats, ProxyStats};
use crate::world::WorldView;
use dashmap::DashMap;
use metrics::{counter, gauge};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Creates, looks up, and evicts per-entity proxies, and fans directives out
/// to them.
pub struct ProxyRegistry {
    proxies: DashMap<Uuid, Arc<FastProxy>>,
    config: ProxyConfig,
}

impl ProxyRegistry {
    /// Create an empty registry; every proxy it creates uses `config`.
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            proxies: DashMap::new(),
            config,
        }
    }

    /// Look up an entity's proxy, creating it on first reference.
    pub fn get_or_create(&self, entity: Uuid) -> Arc<FastProxy> {
        // Shared lookup first; the exclusive entry lock is only taken when
        // the entity is genuinely new.
        if let Some(proxy) = self.proxies.get(&entity) {
            return Arc::clone(&proxy);
        }
        let proxy = self
            .proxies
            .entry(entity)
            .or_insert_with(|| {
                tracing::debug!(%entity, "creating fast proxy");
                counter!("registry.proxies.created").increment(1);
                Arc::new(FastProxy::new(entity, self.config.clone()))
            })
            .clone();
        gauge!("registry.entities").set(self.proxies.len() as f64);
        proxy
    }

    /// Look up an entity's proxy without creating it.
    pub fn get(&self, entity: Uuid) -> Option<Arc<FastProxy>> {
        self.proxies.get(&entity).map(|p| Arc::clone(&p))
    }

    /// Tick an entity, creating its proxy lazily.
    pub fn update(&self, entity: Uuid, budget: Duration, view: &WorldView) -> Action {
        self.get_or_create(entity).update(budget, view)
    }

    /// Deliver a directive to an entity's proxy, creating it lazily.
    pub fn send_directive(
        &self,
        entity: Uuid,
        directive: Directive,
    ) -> Result<(), DirectiveRejected> {
        self.get_or_create(entity).receive_directive(directive)
    }

    /// Performance snapshot for one entity, if it exists.
    pub fn performance_stats(&self, entity: Uuid) -> Option<ProxyStats> {
        self.get(entity).map(|p| p.performance_stats())
    }

    /// Registry-wide performance snapshot.
    pub fn aggregate_stats(&self) -> AggregateStats {
        let mut entity_count = 0usize;
        let mut sample_count = 0u64;
        let mut sampled_entities = 0u32;
        let mut average_sum = Duration::ZERO;
        let mut max = Duration::ZERO;
        let mut budget_exceeded_entities = 0usize;

        for entry in self.proxies.iter() {
            let stats = entry.value().performance_stats();
            entity_count += 1;
            sample_count += stats.sample_count;
            if stats.sample_count > 0 {
                sampled_entities += 1;
                average_sum += stats.average;
            }
            max = max.max(stats.max);
            if stats.budget_exceeded {
                budget_exceeded_entities += 1;
            }
        }

        let average = if sampled_entities > 0 {
            average_sum / sampled_entities
        } else {
            Duration::ZERO
        };

        AggregateStats {
            entity_count,
            sample_count,
            average,
            max,
            budget_exceeded_entities,
        }
    }

    /// Remove an entity's proxy. Returns whether it existed.
    pub fn remove(&self, entity: Uuid) -> bool {
        let removed = self.proxies.remove(&entity).is_some();
        if removed {
            tracing::debug!(%entity, "removed fast proxy");
            gauge!("registry.entities").set(self.proxies.len() as f64);
        }
        removed
    }

    /// Evict entities whose last tick sample is older than `older_than`, or
    /// that have never produced a sample. Returns how many were evicted.
    pub fn evict_idle(&self, older_than: Duration) -> usize {
        let before = self.proxies.len();
        self.proxies.retain(|_, proxy| {
            proxy
                .last_activity()
                .is_some_and(|at| at.elapsed() <= older_than)
        });
        let evicted = before - self.proxies.len();
        if evicted > 0 {
            tracing::debug!(evicted, "evicted idle proxies");
            counter!("registry.proxies.evicted").increment(evicted as u64);
            gauge!("registry.entities").set(self.proxies.len() as f64);
        }
        evicted
    }

    /// Entities currently registered.
    pub fn entities(&self) -> Vec<Uuid> {
        self.proxies.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::directive::Strategy;

    fn registry() -> ProxyRegistry {
        ProxyRegistry::new(ProxyConfig::default())
    }

    fn budget() -> Duration {
        ProxyConfig::default().tick_budget
    }

    #[test]
    fn test_lazy_creation() {
        let registry = registry();
        assert!(registry.is_empty());

        let entity = Uuid::new_v4();
        let action = registry.update(entity, budget(), &WorldView::empty());
        assert_eq!(action.kind, ActionKind::Idle);
        assert_eq!(registry.len(), 1);

        // Same entity resolves to the same proxy.
        let first = registry.get_or_create(entity);
        let second = registry.get_or_create(entity);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_send_directive_creates_and_delivers() {
        let registry = registry();
        let entity = Uuid::new_v4();
        registry
            .send_directive(entity, Directive::new(Strategy::Aggressive))
            .unwrap();

        registry.update(entity, budget(), &WorldView::empty());
        let stats = registry.performance_stats(entity).unwrap();
        assert_eq!(stats.strategy, Strategy::Aggressive);
    }

    #[test]
    fn test_remove() {
        let registry = registry();
        let entity = Uuid::new_v4();
        registry.update(entity, budget(), &WorldView::empty());

        assert!(registry.remove(entity));
        assert!(!registry.remove(entity));
        assert!(registry.get(entity).is_none());
    }

    #[test]
    fn test_evict_idle_removes_never_sampled() {
        let registry = registry();
        let ticked = Uuid::new_v4();
        let idle = Uuid::new_v4();

        registry.update(ticked, budget(), &WorldView::empty());
        registry.get_or_create(idle);
        assert_eq!(registry.len(), 2);

        let evicted = registry.evict_idle(Duration::from_secs(60));
        assert_eq!(evicted, 1);
        assert!(registry.get(ticked).is_some());
        assert!(registry.get(idle).is_none());
    }

    #[test]
    fn test_evict_idle_removes_stale() {
        let registry = registry();
        let entity = Uuid::new_v4();
        registry.update(entity, budget(), &WorldView::empty());

        std::thread::sleep(Duration::from_millis(30));
        let evicted = registry.evict_idle(Duration::from_millis(10));
        assert_eq!(evicted, 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_aggregate_stats() {
        let registry = registry();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        for _ in 0..3 {
            registry.update(a, budget(), &WorldView::empty());
        }
        registry.update(b, budget(), &WorldView::empty());
        registry.get_or_create(Uuid::new_v4());

        let stats = registry.aggregate_stats();
        assert_eq!(stats.entity_count, 3);
        assert_eq!(stats.sample_count, 4);
        assert!(stats.max >= stats.average);
        assert_eq!(stats.budget_exceeded_entities, 0);
    }

    #[test]
    fn test_aggregate_stats_empty() {
        let registry = registry();
        let stats = registry.aggregate_stats();
        assert_eq!(stats.entity_count, 0);
        assert_eq!(stats.sample_count, 0);
        assert_eq!(stats.average, Duration::ZERO);
    }
}
