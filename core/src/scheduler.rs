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

//! Asynchronous cognitive scheduler
//!
//! The slow half of the dual-rate architecture: a fixed-cadence driver loop
//! pops queued analysis requests, runs the analysis backend on a bounded
//! worker pool off the real-time thread, and hands results back to the fast
//! path as expiring directives. Nothing in here ever blocks a tick caller.

use crate::backend::{AnalysisBackend, AnalysisError};
use crate::config::SchedulerConfig;
use crate::directive::{Directive, Strategy};
use crate::registry::ProxyRegistry;
use crate::snapshot::{EntitySnapshot, SnapshotSource};
use metrics::{counter, gauge};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Errors raised by scheduler lifecycle operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The driver did not stop within the given timeout. The caller decides
    /// whether to force-kill the process; the driver remains cancelled and
    /// will exit once in-flight work completes.
    #[error("cognitive driver did not stop within {timeout:?}")]
    ShutdownTimeout { timeout: Duration },

    /// `stop` was called without a running driver.
    #[error("scheduler is not running")]
    NotRunning,
}

/// One queued analysis request.
#[derive(Debug)]
struct PendingRequest {
    priority: i32,
    seq: u64,
    entity: Uuid,
}

// Max-heap order: highest priority first, FIFO within equal priority.
impl Ord for PendingRequest {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .cmp(&other.priority)
            .then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PendingRequest {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PendingRequest {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for PendingRequest {}

/// Bounded pending queue with per-entity deduplication. One lock, short
/// critical sections.
#[derive(Debug)]
struct PendingQueue {
    heap: BinaryHeap<PendingRequest>,
    queued: HashSet<Uuid>,
    capacity: usize,
    next_seq: u64,
}

impl PendingQueue {
    fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            queued: HashSet::new(),
            capacity,
            next_seq: 0,
        }
    }

    /// Returns false on duplicate or when the queue is at capacity.
    fn push(&mut self, entity: Uuid, priority: i32) -> bool {
        if self.queued.contains(&entity) || self.heap.len() >= self.capacity {
            return false;
        }
        self.queued.insert(entity);
        self.heap.push(PendingRequest {
            priority,
            seq: self.next_seq,
            entity,
        });
        self.next_seq += 1;
        true
    }

    fn pop_batch(&mut self, max: usize) -> Vec<PendingRequest> {
        let mut batch = Vec::with_capacity(max.min(self.heap.len()));
        while batch.len() < max {
            match self.heap.pop() {
                Some(request) => {
                    self.queued.remove(&request.entity);
                    batch.push(request);
                }
                None => break,
            }
        }
        batch
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// A cached analysis result with its computation instant.
#[derive(Debug, Clone, Copy)]
struct CachedAnalysis {
    strategy: Strategy,
    computed_at: Instant,
}

/// Snapshot-derived fields stamped onto the outgoing directive.
#[derive(Debug, Clone, Copy)]
struct DispatchFields {
    target: Option<Uuid>,
    health_ratio: f64,
    threat_count: usize,
}

impl DispatchFields {
    fn from_snapshot(snapshot: &EntitySnapshot) -> Self {
        Self {
            target: snapshot.nearest_enemy().map(|e| e.id),
            health_ratio: snapshot.health_ratio(),
            threat_count: snapshot.enemies.len(),
        }
    }
}

/// Handle to a running driver.
struct Driver {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Asynchronous cognitive layer: owns the pending queue, the fixed-cadence
/// driver, the worker pool, and the result cache.
///
/// Constructed with its collaborators (registry, analysis backend, snapshot
/// source) and owned by the caller; there is no process-wide instance.
pub struct CognitiveScheduler {
    config: SchedulerConfig,
    registry: Arc<ProxyRegistry>,
    backend: Arc<dyn AnalysisBackend>,
    snapshots: Arc<dyn SnapshotSource>,
    pending: Arc<Mutex<PendingQueue>>,
    cache: Arc<Mutex<HashMap<Uuid, CachedAnalysis>>>,
    driver: Mutex<Option<Driver>>,
}

impl CognitiveScheduler {
    pub fn new(
        registry: Arc<ProxyRegistry>,
        backend: Arc<dyn AnalysisBackend>,
        snapshots: Arc<dyn SnapshotSource>,
        config: SchedulerConfig,
    ) -> Self {
        let pending = Arc::new(Mutex::new(PendingQueue::new(config.queue_capacity)));
        Self {
            config,
            registry,
            backend,
            snapshots,
            pending,
            cache: Arc::new(Mutex::new(HashMap::new())),
            driver: Mutex::new(None),
        }
    }

    /// Start the driver loop. Must be called from within a tokio runtime.
    /// Calling `start` while already running is a logged no-op.
    pub fn start(&self) {
        let mut driver = self.driver.lock().unwrap();
        if let Some(existing) = driver.as_ref() {
            if !existing.handle.is_finished() {
                tracing::warn!("cognitive scheduler already running");
                return;
            }
        }

        let cancel = CancellationToken::new();
        let context = DriverContext {
            config: self.config.clone(),
            registry: Arc::clone(&self.registry),
            backend: Arc::clone(&self.backend),
            snapshots: Arc::clone(&self.snapshots),
            pending: Arc::clone(&self.pending),
            cache: Arc::clone(&self.cache),
            workers: Arc::new(Semaphore::new(self.config.worker_count.max(1))),
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(context.run());
        *driver = Some(Driver { cancel, handle });

        tracing::info!(
            period = ?self.config.cycle_period(),
            workers = self.config.worker_count.max(1),
            "cognitive scheduler started"
        );
    }

    /// Stop the driver, joining it within `timeout`.
    ///
    /// In-flight analyses run to completion but their results are discarded.
    /// Failing to join within `timeout` is a reported error, never a hang.
    pub async fn stop(&self, timeout: Duration) -> Result<(), SchedulerError> {
        let driver = self.driver.lock().unwrap().take();
        let Some(driver) = driver else {
            return Err(SchedulerError::NotRunning);
        };

        driver.cancel.cancel();
        match tokio::time::timeout(timeout, driver.handle).await {
            Ok(Ok(())) => {
                tracing::info!("cognitive scheduler stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!("cognitive driver join error: {e}");
                Ok(())
            }
            Err(_) => Err(SchedulerError::ShutdownTimeout { timeout }),
        }
    }

    /// Queue an entity for analysis.
    ///
    /// Returns true if enqueued; false if the entity is already queued or
    /// the queue is at capacity (the caller may retry later). Higher
    /// `priority` requests are processed first.
    pub fn request_analysis(&self, entity: Uuid, priority: i32) -> bool {
        let accepted = {
            let mut pending = self.pending.lock().unwrap();
            let accepted = pending.push(entity, priority);
            gauge!("cognitive.queue.pending").set(pending.len() as f64);
            accepted
        };
        if accepted {
            counter!("cognitive.requests.accepted").increment(1);
        } else {
            counter!("cognitive.requests.refused").increment(1);
            tracing::debug!(%entity, "analysis request refused (duplicate or queue full)");
        }
        accepted
    }

    /// Analysis requests currently queued. Never exceeds the configured
    /// capacity.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Whether the driver loop is currently running.
    pub fn is_running(&self) -> bool {
        self.driver
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|d| !d.handle.is_finished())
    }
}

/// Everything the driver task owns.
struct DriverContext {
    config: SchedulerConfig,
    registry: Arc<ProxyRegistry>,
    backend: Arc<dyn AnalysisBackend>,
    snapshots: Arc<dyn SnapshotSource>,
    pending: Arc<Mutex<PendingQueue>>,
    cache: Arc<Mutex<HashMap<Uuid, CachedAnalysis>>>,
    workers: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl DriverContext {
    /// Fixed-cadence driver loop; exits when the token is cancelled.
    async fn run(self) {
        let mut ticker = tokio::time::interval(self.config.cycle_period());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::debug!("cognitive driver cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }

    /// One driver cycle: sweep the cache, pop a batch, dispatch workers,
    /// collect results. Backend failures are contained per task so one bad
    /// analysis never stalls the batch.
    async fn run_cycle(&self) {
        self.sweep_cache();

        let batch = {
            let mut pending = self.pending.lock().unwrap();
            let batch = pending.pop_batch(self.config.batch_size);
            gauge!("cognitive.queue.pending").set(pending.len() as f64);
            batch
        };
        if batch.is_empty() {
            return;
        }

        let mut tasks: JoinSet<(Uuid, DispatchFields, Result<Strategy, AnalysisError>)> =
            JoinSet::new();

        for request in batch {
            let entity = request.entity;

            if let Some(strategy) = self.cached_strategy(entity) {
                counter!("cognitive.cache.hits").increment(1);
                self.dispatch(entity, strategy, None);
                continue;
            }
            counter!("cognitive.cache.misses").increment(1);

            let Some(snapshot) = self.snapshots.snapshot(entity) else {
                tracing::debug!(%entity, "no snapshot available, skipping analysis");
                continue;
            };

            let permit = tokio::select! {
                _ = self.cancel.cancelled() => break,
                permit = Arc::clone(&self.workers).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                }
            };

            let backend = Arc::clone(&self.backend);
            let fields = DispatchFields::from_snapshot(&snapshot);
            tasks.spawn(async move {
                let result = tokio::task::spawn_blocking(move || backend.analyze(&snapshot))
                    .await
                    .unwrap_or_else(|e| {
                        Err(AnalysisError::Failed(format!("analysis task panicked: {e}")))
                    });
                drop(permit);
                (entity, fields, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (entity, fields, result) = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("analysis worker join failed: {e}");
                    continue;
                }
            };

            if self.cancel.is_cancelled() {
                tracing::debug!(%entity, "discarding analysis result after shutdown");
                continue;
            }

            match result {
                Ok(strategy) => {
                    self.cache.lock().unwrap().insert(
                        entity,
                        CachedAnalysis {
                            strategy,
                            computed_at: Instant::now(),
                        },
                    );
                    self.dispatch(entity, strategy, Some(fields));
                }
                Err(e) => {
                    counter!("cognitive.analysis.failures").increment(1);
                    tracing::error!(%entity, "analysis failed: {e}");
                }
            }
        }
    }

    /// Wrap a strategy as a directive and fan it out to the entity's proxy.
    fn dispatch(&self, entity: Uuid, strategy: Strategy, fields: Option<DispatchFields>) {
        let mut directive = Directive::new(strategy).with_validity(self.config.validity_window);
        if let Some(fields) = fields {
            if let Some(target) = fields.target {
                directive = directive.with_target(target);
            }
            directive = directive
                .with_context("health_ratio", serde_json::json!(fields.health_ratio))
                .with_context("threat_count", serde_json::json!(fields.threat_count));
        }

        match self.registry.send_directive(entity, directive) {
            Ok(()) => {
                counter!("cognitive.directives.sent").increment(1);
            }
            Err(e) => {
                counter!("cognitive.directives.rejected").increment(1);
                tracing::warn!(%entity, "directive rejected: {e}");
            }
        }
    }

    fn cached_strategy(&self, entity: Uuid) -> Option<Strategy> {
        let cache = self.cache.lock().unwrap();
        cache
            .get(&entity)
            .filter(|cached| cached.computed_at.elapsed() < self.config.cache_ttl)
            .map(|cached| cached.strategy)
    }

    /// Drop cache entries past their TTL.
    fn sweep_cache(&self) {
        let mut cache = self.cache.lock().unwrap();
        let ttl = self.config.cache_ttl;
        cache.retain(|_, cached| cached.computed_at.elapsed() < ttl);
        gauge!("cognitive.cache.entries").set(cache.len() as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::backend::RuleBasedAnalysis;
    use crate::config::ProxyConfig;
    use crate::world::{WorldEntity, WorldView};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Snapshot source backed by a fixed map.
    struct MapSnapshots(HashMap<Uuid, EntitySnapshot>);

    impl MapSnapshots {
        fn single(snapshot: EntitySnapshot) -> Self {
            let mut map = HashMap::new();
            map.insert(snapshot.entity, snapshot);
            Self(map)
        }
    }

    impl SnapshotSource for MapSnapshots {
        fn snapshot(&self, entity: Uuid) -> Option<EntitySnapshot> {
            self.0.get(&entity).cloned()
        }
    }

    /// Backend counting invocations around the rule-based default.
    struct CountingBackend {
        inner: RuleBasedAnalysis,
        calls: AtomicUsize,
    }

    impl CountingBackend {
        fn new() -> Self {
            Self {
                inner: RuleBasedAnalysis::new(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AnalysisBackend for CountingBackend {
        fn analyze(&self, snapshot: &EntitySnapshot) -> Result<Strategy, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.analyze(snapshot)
        }
    }

    /// Backend that takes a fixed wall-clock time per analysis.
    struct SlowBackend {
        delay: Duration,
    }

    impl AnalysisBackend for SlowBackend {
        fn analyze(&self, _snapshot: &EntitySnapshot) -> Result<Strategy, AnalysisError> {
            std::thread::sleep(self.delay);
            Ok(Strategy::Neutral)
        }
    }

    /// Backend that always fails.
    struct FailingBackend;

    impl AnalysisBackend for FailingBackend {
        fn analyze(&self, _snapshot: &EntitySnapshot) -> Result<Strategy, AnalysisError> {
            Err(AnalysisError::Failed("boom".to_string()))
        }
    }

    fn fast_config() -> SchedulerConfig {
        SchedulerConfig {
            update_rate_hz: 50.0,
            ..SchedulerConfig::default()
        }
    }

    fn scheduler_with(
        backend: Arc<dyn AnalysisBackend>,
        snapshots: Arc<dyn SnapshotSource>,
        config: SchedulerConfig,
    ) -> (Arc<ProxyRegistry>, CognitiveScheduler) {
        let registry = Arc::new(ProxyRegistry::new(ProxyConfig::default()));
        let scheduler =
            CognitiveScheduler::new(Arc::clone(&registry), backend, snapshots, config);
        (registry, scheduler)
    }

    /// Poll until the entity's proxy has a queued directive or time runs out.
    async fn wait_for_directive(registry: &ProxyRegistry, entity: Uuid) -> bool {
        for _ in 0..100 {
            if registry
                .get(entity)
                .is_some_and(|p| p.queued_directives() > 0)
            {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[test]
    fn test_pending_queue_dedupes_and_bounds() {
        let mut queue = PendingQueue::new(3);
        let a = Uuid::new_v4();

        assert!(queue.push(a, 0));
        assert!(!queue.push(a, 0), "duplicate refused");
        assert!(queue.push(Uuid::new_v4(), 0));
        assert!(queue.push(Uuid::new_v4(), 0));
        assert!(!queue.push(Uuid::new_v4(), 0), "over capacity refused");
        assert_eq!(queue.len(), 3);

        let batch = queue.pop_batch(10);
        assert_eq!(batch.len(), 3);
        assert_eq!(queue.len(), 0);
        assert!(queue.push(a, 0), "accepted again once consumed");
    }

    #[test]
    fn test_pending_queue_priority_order() {
        let mut queue = PendingQueue::new(10);
        let low = Uuid::new_v4();
        let high = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        queue.push(low, 0);
        queue.push(high, 5);
        queue.push(first, 1);
        queue.push(second, 1);

        let batch = queue.pop_batch(4);
        assert_eq!(batch[0].entity, high);
        assert_eq!(batch[1].entity, first, "FIFO within equal priority");
        assert_eq!(batch[2].entity, second);
        assert_eq!(batch[3].entity, low);
    }

    #[tokio::test]
    async fn test_request_analysis_dedupe_without_driver() {
        let (_registry, scheduler) = scheduler_with(
            Arc::new(RuleBasedAnalysis::new()),
            Arc::new(MapSnapshots(HashMap::new())),
            SchedulerConfig::default(),
        );
        let entity = Uuid::new_v4();

        assert!(scheduler.request_analysis(entity, 0));
        assert!(!scheduler.request_analysis(entity, 0));
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_pending_count_never_exceeds_capacity() {
        let config = SchedulerConfig {
            queue_capacity: 5,
            ..SchedulerConfig::default()
        };
        let (_registry, scheduler) = scheduler_with(
            Arc::new(RuleBasedAnalysis::new()),
            Arc::new(MapSnapshots(HashMap::new())),
            config,
        );

        let mut accepted = 0;
        for _ in 0..50 {
            if scheduler.request_analysis(Uuid::new_v4(), 0) {
                accepted += 1;
            }
            assert!(scheduler.pending_count() <= 5);
        }
        assert_eq!(accepted, 5);
    }

    #[tokio::test]
    async fn test_end_to_end_retreat_flow() {
        // Entity at 20% health with an enemy at distance 5: the rule backend
        // yields Retreat, the directive reaches the proxy, and the next tick
        // flees away from that enemy.
        let entity = Uuid::new_v4();
        let enemy = Uuid::new_v4();
        let snapshot = EntitySnapshot::new(entity, 20.0, 100.0)
            .with_enemies(vec![WorldEntity::new(enemy, 5.0)]);

        let (registry, scheduler) = scheduler_with(
            Arc::new(RuleBasedAnalysis::new()),
            Arc::new(MapSnapshots::single(snapshot)),
            fast_config(),
        );

        scheduler.start();
        assert!(scheduler.is_running());
        assert!(scheduler.request_analysis(entity, 0));
        assert!(wait_for_directive(&registry, entity).await);

        let view = WorldView {
            enemies: vec![WorldEntity::new(enemy, 5.0)],
            ..Default::default()
        };
        let action = registry.update(entity, ProxyConfig::default().tick_budget, &view);
        assert_eq!(action.kind, ActionKind::Flee);
        assert_eq!(action.target, Some(enemy));

        let proxy = registry.get(entity).unwrap();
        assert_eq!(proxy.current_strategy(), Strategy::Retreat);
        assert!(proxy.current_flags().fleeing);
        assert!(!proxy.current_flags().in_combat);

        // The request slot is free again once consumed.
        assert!(scheduler.request_analysis(entity, 0));

        scheduler.stop(Duration::from_secs(2)).await.unwrap();
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_cache_reuses_recent_analysis() {
        let entity = Uuid::new_v4();
        let snapshot = EntitySnapshot::new(entity, 100.0, 100.0);
        let backend = Arc::new(CountingBackend::new());

        let (registry, scheduler) = scheduler_with(
            Arc::clone(&backend) as Arc<dyn AnalysisBackend>,
            Arc::new(MapSnapshots::single(snapshot)),
            fast_config(),
        );

        scheduler.start();
        assert!(scheduler.request_analysis(entity, 0));
        assert!(wait_for_directive(&registry, entity).await);

        // Second burst inside the cache TTL: served from cache.
        assert!(scheduler.request_analysis(entity, 0));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        scheduler.stop(Duration::from_secs(2)).await.unwrap();
    }

    #[tokio::test]
    async fn test_backend_failure_skips_entity() {
        let entity = Uuid::new_v4();
        let snapshot = EntitySnapshot::new(entity, 100.0, 100.0);

        let (registry, scheduler) = scheduler_with(
            Arc::new(FailingBackend),
            Arc::new(MapSnapshots::single(snapshot)),
            fast_config(),
        );

        scheduler.start();
        assert!(scheduler.request_analysis(entity, 0));
        tokio::time::sleep(Duration::from_millis(150)).await;

        // No directive arrives, the driver keeps running.
        assert!(
            registry
                .get(entity)
                .is_none_or(|p| p.queued_directives() == 0)
        );
        assert!(scheduler.is_running());
        scheduler.stop(Duration::from_secs(2)).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_snapshot_skips_entity() {
        let (registry, scheduler) = scheduler_with(
            Arc::new(RuleBasedAnalysis::new()),
            Arc::new(MapSnapshots(HashMap::new())),
            fast_config(),
        );

        let entity = Uuid::new_v4();
        scheduler.start();
        assert!(scheduler.request_analysis(entity, 0));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(registry.get(entity).is_none());
        assert_eq!(scheduler.pending_count(), 0, "request was consumed");
        scheduler.stop(Duration::from_secs(2)).await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_drains_in_flight_work() {
        let snapshots: HashMap<Uuid, EntitySnapshot> = (0..8)
            .map(|_| {
                let entity = Uuid::new_v4();
                (entity, EntitySnapshot::new(entity, 100.0, 100.0))
            })
            .collect();
        let entities: Vec<Uuid> = snapshots.keys().copied().collect();

        let (_registry, scheduler) = scheduler_with(
            Arc::new(SlowBackend {
                delay: Duration::from_millis(50),
            }),
            Arc::new(MapSnapshots(snapshots)),
            fast_config(),
        );

        scheduler.start();
        for entity in entities {
            scheduler.request_analysis(entity, 0);
        }
        tokio::time::sleep(Duration::from_millis(40)).await;

        scheduler.stop(Duration::from_secs(5)).await.unwrap();
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_stop_times_out_on_stuck_worker() {
        let entity = Uuid::new_v4();
        let (_registry, scheduler) = scheduler_with(
            Arc::new(SlowBackend {
                delay: Duration::from_millis(400),
            }),
            Arc::new(MapSnapshots::single(EntitySnapshot::new(
                entity, 100.0, 100.0,
            ))),
            fast_config(),
        );

        scheduler.start();
        scheduler.request_analysis(entity, 0);
        // Let the driver enter the cycle and block on the slow analysis.
        tokio::time::sleep(Duration::from_millis(60)).await;

        let result = scheduler.stop(Duration::from_millis(10)).await;
        assert!(matches!(
            result,
            Err(SchedulerError::ShutdownTimeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_stop_without_start() {
        let (_registry, scheduler) = scheduler_with(
            Arc::new(RuleBasedAnalysis::new()),
            Arc::new(MapSnapshots(HashMap::new())),
            SchedulerConfig::default(),
        );
        let result = scheduler.stop(Duration::from_millis(10)).await;
        assert!(matches!(result, Err(SchedulerError::NotRunning)));
    }

    #[tokio::test]
    async fn test_start_twice_is_noop() {
        let (_registry, scheduler) = scheduler_with(
            Arc::new(RuleBasedAnalysis::new()),
            Arc::new(MapSnapshots(HashMap::new())),
            SchedulerConfig::default(),
        );
        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_running());
        scheduler.stop(Duration::from_secs(1)).await.unwrap();
    }
}
