//! Time-sliced region scan: enumerate every protected position in a region's
//! bounds, filter each through the capture policy, and hand the survivors to
//! the cache.
//!
//! The scan is a resumable step function driven by an async loop that sleeps
//! between increments, so a region with thousands of protections never
//! monopolizes a shared tick.

use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::cache::{CacheKey, ScanCache, ScanOutcome};
use crate::config::VaultConfig;
use crate::model::{Coordinate, Protection};
use crate::policy::CapturePolicyEngine;
use crate::providers::{ActorDirectory, ProtectionRegistry, RegionProvider};

/// Resumable scan state. `step` picks up at the first unprocessed candidate,
/// so candidates are visited exactly once and in enumeration order across
/// all increments.
pub(crate) struct ScanTask {
    actor: Uuid,
    filter_owner: Option<Uuid>,
    /// Region owners see every allowed container; the owner filter only
    /// applies to non-owners.
    actor_owns_region: bool,
    candidates: Vec<Protection>,
    index: usize,
    kept: Vec<Coordinate>,
}

impl ScanTask {
    pub(crate) fn new(
        actor: Uuid,
        filter_owner: Option<Uuid>,
        actor_owns_region: bool,
        candidates: Vec<Protection>,
    ) -> Self {
        Self {
            actor,
            filter_owner,
            actor_owns_region,
            candidates,
            index: 0,
            kept: Vec::new(),
        }
    }

    /// Run one increment: at most `batch_size` candidates, stopping early
    /// once `budget` wall-clock time has elapsed. Always makes progress on
    /// at least one candidate. Returns true when every candidate has been
    /// processed.
    pub(crate) fn step(
        &mut self,
        policy: &CapturePolicyEngine,
        batch_size: usize,
        budget: Duration,
    ) -> bool {
        let started = Instant::now();
        let end = (self.index + batch_size.max(1)).min(self.candidates.len());
        while self.index < end {
            let candidate = self.candidates[self.index];
            self.index += 1;

            let decision = policy.evaluate(&self.actor, &candidate.pos);
            if decision.allowed {
                let filtered_out = !self.actor_owns_region
                    && self
                        .filter_owner
                        .is_some_and(|filter| candidate.owner != filter);
                if !filtered_out {
                    self.kept.push(candidate.pos);
                }
            }

            if started.elapsed() >= budget {
                break;
            }
        }
        self.index >= self.candidates.len()
    }

    pub(crate) fn into_results(self) -> Vec<Coordinate> {
        self.kept
    }
}

/// Drive one scan to completion and call [`ScanCache::complete`] exactly
/// once, even when the region is gone or the actor disconnects mid-scan.
pub(crate) async fn run_scan(
    key: CacheKey,
    policy: CapturePolicyEngine,
    regions: Arc<dyn RegionProvider>,
    protections: Arc<dyn ProtectionRegistry>,
    actors: Arc<dyn ActorDirectory>,
    cache: Arc<ScanCache>,
    config: VaultConfig,
) {
    let Some(dimension) = actors.dimension_of(&key.actor) else {
        cache.complete(&key, ScanOutcome::Cancelled);
        return;
    };

    let region = match regions.regions_in(dimension) {
        Ok(list) => list.into_iter().find(|r| r.id == key.region_id),
        Err(e) => {
            log::warn!("vaultguard: region list failed in dimension {dimension}: {e}");
            None
        }
    };
    let Some(region) = region else {
        log::debug!(
            "vaultguard: scan for region {} aborted, id does not resolve",
            key.region_id
        );
        cache.complete(&key, ScanOutcome::RegionNotFound);
        return;
    };

    let actor_owns_region = region.owners.contains(&key.actor);
    let candidates = match protections.protected_in(dimension, &region.bounds) {
        Ok(candidates) => candidates,
        Err(e) => {
            log::warn!(
                "vaultguard: protection enumeration failed for region {}: {e}",
                region.id
            );
            Vec::new()
        }
    };

    let total = candidates.len();
    let mut task = ScanTask::new(key.actor, key.filter_owner, actor_owns_region, candidates);
    loop {
        if !actors.is_connected(&key.actor) {
            log::debug!(
                "vaultguard: scan for region {} cancelled, actor {} offline",
                key.region_id,
                key.actor
            );
            cache.complete(&key, ScanOutcome::Cancelled);
            return;
        }
        if task.step(&policy, config.scan.batch_size, config.step_budget()) {
            break;
        }
        tokio::time::sleep(config.yield_interval()).await;
    }

    let results = task.into_results();
    log::debug!(
        "vaultguard: scan for region {} kept {}/{total} protections",
        key.region_id,
        results.len()
    );
    cache.complete(&key, ScanOutcome::Complete(results));
}
