//! vaultguard - capture authorization for converting world containers into
//! portable vaults.
//!
//! This crate is structured in a decentralized way:
//! - **[model]** - Positions, regions, and the decision record
//! - **[providers]** - Trait seams for region, protection, and actor data
//! - **[policy]** - The capture authorization policy
//! - **[cache]** - Scan result cache with request coalescing
//! - **[scanner]** - Time-sliced, resumable region scans
//! - **[session]** - Per-actor capture mode and conversion cooldown
//! - **[config]** - TOML-backed tunables
//!
//! Decoupled from any particular server: the host wires its own provider
//! implementations into [`VaultGuard`] and drives everything through its
//! three entry points (`evaluate`, `scan`, `invalidate_cache`).

pub mod cache;
pub mod config;
pub mod model;
pub mod policy;
pub mod providers;
pub mod session;

mod scanner;
#[cfg(test)]
pub(crate) mod testutil;

use std::sync::Arc;

use tokio::sync::oneshot;
use uuid::Uuid;

use cache::{CacheKey, Coalesce, ScanCache, ScanOutcome};
use config::VaultConfig;
use model::{Coordinate, Decision};
use policy::CapturePolicyEngine;
use providers::{ActorDirectory, ProtectionRegistry, RegionProvider};
use session::SessionTracker;

/// Why a scan could not produce a result. Provider-level faults never reach
/// this type; they degrade inside the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// The region id does not resolve in the actor's current dimension,
    /// usually a race between UI state and a live region edit.
    RegionNotFound,
    /// The actor disconnected before the scan finished.
    Cancelled,
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RegionNotFound => f.write_str("region not found"),
            Self::Cancelled => f.write_str("scan cancelled"),
        }
    }
}

impl std::error::Error for ScanError {}

/// The capture engine: policy evaluation, cached region scans, and capture
/// sessions behind one handle. Cheap to share via `Arc`.
pub struct VaultGuard {
    regions: Arc<dyn RegionProvider>,
    protections: Arc<dyn ProtectionRegistry>,
    actors: Arc<dyn ActorDirectory>,
    policy: CapturePolicyEngine,
    cache: Arc<ScanCache>,
    sessions: SessionTracker,
    config: VaultConfig,
}

impl VaultGuard {
    #[must_use]
    pub fn new(
        regions: Arc<dyn RegionProvider>,
        protections: Arc<dyn ProtectionRegistry>,
        actors: Arc<dyn ActorDirectory>,
        config: VaultConfig,
    ) -> Self {
        let policy =
            CapturePolicyEngine::new(regions.clone(), protections.clone(), actors.clone());
        let cache = Arc::new(ScanCache::new(config.cache_ttl()));
        let sessions = SessionTracker::new(config.cooldown());
        Self {
            regions,
            protections,
            actors,
            policy,
            cache,
            sessions,
            config,
        }
    }

    /// Synchronous authorization check. Safe to call before any world
    /// mutation; never blocks and never fails.
    #[must_use]
    pub fn evaluate(&self, actor: &Uuid, pos: &Coordinate) -> Decision {
        self.policy.evaluate(actor, pos)
    }

    /// List every container in `region_id` that `actor` may capture,
    /// optionally restricted to containers owned by `filter_owner` (region
    /// owners bypass the filter).
    ///
    /// Served from cache when fresh; otherwise joins the in-flight scan for
    /// the same `(region, actor, filter)` or starts a new one. The result
    /// arrives exactly once per caller.
    pub async fn scan(
        &self,
        actor: Uuid,
        region_id: &str,
        filter_owner: Option<Uuid>,
    ) -> Result<Vec<Coordinate>, ScanError> {
        let key = CacheKey {
            region_id: region_id.to_string(),
            actor,
            filter_owner,
        };
        if let Some(results) = self.cache.lookup(&key) {
            return Ok(results);
        }

        let (tx, rx) = oneshot::channel();
        if self.cache.try_coalesce(key.clone(), tx) == Coalesce::StartedNew {
            tokio::spawn(scanner::run_scan(
                key,
                self.policy.clone(),
                self.regions.clone(),
                self.protections.clone(),
                self.actors.clone(),
                self.cache.clone(),
                self.config.clone(),
            ));
        }

        match rx.await {
            Ok(ScanOutcome::Complete(results)) => Ok(results),
            Ok(ScanOutcome::RegionNotFound) => Err(ScanError::RegionNotFound),
            Ok(ScanOutcome::Cancelled) | Err(_) => Err(ScanError::Cancelled),
        }
    }

    /// Drop every cached scan result. Call when region or protection data
    /// changed out-of-band (permissions edited, region redefined). Scans
    /// already in flight are unaffected.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate();
    }

    /// Per-actor capture mode and conversion cooldown state.
    #[must_use]
    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }
}
