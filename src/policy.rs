//! Capture authorization policy: decides whether an actor may convert the
//! container at a position into a vault.
//!
//! Pure over the provider snapshots it reads: no shared state, no blocking,
//! and it never returns an error. Provider failures degrade to "no data",
//! which denies rather than crashes.

use std::sync::Arc;

use uuid::Uuid;

use crate::model::{Coordinate, Decision, ReasonCode, RegionStatus};
use crate::providers::{ActorDirectory, ProtectionRegistry, RegionProvider};

/// Evaluates capture requests against regions and protection records.
#[derive(Clone)]
pub struct CapturePolicyEngine {
    regions: Arc<dyn RegionProvider>,
    protections: Arc<dyn ProtectionRegistry>,
    actors: Arc<dyn ActorDirectory>,
}

impl CapturePolicyEngine {
    #[must_use]
    pub fn new(
        regions: Arc<dyn RegionProvider>,
        protections: Arc<dyn ProtectionRegistry>,
        actors: Arc<dyn ActorDirectory>,
    ) -> Self {
        Self {
            regions,
            protections,
            actors,
        }
    }

    /// Decide whether `actor` may capture the container at `pos`.
    ///
    /// Region participation rules:
    /// - The actor's membership in a region counts only if that region does
    ///   not strictly enclose another overlapping region. A broad outer
    ///   region must not grant authority inside a nested, more specific one.
    /// - The container owner's membership counts in every overlapping
    ///   region, with no parent exclusion. The asymmetry is deliberate and
    ///   pinned by tests.
    #[must_use]
    pub fn evaluate(&self, actor: &Uuid, pos: &Coordinate) -> Decision {
        let owner = self.protections.owner_of(pos).unwrap_or_else(|e| {
            log::warn!("vaultguard: protection lookup failed at {pos:?}: {e}");
            None
        });
        let has_override = self.actors.has_override(actor);
        let regions = self.regions.regions_at(pos).unwrap_or_else(|e| {
            log::warn!("vaultguard: region lookup failed at {pos:?}: {e}");
            Vec::new()
        });

        let mut actor_participant_any = false;
        let mut owner_participant_any = false;
        let mut per_region = Vec::with_capacity(regions.len());

        for (i, region) in regions.iter().enumerate() {
            let actor_participant = region.is_participant(actor);
            let owner_participant = owner
                .as_ref()
                .is_some_and(|o| region.is_participant(o));
            let is_parent = regions
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && region.bounds.strictly_contains(&other.bounds));

            if actor_participant && !is_parent {
                actor_participant_any = true;
            }
            if owner_participant {
                owner_participant_any = true;
            }
            per_region.push(RegionStatus {
                region_id: region.id.clone(),
                actor_is_participant: actor_participant,
                owner_is_participant: owner_participant,
            });
        }

        let actor_is_owner = owner.as_ref() == Some(actor);
        let disallowed_self = actor_participant_any && actor_is_owner;
        let base_allowed = if actor_participant_any {
            owner.is_some() && !actor_is_owner && !owner_participant_any
        } else {
            actor_is_owner
        };
        let in_any_region = !regions.is_empty();
        let allowed = owner.is_some()
            && !disallowed_self
            && ((in_any_region && base_allowed) || has_override);

        let reason = if allowed {
            ReasonCode::Allowed
        } else if !in_any_region {
            ReasonCode::NotInRegion
        } else if disallowed_self {
            ReasonCode::OwnerSelfInRegion
        } else if actor_participant_any && owner_participant_any {
            ReasonCode::ContainerOwnerInOverlap
        } else if owner.is_none() {
            ReasonCode::UnprotectedNoOverride
        } else {
            ReasonCode::NotInvolvedNotOwner
        };

        Decision {
            allowed,
            reason,
            has_override,
            actor_participant_any,
            owner_participant_any,
            actor_is_owner,
            disallowed_self,
            owner,
            per_region,
        }
    }
}
