//! Shared value types: positions, bounding boxes, regions, and the
//! authorization decision record.
//!
//! Decoupled from any server or storage backend so the policy and scan logic
//! can be reused or tested independently.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A discrete block position inside one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// A block position qualified by its dimension id. Used as the protection
/// registry lookup key and as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub dimension: u8,
    pub pos: BlockPos,
}

impl Coordinate {
    #[must_use]
    pub const fn new(dimension: u8, x: i32, y: i32, z: i32) -> Self {
        Self {
            dimension,
            pos: BlockPos::new(x, y, z),
        }
    }
}

/// Axis-aligned bounding box with inclusive faces. Corners are auto-sorted
/// so `min` is always the lower corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl BoundingBox {
    /// Build from two arbitrary opposite corners.
    #[must_use]
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Returns true if the position is inside this box (inclusive min/max).
    #[must_use]
    pub fn contains(&self, pos: &BlockPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }

    /// Returns true if `other` fits entirely inside this box.
    #[must_use]
    pub fn contains_box(&self, other: &Self) -> bool {
        self.contains(&other.min) && self.contains(&other.max)
    }

    /// True if `other` fits inside this box and the boxes are not identical.
    /// Used for parent-region detection over overlapping regions.
    #[must_use]
    pub fn strictly_contains(&self, other: &Self) -> bool {
        self != other && self.contains_box(other)
    }
}

/// A named region snapshot: cuboid bounds plus owner and member sets.
/// Owners and members are jointly called participants. Snapshots are fetched
/// fresh from the provider per evaluation and never cached here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub bounds: BoundingBox,
    pub owners: HashSet<Uuid>,
    pub members: HashSet<Uuid>,
}

impl Region {
    /// Returns true if the actor is an owner or member of this region.
    #[must_use]
    pub fn is_participant(&self, actor: &Uuid) -> bool {
        self.owners.contains(actor) || self.members.contains(actor)
    }
}

/// A protection record from registry enumeration: one protected position and
/// the actor it is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protection {
    pub pos: Coordinate,
    pub owner: Uuid,
}

/// Per-region diagnostic attached to a [`Decision`], one per region that
/// overlaps the evaluated position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionStatus {
    pub region_id: String,
    pub actor_is_participant: bool,
    pub owner_is_participant: bool,
}

/// Why a capture request was granted or refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonCode {
    Allowed,
    /// The container is outside every region.
    NotInRegion,
    /// The actor owns the container and still participates in an overlapping
    /// region; participants may not vault their own containers.
    OwnerSelfInRegion,
    /// Both the actor and the container's owner participate in overlapping
    /// regions; one participant may not seize another's property.
    ContainerOwnerInOverlap,
    /// No protection record exists and the actor holds no override.
    UnprotectedNoOverride,
    /// The actor neither participates in a qualifying region nor owns the
    /// container.
    NotInvolvedNotOwner,
}

impl ReasonCode {
    /// Human-readable label for messages and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::NotInRegion => "not in a region",
            Self::OwnerSelfInRegion => "own container inside a region",
            Self::ContainerOwnerInOverlap => "container owner shares the region",
            Self::UnprotectedNoOverride => "unprotected container",
            Self::NotInvolvedNotOwner => "not involved and not the owner",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The full result of one authorization evaluation. Produced fresh per call
/// and never mutated after return.
#[derive(Debug, Clone)]
pub struct Decision {
    pub allowed: bool,
    pub reason: ReasonCode,
    pub has_override: bool,
    pub actor_participant_any: bool,
    pub owner_participant_any: bool,
    pub actor_is_owner: bool,
    pub disallowed_self: bool,
    pub owner: Option<Uuid>,
    pub per_region: Vec<RegionStatus>,
}
