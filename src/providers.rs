//! Provider traits: the narrow seams through which the core reads world
//! state. Implementations live with the host (server plugin, database layer,
//! test mocks); the core never caches what they return.

use uuid::Uuid;

use crate::model::{BoundingBox, Coordinate, Protection, Region};

/// Source of region snapshots. Freshness is the provider's responsibility;
/// the core fetches per call.
pub trait RegionProvider: Send + Sync {
    /// All regions whose bounds contain the coordinate, inclusive on all six
    /// faces.
    fn regions_at(&self, pos: &Coordinate) -> Result<Vec<Region>, String>;

    /// All regions defined in a dimension. Used to resolve a region by id.
    fn regions_in(&self, dimension: u8) -> Result<Vec<Region>, String>;
}

/// Source of protection records binding positions to owning actors.
pub trait ProtectionRegistry: Send + Sync {
    /// The actor a position's protection is bound to, if any.
    fn owner_of(&self, pos: &Coordinate) -> Result<Option<Uuid>, String>;

    /// Every protected position inside the box, in the registry's own
    /// enumeration order.
    fn protected_in(&self, dimension: u8, bounds: &BoundingBox)
        -> Result<Vec<Protection>, String>;
}

/// Live actor facts: override capability, connectivity, current dimension.
pub trait ActorDirectory: Send + Sync {
    /// Whether the actor holds the capture override capability.
    fn has_override(&self, actor: &Uuid) -> bool;

    /// Whether the actor is currently connected. Checked between scan
    /// increments for cooperative cancellation.
    fn is_connected(&self, actor: &Uuid) -> bool;

    /// The dimension the actor is currently in, if connected.
    fn dimension_of(&self, actor: &Uuid) -> Option<u8>;
}
