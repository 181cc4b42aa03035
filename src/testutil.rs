//! In-memory provider implementations for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use uuid::Uuid;

use crate::model::{BoundingBox, Coordinate, Protection, Region};
use crate::providers::{ActorDirectory, ProtectionRegistry, RegionProvider};

/// Region provider over a fixed region list in one dimension.
pub(crate) struct MemoryRegions {
    dimension: u8,
    regions: Vec<Region>,
    fail_next: AtomicBool,
}

impl MemoryRegions {
    pub(crate) fn new(dimension: u8, regions: Vec<Region>) -> Self {
        Self {
            dimension,
            regions,
            fail_next: AtomicBool::new(false),
        }
    }

    /// Make the next lookup return an error.
    pub(crate) fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub(crate) fn all(&self) -> &[Region] {
        &self.regions
    }
}

impl RegionProvider for MemoryRegions {
    fn regions_at(&self, pos: &Coordinate) -> Result<Vec<Region>, String> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err("region backend offline".to_string());
        }
        if pos.dimension != self.dimension {
            return Ok(Vec::new());
        }
        Ok(self
            .regions
            .iter()
            .filter(|r| r.bounds.contains(&pos.pos))
            .cloned()
            .collect())
    }

    fn regions_in(&self, dimension: u8) -> Result<Vec<Region>, String> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err("region backend offline".to_string());
        }
        if dimension != self.dimension {
            return Ok(Vec::new());
        }
        Ok(self.regions.clone())
    }
}

/// Protection registry over an ordered record list. Enumeration order is
/// insertion order. Counts lookups so tests can assert how often the policy
/// ran.
pub(crate) struct MemoryProtections {
    records: Vec<Protection>,
    fail_next: AtomicBool,
    owner_lookups: AtomicUsize,
    enumerations: AtomicUsize,
}

impl MemoryProtections {
    pub(crate) fn new(records: Vec<(Coordinate, Uuid)>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|(pos, owner)| Protection { pos, owner })
                .collect(),
            fail_next: AtomicBool::new(false),
            owner_lookups: AtomicUsize::new(0),
            enumerations: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub(crate) fn owner_lookups(&self) -> usize {
        self.owner_lookups.load(Ordering::SeqCst)
    }

    pub(crate) fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }
}

impl ProtectionRegistry for MemoryProtections {
    fn owner_of(&self, pos: &Coordinate) -> Result<Option<Uuid>, String> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err("protection backend offline".to_string());
        }
        self.owner_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .iter()
            .find(|p| p.pos == *pos)
            .map(|p| p.owner))
    }

    fn protected_in(
        &self,
        dimension: u8,
        bounds: &BoundingBox,
    ) -> Result<Vec<Protection>, String> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err("protection backend offline".to_string());
        }
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .iter()
            .filter(|p| p.pos.dimension == dimension && bounds.contains(&p.pos.pos))
            .copied()
            .collect())
    }
}

#[derive(Default)]
struct ActorState {
    overrides: HashSet<Uuid>,
    offline: HashSet<Uuid>,
    dimensions: HashMap<Uuid, u8>,
    /// Remaining `is_connected` calls that still answer true. Lets a test
    /// disconnect an actor deterministically between scan increments.
    online_budget: HashMap<Uuid, u32>,
}

/// Actor directory where everyone is connected in dimension 0 by default.
#[derive(Default)]
pub(crate) struct MemoryActors {
    state: Mutex<ActorState>,
}

impl MemoryActors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn grant_override(&self, actor: Uuid) {
        if let Ok(mut state) = self.state.lock() {
            state.overrides.insert(actor);
        }
    }

    pub(crate) fn set_offline(&self, actor: Uuid) {
        if let Ok(mut state) = self.state.lock() {
            state.offline.insert(actor);
        }
    }

    pub(crate) fn set_online_budget(&self, actor: Uuid, checks: u32) {
        if let Ok(mut state) = self.state.lock() {
            state.online_budget.insert(actor, checks);
        }
    }
}

impl ActorDirectory for MemoryActors {
    fn has_override(&self, actor: &Uuid) -> bool {
        self.state
            .lock()
            .map_or(false, |state| state.overrides.contains(actor))
    }

    fn is_connected(&self, actor: &Uuid) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        if state.offline.contains(actor) {
            return false;
        }
        match state.online_budget.get_mut(actor) {
            Some(0) => false,
            Some(remaining) => {
                *remaining -= 1;
                true
            }
            None => true,
        }
    }

    fn dimension_of(&self, actor: &Uuid) -> Option<u8> {
        let state = self.state.lock().ok()?;
        if state.offline.contains(actor) {
            return None;
        }
        Some(state.dimensions.get(actor).copied().unwrap_or(0))
    }
}
