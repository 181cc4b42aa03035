//! Per-actor capture sessions: whether an actor has capture mode armed, and
//! the cooldown between two conversions.
//!
//! An explicit state table keyed by actor id; the owning component (command
//! layer, disconnect handler) drives the transitions.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default)]
struct CaptureSession {
    armed: bool,
    last_conversion: Option<Instant>,
}

/// Tracks capture mode and conversion cooldowns for all connected actors.
pub struct SessionTracker {
    sessions: RwLock<HashMap<Uuid, CaptureSession>>,
    cooldown: Duration,
}

impl SessionTracker {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            cooldown,
        }
    }

    /// Put the actor into capture mode.
    pub fn arm(&self, actor: Uuid) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.entry(actor).or_default().armed = true;
        }
    }

    /// Leave capture mode, keeping the cooldown timestamp.
    pub fn disarm(&self, actor: &Uuid) {
        if let Ok(mut sessions) = self.sessions.write() {
            if let Some(session) = sessions.get_mut(actor) {
                session.armed = false;
            }
        }
    }

    #[must_use]
    pub fn is_armed(&self, actor: &Uuid) -> bool {
        self.sessions
            .read()
            .map_or(false, |sessions| {
                sessions.get(actor).map_or(false, |s| s.armed)
            })
    }

    /// Record a conversion attempt. Refuses with the remaining wait time if
    /// the actor converted within the cooldown window.
    pub fn try_begin_conversion(&self, actor: Uuid) -> Result<(), Duration> {
        let Ok(mut sessions) = self.sessions.write() else {
            return Err(self.cooldown);
        };
        let session = sessions.entry(actor).or_default();
        if let Some(last) = session.last_conversion {
            let elapsed = last.elapsed();
            if elapsed < self.cooldown {
                return Err(self.cooldown - elapsed);
            }
        }
        session.last_conversion = Some(Instant::now());
        Ok(())
    }

    /// Drop all state for an actor, typically on disconnect.
    pub fn clear(&self, actor: &Uuid) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.remove(actor);
        }
    }
}
