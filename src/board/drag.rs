use crate::core::{EntityId, EntityKind, EntityStore};
use tracing::debug;

/// The entity currently under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragTarget {
    pub kind: EntityKind,
    pub id: EntityId,
}

/// Single-slot drag tracker.
///
/// Coordinates are expected in logical pitch space; converting from screen
/// space is the renderer's job.
#[derive(Debug, Default)]
pub struct DragSession {
    active: Option<DragTarget>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin dragging, replacing any drag already in progress
    pub fn start(&mut self, kind: EntityKind, id: EntityId) {
        if let Some(previous) = self.active {
            debug!("Drag of {} {} replaced", previous.kind, previous.id);
        }
        self.active = Some(DragTarget { kind, id });
    }

    /// Move the dragged entity, if any
    pub fn move_to(&self, store: &mut EntityStore, x: f64, y: f64) -> bool {
        match self.active {
            Some(target) => store.move_entity(target.kind, target.id, x, y),
            None => false,
        }
    }

    pub fn stop(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<DragTarget> {
        self.active
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }
}
