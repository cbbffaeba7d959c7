use crate::core::clock::Clock;
use crate::core::entity::{
    Ball, Cone, EntityCollections, EntityId, EntityKind, Goal, Player, Positioned, Team,
    DEFAULT_GOAL_DEPTH, DEFAULT_GOAL_WIDTH,
};
use crate::core::id::IdGenerator;
use crate::core::notify::Notifier;
use std::sync::mpsc::Receiver;
use tracing::debug;

/// A snapshot of the whole pitch, stored as one keyframe
pub type Step = EntityCollections;

/// Change notification emitted after each store mutation
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Added { kind: EntityKind, count: usize },
    Moved { kind: EntityKind, id: EntityId },
    Removed { kind: EntityKind, id: EntityId },
    Cleared,
    Restored,
    /// Written by a playback tick
    Frame,
}

/// The live, mutable set of entities currently on the pitch
#[derive(Debug)]
pub struct EntityStore {
    entities: EntityCollections,
    ids: IdGenerator,
    events: Notifier<StoreEvent>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new(IdGenerator::default())
    }
}

impl EntityStore {
    pub fn new(ids: IdGenerator) -> Self {
        Self {
            entities: EntityCollections::new(),
            ids,
            events: Notifier::new(),
        }
    }

    /// Store whose ids come from the given clock
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self::new(IdGenerator::new(clock))
    }

    /// Read-only view for rendering
    pub fn entities(&self) -> &EntityCollections {
        &self.entities
    }

    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Append `count` new entities of `kind`.
    ///
    /// Color resolves as team color, then `color`, then the kind default.
    /// An unknown `team` id is treated as no team.
    pub fn add_entity(
        &mut self,
        kind: EntityKind,
        count: usize,
        color: Option<&str>,
        team: Option<EntityId>,
    ) {
        if count == 0 {
            return;
        }

        let team = team.and_then(|id| self.entities.team(id)).cloned();
        let color = team
            .as_ref()
            .map(|t| t.color.clone())
            .or_else(|| color.map(str::to_string))
            .unwrap_or_else(|| kind.default_color().to_string());

        for _ in 0..count {
            let id = self.ids.gen();
            let slot = self.entities.len_of(kind);
            match kind {
                EntityKind::Player => {
                    let (x, y) = player_slot(slot);
                    let number = self.next_player_number();
                    self.entities.players.push(Player {
                        id,
                        number,
                        x,
                        y,
                        color: color.clone(),
                        team_id: team.as_ref().map(|t| t.id),
                    });
                }
                EntityKind::Ball => {
                    self.entities.balls.push(Ball {
                        id,
                        x: 300.0 + slot as f64 * 25.0,
                        y: 250.0,
                        color: Some(color.clone()),
                    });
                }
                EntityKind::Goal => {
                    self.entities.goals.push(Goal {
                        id,
                        x: 60.0 + slot as f64 * 120.0,
                        y: 420.0,
                        width: DEFAULT_GOAL_WIDTH,
                        depth: DEFAULT_GOAL_DEPTH,
                        color: Some(color.clone()),
                    });
                }
                EntityKind::Cone => {
                    let (x, y) = cone_slot(slot);
                    self.entities.cones.push(Cone {
                        id,
                        x,
                        y,
                        color: Some(color.clone()),
                    });
                }
                EntityKind::Team => {
                    self.entities.teams.push(Team {
                        id,
                        name: format!("Team {}", slot + 1),
                        color: color.clone(),
                    });
                }
            }
        }

        debug!("Added {} {}(s), color {}", count, kind, color);
        self.events.emit(StoreEvent::Added { kind, count });
    }

    /// Add a named team and return its id
    pub fn add_team(&mut self, name: &str, color: &str) -> EntityId {
        let id = self.ids.gen();
        self.entities.teams.push(Team {
            id,
            name: name.to_string(),
            color: color.to_string(),
        });
        self.events.emit(StoreEvent::Added { kind: EntityKind::Team, count: 1 });
        id
    }

    /// Move an entity to `(x, y)`. Goals take the new center.
    ///
    /// Returns false (and changes nothing) when the id is unknown.
    pub fn move_entity(&mut self, kind: EntityKind, id: EntityId, x: f64, y: f64) -> bool {
        let moved = match kind {
            EntityKind::Player => move_in(&mut self.entities.players, id, x, y),
            EntityKind::Ball => move_in(&mut self.entities.balls, id, x, y),
            EntityKind::Goal => move_in(&mut self.entities.goals, id, x, y),
            EntityKind::Cone => move_in(&mut self.entities.cones, id, x, y),
            EntityKind::Team => false,
        };

        if moved {
            self.events.emit(StoreEvent::Moved { kind, id });
        }
        moved
    }

    /// Remove the most recently added entity of `kind`
    pub fn remove_last(&mut self, kind: EntityKind) -> Option<EntityId> {
        let removed = match kind {
            EntityKind::Player => self.entities.players.pop().map(|e| e.id),
            EntityKind::Ball => self.entities.balls.pop().map(|e| e.id),
            EntityKind::Goal => self.entities.goals.pop().map(|e| e.id),
            EntityKind::Cone => self.entities.cones.pop().map(|e| e.id),
            EntityKind::Team => self.entities.teams.pop().map(|e| e.id),
        };

        if let Some(id) = removed {
            debug!("Removed {} {}", kind, id);
            self.events.emit(StoreEvent::Removed { kind, id });
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entities = EntityCollections::new();
        self.events.emit(StoreEvent::Cleared);
    }

    /// Deep, independent copy of the current pitch
    pub fn snapshot(&self) -> Step {
        self.entities.clone()
    }

    /// Replace every collection with a copy of `step`
    pub fn restore(&mut self, step: &Step) {
        self.entities = step.clone();
        self.events.emit(StoreEvent::Restored);
    }

    /// Replace every collection with an interpolated frame
    pub fn apply_frame(&mut self, frame: EntityCollections) {
        self.entities = frame;
        self.events.emit(StoreEvent::Frame);
    }

    fn next_player_number(&self) -> u32 {
        self.entities
            .players
            .iter()
            .map(|p| p.number)
            .max()
            .map_or(1, |n| n + 1)
    }
}

fn move_in<T: Positioned>(items: &mut [T], id: EntityId, x: f64, y: f64) -> bool {
    match items.iter_mut().find(|item| item.id() == id) {
        Some(item) => {
            item.set_position(x, y);
            true
        }
        None => false,
    }
}

/// Players fill a 10-wide grid
fn player_slot(slot: usize) -> (f64, f64) {
    let col = (slot % 10) as f64;
    let row = (slot / 10) as f64;
    (80.0 + col * 45.0, 80.0 + row * 45.0)
}

/// Cones fill a 12-wide grid
fn cone_slot(slot: usize) -> (f64, f64) {
    let col = (slot % 12) as f64;
    let row = (slot / 12) as f64;
    (150.0 + col * 30.0, 180.0 + row * 30.0)
}
