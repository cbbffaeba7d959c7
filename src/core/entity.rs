use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier shared by every entity kind
pub type EntityId = u64;

pub const DEFAULT_PLAYER_COLOR: &str = "#2563eb";
pub const DEFAULT_BALL_COLOR: &str = "#ffffff";
pub const DEFAULT_GOAL_COLOR: &str = "#ffffff";
pub const DEFAULT_CONE_COLOR: &str = "#f97316";
pub const DEFAULT_TEAM_COLOR: &str = "#dc2626";

pub const DEFAULT_GOAL_WIDTH: f64 = 70.0;
pub const DEFAULT_GOAL_DEPTH: f64 = 20.0;

/// The five kinds of things that can live on the pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Ball,
    Goal,
    Cone,
    Team,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Player,
        EntityKind::Ball,
        EntityKind::Goal,
        EntityKind::Cone,
        EntityKind::Team,
    ];

    /// Color used when neither a team nor an explicit color is given
    pub fn default_color(self) -> &'static str {
        match self {
            EntityKind::Player => DEFAULT_PLAYER_COLOR,
            EntityKind::Ball => DEFAULT_BALL_COLOR,
            EntityKind::Goal => DEFAULT_GOAL_COLOR,
            EntityKind::Cone => DEFAULT_CONE_COLOR,
            EntityKind::Team => DEFAULT_TEAM_COLOR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Ball => "ball",
            EntityKind::Goal => "goal",
            EntityKind::Cone => "cone",
            EntityKind::Team => "team",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numbered player marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: EntityId,
    /// Shirt number shown on the marker
    pub number: u32,
    pub x: f64,
    pub y: f64,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A goal frame. `x`/`y` is the center of the frame; renderers derive
/// the draw rectangle from `width` and `depth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub depth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Goal {
    /// Top-left corner of the draw rectangle
    pub fn top_left(&self) -> (f64, f64) {
        (self.x - self.width / 2.0, self.y - self.depth / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: EntityId,
    pub name: String,
    pub color: String,
}

/// Anything with a position on the pitch
pub trait Positioned: Clone {
    fn id(&self) -> EntityId;
    fn position(&self) -> (f64, f64);
    fn set_position(&mut self, x: f64, y: f64);
}

macro_rules! impl_positioned {
    ($($ty:ty),*) => {
        $(
            impl Positioned for $ty {
                fn id(&self) -> EntityId {
                    self.id
                }

                fn position(&self) -> (f64, f64) {
                    (self.x, self.y)
                }

                fn set_position(&mut self, x: f64, y: f64) {
                    self.x = x;
                    self.y = y;
                }
            }
        )*
    };
}

impl_positioned!(Player, Ball, Goal, Cone);

/// The full set of entities on the pitch at one instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityCollections {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub balls: Vec<Ball>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub cones: Vec<Cone>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl EntityCollections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities of one kind
    pub fn len_of(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Player => self.players.len(),
            EntityKind::Ball => self.balls.len(),
            EntityKind::Goal => self.goals.len(),
            EntityKind::Cone => self.cones.len(),
            EntityKind::Team => self.teams.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|&kind| self.len_of(kind) == 0)
    }

    pub fn team(&self, id: EntityId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Position of an entity, if it exists and has one
    pub fn position_of(&self, kind: EntityKind, id: EntityId) -> Option<(f64, f64)> {
        match kind {
            EntityKind::Player => find_position(&self.players, id),
            EntityKind::Ball => find_position(&self.balls, id),
            EntityKind::Goal => find_position(&self.goals, id),
            EntityKind::Cone => find_position(&self.cones, id),
            EntityKind::Team => None,
        }
    }

    /// Flat list of every positioned entity, in kind order
    pub fn positions(&self) -> Vec<(EntityKind, EntityId, f64, f64)> {
        let mut out = Vec::new();
        collect_positions(&mut out, EntityKind::Player, &self.players);
        collect_positions(&mut out, EntityKind::Ball, &self.balls);
        collect_positions(&mut out, EntityKind::Goal, &self.goals);
        collect_positions(&mut out, EntityKind::Cone, &self.cones);
        out
    }
}

fn find_position<T: Positioned>(items: &[T], id: EntityId) -> Option<(f64, f64)> {
    items.iter().find(|item| item.id() == id).map(Positioned::position)
}

fn collect_positions<T: Positioned>(
    out: &mut Vec<(EntityKind, EntityId, f64, f64)>,
    kind: EntityKind,
    items: &[T],
) {
    for item in items {
        let (x, y) = item.position();
        out.push((kind, item.id(), x, y));
    }
}
