pub mod clock;
pub mod entity;
pub mod id;
pub mod notify;
pub mod store;

pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
pub use entity::{Ball, Cone, EntityCollections, EntityId, EntityKind, Goal, Player, Positioned, Team};
pub use id::IdGenerator;
pub use notify::Notifier;
pub use store::{EntityStore, Step, StoreEvent};
