//! Tactics board core: entities on a 2D pitch, keyframes of those
//! entities, and a pausable player that animates between keyframes.

pub mod board;
pub mod core;
pub mod document;
pub mod playback;
pub mod settings;

pub use crate::board::{Board, ControlState, DragSession};
pub use crate::core::{EntityCollections, EntityKind, EntityStore, Step};
pub use crate::playback::{PlaybackConfig, PlaybackEngine, PlaybackState, Timeline};
