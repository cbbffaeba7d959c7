//! One open tactic: live pitch, keyframes, playback and drag handling.
//!
//! The board is what the UI talks to. Every call is synchronous and either
//! does what it says or quietly does nothing when it does not apply.

pub mod drag;

pub use drag::{DragSession, DragTarget};

use crate::core::{
    Clock, EntityCollections, EntityId, EntityKind, EntityStore, MonotonicClock, Notifier,
    Step, StoreEvent, SystemClock,
};
use crate::playback::{
    FrameScheduler, PairingMode, PlaybackConfig, PlaybackEngine, PlaybackState, Progress,
    Scheduler, TickHandle, Timeline,
};
use std::sync::mpsc::Receiver;
use tracing::{debug, info};

/// Snapshot of what the controls need to enable/disable themselves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub state: PlaybackState,
    pub speed: f64,
    pub step_count: usize,
    pub loaded_index: Option<usize>,
    pub progress: Progress,
    pub dragging: bool,
}

pub struct Board<S: Scheduler = FrameScheduler> {
    store: EntityStore,
    timeline: Timeline,
    engine: PlaybackEngine<S>,
    drag: DragSession,
    loaded_index: Option<usize>,
    clock: Box<dyn Clock>,
    controls: Notifier<ControlState>,
}

impl Board<FrameScheduler> {
    /// Board with wall-clock ids and a monotonic playback clock
    pub fn new(config: PlaybackConfig) -> Self {
        Board::with_parts(
            EntityStore::with_clock(Box::new(SystemClock)),
            FrameScheduler::new(),
            Box::new(MonotonicClock::new()),
            config,
        )
    }

    /// Board where ids and playback both read `clock`
    pub fn with_clock<C: Clock + Clone + 'static>(clock: C, config: PlaybackConfig) -> Self {
        Board::with_parts(
            EntityStore::with_clock(Box::new(clock.clone())),
            FrameScheduler::new(),
            Box::new(clock),
            config,
        )
    }

    /// Deliver every tick due this frame. Returns how many ran.
    pub fn pump_frame(&mut self) -> usize {
        let due = self.engine.scheduler_mut().take_due();
        due.into_iter().filter(|&handle| self.tick(handle)).count()
    }
}

impl<S: Scheduler> Board<S> {
    pub fn with_parts(
        store: EntityStore,
        scheduler: S,
        clock: Box<dyn Clock>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            store,
            timeline: Timeline::new(),
            engine: PlaybackEngine::new(scheduler, config),
            drag: DragSession::new(),
            loaded_index: None,
            clock,
            controls: Notifier::new(),
        }
    }

    /// Read-only view of the live pitch
    pub fn entities(&self) -> &EntityCollections {
        self.store.entities()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn engine(&self) -> &PlaybackEngine<S> {
        &self.engine
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        self.engine.scheduler_mut()
    }

    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        self.store.subscribe()
    }

    pub fn subscribe_playback(&mut self) -> Receiver<PlaybackState> {
        self.engine.subscribe()
    }

    /// Control state after every change to playback state, speed,
    /// keyframe count, loaded keyframe or drag. Not sent per frame.
    pub fn subscribe_controls(&mut self) -> Receiver<ControlState> {
        self.controls.subscribe()
    }

    pub fn control_state(&self) -> ControlState {
        ControlState {
            state: self.engine.state(),
            speed: self.engine.speed(),
            step_count: self.timeline.len(),
            loaded_index: self.loaded_index,
            progress: self.engine.progress(&self.timeline),
            dragging: self.drag.is_dragging(),
        }
    }

    // ---- entities ----

    pub fn add_entity(
        &mut self,
        kind: EntityKind,
        count: usize,
        color: Option<&str>,
        team: Option<EntityId>,
    ) {
        self.store.add_entity(kind, count, color, team);
    }

    pub fn add_team(&mut self, name: &str, color: &str) -> EntityId {
        self.store.add_team(name, color)
    }

    pub fn move_entity(&mut self, kind: EntityKind, id: EntityId, x: f64, y: f64) -> bool {
        self.store.move_entity(kind, id, x, y)
    }

    pub fn remove_last(&mut self, kind: EntityKind) -> Option<EntityId> {
        self.store.remove_last(kind)
    }

    /// Wipe the pitch and every keyframe
    pub fn clear_pitch(&mut self) {
        self.timeline.clear();
        self.engine.stop(&self.timeline, &mut self.store);
        self.store.clear();
        self.drag.stop();
        self.loaded_index = None;
        info!("Pitch cleared");
        self.notify_controls();
    }

    // ---- keyframes ----

    /// Save the pitch as a keyframe. Overwrites the loaded keyframe if one
    /// is loaded, appends otherwise. Returns the index written.
    pub fn save_step(&mut self) -> usize {
        let step = self.store.snapshot();
        let index = match self.loaded_index.take() {
            Some(index) if index < self.timeline.len() => {
                self.timeline.overwrite(index, step);
                index
            }
            _ => self.timeline.append(step),
        };
        debug!("Saved step {} ({} total)", index, self.timeline.len());
        self.notify_controls();
        index
    }

    /// Put keyframe `index` on the pitch and mark it for overwrite
    pub fn load_step(&mut self, index: usize) -> bool {
        match self.timeline.get(index) {
            Some(step) => {
                self.store.restore(step);
                self.loaded_index = Some(index);
                self.notify_controls();
                true
            }
            None => false,
        }
    }

    pub fn loaded_index(&self) -> Option<usize> {
        self.loaded_index
    }

    /// Replace the keyframes with persisted ones and show the first.
    /// An empty list leaves an empty pitch.
    pub fn load_timeline(&mut self, steps: Vec<Step>) {
        self.drag.stop();
        self.loaded_index = None;
        self.timeline.load(steps);
        self.engine.stop(&self.timeline, &mut self.store);
        if self.timeline.is_empty() {
            self.store.clear();
        }
        info!("Loaded timeline with {} step(s)", self.timeline.len());
        self.notify_controls();
    }

    /// Keyframes in persistable form
    pub fn to_array(&self) -> Vec<Step> {
        self.timeline.to_array()
    }

    // ---- playback ----

    pub fn play(&mut self) -> bool {
        let started = self.engine.play(&self.timeline);
        if started {
            self.notify_controls();
        }
        started
    }

    pub fn pause(&mut self) -> bool {
        let now = self.clock.now_ms();
        let paused = self.engine.pause(now);
        if paused {
            self.notify_controls();
        }
        paused
    }

    pub fn resume(&mut self) -> bool {
        let now = self.clock.now_ms();
        let resumed = self.engine.resume(now);
        if resumed {
            self.notify_controls();
        }
        resumed
    }

    pub fn stop(&mut self) {
        let before = self.engine.state();
        self.engine.stop(&self.timeline, &mut self.store);
        if before != PlaybackState::Idle {
            self.notify_controls();
        }
    }

    pub fn set_speed(&mut self, speed: f64) {
        let before = self.engine.speed();
        self.engine.set_speed(speed);
        if self.engine.speed() != before {
            self.notify_controls();
        }
    }

    pub fn set_segment_duration(&mut self, duration_ms: f64) {
        self.engine.set_segment_duration(duration_ms);
    }

    pub fn set_pairing(&mut self, pairing: PairingMode) {
        self.engine.set_pairing(pairing);
    }

    /// Deliver a scheduled tick at the clock's current time
    pub fn tick(&mut self, handle: TickHandle) -> bool {
        let now = self.clock.now_ms();
        let before = self.engine.state();
        let ran = self.engine.tick(handle, now, &self.timeline, &mut self.store);
        if self.engine.state() != before {
            self.notify_controls();
        }
        ran
    }

    // ---- dragging ----

    pub fn drag_start(&mut self, kind: EntityKind, id: EntityId) {
        self.drag.start(kind, id);
        self.notify_controls();
    }

    pub fn drag_move(&mut self, x: f64, y: f64) -> bool {
        self.drag.move_to(&mut self.store, x, y)
    }

    pub fn drag_stop(&mut self) {
        if self.drag.is_dragging() {
            self.drag.stop();
            self.notify_controls();
        }
    }

    fn notify_controls(&mut self) {
        let state = self.control_state();
        self.controls.emit(state);
    }
}
