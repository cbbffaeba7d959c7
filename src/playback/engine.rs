use crate::core::{EntityStore, Notifier};
use crate::playback::interpolate::interpolate_step;
use crate::playback::{
    PairingMode, PlaybackConfig, PlaybackState, Progress, Scheduler, TickHandle, Timeline,
    MAX_SPEED, MIN_SPEED,
};
use std::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

/// Pausable, speed-scaled keyframe player.
///
/// The engine walks the timeline one segment at a time. Each tick computes
/// how far into the current segment playback is, blends the two keyframes
/// at that point and writes the result into the store. Time spent paused is
/// never counted: on pause the elapsed time of the segment is banked and
/// the segment clock restarts on resume.
pub struct PlaybackEngine<S: Scheduler> {
    scheduler: S,
    config: PlaybackConfig,
    state: PlaybackState,
    segment_index: usize,
    segment_start: Option<f64>,
    carried_elapsed_ms: f64,
    last_t: f64,
    pending: Option<TickHandle>,
    events: Notifier<PlaybackState>,
}

impl<S: Scheduler> PlaybackEngine<S> {
    pub fn new(scheduler: S, config: PlaybackConfig) -> Self {
        let mut engine = Self {
            scheduler,
            config: PlaybackConfig::default(),
            state: PlaybackState::Idle,
            segment_index: 0,
            segment_start: None,
            carried_elapsed_ms: 0.0,
            last_t: 0.0,
            pending: None,
            events: Notifier::new(),
        };
        engine.config.pairing = config.pairing;
        engine.set_segment_duration(config.segment_duration_ms);
        engine.set_speed(config.speed);
        engine
    }

    /// Get current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Get current playback speed
    pub fn speed(&self) -> f64 {
        self.config.speed
    }

    /// Set playback speed. Takes effect on the next tick; banked time is
    /// not rescaled.
    pub fn set_speed(&mut self, speed: f64) {
        if !speed.is_finite() || speed <= 0.0 {
            warn!("Ignoring invalid playback speed {}", speed);
            return;
        }
        self.config.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        debug!("Playback speed set to {}", self.config.speed);
    }

    pub fn set_segment_duration(&mut self, duration_ms: f64) {
        if !duration_ms.is_finite() || duration_ms <= 0.0 {
            warn!("Ignoring invalid segment duration {}", duration_ms);
            return;
        }
        self.config.segment_duration_ms = duration_ms;
    }

    pub fn set_pairing(&mut self, pairing: PairingMode) {
        self.config.pairing = pairing;
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// The tick the engine is waiting for, if any
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Listen for state transitions
    pub fn subscribe(&mut self) -> Receiver<PlaybackState> {
        self.events.subscribe()
    }

    pub fn progress(&self, timeline: &Timeline) -> Progress {
        Progress {
            segment_index: self.segment_index,
            segment_count: timeline.segment_count(),
            t: self.last_t,
        }
    }

    /// Start playback from the first keyframe. Does nothing unless idle
    /// with a non-empty timeline.
    pub fn play(&mut self, timeline: &Timeline) -> bool {
        if self.state != PlaybackState::Idle || timeline.is_empty() {
            return false;
        }

        self.reset_position();
        self.transition(PlaybackState::Playing);
        self.schedule();
        info!(
            "Playback started: {} step(s) at {}x",
            timeline.len(),
            self.config.speed
        );
        true
    }

    /// Pause playback, banking the time spent in the current segment
    pub fn pause(&mut self, now: f64) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }

        self.cancel_pending();
        if let Some(start) = self.segment_start.take() {
            self.carried_elapsed_ms += now - start;
        }
        self.transition(PlaybackState::Paused);
        debug!(
            "Paused in segment {} with {:.1}ms banked",
            self.segment_index, self.carried_elapsed_ms
        );
        true
    }

    /// Resume a paused playback
    pub fn resume(&mut self, now: f64) -> bool {
        if self.state != PlaybackState::Paused {
            return false;
        }

        self.segment_start = Some(now);
        self.transition(PlaybackState::Playing);
        self.schedule();
        true
    }

    /// Stop and reset. The store is put back on the first keyframe in
    /// every state, as long as there is one.
    pub fn stop(&mut self, timeline: &Timeline, store: &mut EntityStore) {
        self.cancel_pending();
        self.reset_position();

        if let Some(first) = timeline.get(0) {
            store.restore(first);
        }

        if self.state != PlaybackState::Idle {
            self.transition(PlaybackState::Idle);
            info!("Playback stopped");
        }
    }

    /// Run one frame of playback.
    ///
    /// Ticks that are not the one the engine is waiting for (for example a
    /// handle issued before a pause or stop) are ignored and return false.
    pub fn tick(
        &mut self,
        handle: TickHandle,
        now: f64,
        timeline: &Timeline,
        store: &mut EntityStore,
    ) -> bool {
        if self.state != PlaybackState::Playing || self.pending != Some(handle) {
            debug!("Ignoring stale tick {}", handle.id());
            return false;
        }
        self.pending = None;

        let Some(current) = timeline.get(self.segment_index) else {
            warn!(
                "Segment {} no longer exists, stopping playback",
                self.segment_index
            );
            self.stop(timeline, store);
            return true;
        };
        let next = timeline.get(self.segment_index + 1).unwrap_or(current);

        let start = *self.segment_start.get_or_insert(now);
        let elapsed = (now - start) + self.carried_elapsed_ms;
        let duration = self.config.segment_duration();
        let t = (elapsed / duration).clamp(0.0, 1.0);

        store.apply_frame(interpolate_step(current, next, t, self.config.pairing));
        self.last_t = t;

        if t < 1.0 {
            self.schedule();
        } else if self.segment_index + 2 < timeline.len() {
            self.segment_index += 1;
            self.carried_elapsed_ms = 0.0;
            self.segment_start = None;
            self.last_t = 0.0;
            debug!("Advancing to segment {}", self.segment_index);
            self.schedule();
        } else {
            self.stop(timeline, store);
        }
        true
    }

    fn schedule(&mut self) {
        self.pending = Some(self.scheduler.request_tick());
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_tick(handle);
        }
    }

    fn reset_position(&mut self) {
        self.segment_index = 0;
        self.segment_start = None;
        self.carried_elapsed_ms = 0.0;
        self.last_t = 0.0;
    }

    fn transition(&mut self, state: PlaybackState) {
        self.state = state;
        self.events.emit(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Ball, EntityCollections, ManualClock, Step};
    use crate::playback::FrameScheduler;

    fn ball_step(x: f64) -> Step {
        let mut step = EntityCollections::new();
        step.balls.push(Ball { id: 1, x, y: 0.0, color: None });
        step
    }

    fn setup(xs: &[f64]) -> (PlaybackEngine<FrameScheduler>, Timeline, EntityStore) {
        let engine = PlaybackEngine::new(FrameScheduler::new(), PlaybackConfig::default());
        let timeline = Timeline::from_steps(xs.iter().map(|&x| ball_step(x)).collect());
        let store = EntityStore::with_clock(Box::new(ManualClock::new(0.0)));
        (engine, timeline, store)
    }

    /// Deliver the pending tick at `now`
    fn run_frame(
        engine: &mut PlaybackEngine<FrameScheduler>,
        now: f64,
        timeline: &Timeline,
        store: &mut EntityStore,
    ) {
        for handle in engine.scheduler_mut().take_due() {
            engine.tick(handle, now, timeline, store);
        }
    }

    fn ball_x(store: &EntityStore) -> f64 {
        store.entities().balls[0].x
    }

    #[test]
    fn test_play_on_empty_timeline_is_noop() {
        let (mut engine, _, _) = setup(&[]);
        let empty = Timeline::new();

        assert!(!engine.play(&empty));
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert!(!engine.scheduler().has_pending());
    }

    #[test]
    fn test_tick_at_half_duration_interpolates_midpoint() {
        let (mut engine, timeline, mut store) = setup(&[0.0, 100.0]);
        engine.play(&timeline);

        run_frame(&mut engine, 1000.0, &timeline, &mut store);
        assert_eq!(ball_x(&store), 0.0);

        run_frame(&mut engine, 1000.0 + 750.0, &timeline, &mut store);
        assert!((ball_x(&store) - 50.0).abs() < 1e-9);
        assert_eq!(engine.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_pause_gap_does_not_advance_progress() {
        let (mut engine, timeline, mut store) = setup(&[0.0, 100.0]);
        engine.play(&timeline);

        run_frame(&mut engine, 0.0, &timeline, &mut store);
        run_frame(&mut engine, 300.0, &timeline, &mut store);
        assert!(engine.pause(300.0));
        assert_eq!(engine.state(), PlaybackState::Paused);
        assert!(!engine.scheduler().has_pending());

        // A long pause, then 150ms of real playing
        assert!(engine.resume(10_000.0));
        run_frame(&mut engine, 10_000.0, &timeline, &mut store);
        assert!((ball_x(&store) - 20.0).abs() < 1e-9);
        run_frame(&mut engine, 10_150.0, &timeline, &mut store);
        assert!((ball_x(&store) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_pause_before_first_tick_banks_nothing() {
        let (mut engine, timeline, mut store) = setup(&[0.0, 100.0]);
        engine.play(&timeline);

        assert!(engine.pause(100.0));
        assert!(!engine.scheduler().has_pending());
        assert!(engine.resume(500.0));

        run_frame(&mut engine, 500.0, &timeline, &mut store);
        assert_eq!(ball_x(&store), 0.0);
        run_frame(&mut engine, 1250.0, &timeline, &mut store);
        assert!((ball_x(&store) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_pause_and_resume_in_wrong_state_are_noops() {
        let (mut engine, timeline, _) = setup(&[0.0, 100.0]);
        assert!(!engine.pause(0.0));
        assert!(!engine.resume(0.0));

        engine.play(&timeline);
        assert!(!engine.resume(0.0));
        assert!(!engine.play(&timeline));
        assert_eq!(engine.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_stop_restores_first_step_from_any_state() {
        let (mut engine, timeline, mut store) = setup(&[5.0, 100.0]);

        store.restore(&ball_step(77.0));
        engine.stop(&timeline, &mut store);
        assert_eq!(ball_x(&store), 5.0);
        assert_eq!(engine.state(), PlaybackState::Idle);

        engine.play(&timeline);
        run_frame(&mut engine, 0.0, &timeline, &mut store);
        run_frame(&mut engine, 900.0, &timeline, &mut store);
        engine.pause(900.0);
        engine.stop(&timeline, &mut store);
        assert_eq!(ball_x(&store), 5.0);
        assert_eq!(engine.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_no_tick_fires_after_stop() {
        let (mut engine, timeline, mut store) = setup(&[0.0, 100.0]);
        engine.play(&timeline);
        let stale = engine.pending_tick().unwrap();

        engine.stop(&timeline, &mut store);
        assert!(!engine.scheduler().has_pending());

        let events = store.subscribe();
        assert!(!engine.tick(stale, 5000.0, &timeline, &mut store));
        assert!(events.try_recv().is_err());
        assert_eq!(ball_x(&store), 0.0);
    }

    #[test]
    fn test_advances_through_segments_then_stops() {
        let (mut engine, timeline, mut store) = setup(&[0.0, 100.0, 300.0]);
        let states = engine.subscribe();
        engine.play(&timeline);

        run_frame(&mut engine, 0.0, &timeline, &mut store);
        run_frame(&mut engine, 1500.0, &timeline, &mut store);
        assert_eq!(ball_x(&store), 100.0);
        assert_eq!(engine.progress(&timeline).segment_index, 1);

        // Second segment starts its clock on its first tick
        run_frame(&mut engine, 1600.0, &timeline, &mut store);
        assert_eq!(ball_x(&store), 100.0);
        run_frame(&mut engine, 1600.0 + 750.0, &timeline, &mut store);
        assert!((ball_x(&store) - 200.0).abs() < 1e-9);

        run_frame(&mut engine, 5000.0, &timeline, &mut store);
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert_eq!(ball_x(&store), 0.0);
        assert!(!engine.scheduler().has_pending());

        let seen: Vec<_> = states.try_iter().collect();
        assert_eq!(seen, vec![PlaybackState::Playing, PlaybackState::Idle]);
    }

    #[test]
    fn test_single_step_timeline_plays_once() {
        let (mut engine, timeline, mut store) = setup(&[42.0]);
        engine.play(&timeline);
        run_frame(&mut engine, 0.0, &timeline, &mut store);
        assert_eq!(ball_x(&store), 42.0);
        run_frame(&mut engine, 1500.0, &timeline, &mut store);
        assert_eq!(engine.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_speed_change_applies_to_next_tick_only() {
        let (mut engine, timeline, mut store) = setup(&[0.0, 100.0]);
        engine.play(&timeline);
        run_frame(&mut engine, 0.0, &timeline, &mut store);
        run_frame(&mut engine, 300.0, &timeline, &mut store);
        engine.pause(300.0);

        engine.set_speed(2.0);
        engine.resume(1000.0);
        // 300ms banked + 0ms new over a 750ms segment
        run_frame(&mut engine, 1000.0, &timeline, &mut store);
        assert!((ball_x(&store) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_speeds_are_ignored_and_extremes_clamped() {
        let (mut engine, _, _) = setup(&[]);
        engine.set_speed(0.0);
        engine.set_speed(-3.0);
        engine.set_speed(f64::NAN);
        assert_eq!(engine.speed(), 1.0);

        engine.set_speed(50.0);
        assert_eq!(engine.speed(), MAX_SPEED);
        engine.set_speed(0.01);
        assert_eq!(engine.speed(), MIN_SPEED);
    }
}
