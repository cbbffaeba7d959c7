use crate::board::Board;
use crate::core::{EntityId, EntityKind, ManualClock, Step};
use crate::document::{DocumentError, DocumentResult};
use crate::playback::{PlaybackConfig, PlaybackState};
use serde::Serialize;
use std::io::Write;
use tracing::debug;

/// Sampling rates above this are clamped; the frame loop runs once per sample.
pub const MAX_EXPORT_FPS: u32 = 240;

/// One sampled entity position
#[derive(Debug, Serialize)]
struct TrackRow {
    time_ms: f64,
    segment: usize,
    kind: EntityKind,
    id: EntityId,
    x: f64,
    y: f64,
}

/// Play `steps` against a synthetic clock and write every entity position
/// at `fps` samples per second as CSV.
///
/// `fps` is clamped to `1..=MAX_EXPORT_FPS`. The last sample is the final
/// keyframe. Returns the number of rows written.
pub fn export_track_csv<W: Write>(
    steps: &[Step],
    config: PlaybackConfig,
    fps: u32,
    writer: W,
) -> DocumentResult<usize> {
    let Some(last) = steps.last() else {
        return Err(DocumentError::EmptyTimeline);
    };

    let fps = fps.clamp(1, MAX_EXPORT_FPS);
    let frame_ms = 1000.0 / f64::from(fps);
    let clock = ManualClock::new(0.0);
    let mut board = Board::with_clock(clock.clone(), config);
    board.load_timeline(steps.to_vec());
    board.play();

    let mut wtr = csv::Writer::from_writer(writer);
    let mut rows = 0;
    let mut time_ms = 0.0;

    loop {
        let segment = board.control_state().progress.segment_index;
        board.pump_frame();

        let finished = board.control_state().state == PlaybackState::Idle;
        let frame = if finished { last } else { board.entities() };

        for (kind, id, x, y) in frame.positions() {
            wtr.serialize(TrackRow { time_ms, segment, kind, id, x, y })?;
            rows += 1;
        }

        if finished {
            break;
        }
        clock.advance(frame_ms);
        time_ms += frame_ms;
    }

    wtr.flush()?;
    debug!("Exported {} track rows at {} fps", rows, fps);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Ball, EntityCollections};

    fn ball_step(x: f64) -> Step {
        let mut step = EntityCollections::new();
        step.balls.push(Ball { id: 9, x, y: 0.0, color: None });
        step
    }

    #[test]
    fn test_export_samples_whole_animation() {
        let steps = vec![ball_step(0.0), ball_step(100.0)];
        let mut buf = Vec::new();

        let rows = export_track_csv(&steps, PlaybackConfig::default(), 10, &mut buf).unwrap();
        assert_eq!(rows, 16);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "time_ms,segment,kind,id,x,y");
        assert_eq!(lines[1], "0.0,0,ball,9,0.0,0.0");
        assert!(lines[8].starts_with("700.0,0,ball,9,"));
        assert_eq!(lines[16], "1500.0,0,ball,9,100.0,0.0");
    }

    #[test]
    fn test_export_clamps_sampling_rate() {
        let steps = vec![ball_step(0.0), ball_step(100.0)];

        let capped = export_track_csv(&steps, PlaybackConfig::default(), MAX_EXPORT_FPS, Vec::new()).unwrap();
        let huge = export_track_csv(&steps, PlaybackConfig::default(), u32::MAX, Vec::new()).unwrap();
        assert_eq!(huge, capped);

        let zero = export_track_csv(&steps, PlaybackConfig::default(), 0, Vec::new()).unwrap();
        let one = export_track_csv(&steps, PlaybackConfig::default(), 1, Vec::new()).unwrap();
        assert_eq!(zero, one);
    }

    #[test]
    fn test_export_empty_timeline_fails() {
        let err = export_track_csv(&[], PlaybackConfig::default(), 30, Vec::new()).unwrap_err();
        assert!(matches!(err, DocumentError::EmptyTimeline));
    }
}
