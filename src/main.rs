use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tactics_board::core::{EntityCollections, EntityKind};
use tactics_board::document::{export_track_csv, load_document, save_document, TacticDocument};
use tactics_board::settings::AppSettings;
use tactics_board::{Board, PlaybackConfig, PlaybackState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tactics-board")]
#[command(about = "Play, export and build tactics board keyframe files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Play a tactic in real time, logging segment progress
    Play {
        /// Tactic JSON file
        path: PathBuf,

        /// Playback speed multiplier (overrides settings)
        #[arg(long)]
        speed: Option<f64>,
    },

    /// Sample a tactic's playback into a CSV track
    Export {
        /// Tactic JSON file
        path: PathBuf,

        /// Output CSV file
        out: PathBuf,

        /// Samples per second (overrides settings)
        #[arg(long)]
        fps: Option<u32>,
    },

    /// Write a small three-step demo drill
    Demo {
        /// Output tactic JSON file
        out: PathBuf,
    },

    /// Update the saved settings and print them
    Settings {
        #[arg(long)]
        speed: Option<f64>,

        /// Duration of one keyframe segment at 1x
        #[arg(long)]
        segment_ms: Option<f64>,

        /// Frame clock period for `play`
        #[arg(long)]
        frame_ms: Option<u64>,

        /// Default sampling rate for `export`
        #[arg(long)]
        fps: Option<u32>,

        /// Settings file (defaults to the user config dir)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Requested changes to the persisted settings
#[derive(Debug, Default, PartialEq)]
struct SettingsUpdate {
    speed: Option<f64>,
    segment_ms: Option<f64>,
    frame_ms: Option<u64>,
    fps: Option<u32>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = AppSettings::load();

    match cli.command {
        Command::Play { path, speed } => run_play(&path, speed, &settings).await,
        Command::Export { path, out, fps } => run_export(&path, &out, fps, &settings),
        Command::Demo { out } => run_demo(&out),
        Command::Settings { speed, segment_ms, frame_ms, fps, file } => {
            let path = match file.or_else(AppSettings::config_path) {
                Some(path) => path,
                None => bail!("No config directory available, pass --file"),
            };
            let update = SettingsUpdate { speed, segment_ms, frame_ms, fps };
            let saved = run_settings(&path, update)?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
            Ok(())
        }
    }
}

/// Play a tactic in real time on the frame clock
async fn run_play(path: &Path, speed: Option<f64>, settings: &AppSettings) -> Result<()> {
    let document = load_document(path).with_context(|| format!("Failed to load {}", path.display()))?;
    let final_step = document.steps.last().cloned();

    let mut board = Board::new(settings.playback_config());
    if let Some(speed) = speed {
        board.set_speed(speed);
    }
    board.load_timeline(document.steps);

    if !board.play() {
        bail!("{} has no steps to play", path.display());
    }
    info!("Playing '{}' at {}x", document.name, board.control_state().speed);

    let mut frames = tokio::time::interval(Duration::from_millis(settings.frame_interval_ms.max(1)));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut segment = 0;

    let finished = loop {
        tokio::select! {
            _ = frames.tick() => {
                board.pump_frame();
                let control = board.control_state();
                if control.state == PlaybackState::Idle {
                    info!("Finished");
                    break true;
                }
                if control.progress.segment_index != segment {
                    segment = control.progress.segment_index;
                    info!("Segment {}/{}", segment + 1, control.progress.segment_count);
                }
            }
            _ = &mut ctrl_c => {
                board.stop();
                info!("Interrupted, back to the first step");
                break false;
            }
        }
    };

    log_positions(closing_positions(&board, final_step.as_ref(), finished));
    Ok(())
}

/// Positions to report once playback ends. A finished run has already
/// put the first keyframe back on the pitch, so it reports the last one.
fn closing_positions<'a>(
    board: &'a Board,
    final_step: Option<&'a EntityCollections>,
    finished: bool,
) -> &'a EntityCollections {
    match final_step {
        Some(step) if finished => step,
        _ => board.entities(),
    }
}

fn run_export(path: &Path, out: &Path, fps: Option<u32>, settings: &AppSettings) -> Result<()> {
    let document = load_document(path).with_context(|| format!("Failed to load {}", path.display()))?;
    let file = File::create(out).with_context(|| format!("Failed to create {}", out.display()))?;
    let fps = fps.unwrap_or(settings.export_fps);

    let rows = export_track_csv(&document.steps, settings.playback_config(), fps, file)
        .with_context(|| format!("Failed to export {}", path.display()))?;
    info!("Wrote {} rows to {}", rows, out.display());
    Ok(())
}

/// Build a small three-step drill through the board API
fn run_demo(out: &Path) -> Result<()> {
    let mut board = Board::new(PlaybackConfig::default());
    let blue = board.add_team("Blue", "#1d4ed8");
    board.add_entity(EntityKind::Player, 4, None, Some(blue));
    board.add_entity(EntityKind::Ball, 1, None, None);
    board.add_entity(EntityKind::Cone, 2, None, None);
    board.add_entity(EntityKind::Goal, 1, None, None);
    board.save_step();

    let players = board.entities().players.clone();
    for player in &players {
        board.move_entity(EntityKind::Player, player.id, player.x + 120.0, player.y + 60.0);
    }
    let ball = board.entities().balls[0].clone();
    if let Some(first) = players.first() {
        board.move_entity(EntityKind::Ball, ball.id, first.x + 130.0, first.y + 60.0);
    }
    board.save_step();

    let goal = board.entities().goals[0].clone();
    board.move_entity(EntityKind::Ball, ball.id, goal.x, goal.y);
    board.save_step();

    let document = TacticDocument::new("Demo drill", board.to_array());
    save_document(out, &document).with_context(|| format!("Failed to save {}", out.display()))?;
    info!("Saved {} step(s) to {}", document.steps.len(), out.display());
    Ok(())
}

/// Apply `update` on top of the settings stored at `path` and write them back
fn run_settings(path: &Path, update: SettingsUpdate) -> Result<AppSettings> {
    let mut settings = if path.exists() {
        AppSettings::load_from(path)?
    } else {
        AppSettings::default()
    };

    if let Some(speed) = update.speed {
        if !speed.is_finite() || speed <= 0.0 {
            bail!("Invalid speed: {}", speed);
        }
        settings.speed = speed;
    }
    if let Some(segment_ms) = update.segment_ms {
        if !segment_ms.is_finite() || segment_ms <= 0.0 {
            bail!("Invalid segment duration: {}", segment_ms);
        }
        settings.segment_duration_ms = segment_ms;
    }
    if let Some(frame_ms) = update.frame_ms {
        settings.frame_interval_ms = frame_ms.max(1);
    }
    if let Some(fps) = update.fps {
        settings.export_fps = fps;
    }

    settings.save_to(path)?;
    info!("Settings written to {}", path.display());
    Ok(settings)
}

fn log_positions(step: &EntityCollections) {
    for (kind, id, x, y) in step.positions() {
        info!("{} {} at ({:.1}, {:.1})", kind, id, x, y);
    }
}
